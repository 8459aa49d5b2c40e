use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Configuration for listing occurrences
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct PreviewConfig {
    /// Occurrences shown by `preview` without `--count`
    pub default_count: usize,
    /// chrono format string for absolute dates
    pub date_format: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            default_count: 10,
            date_format: "%Y-%m-%d %H:%M:%S UTC".to_string(),
        }
    }
}

impl Config {
    /// Merges `chronomancer.toml` with `CHRONOMANCER_` variables, where
    /// `CHRONOMANCER_PREVIEW__DEFAULT_COUNT` sets `preview.default_count`.
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("chronomancer.toml"))
            .merge(Env::prefixed("CHRONOMANCER_").split("__"))
    }
}
