use anyhow::{bail, Context, Result};
use chronomancer_core::Sequence;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON file holding a single sequence.
#[derive(Debug, Clone)]
pub struct SequenceFile {
    path: PathBuf,
}

impl SequenceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Sequence> {
        let contents = fs::read_to_string(&self.path).with_context(|| {
            format!(
                "No sequence at '{}', create one with `chronomancer new`",
                self.path.display()
            )
        })?;

        let sequence = Sequence::load(&contents)
            .with_context(|| format!("Failed to read sequence from '{}'", self.path.display()))?;
        match sequence {
            Some(sequence) => Ok(sequence),
            None => bail!("Sequence file '{}' is empty", self.path.display()),
        }
    }

    pub fn save(&self, sequence: &Sequence) -> Result<()> {
        let contents = sequence.dump()?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write sequence to '{}'", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "saved sequence");
        Ok(())
    }
}
