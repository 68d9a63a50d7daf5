use anyhow::{Context, Result};
use demine_core::{ScoreBoard, ScoreStore};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const DEFAULT_SCORE_FILE: &str = "demine-scores.json";

/// Score board kept as a pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct JsonScoreFile {
    path: PathBuf,
}

impl JsonScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonScoreFile {
    type Error = anyhow::Error;

    /// A missing file is an empty board.
    fn load(&mut self) -> Result<ScoreBoard> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No score file at {}", self.path.display());
                return Ok(ScoreBoard::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading scores from {}", self.path.display()));
            }
        };
        ScoreBoard::from_json(&json)
            .with_context(|| format!("parsing scores in {}", self.path.display()))
    }

    fn save(&mut self, board: &ScoreBoard) -> Result<()> {
        let json = board.to_json().context("encoding scores")?;
        // the temp file must live on the same filesystem for the rename to be atomic
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating a temporary file in {}", dir.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("writing {}", file.path().display()))?;
        file.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        log::debug!("Saved scores to {}", self.path.display());
        Ok(())
    }
}
