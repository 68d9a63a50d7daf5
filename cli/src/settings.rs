use anyhow::{Context, Result};
use demine_core::{CellCount, Coord, Difficulty, GameConfig, StartTile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scores::DEFAULT_SCORE_FILE;

/// Game settings, read from a TOML file and overridden by command-line flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub preset: Option<Difficulty>,
    pub width: Option<Coord>,
    pub height: Option<Coord>,
    pub mines: Option<CellCount>,
    pub seed: Option<u64>,
    pub zero_start: Option<bool>,
    pub scores: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Values set in `other` win.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            preset: other.preset.or(self.preset),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            mines: other.mines.or(self.mines),
            seed: other.seed.or(self.seed),
            zero_start: other.zero_start.or(self.zero_start),
            scores: other.scores.or(self.scores),
        }
    }

    /// Explicit dimensions override the preset they start from.
    pub fn game_config(&self) -> demine_core::Result<GameConfig> {
        let base = self.preset.unwrap_or_default().config();
        GameConfig::new(
            (
                self.width.unwrap_or(base.size.0),
                self.height.unwrap_or(base.size.1),
            ),
            self.mines.unwrap_or(base.mines),
        )
    }

    pub fn start_tile(&self) -> StartTile {
        if self.zero_start.unwrap_or(false) {
            StartTile::AlwaysZero
        } else {
            StartTile::SimpleSafe
        }
    }

    pub fn score_path(&self) -> PathBuf {
        self.scores
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCORE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demine_core::GameError;

    #[test]
    fn defaults_to_classic_board() {
        let config = Settings::default().game_config().unwrap();
        assert_eq!(config, Difficulty::Classic.config());
        assert_eq!(Settings::default().start_tile(), StartTile::SimpleSafe);
    }

    #[test]
    fn reads_toml() {
        let settings = Settings::from_toml(
            r#"
            preset = "expert"
            mines = 120
            zero_start = true
            scores = "/tmp/best.json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.preset, Some(Difficulty::Expert));
        let config = settings.game_config().unwrap();
        assert_eq!(config.size, (30, 16));
        assert_eq!(config.mines, 120);
        assert_eq!(settings.start_tile(), StartTile::AlwaysZero);
        assert_eq!(settings.score_path(), PathBuf::from("/tmp/best.json"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Settings::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn flags_override_file() {
        let file = Settings {
            width: Some(20),
            mines: Some(30),
            ..Default::default()
        };
        let flags = Settings {
            mines: Some(5),
            ..Default::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.width, Some(20));
        assert_eq!(merged.mines, Some(5));
    }

    #[test]
    fn invalid_board_is_rejected() {
        let settings = Settings {
            width: Some(2),
            height: Some(2),
            mines: Some(4),
            ..Default::default()
        };
        assert_eq!(settings.game_config(), Err(GameError::TooManyMines));
    }
}
