use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Board dimensions and mine count for one game.
///
/// A valid configuration always leaves at least one safe cell, because the first revealed cell is
/// guaranteed not to hold a mine. Deserializing validates like [`GameConfig::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedConfig")]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

#[derive(Deserialize)]
struct UncheckedConfig {
    size: Coord2,
    mines: CellCount,
}

impl TryFrom<UncheckedConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: UncheckedConfig) -> Result<Self> {
        Self::new(raw.size, raw.mines)
    }
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn square(size: Coord, mines: CellCount) -> Result<Self> {
        Self::new((size, size), mines)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::InvalidSize);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::Classic.config()
    }
}

/// Well-known board presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Classic,
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Classic,
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ];

    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Classic => GameConfig::new_unchecked((10, 10), 10),
            Beginner => GameConfig::new_unchecked((9, 9), 10),
            Intermediate => GameConfig::new_unchecked((16, 16), 40),
            Expert => GameConfig::new_unchecked((30, 16), 99),
        }
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Classic => "classic",
            Beginner => "beginner",
            Intermediate => "intermediate",
            Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_board() {
        assert_eq!(GameConfig::new((0, 5), 0), Err(GameError::InvalidSize));
        assert_eq!(GameConfig::new((5, 0), 0), Err(GameError::InvalidSize));
    }

    #[test]
    fn requires_one_safe_cell() {
        assert_eq!(GameConfig::square(3, 9), Err(GameError::TooManyMines));
        assert!(GameConfig::square(3, 8).is_ok());
        assert!(GameConfig::square(1, 0).is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for preset in Difficulty::ALL {
            assert_eq!(preset.config().validate(), Ok(()), "{preset}");
        }
        assert_eq!(GameConfig::default().size, (10, 10));
    }

    #[test]
    fn presets_parse_by_name() {
        assert_eq!("Expert".parse(), Ok(Difficulty::Expert));
        assert_eq!(" beginner ".parse(), Ok(Difficulty::Beginner));
        assert_eq!(
            "impossible".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty)
        );
    }

    #[test]
    fn deserializing_validates() {
        let config: GameConfig = serde_json::from_str(r#"{"size":[4,4],"mines":3}"#).unwrap();
        assert_eq!(config, GameConfig::square(4, 3).unwrap());

        assert!(serde_json::from_str::<GameConfig>(r#"{"size":[3,3],"mines":9}"#).is_err());
        assert!(serde_json::from_str::<GameConfig>(r#"{"size":[0,4],"mines":0}"#).is_err());
    }

    #[test]
    fn safe_cells_excludes_mines() {
        let config = GameConfig::square(8, 10).unwrap();
        assert_eq!(config.total_cells(), 64);
        assert_eq!(config.safe_cells(), 54);
    }
}
