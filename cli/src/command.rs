use core::str::FromStr;
use demine_core::{Coord, Coord2};
use thiserror::Error;

/// One line typed at the interactive prompt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    ChordFlag(Coord2),
    NewGame,
    Scores,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs two coordinates, e.g. `{0} 3 4`")]
    MissingCoords(&'static str),
    #[error("Invalid coordinate `{0}`")]
    InvalidCoord(String),
    #[error("Unexpected trailing input `{0}`")]
    Trailing(String),
}

pub const HELP: &str = "\
Commands:
  r X Y   reveal a cell (on an opened number: open its neighbours if flags match)
  f X Y   toggle a flag
  c X Y   flag every closed neighbour of a satisfied number
  n       new game
  s       show best times
  h       this help
  q       quit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();

        let command = match word.as_str() {
            "r" | "reveal" | "o" | "open" => Command::Reveal(parse_coords(&mut words, "reveal")?),
            "f" | "flag" => Command::Flag(parse_coords(&mut words, "flag")?),
            "c" | "chord" => Command::ChordFlag(parse_coords(&mut words, "chord")?),
            "n" | "new" => Command::NewGame,
            "s" | "scores" => Command::Scores,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(word)),
        };

        match words.next() {
            Some(extra) => Err(CommandError::Trailing(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn parse_coords<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<Coord2, CommandError> {
    let mut next = || -> Result<Coord, CommandError> {
        let word = words.next().ok_or(CommandError::MissingCoords(name))?;
        word.parse()
            .map_err(|_| CommandError::InvalidCoord(word.to_string()))
    };
    Ok((next()?, next()?))
}
