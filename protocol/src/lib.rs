//! JSON messages for driving a game from another process.
//!
//! Each [`Request`] is answered by exactly one [`Response`]. A [`Session`] owns the current game
//! and the score board the won games are submitted to.

use demine_core::{
    CellCount, Completion, Coord, FlagOutcome, Game, GameConfig, GameError,
    RandomMinefieldGenerator, Rejection, RevealOutcome, ScoreBoard, StartTile, StatusSnapshot,
    Stopwatch,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    NewGame {
        width: Coord,
        height: Coord,
        mines: CellCount,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        zero_start: bool,
    },
    Reveal {
        x: Coord,
        y: Coord,
    },
    ToggleFlag {
        x: Coord,
        y: Coord,
    },
    ChordFlag {
        x: Coord,
        y: Coord,
    },
    Status,
    Scores {
        mines: CellCount,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Status {
        snapshot: StatusSnapshot,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rejected: Option<Rejection>,
    },
    Won {
        snapshot: StatusSnapshot,
        completion: Completion,
        rank: Option<usize>,
    },
    Scores {
        mines: CellCount,
        records: Vec<Completion>,
    },
    Error {
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("No game in progress, send new_game first")]
    NoGame,
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Malformed request: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct Session {
    game: Option<Game>,
    scores: ScoreBoard,
    scores_changed: bool,
}

impl Session {
    pub fn new(scores: ScoreBoard) -> Self {
        Self {
            game: None,
            scores,
            scores_changed: false,
        }
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// Whether a won game changed the score board since the last call.
    pub fn take_scores_changed(&mut self) -> bool {
        core::mem::take(&mut self.scores_changed)
    }

    pub fn handle(&mut self, request: Request) -> Response {
        log::debug!("Handling {:?}", request);
        self.try_handle(request).unwrap_or_else(|err| Response::Error {
            message: err.to_string(),
        })
    }

    /// Decodes one JSON request and encodes its response.
    pub fn handle_json(&mut self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(err) => Response::Error {
                message: ProtocolError::from(err).to_string(),
            },
        };
        serde_json::to_string(&response).unwrap_or_else(|err| {
            log::error!("Failed to encode response: {}", err);
            r#"{"type":"error","message":"internal encoding error"}"#.to_string()
        })
    }

    fn try_handle(&mut self, request: Request) -> Result<Response, ProtocolError> {
        match request {
            Request::NewGame {
                width,
                height,
                mines,
                seed,
                zero_start,
            } => {
                let config = GameConfig::new((width, height), mines)?;
                let start_tile = if zero_start {
                    StartTile::AlwaysZero
                } else {
                    StartTile::SimpleSafe
                };
                let generator = match seed {
                    Some(seed) => RandomMinefieldGenerator::new(seed, start_tile),
                    None => RandomMinefieldGenerator::from_entropy(start_tile),
                };
                let game = Game::with_generator(config, generator, Stopwatch::default())?;
                Ok(Self::status(self.game.insert(game), None))
            }
            Request::Reveal { x, y } => {
                let game = self.game.as_mut().ok_or(ProtocolError::NoGame)?;
                let outcome = game.reveal((x, y))?;
                match (outcome, game.completion().cloned()) {
                    (RevealOutcome::Won, Some(completion)) => {
                        let rank = self.scores.submit(completion.clone());
                        self.scores_changed |= rank.is_some();
                        Ok(Response::Won {
                            snapshot: game.status(),
                            completion,
                            rank,
                        })
                    }
                    (RevealOutcome::NoChange(reason), _) => Ok(Self::status(game, Some(reason))),
                    _ => Ok(Self::status(game, None)),
                }
            }
            Request::ToggleFlag { x, y } => {
                let game = self.game.as_mut().ok_or(ProtocolError::NoGame)?;
                let outcome = game.toggle_flag((x, y))?;
                Ok(Self::status(game, rejection(outcome)))
            }
            Request::ChordFlag { x, y } => {
                let game = self.game.as_mut().ok_or(ProtocolError::NoGame)?;
                let outcome = game.chord_flag((x, y))?;
                Ok(Self::status(game, rejection(outcome)))
            }
            Request::Status => {
                let game = self.game.as_ref().ok_or(ProtocolError::NoGame)?;
                Ok(Self::status(game, None))
            }
            Request::Scores { mines } => Ok(Response::Scores {
                mines,
                records: self.scores.top(mines).to_vec(),
            }),
        }
    }

    fn status(game: &Game, rejected: Option<Rejection>) -> Response {
        Response::Status {
            snapshot: game.status(),
            rejected,
        }
    }
}

fn rejection(outcome: FlagOutcome) -> Option<Rejection> {
    match outcome {
        FlagOutcome::NoChange(reason) => Some(reason),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demine_core::{CellView, GameState};

    fn new_game(session: &mut Session, mines: CellCount) -> Response {
        session.handle(Request::NewGame {
            width: 4,
            height: 4,
            mines,
            seed: Some(11),
            zero_start: false,
        })
    }

    #[test]
    fn commands_need_a_game() {
        let mut session = Session::default();
        let response = session.handle(Request::Reveal { x: 0, y: 0 });
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn new_game_reports_fresh_board() {
        let mut session = Session::default();
        let Response::Status { snapshot, rejected } = new_game(&mut session, 3) else {
            panic!("expected status");
        };
        assert_eq!(rejected, None);
        assert_eq!(snapshot.state, GameState::NotStarted);
        assert_eq!(snapshot.mines_left, 3);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let mut session = Session::default();
        let response = new_game(&mut session, 16);
        assert_eq!(
            response,
            Response::Error {
                message: GameError::TooManyMines.to_string()
            }
        );
        assert!(session.game().is_none());
    }

    #[test]
    fn winning_submits_score() {
        let mut session = Session::default();
        new_game(&mut session, 0);

        let Response::Won { rank, completion, .. } = session.handle(Request::Reveal { x: 1, y: 1 })
        else {
            panic!("expected win");
        };
        assert_eq!(rank, Some(1));
        assert_eq!(completion.mines, 0);
        assert!(session.take_scores_changed());
        assert!(!session.take_scores_changed());

        let Response::Scores { records, .. } = session.handle(Request::Scores { mines: 0 }) else {
            panic!("expected scores");
        };
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn flag_rejections_are_reported() {
        let mut session = Session::default();
        new_game(&mut session, 1);
        session.handle(Request::ToggleFlag { x: 0, y: 0 });

        let Response::Status { snapshot, rejected } =
            session.handle(Request::ToggleFlag { x: 1, y: 0 })
        else {
            panic!("expected status");
        };
        assert_eq!(rejected, Some(Rejection::FlagLimit));
        assert_eq!(snapshot.cell((0, 0)), Some(CellView::Flagged));
        assert_eq!(snapshot.cell((1, 0)), Some(CellView::Hidden));
    }

    #[test]
    fn json_lines_round_trip() {
        let mut session = Session::default();
        let reply = session.handle_json(
            r#"{"type":"new_game","width":3,"height":3,"mines":1,"seed":5}"#,
        );
        assert!(reply.starts_with(r#"{"type":"status""#), "{reply}");

        let reply = session.handle_json(r#"{"type":"reveal","x":9,"y":0}"#);
        assert_eq!(reply, r#"{"type":"error","message":"Invalid coordinates"}"#);

        let reply = session.handle_json("not json");
        assert!(reply.contains("Malformed request"), "{reply}");
    }
}
