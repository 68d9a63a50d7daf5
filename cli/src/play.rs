use anyhow::Result;
use demine_core::{FlagOutcome, Game, GameState, Rejection, RevealOutcome, ScoreBoard, ScoreStore};
use std::io::{BufRead, Write};

use crate::command::{Command, CommandError, HELP};
use crate::render::{format_elapsed, render_board, render_scores};

const fn describe(reason: Rejection) -> &'static str {
    match reason {
        Rejection::GameOver => "The game is over, type `n` for a new one",
        Rejection::Flagged => "That cell is flagged, unflag it first",
        Rejection::AlreadyRevealed => "That cell is already open",
        Rejection::NotRevealed => "That cell is still closed",
        Rejection::FlagLimit => "No flags left",
        Rejection::ChordMismatch => "The number of flags around does not match",
        Rejection::NothingToDo => "Nothing to do there",
    }
}

/// Line-based terminal front end: reads commands, prints the board after each one.
pub struct Interactive<R, W, S> {
    input: R,
    output: W,
    store: S,
    scores: ScoreBoard,
    new_game: Box<dyn FnMut() -> demine_core::Result<Game>>,
}

impl<R, W, S> Interactive<R, W, S>
where
    R: BufRead,
    W: Write,
    S: ScoreStore<Error = anyhow::Error>,
{
    pub fn new(
        input: R,
        output: W,
        mut store: S,
        new_game: impl FnMut() -> demine_core::Result<Game> + 'static,
    ) -> Result<Self> {
        let scores = store.load()?;
        Ok(Self {
            input,
            output,
            store,
            scores,
            new_game: Box::new(new_game),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut game = (self.new_game)()?;
        writeln!(self.output, "Type `h` for help.")?;
        self.show(&game)?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(CommandError::Empty) => continue,
                Err(err) => {
                    writeln!(self.output, "{err}")?;
                    continue;
                }
            };
            log::debug!("Command {:?}", command);

            match command {
                Command::Quit => break,
                Command::Help => writeln!(self.output, "{HELP}")?,
                Command::NewGame => {
                    game = (self.new_game)()?;
                    self.show(&game)?;
                }
                Command::Scores => {
                    let mines = game.total_mines();
                    let listing = render_scores(mines, self.scores.top(mines));
                    write!(self.output, "{listing}")?;
                }
                Command::Reveal(coords) => match game.reveal(coords) {
                    Ok(outcome) => self.after_reveal(&game, outcome)?,
                    Err(err) => writeln!(self.output, "{err}")?,
                },
                Command::Flag(coords) => {
                    let outcome = game.toggle_flag(coords);
                    self.after_flag(&game, outcome)?;
                }
                Command::ChordFlag(coords) => {
                    let outcome = game.chord_flag(coords);
                    self.after_flag(&game, outcome)?;
                }
            }
        }
        Ok(())
    }

    fn show(&mut self, game: &Game) -> Result<()> {
        write!(self.output, "{}", render_board(&game.status()))?;
        Ok(())
    }

    fn after_flag(
        &mut self,
        game: &Game,
        outcome: demine_core::Result<FlagOutcome>,
    ) -> Result<()> {
        match outcome {
            Ok(FlagOutcome::NoChange(reason)) => {
                writeln!(self.output, "{}", describe(reason))?
            }
            Ok(_) => self.show(game)?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    fn after_reveal(&mut self, game: &Game, outcome: RevealOutcome) -> Result<()> {
        if let RevealOutcome::NoChange(reason) = outcome {
            writeln!(self.output, "{}", describe(reason))?;
            return Ok(());
        }

        self.show(game)?;
        match game.state() {
            GameState::Lost => writeln!(self.output, "Boom! Type `n` for a new game.")?,
            GameState::Won => {
                if let Some(completion) = game.completion() {
                    writeln!(
                        self.output,
                        "Cleared in {}!",
                        format_elapsed(completion.elapsed)
                    )?;
                    if let Some(rank) = self.scores.submit(completion.clone()) {
                        writeln!(
                            self.output,
                            "New record, #{rank} for {} mines.",
                            completion.mines
                        )?;
                        if let Err(err) = self.store.save(&self.scores) {
                            log::warn!("Failed to save scores: {:#}", err);
                            writeln!(self.output, "Could not save the score: {err}")?;
                        }
                    }
                }
            }
            GameState::NotStarted | GameState::InProgress => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demine_core::MineLayout;

    #[derive(Debug, Default)]
    struct MemoryStore {
        saved: Option<ScoreBoard>,
    }

    impl ScoreStore for MemoryStore {
        type Error = anyhow::Error;

        fn load(&mut self) -> Result<ScoreBoard> {
            Ok(self.saved.clone().unwrap_or_default())
        }

        fn save(&mut self, board: &ScoreBoard) -> Result<()> {
            self.saved = Some(board.clone());
            Ok(())
        }
    }

    fn play(script: &str, mines: &'static [(u8, u8)]) -> (String, MemoryStore) {
        let mut output = Vec::new();
        let new_game = move || {
            let layout = MineLayout::from_mine_coords((3, 3), mines).unwrap();
            Game::from_layout(layout)
        };
        let mut session =
            Interactive::new(script.as_bytes(), &mut output, MemoryStore::default(), new_game)
                .unwrap();
        session.run().unwrap();
        let Interactive { store, .. } = session;
        (String::from_utf8(output).unwrap(), store)
    }

    #[test]
    fn winning_records_a_score() {
        let (output, store) = play("r 0 0\nq\n", &[(2, 2)]);

        assert!(output.contains("cleared!"), "{output}");
        assert!(output.contains("New record, #1 for 1 mines."), "{output}");
        assert_eq!(store.saved.map(|board| board.top(1).len()), Some(1));
    }

    #[test]
    fn losing_prints_boom() {
        let (output, store) = play("r 2 2\nr 0 0\n", &[(2, 2)]);

        assert!(output.contains("Boom!"), "{output}");
        assert!(output.contains(describe(Rejection::GameOver)), "{output}");
        assert!(store.saved.is_none());
    }

    #[test]
    fn failed_save_keeps_playing() {
        #[derive(Debug)]
        struct ReadOnlyStore;

        impl ScoreStore for ReadOnlyStore {
            type Error = anyhow::Error;

            fn load(&mut self) -> Result<ScoreBoard> {
                Ok(ScoreBoard::default())
            }

            fn save(&mut self, _board: &ScoreBoard) -> Result<()> {
                anyhow::bail!("disk full")
            }
        }

        let mut output = Vec::new();
        let new_game = || -> demine_core::Result<Game> {
            Game::from_layout(MineLayout::from_mine_coords((3, 3), &[(2, 2)])?)
        };
        let mut session =
            Interactive::new("r 0 0\nn\nh\nq\n".as_bytes(), &mut output, ReadOnlyStore, new_game)
                .unwrap();

        session.run().unwrap();
        drop(session);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Could not save the score: disk full"), "{output}");
        assert!(output.contains("toggle a flag"), "{output}");
        assert_eq!(output.matches("ready").count(), 2, "{output}");
    }

    #[test]
    fn reports_errors_and_rejections() {
        let (output, _) = play("dig\nr 9 9\nf 0 0\nf 1 1\nr 0 0\nh\n", &[(2, 2)]);

        assert!(output.contains("Unknown command `dig`"), "{output}");
        assert!(output.contains("Invalid coordinates"), "{output}");
        assert!(output.contains(describe(Rejection::FlagLimit)), "{output}");
        assert!(output.contains(describe(Rejection::Flagged)), "{output}");
        assert!(output.contains("toggle a flag"), "{output}");
    }
}
