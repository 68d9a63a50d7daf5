use core::ops::BitOr;
use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// No cell revealed yet, mines are not placed
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Why a command left the game untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    GameOver,
    Flagged,
    AlreadyRevealed,
    NotRevealed,
    FlagLimit,
    ChordMismatch,
    NothingToDo,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange(Rejection),
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange(_))
    }
}

/// Used to merge outcomes when chording
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange(reason), NoChange(_)) => NoChange(reason),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagOutcome {
    NoChange(Rejection),
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange(_))
    }
}

/// Represents a game from the first click to the end.
///
/// Mines are placed by the generator on the first reveal, so the first revealed cell is never a
/// mine. Every command either applies completely or returns a [`Rejection`] leaving the game as it
/// was.
#[derive(Debug)]
pub struct Game<C: Clock = Stopwatch> {
    config: GameConfig,
    generator: Option<Box<dyn MinefieldGenerator>>,
    layout: MineLayout,
    board: Array2<EngineCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    triggered_mine: Option<Coord2>,
    completion: Option<Completion>,
    clock: C,
}

impl Game<Stopwatch> {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_generator(
            config,
            RandomMinefieldGenerator::from_entropy(StartTile::default()),
            Stopwatch::default(),
        )
    }

    pub fn with_seed(config: GameConfig, seed: u64, start_tile: StartTile) -> Result<Self> {
        Self::with_generator(
            config,
            RandomMinefieldGenerator::new(seed, start_tile),
            Stopwatch::default(),
        )
    }

    /// A game over a known layout, placed on the first reveal like any other.
    pub fn from_layout(layout: MineLayout) -> Result<Self> {
        Self::from_layout_with_clock(layout, Stopwatch::default())
    }
}

impl<C: Clock> Game<C> {
    /// Fails with the configuration error instead of creating a game that could never start.
    pub fn with_generator(
        config: GameConfig,
        generator: impl MinefieldGenerator + 'static,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generator: Some(Box::new(generator)),
            layout: MineLayout::empty(config.size),
            board: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::default(),
            triggered_mine: None,
            completion: None,
            clock,
        })
    }

    pub fn from_layout_with_clock(layout: MineLayout, clock: C) -> Result<Self> {
        Self::with_generator(layout.game_config(), layout, clock)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// Mines not yet accounted for by a flag, never negative since flags are capped. A won game
    /// has found them all.
    pub fn mines_left(&self) -> CellCount {
        if self.state == GameState::Won {
            return 0;
        }
        self.config.mines.saturating_sub(self.flagged_count)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn safe_cells_left(&self) -> CellCount {
        self.config.safe_cells().saturating_sub(self.revealed_count)
    }

    /// The placed mines, `None` until the first reveal.
    pub fn layout(&self) -> Option<&MineLayout> {
        (!self.state.is_initial()).then_some(&self.layout)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// The record of a won game.
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Time since the first reveal, frozen once the game ended.
    pub fn elapsed(&self) -> Option<Duration> {
        (!self.state.is_initial()).then(|| self.clock.elapsed())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.config.size) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<EngineCell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    /// `None` while the mines are not placed yet.
    pub fn has_mine_at(&self, coords: Coord2) -> Result<Option<bool>> {
        let coords = self.validate_coords(coords)?;
        Ok(self.layout().map(|layout| layout.contains_mine(coords)))
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> Result<Option<u8>> {
        let coords = self.validate_coords(coords)?;
        Ok(self
            .layout()
            .map(|layout| layout.adjacent_mine_count(coords)))
    }

    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.validate_coords(coords)?;
        Ok(self.view_of(coords))
    }

    /// Whether revealing this cell would open its neighbours through its flags.
    pub fn is_chordable(&self, coords: Coord2) -> bool {
        if self.state.is_finished() || !in_bounds(coords, self.config.size) {
            return false;
        }

        match self.board[coords.to_nd_index()] {
            EngineCell::Revealed(count) if count > 0 => {
                count == self.count_neighbors(coords, |cell| cell == EngineCell::Flagged)
                    && self.count_neighbors(coords, |cell| cell == EngineCell::Hidden) > 0
            }
            _ => false,
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        let cells = Array2::from_shape_fn(self.config.size.to_nd_index(), |(x, y)| {
            self.view_of((x as Coord, y as Coord))
        });

        StatusSnapshot {
            state: self.state,
            size: self.config.size,
            total_mines: self.config.mines,
            mines_left: self.mines_left(),
            safe_cells_left: self.safe_cells_left(),
            elapsed: self.elapsed(),
            cells,
        }
    }

    /// Flag or unflag a hidden cell; at most as many flags as mines can be placed.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let coords = self.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(NoChange(Rejection::GameOver));
        }

        let outcome = match self.board[coords.to_nd_index()] {
            EngineCell::Revealed(_) => NoChange(Rejection::AlreadyRevealed),
            EngineCell::Flagged => {
                self.board[coords.to_nd_index()] = EngineCell::Hidden;
                self.flagged_count -= 1;
                Unflagged
            }
            EngineCell::Hidden if self.mines_left() == 0 => NoChange(Rejection::FlagLimit),
            EngineCell::Hidden => {
                self.board[coords.to_nd_index()] = EngineCell::Flagged;
                self.flagged_count += 1;
                Flagged
            }
        };
        log::debug!("Toggle flag at {:?}: {:?}", coords, outcome);
        Ok(outcome)
    }

    /// Flag every hidden neighbour of a revealed cell whose count equals its unrevealed neighbours.
    pub fn chord_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let coords = self.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(NoChange(Rejection::GameOver));
        }

        let EngineCell::Revealed(count) = self.board[coords.to_nd_index()] else {
            return Ok(NoChange(Rejection::NotRevealed));
        };
        if count != self.count_neighbors(coords, EngineCell::is_unrevealed) {
            return Ok(NoChange(Rejection::ChordMismatch));
        }

        let targets: Vec<Coord2> = neighbors(coords, self.config.size)
            .filter(|&pos| self.board[pos.to_nd_index()] == EngineCell::Hidden)
            .collect();
        if targets.is_empty() {
            return Ok(NoChange(Rejection::NothingToDo));
        }
        if targets.len() > usize::from(self.mines_left()) {
            return Ok(NoChange(Rejection::FlagLimit));
        }

        for pos in &targets {
            self.board[pos.to_nd_index()] = EngineCell::Flagged;
        }
        self.flagged_count += targets.len() as CellCount;
        log::debug!("Chord flagged {} cells around {:?}", targets.len(), coords);
        Ok(Flagged)
    }

    /// Reveal a cell. Revealing an already revealed numbered cell chords it instead.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(NoChange(Rejection::GameOver));
        }

        match self.board[coords.to_nd_index()] {
            EngineCell::Flagged => Ok(NoChange(Rejection::Flagged)),
            EngineCell::Revealed(0) => Ok(NoChange(Rejection::AlreadyRevealed)),
            EngineCell::Revealed(_) => self.chord_reveal(coords),
            EngineCell::Hidden => {
                if self.state.is_initial() {
                    self.place_mines(coords)?;
                }
                let outcome = self.reveal_hidden(coords);
                log::debug!("Reveal at {:?}: {:?}", coords, outcome);
                Ok(outcome)
            }
        }
    }

    /// Trust the flags: when a revealed cell has as many flagged neighbours as adjacent mines,
    /// reveal all its other hidden neighbours. A misplaced flag loses the game.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(NoChange(Rejection::GameOver));
        }

        let EngineCell::Revealed(count) = self.board[coords.to_nd_index()] else {
            return self.reveal(coords);
        };
        if count != self.count_neighbors(coords, |cell| cell == EngineCell::Flagged) {
            return Ok(NoChange(Rejection::ChordMismatch));
        }

        let targets: Vec<Coord2> = neighbors(coords, self.config.size)
            .filter(|&pos| self.board[pos.to_nd_index()] == EngineCell::Hidden)
            .collect();

        let mut outcome = NoChange(Rejection::NothingToDo);
        for pos in targets {
            if self.state.is_finished() {
                break;
            }
            // an earlier cascade may already have opened it
            if self.board[pos.to_nd_index()] == EngineCell::Hidden {
                outcome = outcome | self.reveal_hidden(pos);
            }
        }
        log::debug!("Chord reveal at {:?}: {:?}", coords, outcome);
        Ok(outcome)
    }

    fn place_mines(&mut self, start: Coord2) -> Result<()> {
        let Some(mut generator) = self.generator.take() else {
            return Ok(());
        };

        let layout = generator.generate(self.config, start);
        if layout.game_config() != self.config {
            log::error!(
                "Generator produced {:?}, expected {:?}",
                layout.game_config(),
                self.config
            );
            self.generator = Some(generator);
            return Err(GameError::LayoutMismatch);
        }

        self.layout = layout;
        self.clock.start();
        self.state = GameState::InProgress;
        log::debug!("Game started at {:?}", start);
        Ok(())
    }

    fn reveal_hidden(&mut self, coords: Coord2) -> RevealOutcome {
        if self.layout.contains_mine(coords) {
            self.triggered_mine = Some(coords);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }

        self.flood_reveal(coords);

        if self.revealed_count == self.config.safe_cells() {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Opens `origin` and, through zero-count cells, the connected region around it.
    fn flood_reveal(&mut self, origin: Coord2) {
        let size = self.config.size;
        let mut visited = BTreeSet::from([origin]);
        let mut to_visit = VecDeque::from([origin]);

        while let Some(coords) = to_visit.pop_front() {
            // skip flagged or already opened cells
            if self.board[coords.to_nd_index()] != EngineCell::Hidden {
                continue;
            }

            let count = self.layout.adjacent_mine_count(coords);
            self.board[coords.to_nd_index()] = EngineCell::Revealed(count);
            self.revealed_count += 1;
            log::trace!("Opened {:?}, adjacent mines: {}", coords, count);

            if count == 0 {
                for pos in neighbors(coords, size) {
                    if self.board[pos.to_nd_index()] == EngineCell::Hidden && visited.insert(pos) {
                        to_visit.push_back(pos);
                    }
                }
            }
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.clock.stop();
        if won {
            self.state = GameState::Won;
            self.completion = Some(Completion {
                size: self.config.size,
                mines: self.config.mines,
                elapsed: self.clock.elapsed(),
                finished_at: self.clock.now(),
            });
        } else {
            self.state = GameState::Lost;
        }
        log::debug!(
            "Game ended {:?} after {:?}",
            self.state,
            self.clock.elapsed()
        );
    }

    /// The end-of-game sweep is derived here rather than stored. After a win every closed cell
    /// is a mine, so only a loss can show wrong flags or uncovered counts.
    fn view_of(&self, coords: Coord2) -> CellView {
        let cell = self.board[coords.to_nd_index()];
        if !self.state.is_finished() {
            return cell.into();
        }

        let is_mine = self.layout.contains_mine(coords);
        match cell {
            EngineCell::Revealed(count) => CellView::Revealed(count),
            _ if self.triggered_mine == Some(coords) => CellView::Exploded,
            EngineCell::Hidden if is_mine => CellView::Mine,
            EngineCell::Hidden => CellView::Revealed(self.layout.adjacent_mine_count(coords)),
            EngineCell::Flagged if is_mine => CellView::Flagged,
            EngineCell::Flagged => CellView::IncorrectFlag,
        }
    }

    fn count_neighbors(&self, coords: Coord2, predicate: impl Fn(EngineCell) -> bool) -> u8 {
        neighbors(coords, self.config.size)
            .filter(|&pos| predicate(self.board[pos.to_nd_index()]))
            .count() as u8
    }
}
