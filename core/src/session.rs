use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::reveal::{dig, reveal_bombs};
use crate::*;

/// Valid transitions:
/// - Ready -> Running (first left click; marking does not start the timer)
/// - Ready / Running -> Cleared, Exploded or Illegal
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Ready,
    Running,
    Cleared,
    Exploded,
    Illegal,
}

impl SessionState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        self.result().is_some()
    }

    pub const fn result(self) -> Option<GameResult> {
        match self {
            Self::Ready | Self::Running => None,
            Self::Cleared => Some(GameResult::Cleared),
            Self::Exploded => Some(GameResult::Exploded),
            Self::Illegal => Some(GameResult::Illegal),
        }
    }
}

impl From<GameResult> for SessionState {
    fn from(result: GameResult) -> Self {
        match result {
            GameResult::Cleared => Self::Cleared,
            GameResult::Exploded => Self::Exploded,
            GameResult::Illegal => Self::Illegal,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Cleared,
    Exploded,
    /// Stalled timer or a win the play log could not back up.
    Illegal,
}

/// One accepted click, as recorded in the play log.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayAction {
    pub elapsed_seconds: f64,
    pub x: u32,
    pub y: u32,
    pub button: Button,
    pub verification_code: u32,
}

impl PlayAction {
    /// Records a click at `coords` as the `action_number`-th (1-based) log entry.
    pub fn new(coords: Coord2, button: Button, action_number: usize, elapsed_seconds: f64) -> Self {
        Self {
            elapsed_seconds,
            x: coords.0.into(),
            y: coords.1.into(),
            button,
            verification_code: verification_code(coords, action_number),
        }
    }
}

/// Everything measured about one session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub start_ms: u64,
    pub last_tick_ms: u64,
    /// Elapsed time at the last tick, in hundredths of a second.
    pub elapsed_centis: u64,
    pub left_clicks: u32,
    pub right_clicks: u32,
    pub flags_placed: CellCount,
    #[serde(flatten)]
    pub tally: Tally,
    pub openings_total: CellCount,
    pub three_bv_total: CellCount,
    pub bomb_total: CellCount,
    pub seed: Option<i32>,
    pub play_log: Vec<PlayAction>,
    pub result: Option<GameResult>,
}

impl SessionInfo {
    fn for_board(board: &Board) -> Self {
        Self {
            openings_total: board.openings_total(),
            three_bv_total: board.three_bv_total(),
            bomb_total: board.bomb_total(),
            seed: board.seed(),
            ..Default::default()
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_centis as f64 / 100.0
    }

    /// Elapsed time as `SSS.CC`, zero padded below 1000 seconds.
    pub fn elapsed_display(&self) -> String {
        format!("{:03}.{:02}", self.elapsed_centis / 100, self.elapsed_centis % 100)
    }

    pub fn bombs_remaining(&self) -> CellCount {
        self.bomb_total.saturating_sub(self.flags_placed)
    }

    pub fn three_bv_per_second(&self) -> f64 {
        three_bv_per_second(self.tally.three_bv_solved, self.elapsed_seconds())
    }

    pub fn estimated_time(&self) -> f64 {
        estimated_time(self.three_bv_total, self.three_bv_per_second())
    }
}

/// Counters after a click.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub left_clicks: u32,
    pub right_clicks: u32,
    pub flags_placed: CellCount,
    pub bombs_remaining: CellCount,
    pub openings_triggered: CellCount,
    pub openings_total: CellCount,
    pub three_bv_solved: CellCount,
    pub three_bv_total: CellCount,
}

impl From<&SessionInfo> for ProgressReport {
    fn from(info: &SessionInfo) -> Self {
        Self {
            left_clicks: info.left_clicks,
            right_clicks: info.right_clicks,
            flags_placed: info.flags_placed,
            bombs_remaining: info.bombs_remaining(),
            openings_triggered: info.tally.openings_triggered,
            openings_total: info.openings_total,
            three_bv_solved: info.tally.three_bv_solved,
            three_bv_total: info.three_bv_total,
        }
    }
}

/// Timer feedback emitted on every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub elapsed_seconds: f64,
    pub elapsed_display: String,
    pub estimated_time: f64,
    pub three_bv_per_second: f64,
}

impl From<&SessionInfo> for TickReport {
    fn from(info: &SessionInfo) -> Self {
        Self {
            elapsed_seconds: info.elapsed_seconds(),
            elapsed_display: info.elapsed_display(),
            estimated_time: info.estimated_time(),
            three_bv_per_second: info.three_bv_per_second(),
        }
    }
}

/// Board parameters published with a cleared game, for leaderboards.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardParams {
    pub difficulty: Difficulty,
    pub width: Coord,
    pub height: Coord,
    pub bomb_ratio: f64,
    pub seed: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishReport {
    pub result: GameResult,
    pub info: SessionInfo,
    pub leaderboard: Option<BoardParams>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Progress(ProgressReport),
    Tick(TickReport),
    Finished(FinishReport),
}

/// Drives one game: owns the board and the session info and is the only thing that mutates them.
#[derive(Clone, Debug)]
pub struct GameSession<C: Clock = SystemClock> {
    config: Option<GameConfig>,
    difficulty: Difficulty,
    question_marks: bool,
    board: Board,
    info: SessionInfo,
    state: SessionState,
    events: VecDeque<SessionEvent>,
    clock: C,
}

impl GameSession<SystemClock> {
    pub fn with_system_clock(config: GameConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> GameSession<C> {
    pub fn new(config: GameConfig, clock: C) -> Self {
        let board = ShuffleGenerator::from_seed(config.seed()).generate(&config);
        let mut session = Self::from_board(board, config.question_marks(), clock);
        session.config = Some(config);
        session.difficulty = config.difficulty();
        session
    }

    /// Wraps a prebuilt board; rebuilding such a session resets the same layout.
    pub fn from_board(board: Board, question_marks: bool, clock: C) -> Self {
        Self {
            config: None,
            difficulty: Difficulty::Custom,
            question_marks,
            info: SessionInfo::for_board(&board),
            board,
            state: SessionState::Ready,
            events: VecDeque::new(),
            clock,
        }
    }

    /// Starts over. Generated boards are generated again, so only explicit or fixed seeds
    /// reproduce the same layout.
    pub fn rebuild(&mut self) {
        self.board = match self.config {
            Some(config) => ShuffleGenerator::from_seed(config.seed()).generate(&config),
            None => self.board.pristine(),
        };
        self.info = SessionInfo::for_board(&self.board);
        self.state = SessionState::Ready;
        self.events.clear();
        log::debug!("Session rebuilt with seed {:?}", self.board.seed());
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn question_marks(&self) -> bool {
        self.question_marks
    }

    pub fn progress(&self) -> ProgressReport {
        ProgressReport::from(&self.info)
    }

    pub fn board_params(&self) -> BoardParams {
        let (width, height) = self.board.size();
        BoardParams {
            difficulty: self.difficulty,
            width,
            height,
            bomb_ratio: self.board.bomb_ratio(),
            seed: self.board.seed(),
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.events.drain(..)
    }

    pub fn click(&mut self, coords: Coord2, button: Button) -> Result<ClickOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match button {
            Button::Left => self.dig_at(coords),
            Button::Right => self.mark_at(coords),
        })
    }

    /// Refreshes the timer; call every [`TICK_INTERVAL_MS`] while running.
    ///
    /// A gap longer than [`STALL_THRESHOLD_MS`] since the previous tick ends the session as
    /// [`GameResult::Illegal`].
    pub fn tick(&mut self) -> Option<TickReport> {
        if !matches!(self.state, SessionState::Running) {
            return None;
        }

        let now = self.clock.now_ms();
        let gap = now.saturating_sub(self.info.last_tick_ms);
        if gap > STALL_THRESHOLD_MS {
            log::warn!("Timer stalled for {gap} ms, stopping the game");
            self.finish(GameResult::Illegal);
            return None;
        }

        self.info.last_tick_ms = now;
        self.info.elapsed_centis = (now.saturating_sub(self.info.start_ms) + 5) / 10;

        let report = TickReport::from(&self.info);
        self.events.push_back(SessionEvent::Tick(report.clone()));
        Some(report)
    }

    fn dig_at(&mut self, coords: Coord2) -> ClickOutcome {
        if self.board[coords].is_revealed() {
            return ClickOutcome::NoChange;
        }
        if self.state.is_ready() {
            self.start();
        }

        self.info.left_clicks += 1;
        self.info.tally.record_dig(&self.board[coords]);
        self.log_action(coords, Button::Left);

        let outcome = dig(&mut self.board, coords);
        self.events
            .push_back(SessionEvent::Progress(ProgressReport::from(&self.info)));

        match outcome {
            DigOutcome::HitMine => {
                reveal_bombs(&mut self.board);
                ClickOutcome::Finished(self.finish(GameResult::Exploded))
            }
            _ if self.info.tally.three_bv_solved == self.info.three_bv_total => {
                let result = judge(&self.board, &self.info.play_log);
                ClickOutcome::Finished(self.finish(result))
            }
            _ => ClickOutcome::Revealed,
        }
    }

    fn mark_at(&mut self, coords: Coord2) -> ClickOutcome {
        if self.board[coords].is_revealed() {
            return ClickOutcome::NoChange;
        }

        self.info.right_clicks += 1;
        self.log_action(coords, Button::Right);

        let cell = self.board.cell_mut(coords);
        let before = cell.mark;
        let after = before.cycle(self.question_marks);
        cell.mark = after;

        if before.is_flag() {
            self.info.flags_placed -= 1;
        }
        if after.is_flag() {
            self.info.flags_placed += 1;
        }

        self.events
            .push_back(SessionEvent::Progress(ProgressReport::from(&self.info)));
        ClickOutcome::Marked(after)
    }

    fn start(&mut self) {
        let now = self.clock.now_ms();
        self.info.start_ms = now;
        self.info.last_tick_ms = now;
        self.state = SessionState::Running;
        log::debug!("Session started at {now}");
    }

    fn log_action(&mut self, coords: Coord2, button: Button) {
        let action_number = self.info.play_log.len() + 1;
        let action = PlayAction::new(
            coords,
            button,
            action_number,
            self.info.elapsed_seconds(),
        );
        self.info.play_log.push(action);
    }

    fn finish(&mut self, result: GameResult) -> GameResult {
        self.state = result.into();
        self.info.result = Some(result);
        log::debug!(
            "Session finished: {:?} after {} s, 3BV {}/{}",
            result,
            self.info.elapsed_display(),
            self.info.tally.three_bv_solved,
            self.info.three_bv_total
        );

        let leaderboard = matches!(result, GameResult::Cleared).then(|| self.board_params());
        self.events.push_back(SessionEvent::Finished(FinishReport {
            result,
            info: self.info.clone(),
            leaderboard,
        }));
        result
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(
        size: Coord2,
        bombs: &[Coord2],
        question_marks: bool,
    ) -> (GameSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000);
        let board = Board::from_bomb_coords(size, bombs).unwrap();
        (GameSession::from_board(board, question_marks, clock.clone()), clock)
    }

    #[test]
    fn first_left_click_starts_timer() {
        let (mut session, clock) = session((3, 3), &[(2, 2)], false);
        assert_eq!(session.state(), SessionState::Ready);

        clock.set(5_000);
        assert_eq!(session.click((1, 1), Button::Left), Ok(ClickOutcome::Revealed));

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.info().start_ms, 5_000);
        assert_eq!(session.info().left_clicks, 1);
    }

    #[test]
    fn marking_in_ready_leaves_timer_stopped() {
        let (mut session, clock) = session((3, 3), &[(2, 2)], false);

        clock.set(2_000);
        assert_eq!(
            session.click((2, 2), Button::Right),
            Ok(ClickOutcome::Marked(MarkState::Flag))
        );
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.info().flags_placed, 1);
        assert_eq!(session.info().bombs_remaining(), 0);
        assert_eq!(session.info().play_log[0].elapsed_seconds, 0.0);
        assert_eq!(session.tick(), None);

        clock.set(9_000);
        session.click((0, 0), Button::Left).unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.info().start_ms, 9_000);

        clock.advance(500);
        let report = session.tick().unwrap();
        assert_eq!(report.elapsed_display, "000.50");
    }

    #[test]
    fn mark_cycle_tracks_flags() {
        let (mut session, _) = session((3, 3), &[(2, 2)], true);

        session.click((0, 0), Button::Right).unwrap();
        assert_eq!(session.info().flags_placed, 1);
        session.click((0, 0), Button::Right).unwrap();
        assert_eq!(session.board()[(0, 0)].mark(), MarkState::Question);
        assert_eq!(session.info().flags_placed, 0);
        session.click((0, 0), Button::Right).unwrap();
        assert_eq!(session.board()[(0, 0)].mark(), MarkState::None);
        assert_eq!(session.info().right_clicks, 3);
        assert_eq!(session.info().play_log.len(), 3);
    }

    #[test]
    fn explosion_reveals_bombs_and_ends() {
        let (mut session, _) = session((3, 3), &[(0, 0), (2, 2)], false);

        assert_eq!(
            session.click((0, 0), Button::Left),
            Ok(ClickOutcome::Finished(GameResult::Exploded))
        );
        assert!(session.board()[(2, 2)].is_revealed());
        assert_eq!(session.info().result, Some(GameResult::Exploded));
        assert_eq!(
            session.click((1, 1), Button::Left),
            Err(GameError::AlreadyEnded)
        );
        assert_eq!(
            session.click((1, 1), Button::Right),
            Err(GameError::AlreadyEnded)
        );
    }

    #[test]
    fn clearing_emits_leaderboard_params() {
        let (mut session, _) = session((4, 1), &[(3, 0)], false);

        assert_eq!(
            session.click((0, 0), Button::Left),
            Ok(ClickOutcome::Finished(GameResult::Cleared))
        );

        let finished = session
            .drain_events()
            .find_map(|event| match event {
                SessionEvent::Finished(report) => Some(report),
                _ => None,
            })
            .unwrap();
        assert_eq!(finished.result, GameResult::Cleared);
        assert_eq!(finished.info.tally.three_bv_solved, 1);
        let params = finished.leaderboard.unwrap();
        assert_eq!((params.width, params.height), (4, 1));
        assert_eq!(params.difficulty, Difficulty::Custom);
    }

    #[test]
    fn exploded_report_has_no_leaderboard() {
        let (mut session, _) = session((2, 1), &[(0, 0)], false);
        session.click((0, 0), Button::Left).unwrap();

        let report = session
            .drain_events()
            .find_map(|event| match event {
                SessionEvent::Finished(report) => Some(report),
                _ => None,
            })
            .unwrap();
        assert_eq!(report.leaderboard, None);
    }

    #[test]
    fn clicks_on_revealed_cells_are_ignored() {
        let (mut session, _) = session((3, 3), &[(2, 2)], false);
        session.click((1, 1), Button::Left).unwrap();

        assert_eq!(session.click((1, 1), Button::Left), Ok(ClickOutcome::NoChange));
        assert_eq!(session.click((1, 1), Button::Right), Ok(ClickOutcome::NoChange));
        assert_eq!(session.info().play_log.len(), 1);
        assert_eq!(session.info().left_clicks, 1);
    }

    #[test]
    fn out_of_range_click_is_an_error() {
        let (mut session, _) = session((3, 3), &[(2, 2)], false);
        assert_eq!(
            session.click((3, 0), Button::Left),
            Err(GameError::InvalidCoords)
        );
        assert!(session.info().play_log.is_empty());
    }

    #[test]
    fn tick_updates_elapsed_and_rates() {
        let (mut session, clock) = session((3, 3), &[(2, 2)], false);
        session.click((1, 1), Button::Left).unwrap();

        clock.advance(2_004);
        let report = session.tick().unwrap();

        assert_eq!(report.elapsed_display, "002.00");
        assert_eq!(report.elapsed_seconds, 2.0);
        assert_eq!(report.three_bv_per_second, 0.5);
        assert_eq!(
            report.estimated_time,
            f64::from(session.info().three_bv_total) / 0.5
        );

        clock.advance(99_000);
        let report = session.tick().unwrap();
        assert_eq!(report.elapsed_display, "101.00");
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn stalled_timer_is_illegal() {
        let (mut session, clock) = session((3, 3), &[(2, 2)], false);
        session.click((1, 1), Button::Left).unwrap();

        clock.advance(STALL_THRESHOLD_MS);
        assert!(session.tick().is_some());

        clock.advance(STALL_THRESHOLD_MS + 1);
        assert_eq!(session.tick(), None);
        assert_eq!(session.state(), SessionState::Illegal);
        assert_eq!(session.info().result, Some(GameResult::Illegal));
        assert_eq!(
            session.click((0, 0), Button::Left),
            Err(GameError::AlreadyEnded)
        );
    }

    #[test]
    fn log_entries_carry_elapsed_time_and_codes() {
        let (mut session, clock) = session((3, 3), &[(2, 2)], false);
        session.click((1, 1), Button::Left).unwrap();
        clock.advance(1_500);
        session.tick();
        session.click((2, 2), Button::Right).unwrap();

        let log = &session.info().play_log;
        assert_eq!(log[0].elapsed_seconds, 0.0);
        assert_eq!(log[1].elapsed_seconds, 1.5);
        assert_eq!(log[1].button, Button::Right);
        assert_eq!(log[1].verification_code, verification_code((2, 2), 2));
    }

    #[test]
    fn rebuild_of_seeded_session_reproduces_board() {
        let config = GameConfig::preset(Difficulty::Easy).with_seed(SeedChoice::Explicit(42));
        let mut session = GameSession::new(config, ManualClock::new(0));
        let bombs = session.board().bomb_coords();
        let safe = session
            .board()
            .iter_cells()
            .find(|cell| !cell.is_bomb())
            .map(Cell::coords)
            .unwrap();
        session.click(safe, Button::Left).unwrap();

        session.rebuild();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.board().bomb_coords(), bombs);
        assert_eq!(session.board().revealed_count(), 0);
        assert!(session.info().play_log.is_empty());
        assert_eq!(session.board_params().difficulty, Difficulty::Easy);
    }

    #[test]
    fn elapsed_display_pads_and_grows() {
        let short = SessionInfo {
            elapsed_centis: 345,
            ..Default::default()
        };
        assert_eq!(short.elapsed_display(), "003.45");

        let long = SessionInfo {
            elapsed_centis: 123_456,
            ..Default::default()
        };
        assert_eq!(long.elapsed_display(), "1234.56");
    }
}
