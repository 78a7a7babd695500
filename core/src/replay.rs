use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::result::Result;

use crate::reveal::dig;
use crate::*;

/// Spacing between actions when a log is played back for spectators.
pub const REPLAY_STEP_MS: u64 = 200;

/// Proof that a play log clears its board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    pub three_bv_solved: CellCount,
    pub openings_triggered: CellCount,
    pub actions: usize,
}

/// Replays `log` on a fresh copy of `board` and checks that it really clears it.
///
/// Credits are given by [`classify_dig`], the same rule live play uses. Left clicks on
/// cells the replay already opened are skipped.
pub fn validate(board: &Board, log: &[PlayAction]) -> Result<Certificate, ReplayError> {
    if log.is_empty() {
        return Err(ReplayError::EmptyLog);
    }

    let mut scratch = board.pristine();
    let mut tally = Tally::default();

    for (index, action) in log.iter().enumerate() {
        let coords = scratch
            .checked_coords(action.x, action.y)
            .ok_or(ReplayError::OutOfRange { index })?;
        if action.verification_code != verification_code(coords, index + 1) {
            return Err(ReplayError::VerificationMismatch { index });
        }
        if action.button == Button::Right {
            continue;
        }

        let cell = &scratch[coords];
        if cell.is_bomb() {
            return Err(ReplayError::HitMine { index });
        }
        if cell.is_revealed() {
            log::trace!("Replay action #{index} digs an open cell, skipped");
            continue;
        }
        tally.record_dig(cell);
        dig(&mut scratch, coords);
    }

    if tally.three_bv_solved != board.three_bv_total() {
        return Err(ReplayError::Shortfall {
            solved: tally.three_bv_solved,
            total: board.three_bv_total(),
        });
    }

    Ok(Certificate {
        three_bv_solved: tally.three_bv_solved,
        openings_triggered: tally.openings_triggered,
        actions: log.len(),
    })
}

/// Final classification of a claimed win: [`GameResult::Cleared`] only if the log backs it up.
pub fn judge(board: &Board, log: &[PlayAction]) -> GameResult {
    match validate(board, log) {
        Ok(certificate) => {
            log::debug!("Win certified: {certificate:?}");
            GameResult::Cleared
        }
        Err(err) => {
            log::warn!("Rejected win: {err}");
            GameResult::Illegal
        }
    }
}

pub fn log_from_json(json: &str) -> Result<Vec<PlayAction>, ReplayError> {
    serde_json::from_str(json).map_err(|err| ReplayError::Malformed(err.to_string()))
}

pub fn log_to_json(log: &[PlayAction]) -> Result<String, ReplayError> {
    serde_json::to_string(log).map_err(|err| ReplayError::Malformed(err.to_string()))
}

/// Plays a recorded log back on its own session at a fixed pace, for display only.
///
/// Dropping the player cancels the playback; nothing it does feeds back into scoring.
#[derive(Debug)]
pub struct ReplayPlayer {
    session: GameSession<ManualClock>,
    clock: ManualClock,
    pending: VecDeque<PlayAction>,
    played: usize,
    next_due_ms: Option<u64>,
}

impl ReplayPlayer {
    pub fn new(board: &Board, question_marks: bool, log: Vec<PlayAction>) -> Self {
        let clock = ManualClock::new(0);
        Self {
            session: GameSession::from_board(board.pristine(), question_marks, clock.clone()),
            clock,
            pending: log.into(),
            played: 0,
            next_due_ms: None,
        }
    }

    pub fn session(&self) -> &GameSession<ManualClock> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession<ManualClock> {
        &mut self.session
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies every action due by `now_ms`, returning how many were applied.
    ///
    /// The first call starts the playback; the first action is due one step later. A bad
    /// action stops the playback and is reported; the display session is left as it was.
    pub fn advance(&mut self, now_ms: u64) -> Result<usize, ReplayError> {
        let mut due = *self
            .next_due_ms
            .get_or_insert(now_ms.saturating_add(REPLAY_STEP_MS));
        let mut applied = 0;

        while due <= now_ms {
            let Some(action) = self.pending.pop_front() else {
                break;
            };
            let index = self.played;
            self.played += 1;

            let Some(coords) = self.session.board().checked_coords(action.x, action.y) else {
                log::warn!("Replay stopped, action #{index} is outside the board");
                self.pending.clear();
                return Err(ReplayError::OutOfRange { index });
            };

            self.clock.set((action.elapsed_seconds.max(0.0) * 1000.0) as u64);
            if let Err(err) = self.session.click(coords, action.button) {
                log::warn!("Replay stopped at action #{index}: {err}");
                self.pending.clear();
                break;
            }

            applied += 1;
            due = due.saturating_add(REPLAY_STEP_MS);
        }

        self.next_due_ms = Some(due);
        Ok(applied)
    }
}
