//! Breath-count attention task.
//!
//! The user counts breaths 1-8 and closes each cycle explicitly. Any miscount
//! or a self-reported loss of count ends the run; surviving the whole budget
//! is a perfect run. The score is the fraction of the budget survived.

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

use super::scoring::task_score;

/// Breaths in one valid cycle.
pub const BREATHS_PER_CYCLE: u8 = 8;

/// Why a task run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationReason {
    /// The countdown reached zero with no violation.
    Perfect,
    /// "Next breath" pressed while the count was already at 8.
    BreathAfterEight,
    /// "Complete cycle" pressed at a count other than 8.
    WrongCount { breath: u8 },
    /// The user reported losing count.
    LostCount,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Perfect => write!(f, "Perfect! Completed full 3 minutes"),
            Self::BreathAfterEight => write!(f, "Miscount: Pressed breath after 8"),
            Self::WrongCount { breath } => write!(f, "Miscount: Completed at breath {breath}"),
            Self::LostCount => write!(f, "Self-reported: Lost count"),
        }
    }
}

/// Immutable result of one task run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub elapsed_secs: u32,
    pub duration_secs: u32,
    pub reason: TerminationReason,
    pub cycles_completed: u32,
}

impl TaskOutcome {
    /// Score on the 0-5 scale.
    pub fn score(&self) -> f64 {
        task_score(self.elapsed_secs, self.duration_secs)
    }
}

/// Live state of a task run.
#[derive(Debug, Clone)]
pub struct BreathCountTask {
    duration_secs: u32,
    remaining_secs: u32,
    breaths: u8,
    cycles: u32,
    outcome: Option<TaskOutcome>,
}

impl BreathCountTask {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            breaths: 0,
            cycles: 0,
            outcome: None,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn breaths(&self) -> u8 {
        self.breaths
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    fn elapsed_secs(&self) -> u32 {
        self.duration_secs - self.remaining_secs
    }

    fn ensure_running(&self) -> Result<(), AssessmentError> {
        if self.is_finished() {
            Err(AssessmentError::TaskFinished)
        } else {
            Ok(())
        }
    }

    /// Record a breath. A ninth breath without closing the cycle ends the run.
    pub fn next_breath(&mut self) -> Result<Option<TaskOutcome>, AssessmentError> {
        self.ensure_running()?;
        if self.breaths < BREATHS_PER_CYCLE {
            self.breaths += 1;
            return Ok(None);
        }
        Ok(Some(self.terminate(
            self.elapsed_secs(),
            TerminationReason::BreathAfterEight,
        )))
    }

    /// Close the current cycle. Only valid at exactly 8 breaths; anything
    /// else ends the run.
    pub fn complete_cycle(&mut self) -> Result<Option<TaskOutcome>, AssessmentError> {
        self.ensure_running()?;
        if self.breaths == BREATHS_PER_CYCLE {
            self.cycles += 1;
            self.breaths = 0;
            return Ok(None);
        }
        let breath = self.breaths;
        Ok(Some(self.terminate(
            self.elapsed_secs(),
            TerminationReason::WrongCount { breath },
        )))
    }

    /// Self-reported loss of count. Always ends the run.
    pub fn lost_count(&mut self) -> Result<TaskOutcome, AssessmentError> {
        self.ensure_running()?;
        Ok(self.terminate(self.elapsed_secs(), TerminationReason::LostCount))
    }

    /// Advance the countdown by one second. Returns the outcome when this
    /// tick exhausts the budget; ticks after termination are ignored.
    pub fn tick(&mut self) -> Option<TaskOutcome> {
        if self.is_finished() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.terminate(self.duration_secs, TerminationReason::Perfect));
        }
        None
    }

    fn terminate(&mut self, elapsed_secs: u32, reason: TerminationReason) -> TaskOutcome {
        let outcome = TaskOutcome {
            elapsed_secs,
            duration_secs: self.duration_secs,
            reason,
            cycles_completed: self.cycles,
        };
        self.outcome = Some(outcome);
        outcome
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
