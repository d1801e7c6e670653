use serde::{Deserialize, Serialize};

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Per-user count of completed focus work phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTally {
    pub owner_id: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroPhase {
    Work,
    Break,
}

/// Result of advancing the timer by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running,
    /// The named phase just finished; the timer has flipped to the other
    /// phase and reloaded its duration.
    PhaseEnded(PomodoroPhase),
}

/// Pure countdown state machine behind the focus timer screen. The caller
/// owns the clock: call [`PomodoroTimer::tick`] once per elapsed second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroTimer {
    work_secs: u32,
    break_secs: u32,
    phase: PomodoroPhase,
    remaining: u32,
}

impl PomodoroTimer {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        let work_secs = work_minutes * 60;
        Self {
            work_secs,
            break_secs: break_minutes * 60,
            phase: PomodoroPhase::Work,
            remaining: work_secs,
        }
    }

    pub fn phase(&self) -> PomodoroPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    /// Advance one second. On reaching zero the phase flips and the other
    /// duration is loaded; the finished phase is reported so the caller
    /// can bump the tally or accrue worked time.
    pub fn tick(&mut self) -> Tick {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Tick::Running;
        }
        let ended = self.phase;
        self.phase = match ended {
            PomodoroPhase::Work => PomodoroPhase::Break,
            PomodoroPhase::Break => PomodoroPhase::Work,
        };
        self.remaining = match self.phase {
            PomodoroPhase::Work => self.work_secs,
            PomodoroPhase::Break => self.break_secs,
        };
        Tick::PhaseEnded(ended)
    }

    /// Reload the current phase's full duration.
    pub fn reset(&mut self) {
        self.remaining = match self.phase {
            PomodoroPhase::Work => self.work_secs,
            PomodoroPhase::Break => self.break_secs,
        };
    }

    /// "MM:SS" display of the remaining time.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}
