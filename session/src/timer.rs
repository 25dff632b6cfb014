//! Scheduled-refresh timer as an explicit state machine.
//!
//! DESIGN
//! ======
//! The store feeds every token transition and refresh outcome through
//! [`RefreshTimer::apply`] and performs whatever [`TimerAction`] comes back.
//! Each armed timer carries a generation number; a running loop whose
//! generation is no longer current exits at its next wake-up, and the store
//! also aborts it outright, so two timers never run side by side.
//!
//! | state \ event | TokenAcquired | LoginSucceeded | TokenLost / Teardown | RefreshSucceeded | ScheduledRefreshFailed |
//! |---|---|---|---|---|---|
//! | Stopped | arm, Start | arm, Start | - | reset count | - |
//! | Armed   | - | re-arm, Restart | stop, Cancel | reset count | count; at max halt, Cancel |
//! | Halted  | arm, Start | arm, Start | stop | reset count | - |

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Armed { generation: u64 },
    /// Too many consecutive scheduled failures; waits for the next login.
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// A token became present (bootstrap restored one).
    TokenAcquired,
    /// A login completed; always recreates the timer.
    LoginSucceeded,
    TokenLost,
    Teardown,
    /// Any refresh (manual, scheduled, visibility) completed successfully.
    RefreshSucceeded,
    ScheduledRefreshFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    None,
    Start { generation: u64 },
    /// Cancel the running loop, then start a new one.
    Restart { generation: u64 },
    Cancel,
}

#[derive(Clone, Debug)]
pub struct RefreshTimer {
    state: TimerState,
    generation: u64,
    failures: u32,
    max_failures: u32,
}

impl RefreshTimer {
    #[must_use]
    pub fn new(max_failures: u32) -> Self {
        Self { state: TimerState::Stopped, generation: 0, failures: 0, max_failures: max_failures.max(1) }
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Consecutive failed scheduled refreshes.
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Whether a loop started for `generation` should keep running.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.state == TimerState::Armed { generation }
    }

    pub fn apply(&mut self, event: TimerEvent) -> TimerAction {
        match (self.state, event) {
            (TimerState::Armed { .. }, TimerEvent::TokenAcquired) => TimerAction::None,
            (TimerState::Stopped | TimerState::Halted, TimerEvent::TokenAcquired | TimerEvent::LoginSucceeded) => {
                self.failures = 0;
                TimerAction::Start { generation: self.arm() }
            }
            (TimerState::Armed { .. }, TimerEvent::LoginSucceeded) => {
                self.failures = 0;
                TimerAction::Restart { generation: self.arm() }
            }
            (TimerState::Armed { .. }, TimerEvent::TokenLost | TimerEvent::Teardown) => {
                self.state = TimerState::Stopped;
                self.failures = 0;
                TimerAction::Cancel
            }
            (TimerState::Halted, TimerEvent::TokenLost | TimerEvent::Teardown) => {
                self.state = TimerState::Stopped;
                self.failures = 0;
                TimerAction::None
            }
            (_, TimerEvent::RefreshSucceeded) => {
                self.failures = 0;
                TimerAction::None
            }
            (TimerState::Armed { .. }, TimerEvent::ScheduledRefreshFailed) => {
                self.failures += 1;
                if self.failures >= self.max_failures {
                    self.state = TimerState::Halted;
                    TimerAction::Cancel
                } else {
                    TimerAction::None
                }
            }
            (TimerState::Stopped, TimerEvent::TokenLost | TimerEvent::Teardown)
            | (TimerState::Stopped | TimerState::Halted, TimerEvent::ScheduledRefreshFailed) => TimerAction::None,
        }
    }

    fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.state = TimerState::Armed { generation: self.generation };
        self.generation
    }
}
