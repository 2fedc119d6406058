//! One-shot delayed commands

use crate::command::MotorCommand;
use std::time::Duration;

/// A command that becomes due once, after a fixed delay.
///
/// Time is advanced explicitly by the tick loop so the delay is deterministic
/// under test.
#[derive(Debug, Clone)]
pub struct DeferredCommand {
    command: MotorCommand,
    remaining: Duration,
    fired: bool,
}

impl DeferredCommand {
    /// Schedule `command` to fire after `delay`
    pub fn new(command: MotorCommand, delay: Duration) -> Self {
        Self {
            command,
            remaining: delay,
            fired: false,
        }
    }

    /// Advance by `dt`. Returns the command exactly once, on the tick the delay elapses.
    pub fn advance(&mut self, dt: Duration) -> Option<MotorCommand> {
        if self.fired {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.fired = true;
            Some(self.command)
        } else {
            None
        }
    }

    /// Whether the command has already been released
    pub fn is_fired(&self) -> bool {
        self.fired
    }
}
