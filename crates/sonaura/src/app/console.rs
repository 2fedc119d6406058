//! Operator console on stdin

use crossbeam_channel::Sender;
use sonaura_control::MotorCommand;
use sonaura_core::SessionEvent;
use std::io::BufRead;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Send a motor command
    Motor(MotorCommand),
    /// Print the session status
    Status,
    /// Stop the installation
    Quit,
}

impl ConsoleCommand {
    /// Parse one line; unknown input yields `None`
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(ConsoleCommand::Motor(MotorCommand::RotateLeft)),
            "right" | "r" => Some(ConsoleCommand::Motor(MotorCommand::RotateRight)),
            "debug" | "d" => Some(ConsoleCommand::Motor(MotorCommand::DebugRequest)),
            "status" | "s" => Some(ConsoleCommand::Status),
            "quit" | "q" | "exit" => Some(ConsoleCommand::Quit),
            _ => None,
        }
    }
}

/// Operator request handled by the tick loop itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRequest {
    /// Print the session status
    Status,
    /// Stop the installation
    Quit,
}

/// Route a parsed command: motor commands to the session queue, the rest to
/// `control`. Returns `false` once the receiving side is gone.
fn dispatch(
    command: ConsoleCommand,
    events: &Sender<SessionEvent>,
    control: &Sender<ConsoleRequest>,
) -> bool {
    match command {
        ConsoleCommand::Motor(command) => events.send(SessionEvent::Command(command)).is_ok(),
        ConsoleCommand::Status => control.send(ConsoleRequest::Status).is_ok(),
        ConsoleCommand::Quit => control.send(ConsoleRequest::Quit).is_ok(),
    }
}

/// Read stdin on a background thread.
///
/// Motor commands go straight to the session queue; status and quit go to
/// `control`. The thread ends at EOF.
pub fn spawn(
    events: Sender<SessionEvent>,
    control: Sender<ConsoleRequest>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let delivered = match ConsoleCommand::parse(&line) {
                    Some(command) => dispatch(command, &events, &control),
                    None => {
                        warn!(
                            "Unknown command '{}' (left, right, debug, status, quit)",
                            line.trim()
                        );
                        true
                    }
                };
                if !delivered {
                    break;
                }
            }
            debug!("Console input closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            ConsoleCommand::parse("left"),
            Some(ConsoleCommand::Motor(MotorCommand::RotateLeft))
        );
        assert_eq!(
            ConsoleCommand::parse("  R \n"),
            Some(ConsoleCommand::Motor(MotorCommand::RotateRight))
        );
        assert_eq!(
            ConsoleCommand::parse("Debug"),
            Some(ConsoleCommand::Motor(MotorCommand::DebugRequest))
        );
        assert_eq!(ConsoleCommand::parse("status"), Some(ConsoleCommand::Status));
        assert_eq!(ConsoleCommand::parse("exit"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("face"), None);
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let (control_tx, control_rx) = crossbeam_channel::unbounded();

        assert!(dispatch(
            ConsoleCommand::Motor(MotorCommand::RotateLeft),
            &events_tx,
            &control_tx
        ));
        assert!(dispatch(ConsoleCommand::Status, &events_tx, &control_tx));
        assert!(dispatch(ConsoleCommand::Quit, &events_tx, &control_tx));

        assert_eq!(
            events_rx.try_recv(),
            Ok(SessionEvent::Command(MotorCommand::RotateLeft))
        );
        assert!(events_rx.try_recv().is_err());
        assert_eq!(control_rx.try_recv(), Ok(ConsoleRequest::Status));
        assert_eq!(control_rx.try_recv(), Ok(ConsoleRequest::Quit));

        drop(control_rx);
        assert!(!dispatch(ConsoleCommand::Quit, &events_tx, &control_tx));
    }
}
