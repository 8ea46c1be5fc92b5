use std::str::FromStr;

use serde::Serialize;
use tracing::info;
use weighbridge_application::{LockDenialNotifier, ProcessLease};
use weighbridge_core::AppError;
use weighbridge_domain::LeaseSnapshot;

/// One line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Status,
    Select(String),
    Acquire,
    Ensure,
    Pause,
    Resume,
    Release,
    ReleaseFast,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();

        match (command.as_str(), argument) {
            ("status" | "", None) => Ok(Self::Status),
            ("select", Some(candidate)) => Ok(Self::Select(candidate.to_owned())),
            ("acquire", None) => Ok(Self::Acquire),
            ("ensure", None) => Ok(Self::Ensure),
            ("pause", None) => Ok(Self::Pause),
            ("resume", None) => Ok(Self::Resume),
            ("release", None) => Ok(Self::Release),
            ("release-fast", None) => Ok(Self::ReleaseFast),
            ("help" | "?", None) => Ok(Self::Help),
            ("quit" | "exit", None) => Ok(Self::Quit),
            _ => Err(AppError::Validation(format!(
                "unknown command '{}', type 'help' for the list",
                line.trim()
            ))),
        }
    }
}

pub const HELP: &str = "commands: status | select <process-id> | acquire | ensure | pause | \
resume | release | release-fast | help | quit";

/// Shows lock denials on the operator's terminal.
pub struct TerminalNotifier;

impl LockDenialNotifier for TerminalNotifier {
    fn explain(&self, message: &str) {
        info!(explanation = message, "workflow action blocked");
        eprintln!("{message}");
    }
}

#[derive(Debug, Serialize)]
struct ConsoleStatus<'a> {
    process_id: &'a str,
    #[serde(flatten)]
    snapshot: LeaseSnapshot,
}

/// Renders the lease state as a single JSON line.
pub fn render_status(lease: &ProcessLease) -> String {
    let status = ConsoleStatus {
        process_id: lease.candidate(),
        snapshot: lease.snapshot(),
    };

    serde_json::to_string(&status)
        .unwrap_or_else(|error| format!("{{\"error\":\"failed to render status: {error}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::ConsoleCommand;

    #[test]
    fn parses_known_commands() {
        let parse = |line: &str| line.parse::<ConsoleCommand>().ok();

        assert_eq!(parse("status"), Some(ConsoleCommand::Status));
        assert_eq!(parse(""), Some(ConsoleCommand::Status));
        assert_eq!(parse(" PAUSE "), Some(ConsoleCommand::Pause));
        assert_eq!(parse("release-fast"), Some(ConsoleCommand::ReleaseFast));
        assert_eq!(parse("exit"), Some(ConsoleCommand::Quit));
    }

    #[test]
    fn select_takes_the_candidate_verbatim() {
        let command = "select 123E4567-E89B-12D3-A456-426614174000".parse::<ConsoleCommand>();

        assert!(matches!(
            command,
            Ok(ConsoleCommand::Select(candidate))
                if candidate == "123E4567-E89B-12D3-A456-426614174000"
        ));
    }

    #[test]
    fn rejects_unknown_or_malformed_commands() {
        assert!("weigh".parse::<ConsoleCommand>().is_err());
        assert!("select".parse::<ConsoleCommand>().is_err());
        assert!("pause now".parse::<ConsoleCommand>().is_err());
    }
}
