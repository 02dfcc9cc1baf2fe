//! Daemon command handler - sends commands to running daemon via IPC

use serde_json::Value;

use super::args::DaemonAction;
use super::ipc::create_ipc_client;
use super::presenter::Presenter;

/// Socket command for an action
pub fn command_for(action: DaemonAction) -> &'static str {
    match action {
        DaemonAction::Start => "start",
        DaemonAction::Stop => "stop",
        DaemonAction::Toggle => "toggle",
        DaemonAction::Camera => "camera",
        DaemonAction::Mic => "mic",
        DaemonAction::Status => "status",
    }
}

/// Handle daemon subcommand
pub async fn handle_daemon_command(
    action: DaemonAction,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = create_ipc_client();

    if !client.is_daemon_running() {
        return Err("No daemon running. Start with: vibecam --daemon".to_string());
    }

    let cmd = command_for(action);
    let response = client
        .send_command(cmd)
        .await
        .map_err(|e| format!("Failed to communicate with daemon: {}", e))?;
    let response = response.trim();

    if let Some(stripped) = response.strip_prefix("error:") {
        return Err(stripped.trim().to_string());
    }

    match action {
        DaemonAction::Status => {
            // Pretty-print the snapshot; fall back to the raw line
            let pretty = serde_json::from_str::<Value>(response)
                .ok()
                .and_then(|v| serde_json::to_string_pretty(&v).ok())
                .unwrap_or_else(|| response.to_string());
            presenter.output(&pretty);
        }
        _ => presenter.info(&format!("Command sent: {}", cmd)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_distinct_command() {
        let actions = [
            DaemonAction::Start,
            DaemonAction::Stop,
            DaemonAction::Toggle,
            DaemonAction::Camera,
            DaemonAction::Mic,
            DaemonAction::Status,
        ];
        let mut commands: Vec<_> = actions.iter().map(|a| command_for(*a)).collect();
        commands.sort_unstable();
        commands.dedup();
        assert_eq!(commands.len(), actions.len());
    }

    #[test]
    fn control_commands_parse_on_the_daemon_side() {
        use crate::cli::signals::DaemonSignal;
        assert_eq!(
            DaemonSignal::from_command(command_for(DaemonAction::Toggle)),
            Some(DaemonSignal::Toggle)
        );
        assert!(DaemonSignal::from_command(command_for(DaemonAction::Status)).is_none());
    }
}
