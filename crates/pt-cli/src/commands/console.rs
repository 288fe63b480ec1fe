//! Console command implementation

use anyhow::Result;
use pt_core::config::ConsoleConfig;
use pt_core::{PanelClient, ServerId};

use crate::console::{
    ConsoleSession, CrosstermScreen, EndReason, SessionOutcome, TerminalInput,
};
use crate::output::{print_error, print_info, print_warning};

/// Open an interactive console on `server` and block until it ends
pub async fn console_command(
    client: &PanelClient,
    config: &ConsoleConfig,
    server: &ServerId,
) -> Result<SessionOutcome> {
    print_info(&format!(
        "Connecting to {} (type '{}' or press Ctrl+C to leave)",
        server, config.exit_token
    ));

    // Raw mode is entered once the socket is authenticated
    let screen = CrosstermScreen::new();
    let session = ConsoleSession::new(
        config,
        Some(client.base_url().to_string()),
        Box::new(TerminalInput::new()),
        Box::new(screen),
    );

    // The screen is dropped inside `run`, restoring the terminal
    let outcome = session.run(client, server).await;
    report_outcome(&outcome);
    Ok(outcome)
}

/// Print a one-line summary of how a session ended
pub fn report_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Ended(EndReason::ExitRequested | EndReason::InputClosed) => {
            print_info("Console closed");
        }
        SessionOutcome::Ended(EndReason::ClosedByPeer) => {
            print_warning("Server closed the console connection");
        }
        SessionOutcome::Failed(e) => {
            print_error(&format!("Console session failed: {}", e));
        }
    }
}
