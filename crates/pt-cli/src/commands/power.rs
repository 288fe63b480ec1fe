//! One-shot server commands: power, resources and console commands

use anyhow::{Context, Result};
use pt_core::{PanelClient, PowerSignal, ServerId};

use super::confirm;
use crate::output::{format_resources, print_success, print_warning};

/// Send a power signal
///
/// `kill` terminates the server without a graceful shutdown, so it asks for
/// confirmation unless `force` is set.
pub async fn power_command(
    client: &PanelClient,
    server: &ServerId,
    signal: PowerSignal,
    force: bool,
) -> Result<()> {
    if signal == PowerSignal::Kill && !force {
        print_warning(&format!(
            "About to kill {} without a graceful shutdown. Use --force to skip confirmation.",
            server
        ));
        if !confirm("Continue?")? {
            print_warning("Aborted");
            return Ok(());
        }
    }

    client
        .power(server, signal)
        .await
        .with_context(|| format!("Failed to send '{}' to {}", signal, server))?;

    print_success(&format!("Sent '{}' to {}", signal, server));
    Ok(())
}

/// Show power state and resource usage
pub async fn resources_command(client: &PanelClient, server: &ServerId) -> Result<()> {
    let usage = client
        .resources(server)
        .await
        .with_context(|| format!("Failed to fetch resources for {}", server))?;

    print!("{}", format_resources(&usage));
    Ok(())
}

/// Run a single console command without opening a session
pub async fn send_command(client: &PanelClient, server: &ServerId, command: &[String]) -> Result<()> {
    let command = command.join(" ");
    let command = command.trim();
    if command.is_empty() {
        anyhow::bail!("No command given");
    }

    client
        .send_command(server, command)
        .await
        .with_context(|| format!("Failed to send command to {}", server))?;

    print_success(&format!("Sent '{}' to {}", command, server));
    Ok(())
}
