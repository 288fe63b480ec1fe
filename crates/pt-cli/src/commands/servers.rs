//! Servers command implementation

use anyhow::{Context, Result};
use pt_core::PanelClient;

use crate::output::format_servers;

/// List the servers the API key can access
pub async fn servers_command(client: &PanelClient, long: bool) -> Result<()> {
    let servers = client
        .list_servers()
        .await
        .context("Failed to list servers")?;

    println!("{}", format_servers(&servers, long));
    Ok(())
}
