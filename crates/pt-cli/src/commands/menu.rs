//! Interactive server selection menu

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use pt_core::config::ConsoleConfig;
use pt_core::types::ServerSummary;
use pt_core::PanelClient;

use super::console::console_command;
use crate::output::{format_servers, print_error, print_warning};

/// What the operator picked at the menu prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Open(usize),
    Refresh,
    Quit,
    Invalid(String),
}

fn parse_choice(input: &str, count: usize) -> Choice {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Choice::Quit,
        "" | "r" | "refresh" => return Choice::Refresh,
        _ => {}
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Choice::Open(n - 1),
        _ => Choice::Invalid(input.to_string()),
    }
}

/// List servers, open a console on the chosen one, and come back here when
/// it ends. Returns when the operator quits or stdin closes.
pub async fn menu_command(client: &PanelClient, config: &ConsoleConfig) -> Result<()> {
    let mut servers: Vec<ServerSummary> = Vec::new();
    let mut refresh = true;

    loop {
        if refresh {
            servers = client
                .list_servers()
                .await
                .context("Failed to list servers")?;
            refresh = false;
        }

        println!("{}", format_servers(&servers, false));
        if servers.is_empty() {
            return Ok(());
        }

        print!("Select a server [1-{}], r to refresh, q to quit: ", servers.len());
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(());
        }

        match parse_choice(&input, servers.len()) {
            Choice::Quit => return Ok(()),
            Choice::Refresh => refresh = true,
            Choice::Invalid(text) => print_warning(&format!("Not a valid choice: '{}'", text)),
            Choice::Open(index) => {
                let server = &servers[index];
                if server.is_suspended {
                    print_warning(&format!("{} is suspended", server.name));
                    continue;
                }
                // Failures are reported by the session; the menu carries on
                if let Err(e) = console_command(client, config, &server.id()).await {
                    print_error(&format!("{:#}", e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("2\n", 3), Choice::Open(1));
        assert_eq!(parse_choice(" Q ", 3), Choice::Quit);
        assert_eq!(parse_choice("", 3), Choice::Refresh);
        assert_eq!(parse_choice("4", 3), Choice::Invalid("4".to_string()));
        assert_eq!(parse_choice("0", 3), Choice::Invalid("0".to_string()));
        assert_eq!(parse_choice("abc", 3), Choice::Invalid("abc".to_string()));
    }
}
