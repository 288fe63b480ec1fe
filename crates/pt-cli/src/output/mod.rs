//! Output formatting utilities for the CLI
//!
//! This module provides functions for formatting panel data as
//! human-readable terminal output, including tables for servers and
//! files, resource summaries, and colored status messages.

use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use pt_core::types::{FileEntry, ResourceUsage, ServerSummary};

/// Format a list of servers as a table
///
/// Rows are numbered from 1 so the interactive menu can refer to them.
///
/// # Arguments
/// * `servers` - Servers to display
/// * `detailed` - If true, includes node, UUID and limit columns
pub fn format_servers(servers: &[ServerSummary], detailed: bool) -> String {
    if servers.is_empty() {
        return "No servers available".to_string();
    }

    #[derive(Tabled)]
    struct ServerRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "DESCRIPTION")]
        description: String,
    }

    #[derive(Tabled)]
    struct ServerRowDetailed {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "NODE")]
        node: String,
        #[tabled(rename = "MEMORY")]
        memory: String,
        #[tabled(rename = "DISK")]
        disk: String,
        #[tabled(rename = "CPU")]
        cpu: String,
        #[tabled(rename = "UUID")]
        uuid: String,
    }

    if detailed {
        let rows: Vec<ServerRowDetailed> = servers
            .iter()
            .enumerate()
            .map(|(i, s)| ServerRowDetailed {
                index: i + 1,
                id: s.identifier.clone(),
                name: suspended_marker(&s.name, s.is_suspended),
                node: or_dash(&s.node),
                memory: format_limit(s.limits.memory, "MiB"),
                disk: format_limit(s.limits.disk, "MiB"),
                cpu: format_limit(s.limits.cpu, "%"),
                uuid: or_dash(&s.uuid),
            })
            .collect();

        Table::new(rows)
            .with(Style::rounded())
            .with(Width::wrap(120))
            .to_string()
    } else {
        let rows: Vec<ServerRow> = servers
            .iter()
            .enumerate()
            .map(|(i, s)| ServerRow {
                index: i + 1,
                id: s.identifier.clone(),
                name: suspended_marker(&s.name, s.is_suspended),
                description: truncate(&or_dash(&s.description), 40),
            })
            .collect();

        Table::new(rows).with(Style::rounded()).to_string()
    }
}

/// Format a directory listing as a table, directories first
pub fn format_files(entries: &[FileEntry]) -> String {
    if entries.is_empty() {
        return "Directory is empty".to_string();
    }

    #[derive(Tabled)]
    struct FileRow {
        #[tabled(rename = "MODE")]
        mode: String,
        #[tabled(rename = "SIZE")]
        size: String,
        #[tabled(rename = "MODIFIED")]
        modified: String,
        #[tabled(rename = "NAME")]
        name: String,
    }

    let mut sorted: Vec<&FileEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.is_file.cmp(&b.is_file).then_with(|| a.name.cmp(&b.name)));

    let rows: Vec<FileRow> = sorted
        .into_iter()
        .map(|f| FileRow {
            mode: or_dash(&f.mode),
            size: if f.is_file {
                format_size(f.size)
            } else {
                "-".to_string()
            },
            modified: truncate(&or_dash(&f.modified_at), 19),
            name: if f.is_file {
                f.name.clone()
            } else {
                format!("{}/", f.name)
            },
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format a server's power state and resource usage
pub fn format_resources(usage: &ResourceUsage) -> String {
    let r = &usage.resources;
    let mut output = String::new();

    output.push_str(&format!("State: {}\n", usage.current_state));
    if usage.is_suspended {
        output.push_str("Suspended: yes\n");
    }
    output.push_str(&format!("CPU: {:.1}%\n", r.cpu_absolute));
    output.push_str(&format!("Memory: {}\n", format_size(r.memory_bytes)));
    output.push_str(&format!("Disk: {}\n", format_size(r.disk_bytes)));
    output.push_str(&format!(
        "Network: {} in / {} out\n",
        format_size(r.network_rx_bytes),
        format_size(r.network_tx_bytes)
    ));
    output.push_str(&format!("Uptime: {}\n", format_duration(r.uptime / 1000)));

    output
}

/// Format a byte count with binary units
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Format duration in human-readable form
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", mins, remaining_secs)
    } else if secs < 86400 {
        let hours = secs / 3600;
        let remaining_mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, remaining_mins)
    } else {
        let days = secs / 86400;
        let remaining_hours = (secs % 86400) / 3600;
        format!("{}d {}h", days, remaining_hours)
    }
}

fn format_limit(value: u64, unit: &str) -> String {
    if value == 0 {
        "unlimited".to_string()
    } else {
        format!("{} {}", value, unit)
    }
}

fn suspended_marker(name: &str, suspended: bool) -> String {
    if suspended {
        format!("{} (suspended)", name)
    } else {
        name.to_string()
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
