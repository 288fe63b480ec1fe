//! CLI command implementations

mod config;
mod console;
mod files;
mod menu;
mod power;
mod servers;

pub use config::{config_get, config_init, config_path, config_set, config_show};
pub use console::{console_command, report_outcome};
pub use files::{files_command, FilesAction};
pub use menu::menu_command;
pub use power::{power_command, resources_command, send_command};
pub use servers::servers_command;

use std::io::{BufRead, Write};

use anyhow::Result;

/// Ask a yes/no question on stdin; anything but `y` is a no
pub(crate) fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
