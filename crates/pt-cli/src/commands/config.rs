//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use pt_core::config;

/// Keys whose values are masked by `config show`
const SECRET_KEYS: &[&str] = &["panel.api_key"];

fn resolve_path(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(config::default_config_path)
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| "Failed to parse config file")
}

/// Look up a dotted key (e.g. `console.debounce_ms`)
fn lookup<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    let mut parts = key.split('.');
    let mut current = table.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Parse a command-line value into the most specific TOML type
fn parse_value(value: &str) -> toml::Value {
    if value == "true" {
        toml::Value::Boolean(true)
    } else if value == "false" {
        toml::Value::Boolean(false)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn mask_secrets(table: &mut toml::Table) {
    for key in SECRET_KEYS {
        let Some((section, field)) = key.split_once('.') else {
            continue;
        };
        if let Some(toml::Value::String(secret)) = table
            .get_mut(section)
            .and_then(|v| v.as_table_mut())
            .and_then(|t| t.get_mut(field))
        {
            if !secret.is_empty() {
                *secret = "********".to_string();
            }
        }
    }
}

/// Get a config value by key
pub fn config_get(config_path: Option<&PathBuf>, key: &str) -> Result<()> {
    let path = resolve_path(config_path);

    if !path.exists() {
        print_error(&format!("Config file not found: {:?}", path));
        print_info("Run 'paneltty config init' to create one");
        return Ok(());
    }

    let table = read_table(&path)?;
    let Some(value) = lookup(&table, key) else {
        print_error(&format!("Key not found: {}", key));
        return Ok(());
    };

    match value {
        toml::Value::String(s) => println!("{}", s),
        toml::Value::Array(a) => {
            for item in a {
                println!("{}", item);
            }
        }
        toml::Value::Table(_) => println!("{}", toml::to_string_pretty(value)?),
        other => println!("{}", other),
    }

    Ok(())
}

/// Set a config value by key
pub fn config_set(config_path: Option<&PathBuf>, key: &str, value: &str) -> Result<()> {
    let path = resolve_path(config_path);

    if !path.exists() {
        print_info("Creating default configuration...");
        config_init(Some(&path), false)?;
    }

    let mut table = read_table(&path)?;

    let parts: Vec<&str> = key.split('.').collect();
    let Some((last_key, parents)) = parts.split_last() else {
        anyhow::bail!("Invalid key: key path cannot be empty");
    };
    if last_key.is_empty() {
        anyhow::bail!("Invalid key: {}", key);
    }

    let mut current = &mut table;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Cannot navigate to key: {}", key))?;
    }
    current.insert(last_key.to_string(), parse_value(value));

    // Reject values the typed config cannot load
    let rendered = toml::to_string_pretty(&table)?;
    toml::from_str::<config::ConfigFile>(&rendered)
        .with_context(|| format!("Invalid value for {}: {}", key, value))?;

    std::fs::write(&path, rendered)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Show current configuration with secrets masked
pub fn config_show(config_path: Option<&PathBuf>) -> Result<()> {
    let path = resolve_path(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'paneltty config init' to create one");
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();

    let mut table = read_table(&path)?;
    mask_secrets(&mut table);
    println!("{}", toml::to_string_pretty(&table)?);

    Ok(())
}

/// Print the configuration file path
pub fn config_path(config_path: Option<&PathBuf>) {
    println!("{}", resolve_path(config_path).display());
}

/// Initialize default configuration
pub fn config_init(config_path: Option<&PathBuf>, force: bool) -> Result<()> {
    let config_file = resolve_path(config_path);
    let config_dir = config_file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_dir);

    if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
        print_success(&format!("Created config directory: {:?}", config_dir));
    }

    if config_file.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", config_file));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(&config_file, generate_default_config())
        .with_context(|| format!("Failed to write config file: {:?}", config_file))?;

    print_success(&format!("Created configuration file: {:?}", config_file));
    print_info("Set your panel with 'paneltty config set panel.url https://panel.example.com'");
    print_info("and your client API key with 'paneltty config set panel.api_key ptlc_...'");

    Ok(())
}

/// Generate default configuration content
fn generate_default_config() -> String {
    r#"# paneltty configuration

[panel]
# Base URL of the panel
url = ""

# Client API key (Account -> API Credentials)
api_key = ""

# HTTP request timeout in seconds
request_timeout = 15

[console]
# Quiet period after console output before it is drawn
debounce_ms = 50

# Typing this line leaves the console
exit_token = "!exit"

# Prompt in front of the input line
prompt = "> "

# Socket handshake timeout in seconds
connect_timeout = 10

# How long to wait for the daemon to acknowledge a close
close_grace_ms = 2000

# Send the panel URL as the socket Origin header
send_origin = true
"#
    .to_string()
}
