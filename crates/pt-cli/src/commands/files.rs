//! File management commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use pt_core::{PanelClient, ServerId};

use super::confirm;
use crate::output::{format_files, format_size, print_success, print_warning};

/// File operations on a server's file tree
///
/// Remote paths are absolute within the server (`/` is the server root).
#[derive(Subcommand, Debug, Clone)]
pub enum FilesAction {
    /// List a directory
    Ls {
        /// Directory to list
        #[arg(default_value = "/")]
        directory: String,
    },

    /// Print a text file
    Cat {
        /// File to print
        file: String,
    },

    /// Download a file
    Download {
        /// Remote file
        file: String,
        /// Local destination (defaults to the remote file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a local file, replacing the remote one
    Upload {
        /// Local file
        local: PathBuf,
        /// Remote destination
        remote: String,
    },

    /// Rename a file in place
    Rename {
        /// File to rename
        file: String,
        /// New name (no directory part)
        name: String,
    },

    /// Move a file to another path
    Mv {
        /// Current path
        from: String,
        /// New path
        to: String,
    },

    /// Duplicate a file next to itself
    Cp {
        /// File to copy
        file: String,
    },

    /// Delete files
    Rm {
        /// Files to delete
        #[arg(required = true)]
        files: Vec<String>,
        /// Delete without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Compress files into an archive in their directory
    Compress {
        /// Files to archive (must share a directory)
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Extract an archive into its directory
    Decompress {
        /// Archive to extract
        file: String,
    },

    /// Create a directory
    Mkdir {
        /// Directory to create
        path: String,
    },
}

/// Split an absolute remote path into its parent directory and final name
fn split_path(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    let absolute = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };
    match absolute.rsplit_once('/') {
        Some(("", name)) => ("/".to_string(), name.to_string()),
        Some((root, name)) => (root.to_string(), name.to_string()),
        None => ("/".to_string(), absolute),
    }
}

/// Group `files` by their common parent directory
fn common_root(files: &[String]) -> Result<(String, Vec<String>)> {
    let mut root: Option<String> = None;
    let mut names = Vec::with_capacity(files.len());

    for file in files {
        let (parent, name) = split_path(file);
        match &root {
            Some(existing) if *existing != parent => {
                anyhow::bail!(
                    "Files must share a directory ('{}' is not in '{}')",
                    file,
                    existing
                );
            }
            Some(_) => {}
            None => root = Some(parent),
        }
        names.push(name);
    }

    Ok((root.unwrap_or_else(|| "/".to_string()), names))
}

/// Execute a files subcommand
pub async fn files_command(client: &PanelClient, server: &ServerId, action: FilesAction) -> Result<()> {
    match action {
        FilesAction::Ls { directory } => {
            let entries = client
                .list_files(server, &directory)
                .await
                .with_context(|| format!("Failed to list {}", directory))?;
            println!("{}", format_files(&entries));
        }

        FilesAction::Cat { file } => {
            let contents = client
                .read_file(server, &file)
                .await
                .with_context(|| format!("Failed to read {}", file))?;
            print!("{}", contents);
        }

        FilesAction::Download { file, output } => {
            let bytes = client
                .download(server, &file)
                .await
                .with_context(|| format!("Failed to download {}", file))?;
            let output = output.unwrap_or_else(|| PathBuf::from(split_path(&file).1));
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("Failed to write {:?}", output))?;
            print_success(&format!(
                "Downloaded {} to {:?} ({})",
                file,
                output,
                format_size(bytes.len() as u64)
            ));
        }

        FilesAction::Upload { local, remote } => {
            let contents = tokio::fs::read(&local)
                .await
                .with_context(|| format!("Failed to read {:?}", local))?;
            let size = contents.len() as u64;
            client
                .upload(server, &remote, contents)
                .await
                .with_context(|| format!("Failed to upload {}", remote))?;
            print_success(&format!("Uploaded {:?} to {} ({})", local, remote, format_size(size)));
        }

        FilesAction::Rename { file, name } => {
            if name.contains('/') {
                anyhow::bail!("New name must not contain '/'; use 'mv' to move files");
            }
            let (root, from) = split_path(&file);
            client
                .rename(server, &root, &from, &name)
                .await
                .with_context(|| format!("Failed to rename {}", file))?;
            print_success(&format!("Renamed {} to {}", file, name));
        }

        FilesAction::Mv { from, to } => {
            let source = from.trim_start_matches('/');
            let target = to.trim_start_matches('/');
            client
                .rename(server, "/", source, target)
                .await
                .with_context(|| format!("Failed to move {}", from))?;
            print_success(&format!("Moved {} to {}", from, to));
        }

        FilesAction::Cp { file } => {
            client
                .copy(server, &file)
                .await
                .with_context(|| format!("Failed to copy {}", file))?;
            print_success(&format!("Copied {}", file));
        }

        FilesAction::Rm { files, force } => {
            let (root, names) = common_root(&files)?;
            if !force {
                print_warning(&format!(
                    "About to delete {} file(s) in {}. Use --force to skip confirmation.",
                    names.len(),
                    root
                ));
                if !confirm("Continue?")? {
                    print_warning("Aborted");
                    return Ok(());
                }
            }
            client
                .delete(server, &root, &names)
                .await
                .context("Failed to delete files")?;
            print_success(&format!("Deleted {} file(s)", names.len()));
        }

        FilesAction::Compress { files } => {
            let (root, names) = common_root(&files)?;
            let archive = client
                .compress(server, &root, &names)
                .await
                .context("Failed to compress files")?;
            print_success(&format!(
                "Created {} ({})",
                archive.name,
                format_size(archive.size)
            ));
        }

        FilesAction::Decompress { file } => {
            let (root, name) = split_path(&file);
            client
                .decompress(server, &root, &name)
                .await
                .with_context(|| format!("Failed to extract {}", file))?;
            print_success(&format!("Extracted {} into {}", file, root));
        }

        FilesAction::Mkdir { path } => {
            let (root, name) = split_path(&path);
            client
                .create_folder(server, &root, &name)
                .await
                .with_context(|| format!("Failed to create {}", path))?;
            print_success(&format!("Created {}", path));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/world/level.dat"), ("/world".into(), "level.dat".into()));
        assert_eq!(split_path("server.properties"), ("/".into(), "server.properties".into()));
        assert_eq!(split_path("/plugins/"), ("/".into(), "plugins".into()));
    }

    #[test]
    fn test_common_root_requires_shared_directory() {
        let (root, names) =
            common_root(&["/logs/a.log".to_string(), "/logs/b.log".to_string()]).unwrap();
        assert_eq!(root, "/logs");
        assert_eq!(names, vec!["a.log", "b.log"]);

        assert!(common_root(&["/a.txt".to_string(), "/logs/b.log".to_string()]).is_err());
    }
}
