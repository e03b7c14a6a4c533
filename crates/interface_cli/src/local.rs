//! Local filesystem and terminal collaborators

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use domain_claims::{Confirm, FilePayload, FileSink};

use crate::error::CliError;

/// Saves downloads into one directory, creating it when missing
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

impl FileSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_of(filename), bytes)
    }
}

/// Asks on stderr and reads the answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Reads the files to upload; the payload name is the file's base name
pub async fn read_payloads(paths: &[PathBuf]) -> Result<Vec<FilePayload>, CliError> {
    let mut payloads = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await.map_err(|source| CliError::ReadFile {
            path: path.clone(),
            source,
        })?;
        payloads.push(FilePayload::new(base_name(path), bytes));
    }
    Ok(payloads)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
