//! CLI errors

use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use domain_claims::{Notice, Outcome, ValidationError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Failed(Notice),

    #[error("{0}")]
    Rejected(#[from] ValidationError),

    #[error("The view changed before the request finished")]
    Superseded,

    #[error("Output failed: {0}")]
    Output(#[from] io::Error),
}

/// Turns a non-completed outcome into an error
pub fn completed<T>(outcome: Outcome<T>) -> Result<T, CliError> {
    match outcome {
        Outcome::Completed(value) => Ok(value),
        Outcome::Failed(notice) => Err(CliError::Failed(notice)),
        Outcome::Rejected(reason) => Err(CliError::Rejected(reason)),
        Outcome::Stale => Err(CliError::Superseded),
    }
}

/// The completed value, or the empty default a failed fetch degrades to.
///
/// The failure notice is written ahead of the degraded view.
pub fn degraded<T: Default>(outcome: Outcome<T>, out: &mut impl Write) -> io::Result<T> {
    if let Some(notice) = outcome.notice() {
        writeln!(out, "{}", notice)?;
    }
    Ok(outcome.value_or_default())
}
