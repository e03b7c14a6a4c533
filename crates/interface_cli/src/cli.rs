//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use infra_http::Addressing;

#[derive(Debug, Parser)]
#[command(name = "claims-dashboard")]
#[command(about = "Browse claims and manage claim attachments")]
pub struct Cli {
    /// Backend base URL (overrides CLAIMS_API_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// File route family: nested, flat or auto (overrides CLAIMS_API_ADDRESSING)
    #[arg(long, global = true)]
    pub addressing: Option<Addressing>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Totals and the claim list
    Overview,

    /// List claims, optionally filtered by policyholder or claim number
    Claims {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Full detail of one claim
    Show { claim_id: String },

    /// Attachments of one claim
    Files { claim_id: String },

    /// Upload one or more files to a claim in a single request
    Upload {
        claim_id: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Download an attachment into a directory
    Download {
        claim_id: String,
        file_id: String,
        /// Target directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Delete an attachment
    Delete {
        claim_id: String,
        file_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
