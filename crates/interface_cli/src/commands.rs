//! Command execution against a claims port

use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use core_kernel::{AttachmentId, ClaimId};
use domain_claims::{AttachmentManager, ClaimsApiPort, ClaimsDirectory, Confirm};

use crate::cli::Command;
use crate::error::{completed, degraded, CliError};
use crate::local::{read_payloads, DirectorySink, TerminalConfirm};
use crate::render;

/// The directory and attachment services behind one port
pub struct Dashboard {
    directory: ClaimsDirectory,
    attachments: AttachmentManager,
}

impl Dashboard {
    pub fn new(port: Arc<dyn ClaimsApiPort>) -> Self {
        Self {
            directory: ClaimsDirectory::new(port.clone()),
            attachments: AttachmentManager::new(port),
        }
    }

    /// Runs one command, prompting on the terminal before deletes
    pub async fn run(&self, command: Command, out: &mut impl Write) -> Result<(), CliError> {
        self.run_with(command, &TerminalConfirm, out).await
    }

    /// Runs one command with the given delete confirmation
    pub async fn run_with(
        &self,
        command: Command,
        confirm: &impl Confirm,
        out: &mut impl Write,
    ) -> Result<(), CliError> {
        debug!(?command, "Running command");
        match command {
            Command::Overview => {
                let (claims, stats) = self.directory.open().await;
                let stats = degraded(stats, out)?;
                let claims = degraded(claims, out)?;
                write!(out, "{}", render::stats(&stats))?;
                writeln!(out)?;
                write!(out, "{}", render::claim_table(&claims.iter().collect::<Vec<_>>()))?;
            }
            Command::Claims { search } => {
                degraded(self.directory.list_claims().await, out)?;
                let matches = self.directory.search(search.as_deref().unwrap_or_default());
                write!(out, "{}", render::claim_table(&matches.iter().collect::<Vec<_>>()))?;
            }
            Command::Show { claim_id } => {
                let claim = completed(self.directory.get_claim(&ClaimId::from(claim_id)).await)?;
                write!(out, "{}", render::claim_detail(&claim))?;
            }
            Command::Files { claim_id } => {
                let claim_id = ClaimId::from(claim_id);
                let attachments = degraded(self.attachments.open(&claim_id).await, out)?;
                write!(out, "{}", render::attachment_table(&attachments))?;
            }
            Command::Upload { claim_id, paths } => {
                let claim_id = ClaimId::from(claim_id);
                let files = read_payloads(&paths).await?;
                degraded(self.attachments.open(&claim_id).await, out)?;
                self.attachments.select_files(files);
                let receipt = completed(self.attachments.upload_selected().await)?;
                writeln!(out, "{}", receipt.notice)?;
                if let Some(notice) = &receipt.listing.refresh_error {
                    writeln!(out, "{}", notice)?;
                }
                write!(out, "{}", render::attachment_table(&receipt.listing.attachments))?;
            }
            Command::Download { claim_id, file_id, out: dir } => {
                let claim_id = ClaimId::from(claim_id);
                // Cached names give the original upload name
                degraded(self.attachments.open(&claim_id).await, out)?;
                let sink = DirectorySink::new(dir);
                let saved = completed(
                    self.attachments
                        .download_attachment(&claim_id, &AttachmentId::from(file_id), &sink)
                        .await,
                )?;
                writeln!(
                    out,
                    "Saved {} ({} bytes)",
                    sink.path_of(&saved.filename).display(),
                    saved.size_bytes
                )?;
            }
            Command::Delete { claim_id, file_id, yes } => {
                let claim_id = ClaimId::from(claim_id);
                degraded(self.attachments.open(&claim_id).await, out)?;
                let attachment_id = AttachmentId::from(file_id);
                let outcome = if yes {
                    self.attachments
                        .delete_attachment(&claim_id, &attachment_id, &|_: &str| true)
                        .await
                } else {
                    self.attachments
                        .delete_attachment(&claim_id, &attachment_id, confirm)
                        .await
                };
                let receipt = completed(outcome)?;
                writeln!(out, "{}", receipt.notice)?;
                write!(out, "{}", render::attachment_table(&receipt.listing.attachments))?;
            }
        }
        Ok(())
    }
}
