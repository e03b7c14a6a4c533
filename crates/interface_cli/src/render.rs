//! Plain-text rendering of dashboard state

use std::fmt::Write;

use domain_claims::{Attachment, Claim, ClaimsStats};

const NUMBER_WIDTH: usize = 16;
const STATUS_WIDTH: usize = 12;
const NAME_WIDTH: usize = 24;

/// Totals panel
pub fn stats(stats: &ClaimsStats) -> String {
    format!(
        "Total claims:          {}\nTotal estimated loss:  {}\nTotal paid:            {}\nAvg days to close:     {}\n",
        stats.total_claims,
        stats.total_estimated_loss_display(),
        stats.total_paid_display(),
        stats.avg_days_display(),
    )
}

/// One line per claim
pub fn claim_table(claims: &[&Claim]) -> String {
    if claims.is_empty() {
        return "No claims found\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<NUMBER_WIDTH$} {:<STATUS_WIDTH$} {:<NAME_WIDTH$} {:>12}  {}",
        "CLAIM", "STATUS", "POLICYHOLDER", "EST. LOSS", "LOSS DATE"
    );
    for claim in claims {
        let _ = writeln!(
            out,
            "{:<NUMBER_WIDTH$} {:<STATUS_WIDTH$} {:<NAME_WIDTH$} {:>12}  {}",
            claim.claim_number,
            claim.status.to_string(),
            claim.policyholder.name,
            claim.loss.estimated_amount.format_whole(),
            claim.loss.date.format_short(),
        );
    }
    out
}

/// Detail view, activity log last
pub fn claim_detail(claim: &Claim) -> String {
    let fields = claim.display_fields();
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in fields {
        let _ = writeln!(out, "{:<width$}  {}", label, value);
    }
    if !claim.activities.is_empty() {
        let _ = writeln!(out, "\nActivity");
        for activity in &claim.activities {
            let _ = writeln!(out, "  {}  {}", activity.created_at.format_short(), activity.description);
        }
    }
    out
}

pub fn attachment_table(attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return "No files attached\n".to_string();
    }
    let mut out = String::new();
    for attachment in attachments {
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>10}  {}",
            attachment.id.as_str(),
            attachment.display_name(),
            attachment.size_display(),
            attachment.uploaded_at.format_short(),
        );
    }
    out
}
