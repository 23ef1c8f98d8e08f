//! Roster scan - cutoff, column resolution, change detection and rendering for one sheet

use tracing::info;

use crate::output::{render_report, ReportOptions};
use crate::roster::{
    compute_changes, parse_cutoff, resolve_columns, ChangeSet, Cutoff, HeaderSpec, RosterError,
};
use crate::workbook::SheetData;

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub sheet: String,
    pub cutoff: Cutoff,
    pub changes: ChangeSet,
    pub report: String,
}

/// Scan a sheet for team changes after `cutoff_text` (`DD.MM.YYYY`).
///
/// Both fatal checks (cutoff format, required columns) run before any data row is read.
pub fn scan_sheet(
    sheet: &SheetData,
    cutoff_text: &str,
    headers: &HeaderSpec,
    options: &ReportOptions,
) -> Result<ScanOutcome, RosterError> {
    let cutoff = parse_cutoff(cutoff_text)?;
    let columns = resolve_columns(&sheet.header, headers)?;
    let changes = compute_changes(&sheet.rows, &columns, &cutoff);
    info!(
        "sheet '{}': {} joined, {} left since {cutoff}",
        sheet.name,
        changes.joined.len(),
        changes.left.len()
    );
    let report = render_report(cutoff_text, &changes.joined, &changes.left, options);
    Ok(ScanOutcome {
        sheet: sheet.name.clone(),
        cutoff,
        changes,
        report,
    })
}
