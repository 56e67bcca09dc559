//! Report export command.

use crate::core_state::AppState;
use crate::report::{ExportOutcome, ReportOptions};

use super::fail;

/// Renders the clinician report and writes it into the exports directory.
pub fn export_report(state: &AppState, options: ReportOptions) -> Result<ExportOutcome, String> {
    if let Some(range) = &options.date_range {
        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return fail(state, format!("Invalid date range: {from} is after {to}"));
            }
        }
    }

    let catalog = state.catalog();
    let generator = state.report_generator(&catalog);
    match generator.export(&options, &state.exports_dir()) {
        Ok(outcome) => {
            state.toasts.success(format!("Report saved as {}", outcome.file_name));
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!(error = %e, "Report export failed");
            fail(state, format!("Report export failed: {e}"))
        }
    }
}
