//! Output formatter trait

use warroom_domain::{FinalReport, OutputFormat};

/// Trait for formatting workflow reports
pub trait OutputFormatter {
    /// Format the complete report
    fn format(&self, report: &FinalReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &FinalReport) -> String;

    /// Format the synthesis only (concise output)
    fn format_synthesis_only(&self, report: &FinalReport) -> String;

    fn render(&self, report: &FinalReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(report),
            OutputFormat::Synthesis => self.format_synthesis_only(report),
            OutputFormat::Json => self.format_json(report),
        }
    }
}
