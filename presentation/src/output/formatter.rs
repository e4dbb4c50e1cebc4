//! Output formatter trait

use roundtable_application::RunOutput;
use roundtable_domain::OutputFormat;

/// Trait for formatting run results
pub trait OutputFormatter {
    /// Transcript, consensus rounds and final answer
    fn format_full(&self, output: &RunOutput) -> String;

    /// Final answer only (concise output)
    fn format_answer(&self, output: &RunOutput) -> String;

    /// Format as JSON
    fn format_json(&self, output: &RunOutput) -> String;

    /// Termination reason and token totals
    fn format_summary(&self, output: &RunOutput) -> String;

    /// Dispatch on the configured format
    fn format(&self, output: &RunOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(output),
            OutputFormat::Answer => self.format_answer(output),
            OutputFormat::Json => self.format_json(output),
        }
    }
}
