pub mod report;

pub use report::{render_report, Language, ReportOptions, ReportStyle};
