//! Built-in tools

pub mod trusty_report;

pub use trusty_report::{normalize_report, TrustyReportTool, TRUSTY_REPORT_TOOL};
