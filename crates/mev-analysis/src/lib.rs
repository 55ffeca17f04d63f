//! mev-analysis crate
//!
//! Joins observatory MEV samples with the validator directory and derives
//! the per-block and top-N views that reports are rendered from.

pub mod report;

pub use report::{
    build_report, build_report_with_top, BarPoint, JoinedRecord, MevReport, ReportOutcome,
    ReportStats, DEFAULT_TOP_N,
};
