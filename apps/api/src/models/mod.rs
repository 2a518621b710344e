pub mod document;
pub mod interview;
pub mod job;
pub mod match_report;
