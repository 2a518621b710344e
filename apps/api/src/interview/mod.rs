//! Adaptive interviews and their evaluator reports.

pub mod events;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod report;

pub use events::{spawn_report_worker, EventPublisher};
pub use orchestrator::InterviewOrchestrator;
pub use report::InterviewReportGenerator;
