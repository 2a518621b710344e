//! Interview-completed events and the background report worker.
//!
//! Completing a session publishes an event; the worker turns each event into
//! a report generation with bounded retry. Publication never blocks or fails
//! the answer submission that triggered it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::report::InterviewReportGenerator;
use crate::errors::AppError;

pub const EVENT_CHANNEL_CAPACITY: usize = 256;
pub const MAX_REPORT_ATTEMPTS: u32 = 4;
const BASE_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewCompleted {
    pub session_id: Uuid,
    pub application_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

/// Sending half of the interview event channel.
#[derive(Clone)]
pub struct EventPublisher {
    sender: mpsc::Sender<InterviewCompleted>,
}

impl EventPublisher {
    pub fn channel() -> (Self, mpsc::Receiver<InterviewCompleted>) {
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self { sender }, receiver)
    }

    /// Best effort. A full or closed channel is logged and dropped; the
    /// report can still be generated on demand.
    pub fn publish(&self, event: InterviewCompleted) {
        let session_id = event.session_id;
        match self.sender.try_send(event) {
            Ok(()) => info!("Published InterviewCompleted for session {session_id}"),
            Err(e) => error!("Failed to publish InterviewCompleted for session {session_id}: {e}"),
        }
    }
}

/// Consumes events until every publisher is dropped. Each event is handled on
/// its own task so one slow retry loop does not hold up the others.
pub fn spawn_report_worker(
    mut receiver: mpsc::Receiver<InterviewCompleted>,
    generator: InterviewReportGenerator,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Interview report worker started");
        while let Some(event) = receiver.recv().await {
            let generator = generator.clone();
            tokio::spawn(async move {
                generate_with_retry(&generator, &event).await;
            });
        }
        info!("Interview report worker stopped");
    })
}

/// Returns whether a report exists for the session when the attempts end.
pub async fn generate_with_retry(
    generator: &InterviewReportGenerator,
    event: &InterviewCompleted,
) -> bool {
    for attempt in 1..=MAX_REPORT_ATTEMPTS {
        match generator.generate(event.session_id).await {
            Ok(report) => {
                info!(
                    "Report {} ready for session {} (attempt {attempt})",
                    report.id, event.session_id
                );
                return true;
            }
            Err(e @ (AppError::NotFound(_) | AppError::InvalidState(_) | AppError::Validation(_))) => {
                error!("Giving up on report for session {}: {e}", event.session_id);
                return false;
            }
            Err(e) if attempt < MAX_REPORT_ATTEMPTS => {
                let delay = retry_delay(attempt);
                warn!(
                    "Report attempt {attempt} for session {} failed: {e}; retrying in {}ms",
                    event.session_id,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                error!(
                    "Report for session {} failed after {MAX_REPORT_ATTEMPTS} attempts: {e}",
                    event.session_id
                );
            }
        }
    }
    false
}

fn retry_delay(attempt: u32) -> Duration {
    BASE_RETRY_DELAY * 2u32.pow(attempt.saturating_sub(1))
}
