//! Diagnostic events emitted while walking the catalog.
//!
//! Components report through an injected [`Diagnostics`] collaborator instead
//! of logging directly, so callers can route events anywhere and tests can
//! assert on them without capturing process output.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{info, warn};

use crate::models::Experience;

/// Receiver for diagnostic events.
pub trait Diagnostics: Send + Sync {
    /// The throttled fetcher saw a rate-limit signal and raised its penalty.
    fn penalty_increased(&self, url: &str, penalty: Duration);

    /// An aggregation run began for `user_id`.
    fn aggregation_started(&self, user_id: &str);

    /// The aggregator is about to list items for an experience.
    /// `position` is 1-based.
    fn experience_started(&self, position: usize, experience: &Experience);

    /// An aggregation run completed successfully.
    fn aggregation_finished(&self, user_id: &str, item_count: usize, elapsed: Duration);
}

/// Default [`Diagnostics`] that writes to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn penalty_increased(&self, url: &str, penalty: Duration) {
        warn!(
            "[RateLimit] Increasing penalty delay to {}ms ({})",
            penalty.as_millis(),
            url
        );
    }

    fn aggregation_started(&self, user_id: &str) {
        info!("[Fetch] Collecting priced items for user {}", user_id);
    }

    fn experience_started(&self, position: usize, experience: &Experience) {
        info!(
            "[Fetch] [{}] {} (Experience ID: {})",
            position,
            experience.display_name(),
            experience.id
        );
    }

    fn aggregation_finished(&self, user_id: &str, item_count: usize, elapsed: Duration) {
        info!(
            "[Benchmark] Fetched {} priced items for user {} in {:?}",
            item_count, user_id, elapsed
        );
    }
}

/// A diagnostic event as captured by [`RecordingDiagnostics`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticEvent {
    PenaltyIncreased { url: String, penalty: Duration },
    AggregationStarted { user_id: String },
    ExperienceStarted { position: usize, experience_id: u64, name: String },
    AggregationFinished { user_id: String, item_count: usize },
}

/// [`Diagnostics`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the event list, recovering from poison if necessary.
    fn lock_events(&self) -> MutexGuard<'_, Vec<DiagnosticEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.lock_events().clone()
    }

    /// Penalties reported so far, in order.
    pub fn penalties(&self) -> Vec<Duration> {
        self.lock_events()
            .iter()
            .filter_map(|event| match event {
                DiagnosticEvent::PenaltyIncreased { penalty, .. } => Some(*penalty),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: DiagnosticEvent) {
        self.lock_events().push(event);
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn penalty_increased(&self, url: &str, penalty: Duration) {
        self.record(DiagnosticEvent::PenaltyIncreased {
            url: url.to_string(),
            penalty,
        });
    }

    fn aggregation_started(&self, user_id: &str) {
        self.record(DiagnosticEvent::AggregationStarted {
            user_id: user_id.to_string(),
        });
    }

    fn experience_started(&self, position: usize, experience: &Experience) {
        self.record(DiagnosticEvent::ExperienceStarted {
            position,
            experience_id: experience.id,
            name: experience.display_name().to_string(),
        });
    }

    fn aggregation_finished(&self, user_id: &str, item_count: usize, _elapsed: Duration) {
        self.record(DiagnosticEvent::AggregationFinished {
            user_id: user_id.to_string(),
            item_count,
        });
    }
}
