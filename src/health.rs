//! Process-lifetime health snapshot.

use serde::Serialize;
use std::sync::OnceLock;
use std::time::Instant;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Record process start. Idempotent; the first call wins.
pub(crate) fn mark_started() {
    let _ = STARTED_AT.set(Instant::now());
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct HealthSnapshot {
    pub uptime_seconds: u64,
}

/// Uptime since [`mark_started`]; zero if never marked (tests).
pub(crate) fn snapshot() -> HealthSnapshot {
    let uptime_seconds = STARTED_AT
        .get()
        .map(|started| started.elapsed().as_secs())
        .unwrap_or(0);
    HealthSnapshot { uptime_seconds }
}
