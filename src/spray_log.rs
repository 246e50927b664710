use std::{
    path::PathBuf,
    sync::Arc,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::local_state;

/// The log keeps at most this many sessions; the oldest (by insertion order)
/// is evicted first.
pub const SPRAY_LOG_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SprayKind {
    /// Triggered by the threshold controller.
    Automatic,
    /// User toggle, recorded only when LOG_MANUAL_SPRAYS is enabled.
    Manual,
}

/// One actuation event, tied to the reading that caused it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpraySession {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Temperature of the triggering reading, degrees Celsius.
    pub temperature: f64,
    #[serde(rename = "type")]
    pub kind: SprayKind,
}

impl SpraySession {
    pub fn automatic(temperature: f64) -> Self {
        Self::stamped(temperature, SprayKind::Automatic)
    }

    pub fn manual(temperature: f64) -> Self {
        Self::stamped(temperature, SprayKind::Manual)
    }

    fn stamped(temperature: f64, kind: SprayKind) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: now.to_string(),
            timestamp: now,
            temperature,
            kind,
        }
    }
}

/// Bounded, most-recent-first history of spray events, persisted as a JSON
/// array after every append.
///
/// Single-writer assumption: one dashboard session owns the log; there is no
/// cross-process coordination.
#[derive(Clone)]
pub struct SprayLog {
    entries: Arc<RwLock<Vec<SpraySession>>>,
    path: Option<PathBuf>,
}

impl SprayLog {
    /// Restore the log from `path`. A missing or corrupt file falls back to
    /// the seeded demo entries, which are then written out.
    pub async fn load(path: PathBuf) -> Self {
        let entries = match local_state::load::<Vec<SpraySession>>(&path).await {
            Some(entries) => entries,
            None => {
                let seeds = seed_entries();
                local_state::save(&path, &seeds).await;
                seeds
            }
        };
        Self {
            entries: Arc::new(RwLock::new(entries)),
            path: Some(path),
        }
    }

    /// An unpersisted, initially empty log.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            path: None,
        }
    }

    /// Insert `session` at the head, evicting past capacity, and persist the
    /// result. Returns the new ordered sequence (newest first).
    pub async fn append(&self, session: SpraySession) -> Vec<SpraySession> {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(0, session);
            entries.truncate(SPRAY_LOG_CAPACITY);
            entries.clone()
        };
        if let Some(path) = &self.path {
            local_state::save(path, &snapshot).await;
        }
        snapshot
    }

    /// Snapshot of the log, newest first.
    pub async fn entries(&self) -> Vec<SpraySession> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Demo entries shown before any real trigger has happened. Purely a UX
/// convenience for a fresh session; not telemetry.
fn seed_entries() -> Vec<SpraySession> {
    const HOUR_MS: i64 = 60 * 60 * 1000;
    let now = Utc::now().timestamp_millis();

    [
        ("1706500000001", 2, 36.2),
        ("1706500000002", 4, 37.4),
        ("1706500000003", 6, 38.1),
        ("1706500000004", 12, 36.5),
        ("1706500000005", 24, 36.8),
        ("1706500000006", 48, 39.2),
        ("1706500000007", 72, 37.9),
        ("1706500000008", 96, 36.0),
    ]
    .into_iter()
    .map(|(id, hours_ago, temperature)| SpraySession {
        id: id.to_owned(),
        timestamp: now - hours_ago * HOUR_MS,
        temperature,
        kind: SprayKind::Automatic,
    })
    .collect()
}
