pub mod models;

use std::{future::Future, sync::Arc};

use anyhow::Result;
use tokio::sync::{watch, RwLock};

use models::Reading;

/// Write half of the cooling-device contract.
///
/// The threshold controller only ever needs to flip the device flag, so it
/// takes this trait rather than the whole store. Tests inject a failing
/// switch to exercise the rollback path.
pub trait DeviceSwitch: Send + Sync {
    fn set_status(&self, on: bool) -> impl Future<Output = Result<()>> + Send;
}

/// Process-local stand-in for the realtime database: an append-only reading
/// list plus the single global device flag, both with push-based change
/// notification via `tokio::sync::watch`.
///
/// Cheaply cloneable; clones share state across tasks.
#[derive(Clone)]
pub struct RealtimeStore {
    readings: Arc<RwLock<Vec<Reading>>>,
    latest_tx: Arc<watch::Sender<Option<Reading>>>,
    device_tx: Arc<watch::Sender<bool>>,
}

impl Default for RealtimeStore {
    fn default() -> Self {
        Self {
            readings: Arc::new(RwLock::new(Vec::new())),
            latest_tx: Arc::new(watch::channel(None).0),
            device_tx: Arc::new(watch::channel(false).0),
        }
    }
}

impl RealtimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh reading stamped with the current time and notify
    /// "latest reading" subscribers. Returns the stored reading (with its
    /// assigned id).
    pub async fn insert(&self, temperature: f64, humidity: Option<f64>) -> Reading {
        let reading = Reading::new(temperature, humidity);
        self.insert_reading(reading.clone()).await;
        reading
    }

    /// Insert a fully-formed reading (simulators and tests use this to
    /// control the timestamp).
    pub async fn insert_reading(&self, reading: Reading) {
        self.readings.write().await.push(reading.clone());
        self.latest_tx.send_replace(Some(reading));
    }

    /// The last `limit` readings in insertion order (oldest of the window
    /// first), mirroring a `limitToLast`-style query.
    pub async fn recent(&self, limit: usize) -> Vec<Reading> {
        let readings = self.readings.read().await;
        let start = readings.len().saturating_sub(limit);
        readings[start..].to_vec()
    }

    /// Most recently inserted reading, if any.
    pub async fn latest(&self) -> Option<Reading> {
        self.readings.read().await.last().cloned()
    }

    /// Delete every reading with `timestamp <= cutoff_ms` (boundary is
    /// inclusive) and return how many were removed. Removing nothing is
    /// not an error.
    pub async fn delete_older_than(&self, cutoff_ms: i64) -> usize {
        let mut readings = self.readings.write().await;
        let before = readings.len();
        readings.retain(|r| r.timestamp > cutoff_ms);
        before - readings.len()
    }

    /// Current device flag.
    pub fn device_status(&self) -> bool {
        *self.device_tx.borrow()
    }

    /// Subscribe to "latest reading" changes. The receiver starts at the
    /// current value; dropping it cancels the subscription.
    pub fn subscribe_readings(&self) -> watch::Receiver<Option<Reading>> {
        self.latest_tx.subscribe()
    }

    /// Subscribe to device-flag changes.
    pub fn subscribe_device(&self) -> watch::Receiver<bool> {
        self.device_tx.subscribe()
    }
}

impl DeviceSwitch for RealtimeStore {
    async fn set_status(&self, on: bool) -> Result<()> {
        self.device_tx.send_replace(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_has_no_readings() {
        let store = RealtimeStore::new();
        assert!(store.latest().await.is_none());
        assert!(store.recent(50).await.is_empty());
        assert!(!store.device_status());
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = RealtimeStore::new();
        let before = chrono::Utc::now().timestamp_millis();
        let reading = store.insert(21.5, Some(60.0)).await;
        assert_eq!(reading.temperature, 21.5);
        assert_eq!(reading.humidity, Some(60.0));
        assert!(reading.timestamp >= before);

        let latest = store.latest().await.unwrap();
        assert_eq!(latest.id, reading.id);
    }

    #[tokio::test]
    async fn recent_returns_last_n_in_insertion_order() {
        let store = RealtimeStore::new();
        store.insert(20.0, None).await;
        store.insert(21.0, None).await;
        store.insert(22.0, None).await;

        let window = store.recent(2).await;
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].temperature, 21.0);
        assert_eq!(window[1].temperature, 22.0);

        // Window larger than the list returns everything
        assert_eq!(store.recent(100).await.len(), 3);
    }

    #[tokio::test]
    async fn delete_older_than_is_inclusive_at_the_boundary() {
        let store = RealtimeStore::new();
        let cutoff = 1_000_000;

        let mut old = Reading::new(30.0, None);
        old.timestamp = cutoff; // exactly at the cutoff
        let mut fresh = Reading::new(31.0, None);
        fresh.timestamp = cutoff + 1;

        store.insert_reading(old).await;
        store.insert_reading(fresh).await;

        let deleted = store.delete_older_than(cutoff).await;
        assert_eq!(deleted, 1);

        let remaining = store.recent(10).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].temperature, 31.0);
    }

    #[tokio::test]
    async fn delete_with_nothing_to_remove_returns_zero() {
        let store = RealtimeStore::new();
        store.insert(25.0, None).await;
        assert_eq!(store.delete_older_than(0).await, 0);
        assert_eq!(store.recent(10).await.len(), 1);
    }

    #[tokio::test]
    async fn insert_notifies_reading_subscribers() {
        let store = RealtimeStore::new();
        let mut rx = store.subscribe_readings();
        assert!(rx.borrow().is_none());

        store.insert(36.5, None).await;
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.temperature, 36.5);
    }

    #[tokio::test]
    async fn set_status_notifies_device_subscribers() {
        let store = RealtimeStore::new();
        let mut rx = store.subscribe_device();
        assert!(!*rx.borrow());

        store.set_status(true).await.unwrap();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
        assert!(store.device_status());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = RealtimeStore::new();
        let clone = store.clone();
        store.insert(20.0, None).await;
        assert_eq!(clone.recent(10).await.len(), 1);

        clone.set_status(true).await.unwrap();
        assert!(store.device_status());
    }
}
