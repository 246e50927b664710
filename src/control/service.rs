use tokio::sync::{broadcast, watch};
use tracing::{error, info};

use crate::{
    spray_log::{SprayLog, SpraySession},
    store::{models::Reading, DeviceSwitch},
};

/// Emitted once per automatic trigger so the presentation layer can surface
/// a one-time notification.
#[derive(Debug, Clone)]
pub struct SprayAlert {
    pub temperature: f64,
    pub timestamp: i64,
}

/// Decides, on every new reading observation, whether to actuate the cooling
/// device automatically.
///
/// Event-driven: subscribes to "latest reading" and "device state" watch
/// channels and handles each observation to completion before the next. The
/// control policy is one-directional — a trigger turns the device on, and
/// only a manual toggle ever turns it off again.
pub struct ThresholdController<S: DeviceSwitch> {
    switch: S,
    log: SprayLog,
    /// Actuation threshold in degrees Celsius.
    threshold: f64,
    readings: watch::Receiver<Option<Reading>>,
    device: watch::Receiver<bool>,
    alerts: broadcast::Sender<SprayAlert>,
    /// Locally cached device flag, kept in sync with the device subscription
    /// and flipped optimistically before each store write so a second hot
    /// reading arriving mid-write cannot double-trigger.
    device_on: bool,
}

impl<S: DeviceSwitch> ThresholdController<S> {
    pub fn new(
        switch: S,
        log: SprayLog,
        threshold: f64,
        readings: watch::Receiver<Option<Reading>>,
        device: watch::Receiver<bool>,
    ) -> (Self, broadcast::Receiver<SprayAlert>) {
        let (alerts, alerts_rx) = broadcast::channel(16);
        let device_on = *device.borrow();
        let controller = Self {
            switch,
            log,
            threshold,
            readings,
            device,
            alerts,
            device_on,
        };
        (controller, alerts_rx)
    }

    /// Runs until both subscriptions close (the store's senders dropped),
    /// which is how a dashboard session cancels its listeners at teardown.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(mut self) {
        info!(threshold = self.threshold, "Threshold controller started");

        loop {
            tokio::select! {
                changed = self.readings.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = self.readings.borrow_and_update().clone();
                    if let Some(reading) = latest {
                        self.observe(&reading).await;
                    }
                }
                changed = self.device.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.device_on = *self.device.borrow_and_update();
                }
            }
        }

        info!("Threshold controller stopped");
    }

    /// Actuate iff `temperature >= threshold` and the device is currently
    /// off. A device that is already running never re-triggers, so a
    /// sustained hot reading produces exactly one spray session.
    async fn observe(&mut self, reading: &Reading) {
        if reading.temperature < self.threshold || self.device_on {
            return;
        }

        // Optimistic flip, compensated below if the store write fails.
        self.device_on = true;
        if let Err(e) = self.switch.set_status(true).await {
            self.device_on = false;
            error!(
                temperature = reading.temperature,
                error = %e,
                "Auto-spray: device switch write failed; will retry on the next hot reading"
            );
            return;
        }

        let entries = self.log.append(SpraySession::automatic(reading.temperature)).await;
        info!(
            temperature = reading.temperature,
            total_sprays = entries.len(),
            "Auto-spray triggered"
        );

        // No subscribers is fine; the alert is fire-and-forget.
        let _ = self.alerts.send(SprayAlert {
            temperature: reading.temperature,
            timestamp: reading.timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    use anyhow::Result;
    use tokio::sync::watch;

    use super::*;
    use crate::store::RealtimeStore;

    /// Records every write; optionally fails on demand.
    #[derive(Clone, Default)]
    struct FakeSwitch {
        calls: Arc<Mutex<Vec<bool>>>,
        fail: Arc<AtomicBool>,
    }

    impl DeviceSwitch for FakeSwitch {
        async fn set_status(&self, on: bool) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("store unavailable");
            }
            self.calls.lock().unwrap().push(on);
            Ok(())
        }
    }

    struct Harness {
        controller: ThresholdController<FakeSwitch>,
        switch: FakeSwitch,
        alerts: broadcast::Receiver<SprayAlert>,
        #[allow(dead_code)]
        readings_tx: watch::Sender<Option<Reading>>,
        #[allow(dead_code)]
        device_tx: watch::Sender<bool>,
    }

    fn harness(threshold: f64) -> Harness {
        let (readings_tx, readings_rx) = watch::channel(None);
        let (device_tx, device_rx) = watch::channel(false);
        let switch = FakeSwitch::default();
        let (controller, alerts) = ThresholdController::new(
            switch.clone(),
            SprayLog::in_memory(),
            threshold,
            readings_rx,
            device_rx,
        );
        Harness { controller, switch, alerts, readings_tx, device_tx }
    }

    fn reading(temperature: f64) -> Reading {
        Reading::new(temperature, None)
    }

    #[tokio::test]
    async fn hot_reading_with_device_off_triggers_exactly_once() {
        let mut h = harness(36.0);
        h.controller.observe(&reading(37.5)).await;

        assert_eq!(*h.switch.calls.lock().unwrap(), vec![true]);
        assert_eq!(h.controller.log.len().await, 1);
        let logged = h.controller.log.entries().await;
        assert_eq!(logged[0].temperature, 37.5);

        let alert = h.alerts.try_recv().unwrap();
        assert_eq!(alert.temperature, 37.5);
    }

    #[tokio::test]
    async fn threshold_boundary_is_inclusive() {
        let mut h = harness(36.0);
        h.controller.observe(&reading(36.0)).await;
        assert_eq!(h.controller.log.len().await, 1);
    }

    #[tokio::test]
    async fn below_threshold_does_nothing() {
        let mut h = harness(36.0);
        h.controller.observe(&reading(35.9)).await;

        assert!(h.switch.calls.lock().unwrap().is_empty());
        assert_eq!(h.controller.log.len().await, 0);
        assert!(h.alerts.try_recv().is_err());
    }

    #[tokio::test]
    async fn device_already_on_never_re_triggers() {
        let mut h = harness(36.0);
        h.controller.device_on = true;
        h.controller.observe(&reading(45.0)).await;

        assert!(h.switch.calls.lock().unwrap().is_empty());
        assert_eq!(h.controller.log.len().await, 0);
    }

    #[tokio::test]
    async fn sustained_hot_readings_spray_once() {
        let mut h = harness(36.0);
        h.controller.observe(&reading(37.0)).await;
        h.controller.observe(&reading(38.0)).await;
        h.controller.observe(&reading(39.0)).await;

        assert_eq!(*h.switch.calls.lock().unwrap(), vec![true]);
        assert_eq!(h.controller.log.len().await, 1);
    }

    #[tokio::test]
    async fn manual_off_then_hot_reading_re_triggers() {
        let mut h = harness(36.0);
        h.controller.observe(&reading(37.0)).await;
        assert_eq!(h.controller.log.len().await, 1);

        // Device subscription reports the manual toggle to off.
        h.controller.device_on = false;
        h.controller.observe(&reading(37.0)).await;

        assert_eq!(*h.switch.calls.lock().unwrap(), vec![true, true]);
        assert_eq!(h.controller.log.len().await, 2);
    }

    #[tokio::test]
    async fn failed_switch_write_rolls_back_and_retries_later() {
        let mut h = harness(36.0);
        h.switch.fail.store(true, Ordering::SeqCst);
        h.controller.observe(&reading(40.0)).await;

        // Compensated: flag restored, nothing logged, no alert.
        assert!(!h.controller.device_on);
        assert_eq!(h.controller.log.len().await, 0);
        assert!(h.alerts.try_recv().is_err());

        // Store recovers; the next hot reading actuates.
        h.switch.fail.store(false, Ordering::SeqCst);
        h.controller.observe(&reading(40.0)).await;
        assert_eq!(*h.switch.calls.lock().unwrap(), vec![true]);
        assert_eq!(h.controller.log.len().await, 1);
    }

    #[tokio::test]
    async fn run_actuates_on_a_pushed_reading() {
        let store = RealtimeStore::new();
        let log = SprayLog::in_memory();
        let (controller, mut alerts) = ThresholdController::new(
            store.clone(),
            log.clone(),
            36.0,
            store.subscribe_readings(),
            store.subscribe_device(),
        );
        let task = tokio::spawn(controller.run());

        store.insert(37.0, None).await;
        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.temperature, 37.0);
        assert!(store.device_status());
        assert_eq!(log.len().await, 1);

        // The controller's own store clone keeps the channels open, so the
        // session ends the way main does: by aborting the task.
        task.abort();
        let _ = task.await;
    }

    #[tokio::test]
    async fn run_stops_when_subscriptions_close() {
        let h = harness(36.0);
        let Harness { controller, readings_tx, device_tx, .. } = h;
        let task = tokio::spawn(controller.run());

        drop(readings_tx);
        drop(device_tx);
        task.await.unwrap();
    }
}
