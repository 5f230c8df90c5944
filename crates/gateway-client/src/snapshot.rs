//! All-or-nothing telemetry snapshot building and the auto-refresh driver.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, warn};

use gateway_model::telemetry::{AisReadings, NavigationReadings, TelemetrySnapshot, WindReadings};

use crate::error::ClientError;

/// The telemetry read endpoints, as a seam so refresh behavior can be
/// exercised against scripted responses.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn navigation(&self) -> Result<NavigationReadings, ClientError>;
    async fn wind(&self) -> Result<WindReadings, ClientError>;
    async fn ais(&self) -> Result<AisReadings, ClientError>;
}

/// Issues the independent telemetry reads concurrently and merges them into
/// one consistent snapshot.
///
/// The policy is all-or-nothing: if any one read fails the whole cycle
/// fails, the previously built snapshot is retained unchanged, and the
/// failure is reported as a single error. A half-updated view mixing old
/// and new domains is never produced.
pub struct TelemetrySnapshotBuilder {
    source: Arc<dyn TelemetrySource>,
    snapshot: Option<TelemetrySnapshot>,
}

impl TelemetrySnapshotBuilder {
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self {
            source,
            snapshot: None,
        }
    }

    /// Fetch all domains and replace the current snapshot wholesale.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let (nav, wind, ais) = tokio::try_join!(
            self.source.navigation(),
            self.source.wind(),
            self.source.ais(),
        )?;

        self.snapshot = Some(TelemetrySnapshot::from_readings(
            nav,
            wind,
            ais,
            Instant::now(),
        ));
        debug!("telemetry snapshot refreshed");
        Ok(())
    }

    /// The most recently built snapshot, if any cycle has succeeded yet.
    pub fn current(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }
}

/// Drives a shared builder on a fixed period, gated by a togglable flag.
///
/// Disabling the flag stops future refreshes without discarding the data
/// already built; re-enabling resumes on the next tick. Dropping the handle
/// cancels the timer.
pub struct AutoRefresh {
    enabled: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutoRefresh {
    pub fn spawn(builder: Arc<Mutex<TelemetrySnapshotBuilder>>, period: Duration) -> Self {
        let (enabled_tx, enabled_rx) = watch::channel(true);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if !*enabled_rx.borrow() {
                    continue;
                }
                if let Err(e) = builder.lock().await.refresh().await {
                    warn!("telemetry refresh failed, keeping previous snapshot: {}", e);
                }
            }
        });

        Self {
            enabled: enabled_tx,
            task,
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        let _ = self.enabled.send(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Cancel the refresh timer. Already-built data stays with the builder.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scripted source; individual domains can be made to fail.
    struct ScriptedSource {
        fail_wind: AtomicBool,
        calls: AtomicUsize,
        sog: f64,
    }

    impl ScriptedSource {
        fn new(sog: f64) -> Self {
            Self {
                fail_wind: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
                sog,
            }
        }
    }

    #[async_trait]
    impl TelemetrySource for ScriptedSource {
        async fn navigation(&self) -> Result<NavigationReadings, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(&format!(
                r#"{{"gps": {{"sog": {{"value": {}, "unit": "kn", "age": 0.5}}}}}}"#,
                self.sog
            ))
            .unwrap())
        }

        async fn wind(&self) -> Result<WindReadings, ClientError> {
            if self.fail_wind.load(Ordering::SeqCst) {
                return Err(ClientError::Status {
                    path: "/api/boat/wind".to_string(),
                    status: 503,
                });
            }
            Ok(serde_json::from_str(
                r#"{"aws": {"value": 12.1, "unit": "kn", "age": 0.3}}"#,
            )
            .unwrap())
        }

        async fn ais(&self) -> Result<AisReadings, ClientError> {
            Ok(AisReadings::default())
        }
    }

    #[tokio::test]
    async fn test_refresh_builds_snapshot() {
        let source = Arc::new(ScriptedSource::new(6.2));
        let mut builder = TelemetrySnapshotBuilder::new(source);
        assert!(builder.current().is_none());

        builder.refresh().await.unwrap();

        let snapshot = builder.current().unwrap();
        assert_eq!(snapshot.course.speed_over_ground.value, Some(6.2));
        assert_eq!(snapshot.wind.apparent_speed.value, Some(12.1));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_previous_snapshot() {
        let source = Arc::new(ScriptedSource::new(6.2));
        let mut builder = TelemetrySnapshotBuilder::new(source.clone());
        builder.refresh().await.unwrap();
        let before = builder.current().unwrap().built_at;

        // Wind fails while navigation and AIS would succeed.
        source.fail_wind.store(true, Ordering::SeqCst);
        let result = builder.refresh().await;
        assert!(result.is_err());

        // Unchanged, not a mix of old and new domains.
        let after = builder.current().unwrap();
        assert_eq!(after.built_at, before);
        assert_eq!(after.course.speed_over_ground.value, Some(6.2));

        // The next successful cycle replaces it wholesale.
        source.fail_wind.store(false, Ordering::SeqCst);
        builder.refresh().await.unwrap();
        assert!(builder.current().unwrap().built_at > before);
    }

    #[tokio::test]
    async fn test_failed_first_cycle_leaves_no_snapshot() {
        let source = Arc::new(ScriptedSource::new(6.2));
        source.fail_wind.store(true, Ordering::SeqCst);
        let mut builder = TelemetrySnapshotBuilder::new(source);

        assert!(builder.refresh().await.is_err());
        assert!(builder.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_ticks_and_gates() {
        let source = Arc::new(ScriptedSource::new(6.2));
        let builder = Arc::new(Mutex::new(TelemetrySnapshotBuilder::new(source.clone())));
        let refresh = AutoRefresh::spawn(builder.clone(), Duration::from_secs(2));

        // First tick fires immediately, then every period.
        tokio::time::sleep(Duration::from_millis(4100)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        // Disabled: ticks continue but do nothing, data stays rendered.
        refresh.set_enabled(false);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(builder.lock().await.current().is_some());

        // Re-enabled: resumes on the next tick.
        refresh.set_enabled(true);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(source.calls.load(Ordering::SeqCst) >= 4);

        refresh.stop();
        let stopped = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), stopped);
    }
}
