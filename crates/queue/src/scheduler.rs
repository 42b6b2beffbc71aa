//! Scheduled sweeps for deployments without an external cron.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use finboard_common::{AppError, config::SchedulerSettings};
use finboard_core::{NotificationReport, SweepReport, SweeperService};
use serde::{Deserialize, Serialize};
use tokio::{task::JoinHandle, time::interval};

/// Scheduled job types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledJob {
    /// Expired registrations and lapsed soft deletes.
    Cleanup,
    /// Cash-flow push reminders.
    Notifications,
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between cleanup sweeps (default: 1 hour).
    pub cleanup_interval: Duration,
    /// Interval between notification sweeps (default: 1 day).
    pub notification_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&SchedulerSettings::default())
    }
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            cleanup_interval: Duration::from_secs(settings.cleanup_interval_secs.max(1)),
            notification_interval: Duration::from_secs(settings.notification_interval_secs.max(1)),
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run both cleanup sweeps.
    async fn run_cleanup(&self) -> Result<SweepReport, AppError>;

    /// Dispatch due reminders.
    async fn run_notifications(&self) -> Result<NotificationReport, AppError>;
}

#[async_trait::async_trait]
impl JobExecutor for SweeperService {
    async fn run_cleanup(&self) -> Result<SweepReport, AppError> {
        Self::run_cleanup(self, Utc::now()).await
    }

    async fn run_notifications(&self) -> Result<NotificationReport, AppError> {
        Self::run_notifications(self, Utc::now()).await
    }
}

/// Spawn one loop per job. A failed run is logged and the loop carries on.
///
/// The first tick fires immediately.
pub fn run_scheduler<E: JobExecutor + 'static>(
    config: &SchedulerConfig,
    executor: Arc<E>,
) -> Vec<JoinHandle<()>> {
    let executor_cleanup = Arc::clone(&executor);
    let executor_notifications = executor;

    let cleanup_interval = config.cleanup_interval;
    let notification_interval = config.notification_interval;

    let cleanup = tokio::spawn(async move {
        let mut interval = interval(cleanup_interval);
        loop {
            interval.tick().await;
            match executor_cleanup.run_cleanup().await {
                Ok(report) => {
                    if report.unverified_removed > 0 || report.accounts_deleted > 0 {
                        tracing::info!(job = ?ScheduledJob::Cleanup, ?report, "Scheduled cleanup removed accounts");
                    }
                }
                Err(e) => {
                    tracing::error!(job = ?ScheduledJob::Cleanup, error = %e, "Scheduled cleanup failed");
                }
            }
        }
    });

    let notifications = tokio::spawn(async move {
        let mut interval = interval(notification_interval);
        loop {
            interval.tick().await;
            if let Err(e) = executor_notifications.run_notifications().await {
                tracing::error!(job = ?ScheduledJob::Notifications, error = %e, "Scheduled notifications failed");
            }
        }
    });

    vec![cleanup, notifications]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingExecutor {
        cleanups: AtomicU32,
        notifications: AtomicU32,
    }

    #[async_trait::async_trait]
    impl JobExecutor for CountingExecutor {
        async fn run_cleanup(&self) -> Result<SweepReport, AppError> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Database("connection reset".to_string()))
        }

        async fn run_notifications(&self) -> Result<NotificationReport, AppError> {
            self.notifications.fetch_add(1, Ordering::SeqCst);
            Ok(NotificationReport::default())
        }
    }

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
        assert_eq!(config.notification_interval, Duration::from_secs(86400));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let settings = SchedulerSettings {
            enabled: true,
            cleanup_interval_secs: 0,
            notification_interval_secs: 0,
        };
        let config = SchedulerConfig::from(&settings);
        assert_eq!(config.cleanup_interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let executor = Arc::new(CountingExecutor::default());
        let config = SchedulerConfig {
            cleanup_interval: Duration::from_millis(10),
            notification_interval: Duration::from_millis(10),
        };

        let handles = run_scheduler(&config, Arc::clone(&executor));
        tokio::time::sleep(Duration::from_millis(100)).await;
        for handle in handles {
            handle.abort();
        }

        assert!(executor.cleanups.load(Ordering::SeqCst) >= 2);
        assert!(executor.notifications.load(Ordering::SeqCst) >= 2);
    }
}
