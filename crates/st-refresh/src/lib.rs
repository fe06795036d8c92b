//! # st-refresh
//!
//! Scheduled-refresh coordination for SiteTrack dashboards.
//!
//! Dashboards keep their data fresh two ways: a polling interval and
//! window events (focus regained, page visible again). Instead of
//! scattering effect hooks, both run through one coordinator whose cadence
//! and triggers are configuration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use st_core::config::RefreshConfig;

/// What caused a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// The polling interval elapsed
    Interval,
    /// The window regained focus
    Focus,
    /// The page became visible again
    Visibility,
    /// The user asked for a refresh
    Manual,
}

/// Cadence and trigger configuration
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    /// Polling interval; None disables interval refresh
    pub interval: Option<Duration>,
    pub on_focus: bool,
    pub on_visibility: bool,
    /// Minimum spacing between refreshes; events landing inside the window
    /// are dropped, the data is still fresh
    pub min_spacing: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(60)),
            on_focus: true,
            on_visibility: true,
            min_spacing: Duration::from_secs(5),
        }
    }
}

impl From<&RefreshConfig> for RefreshPolicy {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            interval: config.interval_seconds.map(Duration::from_secs),
            on_focus: config.refresh_on_focus,
            on_visibility: config.refresh_on_visibility,
            min_spacing: Duration::from_secs(config.min_spacing_seconds),
        }
    }
}

impl RefreshPolicy {
    /// Whether an external trigger is enabled under this policy
    pub fn accepts(&self, trigger: RefreshTrigger) -> bool {
        match trigger {
            RefreshTrigger::Interval | RefreshTrigger::Manual => true,
            RefreshTrigger::Focus => self.on_focus,
            RefreshTrigger::Visibility => self.on_visibility,
        }
    }
}

/// The refresh action itself — typically a re-fetch of dashboard data
#[async_trait]
pub trait RefreshHandler: Send + Sync {
    async fn refresh(&self, trigger: RefreshTrigger);
}

/// Feeds external events (focus, visibility, manual) into a running
/// coordinator. Cheap to clone into event listeners.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<RefreshTrigger>,
}

impl RefreshHandle {
    pub fn notify(&self, trigger: RefreshTrigger) {
        // A closed channel means the coordinator shut down; late events
        // are irrelevant then
        let _ = self.tx.send(trigger);
    }
}

/// Drives refreshes from the interval tick and external events.
pub struct RefreshCoordinator<H: RefreshHandler> {
    policy: RefreshPolicy,
    handler: Arc<H>,
    tx: mpsc::UnboundedSender<RefreshTrigger>,
    rx: mpsc::UnboundedReceiver<RefreshTrigger>,
    last_refresh: Option<Instant>,
}

impl<H: RefreshHandler> RefreshCoordinator<H> {
    pub fn new(policy: RefreshPolicy, handler: Arc<H>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            policy,
            handler,
            tx,
            rx,
            last_refresh: None,
        }
    }

    pub fn handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run until the shutdown signal flips to true.
    ///
    /// The first interval tick completes immediately, which doubles as the
    /// initial load; `min_spacing` then guards against event bursts right
    /// after it.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = self.policy.interval.map(tokio::time::interval);
        info!(interval = ?self.policy.interval, "Refresh coordinator started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = tick(&mut ticker) => {
                    self.fire(RefreshTrigger::Interval).await;
                }
                Some(trigger) = self.rx.recv() => {
                    if self.policy.accepts(trigger) {
                        self.fire(trigger).await;
                    } else {
                        debug!(?trigger, "Trigger disabled by policy, dropped");
                    }
                }
            }
        }

        info!("Refresh coordinator stopped");
    }

    async fn fire(&mut self, trigger: RefreshTrigger) {
        if let Some(last) = self.last_refresh {
            if last.elapsed() < self.policy.min_spacing {
                debug!(?trigger, "Refresh inside spacing window, dropped");
                return;
            }
        }
        self.last_refresh = Some(Instant::now());
        debug!(?trigger, "Refreshing");
        self.handler.refresh(trigger).await;
    }
}

async fn tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        triggers: Mutex<Vec<RefreshTrigger>>,
    }

    impl RecordingHandler {
        fn triggers(&self) -> Vec<RefreshTrigger> {
            self.triggers.lock().map(|t| t.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl RefreshHandler for RecordingHandler {
        async fn refresh(&self, trigger: RefreshTrigger) {
            if let Ok(mut triggers) = self.triggers.lock() {
                triggers.push(trigger);
            }
        }
    }

    fn event_only_policy() -> RefreshPolicy {
        RefreshPolicy {
            interval: None,
            min_spacing: Duration::ZERO,
            ..RefreshPolicy::default()
        }
    }

    #[test]
    fn test_policy_accepts() {
        let policy = RefreshPolicy {
            on_focus: false,
            ..RefreshPolicy::default()
        };
        assert!(!policy.accepts(RefreshTrigger::Focus));
        assert!(policy.accepts(RefreshTrigger::Visibility));
        assert!(policy.accepts(RefreshTrigger::Manual));
    }

    #[tokio::test]
    async fn test_events_drive_refreshes() {
        let handler = Arc::new(RecordingHandler::default());
        let coordinator = RefreshCoordinator::new(event_only_policy(), handler.clone());
        let handle = coordinator.handle();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(coordinator.run(shutdown_rx));

        handle.notify(RefreshTrigger::Manual);
        handle.notify(RefreshTrigger::Focus);
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(
            handler.triggers(),
            vec![RefreshTrigger::Manual, RefreshTrigger::Focus]
        );
    }

    #[tokio::test]
    async fn test_disabled_triggers_are_dropped() {
        let handler = Arc::new(RecordingHandler::default());
        let policy = RefreshPolicy {
            on_focus: false,
            on_visibility: false,
            ..event_only_policy()
        };
        let coordinator = RefreshCoordinator::new(policy, handler.clone());
        let handle = coordinator.handle();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(coordinator.run(shutdown_rx));

        handle.notify(RefreshTrigger::Focus);
        handle.notify(RefreshTrigger::Visibility);
        handle.notify(RefreshTrigger::Manual);
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(handler.triggers(), vec![RefreshTrigger::Manual]);
    }

    #[tokio::test]
    async fn test_min_spacing_coalesces_bursts() {
        let handler = Arc::new(RecordingHandler::default());
        let policy = RefreshPolicy {
            interval: None,
            min_spacing: Duration::from_secs(60),
            ..RefreshPolicy::default()
        };
        let coordinator = RefreshCoordinator::new(policy, handler.clone());
        let handle = coordinator.handle();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(coordinator.run(shutdown_rx));

        handle.notify(RefreshTrigger::Manual);
        handle.notify(RefreshTrigger::Focus);
        handle.notify(RefreshTrigger::Visibility);
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        // Only the first of the burst lands; the rest are inside the window
        assert_eq!(handler.triggers().len(), 1);
    }

    #[tokio::test]
    async fn test_interval_refreshes() {
        let handler = Arc::new(RecordingHandler::default());
        let policy = RefreshPolicy {
            interval: Some(Duration::from_millis(20)),
            min_spacing: Duration::ZERO,
            ..RefreshPolicy::default()
        };
        let coordinator = RefreshCoordinator::new(policy, handler.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(coordinator.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(90)).await;

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        let triggers = handler.triggers();
        assert!(triggers.len() >= 2, "expected repeated ticks, got {:?}", triggers);
        assert!(triggers.iter().all(|t| *t == RefreshTrigger::Interval));
    }
}
