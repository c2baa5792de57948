// src/schedule/refresh.rs
use crate::desk::ExchangeDesk;
use crate::domain::errors::ScheduleResult;
use crate::domain::models::RefreshInterval;
use crate::exchange::client::BalanceFeed;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

/// Owns the single repeating balance refresh of a dashboard.
///
/// Selecting an interval always cancels the running task before anything else happens.
/// The task is aborted when the scheduler is dropped.
pub struct RefreshScheduler {
    desk: Arc<ExchangeDesk>,
    feed: Arc<dyn BalanceFeed>,
    interval: RefreshInterval,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(desk: Arc<ExchangeDesk>, feed: Arc<dyn BalanceFeed>) -> Self {
        Self {
            desk,
            feed,
            interval: RefreshInterval::Now,
            task: None,
        }
    }

    /// Last selected interval
    pub fn interval(&self) -> RefreshInterval {
        self.interval
    }

    /// Whether a repeating refresh is scheduled
    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// Apply a dropdown selection
    pub async fn select(&mut self, interval: RefreshInterval) -> ScheduleResult<()> {
        self.cancel();
        self.interval = interval;

        match interval.period() {
            None => self.refresh_now().await,
            Some(period) => {
                self.start(period);
                Ok(())
            }
        }
    }

    /// Run one refresh immediately
    pub async fn refresh_now(&self) -> ScheduleResult<()> {
        log::info!("Refreshing balances...");
        self.desk.refresh_from(self.feed.as_ref()).await
    }

    /// Stop the repeating refresh, if any
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("Cancelled refresh task ({})", self.interval);
        }
    }

    fn start(&mut self, period: Duration) {
        let desk = self.desk.clone();
        let feed = self.feed.clone();
        let first_tick = Instant::now() + period;
        log::info!("Scheduling balance refresh every {:?}", period);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);

            loop {
                ticker.tick().await;
                if let Err(e) = desk.refresh_from(feed.as_ref()).await {
                    log::error!("Scheduled refresh failed: {}", e);
                }
            }
        }));
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
