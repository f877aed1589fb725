//! Periodic "chron" triggers backed by tokio timers
//!
//! Timer tasks never touch the interpreter. Each tick is sent over a channel
//! and whoever drives the interpreter calls `Interpreter::fire_chron`.

use std::time::Duration;

use indexmap::IndexMap;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use super::errors::{Result, RuntimeError};

/// One elapsed period of a named chron
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronTick {
    pub name: String,
}

/// Host scheduling primitive behind `chron`, `stop-chron` and `every:`
pub trait ChronScheduler: Send {
    /// Start (or restart) the chron `name`
    fn start(&mut self, name: &str, period: Duration) -> Result<()>;

    /// Stop the chron `name`, reporting whether it was running
    fn stop(&mut self, name: &str) -> bool;

    /// Running chrons in start order
    fn active(&self) -> Vec<(String, Duration)>;
}

/// Runs each chron as a tokio interval task
pub struct TokioChronScheduler {
    tasks: IndexMap<String, (Duration, JoinHandle<()>)>,
    ticks: UnboundedSender<ChronTick>,
}

impl TokioChronScheduler {
    pub fn new(ticks: UnboundedSender<ChronTick>) -> Self {
        Self {
            tasks: IndexMap::new(),
            ticks,
        }
    }
}

impl ChronScheduler for TokioChronScheduler {
    fn start(&mut self, name: &str, period: Duration) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            RuntimeError::Scheduler(format!("cannot start chron '{}' outside a tokio runtime", name))
        })?;

        if let Some((_, previous)) = self.tasks.shift_remove(name) {
            debug!(chron = name, "Replacing running chron");
            previous.abort();
        }

        // tokio intervals reject a zero period
        let period = period.max(Duration::from_millis(1));
        let ticks = self.ticks.clone();
        let tick_name = name.to_string();
        let task = handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let tick = ChronTick {
                    name: tick_name.clone(),
                };
                if ticks.send(tick).is_err() {
                    debug!(chron = %tick_name, "Tick receiver dropped, stopping chron");
                    break;
                }
            }
        });

        info!(chron = name, period_ms = period.as_millis() as u64, "Started chron");
        self.tasks.insert(name.to_string(), (period, task));
        Ok(())
    }

    fn stop(&mut self, name: &str) -> bool {
        match self.tasks.shift_remove(name) {
            Some((_, task)) => {
                task.abort();
                info!(chron = name, "Stopped chron");
                true
            }
            None => false,
        }
    }

    fn active(&self) -> Vec<(String, Duration)> {
        self.tasks
            .iter()
            .map(|(name, (period, _))| (name.clone(), *period))
            .collect()
    }
}

impl Drop for TokioChronScheduler {
    fn drop(&mut self) {
        for (_, (_, task)) in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_chron_ticks_after_each_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioChronScheduler::new(tx);
        scheduler.start("refresh", Duration::from_secs(5)).unwrap();

        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert!(rx.try_recv().is_err());

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.name, "refresh");
        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.name, "refresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_and_stop_reports() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioChronScheduler::new(tx);
        scheduler.start("poll", Duration::from_secs(1)).unwrap();
        scheduler.start("poll", Duration::from_secs(2)).unwrap();

        assert_eq!(
            scheduler.active(),
            vec![("poll".to_string(), Duration::from_secs(2))]
        );
        assert!(scheduler.stop("poll"));
        assert!(!scheduler.stop("poll"));
        assert!(scheduler.active().is_empty());
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioChronScheduler::new(tx);
        let err = scheduler.start("poll", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RuntimeError::Scheduler(_)));
    }
}
