use std::{sync::Arc, time::Duration};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::{
    interpreter::{
        console::BufferConsole, errors::Result, scheduler::ChronScheduler, Interpreter,
    },
    BasslineConfig,
};

/// Scheduler double that records calls instead of spawning timers
#[derive(Clone, Default)]
pub(crate) struct RecordingScheduler {
    started: Arc<Mutex<Vec<(String, Duration)>>>,
    stopped: Arc<Mutex<Vec<String>>>,
    running: Arc<Mutex<IndexMap<String, Duration>>>,
}

impl RecordingScheduler {
    pub(crate) fn started(&self) -> Vec<(String, Duration)> {
        self.started.lock().clone()
    }

    pub(crate) fn stopped(&self) -> Vec<String> {
        self.stopped.lock().clone()
    }
}

impl ChronScheduler for RecordingScheduler {
    fn start(&mut self, name: &str, period: Duration) -> Result<()> {
        self.started.lock().push((name.to_string(), period));
        self.running.lock().insert(name.to_string(), period);
        Ok(())
    }

    fn stop(&mut self, name: &str) -> bool {
        self.stopped.lock().push(name.to_string());
        self.running.lock().shift_remove(name).is_some()
    }

    fn active(&self) -> Vec<(String, Duration)> {
        self.running
            .lock()
            .iter()
            .map(|(name, period)| (name.clone(), *period))
            .collect()
    }
}

pub(crate) struct Harness {
    pub rt: Interpreter,
    pub console: Arc<BufferConsole>,
    pub scheduler: RecordingScheduler,
}

/// Interpreter with a buffered console and a recording scheduler
pub(crate) fn harness() -> Harness {
    let console = Arc::new(BufferConsole::new());
    let scheduler = RecordingScheduler::default();
    let rt = Interpreter::new(BasslineConfig::default())
        .unwrap()
        .with_console(console.clone())
        .with_scheduler(Box::new(scheduler.clone()));
    Harness {
        rt,
        console,
        scheduler,
    }
}
