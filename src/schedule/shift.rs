// src/schedule/shift.rs
use crate::format::format_duration;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftState {
    Running,
    OnBreak,
    ClockedOut,
}

/// Clock-in/out session timer for the desk operator
#[derive(Debug, Clone)]
pub struct ShiftClock {
    elapsed_secs: u64,
    state: ShiftState,
    break_started: Option<DateTime<Utc>>,
}

impl ShiftClock {
    pub fn new(initial: Duration, active: bool) -> Self {
        Self {
            elapsed_secs: initial.as_secs(),
            state: if active { ShiftState::Running } else { ShiftState::ClockedOut },
            break_started: None,
        }
    }

    pub fn state(&self) -> ShiftState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(self.elapsed_secs)
    }

    /// Count one second of shift time; breaks and clocked-out time are not counted
    pub fn tick(&mut self) {
        if self.state == ShiftState::Running {
            self.elapsed_secs += 1;
        }
    }

    /// Start or end a break. Has no effect while clocked out.
    pub fn toggle_break(&mut self, now: DateTime<Utc>) -> ShiftState {
        match self.state {
            ShiftState::Running => {
                self.state = ShiftState::OnBreak;
                self.break_started = Some(now);
                log::info!("Break started");
            }
            ShiftState::OnBreak => {
                self.state = ShiftState::Running;
                self.break_started = None;
                log::info!("Break ended");
            }
            ShiftState::ClockedOut => {}
        }
        self.state
    }

    /// Length of the current break as `MM:SS`
    pub fn break_duration(&self, now: DateTime<Utc>) -> String {
        let Some(started) = self.break_started else {
            return "00:00".to_string();
        };

        let secs = (now - started).num_seconds().max(0);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Stop the shift and return the time worked
    pub fn clock_out(&mut self) -> Duration {
        self.state = ShiftState::ClockedOut;
        self.break_started = None;
        log::info!("Clocking out after {}", self.display());
        self.elapsed()
    }

    pub fn clock_in(&mut self) {
        if self.state == ShiftState::ClockedOut {
            self.state = ShiftState::Running;
            log::info!("Clocking in at {}", self.display());
        }
    }

    /// Shift time as `HH:MM:SS`
    pub fn display(&self) -> String {
        let hours = self.elapsed_secs / 3600;
        let minutes = (self.elapsed_secs % 3600) / 60;
        let seconds = self.elapsed_secs % 60;
        format_duration(hours, minutes, seconds)
    }
}

impl Default for ShiftClock {
    fn default() -> Self {
        Self::new(Duration::ZERO, true)
    }
}

/// Drives a shared [`ShiftClock`] once per second until dropped
pub struct ShiftTimer {
    clock: Arc<Mutex<ShiftClock>>,
    task: JoinHandle<()>,
}

impl ShiftTimer {
    pub fn start(clock: ShiftClock) -> Self {
        let clock = Arc::new(Mutex::new(clock));
        let ticking = clock.clone();
        let second = Duration::from_secs(1);
        let mut ticker = tokio::time::interval_at(Instant::now() + second, second);

        let task = tokio::spawn(async move {
            loop {
                ticker.tick().await;
                ticking
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .tick();
            }
        });

        Self { clock, task }
    }

    pub fn clock(&self) -> Arc<Mutex<ShiftClock>> {
        self.clock.clone()
    }

    /// Current state of the clock
    pub fn snapshot(&self) -> ShiftClock {
        self.clock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Drop for ShiftTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
