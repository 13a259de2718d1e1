use crate::core::error::SyncError;
use crate::scheduler::backoff::{BackoffPolicy, BackoffState};
use crate::scheduler::status::{self, ConnectionStatus};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// What a successful poll yielded. The distinction drives backoff: data
/// resets the factor, an empty poll grows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Empty,
    Data,
}

pub type PollFuture = Pin<Box<dyn Future<Output = Result<PollOutcome, SyncError>> + Send>>;
pub type PollFn = Box<dyn FnMut() -> PollFuture + Send>;
pub type StatusCallback = Box<dyn Fn(ConnectionStatus) + Send>;
pub type ErrorCallback = Box<dyn Fn(&SyncError, u32) + Send>;

pub struct SchedulerConfig {
    /// Name used in log fields.
    pub name: String,
    /// Base interval between polls; the effective delay is
    /// `interval * backoff_factor`.
    pub interval: Duration,
    pub backoff: BackoffPolicy,
    pub poll_fn: PollFn,
    pub on_status_change: Option<StatusCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl SchedulerConfig {
    pub fn new(name: impl Into<String>, interval: Duration, poll_fn: PollFn) -> Self {
        Self {
            name: name.into(),
            interval,
            backoff: BackoffPolicy::default_multiplicative(),
            poll_fn,
            on_status_change: None,
            on_error: None,
        }
    }
}

#[derive(Debug)]
enum Command {
    Start,
    Pause,
    Resume,
    Stop,
}

/// Clonable control surface for one scheduler task. All operations are
/// fire-and-forget signals; illegal transitions are no-ops inside the
/// task. After `stop` the task is terminal and every further signal is
/// ignored; a new scheduler must be spawned to poll again.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    pub fn start(&self) {
        let _ = self.tx.send(Command::Start);
    }

    pub fn pause(&self) {
        let _ = self.tx.send(Command::Pause);
    }

    pub fn resume(&self) {
        let _ = self.tx.send(Command::Resume);
    }

    pub fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }
}

/// Generic interval-based execution engine: repeatedly runs a fetch
/// callback with adaptive backoff, pause/resume, and a terminal stop.
/// Owns no domain knowledge; screens supply the poll future.
pub struct PollScheduler;

impl PollScheduler {
    /// Spawn the scheduler task. It idles until `start()` is signalled.
    pub fn spawn(config: SchedulerConfig) -> SchedulerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = PollTask {
            name: config.name,
            interval: config.interval,
            backoff: BackoffState::new(config.backoff),
            poll_fn: config.poll_fn,
            on_status_change: config.on_status_change,
            on_error: config.on_error,
            running: false,
            paused: false,
            stopped: false,
            in_flight: false,
            last_status: None,
        };
        tokio::spawn(task.run(rx));
        SchedulerHandle { tx }
    }
}

struct PollTask {
    name: String,
    interval: Duration,
    backoff: BackoffState,
    poll_fn: PollFn,
    on_status_change: Option<StatusCallback>,
    on_error: Option<ErrorCallback>,
    running: bool,
    paused: bool,
    stopped: bool,
    in_flight: bool,
    last_status: Option<ConnectionStatus>,
}

impl PollTask {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        // Deadline of the pending tick; None while created, paused, or
        // between a poll and its reschedule.
        let mut next_tick: Option<Instant> = None;

        loop {
            let timer_armed =
                self.running && !self.paused && !self.stopped && next_tick.is_some();
            let deadline = next_tick.unwrap_or_else(Instant::now);

            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    match cmd {
                        Command::Start if !self.running => {
                            self.running = true;
                            tracing::debug!(scheduler = %self.name, "Scheduler started");
                            self.tick().await;
                            if self.stopped {
                                break;
                            }
                            next_tick = Some(self.next_deadline());
                        }
                        Command::Pause if self.running && !self.paused => {
                            // Cancels the pending tick; failures and
                            // backoff are preserved for resume.
                            self.paused = true;
                            next_tick = None;
                            tracing::debug!(scheduler = %self.name, "Scheduler paused");
                        }
                        Command::Resume if self.running && self.paused => {
                            self.paused = false;
                            tracing::debug!(scheduler = %self.name, "Scheduler resumed");
                            self.tick().await;
                            if self.stopped {
                                break;
                            }
                            next_tick = Some(self.next_deadline());
                        }
                        Command::Stop => break,
                        _ => {} // illegal transition, no-op
                    }
                }
                _ = tokio::time::sleep_until(deadline), if timer_armed => {
                    self.tick().await;
                    if self.stopped {
                        break;
                    }
                    next_tick = Some(self.next_deadline());
                }
            }
        }

        tracing::debug!(scheduler = %self.name, "Scheduler stopped");
    }

    fn next_deadline(&self) -> Instant {
        Instant::now() + self.backoff.current_delay(self.interval)
    }

    async fn tick(&mut self) {
        // At most one outstanding fetch per scheduler; an overlapping
        // tick is skipped entirely, never queued.
        if self.in_flight {
            return;
        }
        self.in_flight = true;
        let fut = (self.poll_fn)();
        let result = fut.await;
        self.in_flight = false;

        match result {
            Ok(PollOutcome::Data) => {
                self.backoff.record_data();
            }
            Ok(PollOutcome::Empty) => {
                self.backoff.record_empty();
            }
            Err(e) => {
                self.backoff.record_failure();
                let failures = self.backoff.consecutive_failures();
                tracing::warn!(
                    scheduler = %self.name,
                    error = %e,
                    failures,
                    "Poll failed"
                );
                if let Some(cb) = &self.on_error {
                    cb(&e, failures);
                }
                if e.is_auth() {
                    // Session is dead; keep the caller's teardown path out
                    // of a tight failure loop.
                    tracing::warn!(scheduler = %self.name, "Auth failure, stopping scheduler");
                    self.stopped = true;
                }
            }
        }

        self.report_status();
    }

    fn report_status(&mut self) {
        let current = status::project(self.backoff.consecutive_failures());
        if self.last_status != Some(current) {
            self.last_status = Some(current);
            if let Some(cb) = &self.on_status_change {
                cb(current);
            }
        }
    }
}
