use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use agromart_core::JobLock;
use agromart_offer::{JobKind, MonitorError, OfferMonitor};
use agromart_shared::{ScanReport, SweepReport};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JobReport {
    Scan(ScanReport),
    Sweep(SweepReport),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("Job lock unavailable: {0}")]
    Lock(String),
}

impl RunError {
    pub fn is_already_running(&self) -> bool {
        matches!(self, RunError::Monitor(MonitorError::AlreadyRunning(_)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded { report: JobReport },
    Skipped { reason: String },
    Failed { error: String },
}

/// Last known state of one job, as shown on `/admin/jobs`.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub job: JobKind,
    pub runs: u64,
    pub running: bool,
    pub last_started: Option<DateTime<Utc>>,
    pub last_finished: Option<DateTime<Utc>>,
    pub last_outcome: Option<JobOutcome>,
}

impl JobStatus {
    fn idle(job: JobKind) -> Self {
        Self {
            job,
            runs: 0,
            running: false,
            last_started: None,
            last_finished: None,
            last_outcome: None,
        }
    }
}

#[derive(Default)]
pub struct JobBoard {
    entries: RwLock<HashMap<JobKind, JobStatus>>,
}

impl JobBoard {
    /// Marks `job` running unless it already is. Check and set happen under
    /// one write lock, so only one caller can win.
    async fn try_start(&self, job: JobKind, at: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(job).or_insert_with(|| JobStatus::idle(job));
        if entry.running {
            return false;
        }
        entry.running = true;
        entry.last_started = Some(at);
        true
    }

    async fn finished(&self, job: JobKind, outcome: JobOutcome) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(job).or_insert_with(|| JobStatus::idle(job));
        entry.running = false;
        entry.runs += 1;
        entry.last_finished = Some(Utc::now());
        entry.last_outcome = Some(outcome);
    }

    async fn skipped(&self, job: JobKind, reason: String) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(job).or_insert_with(|| JobStatus::idle(job));
        entry.last_outcome = Some(JobOutcome::Skipped { reason });
    }

    /// A started run that never reached the job body.
    async fn withdrawn(&self, job: JobKind, reason: String) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(job).or_insert_with(|| JobStatus::idle(job));
        entry.running = false;
        entry.last_outcome = Some(JobOutcome::Skipped { reason });
    }

    pub async fn snapshot(&self) -> Vec<JobStatus> {
        let entries = self.entries.read().await;
        JobKind::ALL
            .into_iter()
            .map(|job| entries.get(&job).cloned().unwrap_or_else(|| JobStatus::idle(job)))
            .collect()
    }
}

/// Runs lifecycle jobs under the optional cross-process lock and records
/// every outcome on the [`JobBoard`].
pub struct JobRunner {
    monitor: Arc<OfferMonitor>,
    lock: Option<Arc<dyn JobLock>>,
    lock_ttl: Duration,
    board: JobBoard,
}

impl JobRunner {
    pub fn new(monitor: Arc<OfferMonitor>, lock: Option<Arc<dyn JobLock>>, lock_ttl: Duration) -> Self {
        Self {
            monitor,
            lock,
            lock_ttl,
            board: JobBoard::default(),
        }
    }

    pub fn board(&self) -> &JobBoard {
        &self.board
    }

    pub async fn run(&self, job: JobKind) -> Result<JobReport, RunError> {
        let Some(lock) = &self.lock else {
            return self.run_unlocked(job).await;
        };

        match lock.try_acquire(job.slug(), self.lock_ttl).await {
            Ok(true) => {}
            Ok(false) => {
                self.board.skipped(job, "held by another instance".to_string()).await;
                return Err(MonitorError::AlreadyRunning(job).into());
            }
            Err(e) => {
                // Fail closed.
                let err = RunError::Lock(e.to_string());
                self.board.finished(job, JobOutcome::Failed { error: err.to_string() }).await;
                return Err(err);
            }
        }

        let result = self.run_holding(lock.as_ref(), job).await;

        if let Err(e) = lock.release(job.slug()).await {
            warn!(job = %job, error = %e, "Failed to release job lock");
        }
        result
    }

    /// Runs `job` while extending the lock every third of its TTL. A run that
    /// can no longer prove it holds the lock is abandoned mid-flight.
    async fn run_holding(&self, lock: &dyn JobLock, job: JobKind) -> Result<JobReport, RunError> {
        let period = (self.lock_ttl / 3).max(Duration::from_millis(100));
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let run = self.run_unlocked(job);
        tokio::pin!(run);

        let lost = loop {
            tokio::select! {
                biased;
                result = &mut run => return result,
                _ = heartbeat.tick() => match lock.extend(job.slug(), self.lock_ttl).await {
                    Ok(true) => debug!(job = %job, "Job lock extended"),
                    Ok(false) => break "lock taken over or expired".to_string(),
                    Err(e) => break e.to_string(),
                },
            }
        };

        let err = RunError::Lock(format!("lost during run: {}", lost));
        error!(job = %job, error = %err, "Abandoning run");
        self.board.finished(job, JobOutcome::Failed { error: err.to_string() }).await;
        Err(err)
    }

    async fn run_unlocked(&self, job: JobKind) -> Result<JobReport, RunError> {
        if !self.board.try_start(job, Utc::now()).await {
            self.board.skipped(job, "already running in this process".to_string()).await;
            return Err(MonitorError::AlreadyRunning(job).into());
        }

        let result = match job {
            JobKind::ScanAndWarn => self.monitor.scan_and_warn().await.map(JobReport::Scan),
            JobKind::SweepExpired => self.monitor.sweep_expired().await.map(JobReport::Sweep),
        };

        match result {
            Ok(report) => {
                self.board.finished(job, JobOutcome::Succeeded { report }).await;
                Ok(report)
            }
            Err(MonitorError::AlreadyRunning(job)) => {
                self.board.withdrawn(job, "already running in this process".to_string()).await;
                Err(MonitorError::AlreadyRunning(job).into())
            }
            Err(e) => {
                self.board.finished(job, JobOutcome::Failed { error: e.to_string() }).await;
                Err(e.into())
            }
        }
    }
}

/// Fire `job` every `period` until `shutdown` flips. A run in progress is
/// allowed to finish; missed ticks are delayed rather than bunched up.
pub fn spawn_schedule(
    runner: Arc<JobRunner>,
    job: JobKind,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(job = %job, interval_secs = period.as_secs(), "Scheduled job started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!(job = %job, "Scheduled job stopping");
                    break;
                }
                _ = interval.tick() => {
                    match runner.run(job).await {
                        Ok(report) => debug!(job = %job, ?report, "Scheduled run finished"),
                        Err(e) if e.is_already_running() => {
                            warn!(job = %job, "Previous run still in flight, skipping tick");
                        }
                        Err(e) => error!(job = %job, error = %e, "Scheduled run failed"),
                    }
                }
            }
        }
    })
}
