//! In-flight and completed synthesis jobs, keyed by token

use crate::error::TtsError;
use crate::types::{JobToken, SynthesisOutput};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Observable state of a synthesis job
#[derive(Debug, Clone)]
pub enum JobState {
    Pending,
    Completed(SynthesisOutput),
    /// Finished without producing audio (missing message or target path)
    Skipped,
    Failed(Arc<TtsError>),
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

/// Handle to one synthesis attempt
///
/// The work runs on the tokio scheduler whether or not anyone awaits it.
/// Handles are cheap to clone and every clone observes the same outcome.
#[derive(Debug, Clone)]
pub struct SynthesisJob {
    token: JobToken,
    target_path: PathBuf,
    created_at: Instant,
    finished_at: Arc<Mutex<Option<Instant>>>,
    state: watch::Receiver<JobState>,
}

/// Publishes the final state exactly once, even when the work panics
struct Completion {
    token: JobToken,
    finished_at: Arc<Mutex<Option<Instant>>>,
    sender: Option<watch::Sender<JobState>>,
}

impl Completion {
    fn finish(mut self, state: JobState) {
        self.publish(state);
    }

    fn publish(&mut self, state: JobState) {
        if let Some(sender) = self.sender.take() {
            // Stamped before the state becomes visible
            *self.finished_at.lock() = Some(Instant::now());
            debug!("Job {} finished: {:?}", self.token, state);
            // No receivers left means nobody can observe the job anymore
            let _ = sender.send(state);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.sender.is_some() {
            warn!("Synthesis task for {} ended without a result", self.token);
            let error = TtsError::Remote(format!("Synthesis task for {} ended without a result", self.token));
            self.publish(JobState::Failed(Arc::new(error)));
        }
    }
}

impl SynthesisJob {
    /// Start `work` in the background and track its outcome
    pub fn spawn<F>(token: JobToken, target_path: PathBuf, work: F) -> Self
    where
        F: Future<Output = Result<Option<SynthesisOutput>, TtsError>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(JobState::Pending);
        let finished_at = Arc::new(Mutex::new(None));
        let completion = Completion {
            token: token.clone(),
            finished_at: Arc::clone(&finished_at),
            sender: Some(sender),
        };

        tokio::spawn(async move {
            let state = match work.await {
                Ok(Some(output)) => JobState::Completed(output),
                Ok(None) => JobState::Skipped,
                Err(e) => JobState::Failed(Arc::new(e)),
            };
            completion.finish(state);
        });

        Self {
            token,
            target_path,
            created_at: Instant::now(),
            finished_at,
            state: receiver,
        }
    }

    pub fn token(&self) -> &JobToken {
        &self.token
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// When the job reached its final state; `None` while pending
    pub fn finished_at(&self) -> Option<Instant> {
        *self.finished_at.lock()
    }

    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state.borrow().is_finished()
    }

    /// Suspend until the job completes or fails
    pub async fn wait(&self) -> Result<Option<SynthesisOutput>, Arc<TtsError>> {
        let mut receiver = self.state.clone();

        loop {
            let state = receiver.borrow_and_update().clone();
            if let Some(result) = into_result(state) {
                return result;
            }

            if receiver.changed().await.is_err() {
                let state = receiver.borrow().clone();
                return into_result(state).unwrap_or_else(|| {
                    Err(Arc::new(TtsError::Remote(format!(
                        "Synthesis task for {} ended without a result",
                        self.token
                    ))))
                });
            }
        }
    }
}

fn into_result(state: JobState) -> Option<Result<Option<SynthesisOutput>, Arc<TtsError>>> {
    match state {
        JobState::Pending => None,
        JobState::Completed(output) => Some(Ok(Some(output))),
        JobState::Skipped => Some(Ok(None)),
        JobState::Failed(e) => Some(Err(e)),
    }
}

/// Process-wide token -> job map
///
/// Inserts for different tokens never block each other. Finished jobs are
/// released either explicitly through [`JobRegistry::remove`] or by age
/// through [`JobRegistry::evict_expired`]; pending jobs are never evicted.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<DashMap<JobToken, SynthesisJob>>,
    retention: Option<Duration>,
}

impl JobRegistry {
    pub fn new(retention: Option<Duration>) -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
            retention,
        }
    }

    /// Insert unconditionally; the last write wins on a key collision
    pub fn register(&self, token: JobToken, job: SynthesisJob) {
        if let Some(previous) = self.jobs.insert(token, job) {
            warn!("Job token {} was already registered; replaced", previous.token());
        }
    }

    pub fn get(&self, token: &JobToken) -> Option<SynthesisJob> {
        self.jobs.get(token).map(|entry| entry.value().clone())
    }

    /// Explicit acknowledgement by the consumer
    pub fn remove(&self, token: &JobToken) -> Option<SynthesisJob> {
        self.jobs.remove(token).map(|(_, job)| job)
    }

    /// Drop jobs that finished at least `older_than` ago
    pub fn evict_finished(&self, older_than: Duration) -> usize {
        let mut evicted = 0;
        self.jobs.retain(|_, job| {
            let expired = job
                .finished_at()
                .map_or(false, |finished| finished.elapsed() >= older_than);
            if expired {
                evicted += 1;
            }
            !expired
        });

        if evicted > 0 {
            debug!("Evicted {} finished synthesis jobs", evicted);
        }
        evicted
    }

    /// Apply the configured retention window, if any
    pub fn evict_expired(&self) -> usize {
        match self.retention {
            Some(retention) => self.evict_finished(retention),
            None => 0,
        }
    }

    pub fn retention(&self) -> Option<Duration> {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn tokens(&self) -> Vec<JobToken> {
        self.jobs.iter().map(|entry| entry.key().clone()).collect()
    }
}
