//! Sequential commit of pending rotations.
//!
//! # Protocol
//!
//! 1. Snapshot every thumbnail with a non-zero pending angle into a
//!    [`CommitQueue`]. Changes made after the snapshot belong to the next
//!    commit.
//! 2. Run the queue one task at a time: `Pending → InFlight → Resolved`.
//!    Request *n + 1* is not issued before outcome *n* has been classified and
//!    settled.
//! 3. Settle every task regardless of outcome: refresh the display source on
//!    success, then drop the thumbnail's selection and pending angle and clear
//!    its preview. Nothing is retried.
//!
//! One task's failure never stops or rolls back the others. Failures are
//! reported through the log, not through the return value.
//!
//! # Cancellation
//!
//! An in-flight request cannot be aborted. If the session is cancelled while
//! a commit runs, the in-flight task is still classified and settled, and the
//! tasks that have not started are abandoned without issuing requests.

mod backend;
mod outcome;

pub use backend::{RotateBackend, RotateReply, RotateRequest, TransportError};
pub use outcome::{cache_busted, classify, RotateOutcome};

use crate::identity::IdentityKey;
use crate::session::RotationSession;
use crate::surface::ThumbnailSurface;
use log::{error, info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use thiserror::Error;

/// Error types for commit requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    /// A commit is already running on this session.
    #[error("A commit is already in progress")]
    AlreadyRunning,
}

/// Lifecycle of a single commit task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPhase {
    Pending,
    InFlight,
    Resolved(RotateOutcome),
}

/// One rotation to send, captured at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitTask {
    pub slot: usize,
    pub key: IdentityKey,
    pub request: RotateRequest,
    pub phase: TaskPhase,
}

impl CommitTask {
    /// Outcome of a resolved task.
    pub fn outcome(&self) -> Option<&RotateOutcome> {
        match &self.phase {
            TaskPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Tasks captured from one snapshot, processed front to back.
#[derive(Debug, Clone, Default)]
pub struct CommitQueue {
    tasks: VecDeque<CommitTask>,
    generation: u64,
}

impl CommitQueue {
    /// Capture the pending entries of `session`.
    pub fn snapshot<S: ThumbnailSurface>(session: &RotationSession<S>) -> Self {
        let tasks = session
            .pending_entries()
            .map(|entry| {
                let filename = entry
                    .thumbnail
                    .request_filename()
                    .unwrap_or_else(|| entry.key.to_string());
                CommitTask {
                    slot: entry.slot,
                    key: entry.key.clone(),
                    request: RotateRequest::new(filename, entry.degrees),
                    phase: TaskPhase::Pending,
                }
            })
            .collect();

        Self {
            tasks,
            generation: session.generation(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &CommitTask> {
        self.tasks.iter()
    }

    fn pop(&mut self) -> Option<CommitTask> {
        self.tasks.pop_front()
    }
}

/// What happened during one commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitSummary {
    /// Tasks that were sent, in order, with their outcomes.
    pub resolved: Vec<CommitTask>,
    /// Tasks dropped without a request because the session was cancelled.
    pub abandoned: Vec<CommitTask>,
}

impl CommitSummary {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.abandoned.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.resolved
            .iter()
            .filter(|task| task.outcome().is_some_and(RotateOutcome::is_success))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.resolved.len() - self.succeeded()
    }

    /// Flatten into a serializable report for hosts.
    pub fn report(&self) -> CommitReport {
        let failures = self
            .resolved
            .iter()
            .filter_map(|task| match task.outcome()? {
                RotateOutcome::Rejected { error } => Some(FailedRotation {
                    filename: task.request.filename.clone(),
                    reason: error.to_string(),
                }),
                RotateOutcome::Failed(err) => Some(FailedRotation {
                    filename: task.request.filename.clone(),
                    reason: err.to_string(),
                }),
                _ => None,
            })
            .collect();

        CommitReport {
            succeeded: self.succeeded(),
            failures,
            abandoned: self
                .abandoned
                .iter()
                .map(|task| task.request.filename.clone())
                .collect(),
        }
    }
}

/// Serializable summary of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub succeeded: usize,
    pub failures: Vec<FailedRotation>,
    pub abandoned: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRotation {
    pub filename: String,
    pub reason: String,
}

/// Clears the session's in-flight flag when the commit ends or is dropped.
struct CommitGuard<'a, S: ThumbnailSurface> {
    session: &'a RefCell<RotationSession<S>>,
}

impl<S: ThumbnailSurface> Drop for CommitGuard<'_, S> {
    fn drop(&mut self) {
        match self.session.try_borrow_mut() {
            Ok(mut session) => session.set_committing(false),
            Err(_) => warn!("session busy at end of commit, committing flag left set"),
        }
    }
}

/// Sends pending rotations to a backend one at a time.
pub struct CommitPipeline<B> {
    backend: B,
    cache_bust_param: String,
}

impl<B: RotateBackend> CommitPipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache_bust_param: "v".to_string(),
        }
    }

    /// Query parameter used to invalidate cached thumbnails.
    pub fn with_cache_bust_param(mut self, param: impl Into<String>) -> Self {
        self.cache_bust_param = param.into();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Commit every pending rotation of `session`.
    ///
    /// The session is only borrowed between requests, never across an
    /// `await`, so the host may keep handling input while a commit runs.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::AlreadyRunning`] if another commit on the same
    /// session has not finished. Per-item failures are not errors; they are
    /// logged and listed in the summary.
    pub async fn commit<S: ThumbnailSurface>(
        &self,
        session: &RefCell<RotationSession<S>>,
    ) -> Result<CommitSummary, CommitError> {
        let mut queue = {
            let mut session = session.borrow_mut();
            if session.is_committing() {
                warn!("commit requested while another is in progress");
                return Err(CommitError::AlreadyRunning);
            }
            let queue = CommitQueue::snapshot(&session);
            if queue.is_empty() {
                info!("nothing to save");
                info!("rotation requests completed: 0 succeeded, 0 failed");
                return Ok(CommitSummary::default());
            }
            session.set_committing(true);
            queue
        };
        let _guard = CommitGuard { session };
        let mut summary = CommitSummary::default();

        while let Some(mut task) = queue.pop() {
            if session.borrow().generation() != queue.generation {
                warn!(
                    "commit cancelled, abandoning {} remaining rotations",
                    queue.len() + 1
                );
                summary.abandoned.push(task);
                summary.abandoned.extend(queue.tasks.drain(..));
                break;
            }

            task.phase = TaskPhase::InFlight;
            info!(
                "sending rotate for {} {}°",
                task.request.filename, task.request.degrees
            );
            let reply = self.backend.rotate(&task.request).await;
            let outcome = classify(&reply);

            self.settle(&mut *session.borrow_mut(), &task, &outcome);
            report(&task, &outcome);
            task.phase = TaskPhase::Resolved(outcome);
            summary.resolved.push(task);
        }

        info!(
            "rotation requests completed: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    fn settle<S: ThumbnailSurface>(
        &self,
        session: &mut RotationSession<S>,
        task: &CommitTask,
        outcome: &RotateOutcome,
    ) {
        let token = session.surface().cache_token();
        let next = session
            .display_source(task.slot)
            .and_then(|current| outcome.display_source(current, &self.cache_bust_param, token));
        if let Some(src) = next {
            session.replace_source(task.slot, src);
        }
        session.finish_item(task.slot, &task.key);
    }
}

fn report(task: &CommitTask, outcome: &RotateOutcome) {
    let filename = &task.request.filename;
    match outcome {
        RotateOutcome::Success { .. } => info!("rotate success for {filename}"),
        RotateOutcome::AssumedSuccess => info!("rotate assumed success for {filename}"),
        RotateOutcome::Rejected { error } => error!("rotate error for {filename}: {error}"),
        RotateOutcome::Failed(err) => error!("rotate request failed for {filename}: {err}"),
    }
}
