use crate::engine::{Outcome, ProgressSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Queued or computing.
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        self != SessionStatus::Running
    }
}

/// Immutable view of a session, replaced wholesale by its run.
///
/// `outcome` is present exactly when the status is `Completed`, `error` exactly
/// when it is `Failed`.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub progress: ProgressSnapshot,
    pub outcome: Option<Arc<Outcome>>,
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub(crate) fn running(progress: ProgressSnapshot) -> Self {
        Self {
            status: SessionStatus::Running,
            progress,
            outcome: None,
            error: None,
        }
    }

    pub(crate) fn completed(progress: ProgressSnapshot, outcome: Outcome) -> Self {
        Self {
            status: SessionStatus::Completed,
            progress,
            outcome: Some(Arc::new(outcome)),
            error: None,
        }
    }

    pub(crate) fn failed(progress: ProgressSnapshot, error: String) -> Self {
        Self {
            status: SessionStatus::Failed,
            progress,
            outcome: None,
            error: Some(error),
        }
    }
}
