//! Review state machine for submitted projects.
//!
//! `pending` is the only state with outgoing transitions. Both review actions return an
//! updated copy of the project so a failed transition can never leave a half-applied record
//! behind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectId, ProjectStatus};

/// Review actions an administrator can apply to a pending project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }

    pub const fn target(self) -> ProjectStatus {
        match self {
            ReviewAction::Approve => ProjectStatus::Verified,
            ReviewAction::Reject => ProjectStatus::Rejected,
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failures raised by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("cannot {action} a project that is already {from}")]
    InvalidTransition {
        from: ProjectStatus,
        action: ReviewAction,
    },
    #[error("project {0} not found")]
    NotFound(ProjectId),
}

pub const REJECTION_REASON_REQUIRED: &str = "reason required";

/// Applies review transitions using an injectable clock.
#[derive(Debug, Clone, Copy)]
pub struct ProjectLifecycleEngine {
    clock: fn() -> DateTime<Utc>,
}

impl Default for ProjectLifecycleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectLifecycleEngine {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Marks a pending project as verified. Notes are optional for approvals.
    pub fn approve(&self, project: &Project, notes: Option<&str>) -> Result<Project, LifecycleError> {
        ensure_pending(project, ReviewAction::Approve)?;
        Ok(self.settle(project, ProjectStatus::Verified, notes.unwrap_or_default()))
    }

    /// Marks a pending project as rejected. A non-blank reason is mandatory.
    pub fn reject(&self, project: &Project, notes: &str) -> Result<Project, LifecycleError> {
        ensure_pending(project, ReviewAction::Reject)?;
        if notes.trim().is_empty() {
            return Err(LifecycleError::Validation(
                REJECTION_REASON_REQUIRED.to_string(),
            ));
        }
        Ok(self.settle(project, ProjectStatus::Rejected, notes))
    }

    /// Dispatches a review action; `notes` is `None` only for approvals without comment.
    pub fn apply(
        &self,
        project: &Project,
        action: ReviewAction,
        notes: Option<&str>,
    ) -> Result<Project, LifecycleError> {
        match action {
            ReviewAction::Approve => self.approve(project, notes),
            ReviewAction::Reject => self.reject(project, notes.unwrap_or_default()),
        }
    }

    fn settle(&self, project: &Project, status: ProjectStatus, notes: &str) -> Project {
        // verification_date never precedes created_at, even with a skewed clock.
        let decided_at = self.now().max(project.created_at);
        let mut settled = project.clone();
        settled.status = status;
        settled.verification_date = Some(decided_at);
        settled.verification_notes = notes.to_string();
        settled
    }
}

fn ensure_pending(project: &Project, action: ReviewAction) -> Result<(), LifecycleError> {
    if project.status.is_terminal() {
        return Err(LifecycleError::InvalidTransition {
            from: project.status,
            action,
        });
    }
    Ok(())
}

/// Resolves a lookup result, failing closed when the record is absent.
pub fn require_project(id: &ProjectId, found: Option<Project>) -> Result<Project, LifecycleError> {
    found.ok_or_else(|| LifecycleError::NotFound(id.clone()))
}
