use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectId, ProjectStatus};

/// Storage abstraction so the review service can be exercised in isolation.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError>;
    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    /// All projects, newest submission first.
    fn list(&self) -> Result<Vec<Project>, RepositoryError>;
    /// Replaces the stored record only while its status still equals `expected`.
    fn update_if_status(
        &self,
        project: Project,
        expected: ProjectStatus,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("project status changed concurrently: expected {expected}, found {actual}")]
    StaleStatus {
        expected: ProjectStatus,
        actual: ProjectStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound user-facing messages (toasts, e-mail digests).
pub trait NoticePublisher: Send + Sync {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// Message shown to the reviewer after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNotice {
    pub level: NoticeLevel,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReviewNotice {
    pub fn success(project_id: &ProjectId, title: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            project_id: project_id.clone(),
            title: title.to_string(),
            description: None,
        }
    }

    pub fn failure(project_id: &ProjectId, title: &str) -> Self {
        Self {
            level: NoticeLevel::Failure,
            ..Self::success(project_id, title)
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Notice dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}
