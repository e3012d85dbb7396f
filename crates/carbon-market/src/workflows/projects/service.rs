use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Project, ProjectId, ProjectStatus, ProjectSubmission};
use super::lifecycle::{require_project, LifecycleError, ProjectLifecycleEngine, ReviewAction};
use super::marketplace::{
    list_marketplace_entries, ListingTermsBook, MarketStats, MarketplaceListing, MarketplaceQuery,
};
use super::repository::{NoticePublisher, ProjectRepository, RepositoryError, ReviewNotice};
use super::stats::ReviewStatistics;
use super::views::ReviewQueueEntry;

const APPROVED_TITLE: &str = "Project approved successfully!";
const APPROVE_FAILED_TITLE: &str = "Failed to approve project";
const REJECTED_TITLE: &str = "Project Rejected";
const REJECTED_DESCRIPTION: &str = "The project will remain visible with rejected status.";
const REJECT_FAILED_TITLE: &str = "Failed to reject project";
const REASON_MISSING_TITLE: &str = "Please provide a reason for rejection";
const MAX_ID_ATTEMPTS: usize = 32;

/// Service composing the lifecycle engine, repository, and notice layer.
pub struct ProjectReviewService<R, N> {
    repository: Arc<R>,
    notices: Arc<N>,
    engine: ProjectLifecycleEngine,
    terms: ListingTermsBook,
}

/// Marketplace response: ordered listings plus banner statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MarketplaceView {
    pub listings: Vec<MarketplaceListing>,
    pub stats: MarketStats,
}

impl<R, N> ProjectReviewService<R, N>
where
    R: ProjectRepository + 'static,
    N: NoticePublisher + 'static,
{
    pub fn new(repository: Arc<R>, notices: Arc<N>, terms: ListingTermsBook) -> Self {
        Self::with_engine(repository, notices, terms, ProjectLifecycleEngine::new())
    }

    pub fn with_engine(
        repository: Arc<R>,
        notices: Arc<N>,
        terms: ListingTermsBook,
        engine: ProjectLifecycleEngine,
    ) -> Self {
        Self {
            repository,
            notices,
            engine,
            terms,
        }
    }

    pub fn terms(&self) -> &ListingTermsBook {
        &self.terms
    }

    /// Validate a submission and store it as a pending project.
    pub fn submit(&self, submission: ProjectSubmission) -> Result<Project, ProjectServiceError> {
        submission.validate().map_err(LifecycleError::Validation)?;

        let now = self.engine.now();
        let mut project = submission.into_project(ProjectId::generate(now), now);
        let mut attempts = 1;
        let stored = loop {
            match self.repository.insert(project.clone()) {
                Err(RepositoryError::Conflict) if attempts < MAX_ID_ATTEMPTS => {
                    // Imported snapshots can already hold ids from this year's sequence.
                    project.id.reserve();
                    project.id = ProjectId::generate(now);
                    attempts += 1;
                }
                result => break result?,
            }
        };

        info!(project_id = %stored.id, project_type = %stored.project_type, "project submitted for review");
        Ok(stored)
    }

    pub fn approve(
        &self,
        id: &ProjectId,
        notes: Option<&str>,
    ) -> Result<Project, ProjectServiceError> {
        let result = self.transition(id, ReviewAction::Approve, notes);
        match &result {
            Ok(_) => self.notify(ReviewNotice::success(id, APPROVED_TITLE)),
            Err(_) => self.notify(ReviewNotice::failure(id, APPROVE_FAILED_TITLE)),
        }
        result
    }

    pub fn reject(&self, id: &ProjectId, notes: &str) -> Result<Project, ProjectServiceError> {
        let result = self.transition(id, ReviewAction::Reject, Some(notes));
        match &result {
            Ok(_) => self.notify(
                ReviewNotice::success(id, REJECTED_TITLE).with_description(REJECTED_DESCRIPTION),
            ),
            Err(ProjectServiceError::Lifecycle(LifecycleError::Validation(_))) => {
                self.notify(ReviewNotice::failure(id, REASON_MISSING_TITLE))
            }
            Err(_) => self.notify(ReviewNotice::failure(id, REJECT_FAILED_TITLE)),
        }
        result
    }

    /// Fetch a project, failing closed when it does not exist.
    pub fn get(&self, id: &ProjectId) -> Result<Project, ProjectServiceError> {
        let found = self.repository.fetch(id)?;
        Ok(require_project(id, found)?)
    }

    /// Admin queue, newest submissions first, optionally narrowed to one status.
    pub fn queue(
        &self,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<ReviewQueueEntry>, ProjectServiceError> {
        let projects = self.repository.list()?;
        Ok(projects
            .iter()
            .filter(|project| status.map_or(true, |wanted| project.status == wanted))
            .map(ReviewQueueEntry::from_project)
            .collect())
    }

    pub fn statistics(&self) -> Result<ReviewStatistics, ProjectServiceError> {
        let projects = self.repository.list()?;
        Ok(ReviewStatistics::from_projects(&projects))
    }

    pub fn marketplace(
        &self,
        query: &MarketplaceQuery,
    ) -> Result<MarketplaceView, ProjectServiceError> {
        let projects = self.repository.list()?;
        let listings = list_marketplace_entries(&projects, &self.terms, query);
        let stats = MarketStats::from_listings(&listings);
        Ok(MarketplaceView { listings, stats })
    }

    fn transition(
        &self,
        id: &ProjectId,
        action: ReviewAction,
        notes: Option<&str>,
    ) -> Result<Project, ProjectServiceError> {
        // Status is revalidated here and persisted with a compare-and-swap on it.
        let current = self.get(id)?;
        let updated = self.engine.apply(&current, action, notes)?;

        self.repository
            .update_if_status(updated.clone(), current.status)?;

        info!(
            project_id = %id,
            action = action.label(),
            status = %updated.status,
            "project review recorded"
        );
        Ok(updated)
    }

    fn notify(&self, notice: ReviewNotice) {
        if let Err(err) = self.notices.publish(notice) {
            warn!(error = %err, "review notice dropped");
        }
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ProjectServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
