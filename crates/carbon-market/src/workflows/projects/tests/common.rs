use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::projects::domain::{
    Project, ProjectId, ProjectStatus, ProjectSubmission, SubmitterId,
};
use crate::workflows::projects::lifecycle::ProjectLifecycleEngine;
use crate::workflows::projects::marketplace::ListingTermsBook;
use crate::workflows::projects::repository::{
    NoticeError, NoticePublisher, ProjectRepository, RepositoryError, ReviewNotice,
};
use crate::workflows::projects::{project_router, ProjectReviewService};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Clock that lags behind every fixture's `created_at`.
pub(super) fn skewed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn engine() -> ProjectLifecycleEngine {
    ProjectLifecycleEngine::with_clock(fixed_now)
}

pub(super) fn created_at() -> DateTime<Utc> {
    fixed_now() - Duration::days(30)
}

pub(super) fn project(id: &str, status: ProjectStatus) -> Project {
    let verification_date = match status {
        ProjectStatus::Pending => None,
        _ => Some(created_at() + Duration::days(5)),
    };
    let verification_notes = match status {
        ProjectStatus::Rejected => "Boundary overlaps protected area".to_string(),
        _ => String::new(),
    };

    Project {
        id: ProjectId(id.to_string()),
        title: format!("Project {id}"),
        project_type: "reforestation".to_string(),
        location_name: "Kerala, India".to_string(),
        latitude: 10.85,
        longitude: 76.27,
        area_hectares: 20.0,
        tree_species: vec!["Teak".to_string(), "Rosewood".to_string()],
        media_urls: Vec::new(),
        submitted_by: SubmitterId(format!("ngo-{id}")),
        organization: Some("Green Kerala Trust".to_string()),
        created_at: created_at(),
        status,
        verification_date,
        verification_notes,
        estimated_co2_tons: 100.0,
    }
}

pub(super) fn submission() -> ProjectSubmission {
    ProjectSubmission {
        title: "Pichavaram Mangrove Belt".to_string(),
        project_type: "mangrove_restoration".to_string(),
        location_name: "Tamil Nadu, India".to_string(),
        latitude: 11.43,
        longitude: 79.78,
        area_hectares: 18.5,
        tree_species: vec!["Rhizophora mucronata".to_string()],
        media_urls: vec!["ipfs://QmSite".to_string()],
        submitted_by: SubmitterId("ngo-coastal".to_string()),
        organization: Some("Coastal Commons".to_string()),
        estimated_co2_tons: 64.0,
    }
}

pub(super) fn build_service() -> (
    ProjectReviewService<MemoryRepository, MemoryNotices>,
    Arc<MemoryRepository>,
    Arc<MemoryNotices>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = ProjectReviewService::with_engine(
        repository.clone(),
        notices.clone(),
        ListingTermsBook::default(),
        engine(),
    );
    (service, repository, notices)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, project: Project) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(project.id.clone(), project);
    }

    pub(super) fn fetch_for_test(&self, id: &ProjectId) -> Option<Project> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn force_status(&self, id: &ProjectId, status: ProjectStatus) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(project) = guard.get_mut(id) {
            project.status = status;
            project.verification_date = Some(fixed_now());
        }
    }
}

impl ProjectRepository for MemoryRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut projects: Vec<Project> = guard.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }

    fn update_if_status(
        &self,
        project: Project,
        expected: ProjectStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get(&project.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StaleStatus {
                expected,
                actual: stored.status,
            });
        }
        guard.insert(project.id.clone(), project);
        Ok(())
    }
}

/// Repository whose stored status flips between the service's read and its write.
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) rival_status: ProjectStatus,
}

impl ProjectRepository for RacingRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        self.inner.insert(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let snapshot = self.inner.fetch(id)?;
        self.inner.force_status(id, self.rival_status);
        Ok(snapshot)
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        self.inner.list()
    }

    fn update_if_status(
        &self,
        project: Project,
        expected: ProjectStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update_if_status(project, expected)
    }
}

pub(super) struct UnavailableRepository;

impl ProjectRepository for UnavailableRepository {
    fn insert(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_if_status(
        &self,
        _project: Project,
        _expected: ProjectStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<ReviewNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<ReviewNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NoticePublisher for MemoryNotices {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotices;

impl NoticePublisher for OfflineNotices {
    fn publish(&self, _notice: ReviewNotice) -> Result<(), NoticeError> {
        Err(NoticeError::Transport("toast bridge offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: ProjectReviewService<MemoryRepository, MemoryNotices>,
) -> axum::Router {
    project_router(Arc::new(service))
}
