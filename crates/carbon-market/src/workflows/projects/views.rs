use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Project, ProjectId, ProjectStatus, SubmitterId};
use super::metrics::{
    classify_priority, displayed_credits, estimated_trees, vegetation_increase_percent, Priority,
};

/// Admin queue row: the stored project plus its derived review figures.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewQueueEntry {
    pub id: ProjectId,
    pub title: String,
    pub organization: String,
    pub project_type: String,
    pub location_name: String,
    pub area_hectares: f64,
    pub status: ProjectStatus,
    pub status_label: &'static str,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub estimated_trees: f64,
    pub displayed_credits: String,
    /// Placeholder canopy figure, only reported once a project is verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vegetation_increase_percent: Option<i64>,
    pub submitted_by: SubmitterId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<DateTime<Utc>>,
}

impl ReviewQueueEntry {
    pub fn from_project(project: &Project) -> Self {
        let priority = classify_priority(project);
        let vegetation = (project.status == ProjectStatus::Verified)
            .then(|| vegetation_increase_percent(project));

        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            organization: project.organization_name().to_string(),
            project_type: project.project_type.clone(),
            location_name: project.location_name.clone(),
            area_hectares: project.area_hectares,
            status: project.status,
            status_label: project.status.badge(),
            priority,
            priority_label: priority.label(),
            estimated_trees: estimated_trees(project),
            displayed_credits: displayed_credits(project).to_string(),
            vegetation_increase_percent: vegetation,
            submitted_by: project.submitted_by.clone(),
            created_at: project.created_at,
            verification_date: project.verification_date,
        }
    }
}

/// Full project detail returned by the project endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub priority: Priority,
    pub estimated_trees: f64,
    pub displayed_credits: String,
    pub vegetation_increase_percent: i64,
}

impl ProjectView {
    pub fn from_project(project: Project) -> Self {
        Self {
            priority: classify_priority(&project),
            estimated_trees: estimated_trees(&project),
            displayed_credits: displayed_credits(&project).to_string(),
            vegetation_increase_percent: vegetation_increase_percent(&project),
            project,
        }
    }
}
