use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Allocates the next `PROJ-<year>-<nnn>` identifier.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let sequence = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("PROJ-{}-{sequence:03}", now.year()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric sequence of a `PROJ-<year>-<nnn>` id.
    pub fn sequence(&self) -> Option<u64> {
        self.0.split('-').nth(2)?.parse().ok()
    }

    /// Moves the shared allocator past this id so `generate` never hands it out again.
    pub fn reserve(&self) {
        if let Some(sequence) = self.sequence() {
            PROJECT_SEQUENCE.fetch_max(sequence.saturating_add(1), Ordering::Relaxed);
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Identity of the account that submitted a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmitterId(pub String);

/// Review state of a project. `Verified` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    Verified,
    Rejected,
}

impl ProjectStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Verified, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Verified => "verified",
            ProjectStatus::Rejected => "rejected",
        }
    }

    pub const fn badge(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending Review",
            ProjectStatus::Verified => "Verified",
            ProjectStatus::Rejected => "Rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Verified | ProjectStatus::Rejected)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored project record as returned by the persistence store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub project_type: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: f64,
    pub tree_species: Vec<String>,
    pub media_urls: Vec<String>,
    pub submitted_by: SubmitterId,
    #[serde(default)]
    pub organization: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: ProjectStatus,
    pub verification_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verification_notes: String,
    pub estimated_co2_tons: f64,
}

impl Project {
    /// Organization name shown to buyers, falling back when the profile join is empty.
    pub fn organization_name(&self) -> &str {
        self.organization
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_ORGANIZATION)
    }

    /// Checks the review-state invariants a stored record must satisfy.
    pub fn check_invariants(&self) -> Result<(), String> {
        match (self.status, self.verification_date) {
            (ProjectStatus::Pending, Some(_)) => {
                return Err("pending project carries a verification date".to_string())
            }
            (ProjectStatus::Verified | ProjectStatus::Rejected, None) => {
                return Err(format!(
                    "{} project is missing its verification date",
                    self.status
                ))
            }
            _ => {}
        }

        if self.status == ProjectStatus::Rejected && self.verification_notes.trim().is_empty() {
            return Err("rejected project is missing its rejection reason".to_string());
        }

        if let Some(verified_at) = self.verification_date {
            if verified_at < self.created_at {
                return Err("verification date precedes creation".to_string());
            }
        }

        if !(self.area_hectares > 0.0) {
            return Err("area_hectares must be positive".to_string());
        }

        if !(self.estimated_co2_tons > 0.0) {
            return Err("estimated_co2_tons must be positive".to_string());
        }

        Ok(())
    }
}

pub const UNKNOWN_ORGANIZATION: &str = "Unknown NGO";

/// Payload collected by the submission flow before a project enters review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub title: String,
    pub project_type: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: f64,
    #[serde(default)]
    pub tree_species: Vec<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub submitted_by: SubmitterId,
    #[serde(default)]
    pub organization: Option<String>,
    pub estimated_co2_tons: f64,
}

impl ProjectSubmission {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.project_type.trim().is_empty() {
            return Err("project type is required".to_string());
        }
        if self.submitted_by.0.trim().is_empty() {
            return Err("submitter is required".to_string());
        }
        if !(self.area_hectares.is_finite() && self.area_hectares > 0.0) {
            return Err("area_hectares must be a positive number".to_string());
        }
        if !(self.estimated_co2_tons.is_finite() && self.estimated_co2_tons > 0.0) {
            return Err("estimated_co2_tons must be a positive number".to_string());
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err("latitude must be within [-90, 90]".to_string());
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err("longitude must be within [-180, 180]".to_string());
        }
        Ok(())
    }

    /// Builds the pending record for a validated submission.
    pub fn into_project(self, id: ProjectId, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            title: self.title.trim().to_string(),
            project_type: self.project_type.trim().to_string(),
            location_name: self.location_name.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            area_hectares: self.area_hectares,
            tree_species: self.tree_species,
            media_urls: self.media_urls,
            submitted_by: self.submitted_by,
            organization: self.organization,
            created_at,
            status: ProjectStatus::Pending,
            verification_date: None,
            verification_notes: String::new(),
            estimated_co2_tons: self.estimated_co2_tons,
        }
    }
}
