use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{Project, ProjectId, ProjectStatus, SubmitterId};

#[derive(Debug, thiserror::Error)]
pub enum ProjectImportError {
    #[error("failed to read project export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid project CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("project export row {row}: {detail}")]
    Row { row: usize, detail: String },
}

/// Loads a project snapshot exported from the persistence store.
///
/// List columns (`tree_species`, `media_urls`) are `;` separated. Rows are numbered from 1,
/// excluding the header.
pub struct ProjectCsvImporter;

impl ProjectCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Project>, ProjectImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Project>, ProjectImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut projects = Vec::new();
        let mut first_rows: HashMap<ProjectId, usize> = HashMap::new();

        for (index, record) in csv_reader.deserialize::<ProjectRow>().enumerate() {
            let row = index + 1;
            let project = record?
                .into_project()
                .map_err(|detail| ProjectImportError::Row { row, detail })?;
            project
                .check_invariants()
                .map_err(|detail| ProjectImportError::Row { row, detail })?;
            if let Some(first) = first_rows.insert(project.id.clone(), row) {
                return Err(ProjectImportError::Row {
                    row,
                    detail: format!(
                        "duplicate project id '{}' (first seen on row {first})",
                        project.id
                    ),
                });
            }
            projects.push(project);
        }

        Ok(projects)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    id: String,
    title: String,
    project_type: String,
    #[serde(default)]
    location_name: String,
    latitude: f64,
    longitude: f64,
    area_hectares: f64,
    estimated_co2_tons: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tree_species: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    media_urls: Option<String>,
    submitted_by: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    organization: Option<String>,
    status: String,
    created_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    verification_date: Option<String>,
    #[serde(default)]
    verification_notes: String,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project, String> {
        let status = ProjectStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown status '{}'", self.status))?;
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| format!("invalid created_at '{}'", self.created_at))?;
        let verification_date = match self.verification_date.as_deref() {
            Some(raw) => Some(
                parse_timestamp(raw).ok_or_else(|| format!("invalid verification_date '{raw}'"))?,
            ),
            None => None,
        };

        if self.id.is_empty() {
            return Err("missing project id".to_string());
        }

        Ok(Project {
            id: ProjectId(self.id),
            title: self.title,
            project_type: self.project_type,
            location_name: self.location_name,
            latitude: self.latitude,
            longitude: self.longitude,
            area_hectares: self.area_hectares,
            tree_species: split_list(self.tree_species.as_deref()),
            media_urls: split_list(self.media_urls.as_deref()),
            submitted_by: SubmitterId(self.submitted_by),
            organization: self.organization,
            created_at,
            status,
            verification_date,
            verification_notes: self.verification_notes,
            estimated_co2_tons: self.estimated_co2_tons,
        })
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(';')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
