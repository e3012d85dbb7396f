use std::collections::HashSet;

use serde::Serialize;

use super::domain::{Project, ProjectStatus};

/// Aggregate figures shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewStatistics {
    pub pending_count: usize,
    pub verified_count: usize,
    pub rejected_count: usize,
    pub total_credits_issued: f64,
    pub active_organization_count: usize,
}

impl ReviewStatistics {
    pub fn from_projects<'a, I>(projects: I) -> Self
    where
        I: IntoIterator<Item = &'a Project>,
    {
        let mut stats = Self::default();
        let mut submitters = HashSet::new();

        for project in projects {
            submitters.insert(&project.submitted_by);
            match project.status {
                ProjectStatus::Pending => stats.pending_count += 1,
                ProjectStatus::Verified => {
                    stats.verified_count += 1;
                    stats.total_credits_issued += project.estimated_co2_tons;
                }
                ProjectStatus::Rejected => stats.rejected_count += 1,
            }
        }

        stats.active_organization_count = submitters.len();
        stats
    }

    pub fn total(&self) -> usize {
        self.pending_count + self.verified_count + self.rejected_count
    }

    pub fn count_for(&self, status: ProjectStatus) -> usize {
        match status {
            ProjectStatus::Pending => self.pending_count,
            ProjectStatus::Verified => self.verified_count,
            ProjectStatus::Rejected => self.rejected_count,
        }
    }
}
