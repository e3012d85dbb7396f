use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectStatus};

/// Trees credited per ton of sequestered CO2.
pub const TREES_PER_CO2_TON: f64 = 50.0;

/// Stand-in for satellite canopy analysis: percent cover gained per declared hectare.
pub const VEGETATION_PLACEHOLDER_FACTOR: f64 = 0.9;

pub const DEFAULT_PRICE_PER_CREDIT: f64 = 25.0;

const HIGH_PRIORITY_AREA: f64 = 30.0;
const MEDIUM_PRIORITY_AREA: f64 = 15.0;

/// Review priority badge shown on the admin queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

pub fn classify_priority(project: &Project) -> Priority {
    let large = project.area_hectares > HIGH_PRIORITY_AREA;
    let mangrove = project.project_type.to_lowercase().contains("mangrove");

    if large || mangrove {
        Priority::High
    } else if project.area_hectares > MEDIUM_PRIORITY_AREA {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn estimated_trees(project: &Project) -> f64 {
    project.estimated_co2_tons * TREES_PER_CO2_TON
}

/// Placeholder figure; not derived from imagery.
pub fn vegetation_increase_percent(project: &Project) -> i64 {
    (project.area_hectares * VEGETATION_PLACEHOLDER_FACTOR).round() as i64
}

pub fn total_value(project: &Project, price_per_credit: f64) -> f64 {
    project.estimated_co2_tons * price_per_credit
}

/// Credit amount a user is shown for a project, which depends on review status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum DisplayedCredits {
    Issued(f64),
    Approximate(f64),
    Withheld,
}

impl DisplayedCredits {
    pub fn amount(self) -> f64 {
        match self {
            DisplayedCredits::Issued(amount) | DisplayedCredits::Approximate(amount) => amount,
            DisplayedCredits::Withheld => 0.0,
        }
    }
}

impl fmt::Display for DisplayedCredits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayedCredits::Issued(amount) => write!(f, "{amount}"),
            DisplayedCredits::Approximate(amount) => write!(f, "~{amount}"),
            DisplayedCredits::Withheld => f.write_str("0"),
        }
    }
}

pub fn displayed_credits(project: &Project) -> DisplayedCredits {
    match project.status {
        ProjectStatus::Verified => DisplayedCredits::Issued(project.estimated_co2_tons),
        ProjectStatus::Pending => DisplayedCredits::Approximate(project.estimated_co2_tons),
        ProjectStatus::Rejected => DisplayedCredits::Withheld,
    }
}

/// Community impact estimates quoted on marketplace listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactEstimate {
    pub trees_planted: f64,
    pub carbon_sequestered: f64,
    pub communities_benefited: u64,
    pub jobs_created: u64,
}

impl ImpactEstimate {
    pub fn for_project(project: &Project) -> Self {
        let area = project.area_hectares.max(0.0);
        Self {
            trees_planted: estimated_trees(project),
            carbon_sequestered: project.estimated_co2_tons,
            communities_benefited: ((area / 5.0).floor() as u64).max(1),
            jobs_created: ((area * 2.0).floor() as u64).max(5),
        }
    }
}
