//! Marketplace listings derived from verified projects.

mod query;

pub use query::{ListingSort, MarketplaceQuery};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectId, ProjectStatus};
use super::metrics::{
    estimated_trees, total_value, ImpactEstimate, DEFAULT_PRICE_PER_CREDIT,
};

pub const DEFAULT_LISTING_IMAGE: &str = "/forest-restoration.jpg";

const LISTING_CERTIFICATIONS: [&str; 2] = ["Verified by Admin", "Carbon Credit Standard"];

/// Commercial terms attached to a listing. Rating and review count are placeholders
/// until a review system exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListingTerms {
    pub price_per_credit: f64,
    pub rating: f32,
    pub reviews: u32,
}

impl Default for ListingTerms {
    fn default() -> Self {
        Self {
            price_per_credit: DEFAULT_PRICE_PER_CREDIT,
            rating: 4.7,
            reviews: 15,
        }
    }
}

/// Default terms plus per-project overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTermsBook {
    defaults: ListingTerms,
    overrides: HashMap<ProjectId, ListingTerms>,
}

impl ListingTermsBook {
    pub fn new(defaults: ListingTerms) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, id: ProjectId, terms: ListingTerms) -> Self {
        self.overrides.insert(id, terms);
        self
    }

    pub fn defaults(&self) -> ListingTerms {
        self.defaults
    }

    pub fn terms_for(&self, id: &ProjectId) -> ListingTerms {
        self.overrides.get(id).copied().unwrap_or(self.defaults)
    }
}

/// Seller summary shown beside a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerSummary {
    pub name: String,
    pub verified: bool,
    pub total_credits: f64,
}

/// A verified project as presented to buyers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketplaceListing {
    pub id: ProjectId,
    pub project_name: String,
    pub organization: String,
    pub project_type: String,
    pub category: String,
    pub location: String,
    pub area_hectares: f64,
    pub credits_available: f64,
    pub price_per_credit: f64,
    pub total_value: f64,
    pub rating: f32,
    pub reviews: u32,
    pub trees: f64,
    pub verified_at: DateTime<Utc>,
    pub description: String,
    pub images: Vec<String>,
    pub impact: ImpactEstimate,
    pub certifications: Vec<&'static str>,
    pub seller: SellerSummary,
    pub tree_species: Vec<String>,
}

impl MarketplaceListing {
    pub fn from_project(project: &Project, terms: ListingTerms) -> Self {
        let category = project.project_type.replace('_', " ");
        let organization = project.organization_name().to_string();
        let images = if project.media_urls.is_empty() {
            vec![DEFAULT_LISTING_IMAGE.to_string()]
        } else {
            project.media_urls.clone()
        };

        Self {
            id: project.id.clone(),
            project_name: project.title.clone(),
            organization: organization.clone(),
            project_type: title_case(&category),
            description: format!(
                "{category} project covering {} hectares in {}. This verified carbon credit project contributes to environmental sustainability and community development.",
                project.area_hectares, project.location_name
            ),
            category,
            location: project.location_name.clone(),
            area_hectares: project.area_hectares,
            credits_available: project.estimated_co2_tons,
            price_per_credit: terms.price_per_credit,
            total_value: total_value(project, terms.price_per_credit),
            rating: terms.rating,
            reviews: terms.reviews,
            trees: estimated_trees(project),
            // Verified records always carry a date; created_at covers legacy rows.
            verified_at: project.verification_date.unwrap_or(project.created_at),
            images,
            impact: ImpactEstimate::for_project(project),
            certifications: LISTING_CERTIFICATIONS.to_vec(),
            seller: SellerSummary {
                name: organization,
                verified: true,
                total_credits: project.estimated_co2_tons,
            },
            tree_species: project.tree_species.clone(),
        }
    }
}

/// Builds the filtered, ordered marketplace from a project snapshot.
///
/// Only verified projects are listed. Ordering is stable, so listings that compare equal
/// under the requested sort keep the order of `projects`.
pub fn list_marketplace_entries(
    projects: &[Project],
    terms: &ListingTermsBook,
    query: &MarketplaceQuery,
) -> Vec<MarketplaceListing> {
    let mut listings: Vec<MarketplaceListing> = projects
        .iter()
        .filter(|project| project.status == ProjectStatus::Verified)
        .map(|project| MarketplaceListing::from_project(project, terms.terms_for(&project.id)))
        .filter(|listing| query.matches(listing))
        .collect();

    query.sort.apply(&mut listings);
    listings
}

/// Headline figures for the marketplace banner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketStats {
    pub total_credits: f64,
    pub average_price: f64,
    pub total_value: f64,
    pub active_projects: usize,
}

impl MarketStats {
    pub fn from_listings(listings: &[MarketplaceListing]) -> Self {
        if listings.is_empty() {
            return Self::default();
        }

        let total_credits = listings.iter().map(|l| l.credits_available).sum();
        let price_sum: f64 = listings.iter().map(|l| l.price_per_credit).sum();
        let total_value = listings.iter().map(|l| l.total_value).sum();

        Self {
            total_credits,
            average_price: price_sum / listings.len() as f64,
            total_value,
            active_projects: listings.len(),
        }
    }
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
