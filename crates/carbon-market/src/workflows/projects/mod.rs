//! Project submission, admin review, and marketplace listing.
//!
//! The lifecycle engine and metric functions are pure; the service layer wires them to a
//! [`ProjectRepository`] and a [`NoticePublisher`] supplied by the host application.

pub mod domain;
pub mod import;
pub mod lifecycle;
pub mod marketplace;
pub mod metrics;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{Project, ProjectId, ProjectStatus, ProjectSubmission, SubmitterId};
pub use import::{ProjectCsvImporter, ProjectImportError};
pub use lifecycle::{LifecycleError, ProjectLifecycleEngine, ReviewAction};
pub use marketplace::{
    list_marketplace_entries, ListingSort, ListingTerms, ListingTermsBook, MarketStats,
    MarketplaceListing, MarketplaceQuery,
};
pub use metrics::{
    classify_priority, displayed_credits, estimated_trees, total_value,
    vegetation_increase_percent, DisplayedCredits, ImpactEstimate, Priority,
};
pub use repository::{
    NoticeError, NoticeLevel, NoticePublisher, ProjectRepository, RepositoryError, ReviewNotice,
};
pub use router::project_router;
pub use service::{MarketplaceView, ProjectReviewService, ProjectServiceError};
pub use stats::ReviewStatistics;
pub use views::{ProjectView, ReviewQueueEntry};
