use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::MarketplaceListing;

/// Sort keys offered by the marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingSort {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
    Credits,
}

impl ListingSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "price-low" => Some(Self::PriceLow),
            "price-high" => Some(Self::PriceHigh),
            "rating" => Some(Self::Rating),
            "credits" => Some(Self::Credits),
            _ => None,
        }
    }

    fn compare(self, a: &MarketplaceListing, b: &MarketplaceListing) -> Ordering {
        match self {
            ListingSort::Newest => b.verified_at.cmp(&a.verified_at),
            ListingSort::PriceLow => a.price_per_credit.total_cmp(&b.price_per_credit),
            ListingSort::PriceHigh => b.price_per_credit.total_cmp(&a.price_per_credit),
            ListingSort::Rating => b.rating.total_cmp(&a.rating),
            ListingSort::Credits => b.credits_available.total_cmp(&a.credits_available),
        }
    }

    /// Stable in-place sort; equal keys keep their incoming order.
    pub fn apply(self, listings: &mut [MarketplaceListing]) {
        listings.sort_by(|a, b| self.compare(a, b));
    }
}

/// Buyer-side filters. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: ListingSort,
}

impl MarketplaceQuery {
    pub fn matches(&self, listing: &MarketplaceListing) -> bool {
        self.matches_search(listing)
            && self.matches_type(listing)
            && self.matches_location(listing)
            && self.matches_price(listing)
    }

    fn matches_search(&self, listing: &MarketplaceListing) -> bool {
        let Some(needle) = active_term(&self.search, false) else {
            return true;
        };
        [&listing.project_name, &listing.organization, &listing.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_type(&self, listing: &MarketplaceListing) -> bool {
        match active_term(&self.project_type, true) {
            Some(category) => listing
                .category
                .to_lowercase()
                .contains(&category.replace('_', " ")),
            None => true,
        }
    }

    fn matches_location(&self, listing: &MarketplaceListing) -> bool {
        match active_term(&self.location, true) {
            Some(location) => listing.location.to_lowercase().contains(&location),
            None => true,
        }
    }

    fn matches_price(&self, listing: &MarketplaceListing) -> bool {
        let price = listing.price_per_credit;
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }
}

/// Lower-cased filter term, or `None` when the filter is blank (or "all" for selects).
fn active_term(value: &Option<String>, all_is_wildcard: bool) -> Option<String> {
    let term = value.as_deref()?.trim().to_lowercase();
    if term.is_empty() || (all_is_wildcard && term == "all") {
        None
    } else {
        Some(term)
    }
}
