use chrono::Duration;

use super::common::*;
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::projects::marketplace::{
    list_marketplace_entries, ListingSort, ListingTerms, ListingTermsBook, MarketStats,
    MarketplaceQuery, DEFAULT_LISTING_IMAGE,
};

fn verified(id: &str, days_after_creation: i64) -> Project {
    let mut project = project(id, ProjectStatus::Verified);
    project.verification_date = Some(created_at() + Duration::days(days_after_creation));
    project
}

fn ids(listings: &[crate::workflows::projects::MarketplaceListing]) -> Vec<&str> {
    listings.iter().map(|listing| listing.id.as_str()).collect()
}

#[test]
fn only_verified_projects_are_listed() {
    let projects = vec![
        project("PROJ-2025-030", ProjectStatus::Pending),
        verified("PROJ-2025-031", 3),
        project("PROJ-2025-032", ProjectStatus::Rejected),
    ];

    let listings = list_marketplace_entries(
        &projects,
        &ListingTermsBook::default(),
        &MarketplaceQuery::default(),
    );

    assert_eq!(ids(&listings), vec!["PROJ-2025-031"]);
}

#[test]
fn newest_first_is_stable_for_equal_dates() {
    let projects = vec![
        verified("PROJ-2025-040", 2),
        verified("PROJ-2025-041", 9),
        verified("PROJ-2025-042", 2),
        verified("PROJ-2025-043", 2),
    ];

    let listings = list_marketplace_entries(
        &projects,
        &ListingTermsBook::default(),
        &MarketplaceQuery::default(),
    );

    assert_eq!(
        ids(&listings),
        vec!["PROJ-2025-041", "PROJ-2025-040", "PROJ-2025-042", "PROJ-2025-043"]
    );
    for pair in listings.windows(2) {
        assert!(pair[0].verified_at >= pair[1].verified_at);
    }
}

#[test]
fn price_sorts_use_listing_terms() {
    let projects = vec![
        verified("PROJ-2025-050", 1),
        verified("PROJ-2025-051", 2),
        verified("PROJ-2025-052", 3),
    ];
    let terms = ListingTermsBook::default()
        .with_override(
            ProjectId("PROJ-2025-050".to_string()),
            ListingTerms {
                price_per_credit: 31.0,
                ..ListingTerms::default()
            },
        )
        .with_override(
            ProjectId("PROJ-2025-052".to_string()),
            ListingTerms {
                price_per_credit: 18.5,
                ..ListingTerms::default()
            },
        );

    let low = list_marketplace_entries(
        &projects,
        &terms,
        &MarketplaceQuery {
            sort: ListingSort::PriceLow,
            ..MarketplaceQuery::default()
        },
    );
    assert_eq!(
        ids(&low),
        vec!["PROJ-2025-052", "PROJ-2025-051", "PROJ-2025-050"]
    );

    let high = list_marketplace_entries(
        &projects,
        &terms,
        &MarketplaceQuery {
            sort: ListingSort::PriceHigh,
            ..MarketplaceQuery::default()
        },
    );
    assert_eq!(
        ids(&high),
        vec!["PROJ-2025-050", "PROJ-2025-051", "PROJ-2025-052"]
    );
    assert_eq!(high[0].total_value, 3100.0);
}

fn sorted(projects: &[Project], terms: &ListingTermsBook, sort: ListingSort) -> Vec<String> {
    list_marketplace_entries(
        projects,
        terms,
        &MarketplaceQuery {
            sort,
            ..MarketplaceQuery::default()
        },
    )
    .into_iter()
    .map(|listing| listing.id.0)
    .collect()
}

#[test]
fn rating_sort_is_descending_and_keeps_ties_in_input_order() {
    let projects = vec![
        verified("PROJ-2025-053", 1),
        verified("PROJ-2025-054", 2),
        verified("PROJ-2025-055", 3),
        verified("PROJ-2025-056", 4),
    ];
    let rated = |rating: f32| ListingTerms {
        rating,
        ..ListingTerms::default()
    };
    let terms = ListingTermsBook::new(rated(4.2))
        .with_override(ProjectId("PROJ-2025-054".to_string()), rated(4.9))
        .with_override(ProjectId("PROJ-2025-056".to_string()), rated(3.8));

    assert_eq!(
        sorted(&projects, &terms, ListingSort::Rating),
        vec!["PROJ-2025-054", "PROJ-2025-053", "PROJ-2025-055", "PROJ-2025-056"]
    );
}

#[test]
fn credits_sort_is_descending_and_keeps_ties_in_input_order() {
    let with_credits = |id: &str, tons: f64| {
        let mut project = verified(id, 1);
        project.estimated_co2_tons = tons;
        project
    };
    let projects = vec![
        with_credits("PROJ-2025-057", 40.0),
        with_credits("PROJ-2025-058", 120.0),
        with_credits("PROJ-2025-059", 40.0),
        with_credits("PROJ-2025-159", 75.5),
    ];

    assert_eq!(
        sorted(&projects, &ListingTermsBook::default(), ListingSort::Credits),
        vec!["PROJ-2025-058", "PROJ-2025-159", "PROJ-2025-057", "PROJ-2025-059"]
    );
}

#[test]
fn verified_project_without_date_lists_at_creation_time() {
    let mut undated = verified("PROJ-2025-070", 1);
    undated.verification_date = None;
    let dated = verified("PROJ-2025-071", 4);

    let listings = list_marketplace_entries(
        &[undated, dated],
        &ListingTermsBook::default(),
        &MarketplaceQuery::default(),
    );

    assert_eq!(ids(&listings), vec!["PROJ-2025-071", "PROJ-2025-070"]);
    assert_eq!(listings[1].verified_at, created_at());
}

#[test]
fn filters_combine_search_type_location_and_price() {
    let mut mangrove = verified("PROJ-2025-060", 1);
    mangrove.title = "Sundarbans Delta Belt".to_string();
    mangrove.project_type = "mangrove_restoration".to_string();
    mangrove.location_name = "West Bengal, India".to_string();

    let mut agro = verified("PROJ-2025-061", 2);
    agro.project_type = "agroforestry".to_string();
    agro.organization = Some("Delta Farmers Co-op".to_string());

    let projects = vec![mangrove, agro];
    let book = ListingTermsBook::default();

    let by_search = list_marketplace_entries(
        &projects,
        &book,
        &MarketplaceQuery {
            search: Some("  DELTA ".to_string()),
            ..MarketplaceQuery::default()
        },
    );
    assert_eq!(by_search.len(), 2);

    let by_type = list_marketplace_entries(
        &projects,
        &book,
        &MarketplaceQuery {
            project_type: Some("mangrove_restoration".to_string()),
            ..MarketplaceQuery::default()
        },
    );
    assert_eq!(ids(&by_type), vec!["PROJ-2025-060"]);

    let wildcard = list_marketplace_entries(
        &projects,
        &book,
        &MarketplaceQuery {
            project_type: Some("all".to_string()),
            location: Some("all".to_string()),
            ..MarketplaceQuery::default()
        },
    );
    assert_eq!(wildcard.len(), 2);

    let by_location = list_marketplace_entries(
        &projects,
        &book,
        &MarketplaceQuery {
            location: Some("kerala".to_string()),
            ..MarketplaceQuery::default()
        },
    );
    assert_eq!(ids(&by_location), vec!["PROJ-2025-061"]);

    let priced_out = list_marketplace_entries(
        &projects,
        &book,
        &MarketplaceQuery {
            min_price: Some(26.0),
            ..MarketplaceQuery::default()
        },
    );
    assert!(priced_out.is_empty());
}

#[test]
fn listings_are_enriched_for_buyers() {
    let mut unnamed = verified("PROJ-2025-070", 4);
    unnamed.organization = None;
    unnamed.project_type = "mangrove_restoration".to_string();

    let listings = list_marketplace_entries(
        &[unnamed],
        &ListingTermsBook::default(),
        &MarketplaceQuery::default(),
    );
    let listing = &listings[0];

    assert_eq!(listing.organization, "Unknown NGO");
    assert_eq!(listing.seller.name, "Unknown NGO");
    assert_eq!(listing.project_type, "Mangrove Restoration");
    assert_eq!(listing.category, "mangrove restoration");
    assert_eq!(listing.images, vec![DEFAULT_LISTING_IMAGE.to_string()]);
    assert_eq!(listing.credits_available, 100.0);
    assert_eq!(listing.trees, 5000.0);
    assert_eq!(listing.rating, 4.7);
    assert_eq!(listing.reviews, 15);
    assert!(listing.description.starts_with("mangrove restoration project covering 20 hectares"));
}

#[test]
fn market_stats_summarise_listings() {
    let projects = vec![verified("PROJ-2025-080", 1), verified("PROJ-2025-081", 2)];
    let terms = ListingTermsBook::default().with_override(
        ProjectId("PROJ-2025-081".to_string()),
        ListingTerms {
            price_per_credit: 35.0,
            ..ListingTerms::default()
        },
    );

    let listings = list_marketplace_entries(&projects, &terms, &MarketplaceQuery::default());
    let stats = MarketStats::from_listings(&listings);

    assert_eq!(stats.active_projects, 2);
    assert_eq!(stats.total_credits, 200.0);
    assert_eq!(stats.average_price, 30.0);
    assert_eq!(stats.total_value, 6000.0);
}

#[test]
fn sort_keys_parse_from_query_strings() {
    assert_eq!(ListingSort::parse("price-low"), Some(ListingSort::PriceLow));
    assert_eq!(ListingSort::parse(" Credits "), Some(ListingSort::Credits));
    assert_eq!(ListingSort::parse("cheapest"), None);
}
