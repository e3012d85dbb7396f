use std::path::PathBuf;
use std::sync::Arc;

use carbon_market::config::AppConfig;
use carbon_market::error::AppError;
use carbon_market::workflows::ledger::{Address, WalletGateway};
use carbon_market::workflows::projects::{
    ListingTermsBook, MarketplaceQuery, Project, ProjectCsvImporter, ProjectId,
    ProjectReviewService, ProjectStatus, ProjectSubmission, SubmitterId,
};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde_json::json;

use crate::infra::{
    build_ledger_service, InMemoryNoticePublisher, InMemoryProjectRepository, OPERATOR_WALLET,
};

const DEMO_BUYER: &str = "0x9876543210fedcba0987654321fedcba09876543";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Project CSV export to review instead of the built-in sample
    #[arg(long)]
    pub(crate) projects_csv: Option<PathBuf>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let now = Utc::now();

    let projects = match args.projects_csv {
        Some(path) => ProjectCsvImporter::from_path(path)?,
        None => sample_projects(now),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    let seeded = repository.seed(projects)?;
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let service = ProjectReviewService::new(
        repository,
        notices.clone(),
        ListingTermsBook::new(config.marketplace.listing_terms()),
    );

    println!("Carbon market review demo");
    println!("- {seeded} projects loaded");

    match service.submit(sample_submission()) {
        Ok(project) => println!("- Submitted {} \"{}\" for review", project.id, project.title),
        Err(err) => println!("- Submission rejected: {err}"),
    }

    let pending: Vec<ProjectId> = service
        .queue(Some(ProjectStatus::Pending))?
        .into_iter()
        .map(|entry| entry.id)
        .collect();

    println!("\nReview decisions");
    if let Some(id) = pending.first() {
        match service.approve(id, Some("Boundary and species list match the site survey")) {
            Ok(project) => println!("- {} -> {}", project.id, project.status.badge()),
            Err(err) => println!("- {id} approval failed: {err}"),
        }
    }
    if let Some(id) = pending.get(1) {
        if let Err(err) = service.reject(id, "") {
            println!("- {id} rejection refused: {err}");
        }
        match service.reject(id, "Reported area exceeds the surveyed parcel") {
            Ok(project) => println!("- {} -> {}", project.id, project.status.badge()),
            Err(err) => println!("- {id} rejection failed: {err}"),
        }
    }
    for notice in notices.events() {
        match notice.description {
            Some(description) => println!("  [{:?}] {}: {}", notice.level, notice.title, description),
            None => println!("  [{:?}] {}", notice.level, notice.title),
        }
    }

    println!("\nAdmin queue");
    for entry in service.queue(None)? {
        println!(
            "- {} | {} | {} | {} | {} ha | {} credits | ~{} trees",
            entry.id,
            entry.title,
            entry.status_label,
            entry.priority_label,
            entry.area_hectares,
            entry.displayed_credits,
            entry.estimated_trees
        );
    }

    let stats = service.statistics()?;
    println!(
        "\nStatistics: {} pending | {} verified | {} rejected | {} credits issued | {} organizations",
        stats.pending_count,
        stats.verified_count,
        stats.rejected_count,
        stats.total_credits_issued,
        stats.active_organization_count
    );

    let market = service.marketplace(&MarketplaceQuery::default())?;
    println!(
        "\nMarketplace: {} listings | {} credits | avg ${:.2} | ${:.2} total value",
        market.stats.active_projects,
        market.stats.total_credits,
        market.stats.average_price,
        market.stats.total_value
    );
    for listing in &market.listings {
        println!(
            "- {} ({}) by {} | {} | {} credits @ ${:.2}",
            listing.project_name,
            listing.project_type,
            listing.organization,
            listing.location,
            listing.credits_available,
            listing.price_per_credit
        );
    }

    let (ledger_service, ledger) = build_ledger_service(&config)?;
    let wallet = Address::parse(OPERATOR_WALLET)?;
    let buyer = Address::parse(DEMO_BUYER)?;

    println!("\nLedger (chain {})", ledger.chain_id());
    for listing in &market.listings {
        match ledger_service
            .mint(
                listing.id.clone(),
                wallet.clone(),
                listing.credits_available,
                &json!({ "verifiedAt": listing.verified_at }),
            )
            .await
        {
            Ok(outcome) => println!(
                "- Minted {} as {} (tx {})",
                outcome.credits_amount, outcome.token_id, outcome.transaction_hash
            ),
            Err(err) => println!("- Minting {} failed: {err}", listing.id),
        }
    }

    let holdings = ledger.balance(&wallet)?;
    if holdings > 0.0 {
        let amount = (holdings / 4.0).floor().max(1.0).min(holdings);
        let receipt = ledger_service.transfer(&wallet, &buyer, amount)?;
        println!(
            "- Transferred {amount} credits to {} (block {})",
            buyer.short(),
            receipt.block_number
        );
    }
    for balance in ledger_service.balances(&wallet)? {
        println!(
            "- {} holds {} {} worth ${:.2}",
            wallet.short(),
            balance.balance,
            balance.symbol,
            balance.value
        );
    }

    Ok(())
}

fn sample_projects(now: DateTime<Utc>) -> Vec<Project> {
    let verified_at = now - Duration::days(3);
    vec![
        sample_project(
            "PROJ-2024-101",
            "Sundarbans Mangrove Revival",
            "mangrove_restoration",
            "West Bengal, India",
            42.0,
            180.0,
            Some("Delta Green Trust"),
            now - Duration::days(40),
            Some(verified_at),
        ),
        sample_project(
            "PROJ-2024-102",
            "Western Ghats Shade Corridor",
            "agroforestry",
            "Kerala, India",
            18.0,
            64.0,
            None,
            now - Duration::days(12),
            None,
        ),
        sample_project(
            "PROJ-2024-103",
            "Aravalli Scrubland Recovery",
            "reforestation",
            "Haryana, India",
            9.5,
            22.0,
            Some("Aravalli Bachao"),
            now - Duration::days(6),
            None,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn sample_project(
    id: &str,
    title: &str,
    project_type: &str,
    location: &str,
    area_hectares: f64,
    estimated_co2_tons: f64,
    organization: Option<&str>,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
) -> Project {
    Project {
        id: ProjectId(id.to_string()),
        title: title.to_string(),
        project_type: project_type.to_string(),
        location_name: location.to_string(),
        latitude: 0.0,
        longitude: 0.0,
        area_hectares,
        tree_species: Vec::new(),
        media_urls: Vec::new(),
        submitted_by: SubmitterId(format!("ngo-{}", id.to_ascii_lowercase())),
        organization: organization.map(str::to_string),
        created_at,
        status: if verified_at.is_some() {
            ProjectStatus::Verified
        } else {
            ProjectStatus::Pending
        },
        verification_date: verified_at,
        verification_notes: String::new(),
        estimated_co2_tons,
    }
}

fn sample_submission() -> ProjectSubmission {
    ProjectSubmission {
        title: "Chilika Lagoon Fringe Planting".to_string(),
        project_type: "mangrove_restoration".to_string(),
        location_name: "Odisha, India".to_string(),
        latitude: 19.72,
        longitude: 85.32,
        area_hectares: 12.0,
        tree_species: vec!["Avicennia marina".to_string()],
        media_urls: Vec::new(),
        submitted_by: SubmitterId("ngo-chilika".to_string()),
        organization: Some("Chilika Fisherfolk Collective".to_string()),
        estimated_co2_tons: 38.0,
    }
}
