use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use carbon_market::config::AppConfig;
use carbon_market::workflows::ledger::{
    Address, CreditToken, HttpPinner, LedgerError, LedgerService, SimulatedLedger,
};
use carbon_market::workflows::projects::{
    NoticeError, NoticeLevel, NoticePublisher, Project, ProjectId, ProjectRepository,
    ProjectStatus, RepositoryError, ReviewNotice,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectRepository {
    records: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    /// Loads a snapshot. Ids already stored are a conflict; seeded ids are reserved so
    /// later submissions do not collide with them.
    pub(crate) fn seed(&self, projects: Vec<Project>) -> Result<usize, RepositoryError> {
        let mut guard = self.guard()?;
        if projects.iter().any(|project| guard.contains_key(&project.id)) {
            return Err(RepositoryError::Conflict);
        }
        let count = projects.len();
        for project in projects {
            project.id.reserve();
            guard.insert(project.id.clone(), project);
        }
        Ok(count)
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<ProjectId, Project>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let mut projects: Vec<Project> = self.guard()?.values().cloned().collect();
        projects.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(projects)
    }

    fn update_if_status(
        &self,
        project: Project,
        expected: ProjectStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        let stored = guard.get(&project.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StaleStatus {
                expected,
                actual: stored.status,
            });
        }
        guard.insert(project.id.clone(), project);
        Ok(())
    }
}

/// Logs reviewer notices and keeps them for the demo transcript.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<ReviewNotice>>>,
}

impl NoticePublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NoticeError> {
        match notice.level {
            NoticeLevel::Success => info!(project_id = %notice.project_id, title = %notice.title, "review notice"),
            NoticeLevel::Failure => warn!(project_id = %notice.project_id, title = %notice.title, "review notice"),
        }
        self.events
            .lock()
            .map_err(|_| NoticeError::Transport("notice lock poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<ReviewNotice> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Wallet returned by `connect` on the simulated ledger.
pub(crate) const OPERATOR_WALLET: &str = "0x742d35Cc6634C0532925a3b8D4C0532925a3b8D4";

pub(crate) type MarketLedgerService = LedgerService<SimulatedLedger, HttpPinner>;

/// Builds the ledger service over the simulated ledger.
pub(crate) fn build_ledger_service(
    config: &AppConfig,
) -> Result<(Arc<MarketLedgerService>, Arc<SimulatedLedger>), LedgerError> {
    let contract = Address::parse(&config.ledger.token_contract)?;
    let operator = Address::parse(OPERATOR_WALLET)?;
    let ledger = Arc::new(SimulatedLedger::new(config.ledger.chain_id, operator));
    let pinner = HttpPinner::new(config.ledger.pin_url.clone()).unwrap_or_else(|err| {
        warn!(error = %err, "pinning client unavailable; documents will be hashed locally");
        HttpPinner::offline()
    });

    let service = LedgerService::new(
        ledger.clone(),
        Arc::new(pinner),
        CreditToken::carbon_credit(contract, config.ledger.token_price_usd),
        config.ledger.chain_id,
    );
    Ok((Arc::new(service), ledger))
}
