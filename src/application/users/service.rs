//! User service: application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{
    CreateUserDto, DomainResult, EnrichmentResult, GeoInfoClient, GeoLookupError, User,
    UserRepositoryInterface,
};

/// Key under which the new user's id is added to the registration result.
pub const USER_ID_KEY: &str = "usedId";

/// Key of the sentinel entry returned when enrichment failed.
pub const ENRICHMENT_STATUS_KEY: &str = "enrichment";
pub const ENRICHMENT_UNAVAILABLE: &str = "unavailable";

pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// User service: registration workflow plus user management.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct UserService {
    repo: Arc<dyn UserRepositoryInterface>,
    geo: Arc<dyn GeoInfoClient>,
    enrichment_timeout: Duration,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepositoryInterface>, geo: Arc<dyn GeoInfoClient>) -> Self {
        Self {
            repo,
            geo,
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
        }
    }

    /// Upper bound for the geo lookup. A slower lookup counts as failed.
    pub fn with_enrichment_timeout(mut self, timeout: Duration) -> Self {
        self.enrichment_timeout = timeout;
        self
    }

    // ── Registration ────────────────────────────────────────────

    /// Register `candidate` and return its location metadata with the new id
    /// under [`USER_ID_KEY`].
    ///
    /// A failed lookup does not fail the registration: the result then holds
    /// `{"enrichment": "unavailable"}` instead of the lookup data. A failed
    /// store write is returned as is.
    pub async fn register_user(
        &self,
        candidate: CreateUserDto,
        source_ip: &str,
    ) -> DomainResult<EnrichmentResult> {
        let mut result = match self.lookup_location(source_ip).await {
            Ok(info) => info,
            Err(e) => {
                warn!(ip = source_ip, error = %e, "Geo enrichment unavailable, registering without location");
                metrics::counter!("geo_enrichment_failures_total").increment(1);
                unavailable_enrichment()
            }
        };

        let id = self.repo.create_user(candidate).await?;
        result.insert(USER_ID_KEY.to_string(), Value::from(id));

        metrics::counter!("user_registrations_total").increment(1);
        info!(user_id = id, "New user registered");
        Ok(result)
    }

    async fn lookup_location(&self, ip: &str) -> Result<EnrichmentResult, GeoLookupError> {
        match tokio::time::timeout(self.enrichment_timeout, self.geo.get_info(ip)).await {
            Ok(result) => result,
            Err(_) => Err(GeoLookupError::Timeout(self.enrichment_timeout)),
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get_user_by_id(&self, id: i64) -> DomainResult<User> {
        self.repo.get_user_by_id(id).await
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Full replace of the record identified by `user.id`.
    pub async fn update_user(&self, user: User) -> DomainResult<()> {
        self.repo.update_user(user).await
    }

    pub async fn delete_user(&self, id: i64) -> DomainResult<()> {
        self.repo.delete_user(id).await
    }
}

fn unavailable_enrichment() -> EnrichmentResult {
    let mut map = EnrichmentResult::new();
    map.insert(
        ENRICHMENT_STATUS_KEY.to_string(),
        Value::from(ENRICHMENT_UNAVAILABLE),
    );
    map
}
