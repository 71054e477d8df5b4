//! Background cleanup task for expired storage records

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use sea_orm::DatabaseConnection;
use tokio::time::{Duration, interval};
use tracing::{error, info};

use crate::error::PixelpinAuthError;
use crate::storage::{AssociationStore, CodeStore, NonceStore, PartialStore};

/// Row counts removed by one cleanup cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub nonces: u64,
    pub associations: u64,
    pub codes: u64,
    pub partials: u64,
}

/// Periodically removes nonces outside the skew window, expired associations and
/// codes/partials older than their configured maximum age
pub struct CleanupTask {
    db: Arc<DatabaseConnection>,
    interval_secs: u64,
    code_max_age: ChronoDuration,
    partial_max_age: ChronoDuration,
}

impl CleanupTask {
    pub fn new(
        db: Arc<DatabaseConnection>,
        interval_secs: u64,
        code_max_age: ChronoDuration,
        partial_max_age: ChronoDuration,
    ) -> Self {
        Self {
            db,
            interval_secs,
            code_max_age,
            partial_max_age,
        }
    }

    /// Run the cleanup task in an infinite loop
    pub async fn run(self) {
        let mut timer = interval(Duration::from_secs(self.interval_secs.max(1)));

        loop {
            timer.tick().await;

            if let Err(e) = self.run_cleanup().await {
                error!(error = %e, "Cleanup cycle failed");
            }
        }
    }

    /// Run a single cleanup cycle
    pub async fn run_cleanup(&self) -> Result<CleanupReport, PixelpinAuthError> {
        let db = &*self.db;

        let nonces = NonceStore::new(db)
            .cleanup_expired()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to cleanup expired nonces"))?;

        let associations = AssociationStore::new(db)
            .cleanup_expired()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to cleanup expired associations"))?;

        let codes = CodeStore::new(db)
            .cleanup_stale(self.code_max_age)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to cleanup stale codes"))?;

        let partials = PartialStore::new(db)
            .cleanup_stale(self.partial_max_age)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to cleanup stale partials"))?;

        let report = CleanupReport {
            nonces,
            associations,
            codes,
            partials,
        };
        if report != CleanupReport::default() {
            info!(
                nonces = report.nonces,
                associations = report.associations,
                codes = report.codes,
                partials = report.partials,
                "Cleaned up expired storage records"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::{code, nonce, partial};
    use crate::db::initialize_in_memory_database;
    use crate::logging::setup_test_logging;
    use crate::storage::OpenIdAssociation;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    async fn setup_task() -> CleanupTask {
        let db = initialize_in_memory_database()
            .await
            .expect("Failed to initialize in-memory database");
        CleanupTask::new(
            Arc::new(db),
            1,
            ChronoDuration::hours(24),
            ChronoDuration::hours(24),
        )
    }

    #[tokio::test]
    async fn test_cleanup_task_no_expired_data() {
        setup_test_logging();
        let cleanup = setup_task().await;

        let report = cleanup.run_cleanup().await.expect("Cleanup should succeed");
        assert_eq!(report, CleanupReport::default());
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_records() {
        setup_test_logging();
        let cleanup = setup_task().await;
        let db = &*cleanup.db;
        let now = chrono::Utc::now();

        // Nonce from well outside the skew window, and a current one
        nonce::ActiveModel {
            server_url: Set("https://op.example.com".to_string()),
            timestamp: Set(now.timestamp() - ChronoDuration::hours(6).num_seconds()),
            salt: Set("old".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert old nonce");
        NonceStore::new(db)
            .use_nonce("https://op.example.com", now.timestamp(), "fresh")
            .await
            .expect("Failed to use fresh nonce");

        let associations = AssociationStore::new(db);
        associations
            .store(
                "https://op.example.com",
                &OpenIdAssociation {
                    handle: "expired".to_string(),
                    secret: b"secret".to_vec(),
                    issued: now.timestamp() - 7200,
                    lifetime: 3600,
                    assoc_type: "HMAC-SHA1".to_string(),
                },
            )
            .await
            .expect("Failed to store expired association");
        associations
            .store(
                "https://op.example.com",
                &OpenIdAssociation {
                    handle: "valid".to_string(),
                    secret: b"secret".to_vec(),
                    issued: now.timestamp(),
                    lifetime: 3600,
                    assoc_type: "HMAC-SHA1".to_string(),
                },
            )
            .await
            .expect("Failed to store valid association");

        code::ActiveModel {
            email: Set("old@example.com".to_string()),
            code: Set("0123456789abcdef0123456789abcdef".to_string()),
            verified: Set(true),
            created_at: Set(now - ChronoDuration::days(2)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert old code");
        CodeStore::new(db)
            .make_code("new@example.com")
            .await
            .expect("Failed to make code");

        partial::ActiveModel {
            token: Set("fedcba9876543210fedcba9876543210".to_string()),
            next_step: Set(1),
            backend: Set("pixelpin".to_string()),
            data: Set(serde_json::json!({"args": [], "kwargs": {}})),
            timestamp: Set(now - ChronoDuration::days(2)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert old partial");

        let report = cleanup.run_cleanup().await.expect("Cleanup should succeed");
        assert_eq!(
            report,
            CleanupReport {
                nonces: 1,
                associations: 1,
                codes: 1,
                partials: 1,
            }
        );

        assert_eq!(
            nonce::Entity::find().all(db).await.expect("query").len(),
            1,
            "Fresh nonce should remain"
        );
        assert_eq!(
            code::Entity::find().all(db).await.expect("query").len(),
            1,
            "New code should remain"
        );
        let remaining = associations
            .get("https://op.example.com", None)
            .await
            .expect("query");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].handle, "valid");
    }
}
