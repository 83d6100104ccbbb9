//! Device registration repository.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{DeviceRegistration, device_registration};
use quill_common::{AppError, AppResult};

/// Repository for push reachability records.
#[derive(Clone)]
pub struct DeviceRegistrationRepository {
    db: Arc<DatabaseConnection>,
}

impl DeviceRegistrationRepository {
    /// Create a new device registration repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the active record for an exact (user, token) pair.
    pub async fn find_active(
        &self,
        user_id: &str,
        device_token: &str,
    ) -> AppResult<Option<device_registration::Model>> {
        DeviceRegistration::find()
            .filter(device_registration::Column::UserId.eq(user_id))
            .filter(device_registration::Column::DeviceToken.eq(device_token))
            .filter(device_registration::Column::Active.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One usable record for a user: active, with an expiry strictly in the
    /// future. The most recent registration wins; there is no fan-out.
    pub async fn find_usable(
        &self,
        user_id: &str,
    ) -> AppResult<Option<device_registration::Model>> {
        DeviceRegistration::find()
            .filter(device_registration::Column::UserId.eq(user_id))
            .filter(device_registration::Column::Active.eq(true))
            .filter(device_registration::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(device_registration::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new registration.
    pub async fn create(
        &self,
        model: device_registration::ActiveModel,
    ) -> AppResult<device_registration::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip the matching active record inactive.
    ///
    /// A single filtered update, so concurrent deregistrations of the same
    /// pair race safely: the first writer wins and later ones see 0 rows.
    pub async fn deactivate(&self, user_id: &str, device_token: &str) -> AppResult<u64> {
        let result = DeviceRegistration::update_many()
            .filter(device_registration::Column::UserId.eq(user_id))
            .filter(device_registration::Column::DeviceToken.eq(device_token))
            .filter(device_registration::Column::Active.eq(true))
            .col_expr(device_registration::Column::Active, false.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_registration(
        id: &str,
        user_id: &str,
        active: bool,
        expires_in_minutes: i64,
    ) -> device_registration::Model {
        device_registration::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            device_token: "t".repeat(1540),
            active,
            expires_at: (Utc::now() + Duration::minutes(expires_in_minutes)).into(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_active_found() {
        let registration = create_test_registration("d1", "u1", true, 30);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[registration.clone()]])
                .into_connection(),
        );

        let repo = DeviceRegistrationRepository::new(db);
        let result = repo
            .find_active("u1", &registration.device_token)
            .await
            .unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_find_usable_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<device_registration::Model>::new()])
                .into_connection(),
        );

        let repo = DeviceRegistrationRepository::new(db);
        let result = repo.find_usable("u1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_deactivate_no_match_is_zero_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = DeviceRegistrationRepository::new(db);
        let affected = repo.deactivate("u1", "no-such-token").await.unwrap();

        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_deactivate_match_is_one_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = DeviceRegistrationRepository::new(db);
        let affected = repo.deactivate("u1", "registered-token").await.unwrap();

        assert_eq!(affected, 1);
    }
}
