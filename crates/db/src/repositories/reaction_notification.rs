//! Reaction notification repository.

use std::sync::Arc;

use crate::entities::{ReactionNotification, reaction_notification};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};

/// Reaction notification repository for database operations.
#[derive(Clone)]
pub struct ReactionNotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionNotificationRepository {
    /// Create a new reaction notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new notification record.
    pub async fn create(
        &self,
        model: reaction_notification::ActiveModel,
    ) -> AppResult<reaction_notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Undelivered notifications for a recipient, bounded.
    pub async fn find_unsent(
        &self,
        recipient_id: &str,
        limit: u64,
    ) -> AppResult<Vec<reaction_notification::Model>> {
        ReactionNotification::find()
            .filter(reaction_notification::Column::RecipientId.eq(recipient_id))
            .filter(reaction_notification::Column::Sent.eq(false))
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip an unsent notification to sent.
    ///
    /// The filter includes `sent = false`, so a record already marked stays
    /// untouched and the returned row count is 0.
    pub async fn mark_sent(&self, id: &str) -> AppResult<u64> {
        let result = ReactionNotification::update_many()
            .filter(reaction_notification::Column::Id.eq(id))
            .filter(reaction_notification::Column::Sent.eq(false))
            .col_expr(reaction_notification::Column::Sent, true.into())
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
    use crate::entities::reaction::Emoji;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_notification(
        id: &str,
        recipient_id: &str,
        sent: bool,
    ) -> reaction_notification::Model {
        reaction_notification::Model {
            id: id.to_string(),
            post_id: "p1".to_string(),
            post_title: "Hello".to_string(),
            recipient_id: recipient_id.to_string(),
            reactor_id: "u2".to_string(),
            reactor_name: "Grace".to_string(),
            emoji: Emoji::Grinning,
            sent,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_unsent() {
        let n1 = create_test_notification("n1", "u1", false);
        let n2 = create_test_notification("n2", "u1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n1, n2]])
                .into_connection(),
        );

        let repo = ReactionNotificationRepository::new(db);
        let unsent = repo.find_unsent("u1", 10).await.unwrap();

        assert_eq!(unsent.len(), 2);
        assert!(unsent.iter().all(|n| !n.sent));
    }

    #[tokio::test]
    async fn test_mark_sent_reports_rows_affected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = ReactionNotificationRepository::new(db);

        assert_eq!(repo.mark_sent("n1").await.unwrap(), 1);
        // Already sent: the filtered update touches nothing.
        assert_eq!(repo.mark_sent("n1").await.unwrap(), 0);
    }
}
