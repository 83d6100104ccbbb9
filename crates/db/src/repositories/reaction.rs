//! Reaction repository.

use std::sync::Arc;

use crate::entities::{Reaction, reaction};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new reaction.
    pub async fn create(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get reactions on a post, newest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::PostId.eq(post_id))
            .order_by_desc(reaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::reaction::Emoji;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_reaction(id: &str, post_id: &str, user_id: &str, emoji: Emoji) -> reaction::Model {
        reaction::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            user_name: "Test User".to_string(),
            emoji,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_inserted_model() {
        let model = create_test_reaction("r1", "p1", "u1", Emoji::Grinning);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[model.clone()]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let created = repo
            .create(reaction::ActiveModel::from(model))
            .await
            .unwrap();

        assert_eq!(created.id, "r1");
        assert_eq!(created.emoji, Emoji::Grinning);
    }

    #[tokio::test]
    async fn test_find_by_post() {
        let r1 = create_test_reaction("r1", "p1", "u1", Emoji::ThumbsUp);
        let r2 = create_test_reaction("r2", "p1", "u2", Emoji::Heart);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r2, r1]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let reactions = repo.find_by_post("p1").await.unwrap();

        assert_eq!(reactions.len(), 2);
    }
}
