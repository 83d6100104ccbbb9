//! Reaction service.
//!
//! The reaction pipeline: persist the reaction, decide whether the post's
//! author is reachable, then either dispatch a push straight away or leave the
//! notification record unsent for a later backlog flush.

use crate::services::dispatch::{PushDispatchService, ReactionPush};
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{post, reaction, reaction::Emoji, reaction_notification, user},
    repositories::{
        DeviceRegistrationRepository, PostRepository, ReactionNotificationRepository,
        ReactionRepository,
    },
};
use sea_orm::Set;

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    post_repo: PostRepository,
    notification_repo: ReactionNotificationRepository,
    device_repo: DeviceRegistrationRepository,
    dispatch: Option<PushDispatchService>,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service without push dispatch.
    #[must_use]
    pub fn new(
        reaction_repo: ReactionRepository,
        post_repo: PostRepository,
        notification_repo: ReactionNotificationRepository,
        device_repo: DeviceRegistrationRepository,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            notification_repo,
            device_repo,
            dispatch: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new reaction service with push dispatch.
    #[must_use]
    pub fn with_dispatch(
        reaction_repo: ReactionRepository,
        post_repo: PostRepository,
        notification_repo: ReactionNotificationRepository,
        device_repo: DeviceRegistrationRepository,
        dispatch: PushDispatchService,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            notification_repo,
            device_repo,
            dispatch: Some(dispatch),
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a reaction to a post.
    ///
    /// The reaction is stored first; its notification record is stored with
    /// `sent` reflecting whether the author had a usable device at this
    /// moment. Dispatch happens through the work queue, off this request's
    /// critical path, and an enqueue failure never rolls anything back.
    pub async fn submit(&self, post_id: &str, emoji: &str, actor: &user::Model) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let emoji = Emoji::parse(emoji)
            .ok_or_else(|| AppError::Validation(format!("Unknown reaction emoji: {emoji}")))?;

        let reaction = reaction::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            user_id: Set(actor.id.clone()),
            user_name: Set(actor.full_name.clone()),
            emoji: Set(emoji),
            ..Default::default()
        };
        self.reaction_repo.create(reaction).await?;

        // The reachability decision happens once, here. The registration is
        // not re-checked at send time: `sent` records that dispatch was
        // attempted while a device appeared reachable.
        let registration = self.device_repo.find_usable(&post.user_id).await?;

        let model = self.build_notification(&post, actor, emoji, registration.is_some());
        let notification = self.notification_repo.create(model).await?;

        if let Some(registration) = registration {
            self.queue_push(&notification, &registration.device_token)
                .await;
        }

        Ok(())
    }

    /// Get reactions on a post, newest first.
    pub async fn reactions_for_post(&self, post_id: &str) -> AppResult<Vec<reaction::Model>> {
        self.reaction_repo.find_by_post(post_id).await
    }

    /// Build the notification record for a reaction.
    ///
    /// `reachable` decides the initial `sent` flag: a reachable author gets
    /// the record marked sent before the dispatch job is even enqueued.
    fn build_notification(
        &self,
        post: &post::Model,
        actor: &user::Model,
        emoji: Emoji,
        reachable: bool,
    ) -> reaction_notification::ActiveModel {
        reaction_notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            post_title: Set(post.title.clone()),
            recipient_id: Set(post.user_id.clone()),
            reactor_id: Set(actor.id.clone()),
            reactor_name: Set(actor.full_name.clone()),
            emoji: Set(emoji),
            sent: Set(reachable),
            ..Default::default()
        }
    }

    /// Enqueue one push for a freshly created notification, absorbing enqueue
    /// failures.
    async fn queue_push(&self, notification: &reaction_notification::Model, device_token: &str) {
        let Some(ref dispatch) = self.dispatch else {
            return;
        };

        let push = ReactionPush::from(notification);
        if let Err(e) = dispatch
            .queue_reaction_push(push, device_token)
            .await
        {
            tracing::warn!(
                error = %e,
                notification_id = %notification.id,
                "Failed to queue reaction push"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::dispatch::PushDispatch;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use quill_db::entities::device_registration;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase};
    use std::sync::{Arc, Mutex};

    /// Records every queued push instead of dispatching it.
    #[derive(Default)]
    struct RecordingDispatch {
        calls: Mutex<Vec<(ReactionPush, String)>>,
    }

    impl RecordingDispatch {
        fn calls(&self) -> Vec<(ReactionPush, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushDispatch for RecordingDispatch {
        async fn queue_reaction_push(
            &self,
            push: ReactionPush,
            device_token: &str,
        ) -> AppResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((push, device_token.to_string()));
            Ok(())
        }
    }

    fn create_test_user(id: &str, name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: name.to_lowercase(),
            email: format!("{name}@example.com"),
            full_name: name.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_disabled: false,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_post(id: &str, user_id: &str, title: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: "Some sufficiently long content".to_string(),
            published: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_reaction(id: &str, post_id: &str, user_id: &str) -> reaction::Model {
        reaction::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            user_name: "Grace".to_string(),
            emoji: Emoji::Grinning,
            created_at: Utc::now().into(),
        }
    }

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

    fn create_test_registration(user_id: &str, token_fill: char) -> device_registration::Model {
        device_registration::Model {
            id: "d1".to_string(),
            user_id: user_id.to_string(),
            device_token: token_fill.to_string().repeat(1540),
            active: true,
            expires_at: (Utc::now() + Duration::minutes(30)).into(),
            created_at: Utc::now().into(),
        }
    }

    struct Mocks {
        post: Vec<Vec<post::Model>>,
        reaction: Vec<Vec<reaction::Model>>,
        device: Vec<Vec<device_registration::Model>>,
        notification: Vec<Vec<reaction_notification::Model>>,
    }

    fn build_service(mocks: Mocks, dispatch: Option<Arc<RecordingDispatch>>) -> ReactionService {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(mocks.post)
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(mocks.reaction)
                .into_connection(),
        );
        let device_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(mocks.device)
                .into_connection(),
        );
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(mocks.notification)
                .into_connection(),
        );

        let reaction_repo = ReactionRepository::new(reaction_db);
        let post_repo = PostRepository::new(post_db);
        let notification_repo = ReactionNotificationRepository::new(notification_db);
        let device_repo = DeviceRegistrationRepository::new(device_db);

        match dispatch {
            Some(d) => ReactionService::with_dispatch(
                reaction_repo,
                post_repo,
                notification_repo,
                device_repo,
                d,
            ),
            None => ReactionService::new(reaction_repo, post_repo, notification_repo, device_repo),
        }
    }

    #[tokio::test]
    async fn test_submit_post_not_found() {
        let service = build_service(
            Mocks {
                post: vec![vec![]],
                reaction: vec![],
                device: vec![],
                notification: vec![],
            },
            None,
        );

        let actor = create_test_user("u2", "Grace");
        let result = service.submit("nonexistent", "😀", &actor).await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_unknown_emoji() {
        let post = create_test_post("p1", "u1", "Hello");
        let service = build_service(
            Mocks {
                post: vec![vec![post]],
                reaction: vec![],
                device: vec![],
                notification: vec![],
            },
            None,
        );

        let actor = create_test_user("u2", "Grace");
        let result = service.submit("p1", "🔥", &actor).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_submit_reachable_author_dispatches_once() {
        let post = create_test_post("p1", "u1", "Hello");
        let registration = create_test_registration("u1", 'a');
        let device_token = registration.device_token.clone();

        let dispatch = Arc::new(RecordingDispatch::default());
        let service = build_service(
            Mocks {
                post: vec![vec![post]],
                reaction: vec![vec![create_test_reaction("r1", "p1", "u2")]],
                device: vec![vec![registration]],
                notification: vec![vec![create_test_notification("n1", "u1", true)]],
            },
            Some(dispatch.clone()),
        );

        let actor = create_test_user("u2", "Grace");
        service.submit("p1", "😀", &actor).await.unwrap();

        let calls = dispatch.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, device_token);
        assert_eq!(calls[0].0.notification_id, "n1");
        assert_eq!(calls[0].0.emoji, "😀");
        assert_eq!(calls[0].0.post_title, "Hello");
    }

    #[tokio::test]
    async fn test_submit_unreachable_author_dispatches_nothing() {
        let post = create_test_post("p1", "u1", "Hello");

        let dispatch = Arc::new(RecordingDispatch::default());
        let service = build_service(
            Mocks {
                post: vec![vec![post]],
                reaction: vec![vec![create_test_reaction("r1", "p1", "u2")]],
                device: vec![vec![]],
                notification: vec![vec![create_test_notification("n1", "u1", false)]],
            },
            Some(dispatch.clone()),
        );

        let actor = create_test_user("u2", "Grace");
        service.submit("p1", "😀", &actor).await.unwrap();

        assert!(dispatch.calls().is_empty());
    }

    #[test]
    fn test_build_notification_sent_tracks_reachability() {
        let service = build_service(
            Mocks {
                post: vec![],
                reaction: vec![],
                device: vec![],
                notification: vec![],
            },
            None,
        );

        let post = create_test_post("p1", "u1", "Hello");
        let actor = create_test_user("u2", "Grace");

        let reachable = service.build_notification(&post, &actor, Emoji::Grinning, true);
        assert!(matches!(reachable.sent, ActiveValue::Set(true)));
        assert!(matches!(reachable.recipient_id, ActiveValue::Set(ref r) if r == "u1"));
        assert!(matches!(reachable.post_title, ActiveValue::Set(ref t) if t == "Hello"));

        let deferred = service.build_notification(&post, &actor, Emoji::Grinning, false);
        assert!(matches!(deferred.sent, ActiveValue::Set(false)));
    }
}
