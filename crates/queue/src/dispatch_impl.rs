//! Redis-backed push dispatch implementation.
//!
//! This module provides a Redis-based implementation of the `PushDispatch`
//! trait that queues jobs for the Apalis worker to process.

use async_trait::async_trait;
use quill_common::AppResult;
use quill_core::{PushDispatch, ReactionPush};

use crate::jobs::PushJob;

/// Redis-backed push dispatch service.
///
/// Queues dispatch jobs to Redis for processing by the push worker pool,
/// keeping provider round-trips off the request path.
#[derive(Clone)]
pub struct RedisPushDispatcher {
    /// Redis storage for the job queue (apalis-redis).
    storage: apalis_redis::RedisStorage<PushJob>,
}

impl RedisPushDispatcher {
    /// Create a new Redis push dispatcher.
    #[must_use]
    pub const fn new(storage: apalis_redis::RedisStorage<PushJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PushDispatch for RedisPushDispatcher {
    async fn queue_reaction_push(&self, push: ReactionPush, device_token: &str) -> AppResult<()> {
        use apalis::prelude::*;

        let notification_id = push.notification_id.clone();
        let job = PushJob::new(push, device_token.to_string());

        self.storage
            .clone()
            .push(job)
            .await
            .map_err(|e| quill_common::AppError::Queue(format!("Failed to queue push job: {e}")))?;

        tracing::debug!(notification_id = %notification_id, "Queued push job");

        Ok(())
    }
}
