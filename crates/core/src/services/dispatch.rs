//! Push dispatch service.
//!
//! Provides an abstraction for queueing push-notification dispatch jobs.
//! The actual implementation is provided by the queue crate, so core services
//! enqueue work without depending on the queue backend.

use async_trait::async_trait;
use quill_common::AppResult;
use quill_db::entities::reaction_notification;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Payload for one reaction push, carried through the work queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionPush {
    /// The notification record this dispatch belongs to.
    pub notification_id: String,
    /// Reactor display name.
    pub reactor_name: String,
    /// Reaction emoji codepoint string.
    pub emoji: String,
    /// Title of the post that was reacted to.
    pub post_title: String,
}

impl From<&reaction_notification::Model> for ReactionPush {
    fn from(n: &reaction_notification::Model) -> Self {
        Self {
            notification_id: n.id.clone(),
            reactor_name: n.reactor_name.clone(),
            emoji: n.emoji.to_string(),
            post_title: n.post_title.clone(),
        }
    }
}

/// Trait for queueing push dispatch.
///
/// Enqueueing is the only responsibility here: delivery itself happens on the
/// worker pool, off the request's critical path.
#[async_trait]
pub trait PushDispatch: Send + Sync {
    /// Queue a reaction push to a single device.
    async fn queue_reaction_push(&self, push: ReactionPush, device_token: &str) -> AppResult<()>;
}

/// A no-op implementation of `PushDispatch` for testing or when push is
/// disabled.
#[derive(Clone, Default)]
pub struct NoOpDispatch;

#[async_trait]
impl PushDispatch for NoOpDispatch {
    async fn queue_reaction_push(
        &self,
        _push: ReactionPush,
        _device_token: &str,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `PushDispatch` trait object.
pub type PushDispatchService = Arc<dyn PushDispatch>;
