//! Reaction push job.

use quill_core::ReactionPush;
use serde::{Deserialize, Serialize};

/// Job to deliver one reaction push to one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushJob {
    /// The push payload.
    pub push: ReactionPush,

    /// Target device registration token.
    pub device_token: String,
}

impl PushJob {
    /// Create a new push job.
    #[must_use]
    pub const fn new(push: ReactionPush, device_token: String) -> Self {
        Self { push, device_token }
    }
}
