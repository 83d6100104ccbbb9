//! Device service.
//!
//! The reachability registry: which (user, device token) pairs can currently
//! receive pushes, plus the backlog flush that runs when a device comes back.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;

use crate::services::dispatch::{PushDispatchService, ReactionPush};
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::device_registration,
    repositories::{DeviceRegistrationRepository, ReactionNotificationRepository},
};

/// Provider device tokens are long opaque base64url-ish strings.
#[allow(clippy::unwrap_used)] // pattern is a literal, known valid
static DEVICE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1526,1600}$").unwrap());

/// Upper bound on notifications replayed per registration.
const FLUSH_BATCH: u64 = 10;

/// Outcome of a device registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// An identical active registration already existed; nothing was created
    /// and no backlog flush ran.
    AlreadyActive,
    /// A new registration was created and the backlog flush was triggered.
    Registered,
}

/// Device service for reachability bookkeeping.
#[derive(Clone)]
pub struct DeviceService {
    device_repo: DeviceRegistrationRepository,
    notification_repo: ReactionNotificationRepository,
    dispatch: Option<PushDispatchService>,
    id_gen: IdGenerator,
}

impl DeviceService {
    /// Create a new device service without push dispatch.
    #[must_use]
    pub fn new(
        device_repo: DeviceRegistrationRepository,
        notification_repo: ReactionNotificationRepository,
    ) -> Self {
        Self {
            device_repo,
            notification_repo,
            dispatch: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new device service with push dispatch.
    #[must_use]
    pub fn with_dispatch(
        device_repo: DeviceRegistrationRepository,
        notification_repo: ReactionNotificationRepository,
        dispatch: PushDispatchService,
    ) -> Self {
        Self {
            device_repo,
            notification_repo,
            dispatch: Some(dispatch),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a device as reachable for a user until `expires_at`.
    ///
    /// Idempotent on an already-active identical pair. A fresh registration
    /// (including one after an explicit deregistration) replays the
    /// recipient's unsent notification backlog to the new device.
    pub async fn register(
        &self,
        user_id: &str,
        device_token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RegistrationOutcome> {
        validate_device_token(device_token)?;

        if self
            .device_repo
            .find_active(user_id, device_token)
            .await?
            .is_some()
        {
            return Ok(RegistrationOutcome::AlreadyActive);
        }

        let model = device_registration::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            device_token: Set(device_token.to_string()),
            active: Set(true),
            expires_at: Set(expires_at.into()),
            ..Default::default()
        };
        self.device_repo.create(model).await?;

        self.flush_backlog(user_id, device_token).await;

        Ok(RegistrationOutcome::Registered)
    }

    /// Deregister a device. Fails with `NotFound` when no active registration
    /// matches the pair.
    pub async fn deregister(&self, user_id: &str, device_token: &str) -> AppResult<()> {
        validate_device_token(device_token)?;

        let affected = self.device_repo.deactivate(user_id, device_token).await?;
        if affected == 0 {
            return Err(AppError::NotFound(
                "Active device registration not found".to_string(),
            ));
        }

        Ok(())
    }

    /// Replay up to [`FLUSH_BATCH`] unsent notifications to a newly registered
    /// device.
    ///
    /// Each record is marked sent right after its job is enqueued; the read
    /// and the mark are separate statements, so a reaction arriving while the
    /// flush runs can be dispatched twice. Every failure here is absorbed:
    /// the registration itself already succeeded.
    async fn flush_backlog(&self, user_id: &str, device_token: &str) {
        let Some(ref dispatch) = self.dispatch else {
            return;
        };

        let pending = match self.notification_repo.find_unsent(user_id, FLUSH_BATCH).await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to read notification backlog");
                return;
            }
        };

        if pending.is_empty() {
            return;
        }

        tracing::debug!(
            user_id = %user_id,
            count = pending.len(),
            "Flushing notification backlog"
        );

        for notification in pending {
            let push = ReactionPush::from(&notification);
            if let Err(e) = dispatch.queue_reaction_push(push, device_token).await {
                tracing::warn!(
                    error = %e,
                    notification_id = %notification.id,
                    "Failed to queue backlog push"
                );
                continue;
            }

            if let Err(e) = self.notification_repo.mark_sent(&notification.id).await {
                tracing::warn!(
                    error = %e,
                    notification_id = %notification.id,
                    "Failed to mark notification sent"
                );
            }
        }
    }
}

/// Validate the device token shape.
fn validate_device_token(device_token: &str) -> AppResult<()> {
    if DEVICE_TOKEN_RE.is_match(device_token) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Malformed device registration token".to_string(),
        ))
    }
}
