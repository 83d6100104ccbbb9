//! Push worker.

use apalis::prelude::*;
use tracing::debug;

use crate::gateway::PushGateway;
use crate::jobs::PushJob;

/// Context for the push worker.
#[derive(Clone)]
pub struct PushWorkerContext {
    /// Gateway client shared by the worker pool.
    pub gateway: PushGateway,
}

impl PushWorkerContext {
    /// Create a new push worker context.
    #[must_use]
    pub const fn new(gateway: PushGateway) -> Self {
        Self { gateway }
    }
}

/// Worker function for reaction pushes.
///
/// Push delivery is best-effort: the gateway absorbs and logs every failure,
/// and the job always completes so the queue never retries it.
///
/// # Errors
/// Never returns an error.
pub async fn push_worker(job: PushJob, ctx: Data<PushWorkerContext>) -> Result<(), Error> {
    debug!(
        notification_id = %job.push.notification_id,
        "Dispatching reaction push"
    );

    ctx.gateway.send(&job.push, &job.device_token).await;

    Ok(())
}
