//! Job workers.

mod push;

pub use push::{PushWorkerContext, push_worker};
