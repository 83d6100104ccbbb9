//! Background job queue for quill.
//!
//! This crate provides asynchronous push dispatch using Redis:
//!
//! - **Jobs**: one [`PushJob`] per reaction push
//! - **Workers**: concurrent job execution with Apalis
//! - **Gateway**: the messaging-provider client with credential caching
//! - **Dispatch**: the queue-backed [`quill_core::PushDispatch`] implementation

pub mod dispatch_impl;
pub mod gateway;
pub mod jobs;
pub mod workers;

pub use dispatch_impl::RedisPushDispatcher;
pub use gateway::{
    BearerCredential, CredentialProvider, PushGateway, ServiceAccountTokenSource, TokenSource,
};
pub use jobs::*;
pub use workers::*;
