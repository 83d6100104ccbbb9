//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod device;
pub mod dispatch;
pub mod post;
pub mod reaction;
pub mod user;

pub use auth::{AuthService, Identity};
pub use device::{DeviceService, RegistrationOutcome};
pub use dispatch::{NoOpDispatch, PushDispatch, PushDispatchService, ReactionPush};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use reaction::ReactionService;
pub use user::{CreateUserInput, UserService};
