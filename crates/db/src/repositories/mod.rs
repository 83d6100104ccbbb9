//! Database repositories.

#![allow(missing_docs)]

mod device_registration;
mod post;
mod reaction;
mod reaction_notification;
mod user;

pub use device_registration::DeviceRegistrationRepository;
pub use post::PostRepository;
pub use reaction::ReactionRepository;
pub use reaction_notification::ReactionNotificationRepository;
pub use user::UserRepository;
