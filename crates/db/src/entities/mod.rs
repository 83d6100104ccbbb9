//! Database entities.

#![allow(missing_docs)]

pub mod device_registration;
pub mod post;
pub mod reaction;
pub mod reaction_notification;
pub mod user;

pub use device_registration::Entity as DeviceRegistration;
pub use post::Entity as Post;
pub use reaction::Entity as Reaction;
pub use reaction_notification::Entity as ReactionNotification;
pub use user::Entity as User;
