//! Data models for the Helix API.
//!
//! Models are organized by domain:
//!
//! - [`primitives`] - Identifier newtypes and the [`Environment`]
//! - [`enums`] - Tiers and user classifications
//! - [`channel`] - Channel metadata
//! - [`subscription`] - Subscription models
//! - [`user`] - Users, follows and follower records

pub mod primitives;
pub mod enums;
pub mod channel;
pub mod subscription;
pub mod user;

pub use primitives::*;
pub use enums::*;
pub use channel::*;
pub use subscription::*;
pub use user::*;
