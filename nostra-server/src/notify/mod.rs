//! Realtime and e-mail notifications
//!
//! - [`gateway`] - broadcast hub the domain services publish into
//! - [`ws`] - WebSocket endpoint delivering gateway events to clients
//! - [`email`] - transactional mail boundary

pub mod email;
pub mod gateway;
pub mod ws;

pub use email::EmailService;
pub use gateway::{Audience, ClientIdentity, Envelope, NotificationGateway};
