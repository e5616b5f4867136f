//! Shared types for the Mesa reservation platform
//!
//! Common types used by the server and clients: roles, reservation
//! status lifecycle, and the sync message envelope pushed over the
//! live-update bus.

pub mod message;
pub mod types;

// Re-exports
pub use message::{SyncAction, SyncPayload};
pub use serde::{Deserialize, Serialize};
pub use types::{ReservationStatus, Role};
