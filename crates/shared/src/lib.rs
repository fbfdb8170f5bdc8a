//! Shared types and utilities for the hexchat client.
//!
//! Everything here is free of I/O: canonical models, payload normalization,
//! optimistic-message reconciliation and the socket.io frame codec.

pub mod error;
pub mod filter;
pub mod models;
pub mod protocol;
pub mod reconcile;
pub mod wire;

pub use error::*;
pub use filter::*;
pub use models::*;
pub use protocol::*;
pub use reconcile::*;
