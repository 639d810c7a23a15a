//! Data models for the EduMaster application.
//!
//! These records match the frontend interfaces exactly for seamless interoperability.
//! Identifiers and creation timestamps are assigned by the store, never by callers,
//! so both carry `#[serde(default)]` and may be omitted from create payloads.

mod admin;
mod batch;
mod book;
mod live_class;
mod session;

pub use admin::*;
pub use batch::*;
pub use book::*;
pub use live_class::*;
pub use session::*;
