//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod classify;
pub mod corpus;
pub mod history;
pub mod metrics;
pub mod status;

// Re-export all handlers for use in router
pub use classify::*;
pub use corpus::*;
pub use history::*;
pub use metrics::*;
pub use status::*;
