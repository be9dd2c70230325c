//! Shared types for folio: listing wire shapes, configuration, the batch
//! HTTP client and the list controller.

pub mod client;
pub mod config;
pub mod listing;
pub mod platform;
pub mod protocol;
