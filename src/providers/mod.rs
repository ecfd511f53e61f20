//! Clients for the external providers.

pub mod image;
pub mod quote;
