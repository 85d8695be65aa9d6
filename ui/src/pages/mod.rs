//! Routed pages

pub mod claims;
pub mod login;
pub mod reports;
