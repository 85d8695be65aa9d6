//! Native HTTP transport for the Casemind API
//!
//! The gateway in `casemind_core` owns request building, bearer tokens and
//! error mapping. This module only moves bytes over the wire with `reqwest`.
//!
//! # Endpoints used
//!
//! - `POST /auth/login`
//! - `GET /claims/high-risk`
//! - `GET /claims/{id}/summary`
//! - `GET|POST /claims/{id}/chat`
//! - `POST /claims/{id}/feedback`
//! - `GET /reports/severity-mismatch`, `/reports/duplicates`, `/reports/tariff-insight`

/// `reqwest`-backed [`casemind_core::HttpTransport`].
pub mod client;

pub use client::ReqwestTransport;
