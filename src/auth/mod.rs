//! Durable session storage for the terminal client
//!
//! The session record written by `casemind login` lives in a JSON file under
//! the configured session directory, keyed the same way the dashboard keys
//! its local storage entry (`casemind-auth`).

/// File-backed [`casemind_core::SessionStorage`].
pub mod storage;

pub use storage::FileStorage;
