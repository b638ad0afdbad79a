//! Engine fault types.
//!
//! Expected outcomes (denied access, exhausted quota) are never errors; they
//! travel as [`Resolution`](crate::Resolution) and
//! [`Decision`](crate::Decision) values. `EngineError` covers faults only:
//! the backend misbehaving, or configuration that cannot be loaded.

use thiserror::Error;

use tollgate_storage::StoreError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
