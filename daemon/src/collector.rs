//! Host metrics collector (CPU, memory, process table, termination)

mod host;

pub use self::host::SysinfoProvider;

use std::time::Duration;
use thiserror::Error;

/// One process as seen at enumeration time.
///
/// Fields the provider could not resolve are `None`; the caller decides
/// whether that excludes the process or degrades to a default.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: Option<String>,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f32>,
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("metric unavailable: {0}")]
    Unavailable(String),

    #[error("process enumeration failed: {0}")]
    Enumeration(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KillError {
    #[error("no process with pid {0}")]
    NotFound(u32),

    #[error("termination of pid {0} was rejected")]
    Rejected(u32),
}

/// Source of host metrics and process control.
///
/// Implementations must be safe to call concurrently from any number of
/// sessions and requests without external locking.
#[async_trait::async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Host-wide CPU utilisation averaged over `window`.
    async fn cpu_percent(&self, window: Duration) -> Result<f64, CollectError>;

    /// Used virtual memory as a percentage of total.
    fn memory_percent(&self) -> Result<f64, CollectError>;

    /// Every visible process, in provider-defined order.
    fn processes(&self) -> Result<Vec<ProcessEntry>, CollectError>;

    /// Asks the OS to terminate `pid`. Returns once the request is accepted.
    fn kill(&self, pid: u32) -> Result<(), KillError>;
}
