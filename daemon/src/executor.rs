//! Process termination

use crate::collector::{KillError, MetricsProvider};
use crate::error::ServiceError;
use tracing::{info, warn};

/// Parses a client-supplied pid. Only text that is not a decimal integer,
/// including an empty string, is a malformed request; range is checked
/// later against the process table.
pub fn parse_pid(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>()
        .map_err(|_| ServiceError::InvalidPid(raw.to_owned()))
}

/// Requests termination of the process named by `raw`.
pub fn terminate(provider: &dyn MetricsProvider, raw: &str) -> Result<i64, ServiceError> {
    let pid = parse_pid(raw)?;
    terminate_pid(provider, pid)?;
    Ok(pid)
}

/// Success means the OS accepted the request; the process may still be
/// alive when this returns. A pid outside `1..=i32::MAX` cannot name a
/// live process and is reported as not found.
pub fn terminate_pid(provider: &dyn MetricsProvider, pid: i64) -> Result<(), ServiceError> {
    let target = u32::try_from(pid)
        .ok()
        .filter(|p| (1..=i32::MAX as u32).contains(p))
        .ok_or(ServiceError::NotFound(pid))?;

    match provider.kill(target) {
        Ok(()) => {
            info!(pid, "Termination requested");
            Ok(())
        }
        Err(KillError::NotFound(_)) => Err(ServiceError::NotFound(pid)),
        Err(e @ KillError::Rejected(_)) => {
            warn!(pid, "Kill failed: {}", e);
            Err(ServiceError::KillFailed(pid))
        }
    }
}
