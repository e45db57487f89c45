//! Bounded process snapshot for the `/processes` listing

use crate::collector::{MetricsProvider, ProcessEntry};
use crate::error::ServiceError;
use crate::protocol::ProcessRecord;
use tracing::{debug, error};

pub const DEFAULT_LIMIT: usize = 50;

/// Takes a snapshot of at most `limit` processes.
///
/// Order is whatever the provider enumerates and is not stable across
/// calls. Processes whose name cannot be resolved are left out and do not
/// count toward `limit`; missing CPU or memory readings become `0.0`. A
/// longer table is cut at `limit` without any truncation marker.
pub fn list_processes(
    provider: &dyn MetricsProvider,
    limit: usize,
) -> Result<Vec<ProcessRecord>, ServiceError> {
    let entries = provider.processes().map_err(|e| {
        error!("Process enumeration failed: {}", e);
        ServiceError::Enumeration(e.to_string())
    })?;
    let total = entries.len();

    let records: Vec<ProcessRecord> = entries
        .into_iter()
        .filter_map(to_record)
        .take(limit)
        .collect();

    debug!(total, listed = records.len(), "process snapshot taken");
    Ok(records)
}

fn to_record(entry: ProcessEntry) -> Option<ProcessRecord> {
    let pid = i32::try_from(entry.pid).ok().filter(|pid| *pid > 0)?;
    let name = entry.name?;
    Some(ProcessRecord {
        pid,
        name,
        cpu_percent: entry.cpu_percent.unwrap_or(0.0),
        memory_percent: entry.memory_percent.unwrap_or(0.0),
    })
}
