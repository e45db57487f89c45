use super::{CollectError, KillError, MetricsProvider, ProcessEntry};
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Provider backed by `sysinfo`.
///
/// Holds no state between calls: every operation builds its own `System`,
/// so concurrent sessions never contend on a shared handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProvider;

impl SysinfoProvider {
    pub fn new() -> Self {
        Self
    }

    fn memory_share(used: u64, total: u64) -> Option<f64> {
        if total == 0 {
            return None;
        }
        Some(used as f64 / total as f64 * 100.0)
    }
}

#[async_trait::async_trait]
impl MetricsProvider for SysinfoProvider {
    async fn cpu_percent(&self, window: Duration) -> Result<f64, CollectError> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        // sysinfo needs two readings at least this far apart
        tokio::time::sleep(window.max(MINIMUM_CPU_UPDATE_INTERVAL)).await;
        sys.refresh_cpu_usage();
        if sys.cpus().is_empty() {
            return Err(CollectError::Unavailable("no CPUs reported".into()));
        }
        Ok(f64::from(sys.global_cpu_usage()))
    }

    fn memory_percent(&self) -> Result<f64, CollectError> {
        let mut sys = System::new();
        sys.refresh_memory();
        Self::memory_share(sys.used_memory(), sys.total_memory())
            .ok_or_else(|| CollectError::Unavailable("total memory reported as zero".into()))
    }

    fn processes(&self) -> Result<Vec<ProcessEntry>, CollectError> {
        let mut sys = System::new();
        sys.refresh_memory();
        let refreshed = sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        if refreshed == 0 {
            return Err(CollectError::Enumeration("process table is empty".into()));
        }
        let total_memory = sys.total_memory();

        let entries = sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                let name = process
                    .name()
                    .to_str()
                    .filter(|n| !n.is_empty())
                    .map(str::to_owned);
                // Single reading: near zero until a second refresh happens
                let cpu = f64::from(process.cpu_usage());
                let memory = Self::memory_share(process.memory(), total_memory);
                ProcessEntry {
                    pid: pid.as_u32(),
                    name,
                    cpu_percent: cpu.is_finite().then_some(cpu),
                    memory_percent: memory.map(|v| v as f32),
                }
            })
            .collect();
        Ok(entries)
    }

    fn kill(&self, pid: u32) -> Result<(), KillError> {
        let target = Pid::from_u32(pid);
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing(),
        );
        let process = sys.process(target).ok_or(KillError::NotFound(pid))?;
        if process.kill() {
            Ok(())
        } else {
            Err(KillError::Rejected(pid))
        }
    }
}
