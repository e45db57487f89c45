//! Scriptable provider shared by the integration tests

#![allow(dead_code)]

use gaze_daemon::collector::{CollectError, KillError, MetricsProvider, ProcessEntry};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeProvider {
    /// `None` makes the CPU reading fail.
    pub cpu: Option<f64>,
    /// `None` makes the memory reading fail.
    pub ram: Option<f64>,
    /// `None` makes enumeration fail.
    pub processes: Option<Vec<ProcessEntry>>,
    /// Pids that accept exactly one kill.
    pub live: Mutex<HashSet<u32>>,
    /// Pids whose kill the OS rejects.
    pub protected: HashSet<u32>,
    pub cpu_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn healthy(cpu: f64, ram: f64) -> Self {
        Self {
            cpu: Some(cpu),
            ram: Some(ram),
            processes: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn with_processes(entries: Vec<ProcessEntry>) -> Self {
        let live = entries.iter().map(|e| e.pid).collect();
        Self {
            cpu: Some(0.0),
            ram: Some(0.0),
            processes: Some(entries),
            live: Mutex::new(live),
            ..Default::default()
        }
    }

    pub fn cpu_calls(&self) -> usize {
        self.cpu_calls.load(Ordering::SeqCst)
    }
}

pub fn entry(pid: u32, name: &str) -> ProcessEntry {
    ProcessEntry {
        pid,
        name: Some(name.to_string()),
        cpu_percent: Some(1.5),
        memory_percent: Some(0.5),
    }
}

pub fn unnamed(pid: u32) -> ProcessEntry {
    ProcessEntry {
        pid,
        name: None,
        cpu_percent: Some(3.0),
        memory_percent: Some(1.0),
    }
}

#[async_trait::async_trait]
impl MetricsProvider for FakeProvider {
    async fn cpu_percent(&self, window: Duration) -> Result<f64, CollectError> {
        self.cpu_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(window).await;
        self.cpu
            .ok_or_else(|| CollectError::Unavailable("scripted cpu failure".into()))
    }

    fn memory_percent(&self) -> Result<f64, CollectError> {
        self.ram
            .ok_or_else(|| CollectError::Unavailable("scripted memory failure".into()))
    }

    fn processes(&self) -> Result<Vec<ProcessEntry>, CollectError> {
        self.processes
            .clone()
            .ok_or_else(|| CollectError::Enumeration("scripted enumeration failure".into()))
    }

    fn kill(&self, pid: u32) -> Result<(), KillError> {
        if self.protected.contains(&pid) {
            return Err(KillError::Rejected(pid));
        }
        if self.live.lock().unwrap().remove(&pid) {
            Ok(())
        } else {
            Err(KillError::NotFound(pid))
        }
    }
}
