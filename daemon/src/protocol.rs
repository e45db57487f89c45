//! Wire format (JSON) for the stream and the process list

use serde::{Deserialize, Serialize};

/// One streamed utilisation reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    #[serde(rename = "ram")]
    pub ram_percent: f64,
}

impl MetricSample {
    /// Builds a sample, pulling both readings into `[0, 100]`.
    pub fn new(cpu_percent: f64, ram_percent: f64) -> Self {
        Self {
            cpu_percent: clamp_percent(cpu_percent),
            ram_percent: clamp_percent(ram_percent),
        }
    }
}

/// Snapshot of a single process; not a live handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub name: String,
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    #[serde(rename = "memory")]
    pub memory_percent: f32,
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
