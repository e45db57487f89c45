//! Live CPU/RAM stream: one sample-push-pause loop per connected client

use crate::collector::MetricsProvider;
use crate::protocol::MetricSample;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub const SAMPLE_WINDOW: Duration = Duration::from_secs(1);
pub const PUSH_INTERVAL: Duration = Duration::from_secs(2);

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Outbound half of a streaming connection.
#[async_trait::async_trait]
pub trait FrameSink: Send {
    type Error: Display + Send;

    async fn send_frame(&mut self, frame: String) -> Result<(), Self::Error>;
}

/// Takes readings from the provider, degrading failures to zero.
#[derive(Clone)]
pub struct Sampler {
    provider: Arc<dyn MetricsProvider>,
    window: Duration,
}

impl Sampler {
    pub fn new(provider: Arc<dyn MetricsProvider>, window: Duration) -> Self {
        Self { provider, window }
    }

    /// Never fails: a reading the provider cannot produce this tick is
    /// reported as `0.0` so the stream keeps going.
    pub async fn sample(&self) -> MetricSample {
        let cpu = self
            .provider
            .cpu_percent(self.window)
            .await
            .unwrap_or_else(|e| {
                warn!("CPU sample failed, sending 0: {}", e);
                0.0
            });
        let ram = self.provider.memory_percent().unwrap_or_else(|e| {
            warn!("Memory sample failed, sending 0: {}", e);
            0.0
        });
        MetricSample::new(cpu, ram)
    }
}

/// Streams samples to `sink` until a push fails.
///
/// Pushes are strictly sequential: sample (blocking for the sampling
/// window), push, then pause for `interval`. There is no other exit; the
/// sink is dropped, and the connection released, when the loop ends.
pub async fn run_session<S: FrameSink>(mut sink: S, sampler: Sampler, interval: Duration) {
    let session = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
    info!(session, "Stream session opened");
    let mut pushed = 0u64;

    loop {
        let sample = sampler.sample().await;
        let frame = match serde_json::to_string(&sample) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(session, "Failed to encode sample: {}", e);
                break;
            }
        };
        if let Err(e) = sink.send_frame(frame).await {
            debug!(session, "Push failed: {}", e);
            break;
        }
        pushed += 1;
        tokio::time::sleep(interval).await;
    }

    info!(session, pushed, "Stream session closed");
}

/// Shared periodic sampler that fans each frame out to every subscriber.
///
/// Sessions attached to a publisher see the same frames as a per-client
/// loop would, but the host is sampled once per tick regardless of how
/// many clients are connected.
#[derive(Clone)]
pub struct Publisher {
    tx: broadcast::Sender<String>,
}

impl Publisher {
    pub fn spawn(sampler: Sampler, interval: Duration, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        let publisher = Self { tx: tx.clone() };
        tokio::spawn(publish_loop(tx, sampler, interval));
        publisher
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

async fn publish_loop(tx: broadcast::Sender<String>, sampler: Sampler, interval: Duration) {
    info!("Shared stats publisher started");
    loop {
        // Idle while nobody listens
        if tx.receiver_count() > 0 {
            let sample = sampler.sample().await;
            if let Ok(frame) = serde_json::to_string(&sample) {
                let _ = tx.send(frame);
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// Forwards publisher frames to `sink` until a push fails or the publisher
/// goes away. A subscriber that falls behind skips the frames it missed.
pub async fn forward_session<S: FrameSink>(mut sink: S, mut rx: broadcast::Receiver<String>) {
    let session = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
    info!(session, "Stream session opened (shared)");
    let mut pushed = 0u64;

    loop {
        let frame = match rx.recv().await {
            Ok(frame) => frame,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(session, skipped, "Subscriber lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        if let Err(e) = sink.send_frame(frame).await {
            debug!(session, "Push failed: {}", e);
            break;
        }
        pushed += 1;
    }

    info!(session, pushed, "Stream session closed");
}
