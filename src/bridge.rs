//! Relay samples from an appsink into an appsrc.
//!
//! This is the application-level hand-off between two otherwise unrelated
//! pipeline branches: everything the sender branch produces is pulled out
//! of the engine, copied into application memory and pushed back into the
//! receiver branch as a new buffer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counters shared between the relay callback and the application.
#[derive(Debug, Default)]
pub struct RelayStats {
    samples: AtomicU64,
    bytes: AtomicU64,
    caps_reported: AtomicBool,
}

impl RelayStats {
    /// Samples pushed into the appsrc so far.
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Payload bytes pushed into the appsrc so far.
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Record one relayed payload of `len` bytes.
    pub fn record(&self, len: usize) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Returns `true` exactly once, for the first caller.
    pub fn first_sample(&self) -> bool {
        !self.caps_reported.swap(true, Ordering::AcqRel)
    }
}

/// Forwards every sample of an appsink into an appsrc.
pub struct SampleRelay {
    appsrc: gst_app::AppSrc,
    stats: Arc<RelayStats>,
}

impl SampleRelay {
    /// Relay into `appsrc`.
    pub fn new(appsrc: &gst_app::AppSrc) -> Self {
        Self {
            appsrc: appsrc.clone(),
            stats: Arc::new(RelayStats::default()),
        }
    }

    /// Shared counters; stays valid after the relay is installed.
    pub fn stats(&self) -> Arc<RelayStats> {
        Arc::clone(&self.stats)
    }

    /// Install the relay as `appsink`'s new-sample callback.
    pub fn install(self, appsink: &gst_app::AppSink) {
        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample(move |sink| self.on_new_sample(sink))
                .build(),
        );
    }

    /// Pull one sample from `appsink` and push a copy into the appsrc.
    ///
    /// A failed pull means the sink is flushing or at EOS, which ends the
    /// relay.
    pub fn on_new_sample(
        &self,
        appsink: &gst_app::AppSink,
    ) -> Result<gst::FlowSuccess, gst::FlowError> {
        let payload = {
            let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
            if self.stats.first_sample() {
                if let Some(caps) = sample.caps() {
                    tracing::info!("stream format: {}", caps);
                }
            }
            let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
            let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;
            map.as_slice().to_vec()
        };
        tracing::debug!("pulled {} bytes", payload.len());
        self.push(payload)
    }

    /// Push `payload` into the appsrc as a new buffer.
    pub fn push(&self, payload: Vec<u8>) -> Result<gst::FlowSuccess, gst::FlowError> {
        let len = payload.len();
        let flow = self.appsrc.push_buffer(gst::Buffer::from_mut_slice(payload))?;
        self.stats.record(len);
        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_once() {
        let stats = RelayStats::default();
        assert!(stats.first_sample());
        assert!(!stats.first_sample());
        assert!(!stats.first_sample());
    }

    #[test]
    fn test_record_counts() {
        let stats = RelayStats::default();
        stats.record(100);
        stats.record(23);
        assert_eq!(stats.samples(), 2);
        assert_eq!(stats.bytes(), 123);
    }
}
