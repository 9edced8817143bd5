//! Progress captions cycled while the scoring service computes a result.
//!
//! Perceived-latency feedback only; has no effect on session state. The
//! ticker is owned by the controller for the duration of one compute call
//! and aborted when the call resolves, success or failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// The fixed caption sequence, shown in order.
pub const COMPUTE_CAPTIONS: [&str; 5] = [
    "재산 정보 확인 중...",
    "청산가치 계산 중...",
    "가용소득 산정 중...",
    "변제율 시뮬레이션 중...",
    "최종 결과 생성 중...",
];

/// Receives each caption as it becomes current.
pub type CaptionSink = Arc<dyn Fn(&'static str) + Send + Sync>;

/// A running caption cycle. Dropped captions are fine; a dangling ticker
/// outliving its compute call is not, so the owner must call [`stop`].
///
/// [`stop`]: CaptionTicker::stop
pub struct CaptionTicker {
    handle: JoinHandle<()>,
}

impl CaptionTicker {
    /// Start cycling captions into `sink`, one every `period`. The first
    /// caption is delivered immediately; the last one stays current until
    /// the ticker is stopped.
    pub fn spawn(period: Duration, sink: CaptionSink) -> Self {
        let handle = tokio::spawn(async move {
            // tokio intervals reject a zero period (used by test configs).
            let period = period.max(Duration::from_millis(1));
            sink(COMPUTE_CAPTIONS[0]);
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            for caption in &COMPUTE_CAPTIONS[1..] {
                interval.tick().await;
                sink(caption);
            }
        });
        Self { handle }
    }

    /// Cancel the cycle. Safe to call whether or not all captions have
    /// been delivered.
    pub fn stop(self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn delivers_captions_in_order() {
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let ticker = CaptionTicker::spawn(
            Duration::from_millis(1),
            Arc::new(move |caption| sink_seen.lock().unwrap().push(caption)),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        ticker.stop();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, COMPUTE_CAPTIONS);
    }

    #[tokio::test]
    async fn stop_halts_delivery() {
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let ticker = CaptionTicker::spawn(
            Duration::from_secs(60),
            Arc::new(move |caption| sink_seen.lock().unwrap().push(caption)),
        );

        // Give the task a moment to deliver the immediate first caption.
        tokio::time::sleep(Duration::from_millis(20)).await;
        ticker.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &COMPUTE_CAPTIONS[..1]);
    }
}
