//! Single-slot background worker for analyze requests.
//!
//! At most one analysis is outstanding at a time; a second submit while the
//! slot is taken is rejected with [`DispatchError::Busy`]. Every accepted
//! submit gets a fresh generation number so the consumer can drop stale
//! completions.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error::{DispatchError, PipelineError};
use crate::execution::{ExecutionReport, Pipeline};

/// Something that can turn raw text into a report.
pub trait Analyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        raw_text: &str,
    ) -> impl Future<Output = Result<ExecutionReport, PipelineError>> + Send;
}

impl Analyzer for Pipeline {
    fn analyze(
        &self,
        raw_text: &str,
    ) -> impl Future<Output = Result<ExecutionReport, PipelineError>> + Send {
        Pipeline::analyze(self, raw_text)
    }
}

/// A finished analysis, tagged with the generation it was submitted under.
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub result: Result<ExecutionReport, PipelineError>,
}

pub struct Dispatcher<A> {
    analyzer: Arc<A>,
    slot: Arc<Semaphore>,
    generation: AtomicU64,
    busy_delay: Duration,
}

impl Dispatcher<Pipeline> {
    pub fn from_config(cfg: &Config) -> Self {
        let delay = cfg.get_u64("BUGFINDER_BUSY_DELAY_MS").unwrap_or(200);
        Self::new(Pipeline::from_config(cfg), Duration::from_millis(delay))
    }
}

impl<A: Analyzer> Dispatcher<A> {
    /// `busy_delay` is slept before each analysis so the busy indicator is visible.
    pub fn new(analyzer: A, busy_delay: Duration) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            slot: Arc::new(Semaphore::new(1)),
            generation: AtomicU64::new(0),
            busy_delay,
        }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Generation of the most recent accepted submit (0 before any).
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start analyzing `raw_text` on a background task; `on_done` receives the
    /// completion after the slot has been released. Must be called inside a
    /// Tokio runtime.
    pub fn submit<F>(&self, raw_text: String, on_done: F) -> Result<u64, DispatchError>
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        let permit = Arc::clone(&self.slot)
            .try_acquire_owned()
            .map_err(|_| DispatchError::Busy)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let analyzer = Arc::clone(&self.analyzer);
        let delay = self.busy_delay;

        tracing::debug!(generation, chars = raw_text.chars().count(), "analysis submitted");
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // Run on its own task so a panic still produces a completion.
            let run = tokio::spawn(async move { analyzer.analyze(&raw_text).await });
            let result = match run.await {
                Ok(result) => result,
                Err(e) => Err(PipelineError::TaskAborted(e.to_string())),
            };
            if let Err(e) = &result {
                tracing::error!(generation, error = %e, "analysis failed");
            }
            drop(permit);
            on_done(Completion { generation, result });
        });

        Ok(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{mpsc, Notify};

    struct Gated {
        gate: Arc<Notify>,
    }

    impl Analyzer for Gated {
        fn analyze(
            &self,
            raw_text: &str,
        ) -> impl Future<Output = Result<ExecutionReport, PipelineError>> + Send {
            let gate = Arc::clone(&self.gate);
            let output = raw_text.to_string();
            async move {
                gate.notified().await;
                Ok(ExecutionReport::Success { captured_output: output })
            }
        }
    }

    struct Panicking;

    impl Analyzer for Panicking {
        fn analyze(
            &self,
            _raw_text: &str,
        ) -> impl Future<Output = Result<ExecutionReport, PipelineError>> + Send {
            async {
                if true {
                    panic!("analyzer blew up");
                }
                Ok(ExecutionReport::InvalidInput)
            }
        }
    }

    #[tokio::test]
    async fn second_submit_is_rejected_while_busy() {
        let gate = Arc::new(Notify::new());
        let dispatcher = Dispatcher::new(Gated { gate: Arc::clone(&gate) }, Duration::ZERO);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let tx1 = tx.clone();
        let first = dispatcher.submit("one".into(), move |c| {
            let _ = tx1.send(c);
        });
        assert_eq!(first, Ok(1));
        assert!(dispatcher.is_busy());
        assert_eq!(dispatcher.submit("two".into(), |_| {}), Err(DispatchError::Busy));

        gate.notify_one();
        let done = rx.recv().await.unwrap();
        assert_eq!(done.generation, 1);
        assert_eq!(
            done.result.unwrap(),
            ExecutionReport::Success { captured_output: "one".into() }
        );
        assert!(!dispatcher.is_busy());

        let tx2 = tx.clone();
        assert_eq!(
            dispatcher.submit("three".into(), move |c| {
                let _ = tx2.send(c);
            }),
            Ok(2)
        );
        gate.notify_one();
        assert_eq!(rx.recv().await.unwrap().generation, 2);
        assert_eq!(dispatcher.latest_generation(), 2);
    }

    #[tokio::test]
    async fn slot_is_free_when_completion_arrives() {
        let gate = Arc::new(Notify::new());
        let dispatcher = Arc::new(Dispatcher::new(Gated { gate: Arc::clone(&gate) }, Duration::ZERO));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let observer = Arc::clone(&dispatcher);
        dispatcher
            .submit("x".into(), move |_| {
                let _ = tx.send(observer.is_busy());
            })
            .unwrap();
        gate.notify_one();
        assert_eq!(rx.recv().await, Some(false));
    }

    #[tokio::test]
    async fn busy_delay_runs_before_analysis() {
        let gate = Arc::new(Notify::new());
        let dispatcher = Dispatcher::new(Gated { gate: Arc::clone(&gate) }, Duration::from_millis(50));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = std::time::Instant::now();
        dispatcher
            .submit("x".into(), move |c| {
                let _ = tx.send(c.generation);
            })
            .unwrap();

        // Notify stores one permit, so the analysis proceeds once the delay ends.
        gate.notify_one();
        assert_eq!(rx.recv().await, Some(1));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn panicking_analyzer_still_completes() {
        let dispatcher = Arc::new(Dispatcher::new(Panicking, Duration::ZERO));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let observer = Arc::clone(&dispatcher);
        dispatcher
            .submit("x".into(), move |c| {
                let _ = tx.send((c.generation, c.result, observer.is_busy()));
            })
            .unwrap();

        let (generation, result, busy) = rx.recv().await.unwrap();
        assert_eq!(generation, 1);
        assert!(matches!(result, Err(PipelineError::TaskAborted(_))));
        assert!(!busy);
        assert_eq!(dispatcher.submit("y".into(), |_| {}), Ok(2));
    }
}
