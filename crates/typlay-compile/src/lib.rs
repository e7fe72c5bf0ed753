#![warn(missing_docs)]
//! `typlay-compile` - compiler-channel integration for `typlay`.
//!
//! The overlay engine is synchronous and single-threaded; compilation is not. This crate
//! owns the seam between the two: compile requests are tagged with the region identity
//! they were issued for, travel to a worker thread over a channel, and come back as
//! [`CompileOutcome`] values carrying that same identity. The consumer side
//! ([`OverlayEngine::apply_compile_outcome`](typlay_core::OverlayEngine::apply_compile_outcome))
//! revalidates the identity against the *current* active region, so a batch that raced a
//! document edit is simply dropped.
//!
//! There is no cancellation primitive. Pending requests coalesce on the worker (only the
//! newest is compiled) and newer outcomes overwrite older ones at the display slot.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use log::debug;
use std::thread;
use thiserror::Error;
use typlay_core::{ActiveRegion, CompileOutcome, ProcessorConfig, RawDiagnostic, RegionKind};

/// Errors surfaced by the compile channel.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler backend rejected or failed the unit.
    #[error("compiler backend failed: {0}")]
    Backend(String),
    /// The worker thread is gone (its channel disconnected).
    #[error("compile worker is disconnected")]
    Disconnected,
}

/// A compiler backend: turns a compiled unit into diagnostics.
///
/// Implementations run on the worker thread and may block.
pub trait Compiler: Send {
    /// Compile `unit` and report its diagnostics in compiled-unit character offsets.
    fn compile(&mut self, unit: &str, kind: RegionKind) -> Result<Vec<RawDiagnostic>, CompileError>;
}

impl<F> Compiler for F
where
    F: FnMut(&str, RegionKind) -> Result<Vec<RawDiagnostic>, CompileError> + Send,
{
    fn compile(&mut self, unit: &str, kind: RegionKind) -> Result<Vec<RawDiagnostic>, CompileError> {
        self(unit, kind)
    }
}

/// A compile request: region text plus the identity and processor it belongs to.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// The region identity the result must be validated against.
    pub region: ActiveRegion,
    /// The raw region text (before template substitution).
    pub source: String,
    /// The processor whose template/preamble wraps the source.
    pub processor: ProcessorConfig,
}

impl CompileRequest {
    /// Create a request for the given region.
    pub fn new(region: ActiveRegion, source: impl Into<String>, processor: ProcessorConfig) -> Self {
        Self {
            region,
            source: source.into(),
            processor,
        }
    }
}

/// A worker thread compiling region text off the update loop.
///
/// Dropping the worker closes the request channel and joins the thread.
pub struct CompileWorker {
    requests: Option<Sender<CompileRequest>>,
    outcomes: Receiver<CompileOutcome>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CompileWorker {
    /// Spawn a worker around a compiler backend.
    pub fn spawn<C>(mut compiler: C) -> Self
    where
        C: Compiler + 'static,
    {
        let (request_tx, request_rx) = unbounded::<CompileRequest>();
        let (outcome_tx, outcome_rx) = unbounded::<CompileOutcome>();

        let handle = thread::spawn(move || {
            while let Ok(mut request) = request_rx.recv() {
                // Coalesce: anything already queued behind this request is newer and
                // makes it moot.
                while let Ok(newer) = request_rx.try_recv() {
                    request = newer;
                }

                let unit = request.processor.compile_unit(&request.source);
                match compiler.compile(&unit, request.region.kind) {
                    Ok(diagnostics) => {
                        let outcome = CompileOutcome {
                            region: request.region,
                            processor: request.processor,
                            diagnostics,
                        };
                        if outcome_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        // A failed compile produces no outcome this cycle; the previous
                        // display state stands.
                        debug!("compile failed for {:?}: {err}", request.region);
                    }
                }
            }
        });

        Self {
            requests: Some(request_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
        }
    }

    /// Submit a request. Pending requests may be coalesced away by newer ones.
    pub fn submit(&self, request: CompileRequest) -> Result<(), CompileError> {
        self.requests
            .as_ref()
            .ok_or(CompileError::Disconnected)?
            .send(request)
            .map_err(|_| CompileError::Disconnected)
    }

    /// Drain the outcome channel and return only the newest outcome, if any.
    ///
    /// Outcomes are last-write-wins; intermediate batches that were superseded while the
    /// update loop was busy are dropped unseen.
    pub fn try_latest(&self) -> Option<CompileOutcome> {
        let mut latest = None;
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => latest = Some(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    /// The raw outcome channel, for hosts that integrate it into their own event loop.
    pub fn outcomes(&self) -> &Receiver<CompileOutcome> {
        &self.outcomes
    }
}

impl Drop for CompileWorker {
    fn drop(&mut self) {
        // Close the request channel first so the worker loop can exit.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use typlay_core::Severity;

    fn echo_compiler(
        unit: &str,
        _kind: RegionKind,
    ) -> Result<Vec<RawDiagnostic>, CompileError> {
        Ok(vec![RawDiagnostic::new(
            0,
            unit.chars().count(),
            Severity::Warning,
            unit.to_string(),
        )])
    }

    #[test]
    fn test_worker_round_trip_carries_identity() {
        let worker = CompileWorker::spawn(echo_compiler);
        let region = ActiveRegion::new(RegionKind::Math, 4, 9);
        let processor = ProcessorConfig::without_preamble("math", "${CODE}$");

        worker
            .submit(CompileRequest::new(region, "a+b", processor))
            .unwrap();

        let outcome = worker
            .outcomes()
            .recv_timeout(Duration::from_secs(5))
            .expect("worker produces an outcome");
        assert_eq!(outcome.region, region);
        assert_eq!(outcome.diagnostics.len(), 1);
        // The worker compiled the substituted unit, not the bare source.
        assert_eq!(outcome.diagnostics[0].message, "$a+b$");
    }

    #[test]
    fn test_failed_compile_produces_no_outcome() {
        let worker = CompileWorker::spawn(
            |_unit: &str, _kind: RegionKind| -> Result<Vec<RawDiagnostic>, CompileError> {
                Err(CompileError::Backend("boom".into()))
            },
        );
        let region = ActiveRegion::new(RegionKind::Math, 0, 3);
        let processor = ProcessorConfig::without_preamble("math", "${CODE}$");
        worker
            .submit(CompileRequest::new(region, "x", processor))
            .unwrap();

        assert!(
            worker
                .outcomes()
                .recv_timeout(Duration::from_millis(200))
                .is_err()
        );
    }

    #[test]
    fn test_try_latest_is_last_write_wins() {
        let worker = CompileWorker::spawn(echo_compiler);
        let processor = ProcessorConfig::without_preamble("math", "${CODE}$");
        let region = ActiveRegion::new(RegionKind::Math, 0, 5);

        worker
            .submit(CompileRequest::new(region, "first", processor.clone()))
            .unwrap();
        let first = worker
            .outcomes()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(first.diagnostics[0].message, "$first$");

        worker
            .submit(CompileRequest::new(region, "second", processor.clone()))
            .unwrap();
        worker
            .submit(CompileRequest::new(region, "third", processor))
            .unwrap();

        // Wait until at least one of the newer outcomes is available, then drain.
        let next = worker
            .outcomes()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        let latest = worker.try_latest().unwrap_or(next);
        assert_ne!(latest.diagnostics[0].message, "$first$");
    }
}
