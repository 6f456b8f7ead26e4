//! Slice queue: one worker task drains a FIFO channel, so at most one job is
//! ever inside the slicing engine.
//!
//! Pending jobs live only in memory. Shutting the queue down (or restarting
//! the process) resolves every pending caller with [`QueueError::Closed`];
//! callers re-submit.

use futures::FutureExt;
use printquote_core::models::{JobState, SliceJob};
use printquote_core::AppError;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::context::{CompletedJob, SliceRunError, SliceRunner};
use crate::stats::{QueueStats, QueueStatsSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("slice queue is shut down")]
    Closed,

    #[error("slice job was cancelled before it started")]
    Cancelled,

    #[error("slice worker stopped before the job finished")]
    WorkerDropped,

    #[error(transparent)]
    Run(#[from] SliceRunError),
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Closed | QueueError::WorkerDropped => {
                AppError::ServiceUnavailable("Slicing service is not accepting jobs".to_string())
            }
            QueueError::Cancelled => {
                AppError::ServiceUnavailable("Slice request was cancelled".to_string())
            }
            QueueError::Run(e) => e.into(),
        }
    }
}

type JobResult = Result<CompletedJob, QueueError>;

struct Envelope {
    job: SliceJob,
    cancel: CancellationToken,
    reply: oneshot::Sender<JobResult>,
    enqueued_at: Instant,
}

/// Completion handle for one enqueued job.
pub struct JobHandle {
    job_id: Uuid,
    rx: oneshot::Receiver<JobResult>,
}

impl JobHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Wait until the job reaches a terminal state.
    pub async fn wait(self) -> JobResult {
        self.rx.await.unwrap_or(Err(QueueError::WorkerDropped))
    }
}

/// Process-wide single-flight FIFO queue in front of the slicing engine.
#[derive(Clone)]
pub struct SliceQueue {
    tx: mpsc::UnboundedSender<Envelope>,
    stats: Arc<QueueStats>,
    shutdown: CancellationToken,
}

impl SliceQueue {
    /// Spawn the worker task. Must be called inside a tokio runtime.
    pub fn start(runner: Arc<dyn SliceRunner>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(QueueStats::default());
        let shutdown = CancellationToken::new();

        tokio::spawn(worker_loop(runner, rx, stats.clone(), shutdown.clone()));

        tracing::info!("Slice queue worker started");

        Self {
            tx,
            stats,
            shutdown,
        }
    }

    /// Append a job to the queue. Jobs start in the order `enqueue` is called.
    pub fn enqueue(&self, job: SliceJob, cancel: CancellationToken) -> Result<JobHandle, QueueError> {
        if self.shutdown.is_cancelled() {
            return Err(QueueError::Closed);
        }
        let (reply, rx) = oneshot::channel();
        let job_id = job.id;

        self.stats.pending.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope {
            job,
            cancel,
            reply,
            enqueued_at: Instant::now(),
        };
        if self.tx.send(envelope).is_err() {
            self.stats.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(QueueError::Closed);
        }

        tracing::debug!(
            job_id = %job_id,
            pending = self.stats.pending.load(Ordering::SeqCst),
            "Slice job queued"
        );
        Ok(JobHandle { job_id, rx })
    }

    /// Enqueue a job and wait for its outcome.
    pub async fn submit(&self, job: SliceJob) -> JobResult {
        self.submit_with_cancel(job, CancellationToken::new()).await
    }

    /// Like [`submit`](Self::submit), but a job whose token is cancelled
    /// before the worker reaches it is skipped. A running job is never
    /// interrupted.
    pub async fn submit_with_cancel(&self, job: SliceJob, cancel: CancellationToken) -> JobResult {
        self.enqueue(job, cancel)?.wait().await
    }

    pub fn stats(&self) -> QueueStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop accepting jobs. The running job finishes; pending jobs are
    /// resolved with [`QueueError::Closed`].
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

async fn worker_loop(
    runner: Arc<dyn SliceRunner>,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    stats: Arc<QueueStats>,
    shutdown: CancellationToken,
) {
    loop {
        let envelope = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some(envelope) => envelope,
                None => break,
            },
        };
        stats.pending.fetch_sub(1, Ordering::SeqCst);

        let Envelope {
            mut job,
            cancel,
            reply,
            enqueued_at,
        } = envelope;

        if cancel.is_cancelled() {
            stats.cancelled.fetch_add(1, Ordering::SeqCst);
            tracing::info!(job_id = %job.id, "Slice job cancelled before start, skipping");
            let _ = reply.send(Err(QueueError::Cancelled));
            continue;
        }

        let queue_wait = enqueued_at.elapsed();
        job.state = JobState::Running;
        stats.running.store(true, Ordering::SeqCst);
        tracing::info!(
            job_id = %job.id,
            file_id = %job.upload.file_id,
            queue_wait_ms = queue_wait.as_millis() as u64,
            "Slice job started"
        );

        let job_id = job.id;
        let started = Instant::now();
        let result = AssertUnwindSafe(runner.run(&job)).catch_unwind().await;
        let duration = started.elapsed();
        stats.running.store(false, Ordering::SeqCst);

        let outcome = match result {
            Ok(Ok(outcome)) => {
                job.state = JobState::Succeeded;
                stats.completed.fetch_add(1, Ordering::SeqCst);
                Ok(CompletedJob {
                    job,
                    outcome,
                    queue_wait,
                })
            }
            Ok(Err(e)) => {
                job.state = JobState::Failed;
                stats.failed.fetch_add(1, Ordering::SeqCst);
                Err(QueueError::Run(SliceRunError::Failed(e)))
            }
            Err(panic) => {
                job.state = JobState::Failed;
                stats.failed.fetch_add(1, Ordering::SeqCst);
                let message = panic_message(panic.as_ref());
                tracing::error!(job_id = %job_id, panic = %message, "Slice job panicked");
                Err(QueueError::Run(SliceRunError::Panicked(message)))
            }
        };

        log_finished(&job_id, duration, queue_wait, &outcome);

        if reply.send(outcome).is_err() {
            tracing::debug!("Slice caller went away before the result was delivered");
        }
    }

    rx.close();
    let mut dropped = 0usize;
    while let Ok(envelope) = rx.try_recv() {
        stats.pending.fetch_sub(1, Ordering::SeqCst);
        let _ = envelope.reply.send(Err(QueueError::Closed));
        dropped += 1;
    }
    tracing::info!(dropped_jobs = dropped, "Slice queue worker stopped");
}

fn log_finished(job_id: &Uuid, duration: Duration, queue_wait: Duration, outcome: &JobResult) {
    let duration_ms = duration.as_millis() as u64;
    let queue_wait_ms = queue_wait.as_millis() as u64;
    match outcome {
        Ok(_) => tracing::info!(
            job_id = %job_id,
            duration_ms,
            queue_wait_ms,
            outcome = "succeeded",
            "Slice job finished"
        ),
        Err(e) => tracing::warn!(
            job_id = %job_id,
            duration_ms,
            queue_wait_ms,
            outcome = "failed",
            error = %e,
            "Slice job finished"
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SliceOutcome;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use printquote_core::models::{
        GCodeMetrics, InfillType, Material, ModelExtension, ParsedGCode, Quality, SlicerConfig,
        UploadRecord,
    };
    use printquote_core::SliceFailureKind;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn job(file_id: &str) -> SliceJob {
        let now = Utc::now();
        let upload = UploadRecord {
            file_id: file_id.to_string(),
            storage_key: format!("{}.stl", file_id),
            file_path: PathBuf::from(format!("/tmp/{}.stl", file_id)),
            file_name: format!("{}.stl", file_id),
            file_size_bytes: 1,
            file_extension: ModelExtension::Stl,
            created_at: now,
            expires_at: now + ChronoDuration::hours(1),
        };
        let config =
            SlicerConfig::new(Quality::Standard, Material::Pla, 20, InfillType::Grid).unwrap();
        SliceJob::new(upload, config, PathBuf::from(format!("/tmp/slice_{}.gcode", file_id)))
    }

    fn outcome(file_id: &str) -> SliceOutcome {
        SliceOutcome {
            parsed: ParsedGCode {
                metrics: GCodeMetrics::zeroed("PLA"),
                warnings: Vec::new(),
            },
            gcode_file_ref: format!("slice_{}.gcode", file_id),
            engine_duration: Duration::from_millis(1),
        }
    }

    /// Records start order and the peak number of concurrent runs.
    #[derive(Default)]
    struct RecordingRunner {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        started: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl RecordingRunner {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SliceRunner for RecordingRunner {
        async fn run(&self, job: &SliceJob) -> Result<SliceOutcome, AppError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.started.lock().unwrap().push(job.upload.file_id.clone());

            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match job.upload.file_id.as_str() {
                id if id.starts_with("fail") => Err(AppError::slice_failed(
                    SliceFailureKind::Timeout,
                    "engine timed out",
                )),
                id if id.starts_with("panic") => panic!("engine wrapper bug"),
                id => Ok(outcome(id)),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_runs_two_jobs_at_once() {
        let runner = Arc::new(RecordingRunner::with_delay(Duration::from_millis(20)));
        let queue = SliceQueue::start(runner.clone());

        let mut handles = Vec::new();
        for i in 0..10 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                queue.submit(job(&format!("model{}", i))).await
            }));
        }
        for handle in handles {
            let completed = handle.await.unwrap().unwrap();
            assert_eq!(completed.job.state, JobState::Succeeded);
        }

        assert_eq!(runner.peak.load(Ordering::SeqCst), 1);
        assert_eq!(runner.started.lock().unwrap().len(), 10);
        let stats = queue.stats();
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.pending, 0);
        assert!(!stats.running);
    }

    #[tokio::test]
    async fn jobs_start_in_arrival_order() {
        let runner = Arc::new(RecordingRunner::with_delay(Duration::from_millis(5)));
        let queue = SliceQueue::start(runner.clone());

        let a = queue.enqueue(job("A"), CancellationToken::new()).unwrap();
        let b = queue.enqueue(job("B"), CancellationToken::new()).unwrap();
        let c = queue.enqueue(job("C"), CancellationToken::new()).unwrap();

        // awaiting in reverse must not change start order
        let (rc, rb, ra) = tokio::join!(c.wait(), b.wait(), a.wait());
        assert!(ra.is_ok() && rb.is_ok() && rc.is_ok());
        assert_eq!(*runner.started.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn failure_does_not_block_the_queue() {
        let runner = Arc::new(RecordingRunner::with_delay(Duration::from_millis(1)));
        let queue = SliceQueue::start(runner.clone());

        let first = queue.enqueue(job("fail-1"), CancellationToken::new()).unwrap();
        let second = queue.enqueue(job("ok-2"), CancellationToken::new()).unwrap();

        let err = first.wait().await.unwrap_err();
        match AppError::from(err) {
            AppError::SliceFailed { kind, .. } => assert_eq!(kind, SliceFailureKind::Timeout),
            other => panic!("unexpected {other:?}"),
        }
        let ok = second.wait().await.unwrap();
        assert_eq!(ok.outcome.gcode_file_ref, "slice_ok-2.gcode");

        let stats = queue.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn panicking_runner_is_isolated() {
        let runner = Arc::new(RecordingRunner::with_delay(Duration::from_millis(1)));
        let queue = SliceQueue::start(runner.clone());

        let boom = queue.enqueue(job("panic-1"), CancellationToken::new()).unwrap();
        let after = queue.enqueue(job("ok-2"), CancellationToken::new()).unwrap();

        assert!(matches!(
            boom.wait().await,
            Err(QueueError::Run(SliceRunError::Panicked(ref m))) if m.contains("engine wrapper bug")
        ));
        assert!(after.wait().await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_jobs_are_skipped_before_start() {
        let runner = Arc::new(RecordingRunner::with_delay(Duration::from_millis(50)));
        let queue = SliceQueue::start(runner.clone());

        let first = queue.enqueue(job("first"), CancellationToken::new()).unwrap();
        let token = CancellationToken::new();
        let second = queue.enqueue(job("second"), token.clone()).unwrap();
        let third = queue.enqueue(job("third"), CancellationToken::new()).unwrap();
        token.cancel();

        assert!(first.wait().await.is_ok());
        assert!(matches!(second.wait().await, Err(QueueError::Cancelled)));
        assert!(third.wait().await.is_ok());
        assert_eq!(*runner.started.lock().unwrap(), vec!["first", "third"]);
        assert_eq!(queue.stats().cancelled, 1);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_and_pending_jobs() {
        let runner = Arc::new(RecordingRunner::with_delay(Duration::from_millis(50)));
        let queue = SliceQueue::start(runner.clone());

        let running = queue.enqueue(job("running"), CancellationToken::new()).unwrap();
        // let the worker pick it up
        tokio::time::sleep(Duration::from_millis(10)).await;
        let pending = queue.enqueue(job("pending"), CancellationToken::new()).unwrap();
        queue.shutdown();

        assert!(running.wait().await.is_ok());
        assert!(matches!(pending.wait().await, Err(QueueError::Closed)));
        assert!(matches!(
            queue.submit(job("late")).await,
            Err(QueueError::Closed)
        ));
        assert!(queue.is_shut_down());
    }
}
