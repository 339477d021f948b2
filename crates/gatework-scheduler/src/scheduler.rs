//! The constraint-gated periodic job scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gatework_protocols::{
    JobAction, JobId, JobRegistration, JobSpec, SignalBus, SignalEnvelope, SignalKind,
};

use crate::config::SchedulerConfig;
use crate::error::SchedulerResult;
use crate::metrics::{SchedulerMetrics, SchedulerMetricsSnapshot};
use crate::readiness::ReadinessState;
use crate::state::JobState;

/// Control messages accepted by the scheduler task.
enum Control {
    /// Acknowledge once every signal delivered so far is processed.
    Settle(oneshot::Sender<()>),
}

/// Point-in-time view of a scheduled job.
#[derive(Debug, Clone)]
pub struct JobStatus {
    /// The job's bus-minted id.
    pub job_id: JobId,

    /// Lifecycle state.
    pub state: JobState,

    /// Counter snapshot.
    pub metrics: SchedulerMetricsSnapshot,
}

/// Constraint-gated scheduler for a single job.
///
/// Registration validates the spec, registers it with the bus and
/// spawns the scheduler task. The task folds incoming condition
/// signals into [`ReadinessState`] flags and fires the job's action
/// exactly once per eligible window; a failed fire leaves the window
/// armed so the bus's redelivery retries it.
///
/// Every transition runs on that single task, so at most one action
/// execution is in flight and no readiness flag is touched
/// concurrently. The handle only reads shared atomics and sends
/// control messages; dropping it without [`cancel`] detaches the job
/// and leaves it running.
///
/// [`cancel`]: PeriodicJobScheduler::cancel
pub struct PeriodicJobScheduler {
    job_id: JobId,
    state: Arc<AtomicU8>,
    metrics: Arc<SchedulerMetrics>,
    control: mpsc::Sender<Control>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PeriodicJobScheduler {
    /// Validate `spec`, register it with `bus` and start scheduling
    /// `action`.
    pub async fn register(
        spec: JobSpec,
        bus: Arc<dyn SignalBus>,
        action: Arc<dyn JobAction>,
    ) -> SchedulerResult<Self> {
        Self::register_with_config(spec, bus, action, SchedulerConfig::default()).await
    }

    /// [`register`](PeriodicJobScheduler::register) with an explicit
    /// configuration.
    pub async fn register_with_config(
        spec: JobSpec,
        bus: Arc<dyn SignalBus>,
        action: Arc<dyn JobAction>,
        config: SchedulerConfig,
    ) -> SchedulerResult<Self> {
        spec.validate()?;

        let JobRegistration { job_id, signals } = bus.register(&spec).await?;

        let initial_state = if spec.initial_delay.is_zero() {
            JobState::AwaitingPeriod
        } else {
            JobState::Idle
        };
        let readiness = ReadinessState::for_spec(&spec);

        let state = Arc::new(AtomicU8::new(initial_state as u8));
        let metrics = Arc::new(SchedulerMetrics::new());
        metrics.mark_start();

        let (control_tx, control_rx) = mpsc::channel(config.control_buffer);
        let cancel = CancellationToken::new();

        info!(
            "job {} ({}) registered, starting in state {}",
            job_id, spec.name, initial_state
        );

        let task = SchedulerTask {
            job_id,
            spec,
            readiness,
            state: state.clone(),
            metrics: metrics.clone(),
            bus,
            action,
            signals,
            control: control_rx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(task.run());

        Ok(Self {
            job_id,
            state,
            metrics,
            control: control_tx,
            cancel,
            task,
        })
    }

    /// The job's bus-minted id.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        JobState::from(self.state.load(Ordering::SeqCst))
    }

    /// Point-in-time status snapshot.
    pub fn status(&self) -> JobStatus {
        JobStatus {
            job_id: self.job_id,
            state: self.state(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Metrics snapshot.
    pub fn metrics(&self) -> SchedulerMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Resolve once every signal delivered before this call has been
    /// fully processed, including any fire one of them triggered.
    ///
    /// A settle is a barrier, not a signal: with nothing queued it
    /// changes no state and never re-attempts a failed fire. Returns
    /// immediately when the scheduler task has already finished.
    pub async fn settle(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.control.send(Control::Settle(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Stop processing signals.
    ///
    /// Cooperative: an in-flight fire runs to completion, then the
    /// task unregisters from the bus and exits. Signals delivered
    /// after cancellation are ignored silently.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the scheduler task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// The single-writer task behind a scheduler handle.
struct SchedulerTask {
    job_id: JobId,
    spec: JobSpec,
    readiness: ReadinessState,
    state: Arc<AtomicU8>,
    metrics: Arc<SchedulerMetrics>,
    bus: Arc<dyn SignalBus>,
    action: Arc<dyn JobAction>,
    signals: mpsc::Receiver<SignalEnvelope>,
    control: mpsc::Receiver<Control>,
    cancel: CancellationToken,
}

impl SchedulerTask {
    async fn run(mut self) {
        // Gates pre-opened by the spec can make a job eligible before
        // any signal arrives (a one-shot with no delay or constraint).
        self.evaluate().await;

        while !self.current_state().is_terminal() {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    self.finish(JobState::Cancelled).await;
                }
                Some(ctrl) = self.control.recv() => match ctrl {
                    Control::Settle(ack) => {
                        // Queued signals the flush consumed still count
                        // as a delivered batch; an empty queue makes the
                        // settle a pure barrier, so it never re-attempts
                        // a failed fire on its own.
                        if self.drain_signals() > 0 {
                            self.evaluate().await;
                        }
                        let _ = ack.send(());
                    }
                },
                maybe = self.signals.recv() => match maybe {
                    Some(envelope) => {
                        self.fold(envelope);
                        self.drain_signals();
                        self.evaluate().await;
                    }
                    None => {
                        debug!("job {} signal channel closed", self.job_id);
                        self.finish(JobState::Cancelled).await;
                    }
                },
            }
        }
    }

    fn current_state(&self) -> JobState {
        JobState::from(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, next: JobState) {
        self.state.store(next as u8, Ordering::SeqCst);
        debug!("job {} -> {}", self.job_id, next);
    }

    /// Fold one envelope into the readiness flags.
    fn fold(&mut self, envelope: SignalEnvelope) {
        self.metrics.record_signal();

        if !self.readiness.apply(envelope.kind) {
            self.metrics.record_redundant_signal();
            debug!(
                "job {} ignored redundant {} signal",
                self.job_id, envelope.kind
            );
            return;
        }

        // The delay gate can only open while Idle, so a flip here is
        // the Idle -> AwaitingPeriod transition.
        if envelope.kind == SignalKind::DelayElapsed {
            self.set_state(JobState::AwaitingPeriod);
        }
    }

    /// Apply any further queued signals before evaluating, so a batch
    /// of simultaneous signals is judged as one readiness change.
    /// Returns how many signals were folded.
    fn drain_signals(&mut self) -> usize {
        let mut folded = 0;
        while let Ok(envelope) = self.signals.try_recv() {
            self.fold(envelope);
            folded += 1;
        }
        folded
    }

    /// One evaluation pass: at most one fire per call.
    async fn evaluate(&mut self) {
        if self.current_state().is_terminal() {
            return;
        }
        self.metrics.record_evaluation();

        if !self.readiness.eligible() {
            return;
        }

        self.set_state(JobState::Ready);
        self.fire().await;
    }

    /// Run the action once. Success consumes the window; failure
    /// leaves every gate as it was so a redelivered signal retries.
    async fn fire(&mut self) {
        self.set_state(JobState::Firing);
        self.metrics.record_fire_attempt();

        match self.action.execute().await {
            Ok(()) => {
                self.metrics.record_fire_success();
                self.readiness.consume_window();

                if self.spec.is_periodic() {
                    info!("job {} ({}) fired", self.job_id, self.spec.name);
                    self.set_state(JobState::AwaitingPeriod);
                } else {
                    info!("job {} ({}) fired, one-shot complete", self.job_id, self.spec.name);
                    self.finish(JobState::Completed).await;
                }
            }
            Err(e) => {
                self.metrics.record_fire_failure();
                warn!(
                    "job {} ({}) fire failed, window stays armed: {}",
                    self.job_id, self.spec.name, e
                );
                self.set_state(JobState::Ready);
            }
        }
    }

    /// Leave the bus and park in a terminal state.
    async fn finish(&mut self, terminal: JobState) {
        if let Err(e) = self.bus.unregister(self.job_id).await {
            warn!("job {} unregister failed: {}", self.job_id, e);
        }
        self.set_state(terminal);
        info!("job {} ({}) {}", self.job_id, self.spec.name, terminal);
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
