//! Following a submitted job until it reaches a terminal state.

use crate::error::{PlatformError, PlatformResult};
use crate::service::JobService;
use boostline_jobs::{
    JobKind, JobName, JobStatus, ProgressEvent, ProgressSink, TrackedJob, TrainingJobDescription,
    TransformJobDescription,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Polling cadence: the interval doubles after every non-terminal poll up to
/// `max_interval`. Without `max_wait` the remote stopping condition is the only
/// deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitOptions {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_wait: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self { initial_interval: Duration::from_secs(5), max_interval: Duration::from_secs(60), max_wait: None }
    }
}

/// Maps a snapshot onto the error taxonomy: `Ok` only for `Completed`.
pub fn ensure_completed<D: TrackedJob>(description: &D) -> PlatformResult<()> {
    match description.status() {
        JobStatus::Completed => Ok(()),
        status @ (JobStatus::Failed | JobStatus::Stopped) => Err(PlatformError::JobFailed {
            job_name: description.name().to_string(),
            status,
            reason: description.failure_reason().map(str::to_string),
        }),
        status @ (JobStatus::InProgress | JobStatus::Stopping) => {
            Err(PlatformError::StillRunning { job_name: description.name().to_string(), status })
        }
    }
}

async fn follow<D, F, Fut>(
    kind: JobKind,
    name: &JobName,
    options: &WaitOptions,
    progress: &dyn ProgressSink,
    mut describe: F,
) -> PlatformResult<D>
where
    D: TrackedJob,
    F: FnMut() -> Fut,
    Fut: Future<Output = PlatformResult<D>>,
{
    let started = Instant::now();
    let mut delay = options.initial_interval;
    let mut last_status: Option<JobStatus> = None;
    let mut seen_transitions = 0;

    loop {
        let description = describe().await?;

        let transitions = description.transitions();
        for transition in transitions.iter().skip(seen_transitions) {
            let message = match &transition.status_message {
                Some(msg) => format!("{} - {}", transition.status, msg),
                None => transition.status.clone(),
            };
            progress.on_event(ProgressEvent::Message { kind, job_name: name.clone(), message });
        }
        seen_transitions = seen_transitions.max(transitions.len());

        let status = description.status();
        if last_status != Some(status) {
            progress.on_event(ProgressEvent::Status { kind, job_name: name.clone(), status });
            last_status = Some(status);
        }

        if status.is_terminal() {
            progress.on_event(ProgressEvent::Finished { kind, job_name: name.clone(), status });
            ensure_completed(&description)?;
            return Ok(description);
        }

        // The last sleep is cut short so the final poll lands on the deadline.
        let pause = match options.max_wait {
            Some(max_wait) => {
                let elapsed = started.elapsed();
                if elapsed >= max_wait {
                    return Err(PlatformError::StillRunning { job_name: name.to_string(), status });
                }
                delay.min(max_wait - elapsed)
            }
            None => delay,
        };

        debug!(job = %name, status = %status, delay = ?pause, "Job not finished, waiting");
        tokio::time::sleep(pause).await;
        delay = (delay * 2).min(options.max_interval);
    }
}

/// Polls `DescribeTrainingJob` until the job completes, fails or stops.
pub async fn wait_for_training_job(
    service: &dyn JobService,
    name: &JobName,
    options: &WaitOptions,
    progress: &dyn ProgressSink,
) -> PlatformResult<TrainingJobDescription> {
    follow(JobKind::Training, name, options, progress, move || service.describe_training_job(name)).await
}

/// Polls `DescribeTransformJob` until the job completes, fails or stops.
pub async fn wait_for_transform_job(
    service: &dyn JobService,
    name: &JobName,
    options: &WaitOptions,
    progress: &dyn ProgressSink,
) -> PlatformResult<TransformJobDescription> {
    follow(JobKind::Transform, name, options, progress, move || service.describe_transform_job(name)).await
}
