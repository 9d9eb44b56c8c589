use crate::job::{JobKind, JobName};
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Submitted { kind: JobKind, job_name: JobName, arn: String },
    Message { kind: JobKind, job_name: JobName, message: String },
    Status { kind: JobKind, job_name: JobName, status: JobStatus },
    Finished { kind: JobKind, job_name: JobName, status: JobStatus },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Submitted { kind, job_name, arn } => {
                println!("[{kind}:{job_name}] submitted ({arn})");
            }
            ProgressEvent::Message { kind, job_name, message } => println!("[{kind}:{job_name}] {message}"),
            ProgressEvent::Status { kind, job_name, status } => println!("[{kind}:{job_name}] {status}"),
            ProgressEvent::Finished { kind, job_name, status } => {
                println!("[{kind}:{job_name}] finished: {status}");
            }
        }
    }
}
