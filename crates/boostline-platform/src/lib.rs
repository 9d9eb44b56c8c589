//! Boostline Platform
//!
//! Clients for the managed ML platform and its object storage, plus the
//! submit/wait/register steps built on top of them.

pub mod error;
pub mod http;
pub mod registrar;
pub mod service;
pub mod store;
pub mod submit;
pub mod transfer;
pub mod waiter;

pub use error::{PlatformError, PlatformResult};
pub use http::{HttpJobService, HttpObjectStore};
pub use registrar::register_model;
pub use service::JobService;
pub use store::{LocalObjectStore, ObjectStore};
pub use submit::{submit_training_job, submit_transform_job};
pub use transfer::{download_prefix, upload_files};
pub use waiter::{ensure_completed, wait_for_training_job, wait_for_transform_job, WaitOptions};
