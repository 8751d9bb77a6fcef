//! `lsc-inbox` - Support requests and staff applications for LSC_Studio
//!
//! This library provides the submission store the site's forms append to,
//! the filter and search rules of the admin dashboard, and the key-value
//! backends they persist through.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod storage;
pub mod store;
pub mod submission;

pub use config::Config;
pub use dashboard::{Confirm, Counts, Dashboard, Filter};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::{StorageKeys, SubmissionStore};
pub use submission::{ContactForm, Payload, StaffApplicationForm, Submission, SubmissionKind};
