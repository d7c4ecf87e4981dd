//! Typed Clockify API client crate used by the invoice generator.

pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pacing;
pub mod sink;

pub use client::ClockifyClient;
pub use config::ClockifyConfig;
pub use error::{ClockifyError, Result};
pub use fetcher::{fetch_time_entries, TimeEntry};
pub use models::{DetailedReport, DurationValue, Project, ReportEntry, UserAccount, Workspace};
pub use sink::{BufferSink, EventSink, SinkEvent, TraceSink};
