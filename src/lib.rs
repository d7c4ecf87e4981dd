//! Clockify invoice generator: fetches tracked time from the Clockify API
//! and renders styled HTML invoices driven by per-client JSON configs.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod generate;
pub mod period;
pub mod render;
pub mod resolver;
pub mod settings;

pub use aggregate::{aggregate, InvoiceBreakdown, ProjectGroup};
pub use config::{load_config_file, load_configs, InvoiceConfig, LoadedConfig};
pub use error::{InvoiceError, Result};
pub use generate::{client_for, generate_all, generate_invoice, BatchOutcome};
pub use period::BillingPeriod;
pub use render::render_invoice;
pub use resolver::ProjectNameResolver;
pub use settings::{AppSettings, CounterStore, InvoiceNumbering, SettingsManager};

use clockify_api::EventSink;

/// Forwards pipeline events to the `log` facade the CLI initializes.
pub struct LogSink;

impl EventSink for LogSink {
    fn info(&self, message: String) {
        log::info!("{message}");
    }

    fn warn(&self, message: String) {
        log::warn!("{message}");
    }
}
