//! The invoice generation pipeline: fetch, resolve, aggregate, render, write.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use clockify_api::{fetch_time_entries, ClockifyClient, ClockifyConfig, EventSink, TimeEntry};

use crate::aggregate::aggregate;
use crate::config::{InvoiceConfig, LoadedConfig};
use crate::error::{InvoiceError, Result};
use crate::period::BillingPeriod;
use crate::render::render_invoice;
use crate::resolver::{ProjectNameResolver, NO_PROJECT};
use crate::settings::{CounterStore, InvoiceNumbering};

/// Builds an API client from a per-client config. Blank identifiers raise
/// the distinguished missing-ids condition carrying the API key, so the
/// caller can run the id lookup instead of failing generically.
pub fn client_for(config: &InvoiceConfig) -> Result<ClockifyClient> {
    let c = &config.clockify;
    if c.user_id.trim().is_empty() || c.workspace_id.trim().is_empty() {
        return Err(InvoiceError::MissingIds {
            api_key: c.clockify_api_key.clone(),
        });
    }
    let api_config = ClockifyConfig::new(&c.clockify_api_key, &c.workspace_id, &c.user_id);
    Ok(ClockifyClient::new(api_config)?)
}

/// Generates one invoice: fetch, resolve project names, aggregate, render,
/// write. Returns the path of the written HTML document.
pub async fn generate_invoice<S: CounterStore>(
    config: &InvoiceConfig,
    period: BillingPeriod,
    numbering: &InvoiceNumbering<S>,
    convert_pdf: bool,
    sink: &dyn EventSink,
) -> Result<PathBuf> {
    let client = client_for(config)?;
    generate_with_client(&client, config, period, numbering, convert_pdf, sink).await
}

/// Pipeline body, split out so tests can inject a client pointed at a mock
/// server.
pub async fn generate_with_client<S: CounterStore>(
    client: &ClockifyClient,
    config: &InvoiceConfig,
    period: BillingPeriod,
    numbering: &InvoiceNumbering<S>,
    convert_pdf: bool,
    sink: &dyn EventSink,
) -> Result<PathBuf> {
    let entries = fetch_time_entries(client, period.start, period.end, sink).await;

    // Resolve names sequentially; the resolver memoizes per run.
    let mut resolver = ProjectNameResolver::new(client);
    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = match entry.project_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => match entry.project_id.as_deref() {
                Some(id) => resolver.resolve(id, sink).await,
                None => NO_PROJECT.to_string(),
            },
        };
        resolved.push(TimeEntry {
            project_name: Some(name),
            ..entry
        });
    }

    let breakdown = aggregate(
        resolved,
        &config.constant_line_items,
        config.clockify.hourly_rate,
        sink,
    );

    let invoice_number = match config.clockify.invoice_number.as_deref() {
        Some(number) if !number.trim().is_empty() => number.to_string(),
        _ => numbering.next()?,
    };

    let html = render_invoice(
        &breakdown,
        config,
        &period.label(),
        Some(&invoice_number),
        Utc::now().date_naive(),
    );

    let path = output_path(config, &period);
    write_document(&html, &path)?;
    sink.info(format!(
        "invoice {} written to {} ({:.2}h, {}{:.2})",
        invoice_number,
        path.display(),
        breakdown.total_hours,
        config.clockify.currency_symbol,
        breakdown.total_amount
    ));

    if convert_pdf {
        convert_to_pdf(&path, sink);
    }
    Ok(path)
}

/// Outcome of one config in a batch run.
pub struct BatchOutcome {
    pub name: String,
    pub result: Result<PathBuf>,
}

/// Generates invoices for every loaded config, strictly sequentially so
/// counter writes never interleave. A failing config is reported and
/// skipped; the batch always runs to completion.
pub async fn generate_all<S: CounterStore>(
    configs: Vec<LoadedConfig>,
    period: BillingPeriod,
    numbering: &InvoiceNumbering<S>,
    convert_pdf: bool,
    sink: &dyn EventSink,
) -> Vec<BatchOutcome> {
    let mut outcomes = Vec::new();
    for loaded in configs {
        let name = loaded.name.clone();
        let result = match loaded.into_config() {
            Ok(config) => {
                generate_invoice(&config, period, numbering, convert_pdf, sink).await
            }
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            sink.warn(format!("config '{name}' skipped: {err}"));
        }
        outcomes.push(BatchOutcome { name, result });
    }
    outcomes
}

/// Keeps letters, digits, '-' and '_'; whitespace becomes '_', anything
/// else is dropped. Applied to the client and period components of the
/// output file name.
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .filter_map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                Some(ch)
            } else if ch.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect()
}

fn output_path(config: &InvoiceConfig, period: &BillingPeriod) -> PathBuf {
    let file_name = format!(
        "Invoice_{}_{}.html",
        sanitize_component(&config.clockify.client_name),
        sanitize_component(&period.label())
    );
    Path::new(&config.clockify.output_path).join(file_name)
}

fn write_document(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}

/// Hands the written document to the external converter. Failure is never
/// fatal; the HTML artifact already exists.
fn convert_to_pdf(html_path: &Path, sink: &dyn EventSink) {
    let pdf_path = html_path.with_extension("pdf");
    match Command::new("wkhtmltopdf").arg(html_path).arg(&pdf_path).output() {
        Ok(output) if output.status.success() => {
            sink.info(format!("pdf written to {}", pdf_path.display()));
        }
        Ok(output) => {
            sink.warn(format!(
                "wkhtmltopdf failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Err(err) => {
            sink.warn(format!("could not run wkhtmltopdf: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use clockify_api::BufferSink;
    use std::env;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    struct MemoryCounter {
        value: Mutex<Option<String>>,
    }

    impl MemoryCounter {
        fn new() -> Self {
            Self {
                value: Mutex::new(None),
            }
        }
    }

    impl CounterStore for MemoryCounter {
        fn read(&self) -> Result<Option<String>> {
            Ok(self.value.lock().unwrap().clone())
        }

        fn write(&self, value: &str) -> Result<()> {
            *self.value.lock().unwrap() = Some(value.to_string());
            Ok(())
        }
    }

    fn unique_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("clockify-invoicer-tests-{name}-{nanos}"))
    }

    #[test]
    fn sanitize_keeps_safe_characters_and_replaces_whitespace() {
        assert_eq!(sanitize_component("Acme Corp"), "Acme_Corp");
        assert_eq!(sanitize_component("September 2025"), "September_2025");
        assert_eq!(sanitize_component("we/ird:client*"), "weirdclient");
    }

    #[test]
    fn blank_ids_raise_the_missing_ids_condition() {
        let mut config = sample_config();
        config.clockify.workspace_id = String::new();

        let err = client_for(&config).unwrap_err();
        match err {
            InvoiceError::MissingIds { api_key } => assert_eq!(api_key, "key-123"),
            other => panic!("expected MissingIds, got {other}"),
        }
    }

    #[tokio::test]
    async fn pipeline_writes_the_expected_document() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/workspaces/ws-1/reports/detailed")
            .with_status(200)
            .with_body(
                r#"{"timeentries":[
                    {"description":"feature","projectId":"p-a","projectName":"Project A",
                     "timeInterval":{"start":"2025-09-01T09:00:00Z","end":"2025-09-01T11:00:00Z","duration":7200}},
                    {"description":"review","projectId":"p-a","projectName":"Project A",
                     "timeInterval":{"start":"2025-09-02T09:00:00Z","end":"2025-09-02T12:00:00Z","duration":10800}},
                    {"description":"support","projectId":"p-b",
                     "timeInterval":{"start":"2025-09-03T09:00:00Z","end":"2025-09-03T10:00:00Z","duration":"PT1H"}}
                ]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/workspaces/ws-1/projects/p-b")
            .with_status(200)
            .with_body(r#"{"id":"p-b","name":"Project B"}"#)
            .create_async()
            .await;

        let out_dir = unique_dir("pipeline");
        let mut config = sample_config();
        config.clockify.output_path = out_dir.to_string_lossy().into_owned();

        let api_config = ClockifyConfig::new("key-123", "ws-1", "user-1")
            .with_api_base_url(server.url())
            .with_reports_base_url(server.url())
            .with_cooldown(Duration::ZERO);
        let client = ClockifyClient::new(api_config).unwrap();

        let numbering = InvoiceNumbering::new(MemoryCounter::new());
        let period = BillingPeriod::month(2025, 9).unwrap();
        let sink = BufferSink::new();

        let path = generate_with_client(&client, &config, period, &numbering, false, &sink)
            .await
            .expect("pipeline should succeed");

        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Invoice_Acme_Corp_September_2025.html"
        );
        let html = fs::read_to_string(&path).expect("document should exist");
        assert!(html.contains("Invoice #:</span> 001"));
        assert!(html.contains(">Project A</td>"));
        assert!(html.contains(">5.00</td>"));
        assert!(html.contains(">Project B</td>"));
        assert!(html.contains("Amount Due: $650.00"));

        let _ = fs::remove_dir_all(&out_dir);
    }

    #[tokio::test]
    async fn batch_continues_past_an_invalid_config() {
        let invalid = LoadedConfig {
            path: PathBuf::from("bad.json"),
            name: "bad".to_string(),
            config: None,
            errors: vec!["ClientName is required.".to_string()],
        };
        let missing_ids = {
            let mut config = sample_config();
            config.clockify.user_id = String::new();
            LoadedConfig {
                path: PathBuf::from("no-ids.json"),
                name: "no-ids".to_string(),
                config: Some(config),
                errors: Vec::new(),
            }
        };

        let numbering = InvoiceNumbering::new(MemoryCounter::new());
        let period = BillingPeriod::month(2025, 9).unwrap();
        let sink = BufferSink::new();

        let outcomes =
            generate_all(vec![invalid, missing_ids], period, &numbering, false, &sink).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert!(matches!(
            outcomes[1].result,
            Err(InvoiceError::MissingIds { .. })
        ));
        assert_eq!(sink.warnings().len(), 2);
    }
}
