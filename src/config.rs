//! Per-client invoice configuration: JSON schema, validation, directory loader.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InvoiceError, Result};

static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6})$").expect("invalid hex color regex"));
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\-\+\(\)\s]{7,}$").expect("invalid phone regex"));

pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI, Arial, sans-serif";
pub const DEFAULT_FONT_WEIGHT: &str = "500";

/// One per-client configuration file. Keys are PascalCase on disk, the
/// schema the original tool shipped with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceConfig {
    pub clockify: ClockifySection,
    #[serde(default)]
    pub constant_line_items: Vec<ConstantLineItem>,
    #[serde(default)]
    pub invoice_style: InvoiceStyle,
    #[serde(default)]
    pub invoice_font_family: Option<String>,
    #[serde(default)]
    pub invoice_font_weight: Option<String>,
    #[serde(default)]
    pub invoice_map_mode: bool,
}

impl InvoiceConfig {
    pub fn font_family(&self) -> &str {
        self.invoice_font_family
            .as_deref()
            .unwrap_or(DEFAULT_FONT_FAMILY)
    }

    pub fn font_weight(&self) -> &str {
        self.invoice_font_weight
            .as_deref()
            .unwrap_or(DEFAULT_FONT_WEIGHT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClockifySection {
    pub clockify_api_key: String,
    /// May be blank; generation then raises the missing-ids condition so
    /// the caller can run the id lookup instead of failing generically.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub workspace_id: String,
    pub from_name: String,
    #[serde(default)]
    pub company_address_line1: Option<String>,
    #[serde(default)]
    pub company_address_line2: Option<String>,
    #[serde(default)]
    pub company_address_line3: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
    pub bank_routing_number: String,
    #[serde(default)]
    pub bank_swift: Option<String>,
    pub client_name: String,
    #[serde(default)]
    pub client_address1: Option<String>,
    #[serde(default)]
    pub client_address2: Option<String>,
    #[serde(default)]
    pub client_address3: Option<String>,
    pub client_email_address: String,
    pub client_number: String,
    pub currency_symbol: String,
    pub hourly_rate: f64,
    pub output_path: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConstantLineItem {
    pub description: String,
    pub amount: f64,
}

fn default_primary_color() -> String {
    "#2C3E50".to_string()
}

fn default_secondary_color() -> String {
    "#2980B9".to_string()
}

fn default_accent_color() -> String {
    "#27AE60".to_string()
}

fn default_background_color() -> String {
    "#F4F8FB".to_string()
}

fn default_text_color() -> String {
    "#181818".to_string()
}

fn default_table_header_bg() -> String {
    "#D0E4FA".to_string()
}

fn default_table_border() -> String {
    "#BFC9D1".to_string()
}

fn default_soft_heading_bg() -> String {
    "#e3f0fa".to_string()
}

fn default_soft_alt_row_bg() -> String {
    "#f6fbff".to_string()
}

fn default_section_bg() -> String {
    "#ffffff".to_string()
}

fn default_section_text() -> String {
    "#181818".to_string()
}

/// Invoice color palette. Every field has a documented hex default so a
/// config may specify only the colors it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InvoiceStyle {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub table_header_bg: String,
    pub table_border: String,
    pub soft_heading_bg: String,
    pub soft_alt_row_bg: String,
    pub section_bg: String,
    pub section_text: String,
}

impl Default for InvoiceStyle {
    fn default() -> Self {
        Self {
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            accent_color: default_accent_color(),
            background_color: default_background_color(),
            text_color: default_text_color(),
            table_header_bg: default_table_header_bg(),
            table_border: default_table_border(),
            soft_heading_bg: default_soft_heading_bg(),
            soft_alt_row_bg: default_soft_alt_row_bg(),
            section_bg: default_section_bg(),
            section_text: default_section_text(),
        }
    }
}

/// Validates a parsed config, returning every problem found rather than
/// stopping at the first.
pub fn validate(config: &InvoiceConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let c = &config.clockify;

    let require = |errors: &mut Vec<String>, value: &str, field: &str| {
        if value.trim().is_empty() {
            errors.push(format!("{field} is required."));
        }
    };

    require(&mut errors, &c.clockify_api_key, "ClockifyApiKey");
    require(&mut errors, &c.from_name, "FromName");
    if c.contact_email.trim().is_empty() || !EMAIL_REGEX.is_match(&c.contact_email) {
        errors.push("ContactEmail is required and must be a valid email.".to_string());
    }
    if c.contact_phone.trim().is_empty() || !PHONE_REGEX.is_match(&c.contact_phone) {
        errors.push("ContactPhone is required and must be a valid phone number.".to_string());
    }
    require(&mut errors, &c.bank_name, "BankName");
    require(&mut errors, &c.bank_account_number, "BankAccountNumber");
    require(&mut errors, &c.bank_account_holder, "BankAccountHolder");
    require(&mut errors, &c.bank_routing_number, "BankRoutingNumber");
    require(&mut errors, &c.client_name, "ClientName");
    if c.client_email_address.trim().is_empty() || !EMAIL_REGEX.is_match(&c.client_email_address) {
        errors.push("ClientEmailAddress is required and must be a valid email.".to_string());
    }
    require(&mut errors, &c.client_number, "ClientNumber");
    require(&mut errors, &c.currency_symbol, "CurrencySymbol");
    if c.hourly_rate <= 0.0 {
        errors.push("HourlyRate must be greater than 0.".to_string());
    }
    require(&mut errors, &c.output_path, "OutputPath");

    for (i, item) in config.constant_line_items.iter().enumerate() {
        if item.description.trim().is_empty() {
            errors.push(format!("ConstantLineItems[{i}]: Description is required."));
        }
        if item.amount < 0.0 {
            errors.push(format!("ConstantLineItems[{i}]: Amount must be >= 0."));
        }
    }

    let s = &config.invoice_style;
    let palette = [
        (&s.primary_color, "PrimaryColor"),
        (&s.secondary_color, "SecondaryColor"),
        (&s.accent_color, "AccentColor"),
        (&s.background_color, "BackgroundColor"),
        (&s.text_color, "TextColor"),
        (&s.table_header_bg, "TableHeaderBg"),
        (&s.table_border, "TableBorder"),
        (&s.soft_heading_bg, "SoftHeadingBg"),
        (&s.soft_alt_row_bg, "SoftAltRowBg"),
        (&s.section_bg, "SectionBg"),
        (&s.section_text, "SectionText"),
    ];
    for (value, field) in palette {
        if !HEX_COLOR_REGEX.is_match(value) {
            errors.push(format!("{field} must be a valid hex color (e.g. #AABBCC)."));
        }
    }

    errors
}

/// One loaded config file: either a validated config or the list of
/// problems that kept it from loading.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub name: String,
    pub config: Option<InvoiceConfig>,
    pub errors: Vec<String>,
}

impl LoadedConfig {
    /// Unwraps the config or converts the recorded problems into the
    /// config-invalid error.
    pub fn into_config(self) -> Result<InvoiceConfig> {
        match self.config {
            Some(config) => Ok(config),
            None => Err(InvoiceError::ConfigInvalid {
                path: self.path,
                errors: self.errors,
            }),
        }
    }
}

pub fn load_config_file(path: &Path) -> LoadedConfig {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            return LoadedConfig {
                path: path.to_path_buf(),
                name,
                config: None,
                errors: vec![format!("could not read file: {err}")],
            }
        }
    };

    match serde_json::from_str::<InvoiceConfig>(&text) {
        Ok(config) => {
            let errors = validate(&config);
            LoadedConfig {
                path: path.to_path_buf(),
                name,
                config: if errors.is_empty() { Some(config) } else { None },
                errors,
            }
        }
        Err(err) => LoadedConfig {
            path: path.to_path_buf(),
            name,
            config: None,
            errors: vec![format!("invalid JSON: {err}")],
        },
    }
}

/// Loads every `*.json` in the config directory. A file that fails to
/// parse or validate is reported through its `LoadedConfig` entry; it never
/// aborts the directory walk.
pub fn load_configs(dir: &Path) -> Result<Vec<LoadedConfig>> {
    if !dir.is_dir() {
        return Err(InvoiceError::ConfigUnreadable {
            path: dir.to_path_buf(),
            reason: "config directory not found".to_string(),
        });
    }

    let mut results = Vec::new();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    paths.sort();

    for path in paths {
        results.push(load_config_file(&path));
    }
    Ok(results)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn sample_config_json() -> &'static str {
        r##"{
            "Clockify": {
                "ClockifyApiKey": "key-123",
                "UserId": "user-1",
                "WorkspaceId": "ws-1",
                "FromName": "Jane Developer",
                "CompanyAddressLine1": "1 Main St",
                "CompanyAddressLine2": "Suite 2",
                "CompanyAddressLine3": "Springfield",
                "ContactEmail": "jane@example.com",
                "ContactPhone": "+1 555 123 4567",
                "BankName": "First Bank",
                "BankAccountNumber": "000123456",
                "BankAccountHolder": "Jane Developer",
                "BankRoutingNumber": "111000025",
                "ClientName": "Acme Corp",
                "ClientAddress1": "9 Client Rd",
                "ClientEmailAddress": "billing@acme.example",
                "ClientNumber": "+1 555 987 6543",
                "CurrencySymbol": "$",
                "HourlyRate": 100.0,
                "OutputPath": "output"
            },
            "ConstantLineItems": [
                { "Description": "Setup Fee", "Amount": 50.0 }
            ],
            "InvoiceStyle": {
                "PrimaryColor": "#2C3E50"
            }
        }"##
    }

    pub(crate) fn sample_config() -> InvoiceConfig {
        serde_json::from_str(sample_config_json()).expect("sample config must parse")
    }

    fn unique_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("clockify-invoicer-tests-{name}-{nanos}"))
    }

    #[test]
    fn sample_config_parses_and_validates_clean() {
        let config = sample_config();
        assert!(validate(&config).is_empty());
        assert_eq!(config.clockify.client_name, "Acme Corp");
        assert_eq!(config.constant_line_items.len(), 1);
        // Unspecified style fields fall back to documented defaults.
        assert_eq!(config.invoice_style.secondary_color, "#2980B9");
        assert_eq!(config.font_weight(), "500");
        assert!(!config.invoice_map_mode);
    }

    #[test]
    fn validation_reports_every_problem() {
        let mut config = sample_config();
        config.clockify.contact_email = "not-an-email".to_string();
        config.clockify.hourly_rate = 0.0;
        config.invoice_style.accent_color = "green".to_string();
        config.constant_line_items[0].amount = -5.0;

        let errors = validate(&config);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("ContactEmail")));
        assert!(errors.iter().any(|e| e.contains("HourlyRate")));
        assert!(errors.iter().any(|e| e.contains("AccentColor")));
        assert!(errors.iter().any(|e| e.contains("ConstantLineItems[0]")));
    }

    #[test]
    fn blank_ids_pass_validation_for_the_lookup_escape_hatch() {
        let mut config = sample_config();
        config.clockify.user_id = String::new();
        config.clockify.workspace_id = String::new();
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn load_configs_keeps_good_files_and_reports_bad_ones() {
        let dir = unique_dir("load");
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::write(dir.join("acme.json"), sample_config_json()).expect("write good config");
        fs::write(dir.join("broken.json"), "{ not json").expect("write bad config");
        fs::write(dir.join("notes.txt"), "ignored").expect("write non-json file");

        let results = load_configs(&dir).expect("directory should load");
        assert_eq!(results.len(), 2);

        let good = results.iter().find(|r| r.name == "acme").unwrap();
        assert!(good.config.is_some());
        assert!(good.errors.is_empty());

        let bad = results.iter().find(|r| r.name == "broken").unwrap();
        assert!(bad.config.is_none());
        assert!(bad.errors[0].contains("invalid JSON"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_configs_errors_on_missing_directory() {
        let dir = unique_dir("missing");
        assert!(load_configs(&dir).is_err());
    }
}
