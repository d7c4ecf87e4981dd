use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use clockify_api::{ClockifyClient, ClockifyConfig};

use clockify_invoicer::{
    client_for, generate_all, generate_invoice, load_config_file, load_configs, BillingPeriod,
    InvoiceError, InvoiceNumbering, LogSink, SettingsManager,
};

#[derive(Parser)]
#[command(
    name = "clockify-invoicer",
    version,
    about = "Generates styled HTML invoices from Clockify time entries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an invoice for one client config (the default if none is named)
    Generate {
        /// Config name (file stem inside the config directory)
        #[arg(long)]
        config: Option<String>,
        /// Billing month as YYYY-MM; defaults to the current month
        #[arg(long)]
        month: Option<String>,
        /// Also convert the document with wkhtmltopdf
        #[arg(long)]
        pdf: bool,
    },
    /// Generate invoices for every config in the directory, sequentially
    GenerateAll {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        pdf: bool,
    },
    /// Look up the user id and workspaces behind an API key
    FindIds {
        /// Read the API key from this config
        #[arg(long, conflicts_with = "api_key")]
        config: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List configs and their validation status
    ListConfigs,
    /// List the workspace's projects with their ids
    ListProjects {
        #[arg(long)]
        config: Option<String>,
    },
    /// Persist the default config selection
    SetDefault { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings_manager = SettingsManager::new();

    match cli.command {
        Commands::Generate { config, month, pdf } => {
            run_generate(&settings_manager, config, month, pdf).await
        }
        Commands::GenerateAll { month, pdf } => {
            run_generate_all(&settings_manager, month, pdf).await
        }
        Commands::FindIds { config, api_key } => {
            run_find_ids(&settings_manager, config, api_key).await
        }
        Commands::ListConfigs => run_list_configs(&settings_manager),
        Commands::ListProjects { config } => run_list_projects(&settings_manager, config).await,
        Commands::SetDefault { name } => run_set_default(&settings_manager, name),
    }
}

fn resolve_period(month: Option<String>) -> Result<BillingPeriod> {
    match month {
        Some(text) => BillingPeriod::parse(&text)
            .ok_or_else(|| anyhow!("'{text}' is not a valid YYYY-MM billing month")),
        None => Ok(BillingPeriod::containing(Utc::now())),
    }
}

fn config_path(settings_manager: &SettingsManager, name: &str) -> PathBuf {
    let settings = settings_manager.load();
    settings_manager
        .config_dir(&settings)
        .join(format!("{name}.json"))
}

async fn run_generate(
    settings_manager: &SettingsManager,
    config_name: Option<String>,
    month: Option<String>,
    pdf: bool,
) -> Result<()> {
    let settings = settings_manager.load();
    let name = config_name
        .or(settings.default_config.clone())
        .ok_or_else(|| anyhow!("no config named and no default set (see set-default)"))?;

    let path = config_path(settings_manager, &name);
    if !path.is_file() {
        bail!(InvoiceError::ConfigNotFound(name));
    }
    let config = load_config_file(&path).into_config()?;

    let period = resolve_period(month)?;
    let numbering = InvoiceNumbering::new(SettingsManager::with_path(
        settings_manager.path().clone(),
    ));

    match generate_invoice(&config, period, &numbering, pdf, &LogSink).await {
        Ok(path) => {
            println!("Invoice generated: {}", path.display());
            Ok(())
        }
        Err(InvoiceError::MissingIds { api_key }) => {
            println!("UserId or WorkspaceId is missing from config '{name}'.");
            println!("Querying Clockify for the correct identifiers...");
            print_ids(&api_key).await?;
            bail!("fill UserId and WorkspaceId in {} and retry", path.display());
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_generate_all(
    settings_manager: &SettingsManager,
    month: Option<String>,
    pdf: bool,
) -> Result<()> {
    let settings = settings_manager.load();
    let dir = settings_manager.config_dir(&settings);
    let configs = load_configs(&dir)?;
    if configs.is_empty() {
        bail!("no config files found in {}", dir.display());
    }

    let period = resolve_period(month)?;
    let numbering = InvoiceNumbering::new(SettingsManager::with_path(
        settings_manager.path().clone(),
    ));

    let outcomes = generate_all(configs, period, &numbering, pdf, &LogSink).await;
    let mut generated = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => {
                generated += 1;
                println!("{}: {}", outcome.name, path.display());
            }
            Err(err) => println!("{}: skipped ({err})", outcome.name),
        }
    }
    println!("Generated {generated} of {} invoices.", outcomes.len());

    if generated == 0 {
        bail!("no invoices were generated");
    }
    Ok(())
}

async fn run_find_ids(
    settings_manager: &SettingsManager,
    config_name: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    let api_key = match (api_key, config_name) {
        (Some(key), _) => key,
        (None, Some(name)) => {
            let path = config_path(settings_manager, &name);
            let text = fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            // Pull the key out of the raw JSON so a half-filled config
            // still works with this command.
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            value
                .pointer("/Clockify/ClockifyApiKey")
                .and_then(|key| key.as_str())
                .map(str::to_string)
                .ok_or_else(|| anyhow!("{} has no Clockify.ClockifyApiKey", path.display()))?
        }
        (None, None) => bail!("pass --api-key or --config"),
    };

    print_ids(&api_key).await
}

async fn print_ids(api_key: &str) -> Result<()> {
    let client = ClockifyClient::new(ClockifyConfig::new(api_key, "", ""))
        .map_err(InvoiceError::Api)?;

    let user = client.get_current_user().await.map_err(InvoiceError::Api)?;
    println!("User id: {} ({})", user.id, user.display_name());

    let workspaces = client.get_workspaces().await.map_err(InvoiceError::Api)?;
    if workspaces.is_empty() {
        println!("No workspaces are visible to this API key.");
    } else {
        println!("Workspaces:");
        for workspace in workspaces {
            println!("  {}  {}", workspace.id, workspace.name);
        }
    }
    Ok(())
}

async fn run_list_projects(
    settings_manager: &SettingsManager,
    config_name: Option<String>,
) -> Result<()> {
    let settings = settings_manager.load();
    let name = config_name
        .or(settings.default_config)
        .ok_or_else(|| anyhow!("no config named and no default set (see set-default)"))?;

    let path = config_path(settings_manager, &name);
    if !path.is_file() {
        bail!(InvoiceError::ConfigNotFound(name));
    }
    let config = load_config_file(&path).into_config()?;
    let client = client_for(&config)?;

    let projects = client.get_projects().await.map_err(InvoiceError::Api)?;
    if projects.is_empty() {
        println!("No projects in workspace {}.", config.clockify.workspace_id);
        return Ok(());
    }
    for project in projects {
        let archived = if project.archived.unwrap_or(false) {
            " (archived)"
        } else {
            ""
        };
        println!(
            "{}  {}{}",
            project.id,
            project.name.as_deref().unwrap_or("(unnamed)"),
            archived
        );
    }
    Ok(())
}

fn run_list_configs(settings_manager: &SettingsManager) -> Result<()> {
    let settings = settings_manager.load();
    let dir = settings_manager.config_dir(&settings);
    let configs = load_configs(&dir)?;
    if configs.is_empty() {
        println!("No config files in {}", dir.display());
        return Ok(());
    }

    for loaded in configs {
        let marker = if settings.default_config.as_deref() == Some(loaded.name.as_str()) {
            " (default)"
        } else {
            ""
        };
        if loaded.config.is_some() {
            println!("{}{}: OK", loaded.name, marker);
        } else {
            println!("{}{}: INVALID", loaded.name, marker);
            for error in loaded.errors {
                println!("    {error}");
            }
        }
    }
    Ok(())
}

fn run_set_default(settings_manager: &SettingsManager, name: String) -> Result<()> {
    let path = config_path(settings_manager, &name);
    if !path.is_file() {
        bail!(InvoiceError::ConfigNotFound(name));
    }

    let mut settings = settings_manager.load();
    settings.default_config = Some(name.clone());
    settings_manager.save(&settings)?;
    println!("Default config set to '{name}'.");
    Ok(())
}
