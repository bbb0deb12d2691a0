//! search-dashboard: command line front end
//!
//! Drives the dashboard against a live backend and prints results as
//! tables.
//!
//! # Usage
//!
//! ```bash
//! # List data sources
//! search-dashboard sources
//!
//! # Search a source
//! search-dashboard search "black cat" --source pets --operator and --page-size 20
//!
//! # Export the same query
//! search-dashboard export "black cat" --source pets
//!
//! # Manage the synonym dictionary
//! search-dashboard dictionary list --filter feline
//! search-dashboard dictionary upsert cat --definition "Small feline" -s kitty -s tomcat
//! search-dashboard dictionary delete cat
//! ```

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use search_dashboard::config::LoggingConfig;
use search_dashboard::dictionary_screen::DialogAction;
use search_dashboard::form::FormChange;
use search_dashboard::highlight::StyledColumn;
use search_dashboard::model::{DateRange, DictionaryEntry, Operator, PageSize};
use search_dashboard::{
    Dashboard, DashboardCommand, DashboardConfig, DashboardHandle, DashboardSnapshot, DictionaryScreen,
    HttpBackend, Phase, SearchBackend,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "search-dashboard")]
#[command(about = "Search a data source and manage the synonym dictionary", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available data sources
    Sources,
    /// Run a search and print the result table
    Search(QueryArgs),
    /// Ask the backend to export a search as CSV
    Export(QueryArgs),
    /// Manage the synonym dictionary
    Dictionary {
        #[command(subcommand)]
        command: DictionaryCommands,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Search phrase
    phrase: String,
    /// Source id (defaults to the first listed source)
    #[arg(long)]
    source: Option<String>,
    /// Operator between terms
    #[arg(long, default_value = "OR")]
    operator: Operator,
    /// Zero-based page
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Rows per page: 10, 20, 50 or 100
    #[arg(long)]
    page_size: Option<u32>,
    /// First day, YYYY-MM-DD (UTC)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD (UTC)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Do not expand the phrase with dictionary synonyms
    #[arg(long)]
    no_synonyms: bool,
}

#[derive(Subcommand)]
enum DictionaryCommands {
    /// List entries
    List {
        /// Case-insensitive filter on keyword, definition and synonyms
        #[arg(long)]
        filter: Option<String>,
    },
    /// Create or update an entry
    Upsert {
        keyword: String,
        #[arg(long, default_value = "")]
        definition: String,
        /// Synonym (repeatable)
        #[arg(short, long = "synonym")]
        synonyms: Vec<String>,
    },
    /// Delete an entry
    Delete { keyword: String },
}

const WAIT_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::development(),
    }
    .with_env_overrides();
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }
    config.validate()?;

    init_logging(&config.logging);
    info!("Starting search-dashboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Backend: {}", config.backend.base_url);

    let backend = Arc::new(HttpBackend::from_config(&config.backend)?);

    match cli.command {
        Commands::Sources => print_sources(backend.as_ref()).await?,
        Commands::Search(args) => {
            let (handle, task) = Dashboard::spawn(backend.clone(), backend, config.page_size()?);
            let snapshot = run_query(&handle, &args).await?;
            print_results(&snapshot);
            handle.shutdown().await?;
            task.await?;
        }
        Commands::Export(args) => {
            let (handle, task) = Dashboard::spawn(backend.clone(), backend, config.page_size()?);
            run_query(&handle, &args).await?;
            handle.send(DashboardCommand::DismissNotification).await?;
            handle.send(DashboardCommand::Export).await?;
            let snapshot = wait(&handle, |s| s.notification.is_some()).await?;
            handle.shutdown().await?;
            task.await?;

            if let Some(notification) = snapshot.notification {
                if notification.is_error() {
                    bail!("{}", notification.message);
                }
                println!("✓ {}", notification.message);
            }
        }
        Commands::Dictionary { command } => {
            let mut screen = DictionaryScreen::new(HttpBackend::from_config(&config.backend)?);
            run_dictionary(&mut screen, command).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.clone().into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr, tables to stdout
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn wait(
    handle: &DashboardHandle,
    predicate: impl FnMut(&DashboardSnapshot) -> bool,
) -> anyhow::Result<DashboardSnapshot> {
    let snapshot = tokio::time::timeout(WAIT_TIMEOUT, handle.wait_for(predicate))
        .await
        .context("Timed out waiting for the backend")??;
    Ok(snapshot)
}

/// Feed the query arguments through the dashboard and wait for the answer
async fn run_query(handle: &DashboardHandle, args: &QueryArgs) -> anyhow::Result<DashboardSnapshot> {
    let mounted = wait(handle, |s| s.phase == Phase::Ready || s.phase == Phase::QueryFailed).await?;
    if mounted.phase == Phase::QueryFailed {
        let message = mounted
            .notification
            .map(|n| n.message)
            .unwrap_or_else(|| "No data sources available".to_string());
        bail!("{}", message);
    }

    if let Some(source) = &args.source {
        if mounted.criteria.source_id() != Some(source.as_str()) {
            if !mounted.source_menu.options().iter().any(|o| &o.value == source) {
                bail!("Unknown source '{}'", source);
            }
            handle.send(DashboardCommand::SelectSource(source.clone())).await?;
        }
    }

    if let Some(size) = args.page_size {
        handle
            .send(DashboardCommand::SetPageSize(PageSize::try_from(size)?))
            .await?;
    }

    let date_range = DateRange::new(
        args.from.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|t| t.and_utc().timestamp()),
        args.to.and_then(|d| d.and_hms_opt(23, 59, 59)).map(|t| t.and_utc().timestamp()),
    );
    for change in [
        FormChange::Phrase(args.phrase.clone()),
        FormChange::Operator(args.operator),
        FormChange::DateRange(date_range),
    ] {
        handle.send(DashboardCommand::Edit(change)).await?;
    }
    handle.send(DashboardCommand::Submit).await?;

    if args.page > 0 {
        handle.send(DashboardCommand::GoToPage(args.page)).await?;
    }

    let phrase = args.phrase.trim().to_string();
    let page = args.page;
    let mut snapshot = wait(handle, move |s| {
        s.phase == Phase::Ready && s.criteria.phrase == phrase && s.criteria.pagination.current_page == page
    })
    .await?;

    if args.no_synonyms && snapshot.criteria.use_synonyms && !snapshot.suggestions.is_empty() {
        // Expansion is off after a phrase change, so one toggle sends it on and a second off
        for _ in 0..2 {
            handle.send(DashboardCommand::ToggleSynonyms).await?;
        }
        snapshot = wait(handle, |s| s.phase == Phase::Ready && !s.criteria.use_synonyms).await?;
    }

    if let Some(notification) = &snapshot.notification {
        if notification.is_error() {
            bail!("{}", notification.message);
        }
    }
    Ok(snapshot)
}

async fn print_sources(backend: &dyn SearchBackend) -> anyhow::Result<()> {
    let sources = backend.fetch_sources().await?;
    if sources.is_empty() {
        println!("No sources found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Id", "Name", "Search field", "Date field", "Last updated"]);
    for source in &sources {
        table.add_row(vec![
            source.id.clone(),
            source.label().to_string(),
            source.search_field.clone(),
            source.date_field.clone(),
            search_dashboard::catalog::format_timestamp(source.latest_timestamp),
        ]);
    }
    println!("{table}");
    println!("\nTotal: {} source(s)", sources.len());
    Ok(())
}

fn header_cell(column: &StyledColumn) -> Cell {
    let mut cell = Cell::new(&column.column.title).set_alignment(CellAlignment::Center);
    if column.emphasis.is_bold() {
        cell = cell.add_attribute(Attribute::Bold);
    }
    if let Some(color) = column.emphasis.color().and_then(hex_color) {
        cell = cell.fg(color);
    }
    cell
}

fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    let channel = |i: usize| hex.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn print_results(snapshot: &DashboardSnapshot) {
    let view = &snapshot.view;
    println!(
        "Source: {} (last updated {})",
        snapshot.criteria.source_id().unwrap_or("-"),
        snapshot.freshness
    );
    if !snapshot.suggestions.is_empty() {
        println!("Searched also for: {}", snapshot.suggestions.join(", "));
    }

    if view.is_empty() {
        println!("No results.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(view.columns.iter().map(header_cell).collect::<Vec<_>>());
    for row in &view.rows {
        table.add_row(view.columns.iter().map(|c| {
            let text = match row.get(&c.column.field) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            Cell::new(text).set_alignment(CellAlignment::Center)
        }));
    }
    println!("{table}");
    println!(
        "\nPage {} of {} ({} hits, {} per page)",
        view.pagination.current_page + 1,
        view.pagination.total_pages.max(1),
        view.pagination.total_hits,
        view.pagination.page_size
    );
}

async fn run_dictionary(
    screen: &mut DictionaryScreen<HttpBackend>,
    command: DictionaryCommands,
) -> anyhow::Result<()> {
    match command {
        DictionaryCommands::List { filter } => {
            screen.refresh().await;
            fail_on_error(screen)?;
            if let Some(filter) = filter {
                screen.set_filter(&filter);
            }

            let entries = screen.visible_entries();
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_header(vec!["Keyword", "Definition", "Synonyms"]);
            for entry in &entries {
                table.add_row(vec![
                    entry.keyword.clone(),
                    entry.definition.clone(),
                    entry.synonyms.join(", "),
                ]);
            }
            println!("{table}");
            println!("\nTotal: {} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
        }
        DictionaryCommands::Upsert {
            keyword,
            definition,
            synonyms,
        } => {
            screen.refresh().await;
            let existing = screen
                .entries()
                .iter()
                .find(|e| e.has_keyword(keyword.trim()))
                .cloned();
            let action = if existing.is_some() {
                DialogAction::Update
            } else {
                DialogAction::Create
            };
            screen.open_dialog(action, existing);
            screen
                .save(DictionaryEntry::new(keyword, definition, synonyms))
                .await?;
            report(screen)?;
        }
        DictionaryCommands::Delete { keyword } => {
            screen.delete(&keyword).await;
            report(screen)?;
        }
    }
    Ok(())
}

fn fail_on_error(screen: &DictionaryScreen<HttpBackend>) -> anyhow::Result<()> {
    match screen.notification() {
        Some(notification) if notification.is_error() => bail!("{}", notification.message),
        _ => Ok(()),
    }
}

fn report(screen: &DictionaryScreen<HttpBackend>) -> anyhow::Result<()> {
    fail_on_error(screen)?;
    if let Some(notification) = screen.notification() {
        println!("✓ {}", notification.message);
    }
    Ok(())
}
