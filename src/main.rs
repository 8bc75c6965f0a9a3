use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tbm_horaires::api::ApiServer;
use tbm_horaires::transit::discovery::BORDEAUX_BBOX;
use tbm_horaires::{
    Catalog, CatalogEntry, Category, Config, DepartureQuery, DepartureSource, IntentHandler, Resolver,
    SiriClient, store,
};

/// TBM Horaires - next tram and bus departures in Bordeaux, by voice
#[derive(Parser)]
#[command(name = "tbm-horaires", version, about)]
struct Cli {
    /// Port to listen on (overrides TBM_PORT and the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep favorites in memory only (lost on restart)
    #[arg(long)]
    memory_store: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show which catalog entry a spoken fragment resolves to
    Resolve {
        /// line, stop or direction
        category: Category,
        /// Spoken fragment, e.g. "40 journaux"
        fragment: String,
    },
    /// Fetch live departures for a stop
    Departures {
        /// Spoken stop name
        stop: String,
        /// Spoken line name
        #[arg(short, long)]
        line: Option<String>,
        /// Spoken direction or terminus
        #[arg(short, long)]
        direction: Option<String>,
    },
    /// Build a catalog file from the live network
    SyncCatalog {
        /// Where to write the catalog TOML
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,tbm_horaires=info",
        1 => "info,tbm_horaires=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.memory_store {
        config.store.in_memory = true;
    }

    if let Some(Command::SyncCatalog { output }) = &cli.command {
        return sync_catalog(&config, output).await;
    }

    let catalog = Arc::new(config.load_catalog().context("failed to load catalog")?);
    let resolver = Resolver::new(Arc::clone(&catalog), config.resolver);

    match cli.command {
        Some(Command::Resolve { category, fragment }) => {
            resolve(&resolver, category, &fragment);
            Ok(())
        }
        Some(Command::Departures {
            stop,
            line,
            direction,
        }) => departures(&config, &resolver, &stop, line.as_deref(), direction.as_deref()).await,
        Some(Command::SyncCatalog { .. }) => Ok(()),
        None => serve(&config, &catalog, resolver).await,
    }
}

async fn serve(config: &Config, catalog: &Catalog, resolver: Resolver) -> anyhow::Result<()> {
    config
        .validate(catalog)
        .context("invalid configuration")?;

    let store = store::open(&config.store).context("failed to open preference store")?;
    let transit: Arc<dyn DepartureSource> = Arc::new(SiriClient::new(&config.transit)?);
    let handler = Arc::new(IntentHandler::new(
        Arc::new(resolver),
        store,
        transit,
        config.defaults.clone(),
    ));

    tracing::info!(
        port = config.server.port,
        catalog_entries = catalog.len(),
        default_stop = %config.defaults.stop_id,
        api = %config.transit.base_url,
        "starting tbm-horaires"
    );

    ApiServer::new(handler, config.server.port).run().await?;
    Ok(())
}

fn resolve(resolver: &Resolver, category: Category, fragment: &str) {
    match resolver.resolve(category, fragment) {
        Some(found) => println!(
            "{} ({}) [{:?}, distance {}{}]",
            found.entry.canonical_name,
            found.entry.id,
            found.kind,
            found.distance,
            if found.via_alias { ", alias" } else { "" }
        ),
        None => println!("no {category} matches {fragment:?}"),
    }
}

async fn departures(
    config: &Config,
    resolver: &Resolver,
    stop: &str,
    line: Option<&str>,
    direction: Option<&str>,
) -> anyhow::Result<()> {
    let stop = resolver
        .resolve(Category::Stop, stop)
        .with_context(|| format!("unknown stop: {stop}"))?
        .entry;
    let line = line
        .map(|l| {
            resolver
                .resolve(Category::Line, l)
                .map(|m| m.entry)
                .with_context(|| format!("unknown line: {l}"))
        })
        .transpose()?;
    let direction = direction
        .map(|d| {
            resolver
                .resolve_scoped(Category::Direction, d, line.map(|l| l.id.as_str()))
                .map(|m| m.entry)
                .with_context(|| format!("unknown direction: {d}"))
        })
        .transpose()?;

    let mut query = DepartureQuery::new(stop.id.as_str());
    if let Some(line) = line {
        query = query.line(line.id.as_str());
    }
    if let Some(direction_ref) = direction.and_then(CatalogEntry::direction_ref) {
        query = query.direction(direction_ref);
    }

    let client = SiriClient::new(&config.transit)?;
    let records = client.fetch_departures(&query).await?;

    println!("{}", stop.canonical_name);
    if records.is_empty() {
        println!("  no departures in the preview window");
    }
    for record in records {
        let line_name = resolver
            .catalog()
            .get(Category::Line, &record.line)
            .map_or(record.line.as_str(), |l| l.canonical_name.as_str());
        println!(
            "  {:>3} min  {line_name} -> {}",
            record.eta_minutes, record.destination
        );
    }
    Ok(())
}

async fn sync_catalog(config: &Config, output: &Path) -> anyhow::Result<()> {
    let client = SiriClient::new(&config.transit)?;
    let catalog = client
        .discover_catalog(BORDEAUX_BBOX)
        .await
        .context("network discovery failed")?;

    std::fs::write(output, catalog.to_toml_string()?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(
        path = %output.display(),
        entries = catalog.len(),
        "catalog written"
    );
    Ok(())
}
