mod filter;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tabview_state::{Graph, TabState, ViewerConfig, load_view_data};

use crate::filter::{FilterArgs, FilterOp};

#[derive(Parser)]
#[command(name = "tabview", about = "Browse data tab configuration and filter selections")]
struct Cli {
    /// Directory holding tabview.toml and the tab JSON files
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tabs as slug and label
    Tabs,

    /// Print the normalized content of a tab
    Show {
        /// Tab slug (defaults to `default_tab` from tabview.toml)
        slug: Option<String>,
    },

    /// List data source ids
    Sources,

    /// Apply a selection operation to comma-separated key lists
    Filter {
        #[arg(value_enum)]
        op: FilterOp,

        #[command(flatten)]
        args: FilterArgs,
    },
}

fn config_dir(cli: &Cli) -> PathBuf {
    cli.config_dir
        .clone()
        .or_else(|| std::env::var("TABVIEW_CONFIG_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Tabs => cmd_tabs(&cli),
        Commands::Show { slug } => cmd_show(&cli, slug.as_deref()),
        Commands::Sources => cmd_sources(&cli),
        Commands::Filter { op, args } => filter::run(*op, args),
    }
}

/// Load configuration and write it into a fresh graph.
fn open_graph(dir: &Path) -> Result<(Graph, TabState, ViewerConfig)> {
    let config = ViewerConfig::load(dir).context("failed to load viewer config")?;
    let data = load_view_data(&config).context("failed to load data view configuration")?;

    let mut graph = Graph::new();
    let state = TabState::register(&mut graph);
    state.load(&mut graph, data)?;
    Ok((graph, state, config))
}

fn cmd_tabs(cli: &Cli) -> Result<()> {
    let (graph, state, _) = open_graph(&config_dir(cli))?;
    let summaries = graph
        .read(&state.tab_summaries)
        .into_result(state.tab_summaries.name())?;

    if summaries.is_empty() {
        println!("(no tabs)");
    }
    for tab in summaries.iter() {
        println!("{}\t{}", tab.slug, tab.label);
    }
    Ok(())
}

fn cmd_show(cli: &Cli, slug: Option<&str>) -> Result<()> {
    let (mut graph, state, config) = open_graph(&config_dir(cli))?;

    let Some(slug) = slug.or(config.default_tab.as_deref()) else {
        bail!("no tab slug given and no default_tab configured");
    };
    state.navigate(&mut graph, slug)?;

    let content = graph
        .read(&state.active_tab_content)
        .into_result(state.active_tab_content.name())?;
    let json = serde_json::to_string_pretty(&*content)
        .context("failed to serialize tab content")?;
    println!("{json}");

    if cli.verbose {
        let dims: Vec<String> = content.all_selects().map(|p| p.to_string()).collect();
        eprintln!("--- tab: {slug}, dimensions: {} ---", dims.join(", "));
    }
    Ok(())
}

fn cmd_sources(cli: &Cli) -> Result<()> {
    let (graph, state, _) = open_graph(&config_dir(cli))?;
    let sources = graph
        .peek(&state.all_data_sources)
        .into_result(state.all_data_sources.name())?;

    for source in sources.iter() {
        println!("{}\t{}", source.id, source.display_name());
    }
    Ok(())
}
