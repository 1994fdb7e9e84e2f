//! sanctuary-guide CLI
//!
//! Walk someone through what to do about an animal they found, check
//! guidance trees, and arrange the episode catalogue.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sanctuary_guide::config::{Overrides, Settings, load_settings};
use sanctuary_guide::digest::digest_flow;
use sanctuary_guide::episodes::strategies;
use sanctuary_guide::found_animal::{bundled, bundled_tree};
use sanctuary_guide::grouping::{Selection, arrange};
use sanctuary_guide::load::{find_trees, load_catalogue, load_tree};
use sanctuary_guide::navigator::Navigator;
use sanctuary_guide::report::{format_arrangement, format_tree_reports, format_walk};
use sanctuary_guide::tree::FlowTree;
use sanctuary_guide::tui;
use sanctuary_guide::types::{FlowNode, OutputFormat, TreeReport, WalkReport};
use sanctuary_guide::validate::{ValidTree, ValidateConfig, ValidationError, validate};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SANCTUARY_GUIDE_LOG";

#[derive(Parser)]
#[command(name = "sanctuary-guide")]
#[command(about = "Found-animal guidance and episode catalogue tools")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/sanctuary-guide/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the guidance interactively
    Guide {
        /// Tree file to use instead of the bundled one
        #[arg(long)]
        tree: Option<PathBuf>,
    },

    /// Check tree files for structural defects
    Validate {
        /// Tree file or directory of *.json trees (default: configured or bundled tree)
        path: Option<PathBuf>,

        /// Maximum number of selections from the root
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Follow options non-interactively and print where you end up
    Walk {
        /// Tree file to use instead of the bundled one
        #[arg(long)]
        tree: Option<PathBuf>,

        /// Option to take, repeatable, applied in order
        #[arg(long = "choose", value_name = "NAME")]
        choose: Vec<String>,

        /// Steps to go back after the choices
        #[arg(long, default_value_t = 0)]
        back: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Print the bundled tree as JSON
    Export {
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Arrange an episode catalogue by a sort strategy
    Episodes {
        /// Catalogue file (JSON array, oldest first)
        file: PathBuf,

        /// Strategy key: all, classification, broadcast
        #[arg(long)]
        sort_by: Option<String>,

        /// Only list this group
        #[arg(long)]
        group: Option<String>,

        /// Shared link fragment such as "broadcast:2021"
        #[arg(long, conflicts_with_all = ["sort_by", "group"])]
        anchor: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The TUI owns the terminal; log lines would tear the screen.
    if !matches!(cli.command, Commands::Guide { .. }) {
        init_logging(cli.verbose);
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Guide { tree } => cmd_guide(config, tree),
        Commands::Validate { path, max_depth, format } => {
            cmd_validate(config, path, max_depth, format.into())
        }
        Commands::Walk { tree, choose, back, format } => {
            cmd_walk(config, tree, &choose, back, format.into())
        }
        Commands::Export { pretty } => cmd_export(pretty),
        Commands::Episodes { file, sort_by, group, anchor, format } => {
            cmd_episodes(config, &file, sort_by, group, anchor, format.into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// TREE RESOLUTION
// ============================================================================

fn settings(config: Option<&Path>, overrides: Overrides) -> Result<Settings, String> {
    load_settings(config, overrides).map_err(|e| e.to_string())
}

/// The configured tree, or the bundled one, validated.
fn resolve_tree(settings: &Settings) -> Result<ValidTree, String> {
    let Some(path) = &settings.tree else {
        return bundled_tree().map_err(|e| format!("bundled tree is invalid: {}", e));
    };

    let flow = load_tree(path).map_err(|e| e.to_string())?;
    validate(FlowTree::from_flow(&flow), &settings.validate_config())
        .map_err(|e| format!("{} is not a usable tree: {}", path.display(), e))
}

/// Validate one source without stopping at the first problem.
fn check_tree(source: String, flow: Result<FlowNode, String>, config: &ValidateConfig) -> TreeReport {
    let flow = match flow {
        Ok(flow) => flow,
        Err(e) => {
            return TreeReport {
                source,
                digest: None,
                stats: None,
                defects: vec![e],
            };
        }
    };

    let digest = digest_flow(&flow).ok();
    let (stats, defects) = match validate(FlowTree::from_flow(&flow), config) {
        Ok(valid) => (Some(valid.stats()), Vec::new()),
        Err(ValidationError::StructuralDefect(defects)) => {
            (None, defects.iter().map(ToString::to_string).collect())
        }
    };

    TreeReport {
        source,
        digest,
        stats,
        defects,
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn cmd_guide(config: Option<&Path>, tree: Option<PathBuf>) -> Result<(), String> {
    let settings = settings(config, Overrides { tree, ..Default::default() })?;
    let tree = resolve_tree(&settings)?;
    tui::run(&tree).map_err(|e| format!("terminal error: {}", e))
}

fn cmd_validate(
    config: Option<&Path>,
    path: Option<PathBuf>,
    max_depth: Option<usize>,
    format: OutputFormat,
) -> Result<(), String> {
    let settings = settings(config, Overrides { max_depth, ..Default::default() })?;
    let validate_config = settings.validate_config();

    let reports: Vec<TreeReport> = match path.or_else(|| settings.tree.clone()) {
        Some(root) => {
            let files = find_trees(&root, None).map_err(|e| e.to_string())?;
            if files.is_empty() {
                return Err(format!("no *.json tree files under {}", root.display()));
            }
            files
                .into_iter()
                .map(|file| {
                    let flow = load_tree(&file).map_err(|e| e.to_string());
                    check_tree(file.display().to_string(), flow, &validate_config)
                })
                .collect()
        }
        None => vec![check_tree("bundled".into(), Ok(bundled()), &validate_config)],
    };

    print!("{}", format_tree_reports(&reports, format));

    let invalid = reports.iter().filter(|r| !r.is_valid()).count();
    if invalid > 0 {
        return Err(format!("{} of {} trees have defects", invalid, reports.len()));
    }
    Ok(())
}

fn cmd_walk(
    config: Option<&Path>,
    tree: Option<PathBuf>,
    choose: &[String],
    back: usize,
    format: OutputFormat,
) -> Result<(), String> {
    let settings = settings(config, Overrides { tree, ..Default::default() })?;
    let tree = resolve_tree(&settings)?;
    let mut nav = Navigator::new(&tree);

    for name in choose {
        nav.select_option(name).map_err(|e| e.to_string())?;
    }
    for _ in 0..back {
        nav.back().map_err(|e| e.to_string())?;
    }
    debug!(depth = nav.depth(), "walk finished");

    let report = WalkReport {
        path: nav.breadcrumbs().into_iter().map(str::to_string).collect(),
        prompt: nav.current_prompt().to_vec(),
        options: nav.available_options().into_iter().map(str::to_string).collect(),
        terminal: nav.is_terminal(),
    };
    print!("{}", format_walk(&report, format));
    Ok(())
}

fn cmd_export(pretty: bool) -> Result<(), String> {
    let tree = bundled_tree().map_err(|e| format!("bundled tree is invalid: {}", e))?;
    let flow = tree.to_flow();
    let json = if pretty {
        serde_json::to_string_pretty(&flow)
    } else {
        serde_json::to_string(&flow)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn cmd_episodes(
    config: Option<&Path>,
    file: &Path,
    sort_by: Option<String>,
    group: Option<String>,
    anchor: Option<String>,
    format: OutputFormat,
) -> Result<(), String> {
    let settings = settings(config, Overrides { strategy: sort_by, ..Default::default() })?;
    let episodes = load_catalogue(file).map_err(|e| e.to_string())?;

    let selection = match anchor {
        Some(fragment) => Selection::parse(&fragment)
            .ok_or_else(|| format!("empty anchor {:?}", fragment))?,
        None => {
            let selection = Selection::new(settings.default_strategy);
            match group {
                Some(group) => selection.with_group(group),
                None => selection,
            }
        }
    };

    let registry = strategies();
    let projection = arrange(&episodes, &registry, &selection).map_err(|e| e.to_string())?;
    print!("{}", format_arrangement(&projection, format));
    Ok(())
}
