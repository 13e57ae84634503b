mod client;
mod platform;
mod scan;
mod server;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sa_core::time::now_unix_millis;
use sa_core::{RawCatalog, SessionPlan, assign, result_filename};
use sa_store::{Settings, Uploader};

#[derive(Parser)]
#[command(name = "sa", about = "Stimulus assignment and result upload for the scene/sound study")]
struct Cli {
    /// Settings file (default: $SA_DATA_DIR/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign stimuli for one session and write the session plan as JSON
    Assign(AssignArgs),

    /// Build a catalog from a stimulus directory tree and print it as TOML
    Scan {
        /// Directory holding <MAJOR>/<minor>/ scene folders
        #[arg(long)]
        scenes: PathBuf,

        /// Directory holding sound files
        #[arg(long)]
        sounds: Option<PathBuf>,
    },

    /// Serve the result-upload endpoints over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8888")]
        addr: SocketAddr,
    },

    /// Upload a result CSV
    Upload {
        /// CSV file to upload
        file: PathBuf,

        /// Participant initials used to build the result file name
        #[arg(long)]
        initials: Option<String>,

        /// Explicit result file name
        #[arg(long, conflicts_with = "initials")]
        name: Option<String>,

        /// POST to a running save endpoint instead of the configured backend
        #[arg(long)]
        server: Option<String>,
    },
}

#[derive(Args)]
struct AssignArgs {
    /// Catalog file (.toml or .json)
    #[arg(long)]
    catalog: PathBuf,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Learned pairs per base set
    #[arg(long)]
    pairs: Option<usize>,

    /// Singleton sounds per base set
    #[arg(long)]
    singletons: Option<usize>,

    /// Images sampled from each category
    #[arg(long)]
    per_category: Option<usize>,

    /// Fixed number of block-sequence repetitions
    #[arg(long)]
    repetitions: Option<usize>,

    /// Rest-separated learning blocks
    #[arg(long)]
    learning_blocks: Option<usize>,

    /// Rest-separated image-test blocks
    #[arg(long)]
    image_test_blocks: Option<usize>,

    /// Write the plan here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
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

fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(cli.config.as_deref()).context("failed to load settings")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Assign(args) => cmd_assign(&cli, args),
        Commands::Scan { scenes, sounds } => cmd_scan(scenes, sounds.as_deref()),
        Commands::Serve { addr } => cmd_serve(&cli, *addr).await,
        Commands::Upload {
            file,
            initials,
            name,
            server,
        } => {
            cmd_upload(
                &cli,
                file,
                initials.as_deref(),
                name.as_deref(),
                server.as_deref(),
            )
            .await
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_catalog(path: &Path) -> Result<RawCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON catalog {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML catalog {}", path.display()))
    }
}

fn cmd_assign(cli: &Cli, args: &AssignArgs) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut design = settings.design;
    if let Some(n) = args.pairs {
        design.pairs = n;
    }
    if let Some(n) = args.singletons {
        design.singletons = n;
    }
    if let Some(n) = args.per_category {
        design.images_per_category = n;
    }
    if args.repetitions.is_some() {
        design.repetitions = args.repetitions;
    }
    let mut layout = settings.layout;
    if let Some(n) = args.learning_blocks {
        layout.learning_blocks = n;
    }
    if let Some(n) = args.image_test_blocks {
        layout.image_test_blocks = n;
    }

    let raw = load_catalog(&args.catalog)?;
    let (images, sounds) = raw.build().context("invalid catalog")?;
    tracing::info!(
        "catalog: {} categories, {} images, {} sounds",
        images.categories().len(),
        images.len(),
        sounds.len()
    );

    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let assignment = assign(&images, &sounds, &design, &mut rng).context("assignment failed")?;
    for warning in &assignment.warnings {
        tracing::warn!("{warning}");
    }

    let plan = SessionPlan::build(&assignment, &layout, &mut rng);
    let json = plan.to_json().context("failed to serialize session plan")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "wrote {}: {} learning trials in {} blocks, {} image test items, {} sound test items",
                path.display(),
                plan.learning_trial_count(),
                plan.learning_blocks.len(),
                assignment.image_battery.len(),
                plan.sound_test.len()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_scan(scenes: &Path, sounds: Option<&Path>) -> Result<()> {
    let catalog = scan::scan_catalog(scenes, sounds)?;
    let text = toml::to_string_pretty(&catalog).context("failed to serialize catalog")?;
    print!("{text}");
    Ok(())
}

async fn cmd_serve(cli: &Cli, addr: SocketAddr) -> Result<()> {
    let settings = load_settings(cli)?;
    let backend = settings
        .backend()
        .context("failed to configure upload backend")?;
    tracing::info!("starting server with {} backend", backend.name());

    server::serve(addr, Arc::new(backend)).await
}

async fn cmd_upload(
    cli: &Cli,
    file: &Path,
    initials: Option<&str>,
    name: Option<&str>,
    server_url: Option<&str>,
) -> Result<()> {
    let csv = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let filename = match (name, initials) {
        (Some(name), _) => name.to_string(),
        (None, Some(initials)) => result_filename(initials, now_unix_millis()),
        (None, None) => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .context("upload path has no file name")?,
    };

    if let Some(url) = server_url {
        let client = reqwest::Client::new();
        let reply = client::save_csv_to_server(&client, url, &filename, &csv).await?;
        let message = reply
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("saved");
        println!("{message} ({filename})");
        return Ok(());
    }

    let settings = load_settings(cli)?;
    let backend = settings
        .backend()
        .context("failed to configure upload backend")?;
    let stored = backend
        .upload(&filename, &csv)
        .await
        .with_context(|| format!("failed to upload via {} backend", backend.name()))?;
    println!("saved {} (id {})", stored.name, stored.id);
    Ok(())
}
