//! Automatically downloads and configures Steam grid images for all games in
//! a given Steam installation.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use steamgrid_grid::{Game, SourceResolver, load_overlays};
use steamgrid_pipeline::{GameSource, Pipeline, PipelineEvent};
use steamgrid_steam::{Library, Paths, SteamError, User, get_users};

#[derive(Debug, Parser)]
#[command(
    name = "steamgrid",
    about = "Downloads grid images for every game in a Steam library and applies category overlays"
)]
struct Args {
    /// Steam installation directory. Auto-detected when omitted.
    steam_dir: Option<PathBuf>,

    /// Directory of category overlay images. Defaults to "overlays by
    /// category" next to the executable.
    #[arg(long)]
    overlays: Option<PathBuf>,
}

/// Adapts the community-profile library client to the pipeline seam.
struct ProfileSource {
    library: Library,
    paths: Paths,
}

#[async_trait::async_trait]
impl GameSource for ProfileSource {
    async fn games(&self, user: &User) -> Result<Vec<Game>, SteamError> {
        self.library.get_games(&self.paths, user).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let overlay_dir = match args.overlays {
        Some(dir) => dir,
        None => default_overlay_dir()?,
    };
    let overlays = load_overlays(&overlay_dir).context("failed to load overlays")?;
    if overlays.is_empty() {
        println!(
            "No category overlays found. You can put overlay images in '{}', \
             where the filename is the game category. Continuing without overlays...",
            overlay_dir.display()
        );
    }

    let paths = match args.steam_dir {
        Some(dir) => {
            if !dir.is_dir() {
                bail!(
                    "argument must be a valid Steam directory, or empty for auto detection; got: {}",
                    dir.display()
                );
            }
            Paths::with_base(dir)
        }
        None => Paths::new().context("could not find the Steam installation folder")?,
    };

    let users = get_users(&paths).context("failed to list Steam users")?;
    if users.is_empty() {
        bail!("no users found at Steam/userdata; has Steam been used on this computer?");
    }
    tracing::info!(users = users.len(), "found Steam users");

    let mut pipeline = Pipeline::new(SourceResolver::new()?, overlays);
    let mut events = pipeline
        .take_events()
        .context("pipeline events already taken")?;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PipelineEvent::Status { status } => println!("{status}"),
                PipelineEvent::Progress { status, .. } => println!("{status}"),
            }
        }
    });

    let source = ProfileSource {
        library: Library::new()?,
        paths: paths.clone(),
    };
    let report = pipeline.run(&paths, &users, &source).await?;

    drop(pipeline);
    let _ = printer.await;

    println!("\n{}", report.summary());
    Ok(())
}

fn default_overlay_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the executable")?;
    let dir = exe
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(dir.join("overlays by category"))
}
