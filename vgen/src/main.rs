//! vgen - batch view generator for loudspeaker-management projects
//!
//! Scans a directory for project files, copies each to a `_AUTO` sibling and
//! regenerates the generated groups, views and controls inside the copy from
//! the template library. The source projects are never written to.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vgen_common::db;
use vgen::TemplateStore;

const TEMPLATE_FILE: &str = "templates.r2t";
const LOG_DIR: &str = "LOGS";

#[derive(Parser, Debug)]
#[command(name = "vgen", version, about = "Generate meter/master views and groups for loudspeaker-management projects")]
struct Args {
    /// Directory holding the project files and templates.r2t
    #[arg(default_value = ".", env = "VGEN_DIR")]
    directory: PathBuf,

    /// Only strip previously generated rows from the _AUTO copies
    #[arg(long)]
    clean_only: bool,
}

fn init_logging(directory: &Path) -> Result<()> {
    let log_dir = directory.join(LOG_DIR);
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Local::now().format("%d-%b-%Y-%H-%M-%S");
    let log_path = log_dir.join(format!("{timestamp}-vgen.txt"));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("could not create {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(log_file)),
        )
        .init();

    Ok(())
}

/// Project files in the directory, excluding earlier generated copies.
fn find_projects(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut projects = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".dbpr") && !name.contains("_AUTO") {
            projects.push(path);
        }
    }
    projects.sort();
    Ok(projects)
}

fn auto_copy_path(project: &Path) -> PathBuf {
    let stem = project
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    project.with_file_name(format!("{stem}_AUTO.dbpr"))
}

async fn process_project(
    project: &Path,
    store: Option<&TemplateStore>,
) -> Result<()> {
    let auto_path = auto_copy_path(project);
    std::fs::copy(project, &auto_path)
        .with_context(|| format!("could not copy to {}", auto_path.display()))?;

    let pool = db::open_project(&auto_path).await?;

    if !db::project::is_initialised(&pool).await? {
        pool.close().await;
        std::fs::remove_file(&auto_path).ok();
        bail!(
            "Initial setup has not been run for {}. Open the file in the host tool, perform the initial group and view creation, save, then re-run.",
            project.display()
        );
    }

    let result = match store {
        Some(store) => vgen::generate(&pool, store).await,
        None => vgen::cleanup::clean_project(&pool).await,
    };
    pool.close().await;
    result?;

    info!("Finished {}", auto_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.directory)?;
    info!(
        "Starting vgen v{} in {}",
        env!("CARGO_PKG_VERSION"),
        args.directory.display()
    );

    let projects = find_projects(&args.directory)?;
    info!("Found {} projects in folder", projects.len());

    let store = if args.clean_only {
        None
    } else {
        let template_path = args.directory.join(TEMPLATE_FILE);
        let template_pool = db::open_templates(&template_path)
            .await
            .with_context(|| format!("could not open {}", template_path.display()))?;
        let store = TemplateStore::load(&template_pool).await?;
        template_pool.close().await;
        Some(store)
    };

    let mut failures = 0;
    for project in &projects {
        if let Err(e) = process_project(project, store.as_ref()).await {
            error!("{}: {:#}", project.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} project(s) failed");
    }
    Ok(())
}
