//! Offline level tools
//!
//! Usage:
//!   cargo run -p xtask -- bake <name>...     # Bake res/editor/<name>.editor to res/level/<name>.level
//!   cargo run -p xtask -- bake --all         # Bake every editable level
//!   cargo run -p xtask -- inspect <file>     # Summarize an .editor or .level file
//!   cargo run -p xtask -- dump-params        # Write the default res/editor/params.ron

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use level_editor::editor::EditorParams;
use level_editor::storage::ResourceDir;
use level_editor::world::{
    build_level, decode_baked, decode_editor, load_editor, save_baked, EDITOR_FORMAT_MAGIC, LEVEL_FORMAT_MAGIC,
    MAX_BAKED_ENTITIES,
};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Offline tools for editor levels")]
struct Cli {
    /// Resource base directory (defaults to the project root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake editable levels into runtime levels
    Bake {
        /// Level names (file stems under res/editor)
        names: Vec<String>,
        /// Bake every level under res/editor
        #[arg(long)]
        all: bool,
    },
    /// Print a summary of an .editor or .level file
    Inspect { file: PathBuf },
    /// Write the default editor params file
    DumpParams {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let cli = Cli::parse();
    let resources = ResourceDir::with_base_dir(cli.root.unwrap_or_else(project_root));

    match cli.command {
        Commands::Bake { names, all } => bake(&resources, names, all),
        Commands::Inspect { file } => inspect(&file),
        Commands::DumpParams { force } => dump_params(&resources, force),
    }
}

/// Get the project root directory
fn project_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().unwrap_or(manifest).to_path_buf()
}

fn bake(resources: &ResourceDir, names: Vec<String>, all: bool) -> Result<()> {
    let names = if all { resources.list_editor_levels() } else { names };
    if names.is_empty() {
        anyhow::bail!("No levels to bake (pass names or --all)");
    }

    let params = EditorParams::load_or_default(&resources.params_path());
    for name in &names {
        let source = resources.editor_path(name);
        let mut level = load_editor(&source, params.max_entities)
            .with_context(|| format!("Failed to load {}", source.display()))?;
        let baked = build_level(&mut level);
        let target = resources.level_path(name);
        let written = save_baked(&baked, &target).with_context(|| format!("Failed to write {}", target.display()))?;
        info!(
            "Baked '{}': {} polygons, {} edges, {} entities, {} bytes.",
            name,
            baked.polygons.len(),
            baked.total_edge_count(),
            baked.entities.len(),
            written
        );
    }
    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let magic = bytes
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .context("File too short for a header")?;

    match magic {
        EDITOR_FORMAT_MAGIC => {
            let level = decode_editor(&bytes, MAX_BAKED_ENTITIES).context("Invalid editor file")?;
            let open = level.edges.edges().iter().filter(|e| e.next.is_none()).count();
            let flipped = level.edges.edges().iter().filter(|e| e.flipped_normal).count();
            println!("{}: editable level", file.display());
            println!("  edges:      {} ({} chain ends, {} flipped)", level.edges.len(), open, flipped);
            println!("  entities:   {}", level.entities.len());
            for entity in level.entities.entities() {
                let b = &entity.bound_box;
                println!(
                    "    {:<14} center ({:.2}, {:.2}) size {:.2}x{:.2} rot {:.1} deg",
                    entity.kind.label(),
                    b.center.x,
                    b.center.y,
                    b.dimensions.x,
                    b.dimensions.y,
                    b.rotation.to_degrees()
                );
            }
        }
        LEVEL_FORMAT_MAGIC => {
            let baked = decode_baked(&bytes).context("Invalid level file")?;
            println!("{}: baked level", file.display());
            println!("  polygons:   {}", baked.polygons.len());
            for (i, polygon) in baked.polygons.iter().enumerate() {
                println!(
                    "    #{:<3} {} edges{}",
                    i,
                    polygon.edges.len(),
                    if polygon.is_open() { " (open)" } else { "" }
                );
            }
            println!("  entities:   {}", baked.entities.len());
        }
        other => anyhow::bail!("Unknown file header {:#010x}", other),
    }
    Ok(())
}

fn dump_params(resources: &ResourceDir, force: bool) -> Result<()> {
    let path = resources.params_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    EditorParams::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
