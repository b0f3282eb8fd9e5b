use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::Path;

mod model;
mod render;
mod routing;
mod spec;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "topo-matrix")]
#[command(about = "Broadcast-tree routing matrix generator", long_about = None)]
struct Cli {
    /// Log every schedule decision (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all models and write model.h and model_defs.h.
    Generate {
        #[arg(long)]
        topo: String,

        #[arg(short = 'o', long, default_value = ".")]
        out_dir: String,
    },

    /// Build all models without writing headers and print a summary.
    Check {
        #[arg(long)]
        topo: String,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG, when set, overrides the level picked here.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Generate { topo, out_dir } => {
            // 1) Parse + validate topology.json.
            let validated = spec::load_topology(&topo)?.validate_and_build()?;

            // 2) Build every model; any structural error aborts before output.
            let build = model::build_topology(&validated)?;

            // 3) Render both headers in memory, then write them.
            let model_h = render::render_model(&build)?;
            let defs_h = render::render_model_defs(&build)?;

            let out_dir = Path::new(&out_dir);
            std::fs::create_dir_all(out_dir)
                .with_context(|| format!("create output directory {}", out_dir.display()))?;
            for (name, text) in [
                (render::MODEL_FILE, model_h),
                (render::MODEL_DEFS_FILE, defs_h),
            ] {
                let path = out_dir.join(name);
                std::fs::write(&path, text)
                    .with_context(|| format!("write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
        Commands::Check { topo, json } => {
            let validated = spec::load_topology(&topo)?.validate_and_build()?;
            let build = model::build_topology(&validated)?;
            let summary = build.summary();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} ({}): {} cores, {} shm regions",
                    summary.machine,
                    summary.topology,
                    summary.cores.len(),
                    summary.shm_regions_used
                );
                for entry in &summary.cores {
                    println!("  {:>3}  {}", entry.index, entry.core);
                }
                for m in &summary.models {
                    println!(
                        "model {}: root {}, last node {}, leaves [{}], {} routed cells",
                        m.name,
                        m.root,
                        m.last_node,
                        m.leaf_nodes
                            .iter()
                            .map(|l| l.to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                        m.routed_cells
                    );
                }
            }
        }
    }

    Ok(())
}
