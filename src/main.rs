//! Co-Simulation Support Lane CLI
//!
//! Entry point for the `cosim-lane` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cosim_lane::cleanup::CleanupRun;
use cosim_lane::config::{default_config_path, EffectiveConfig, LaneConfig};
use cosim_lane::hooks::{self, SimTime};
use cosim_lane::pipeline::{run_transform, TransformRequest};
use cosim_lane::support::{check_path_length, rename_result_file};

#[derive(Parser)]
#[command(name = "cosim-lane")]
#[command(about = "Co-simulation support lane", version)]
struct Cli {
    /// Path to the lane config file (default: .cosim/lane.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve global parameters, patch fragments, inject the assembly block
    Transform {
        /// Per-module parameter fragments
        #[arg(required = true)]
        fragments: Vec<PathBuf>,

        /// Top-level assembly file with the parameter placeholder
        #[arg(long, short = 'a')]
        assembly: PathBuf,

        /// Provenance log path (default: next to the assembly)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Record the before-snapshot of a run directory
    Snapshot {
        /// Run directory (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Remove files created since the before-snapshot
    Cleanup {
        /// Run directory (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// List candidates without removing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check paths against the host's path-length limit
    CheckPaths {
        /// Paths to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Rename a run's result file to <timestamp>__<configuration>.<ext>
    RenameResult {
        /// Result file written by the run
        result: PathBuf,

        /// Configuration name embedded in the new filename
        configuration: String,
    },

    /// Print the effective configuration with layer provenance
    Config,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let effective = match EffectiveConfig::build(Some(&config_path)) {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let lane = match effective.lane() {
        Ok(lane) => lane,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    init_tracing(&lane);

    match cli.command {
        Commands::Transform {
            fragments,
            assembly,
            log,
        } => run_transform_cmd(&lane, fragments, assembly, log),
        Commands::Snapshot { dir } => run_snapshot(&lane, dir),
        Commands::Cleanup { dir, dry_run } => run_cleanup(&lane, dir, dry_run),
        Commands::CheckPaths { paths } => run_check_paths(&lane, paths),
        Commands::RenameResult {
            result,
            configuration,
        } => run_rename_result(&lane, result, configuration),
        Commands::Config => run_show_config(&effective),
    }
}

fn init_tracing(lane: &LaneConfig) {
    let filter = EnvFilter::try_new(&lane.log_filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_transform_cmd(
    lane: &LaneConfig,
    fragments: Vec<PathBuf>,
    assembly: PathBuf,
    log: Option<PathBuf>,
) {
    let provenance_log = log.unwrap_or_else(|| {
        assembly
            .parent()
            .unwrap_or_else(|| std::path::Path::new(""))
            .join(&lane.params.provenance_log)
    });

    let request = TransformRequest {
        fragments,
        assembly,
        provenance_log,
    };
    match run_transform(&request) {
        Ok(outcome) => {
            eprintln!(
                "Resolved {} declaration(s): {} global, {} inherited{}",
                outcome.declarations,
                outcome.globals,
                outcome.inherited,
                if outcome.injected {
                    ""
                } else {
                    " (assembly block not injected)"
                }
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_snapshot(lane: &LaneConfig, dir: PathBuf) {
    let status = hooks::pre_init(SimTime::new(0.0), lane, &dir);
    if status != hooks::HookStatus::Continue {
        process::exit(status.code());
    }
    eprintln!("Snapshot written: {}", lane.snapshot_path(&dir).display());
}

fn run_cleanup(lane: &LaneConfig, dir: PathBuf, dry_run: bool) {
    let mut policy = lane.removal.clone();
    if dry_run {
        policy = policy.with_dry_run();
    }

    let snapshot_path = lane.snapshot_path(&dir);
    let result = CleanupRun::new(dir, policy).execute(&snapshot_path);
    eprintln!(
        "Cleanup: {} candidate(s), {} removed, {} left in place",
        result.candidates,
        result.removed,
        result.left_in_place.len()
    );
}

fn run_check_paths(lane: &LaneConfig, paths: Vec<PathBuf>) {
    let mut failed = false;
    for path in &paths {
        if !check_path_length(path, lane.max_path_length) {
            failed = true;
        }
    }
    if failed {
        process::exit(1);
    }
    eprintln!("All {} path(s) within limit", paths.len());
}

fn run_rename_result(lane: &LaneConfig, result: PathBuf, configuration: String) {
    match rename_result_file(&result, &configuration, &lane.result.default_extension) {
        Ok(Some(target)) => eprintln!("Renamed to {}", target.display()),
        Ok(None) => eprintln!("Nothing to rename"),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(30);
        }
    }
}

fn run_show_config(effective: &EffectiveConfig) {
    match serde_json::to_string_pretty(effective) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
