use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use merge_up::cli::orchestration::{self, MajorWorkflowArgs, PlanWorkflowArgs};
use merge_up::{config, ui};

#[derive(Parser)]
#[command(
    name = "merge-up",
    version,
    about = "Resolve platform major release lines and plan merge-up branch chains"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Repository metadata catalog (JSON)")]
    catalog: Option<String>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v info, -vv debug)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan the merge-up chain of a repository snapshot
    Plan {
        #[arg(help = "Repository snapshot file (JSON)")]
        snapshot: String,

        #[arg(long, help = "Print the plan as JSON")]
        json: bool,
    },
    /// Resolve the platform major line of a branch
    Major {
        #[arg(long, help = "Repository reference (org/name)")]
        repo: String,

        #[arg(long, help = "Branch to resolve")]
        branch: String,

        #[arg(long, help = "Dependency manifest of the branch (composer.json)")]
        manifest: Option<String>,

        #[arg(long, help = "Fall back on the runtime requirement of the manifest")]
        runtime_fallback: bool,

        #[arg(long, help = "Accept a same-named repository from another organisation")]
        partial: bool,

        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },
    /// List packages released in lock-step with the platform
    Lockstepped,
    /// Check the catalog for schema problems
    Validate,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    let verbose = args.verbose > 0;

    match args.command {
        Command::Plan { snapshot, json } => {
            let workflow_args = PlanWorkflowArgs {
                catalog_path: args.catalog,
                snapshot_path: snapshot,
            };
            let plan = orchestration::run_plan_workflow(&workflow_args, &config)?;
            if json {
                ui::print_json(&plan)?;
            } else {
                ui::display_plan(&plan, verbose);
            }
        }
        Command::Major {
            repo,
            branch,
            manifest,
            runtime_fallback,
            partial,
            json,
        } => {
            let workflow_args = MajorWorkflowArgs {
                catalog_path: args.catalog,
                repository: repo,
                branch,
                manifest_path: manifest,
                runtime_fallback,
                partial_match: partial,
            };
            let result = orchestration::run_major_workflow(&workflow_args, &config)?;
            if json {
                ui::print_json(&result)?;
            } else {
                ui::display_major_line(
                    &result.repository,
                    &result.branch,
                    result.major_line.as_deref(),
                );
            }
        }
        Command::Lockstepped => {
            let catalog = orchestration::load_catalog(args.catalog.as_deref(), &config)?;
            ui::display_lockstepped(&catalog.lockstepped_repositories());
        }
        Command::Validate => {
            let catalog = orchestration::load_catalog(args.catalog.as_deref(), &config)?;
            let problems = catalog.problems();
            if !problems.is_empty() {
                ui::display_catalog_problems(&problems);
                anyhow::bail!("Catalog has {} problem(s)", problems.len());
            }
            ui::display_success(&format!(
                "Catalog is valid ({} repositories)",
                catalog.len()
            ));
        }
    }

    Ok(())
}
