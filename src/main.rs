use cascade_rail::commands;
use cascade_rail::core::context::FamilyContext;
use cascade_rail::core::error::{CascadeError, CascadeResult, print_error};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Cascade releases for multi-module project families
#[derive(Parser)]
#[command(name = "cascade")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Family root directory (default: current directory)
  #[arg(short = 'C', long = "dir", global = true)]
  dir: Option<PathBuf>,

  /// Increase log verbosity (-v info, -vv debug); CASCADE_LOG overrides
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Setup & Inspection
  // ============================================================================
  /// Create a new family: mint identities and write cascade.toml
  Init {
    /// Family name
    #[arg(long)]
    name: String,
    /// Layout project name (default: <name>-layout)
    #[arg(long)]
    layout: Option<String>,
    /// Cascade project name (default: <name>-cascade)
    #[arg(long)]
    cascade: Option<String>,
  },

  /// Show versions and unreleased declarations of every member
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Copy a member project under a new name with a fresh project ID
  Duplicate {
    /// Member project to copy
    project: String,
    /// Name of the copy
    new_project: String,
  },

  // ============================================================================
  // Releases
  // ============================================================================
  /// Show what a cascade release of a module would release, in order
  Plan {
    /// Artifact of the module to release
    artifact: String,
    /// Group of the module (needed when the artifact is ambiguous)
    #[arg(long)]
    group: Option<String>,
    /// Output plan in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Release a module and everything it needs
  Release {
    /// Artifact of the module to release
    artifact: String,
    /// Group of the module (needed when the artifact is ambiguous)
    #[arg(long)]
    group: Option<String>,
    /// Actually run the cascade (default: dry-run showing the plan)
    #[arg(long)]
    apply: bool,
    /// Output in JSON format (useful for CI/automation)
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: u8) {
  let default = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_env("CASCADE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let root = match cli.dir {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(e.into()),
    },
  };

  let result = match cli.command {
    // init runs before cascade.toml exists
    Commands::Init { name, layout, cascade } => commands::run_init(&root, &name, layout, cascade),
    Commands::Status { json } => with_family(&root, |ctx| commands::run_status(ctx, json)),
    Commands::Duplicate { project, new_project } => {
      with_family(&root, |ctx| commands::run_duplicate(ctx, &project, &new_project))
    }
    Commands::Plan { artifact, group, json } => {
      with_family(&root, |ctx| commands::run_plan(ctx, &artifact, group.as_deref(), json))
    }
    Commands::Release {
      artifact,
      group,
      apply,
      json,
    } => with_family(&root, |ctx| {
      commands::run_release(ctx, &artifact, group.as_deref(), apply, json)
    }),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

/// Load the family once and hand it to a command
fn with_family<F>(root: &Path, command: F) -> CascadeResult<()>
where
  F: FnOnce(&FamilyContext) -> CascadeResult<()>,
{
  let ctx = FamilyContext::build(root)?;
  command(&ctx)
}

fn handle_error(err: CascadeError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
