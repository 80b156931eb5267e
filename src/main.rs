use clap::Parser;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dot_tasks::cli;
use dot_tasks::cli::commands::{Cli, Commands};

fn init_tracing() {
    // Diagnostics are opt-in; stdout stays reserved for command output.
    let filter = std::env::var("DOT_TASKS_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let cli_args = Cli::parse();
    let json_output = cli_args.json;
    let root_flag = cli_args.tasks_root.clone();
    let root_flag = root_flag.as_deref();

    let exit_code = match cli_args.command {
        Commands::Init(args) => cli::init::run(args, json_output, root_flag),
        Commands::List(args) => cli::list::run_list(args, json_output, root_flag),
        Commands::Tags(args) => cli::list::run_tags(args, json_output, root_flag),
        cmd => cli::task::run(cmd, json_output, root_flag),
    };

    process::exit(exit_code);
}
