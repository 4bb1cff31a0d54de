mod cli;
mod commands;
mod config;
mod error;
mod gemini;
mod logging;
mod node;
mod retry;
mod sop;
mod ui;

use clap::Parser;
use cli::{Cli, Command};
use config::PebbleConfig;
use error::PebbleError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = run(cli).await {
        ui::report_error(&err);
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), PebbleError> {
    let config = PebbleConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Sop(args) => commands::render_sop(args, &config),
        Command::Image(args) => commands::generate_image(args, &config).await,
        Command::Nodes { class_type } => commands::list_nodes(class_type.as_deref()),
    }
}
