use clap::Parser;

use jzip::cli::{Cli, CliHandler};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(format!("jzip={}", log_level));
    subscriber.init();

    let mut handler = CliHandler::with_config_path(cli.config);

    if let Err(e) = handler.execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
