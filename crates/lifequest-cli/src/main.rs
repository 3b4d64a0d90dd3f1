//! Lifequest CLI - Command-line front end for the Lifequest gamification core.

use clap::Parser;
use lifequest_cli::{commands, Cli, Config, Formatter, Session};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> lifequest_cli::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let mut session = Session::open(&config, cli.user)?;
    tracing::debug!(user = %session.user, "session opened");

    for line in commands::execute(cli.command, &mut session, &formatter)? {
        if !line.is_empty() {
            println!("{}", line);
        }
    }

    Ok(())
}
