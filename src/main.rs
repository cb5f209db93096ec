use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = tally::cli::Cli::parse();

    match cli.command.clone() {
        Some(tally::cli::CliCommand::Tui) | None => {
            let config = tally::config::from_cli(&cli)?;
            tally::tui::run(config)?;
        }
        Some(command) => {
            init_tracing();
            let config = tally::config::from_cli(&cli)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            tally::commands::execute(&config, command, &mut handle)?;
        }
    }

    Ok(())
}

// The TUI owns the terminal, so logging stays off there; CLI commands get
// a compact subscriber driven by TALLY_LOG.
fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_env_var("TALLY_LOG")
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init();
}
