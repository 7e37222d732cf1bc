mod cli;
mod commands;
mod config;
mod host;
mod utils;

use crate::cli::{Commands, TypenavCli};
use crate::config::Settings;
use crate::host::TypeHost;
use anyhow::Result;
use std::io::Write;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = TypenavCli::parse_args();
    let settings = Settings::load(cli.config.as_deref())?.with_overrides(&cli);
    let _guards = logging::init(settings.log_mode()?, cli.verbose)?;

    let cancellation_token = CancellationToken::new();
    let host = TypeHost::build(&settings, &cancellation_token);

    let mut stdout = std::io::stdout();
    let exit_code = match cli.command {
        Commands::List(args) => {
            commands::list::run(&host.engine, &args, cli.json, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Commands::Item(args) => {
            commands::item::run(&host.engine, &args, cli.json, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Commands::Properties(args) => {
            commands::properties::run(&host.engine, &args, cli.json, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Commands::Exists(args) => {
            if commands::exists::run(&host.engine, &args, cli.json, &mut stdout)? {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Shell => {
            commands::shell::run(host, cli.json, cancellation_token).await?;
            ExitCode::SUCCESS
        }
    };
    stdout.flush()?;

    Ok(exit_code)
}
