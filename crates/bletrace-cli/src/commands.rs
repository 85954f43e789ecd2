use super::args::{Cli, Commands};
use super::handlers;
use anyhow::Result;
use bletrace_runtime::Config;

pub fn run(cli: Cli) -> Result<()> {
    let config_path = Config::resolve_config_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { force } => handlers::init::handle(&config_path, force, cli.format),

        Commands::Run => {
            let config = Config::load_from(&config_path)?;
            let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
            handlers::run::handle(&config, &data_dir)
        }

        Commands::Replay { capture } => {
            let config = Config::load_from(&config_path)?;
            let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
            handlers::replay::handle(&config, &data_dir, &capture, cli.format)
        }

        Commands::Status => {
            let config = Config::load_from(&config_path)?;
            let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
            handlers::status::handle(&data_dir, cli.format)
        }
    }
}
