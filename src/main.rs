use std::process::ExitCode;

use clap::Parser;

use deepcheck::cli::{self, Cli};
use deepcheck::logs;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = cli.config().and_then(|config| {
        logs::init(config.log.level)?;
        cli::run(&cli, &config)
    });

    match result {
        Ok(()) => {
            println!("ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
