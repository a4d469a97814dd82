mod cli;
mod commands;
mod data;
mod error;
mod exit_codes;
mod imaging;
mod output;
mod pipeline;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use cli::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
                _ => exit_codes::FAILURE,
            };
            let _ = e.print();
            if code != exit_codes::SUCCESS {
                eprintln!("{}", Cli::command().render_usage());
            }
            std::process::exit(code);
        }
    };

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    println!("Starting processing in {} mode", cli.mode);

    let exit_code = match commands::execute(&cli) {
        Ok(()) => {
            println!("Processing completed successfully");
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::FAILURE
        }
    };

    std::process::exit(exit_code);
}
