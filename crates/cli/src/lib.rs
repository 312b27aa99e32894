pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "atende",
    about = "Atende operator CLI",
    long_about = "Inspect configuration, check runtime readiness, list open meeting slots, and export stored records.",
    after_help = "Examples:\n  atende doctor --json\n  atende config\n  atende slots\n  atende export leads"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportCollection {
    Leads,
    Tickets,
    Bookings,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with secrets redacted"
    )]
    Config,
    #[command(about = "Validate config, storage connectivity, and classifier readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List the meeting slots currently offered to visitors")]
    Slots,
    #[command(about = "Dump one stored record collection as JSON")]
    Export {
        #[arg(value_enum)]
        collection: ExportCollection,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Slots => commands::slots::run(),
        Command::Export { collection } => commands::export::run(collection),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
