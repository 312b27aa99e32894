use std::process::ExitCode;

fn main() -> ExitCode {
    atende_cli::run()
}
