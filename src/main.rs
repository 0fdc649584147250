use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = minilex::cli::Cli::parse();
    match minilex::cli::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
