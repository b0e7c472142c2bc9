//! Theta - Entry point

use std::process::ExitCode;

use tracing::error;

use theta::{cli, Command};
use theta_telemetry::Logging;

fn main() -> ExitCode {
    let args = match Command::parse() {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print!("{}", cli::help());
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("theta {}", theta::VERSION);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Use --help for usage information");
            return ExitCode::FAILURE;
        }
    };

    if args.list_env {
        print!("{}", theta::render_env_bindings());
        return ExitCode::SUCCESS;
    }

    let logging = match Logging::bootstrap() {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let resolution = match theta::start(&theta::resolver_for(&args), &logging) {
        Ok(resolution) => resolution,
        Err(e) => {
            let cause = std::error::Error::source(&e)
                .map(ToString::to_string)
                .unwrap_or_default();
            error!(error = %e, cause = %cause, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        match theta::render_config(&resolution.config) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "Failed to print configuration");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
