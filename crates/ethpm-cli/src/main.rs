use std::process::ExitCode;

use clap::Parser;

mod args;
mod cmd;
mod io;
mod logging;
mod output;

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    logging::init(cli.verbose, cli.json);
    output::init(cli.json);

    match cmd::dispatch(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            output::error(&err);
            ExitCode::from(2)
        }
    }
}
