mod actions;
mod arguments;
mod startup;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use crate::exit::Exit;
pub(crate) use arguments::Cli;

pub async fn run() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(
            err.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion,
        ) =>
        {
            let _ = err.print();

            return Exit::Success.code();
        }
        Err(err) => {
            let _ = err.print();

            return Exit::CliParse.code();
        }
    };

    actions::run(args).await
}
