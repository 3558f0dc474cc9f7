use std::process::ExitCode;

mod cli;
pub(crate) mod config;
mod exit;

#[tokio::main]
async fn main() -> ExitCode {
    cli::run().await
}
