use clap::Parser;
use smarttrace_tui::Cli;
use smarttrace_tui::run_main;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    run_main(Cli::parse()).await
}
