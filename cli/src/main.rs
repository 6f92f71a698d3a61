use anyhow::Result;
use clap::Parser;
use smarttrace_cli::CommandContext;
use smarttrace_cli::init_logging;
use smarttrace_cli::search_cmd::SearchArgs;
use smarttrace_cli::search_cmd::run_search;
use smarttrace_cli::session_cmd::PlayArgs;
use smarttrace_cli::session_cmd::ShowArgs;
use smarttrace_cli::session_cmd::run_play;
use smarttrace_cli::session_cmd::run_show;
use smarttrace_tui::Cli as TuiCli;

/// SmartTrace retrieval browser.
///
/// Without a subcommand the interactive terminal UI starts.
#[derive(Debug, Parser)]
#[command(version)]
struct MultitoolCli {
    #[clap(flatten)]
    tui: TuiCli,

    #[command(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Run a search and store the results for `show` and `play`.
    Search(SearchArgs),

    /// Print one stored result: statistics, sightings and camera timeline.
    Show(ShowArgs),

    /// Request the clip of one sighting and hand it to the media player.
    Play(PlayArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MultitoolCli::parse();
    let Some(subcommand) = cli.subcommand else {
        return smarttrace_tui::run_main(cli.tui)
            .await
            .map_err(|err| anyhow::anyhow!("{err:?}"));
    };

    init_logging();
    let ctx = CommandContext::load(cli.tui.config_overrides())?;
    match subcommand {
        Subcommand::Search(args) => run_search(&ctx, args).await,
        Subcommand::Show(args) => run_show(&ctx, args),
        Subcommand::Play(args) => run_play(&ctx, args).await,
    }
}
