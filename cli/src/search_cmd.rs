use std::path::PathBuf;

use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use smarttrace_core::Attachment;
use smarttrace_core::HttpBackend;
use smarttrace_core::SearchQuery;
use smarttrace_core::SearchSession;
use smarttrace_core::SearchStatus;
use smarttrace_core::error::SearchError;
use smarttrace_core::grid::result_grid;
use smarttrace_core::protocol::Track;

use crate::CommandContext;

#[derive(Debug, clap::Parser)]
pub struct SearchArgs {
    /// Description of the subject, e.g. "man in red jacket".
    #[arg(value_name = "TEXT", default_value = "")]
    pub text: String,

    /// Query image to search with, alone or together with TEXT.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Print the result list as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub async fn run_search(ctx: &CommandContext, args: SearchArgs) -> Result<()> {
    let attachment = match &args.image {
        Some(path) => Some(Attachment::from_path(path).await?),
        None => None,
    };
    let query = SearchQuery::new(&args.text, attachment);
    let backend = HttpBackend::from_config(&ctx.config)?;
    let mut session = SearchSession::new(ctx.cache(), ctx.config.fallback_thumbnail.clone());

    match session.submit(&backend, &query).await {
        Ok(_) => {}
        Err(SearchError::InputInvalid) => bail!("enter a text query or pass --image"),
        Err(err) => {
            return Err(match session.status() {
                SearchStatus::Failed { message } => anyhow!("{message}"),
                _ => err.into(),
            });
        }
    }

    tracing::info!(
        count = session.results().len(),
        session_file = %ctx.session_file.display(),
        "stored search results"
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(session.results())?);
    } else {
        print!(
            "{}",
            format_results(session.results(), &ctx.config.fallback_thumbnail)
        );
    }
    Ok(())
}

/// Result table: heading, then one ranked line per card.
pub fn format_results(results: &[Track], fallback_thumbnail: &str) -> String {
    let grid = result_grid(results, fallback_thumbnail);
    let mut out = String::new();
    if let Some(heading) = &grid.heading {
        out.push_str(heading);
        out.push('\n');
    }
    if let Some(placeholder) = &grid.placeholder {
        out.push_str(placeholder);
        out.push('\n');
    }
    for (rank, (card, track)) in grid.cards.iter().zip(results).enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<12} {:>6}  {}  ({} sightings)\n",
            rank + 1,
            card.title,
            card.badge,
            card.subtitle,
            track.nodes.len()
        ));
    }
    out
}
