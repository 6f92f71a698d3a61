//! `show` and `play`: work on the result list stored by the last `search`.

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use serde_json::json;
use smarttrace_core::DetailHandoff;
use smarttrace_core::DetailView;
use smarttrace_core::ExternalPlayer;
use smarttrace_core::HttpBackend;
use smarttrace_core::Resolution;
use smarttrace_core::SearchSession;
use smarttrace_core::Selection;
use smarttrace_core::VideoSessionController;
use smarttrace_core::VideoState;
use smarttrace_core::axis_column;
use smarttrace_core::protocol::Ident;

use crate::CommandContext;

const TIMELINE_WIDTH: u16 = 48;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Only sightings from this sequence.
    #[arg(long = "sequence", value_name = "SEQ")]
    pub sequence: Option<String>,

    /// Only sightings from this camera; needs --sequence.
    #[arg(long = "camera", value_name = "CAM")]
    pub camera: Option<String>,
}

#[derive(Debug, clap::Parser)]
pub struct ShowArgs {
    /// Rank of the result as printed by `search`, starting at 1.
    pub rank: usize,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, clap::Parser)]
pub struct PlayArgs {
    /// Rank of the result as printed by `search`, starting at 1.
    pub rank: usize,

    /// Sighting number as printed by `show` (after filters), starting at 1.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub node: usize,

    /// Play the first sighting of the N-th timeline camera instead.
    #[arg(long, value_name = "N", conflicts_with = "node")]
    pub marker: Option<usize>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the video session as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run_show(ctx: &CommandContext, args: ShowArgs) -> Result<()> {
    let view = open_detail(ctx, args.rank, &args.filter)?;
    print!("{}", format_detail(&view));
    Ok(())
}

pub async fn run_play(ctx: &CommandContext, args: PlayArgs) -> Result<()> {
    let view = open_detail(ctx, args.rank, &args.filter)?;
    let node = match args.marker {
        Some(marker) => view
            .node_for_marker(marker.saturating_sub(1))
            .with_context(|| format!("no timeline camera #{marker}"))?,
        None => view
            .node_for_card(args.node.saturating_sub(1))
            .with_context(|| format!("no sighting #{} for the current filters", args.node))?,
    };

    let backend = HttpBackend::from_config(&ctx.config)?;
    let mut video = VideoSessionController::new(ExternalPlayer::new(ctx.config.player.clone()))
        .with_base_url(backend.base_url().clone());
    let resolution = video.play(&backend, view.track(), node).await;
    let session = video
        .session()
        .ok_or_else(|| anyhow!("video session closed before it resolved"))?;

    if args.json {
        let payload = json!({
            "state": format!("{:?}", session.state()),
            "label": session.label(),
            "video_url": session.media_url(),
            "message": session.message(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    match (resolution, session.state()) {
        (Resolution::Applied(VideoState::Playing), _) => {
            if !args.json {
                println!("{}", session.label());
                println!("{}", session.media_url().unwrap_or_default());
            }
            if video.player().is_configured() {
                tracing::info!("waiting for media player to exit");
                video.player_mut().wait().await?;
            }
            video.close();
            Ok(())
        }
        (_, VideoState::Failed) => {
            let message = session.message().unwrap_or_default().to_string();
            let label = session.label().to_string();
            video.close();
            bail!("{label}: {message}")
        }
        (resolution, state) => bail!("unexpected video outcome {resolution:?} in state {state:?}"),
    }
}

/// Detail view of the cached result at `rank`, with filters applied.
pub fn open_detail(ctx: &CommandContext, rank: usize, filter: &FilterArgs) -> Result<DetailView> {
    let mut session = SearchSession::new(ctx.cache(), ctx.config.fallback_thumbnail.clone());
    if !session.restore() {
        bail!("no cached search results; run `smarttrace search` first");
    }
    let mut handoff = DetailHandoff::default();
    if let Some(track) = rank.checked_sub(1).and_then(|index| session.select(index)) {
        handoff.select(track);
    }
    let mut view = DetailView::open(&mut handoff, ctx.config.fallback_thumbnail.clone())
        .with_context(|| {
            format!(
                "no result #{rank}; the cached list has {}",
                session.results().len()
            )
        })?;
    if let Some(sequence) = &filter.sequence {
        view.filter_mut()
            .set_sequence(Selection::Only(Ident::from(sequence.as_str())));
    }
    if let Some(camera) = &filter.camera {
        view.filter_mut()
            .set_camera(Selection::Only(Ident::from(camera.as_str())))?;
    }
    Ok(view)
}

pub fn format_detail(view: &DetailView) -> String {
    let header = view.header();
    let mut out = String::new();
    out.push_str(&format!("Global ID: {}\n", header.global_id));
    out.push_str(&format!("Confidence: {}\n", header.confidence));
    out.push_str(&format!("Sightings: {}\n", header.node_count));
    let image = header
        .thumbnail
        .unwrap_or_else(|| format!("[default] {}", view.fallback_thumbnail()));
    out.push_str(&format!("Image: {image}\n\nStatistics\n"));
    for row in view.statistics().rows() {
        out.push_str(&format!("  {}: {}\n", row.sequence_label(), row.cameras_label()));
    }

    let state = view.filter().state();
    out.push_str(&format!(
        "\nFilter: {} / {}\n",
        state.sequence.sequence_label(),
        state.camera.camera_label()
    ));
    let grid = view.grid();
    if let Some(placeholder) = &grid.placeholder {
        out.push_str(&format!("  {placeholder}\n"));
    }
    for (index, card) in grid.cards.iter().enumerate() {
        out.push_str(&format!("  [{}] {}  {}\n", index + 1, card.title, card.subtitle));
    }

    if !view.timeline().is_empty() {
        out.push_str("\nTimeline\n");
        let (axis, labels) = timeline_rows(view);
        out.push_str(&format!("  {}\n  {}\n", axis.trim_end(), labels.trim_end()));
    }
    out
}

fn timeline_rows(view: &DetailView) -> (String, String) {
    let width = usize::from(TIMELINE_WIDTH);
    let mut axis: Vec<char> = vec!['─'; width];
    let mut labels: Vec<char> = vec![' '; width];
    for marker in view.timeline().markers() {
        let column = usize::from(axis_column(marker.position, TIMELINE_WIDTH));
        axis[column] = '●';
        let label: Vec<char> = format!("CAM-{}", marker.camera).chars().collect();
        let start = column
            .saturating_sub(label.len() / 2)
            .min(width.saturating_sub(label.len()));
        for (offset, ch) in label.into_iter().enumerate() {
            if let Some(cell) = labels.get_mut(start + offset) {
                *cell = ch;
            }
        }
    }
    (axis.into_iter().collect(), labels.into_iter().collect())
}
