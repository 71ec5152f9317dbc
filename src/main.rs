use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use catalog_link::diagnostics::DiagnosticsReport;
use catalog_link::index::CandidateIndex;
use catalog_link::output::write_catalog;
use catalog_link::progress::{
    create_progress_bar, create_spinner, finish_phase, format_duration, log_progress,
    set_log_only, PHASE_LOAD, PHASE_RESOLVE, PHASE_ROMANIZE,
};
use catalog_link::resolve::MatchResolver;
use catalog_link::romanize::{romanize_songs, KakasiRomanizer};
use catalog_link::safety::validate_output_path;
use catalog_link::sources::{load_community_names, load_content_index, load_feed};

#[derive(Parser)]
#[command(name = "catalog-link")]
#[command(about = "Link the song metadata feed to the harvested content index")]
struct Args {
    /// Harvested display name -> content id map
    #[arg(long, default_value = "data/songName2folderId.json")]
    content_index: PathBuf,

    /// Song metadata feed
    #[arg(long, default_value = "data/zetaraku.json")]
    feed: PathBuf,

    #[arg(long, default_value = "songs.json")]
    output: PathBuf,

    /// Alias sheet (songName<TAB>alias...) to attach as communityNames
    #[arg(long)]
    community_names: Option<PathBuf>,

    /// Leave romanized fields out
    #[arg(long)]
    skip_romanize: bool,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Hide progress bars and print periodic progress lines instead
    #[arg(long)]
    log_only: bool,

    /// Write run statistics and the diagnostics report to this file
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

const PROGRESS_INTERVAL: u64 = 1_000;

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let mut sources = vec![args.content_index.as_path(), args.feed.as_path()];
    if let Some(path) = &args.community_names {
        sources.push(path.as_path());
    }
    validate_output_path(&args.output, "json", &sources)?;

    let start = Instant::now();

    // ------------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------------
    let phase_start = Instant::now();
    let spinner = create_spinner("Loading inputs");
    let entries = load_content_index(&args.content_index)?;
    let feed = load_feed(&args.feed)?;
    let community = args
        .community_names
        .as_deref()
        .map(load_community_names)
        .transpose()?;
    let index = CandidateIndex::build(entries);
    finish_phase(
        &spinner,
        PHASE_LOAD,
        phase_start,
        &format!(
            "{} content entries ({} keys), {} feed entries",
            index.len(),
            index.key_count(),
            feed.len()
        ),
    );

    // ------------------------------------------------------------------------
    // Resolve
    // ------------------------------------------------------------------------
    let phase_start = Instant::now();
    let total = feed.len() as u64;
    let pb = create_progress_bar(total, "Resolving");
    let mut resolver = MatchResolver::new(&index);
    for (i, entry) in feed.iter().enumerate() {
        resolver.resolve_entry(entry);
        pb.inc(1);
        log_progress(PHASE_RESOLVE, i as u64 + 1, total, PROGRESS_INTERVAL);
    }
    let mut resolution = resolver.finish();
    finish_phase(
        &pb,
        PHASE_RESOLVE,
        phase_start,
        &format!("{} records", resolution.songs.len()),
    );

    if let Some(community) = &community {
        let enriched = community.apply(&mut resolution.songs);
        println!(
            "Attached community names to {} records ({} aliased songs)",
            enriched,
            community.len()
        );
    }

    // ------------------------------------------------------------------------
    // Romanize
    // ------------------------------------------------------------------------
    if args.skip_romanize {
        println!("Skipping romanization");
    } else {
        let phase_start = Instant::now();
        let pb = create_progress_bar(resolution.songs.len() as u64, "Romanizing");
        romanize_songs(&mut resolution.songs, &KakasiRomanizer, &pb)?;
        finish_phase(
            &pb,
            PHASE_ROMANIZE,
            phase_start,
            &format!("{} records", resolution.songs.len()),
        );
    }

    // ------------------------------------------------------------------------
    // Report and write
    // ------------------------------------------------------------------------
    resolution.stats.elapsed_seconds = start.elapsed().as_secs_f64();
    let report = DiagnosticsReport::build(&index, &resolution);
    report.print();
    resolution.stats.log_phase("complete");

    if let Some(path) = &args.stats_json {
        report
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats: {}", path.display()))?;
    }

    write_catalog(&args.output, &resolution.songs)?;

    println!("\n{:=<60}", "");
    println!("Linking complete!");
    println!("  Records: {}", resolution.songs.len());
    println!("  Match rate: {:.1}%", resolution.stats.match_rate());
    println!("  Output: {}", args.output.display());
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
