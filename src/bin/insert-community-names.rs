//! Attach community names to an existing catalog file in place
//! Usage: insert-community-names <songs.json> <community-names.tsv>

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use catalog_link::output::{read_catalog, write_catalog};
use catalog_link::sources::load_community_names;

#[derive(Parser)]
#[command(name = "insert-community-names")]
#[command(about = "Attach community aliases to a merged catalog")]
struct Args {
    catalog: PathBuf,

    /// songName<TAB>alias<TAB>alias...
    names: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let names = load_community_names(&args.names)?;
    let mut songs = read_catalog(&args.catalog)?;
    println!(
        "Loaded {} aliased songs, {} catalog records",
        names.len(),
        songs.len()
    );

    let enriched = names.apply(&mut songs);
    write_catalog(&args.catalog, &songs)?;

    println!("Attached community names to {} records", enriched);
    Ok(())
}
