//! Show how names resolve against a content index
//! Usage: probe-key <songName2folderId.json> <name>...

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use catalog_link::index::CandidateIndex;
use catalog_link::normalize::normalize_key;
use catalog_link::sources::load_content_index;
use catalog_link::special::strip_edition_marker;
use catalog_link::variant::VariantExpander;

#[derive(Parser)]
#[command(name = "probe-key")]
#[command(about = "Print normalized keys, lookup hits, and variants for names")]
struct Args {
    content_index: PathBuf,

    #[arg(required = true)]
    names: Vec<String>,
}

fn show(id: Option<&str>, index: &CandidateIndex) -> String {
    match id {
        Some(id) => format!("{} ({})", id, index.display_name(id).unwrap_or("?")),
        None => "-".to_string(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let index = CandidateIndex::build(load_content_index(&args.content_index)?);
    println!(
        "Content index: {} entries, {} keys\n",
        index.len(),
        index.key_count()
    );

    let expander = VariantExpander::new(&index);
    for name in &args.names {
        let key = normalize_key(name);
        println!("{}", name);
        println!("  key:        '{}'", key);
        println!("  exact:      {}", show(index.get_exact(name), &index));
        println!("  normalized: {}", show(index.get_key(&key), &index));
        if let Some(base) = strip_edition_marker(name) {
            println!("  edition of: '{}'", base);
        }

        let set = expander.expand(&[name.as_str()]);
        println!("  base:       {}", show(set.base.as_deref(), &index));
        println!("  [DX]:       {}", show(set.dx.as_deref(), &index));
        println!("  [ST]:       {}", show(set.st.as_deref(), &index));
        println!();
    }

    Ok(())
}
