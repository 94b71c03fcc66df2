use anyhow::{Context, Result, bail};
use std::fs;
use tag_blacklist_api::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <blacklist.txt|blacklist.json> <posts.json>", args[0]);
    }

    let config = if args[1].ends_with(".json") {
        BlacklistConfig::load(&args[1])?
    } else {
        BlacklistConfig::load_rules(&args[1])?
    };

    let body = fs::read_to_string(&args[2])
        .with_context(|| format!("Failed to read posts file {}", args[2]))?;
    let page: serde_json::Value =
        serde_json::from_str(&body).context("Failed to parse posts file")?;
    let posts = RawPost::from_page(page);

    let filter = BlacklistFilter::new(config);

    println!("Checking {} posts:", posts.len());
    for post in &posts {
        let id = post.id().map_or_else(|| "?".to_string(), |id| id.to_string());
        let result = filter.check(post);
        if result.blacklisted {
            println!("HIDDEN  #{} ({})", id, result.matched_entries.join(", "));
        } else {
            println!("VISIBLE #{}", id);
        }
    }

    let summary = filter.summarize(&posts);
    println!(
        "\n{} of {} posts hidden ({:.1}%)",
        summary.hidden_items,
        summary.total_items,
        summary.hidden_percentage()
    );
    for (entry, hits) in summary.entry_hits.iter().filter(|(_, hits)| *hits > 0) {
        println!("  {:>4}  {}", hits, entry);
    }

    Ok(())
}
