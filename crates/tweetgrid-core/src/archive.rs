use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use serde::Deserialize;
use tracing::{debug, info};

use crate::event::Event;

#[derive(Debug, Deserialize)]
struct ArchiveItem {
    tweet: ArchiveTweet,
}

#[derive(Debug, Deserialize)]
struct ArchiveTweet {
    created_at: String,
}

/// Reads a tweet archive file (`tweets.js`) into events.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_archive(path: &Path) -> anyhow::Result<Vec<Event>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let events = parse_archive(&text)
        .with_context(|| format!("failed to parse archive {}", path.display()))?;
    info!(events = events.len(), "loaded archive");
    Ok(events)
}

/// Parses archive text. The JSON array may be preceded by a JavaScript
/// assignment such as `window.YTD.tweets.part0 = `.
pub fn parse_archive(text: &str) -> anyhow::Result<Vec<Event>> {
    let start = text
        .find('[')
        .ok_or_else(|| anyhow!("archive does not contain a JSON array"))?;
    if start > 0 {
        debug!(prefix_len = start, "skipping archive wrapper prefix");
    }

    let items: Vec<ArchiveItem> =
        serde_json::from_str(&text[start..]).context("archive JSON is malformed")?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            Event::parse(&item.tweet.created_at)
                .with_context(|| format!("record {idx} has an unusable created_at"))
        })
        .collect()
}
