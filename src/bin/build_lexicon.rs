//! Lexicon artifact builder
//!
//! Turns a raw corpus frequency list ("word count" per line) into the
//! lexicon JSON the generator loads at startup.
//!
//! Usage: cargo run --bin build_lexicon -- --counts frwac_freq.txt

use clap::Parser;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "build_lexicon")]
#[command(about = "Build the frequency lexicon from a corpus word-count list")]
struct Args {
    /// Corpus frequency list: one "word count" pair per line
    #[arg(short, long)]
    counts: String,

    /// Output path for the lexicon JSON
    #[arg(short, long, default_value = "data/lexicon.json")]
    output: String,

    /// Drop words seen fewer times than this
    #[arg(long, default_value = "1")]
    min_count: u64,

    /// Drop words longer than this many characters
    #[arg(long, default_value = "24")]
    max_length: usize,

    /// Print a sample of the kept entries
    #[arg(short, long)]
    verbose: bool,
}

/// Parse "word count" lines. Duplicate words sum their counts; comments
/// (#) and malformed lines are skipped.
fn parse_counts(content: &str, min_count: u64, max_length: usize) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let word = match parts.next() {
            Some(w) => w,
            None => continue,
        };
        let count = match parts.next().and_then(|c| c.parse::<u64>().ok()) {
            Some(c) => c,
            None => continue,
        };
        if word.chars().count() > max_length {
            continue;
        }

        *counts.entry(word.to_string()).or_insert(0) += count;
    }

    counts.retain(|_, count| *count >= min_count);
    counts
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    println!("📚 Building lexicon from: {}", args.counts);
    if !Path::new(&args.counts).exists() {
        return Err(format!("Frequency list not found: {}", args.counts).into());
    }

    let content = fs::read_to_string(&args.counts)?;
    let counts = parse_counts(&content, args.min_count, args.max_length);
    if counts.is_empty() {
        return Err(format!("No usable entries in {}", args.counts).into());
    }
    println!("   Kept {} words", counts.len());

    // Report the floor(log2(count)) band range, the unit the generator
    // widens its candidate queries over
    let mut lowest = i64::MAX;
    let mut highest = i64::MIN;
    for &count in counts.values() {
        let band = (count.max(1) as f64).log2().floor() as i64;
        lowest = lowest.min(band);
        highest = highest.max(band);
    }
    println!("   Frequency bands: {}..={}", lowest, highest);

    if args.verbose {
        for (word, count) in counts.iter().take(10) {
            println!("   {} {}", word, count);
        }
    }

    let data = serde_json::json!({
        "version": "0.1.0",
        "entries": counts.len(),
        "frequencies": counts,
    });

    if let Some(parent) = Path::new(&args.output).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.output, serde_json::to_string_pretty(&data)?)?;
    println!("✅ Lexicon written to: {}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts() {
        let content = "le 153424\nchat 1249\n# a comment\nchien 987\n";
        let counts = parse_counts(content, 1, 24);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["chat"], 1249);
    }

    #[test]
    fn test_parse_merges_duplicates() {
        let counts = parse_counts("chat 10\nchat 6\n", 1, 24);
        assert_eq!(counts["chat"], 16);
    }

    #[test]
    fn test_parse_filters() {
        let content = "rare 2\nunique 1\nlongggggggggg 50\nbroken\nnan abc\n";
        let counts = parse_counts(content, 2, 8);
        assert_eq!(counts.len(), 1);
        assert!(counts.contains_key("rare"));
    }
}
