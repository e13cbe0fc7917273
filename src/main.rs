//! Maze distractor generator - implausible parallel sentences for
//! Maze-task reading experiments
//!
//! Single-pass, stateless, self-contained CLI application. Uses Candle
//! for LSTM inference over pre-trained weights.

mod lexicon;
mod llm;
mod maze;

use clap::Parser;
use lexicon::LexiconIndex;
use llm::{Model, Vocab};
use maze::{process_sentence_set, SearchPolicy};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "mazegen")]
#[command(about = "Generate Maze-task distractor sentences with an LSTM language model")]
struct Args {
    /// Input file: one sentence per line, blank lines separate sets
    input: String,

    /// Path to model weights
    #[arg(short, long, default_value = "models/model.bin")]
    model: String,

    /// Path to vocabulary file
    #[arg(short, long, default_value = "data/dict.json")]
    dict: String,

    /// Path to the corpus frequency lexicon
    #[arg(short, long, default_value = "data/lexicon.json")]
    lexicon: String,

    /// Candidates to score per position before settling for the best
    #[arg(short, long, default_value = "100")]
    num_to_test: usize,

    /// Surprisal every sentence context must reach
    #[arg(long, default_value = "21.0")]
    minimum: f32,

    /// Write distractor sentences here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,
}

/// Parse sentence sets: one sentence per line, blank lines between sets
fn parse_sentence_sets(content: &str) -> Vec<Vec<String>> {
    let mut sets = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                sets.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        sets.push(current);
    }
    sets
}

/// Load sentence sets from the input file
fn load_sentence_sets(path: &str) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    if !Path::new(path).exists() {
        return Err(format!("Input file not found: {}", path).into());
    }

    let content = fs::read_to_string(path)?;
    let sets = parse_sentence_sets(&content);

    if sets.is_empty() {
        return Err(format!("No sentence sets found in {}", path).into());
    }
    Ok(sets)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("🧩 Maze Distractor Generator v0.1.0");
    eprintln!(
        "Model: {} | Dict: {} | Lexicon: {}",
        args.model, args.dict, args.lexicon
    );

    // Load model weights
    let model = Model::load(&args.model)?;
    if args.debug {
        eprintln!("✓ Model loaded: {} parameters", model.parameter_count());
    }

    // Load vocabulary
    let vocab = Vocab::load(&args.dict)?;
    if args.debug {
        eprintln!("✓ Vocabulary loaded: {} words", vocab.len());
    }
    if vocab.len() != model.config().vocab_size {
        eprintln!(
            "⚠ vocabulary has {} words but the model expects {}",
            vocab.len(),
            model.config().vocab_size
        );
    }

    // Load frequency lexicon
    let lexicon = LexiconIndex::load(&args.lexicon)?;
    if args.debug {
        let (lowest, highest) = lexicon.band_range();
        eprintln!(
            "✓ Lexicon loaded: {} words, bands {}..={}",
            lexicon.len(),
            lowest,
            highest
        );
    }

    let policy = SearchPolicy {
        num_to_test: args.num_to_test,
        minimum: args.minimum,
    };

    let sets = load_sentence_sets(&args.input)?;
    eprintln!("Processing {} sentence sets...\n", sets.len());

    // Generate; a failed set is reported and skipped so one bad item
    // cannot sink a whole stimulus file
    let mut rendered = Vec::with_capacity(sets.len());
    let mut failed = 0;
    for (index, set) in sets.iter().enumerate() {
        match process_sentence_set(&model, &vocab, &lexicon, &policy, set) {
            Ok(rows) => rendered.push(rows.join("\n")),
            Err(e) => {
                eprintln!("⚠ sentence set {} failed: {}", index + 1, e);
                failed += 1;
            }
        }
    }

    let output_text = rendered.join("\n\n") + "\n";
    match &args.output {
        Some(path) => {
            fs::write(path, &output_text)?;
            eprintln!("✓ Wrote {} sets to {}", rendered.len(), path);
        }
        None => print!("{}", output_text),
    }

    // Summary
    eprintln!(
        "\n📊 Done: {} sets in, {} generated, {} failed",
        sets.len(),
        rendered.len(),
        failed
    );

    Ok(())
}
