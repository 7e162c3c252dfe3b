mod dfa;
mod pruning;
mod record;
mod result_notifier;
mod serialization;
mod traverser;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;
use string_interner::{DefaultSymbol, StringInterner};
use typed_arena::Arena;

use crate::dfa::Dfa;
use crate::result_notifier::{
    completion_steps, CompletionStep, ResultNotifier, StdoutResultNotifier,
};
use crate::traverser::Traverser;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// Enumerates the minimal symbol insertions that make a word accepted by a DFA.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the DFA description in JSON
    dfa: PathBuf,

    /// Input symbols, in order
    word: Vec<String>,

    /// Print the DFA in Graphviz DOT format and exit
    #[arg(long)]
    dot: bool,

    /// Print the normalized DFA description as JSON and exit
    #[arg(long)]
    json: bool,
}

fn load_dfa(
    path: &Path,
    interner: &mut StringInterner,
) -> Result<Dfa<DefaultSymbol>, Box<dyn Error>> {
    let description = fs::read_to_string(path)?;
    Ok(serialization::dfa_from_json(&description, interner)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();
    let args = Args::parse();

    let mut interner = StringInterner::default();
    let dfa = load_dfa(&args.dfa, &mut interner)?;
    if args.dot {
        print!("{}", serialization::to_dot(&dfa, &interner));
        return Ok(());
    }
    if args.json {
        println!("{}", serialization::dfa_to_json(&dfa, &interner));
        return Ok(());
    }

    let word: Vec<DefaultSymbol> = args
        .word
        .iter()
        .map(|symbol| interner.get_or_intern(symbol))
        .collect();
    info!(
        "mending a word of {} symbols against {} states",
        word.len(),
        dfa.state_count()
    );
    if dfa.accepts(&word) {
        info!("the input is already accepted as-is");
    }

    let arena = Arena::new();
    let mut traverser = Traverser::new(&dfa, &arena);
    let mut input = word.into_iter();
    let final_records = traverser.execute(|| input.next());
    info!("found {} completions", final_records.len());

    let mut notifier = StdoutResultNotifier;
    for &record in &final_records {
        let steps: Vec<CompletionStep<String>> = completion_steps(record)
            .into_iter()
            .map(|step| CompletionStep {
                characters: step
                    .characters
                    .iter()
                    .map(|symbol| interner.resolve(*symbol).unwrap_or("?").to_string())
                    .collect(),
                target_state: step.target_state,
                accepted: step.accepted,
            })
            .collect();
        notifier.notify(&steps);
    }
    Ok(())
}
