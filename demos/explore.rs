//! Load a treebank directory and list direct objects of a lemma
//!
//! Run with: cargo run --example explore -- <dir> <lemma>

use std::env;
use std::process::ExitCode;
use udexplore::Treebank;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| ".".to_string());
    let Some(lemma) = args.next() else {
        eprintln!("usage: explore <dir> <lemma>");
        return ExitCode::FAILURE;
    };

    let treebank = match Treebank::from_dir(&dir) {
        Ok(treebank) => treebank,
        Err(e) => {
            eprintln!("Failed to load {}: {}", dir, e);
            return ExitCode::FAILURE;
        }
    };

    let objects = treebank.search(|tb, t| {
        Ok(t.deprel == "obj" && tb.governor_of(t)?.token().is_some_and(|g| g.lemma == lemma))
    });
    for t in objects {
        println!("{}\t{}\t{}", t.form, t.sent_id, t.id);
    }

    ExitCode::SUCCESS
}
