use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod ask;
pub mod batch;
pub mod load;
pub mod session;
pub mod version;

pub use session::Connection;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a read-only question.
    Query(SentenceArgs),
    /// Send a sentence that may change the knowledge base.
    Sentence(SentenceArgs),
    /// Ask a question whose answer must be YES, NO or MAYBE.
    Predicate(SentenceArgs),
    /// Send several sentences, rolled back together if one fails.
    Batch(BatchArgs),
    /// Load knowledge files from a directory.
    Load(LoadArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, connection: &Connection, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Query(args) => ask::run(ask::Kind::Query, args, connection, format),
        Command::Sentence(args) => ask::run(ask::Kind::Sentence, args, connection, format),
        Command::Predicate(args) => ask::run(ask::Kind::Predicate, args, connection, format),
        Command::Batch(args) => batch::run(args, connection, format),
        Command::Load(args) => load::run(args, connection, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SentenceArgs {
    /// Parenthesized sentence, e.g. "(is-x-a-y? {bird} {animal})".
    pub sentence: String,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Sentences to run in order. Read from stdin when none are given.
    #[arg(conflicts_with = "file")]
    pub sentences: Vec<String>,
    /// Read sentences from a file, one per line.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
    /// Keep going after failures and report every outcome; nothing is
    /// rolled back.
    #[arg(long)]
    pub tolerant: bool,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Directory holding knowledge files.
    pub dir: PathBuf,
    /// Knowledge file extension.
    #[arg(long, default_value = "lisp")]
    pub extension: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
