use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// How a sentence was sent.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Query,
    Sentence,
    Predicate,
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    mode: Mode,
    sentence: &'a str,
    reply: &'a str,
}

pub fn print_reply(mode: Mode, sentence: &str, reply: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                mode,
                sentence,
                reply,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENTENCE", "REPLY"])
                .add_row(vec![sentence, reply]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{sentence} => {reply}"),
        OutputFormat::Raw => print_raw(reply),
    }
}

/// One line of batch output.
#[derive(Serialize)]
pub struct BatchEntry {
    pub sentence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    atomic: bool,
    failed: usize,
    results: &'a [BatchEntry],
}

pub fn print_batch(entries: &[BatchEntry], atomic: bool, format: OutputFormat) {
    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    match format {
        OutputFormat::Json => print_json(&BatchOutput {
            atomic,
            failed,
            results: entries,
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENTENCE", "STATUS", "REPLY"]);
            for entry in entries {
                let (status, text) = entry_status(entry);
                table.add_row(vec![entry.sentence.as_str(), status, text]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                let (status, text) = entry_status(entry);
                println!("{} => {status}: {text}", entry.sentence);
            }
        }
        OutputFormat::Raw => {
            for entry in entries {
                match (&entry.reply, &entry.error) {
                    (Some(reply), _) => print_raw(reply),
                    (None, Some(error)) => print_raw(&format!("ERROR {error}")),
                    (None, None) => {}
                }
            }
        }
    }
}

fn entry_status(entry: &BatchEntry) -> (&'static str, &str) {
    match (&entry.reply, &entry.error) {
        (_, Some(error)) => ("error", error.as_str()),
        (Some(reply), None) => ("ok", reply.as_str()),
        (None, None) => ("ok", ""),
    }
}

#[derive(Serialize)]
struct LoadOutput {
    root: String,
    files_loaded: usize,
}

pub fn print_load(root: &Path, files_loaded: usize, format: OutputFormat) {
    let root = root.display().to_string();
    match format {
        OutputFormat::Json => print_json(&LoadOutput { root, files_loaded }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ROOT", "FILES LOADED"])
                .add_row(vec![root, files_loaded.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("loaded {files_loaded} file(s) from {root}"),
        OutputFormat::Raw => print_raw(&files_loaded.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(text: &str) {
    let mut out = std::io::stdout();
    let _ = writeln!(out, "{text}");
    let _ = out.flush();
}
