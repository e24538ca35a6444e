use std::fs;
use std::io::Read;

use scone_client::SentenceOutcome;

use crate::cmd::{BatchArgs, Connection};
use crate::exit::{client_error, io_error, CliError, CliResult, REMOTE_ERROR, SUCCESS, USAGE};
use crate::output::{print_batch, BatchEntry, OutputFormat};

pub fn run(args: BatchArgs, connection: &Connection, format: OutputFormat) -> CliResult<i32> {
    let sentences = collect_sentences(&args, std::io::stdin().lock())?;
    let mut client = connection.open()?;

    if args.tolerant {
        let outcomes = client
            .multi_sentence_collect(&sentences)
            .map_err(|err| client_error("batch failed", err))?;
        let entries = outcome_entries(&sentences, outcomes);
        let failed = entries.iter().any(|e| e.error.is_some());
        print_batch(&entries, false, format);
        return Ok(if failed { REMOTE_ERROR } else { SUCCESS });
    }

    let replies = client
        .multi_sentence(&sentences)
        .map_err(|err| client_error("batch rolled back", err))?;
    let entries: Vec<BatchEntry> = sentences
        .into_iter()
        .zip(replies)
        .map(|(sentence, reply)| BatchEntry {
            sentence,
            reply: Some(reply),
            error: None,
        })
        .collect();
    print_batch(&entries, true, format);
    Ok(SUCCESS)
}

/// Inline sentences win; otherwise lines from `--file`, or from `stdin`.
fn collect_sentences<R: Read>(args: &BatchArgs, mut stdin: R) -> CliResult<Vec<String>> {
    let text = if !args.sentences.is_empty() {
        args.sentences.join("\n")
    } else if let Some(path) = &args.file {
        fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
    } else {
        let mut text = String::new();
        stdin
            .read_to_string(&mut text)
            .map_err(|err| io_error("failed reading stdin", err))?;
        text
    };

    let sentences: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if sentences.is_empty() {
        return Err(CliError::new(USAGE, "batch needs at least one sentence"));
    }
    Ok(sentences)
}

fn outcome_entries(sentences: &[String], outcomes: Vec<SentenceOutcome>) -> Vec<BatchEntry> {
    sentences
        .iter()
        .zip(outcomes)
        .map(|(sentence, outcome)| match outcome {
            Ok(reply) => BatchEntry {
                sentence: sentence.clone(),
                reply: Some(reply),
                error: None,
            },
            Err(err) => BatchEntry {
                sentence: sentence.clone(),
                reply: None,
                error: Some(err.message().to_string()),
            },
        })
        .collect()
}
