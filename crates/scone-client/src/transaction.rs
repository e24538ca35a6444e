//! Checkpoint-based batches.
//!
//! The server has no transaction command. Atomicity is emulated with its
//! append-only element history: a fresh placeholder individual marks the
//! start of the batch, and rollback removes everything created after it and
//! then the placeholder itself.

use std::io::{Read, Write};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::Client;
use crate::error::{ClientError, RemoteError, Result};
use crate::sentence::Sentence;

/// Parent type of checkpoint markers.
pub const CHECKPOINT_PARENT: &str = "thing";

/// Per-sentence result of a tolerant batch.
pub type SentenceOutcome = std::result::Result<String, RemoteError>;

/// Generate a checkpoint marker name that no other batch will reuse.
pub fn checkpoint_name() -> String {
    format!("checkpoint-{}", Uuid::new_v4())
}

impl<R: Read, W: Write> Client<R, W> {
    /// Run `sentences` in order as one unit.
    ///
    /// Every sentence is validated before anything is sent, so a malformed
    /// batch fails with [`ClientError::BadFormat`] and no side effects. On
    /// the first remote failure the knowledge base is rolled back to the
    /// checkpoint and [`ClientError::Transaction`] names the failing sentence
    /// and the server's message. Replies gathered so far are discarded.
    ///
    /// Protocol and transport failures abort immediately without rollback:
    /// the connection can no longer carry the compensating sentences. A
    /// failing rollback sentence surfaces as its own error.
    ///
    /// On success the checkpoint marker is left in place.
    pub fn multi_sentence<S: AsRef<str>>(&mut self, sentences: &[S]) -> Result<Vec<String>> {
        let parsed = parse_all(sentences)?;
        if parsed.is_empty() {
            return Ok(Vec::new());
        }

        let checkpoint = checkpoint_name();
        self.mutate(&Sentence::new_indv(&checkpoint, CHECKPOINT_PARENT))?;
        debug!(%checkpoint, count = parsed.len(), "batch started");

        let mut replies = Vec::with_capacity(parsed.len());
        for sentence in &parsed {
            match self.mutate(sentence) {
                Ok(reply) => replies.push(reply),
                Err(ClientError::Remote(source)) => {
                    warn!(
                        %checkpoint,
                        sentence = %sentence,
                        error = %source,
                        "batch sentence failed, rolling back"
                    );
                    self.rollback(&checkpoint)?;
                    return Err(ClientError::Transaction {
                        sentence: sentence.as_str().to_string(),
                        source,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        debug!(%checkpoint, "batch committed");
        Ok(replies)
    }

    /// Run a newline-separated block of sentences as one unit.
    ///
    /// Blank lines are skipped; each remaining line is one sentence.
    pub fn multi_sentence_text(&mut self, text: &str) -> Result<Vec<String>> {
        let sentences: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        self.multi_sentence(&sentences)
    }

    /// Run `sentences` in order, recording each outcome instead of stopping.
    ///
    /// No checkpoint is created and nothing is rolled back: sentences that
    /// succeed keep their effects even when later ones fail. Malformed
    /// sentences and protocol/transport failures still abort the call.
    pub fn multi_sentence_collect<S: AsRef<str>>(
        &mut self,
        sentences: &[S],
    ) -> Result<Vec<SentenceOutcome>> {
        let parsed = parse_all(sentences)?;

        let mut outcomes = Vec::with_capacity(parsed.len());
        for sentence in &parsed {
            match self.mutate(sentence) {
                Ok(reply) => outcomes.push(Ok(reply)),
                Err(ClientError::Remote(err)) => outcomes.push(Err(err)),
                Err(err) => return Err(err),
            }
        }
        Ok(outcomes)
    }

    fn rollback(&mut self, checkpoint: &str) -> Result<()> {
        self.mutate(&Sentence::remove_elements_after(checkpoint))?;
        self.mutate(&Sentence::remove_last_element())?;
        debug!(%checkpoint, "batch rolled back");
        Ok(())
    }
}

fn parse_all<S: AsRef<str>>(sentences: &[S]) -> Result<Vec<Sentence>> {
    sentences
        .iter()
        .map(|sentence| Sentence::parse(sentence.as_ref()))
        .collect()
}
