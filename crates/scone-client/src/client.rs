use std::fmt;
use std::io::{Read, Write};

use scone_frame::{LineReader, SentenceWriter};
use scone_transport::SconeStream;
use tracing::debug;

use crate::cache::ReplyCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::protocol::{is_error_reply, is_predicate_answer, parse_error, ERROR_TERMINATOR};
use crate::sentence::Sentence;

/// A client connected over a [`SconeStream`].
pub type SconeClient = Client<SconeStream, SconeStream>;

/// Request/response engine for one server connection.
///
/// The protocol is strictly half-duplex: one sentence, one reply, in order.
/// A client is therefore driven from one thread at a time; callers that need
/// concurrency open one connection per caller.
pub struct Client<R, W> {
    reader: LineReader<R>,
    writer: SentenceWriter<W>,
    cache: ReplyCache,
    config: ClientConfig,
    exchanges: u64,
}

impl<R, W> fmt::Debug for Client<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("exchanges", &self.exchanges)
            .finish_non_exhaustive()
    }
}

impl<R: Read, W: Write> Client<R, W> {
    /// Build a client from an already connected reader/writer pair.
    ///
    /// No bytes are exchanged until the first sentence is sent.
    pub fn from_parts(reader: LineReader<R>, writer: SentenceWriter<W>, config: ClientConfig) -> Self {
        Self {
            reader,
            writer,
            cache: ReplyCache::new(config.cache_capacity),
            config,
            exchanges: 0,
        }
    }

    /// Run one round trip, bypassing the cache.
    pub fn send(&mut self, sentence: &str) -> Result<String> {
        let sentence = Sentence::parse(sentence)?;
        self.exchange(&sentence)
    }

    /// Run a read-only sentence, answering repeats from the cache.
    pub fn query(&mut self, sentence: &str) -> Result<String> {
        let sentence = Sentence::parse(sentence)?;
        self.query_parsed(&sentence)
    }

    /// Run a sentence that may change the knowledge base.
    ///
    /// The whole cache is dropped first: no cached answer is trusted after
    /// a mutation.
    pub fn sentence(&mut self, sentence: &str) -> Result<String> {
        let sentence = Sentence::parse(sentence)?;
        self.mutate(&sentence)
    }

    /// Run a cached query whose reply must be `YES`, `NO` or `MAYBE`.
    pub fn predicate(&mut self, sentence: &str) -> Result<String> {
        let sentence = Sentence::parse(sentence)?;
        let reply = self.query_parsed(&sentence)?;
        if !is_predicate_answer(&reply) {
            return Err(ClientError::NotPredicate {
                sentence: sentence.into_string(),
                reply,
            });
        }
        Ok(reply)
    }

    /// Drop every cached reply.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The reply cache.
    pub fn cache(&self) -> &ReplyCache {
        &self.cache
    }

    /// Number of round trips performed on this connection.
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Borrow the line reader.
    pub fn reader(&self) -> &LineReader<R> {
        &self.reader
    }

    /// Borrow the sentence writer.
    pub fn writer(&self) -> &SentenceWriter<W> {
        &self.writer
    }

    /// Consume the client and return its reader/writer pair.
    pub fn into_parts(self) -> (LineReader<R>, SentenceWriter<W>) {
        (self.reader, self.writer)
    }

    pub(crate) fn query_parsed(&mut self, sentence: &Sentence) -> Result<String> {
        if let Some(reply) = self.cache.lookup(sentence.as_str()) {
            debug!(sentence = %sentence, "S -> (cached) '{reply}'");
            return Ok(reply);
        }
        let reply = self.exchange(sentence)?;
        self.cache.insert(sentence.as_str(), &reply);
        Ok(reply)
    }

    pub(crate) fn mutate(&mut self, sentence: &Sentence) -> Result<String> {
        self.cache.clear();
        self.exchange(sentence)
    }

    fn exchange(&mut self, sentence: &Sentence) -> Result<String> {
        self.expect_prompt()?;

        debug!("S <- '{sentence}'");
        self.writer.send(sentence.as_str())?;
        self.exchanges += 1;

        let reply = self.reader.read_reply()?;
        debug!("S -> '{reply}'");

        if is_error_reply(&reply) {
            // The diagnostic ends at a line holding only NIL; drain through
            // it so the next prompt is the next thing on the stream.
            let mut lines = vec![reply];
            lines.extend(self.reader.read_until_line(ERROR_TERMINATOR)?);
            let err = parse_error(&lines.join("\n"));
            debug!(message = %err.message(), "remote error");
            return Err(ClientError::Remote(err));
        }

        Ok(reply)
    }

    fn expect_prompt(&mut self) -> Result<()> {
        let line = self.reader.read_line()?;
        if line != self.config.prompt {
            return Err(ClientError::Protocol(format!(
                "expected prompt '{}', got '{line}'",
                self.config.prompt
            )));
        }
        Ok(())
    }
}

impl Client<SconeStream, SconeStream> {
    /// Remote endpoint for diagnostics.
    pub fn peer_label(&self) -> String {
        self.writer.get_ref().peer_label()
    }

    /// Shut the connection down in both directions.
    pub fn close(self) -> Result<()> {
        debug!(peer = %self.peer_label(), "closing connection");
        self.writer.get_ref().shutdown()?;
        Ok(())
    }
}
