use std::io::{Read, Write};
use std::path::Path;

use scone_client::{Client, Sentence};
use tracing::{error, info};

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::walker::knowledge_files;

/// Something that can run a mutating sentence against a knowledge base.
pub trait SentenceExecutor {
    /// Run `sentence`, returning the server's reply.
    fn execute(&mut self, sentence: &Sentence) -> scone_client::Result<String>;
}

impl<R: Read, W: Write> SentenceExecutor for Client<R, W> {
    fn execute(&mut self, sentence: &Sentence) -> scone_client::Result<String> {
        self.sentence(sentence.as_str())
    }
}

/// Ask the server to load every knowledge file under `root`, in
/// [`knowledge_files`] order. Returns the number of files loaded.
///
/// Paths are sent as absolute paths. The first failing file stops the load;
/// files already loaded stay loaded.
pub fn load_local_knowledge<E: SentenceExecutor + ?Sized>(
    executor: &mut E,
    root: &Path,
    config: &LoaderConfig,
) -> Result<usize> {
    let files = knowledge_files(root, config)?;
    info!(root = %root.display(), count = files.len(), "loading knowledge files");

    for file in &files {
        let path = std::path::absolute(file).map_err(|source| LoadError::Walk {
            path: file.clone(),
            source,
        })?;
        info!(path = %path.display(), "loading knowledge file");

        if let Err(source) = executor.execute(&Sentence::load_kb(&path)) {
            error!(path = %path.display(), error = %source, "knowledge file failed to load");
            return Err(LoadError::LoadFailed { path, source });
        }
    }

    Ok(files.len())
}
