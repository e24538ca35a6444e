//! In-process stand-in for a Scone server.
//!
//! Speaks the real wire protocol over TCP and keeps a tiny knowledge base
//! with an append-only element history, enough to exercise prompts,
//! multi-line replies, error diagnostics and checkpoint rollback.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::client::SconeClient;
use crate::config::ClientConfig;
use crate::connector::connect_with_config;
use crate::error::Result;
use crate::protocol::{ERROR_SENTINEL, ERROR_TERMINATOR, MAYBE, NO, PROMPT, YES};

/// What an element of the knowledge base is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Type,
    Individual,
    IsA { child: String, parent: String },
}

/// One entry of the append-only element history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub parent: Option<String>,
    pub kind: ElementKind,
}

/// Knowledge base state behind a [`FakeScone`].
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    elements: Vec<Element>,
    disjoint: Vec<(String, String)>,
    loaded: Vec<String>,
    next_link: u64,
}

impl KnowledgeBase {
    /// A small taxonomy: animals split into disjoint birds and mammals,
    /// plus a couple of unrelated types.
    pub fn with_core_types() -> Self {
        let mut kb = Self::default();
        kb.add_type("{thing}", None);
        for (name, parent) in [
            ("{animal}", "{thing}"),
            ("{bird}", "{animal}"),
            ("{mammal}", "{animal}"),
            ("{elephant}", "{mammal}"),
            ("{tiger}", "{mammal}"),
            ("{air transport}", "{thing}"),
            ("{broom}", "{thing}"),
        ] {
            kb.add_type(name, Some(parent));
        }
        kb.disjoint
            .push(("{bird}".to_string(), "{mammal}".to_string()));
        kb
    }

    fn add_type(&mut self, name: &str, parent: Option<&str>) {
        self.elements.push(Element {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            kind: ElementKind::Type,
        });
    }

    /// Element history, oldest first.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Whether an element named `name` (braces included) exists.
    pub fn contains(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.name == name)
    }

    /// Paths received through `load-kb`, in order.
    pub fn loaded_files(&self) -> &[String] {
        &self.loaded
    }

    /// Evaluate one sentence. `Err` carries the diagnostic message.
    pub fn eval(&mut self, sentence: &str) -> std::result::Result<String, String> {
        let body = sentence
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("Malformed expression {sentence}."))?;
        let (function, rest) = match body.split_once(char::is_whitespace) {
            Some((function, rest)) => (function, rest),
            None => (body, ""),
        };
        let args = tokenize(rest);

        match (function, args.as_slice()) {
            ("new-indv", [name, parent]) => self.new_element(name, parent, ElementKind::Individual),
            ("new-type", [name, parent]) => self.new_element(name, parent, ElementKind::Type),
            ("is-x-a-y?", [x, y]) => self.is_x_a_y(x, y),
            ("new-is-a", [x, y]) => self.new_is_a(x, y),
            ("list-instances", [parent]) => self.list_instances(parent),
            ("remove-elements-after", [marker]) => self.remove_elements_after(marker),
            ("remove-last-element", []) => {
                self.elements.pop();
                Ok(ERROR_TERMINATOR.to_string())
            }
            ("load-kb", [path]) => self.load_kb(path),
            _ => Err(format!(
                "The function COMMON-LISP-USER::{} is undefined.",
                function.to_uppercase()
            )),
        }
    }

    fn require(&self, name: &str) -> std::result::Result<(), String> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(format!("Cannot find an element named {name}."))
        }
    }

    fn new_element(
        &mut self,
        name: &str,
        parent: &str,
        kind: ElementKind,
    ) -> std::result::Result<String, String> {
        self.require(parent)?;
        if self.contains(name) {
            return Err(format!("An element named {name} already exists."));
        }
        self.elements.push(Element {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            kind,
        });
        Ok(name.to_string())
    }

    fn ancestors(&self, name: &str) -> Vec<String> {
        let mut seen = vec![name.to_string()];
        let mut cursor = 0;
        while cursor < seen.len() {
            let current = seen[cursor].clone();
            for element in &self.elements {
                let next = match &element.kind {
                    ElementKind::IsA { child, parent } if *child == current => Some(parent),
                    ElementKind::Type | ElementKind::Individual if element.name == current => {
                        element.parent.as_ref()
                    }
                    _ => None,
                };
                if let Some(next) = next {
                    if !seen.contains(next) {
                        seen.push(next.clone());
                    }
                }
            }
            cursor += 1;
        }
        seen
    }

    fn conflicts(&self, x: &str, y: &str) -> bool {
        let xs = self.ancestors(x);
        let ys = self.ancestors(y);
        self.disjoint.iter().any(|(a, b)| {
            (xs.contains(a) && ys.contains(b)) || (xs.contains(b) && ys.contains(a))
        })
    }

    fn is_x_a_y(&self, x: &str, y: &str) -> std::result::Result<String, String> {
        // Nothing is known about an unknown element, so nothing is ruled out.
        let answer = if !self.contains(x) || !self.contains(y) {
            MAYBE
        } else if self.ancestors(x).iter().any(|a| a == y) {
            YES
        } else if self.conflicts(x, y) {
            NO
        } else {
            MAYBE
        };
        Ok(answer.to_string())
    }

    fn new_is_a(&mut self, x: &str, y: &str) -> std::result::Result<String, String> {
        self.require(x)?;
        self.require(y)?;
        if self.conflicts(x, y) {
            return Err(format!("{x} cannot be a {y}."));
        }
        self.next_link += 1;
        let name = format!("{{Is-A 0-{}}}", self.next_link);
        self.elements.push(Element {
            name: name.clone(),
            parent: None,
            kind: ElementKind::IsA {
                child: x.to_string(),
                parent: y.to_string(),
            },
        });
        Ok(name)
    }

    fn list_instances(&self, parent: &str) -> std::result::Result<String, String> {
        self.require(parent)?;
        let names: Vec<&str> = self
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Individual)
            .filter(|e| self.ancestors(&e.name).iter().skip(1).any(|a| a == parent))
            .map(|e| e.name.as_str())
            .collect();
        if names.is_empty() {
            return Ok(ERROR_TERMINATOR.to_string());
        }
        // One element per line, the way the server pretty-prints lists.
        Ok(format!("({})", names.join("\n ")))
    }

    fn remove_elements_after(&mut self, marker: &str) -> std::result::Result<String, String> {
        let index = self
            .elements
            .iter()
            .position(|e| e.name == marker)
            .ok_or_else(|| format!("Cannot find an element named {marker}."))?;
        self.elements.truncate(index + 1);
        Ok(ERROR_TERMINATOR.to_string())
    }

    fn load_kb(&mut self, path: &str) -> std::result::Result<String, String> {
        let path = path.trim_matches('"');
        if path.contains("broken") {
            return Err(format!("Syntax error while loading {path}."));
        }
        self.loaded.push(path.to_string());
        Ok("T".to_string())
    }
}

fn tokenize(rest: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        let close = match ch {
            '{' => Some('}'),
            '"' => Some('"'),
            _ => None,
        };
        let mut token = String::new();
        match close {
            Some(close) => {
                token.push(ch);
                chars.next();
                let mut escaped = false;
                for c in chars.by_ref() {
                    token.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == close {
                        break;
                    }
                }
            }
            None => {
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
            }
        }
        tokens.push(token);
    }
    tokens
}

/// Serve one connection until the client hangs up.
pub fn serve<R: BufRead, W: Write>(
    kb: &Mutex<KnowledgeBase>,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<()> {
    loop {
        // Blank padding ahead of the prompt, as the real server emits.
        write!(writer, "\n{PROMPT}\n")?;
        writer.flush()?;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            if !line.trim().is_empty() {
                break;
            }
        }

        let result = lock(kb).eval(&line);
        match result {
            Ok(reply) => writeln!(writer, "{reply}")?,
            Err(message) => write!(
                writer,
                "{ERROR_SENTINEL}\nError: {message}\n{ERROR_TERMINATOR}\n"
            )?,
        }
    }
}

fn lock(kb: &Mutex<KnowledgeBase>) -> MutexGuard<'_, KnowledgeBase> {
    kb.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A fake server listening on an ephemeral loopback port.
///
/// Every accepted connection is served on its own thread against the same
/// shared knowledge base. Threads are detached and end with the process.
pub struct FakeScone {
    addr: SocketAddr,
    kb: Arc<Mutex<KnowledgeBase>>,
}

impl FakeScone {
    /// Start a server with [`KnowledgeBase::with_core_types`].
    pub fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(KnowledgeBase::with_core_types())
    }

    /// Start a server over an explicit knowledge base.
    pub fn spawn_with(kb: KnowledgeBase) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let kb = Arc::new(Mutex::new(kb));

        let shared = Arc::clone(&kb);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    if let Err(err) = serve_stream(&shared, stream) {
                        debug!(error = %err, "fake server connection ended");
                    }
                });
            }
        });

        Ok(Self { addr, kb })
    }

    /// Listening address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Listening host, as text.
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Listening port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Open a client connection with default configuration.
    pub fn connect(&self) -> Result<SconeClient> {
        connect_with_config(&self.host(), self.port(), &ClientConfig::default())
    }

    /// Inspect the shared knowledge base.
    pub fn knowledge_base(&self) -> MutexGuard<'_, KnowledgeBase> {
        lock(&self.kb)
    }
}

fn serve_stream(kb: &Mutex<KnowledgeBase>, stream: TcpStream) -> std::io::Result<()> {
    let reader = BufReader::new(stream.try_clone()?);
    serve(kb, reader, stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_answers() {
        let mut kb = KnowledgeBase::with_core_types();
        assert_eq!(kb.eval("(is-x-a-y? {bird} {animal})").unwrap(), "YES");
        assert_eq!(kb.eval("(is-x-a-y? {bird} {mammal})").unwrap(), "NO");
        assert_eq!(
            kb.eval("(is-x-a-y? {broom} {air transport})").unwrap(),
            "MAYBE"
        );
        assert_eq!(kb.eval("(is-x-a-y? {Nobody} {tiger})").unwrap(), "MAYBE");
    }

    #[test]
    fn is_a_conflicts_are_rejected() {
        let mut kb = KnowledgeBase::with_core_types();
        assert_eq!(kb.eval("(new-indv {Daniel} {elephant})").unwrap(), "{Daniel}");
        assert_eq!(
            kb.eval("(new-is-a {Daniel} {bird})").unwrap_err(),
            "{Daniel} cannot be a {bird}."
        );
        assert_eq!(kb.eval("(new-indv {Carlos} {thing})").unwrap(), "{Carlos}");
        assert!(kb
            .eval("(new-is-a {Carlos} {bird})")
            .unwrap()
            .starts_with("{Is-A 0-"));
    }

    #[test]
    fn remove_after_marker_truncates_history() {
        let mut kb = KnowledgeBase::with_core_types();
        kb.eval("(new-indv {cp} {thing})").unwrap();
        kb.eval("(new-indv {Lucia} {tiger})").unwrap();
        kb.eval("(remove-elements-after {cp})").unwrap();
        assert!(!kb.contains("{Lucia}"));
        assert!(kb.contains("{cp}"));
        kb.eval("(remove-last-element)").unwrap();
        assert!(!kb.contains("{cp}"));
    }

    #[test]
    fn unknown_function_message() {
        let mut kb = KnowledgeBase::with_core_types();
        assert_eq!(
            kb.eval("(missing-function)").unwrap_err(),
            "The function COMMON-LISP-USER::MISSING-FUNCTION is undefined."
        );
    }

    #[test]
    fn tokenizer_keeps_braced_names_with_spaces() {
        assert_eq!(
            tokenize("{broom} {air transport} \"a \\\"b\\\"\" word"),
            vec!["{broom}", "{air transport}", "\"a \\\"b\\\"\"", "word"]
        );
    }

    #[test]
    fn serve_writes_prompt_reply_and_errors() {
        let kb = Mutex::new(KnowledgeBase::with_core_types());
        let input = b"(is-x-a-y? {bird} {animal})\n(missing-function)\n".to_vec();
        let mut output = Vec::new();
        serve(&kb, std::io::Cursor::new(input), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            concat!(
                "\n[PROMPT]\nYES\n",
                "\n[PROMPT]\n*****SCONE-ERROR*****\n",
                "Error: The function COMMON-LISP-USER::MISSING-FUNCTION is undefined.\nNIL\n",
                "\n[PROMPT]\n",
            )
        );
    }
}
