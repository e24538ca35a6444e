use std::collections::{BTreeMap, HashMap};

/// Bounded reply cache keyed by exact sentence text.
///
/// Least-recently-used entries are evicted once `capacity` is reached.
/// There is no per-key invalidation: any mutating sentence may change any
/// cached answer, so callers clear the whole cache.
#[derive(Debug, Clone)]
pub struct ReplyCache {
    capacity: usize,
    entries: HashMap<String, Entry>,
    recency: BTreeMap<u64, String>,
    tick: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    reply: String,
    last_used: u64,
}

impl ReplyCache {
    /// Create a cache holding at most `capacity` replies.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    /// Look up a cached reply, marking it most recently used.
    pub fn lookup(&mut self, sentence: &str) -> Option<String> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(sentence)?;
        self.recency.remove(&entry.last_used);
        entry.last_used = tick;
        self.recency.insert(tick, sentence.to_string());
        Some(entry.reply.clone())
    }

    /// Store a reply, evicting the least recently used entry when full.
    pub fn insert(&mut self, sentence: &str, reply: &str) {
        if self.capacity == 0 {
            return;
        }

        let tick = self.next_tick();
        if let Some(entry) = self.entries.get_mut(sentence) {
            self.recency.remove(&entry.last_used);
            entry.reply = reply.to_string();
            entry.last_used = tick;
            self.recency.insert(tick, sentence.to_string());
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            sentence.to_string(),
            Entry {
                reply: reply.to_string(),
                last_used: tick,
            },
        );
        self.recency.insert(tick, sentence.to_string());
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Whether a reply is cached for `sentence`, without touching recency.
    pub fn contains(&self, sentence: &str) -> bool {
        self.entries.contains_key(sentence)
    }

    /// Number of cached replies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no replies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached replies.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}
