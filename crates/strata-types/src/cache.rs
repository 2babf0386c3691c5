//! Generation-stamped memo tables shared by the hierarchy resolver and the capture registry.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::symbols::Generation;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CacheOptions {
    /// Memoise supertype substitutors across queries.
    #[serde(default = "CacheOptions::default_enabled")]
    pub enabled: bool,

    /// Upper bound on entries per memo table.
    #[serde(default = "CacheOptions::default_max_entries")]
    #[schemars(range(min = 1))]
    pub max_entries: usize,
}

impl CacheOptions {
    fn default_enabled() -> bool {
        true
    }

    fn default_max_entries() -> usize {
        4_096
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            max_entries: Self::default_max_entries(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct Table<K, V> {
    /// Every entry in `map` was computed against this generation.
    generation: Generation,
    map: HashMap<K, V>,
}

/// A memo table whose entries are valid only for the generation they were computed in.
///
/// Inserting under a newer generation drops everything computed against older ones; when the
/// table is full of current entries it is cleared.
///
/// A cache must only ever be used with a single symbol provider. Observing a generation older
/// than one already seen means two providers are sharing it (or a provider went backwards), and
/// is treated as a bug.
pub struct GenerationalCache<K, V> {
    table: RwLock<Table<K, V>>,
    latest: AtomicU64,
    enabled: bool,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> std::fmt::Debug for GenerationalCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationalCache")
            .field("len", &self.table.read().map.len())
            .field("enabled", &self.enabled)
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

impl<K, V> GenerationalCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(options: &CacheOptions) -> Self {
        Self {
            table: RwLock::new(Table {
                generation: Generation::default(),
                map: HashMap::new(),
            }),
            latest: AtomicU64::new(0),
            enabled: options.enabled,
            max_entries: options.max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// A table that is only ever cleared when the generation moves on.
    pub fn unbounded() -> Self {
        Self::new(&CacheOptions {
            enabled: true,
            max_entries: usize::MAX,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, key: &K, generation: Generation) -> Option<V> {
        if !self.enabled {
            return None;
        }
        self.observe(generation);

        let table = self.table.read();
        match table.map.get(key) {
            Some(value) if table.generation == generation => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: K, generation: Generation, value: V) {
        if !self.enabled {
            return;
        }
        self.observe(generation);

        let mut table = self.table.write();
        if generation > table.generation {
            table.map.clear();
            table.generation = generation;
        }
        if table.map.len() >= self.max_entries && !table.map.contains_key(&key) {
            tracing::debug!(max_entries = self.max_entries, "memo table full; clearing");
            table.map.clear();
        }
        table.map.insert(key, value);
    }

    pub fn get_or_insert_with(&self, key: K, generation: Generation, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.get(&key, generation) {
            return hit;
        }
        let value = compute();
        self.insert(key, generation, value.clone());
        value
    }

    pub fn clear(&self) {
        self.table.write().map.clear();
    }

    pub fn len(&self) -> usize {
        self.table.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn observe(&self, generation: Generation) {
        let previous = self.latest.fetch_max(generation.raw(), Ordering::AcqRel);
        assert!(
            generation.raw() >= previous,
            "symbol provider generation went backwards ({} < {previous}); \
             a memo table is shared between providers",
            generation.raw()
        );
    }
}
