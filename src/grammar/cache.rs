//! Process-wide compile cache.
//!
//! The catalog can reference the same `ppr` body from many rule files (and
//! the same body can recur verbatim across catalogs loaded in one process),
//! so compiled grammars are memoized behind a single `Mutex`-guarded LRU
//! keyed by the raw rule-body text. This is the only shared mutable state
//! in the crate — the catalog itself stays immutable.

use super::compile::CompiledGrammar;
use lru::LruCache;
use once_cell::sync::Lazy;
use std::num::NonZeroUsize;
use std::sync::Mutex;

const CACHE_CAPACITY: usize = 256;

static CACHE: Lazy<Mutex<LruCache<String, CompiledGrammar>>> =
    Lazy::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).expect("nonzero capacity"))));

/// Return the cached grammar for `body`, if one has already been compiled.
pub fn get(body: &str) -> Option<CompiledGrammar> {
    CACHE.lock().expect("compile cache poisoned").get(body).cloned()
}

/// Insert a freshly compiled grammar, evicting the least-recently-used
/// entry if the cache is full.
pub fn put(body: &str, compiled: CompiledGrammar) {
    CACHE.lock().expect("compile cache poisoned").put(body.to_string(), compiled);
}

#[cfg(test)]
pub(crate) fn clear_for_test() {
    CACHE.lock().expect("compile cache poisoned").clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::compile_grammar;

    #[test]
    fn compiling_twice_reuses_the_cached_entry() {
        clear_for_test();
        let body = "Word(nums, exact=2)";
        assert!(get(body).is_none());
        compile_grammar(body).unwrap();
        assert!(get(body).is_some());
        compile_grammar(body).unwrap();
    }
}
