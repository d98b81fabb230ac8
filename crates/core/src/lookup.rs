// SPDX-License-Identifier: MIT

//! Prefix-unique lookup. Lets admin commands (`reload`, `kill`, `goto`, …)
//! and the command dispatcher's target resolution accept a unique prefix of
//! an object id or player name instead of the full string.

/// Result of resolving a prefix against a collection of full keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixMatch<K> {
    None,
    Unique(K),
    Ambiguous(Vec<K>),
}

/// Finds every key equal to, or prefixed by, `needle`. An exact match is
/// always treated as unique even if it is also a prefix of other keys (an
/// exact id always wins over a would-be-ambiguous prefix of a longer one).
pub fn find_by_prefix<'a, I, K>(keys: I, needle: &str) -> PrefixMatch<K>
where
    I: IntoIterator<Item = &'a K>,
    K: AsRef<str> + Clone + 'a,
{
    let mut matches: Vec<K> = Vec::new();
    for key in keys {
        let s = key.as_ref();
        if s == needle {
            return PrefixMatch::Unique(key.clone());
        }
        if s.starts_with(needle) {
            matches.push(key.clone());
        }
    }
    match matches.len() {
        0 => PrefixMatch::None,
        1 => PrefixMatch::Unique(matches.remove(0)),
        _ => PrefixMatch::Ambiguous(matches),
    }
}
