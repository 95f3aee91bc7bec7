//! Keyed identity paths.
//!
//! Every call made during a traversal contributes a local key ([`Ckey`]) to the
//! scope it is made in. The stack of local keys active at a call, joined by a
//! separator, is the call's composite identity ([`Ikey`]). As long as the
//! sequence of calls and their keys at a nesting level does not change, the
//! same identity comes out of every pass, which is what lets the runtime
//! recognize and patch an instance instead of recreating it.
//!
//! Call sites usually key themselves with `#[track_caller]`:
//!
//! ```rust
//! use tessel_core::{Ckey, KeyPath};
//!
//! #[track_caller]
//! fn site() -> Ckey<'static> {
//!     Ckey::here()
//! }
//!
//! let mut keys = KeyPath::new('/');
//! let first = keys.push(site()).to_owned();
//! keys.pop();
//! let second = keys.push(site()).to_owned();
//! keys.pop();
//! // Two call sites, two identities
//! assert_ne!(first, second);
//! ```
//!
//! Inside loops, where one call site runs many times, callers push an explicit
//! key per item ([`Ckey::Named`] or [`Ckey::Index`]).
//!
//! Each kind of key is written with its own leading character (`@` for call
//! sites, `#` for indices, `_` for runtime keys). A named key that could be
//! mistaken for another kind, or that contains the separator, is escaped with
//! `\`, so distinct key stacks never join to the same identity and no key
//! joins to the empty identity of the root.

use std::borrow::Borrow;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::panic::Location;
use std::rc::Rc;

use rustc_hash::{FxHashSet, FxHasher};
use smallvec::SmallVec;

/// A local key contributed by one call site within its parent scope
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ckey<'k> {
    /// The source location of the call
    Site(&'static Location<'static>),
    /// An explicit, caller-provided key
    Named(&'k str),
    /// A positional key (loop index)
    Index(usize),
    /// A key owned by the runtime, written as `_name`
    Reserved(&'static str),
}

impl Ckey<'static> {
    /// Key the caller's source location
    #[track_caller]
    pub fn here() -> Self {
        Self::Site(Location::caller())
    }
}

impl Ckey<'_> {
    /// Stable 64-bit fingerprint used for duplicate detection
    fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        match self {
            Self::Site(loc) => {
                0u8.hash(&mut hasher);
                loc.file().hash(&mut hasher);
                loc.line().hash(&mut hasher);
                loc.column().hash(&mut hasher);
            }
            Self::Named(name) => {
                1u8.hash(&mut hasher);
                name.hash(&mut hasher);
            }
            Self::Index(index) => {
                2u8.hash(&mut hasher);
                index.hash(&mut hasher);
            }
            Self::Reserved(name) => {
                3u8.hash(&mut hasher);
                name.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Append this key as one path segment
    fn write_segment(&self, buf: &mut String, separator: char) {
        match self {
            Self::Named(name) if needs_escape(name, separator) => {
                buf.push(ESCAPE);
                for ch in name.chars() {
                    if ch == ESCAPE || ch == separator {
                        buf.push(ESCAPE);
                    }
                    buf.push(ch);
                }
            }
            // Writing into a String cannot fail
            _ => {
                let _ = write!(buf, "{self}");
            }
        }
    }
}

const ESCAPE: char = '\\';

/// Leading characters that mark site, index, runtime and escaped segments
const MARKERS: [char; 4] = ['@', '#', '_', ESCAPE];

fn needs_escape(name: &str, separator: char) -> bool {
    match name.chars().next() {
        None => true,
        Some(lead) => MARKERS.contains(&lead) || name.contains([separator, ESCAPE]),
    }
}

impl fmt::Display for Ckey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site(loc) => {
                let mut hasher = FxHasher::default();
                loc.file().hash(&mut hasher);
                write!(f, "@{:016x}:{}:{}", hasher.finish(), loc.line(), loc.column())
            }
            Self::Named(name) => f.write_str(name),
            Self::Index(index) => write!(f, "#{index}"),
            Self::Reserved(name) => write!(f, "_{name}"),
        }
    }
}

/// A composite identity (cheap to clone)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ikey(Rc<str>);

impl Ikey {
    /// Borrow the identity as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Ikey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Ikey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ikey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ikey {
    fn from(value: &str) -> Self {
        Self(Rc::from(value))
    }
}

impl From<String> for Ikey {
    fn from(value: String) -> Self {
        Self(Rc::from(value))
    }
}

impl PartialEq<str> for Ikey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Ikey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for Ikey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Ikey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ikey({:?})", &*self.0)
    }
}

/// The stack of local keys active during a traversal.
///
/// The composite identity is kept in a single buffer; `push` appends a
/// separator and the key, `pop` truncates back to the previous length, so
/// walking the tree does not allocate once the buffer has grown.
///
/// Duplicate local keys in one scope map two calls onto one identity. That is
/// unsupported; with duplicate tracking on, each scope remembers the keys it
/// has seen and the repeat is logged.
pub struct KeyPath {
    buf: String,
    marks: SmallVec<[usize; 16]>,
    separator: char,
    track_duplicates: bool,
    /// Keys seen per depth; `scopes[d]` belongs to the scope currently open at depth `d`
    scopes: Vec<FxHashSet<u64>>,
    duplicates: usize,
}

impl KeyPath {
    /// Create an empty path joining keys with `separator`.
    ///
    /// A separator that is also a segment marker (`@`, `#`, `_` or `\`)
    /// falls back to `/`.
    pub fn new(separator: char) -> Self {
        let separator = if MARKERS.contains(&separator) {
            tracing::warn!(%separator, "separator collides with a key marker; using '/'");
            '/'
        } else {
            separator
        };
        Self {
            buf: String::new(),
            marks: SmallVec::new(),
            separator,
            track_duplicates: false,
            scopes: vec![FxHashSet::default()],
            duplicates: 0,
        }
    }

    /// Enable or disable per-scope duplicate key tracking
    pub fn with_duplicate_tracking(mut self, enabled: bool) -> Self {
        self.track_duplicates = enabled;
        self
    }

    /// Enter a nested scope and return the new composite identity
    pub fn push(&mut self, ckey: Ckey<'_>) -> &str {
        let depth = self.marks.len();
        if self.track_duplicates {
            self.note_key(depth, &ckey);
        }

        self.marks.push(self.buf.len());
        if depth > 0 {
            self.buf.push(self.separator);
        }
        ckey.write_segment(&mut self.buf, self.separator);
        &self.buf
    }

    /// Leave the innermost scope
    pub fn pop(&mut self) {
        match self.marks.pop() {
            Some(mark) => self.buf.truncate(mark),
            None => tracing::warn!("KeyPath::pop called on an empty path"),
        }
    }

    /// The composite identity of the innermost scope
    pub fn current(&self) -> &str {
        &self.buf
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    /// Number of duplicate keys seen since the last [`reset`](Self::reset)
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Clear the path at the start of a pass.
    ///
    /// A non-empty path means some scope was pushed and never popped.
    pub fn reset(&mut self) {
        if !self.marks.is_empty() {
            tracing::warn!(
                depth = self.marks.len(),
                path = %self.buf,
                "unbalanced key path at pass start"
            );
        }
        self.buf.clear();
        self.marks.clear();
        self.duplicates = 0;
        if let Some(root) = self.scopes.first_mut() {
            root.clear();
        }
    }

    fn note_key(&mut self, depth: usize, ckey: &Ckey<'_>) {
        while self.scopes.len() <= depth + 1 {
            self.scopes.push(FxHashSet::default());
        }
        if !self.scopes[depth].insert(ckey.fingerprint()) {
            self.duplicates += 1;
            tracing::warn!(
                scope = %self.buf,
                key = %ckey,
                "duplicate key in one scope; both calls share a single instance"
            );
        }
        // The scope being entered starts with no children seen
        self.scopes[depth + 1].clear();
    }
}

impl Default for KeyPath {
    fn default() -> Self {
        Self::new('/')
    }
}

impl fmt::Debug for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPath({:?})", self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_nesting() {
        let mut keys = KeyPath::new('/');
        assert_eq!(keys.push(Ckey::Named("app")), "app");
        assert_eq!(keys.push(Ckey::Named("list")), "app/list");
        assert_eq!(keys.push(Ckey::Index(2)), "app/list/#2");
        keys.pop();
        assert_eq!(keys.current(), "app/list");
        keys.pop();
        keys.pop();
        assert_eq!(keys.current(), "");
        assert_eq!(keys.depth(), 0);
    }

    #[test]
    fn test_identity_stable_across_passes() {
        let mut keys = KeyPath::new('.');
        let run = |keys: &mut KeyPath| {
            keys.reset();
            keys.push(Ckey::Named("a"));
            let id = keys.push(Ckey::Index(1)).to_owned();
            keys.pop();
            keys.pop();
            id
        };
        assert_eq!(run(&mut keys), run(&mut keys));
    }

    #[test]
    fn test_call_sites_differ() {
        let a = Ckey::here();
        let b = Ckey::here();
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_duplicate_detection() {
        let mut keys = KeyPath::new('/').with_duplicate_tracking(true);
        keys.push(Ckey::Named("x"));
        keys.pop();
        keys.push(Ckey::Named("x"));
        keys.pop();
        assert_eq!(keys.duplicates(), 1);

        // Same local key under different parents is fine
        keys.reset();
        keys.push(Ckey::Named("p1"));
        keys.push(Ckey::Named("child"));
        keys.pop();
        keys.pop();
        keys.push(Ckey::Named("p2"));
        keys.push(Ckey::Named("child"));
        keys.pop();
        keys.pop();
        assert_eq!(keys.duplicates(), 0);
    }

    #[test]
    fn test_duplicates_ignored_without_tracking() {
        let mut keys = KeyPath::new('/');
        keys.push(Ckey::Named("x"));
        keys.pop();
        keys.push(Ckey::Named("x"));
        keys.pop();
        assert_eq!(keys.duplicates(), 0);
    }

    #[test]
    fn test_named_keys_cannot_forge_other_segments() {
        let mut keys = KeyPath::new('/');
        let joined = keys.push(Ckey::Named("a/b")).to_owned();
        keys.pop();
        keys.push(Ckey::Named("a"));
        let nested = keys.push(Ckey::Named("b")).to_owned();
        keys.pop();
        keys.pop();
        assert_ne!(joined, nested);
        assert_eq!(joined, "\\a\\/b");

        let named = keys.push(Ckey::Named("#0")).to_owned();
        keys.pop();
        let index = keys.push(Ckey::Index(0)).to_owned();
        keys.pop();
        assert_ne!(named, index);

        let named = keys.push(Ckey::Named("_t")).to_owned();
        keys.pop();
        let reserved = keys.push(Ckey::Reserved("t")).to_owned();
        keys.pop();
        assert_ne!(named, reserved);
        assert_eq!(reserved, "_t");

        // Escaping keeps an escaped separator apart from a real one
        keys.push(Ckey::Named("x\\"));
        let trailing = keys.push(Ckey::Named("y")).to_owned();
        keys.pop();
        keys.pop();
        let inner = keys.push(Ckey::Named("x\\/y")).to_owned();
        keys.pop();
        assert_ne!(trailing, inner);
    }

    #[test]
    fn test_empty_name_is_not_the_root_identity() {
        let mut keys = KeyPath::new('/');
        assert_eq!(keys.push(Ckey::Named("")), "\\");
        keys.pop();
        assert_eq!(keys.current(), "");
    }

    #[test]
    fn test_plain_names_are_written_verbatim() {
        let mut keys = KeyPath::new('.');
        keys.push(Ckey::Named("a/b"));
        assert_eq!(keys.push(Ckey::Named("user-42")), "a/b.user-42");
    }

    #[test]
    fn test_site_keys_tag_the_whole_file_hash() {
        let site = Ckey::here().to_string();
        let (tag, _) = site.split_once(':').unwrap();
        assert!(tag.starts_with('@'));
        assert_eq!(tag.len(), 17);
    }

    #[test]
    fn test_marker_separator_falls_back() {
        let mut keys = KeyPath::new('#');
        keys.push(Ckey::Named("a"));
        assert_eq!(keys.push(Ckey::Index(1)), "a/#1");
    }

    #[test]
    fn test_ikey_borrows_as_str() {
        let ikey = Ikey::from("a/b");
        let mut set = std::collections::HashSet::new();
        set.insert(ikey.clone());
        assert!(set.contains("a/b"));
        assert_eq!(ikey, "a/b");
    }
}
