//! An append-only string interner assigning stable positive integer ids.
//!
//! Interning the same text twice returns the same [`NameId`]; ids are
//! handed out starting from 1 and never change or disappear afterwards.
//! Id 0 is reserved to mean "absent" and is never returned for a string.
//!
//! # Usage
//! ```
//! use nameintern::Interner;
//!
//! let mut strs = Interner::new();
//! let a = strs.intern("clk");
//! assert_eq!(strs.intern("clk"), a);
//! assert_eq!(strs.str(a), "clk");
//! ```

use std::collections::HashMap;
use std::fmt;
use compact_str::CompactString;

/// A stable id for an interned string.
///
/// Id 0 is the reserved "absent" value: it never refers to a string.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub u32);

impl NameId {
    /// The reserved "absent" id.
    pub const NONE: NameId = NameId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for NameId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NameId({})", self.0)
    }
}

/// The interner itself.
///
/// Typically created once per design, preloaded with whatever reserved
/// names the client needs at fixed low ids, then shared by the parser
/// and every object built from it.
#[derive(Clone)]
pub struct Interner {
    ids: HashMap<CompactString, NameId>,
    // strs[0] is a placeholder for the reserved absent id.
    strs: Vec<CompactString>,
}

impl Interner {
    pub fn new() -> Interner {
        Interner {
            ids: HashMap::new(),
            strs: vec![CompactString::new("")],
        }
    }

    /// Intern a string, returning its stable id.
    pub fn intern(&mut self, s: &str) -> NameId {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = NameId(self.strs.len() as u32);
        self.strs.push(CompactString::from(s));
        self.ids.insert(CompactString::from(s), id);
        id
    }

    /// Intern a raw byte range. Non-UTF-8 bytes are replaced, which
    /// never happens for the ASCII sources this is used on.
    #[inline]
    pub fn intern_bytes(&mut self, b: &[u8]) -> NameId {
        match std::str::from_utf8(b) {
            Ok(s) => self.intern(s),
            Err(_) => self.intern(&String::from_utf8_lossy(b)),
        }
    }

    /// Look a string up without inserting it. Returns [`NameId::NONE`]
    /// if it was never interned.
    #[inline]
    pub fn get(&self, s: &str) -> NameId {
        self.ids.get(s).copied().unwrap_or(NameId::NONE)
    }

    /// The text of an interned id. [`NameId::NONE`] maps to `""`.
    #[inline]
    pub fn str(&self, id: NameId) -> &str {
        &self.strs[id.0 as usize]
    }

    /// Whether `id` was handed out by this interner.
    #[inline]
    pub fn contains(&self, id: NameId) -> bool {
        id.is_some() && (id.0 as usize) < self.strs.len()
    }

    /// Number of interned strings (the absent slot does not count).
    #[inline]
    pub fn len(&self) -> usize {
        self.strs.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Interner {
    fn default() -> Interner {
        Interner::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Interner({} strings)", self.len())
    }
}

#[test]
fn test_intern_stable() {
    let mut strs = Interner::new();
    assert!(strs.is_empty());
    let a = strs.intern("alpha");
    let b = strs.intern("beta");
    assert_eq!(a, NameId(1));
    assert_eq!(b, NameId(2));
    assert_eq!(strs.intern("alpha"), a);
    assert_eq!(strs.intern_bytes(b"beta"), b);
    assert_eq!(strs.str(a), "alpha");
    assert_eq!(strs.str(b), "beta");
    assert_eq!(strs.len(), 2);
}

#[test]
fn test_absent() {
    let strs = Interner::new();
    assert_eq!(strs.get("missing"), NameId::NONE);
    assert!(NameId::NONE.is_none());
    assert!(!strs.contains(NameId::NONE));
    assert_eq!(strs.str(NameId::NONE), "");
}
