//! The linked string table.
//!
//! All interface, method and constant names share one char array in the
//! output. Each distinct string is stored once, NUL-terminated, at the
//! offset right after the previous string; references are byte offsets
//! into the array.

use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct StringTable {
    offsets: FxHashMap<String, usize>,
    order: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        StringTable::default()
    }

    /// Intern `s`, returning its offset in the final char array.
    pub fn intern(&mut self, s: &str) -> usize {
        if let Some(&offset) = self.offsets.get(s) {
            return offset;
        }
        let offset = match self.order.last() {
            Some(last) => self.offsets[last] + last.len() + 1,
            None => 0,
        };
        self.offsets.insert(s.to_owned(), offset);
        self.order.push(s.to_owned());
        offset
    }

    /// Interned strings with their offsets, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order.iter().map(move |s| (s.as_str(), self.offsets[s]))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
