use crate::offsets::{CongruentOffset, OffsetKey};

/// Storage for nearest-offset search results.
///
/// Entries are keyed on everything the search depends on, so a stale entry
/// is never wrong for its own key. Owners still call [`OffsetMemo::clear`]
/// when generators, modulus or cell size change to keep the store from
/// growing with keys that will not be asked for again.
pub trait OffsetMemo {
    fn lookup(&self, key: &OffsetKey) -> Option<&MemoEntry>;

    fn store(&mut self, key: OffsetKey, entry: MemoEntry);

    fn clear(&mut self);
}

/// Sorted candidates for one key, plus whether the search ran to its radius cap.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoEntry {
    pub candidates: Vec<CongruentOffset>,
    pub exhausted: bool,
}

impl MemoEntry {
    /// True when this entry can answer a request for `need` offsets without searching again.
    pub fn satisfies(&self, need: usize) -> bool {
        self.exhausted || self.candidates.len() >= need
    }
}

/// A memo that remembers nothing; every call searches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemo;

impl OffsetMemo for NoMemo {
    fn lookup(&self, _key: &OffsetKey) -> Option<&MemoEntry> {
        None
    }

    fn store(&mut self, _key: OffsetKey, _entry: MemoEntry) {}

    fn clear(&mut self) {}
}
