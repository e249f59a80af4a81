use std::collections::BTreeMap;

use crate::record::Record;

// ═══════════════════════════════════════════════════════════════
//  LogStore
// ═══════════════════════════════════════════════════════════════

/// Offset-indexed replica log.
///
/// Records are unique per offset and iterate in ascending order.
/// `watermark` is the length of the contiguous prefix `0..watermark`,
/// i.e. the first offset not yet received. It only ever grows.
///
/// No locking here: the owner (`Node`) wraps the store in a `RwLock`.
#[derive(Debug, Default)]
pub struct LogStore {
    records: BTreeMap<u64, Record>,
    watermark: u64,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record unless its offset is already present.
    ///
    /// Returns `false` for a duplicate; the stored copy is kept as is.
    pub fn insert(&mut self, record: Record) -> bool {
        use std::collections::btree_map::Entry;

        match self.records.entry(record.offset) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                self.advance_watermark();
                true
            }
        }
    }

    fn advance_watermark(&mut self) {
        while self.records.contains_key(&self.watermark) {
            match self.watermark.checked_add(1) {
                Some(next) => self.watermark = next,
                None => break,
            }
        }
    }

    /// Longest run `0, 1, 2, ...` without a hole.
    /// Records past the first gap are withheld.
    pub fn prefix(&self) -> Vec<Record> {
        self.records
            .range(..self.watermark)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Offsets in `[0, upper]` not present, ascending.
    pub fn missing(&self, upper: u64) -> Vec<u64> {
        // Everything below the watermark is present.
        if upper < self.watermark {
            return Vec::new();
        }

        let mut missing = Vec::new();
        let mut next = self.watermark;
        for &offset in self.records.range(self.watermark..=upper).map(|(o, _)| o) {
            missing.extend(next..offset);
            match offset.checked_add(1) {
                Some(n) => next = n,
                None => return missing,
            }
        }
        if next <= upper {
            missing.extend(next..=upper);
        }
        missing
    }

    /// Full ascending snapshot, including records beyond a gap.
    pub fn records(&self) -> Vec<Record> {
        self.records.values().cloned().collect()
    }

    pub fn contains(&self, offset: u64) -> bool {
        self.records.contains_key(&offset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First missing offset == length of the contiguous prefix.
    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    pub fn max_offset(&self) -> Option<u64> {
        self.records.keys().next_back().copied()
    }
}
