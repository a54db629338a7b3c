use std::collections::BTreeMap;

use crate::core::error::Error;

pub type Location = u64;

/// Packs a (subject index, position) pair into a single 64-bit location:
/// subject index in the high 32 bits, position in the low 32 bits.
pub fn pack_location(subject_index: u32, position: u32) -> Location {
    ((subject_index as u64) << 32) | position as u64
}

pub fn unpack_location(loc: Location) -> (u32, u32) {
    ((loc >> 32) as u32, (loc & 0xFFFF_FFFF) as u32)
}

const EMPTY: &[Location] = &[];

/// Direct-addressed index: a primary vector of length `2^width` holding
/// slot pointers into a secondary vector-of-vectors. Slot 0 is the
/// sentinel "no list"; the secondary vector's slot 0 is always empty, so
/// an absent code and an empty list are the same representation.
pub struct DenseIndex {
    width: u32,
    primary: Vec<u32>,
    secondary: Vec<Vec<Location>>,
}

impl DenseIndex {
    pub fn new(width: u32) -> Self {
        let primary_len = 1usize << width;
        DenseIndex {
            width,
            primary: vec![0u32; primary_len],
            secondary: vec![Vec::new()],
        }
    }

    /// Rebuilds a dense index from previously persisted slot pointers and
    /// location lists, as read back by `IndexBinaryCodec`.
    pub fn from_parts(width: u32, primary: Vec<u32>, secondary: Vec<Vec<Location>>) -> Self {
        DenseIndex {
            width,
            primary,
            secondary,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn secondary(&self) -> &[Vec<Location>] {
        &self.secondary
    }

    /// Estimated byte size of the primary array alone (the figure the
    /// dense/sparse selection decision is based on).
    pub fn estimated_primary_bytes(width: u32) -> u64 {
        (1u64 << width) * std::mem::size_of::<u32>() as u64
    }

    pub fn add(&mut self, code: u64, loc: Location) {
        let slot = self.primary[code as usize];
        if slot == 0 {
            self.secondary.push(vec![loc]);
            self.primary[code as usize] = (self.secondary.len() - 1) as u32;
        } else {
            self.secondary[slot as usize].push(loc);
        }
    }

    pub fn get(&self, code: u64) -> &[Location] {
        if (code as usize) >= self.primary.len() {
            return EMPTY;
        }
        let slot = self.primary[code as usize];
        if slot == 0 {
            EMPTY
        } else {
            &self.secondary[slot as usize]
        }
    }

    pub fn size(&self) -> usize {
        self.secondary.len() - 1
    }

    /// Iterates (code, slot) pairs for non-empty entries, in code order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, &[Location])> {
        self.primary.iter().enumerate().filter_map(|(code, &slot)| {
            if slot == 0 {
                None
            } else {
                Some((code as u64, self.secondary[slot as usize].as_slice()))
            }
        })
    }

    /// Iterates (code, slot, locations) triples for non-empty entries, in
    /// code order. Used by the binary codec, which persists slot pointers
    /// verbatim rather than rebuilding them through `add`.
    pub fn entries_with_slot(&self) -> impl Iterator<Item = (u64, u32, &[Location])> {
        self.primary.iter().enumerate().filter_map(|(code, &slot)| {
            if slot == 0 {
                None
            } else {
                Some((code as u64, slot, self.secondary[slot as usize].as_slice()))
            }
        })
    }
}

/// Ordered-map index: a `BTreeMap` from code to the same kind of slot
/// pointer used by `DenseIndex`, chosen when the dense primary array
/// would not fit the configured memory budget.
pub struct SparseIndex {
    primary: BTreeMap<u64, u32>,
    secondary: Vec<Vec<Location>>,
}

impl SparseIndex {
    pub fn new() -> Self {
        SparseIndex {
            primary: BTreeMap::new(),
            secondary: vec![Vec::new()],
        }
    }

    /// Rebuilds a sparse index from previously persisted slot pointers and
    /// location lists, as read back by `IndexBinaryCodec`.
    pub fn from_parts(primary: BTreeMap<u64, u32>, secondary: Vec<Vec<Location>>) -> Self {
        SparseIndex { primary, secondary }
    }

    pub fn secondary(&self) -> &[Vec<Location>] {
        &self.secondary
    }

    pub fn add(&mut self, code: u64, loc: Location) {
        match self.primary.get(&code) {
            Some(&slot) => self.secondary[slot as usize].push(loc),
            None => {
                self.secondary.push(vec![loc]);
                let slot = (self.secondary.len() - 1) as u32;
                self.primary.insert(code, slot);
            }
        }
    }

    pub fn get(&self, code: u64) -> &[Location] {
        match self.primary.get(&code) {
            Some(&slot) => &self.secondary[slot as usize],
            None => EMPTY,
        }
    }

    pub fn size(&self) -> usize {
        self.primary.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (u64, &[Location])> {
        self.primary
            .iter()
            .map(move |(&code, &slot)| (code, self.secondary[slot as usize].as_slice()))
    }

    /// Iterates (code, slot, locations) triples in code order. Used by the
    /// binary codec to persist slot pointers verbatim.
    pub fn entries_with_slot(&self) -> impl Iterator<Item = (u64, u32, &[Location])> {
        self.primary
            .iter()
            .map(move |(&code, &slot)| (code, slot, self.secondary[slot as usize].as_slice()))
    }
}

impl Default for SparseIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Mapping from canonical k-mer code to the ordered list of locations
/// where it occurs, implemented as either a direct-addressed vector or an
/// ordered map depending on which fits the memory budget.
pub enum KmerIndex {
    Dense(DenseIndex),
    Sparse(SparseIndex),
}

impl KmerIndex {
    /// Builds whichever implementation fits `memory_budget_bytes`, per
    /// the estimated size of the dense primary array for this k.
    pub fn for_ksize(k: u32, memory_budget_bytes: u64) -> Result<Self, Error> {
        let width = 2 * k - 1;
        if width > 63 {
            return Err(Error::UnsupportedK { k, max: 31 });
        }
        let estimated = DenseIndex::estimated_primary_bytes(width);
        if estimated <= memory_budget_bytes {
            Ok(KmerIndex::Dense(DenseIndex::new(width)))
        } else {
            Ok(KmerIndex::Sparse(SparseIndex::new()))
        }
    }

    pub fn add(&mut self, code: u64, loc: Location) {
        match self {
            KmerIndex::Dense(d) => d.add(code, loc),
            KmerIndex::Sparse(s) => s.add(code, loc),
        }
    }

    pub fn get(&self, code: u64) -> &[Location] {
        match self {
            KmerIndex::Dense(d) => d.get(code),
            KmerIndex::Sparse(s) => s.get(code),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            KmerIndex::Dense(d) => d.size(),
            KmerIndex::Sparse(s) => s.size(),
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, KmerIndex::Dense(_))
    }

    /// All (code, locations) pairs with a non-empty list, in code order.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (u64, &[Location])> + '_> {
        match self {
            KmerIndex::Dense(d) => Box::new(d.entries()),
            KmerIndex::Sparse(s) => Box::new(s.entries()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_packing_roundtrips() {
        let loc = pack_location(7, 42);
        assert_eq!(unpack_location(loc), (7, 42));
    }

    #[test]
    fn absent_code_returns_empty_slice_not_error() {
        let idx = DenseIndex::new(5);
        assert!(idx.get(3).is_empty());
        let sidx = SparseIndex::new();
        assert!(sidx.get(3).is_empty());
    }

    #[test]
    fn dense_and_sparse_agree_on_same_insertions() {
        let mut dense = DenseIndex::new(9); // k=5 -> width 9
        let mut sparse = SparseIndex::new();
        let insertions = [(3u64, 100u64), (3, 101), (7, 5), (511, 9999)];
        for &(code, loc) in &insertions {
            dense.add(code, loc);
            sparse.add(code, loc);
        }
        for code in [3u64, 7, 511, 42] {
            assert_eq!(dense.get(code), sparse.get(code));
        }
        assert_eq!(dense.size(), sparse.size());
    }

    #[test]
    fn budget_selects_sparse_when_dense_too_large() {
        let huge_k = 31; // width 61, primary would be far beyond any budget
        let idx = KmerIndex::for_ksize(huge_k, 1 << 20).unwrap();
        assert!(!idx.is_dense());
    }

    #[test]
    fn budget_selects_dense_when_it_fits() {
        let idx = KmerIndex::for_ksize(3, 1 << 20).unwrap(); // width 5, tiny
        assert!(idx.is_dense());
    }
}
