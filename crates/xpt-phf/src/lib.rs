//! Perfect hash function construction.
//!
//! Maps a fixed set of byte-string keys to values with guaranteed
//! single-probe lookup through a two-level scheme: a fixed-size
//! intermediate table indexed by an FNV-1a hash of the key, whose entries
//! either point directly at a value slot (high bit set) or supply the
//! offset basis for a second FNV-1a hash into the value array.
//!
//! The hash computation is part of the wire contract: an independent
//! reader implementation must be able to reproduce lookups bit-for-bit
//! given only the two tables.

use thiserror::Error;

/// FNV-1a offset basis for the first-level hash.
pub const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;

/// FNV-1a prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// High bit of a u32 intermediate entry, marking a direct value index.
pub const U32_HIGH_BIT: u32 = 0x8000_0000;

/// 32-bit FNV-1a over `bytes`, seeded with `basis`.
///
/// The first-level hash uses [`FNV_OFFSET_BASIS`]; second-level hashes use
/// the per-bucket basis stored in the intermediate table.
pub fn fnv1a(bytes: &[u8], basis: u32) -> u32 {
    let mut h = basis;
    for &byte in bytes {
        h ^= u32::from(byte);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Construction failures.
///
/// Both variants are capacity exhaustion of the reserved sentinel bit: the
/// intermediate table stores direct indices and bases in the same u32 space,
/// so neither may reach the high bit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapacityError {
    /// More values than a u32 intermediate entry can index.
    #[error("not enough space in u32 to index {0} values")]
    TooManyValues(usize),

    /// No conflict-free basis exists below the sentinel threshold.
    #[error("not enough space in u32 to store basis for bucket of {0} keys")]
    BasisOverflow(usize),
}

/// A constructed perfect hash function over a fixed key set.
///
/// Lookups for keys that were part of construction return exactly their
/// associated value. Lookups for unknown keys return *some* slot's value
/// (a tolerated false positive); callers that need rejection must verify
/// the result against the key, which is O(1) given a self-describing value.
#[derive(Debug, Clone)]
pub struct PerfectHash<V> {
    inter: Vec<u32>,
    values: Vec<V>,
}

impl<V> PerfectHash<V> {
    /// Build a perfect hash over `data`, with an intermediate table of
    /// `intsize` entries. `intsize` is typically a power of two so readers
    /// get a cheap modulo; it is never resized.
    ///
    /// The basis search is bounded by the reserved sentinel bit. There is no
    /// proven iteration bound below that threshold for adversarial key sets,
    /// so exhausting it is a real (if rare) hard failure; use
    /// [`PerfectHash::with_basis_limit`] to lower the threshold.
    pub fn new(intsize: usize, data: Vec<(Vec<u8>, V)>) -> Result<Self, CapacityError> {
        Self::with_basis_limit(intsize, data, U32_HIGH_BIT)
    }

    /// Like [`PerfectHash::new`] with an explicit upper bound on the basis
    /// search. `basis_limit` may not exceed [`U32_HIGH_BIT`], which the
    /// intermediate-table encoding reserves.
    pub fn with_basis_limit(
        intsize: usize,
        data: Vec<(Vec<u8>, V)>,
        basis_limit: u32,
    ) -> Result<Self, CapacityError> {
        let basis_limit = basis_limit.min(U32_HIGH_BIT);
        let mapsize = data.len();
        if mapsize >= U32_HIGH_BIT as usize {
            return Err(CapacityError::TooManyValues(mapsize));
        }

        let mut inter = vec![0u32; intsize];
        let mut values: Vec<Option<V>> = Vec::with_capacity(mapsize);
        values.resize_with(mapsize, || None);

        // Bucket keys by the first-level hash.
        let mut buckets: Vec<(usize, Vec<(Vec<u8>, V)>)> =
            (0..intsize).map(|i| (i, Vec::new())).collect();
        for (key, val) in data {
            let idx = fnv1a(&key, FNV_OFFSET_BASIS) as usize % intsize;
            buckets[idx].1.push((key, val));
        }

        // Largest buckets are the most constrained; place them first. The
        // sort is stable, so ties keep their original bucket order.
        buckets.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut freecursor = 0usize;
        for (idx, bucket) in buckets {
            if bucket.is_empty() {
                // Buckets are ordered by size, so the rest are empty too.
                break;
            }

            if bucket.len() == 1 {
                // Singleton buckets take the next free value slot directly.
                // The high bit marks the entry as an index, not a basis.
                while freecursor < mapsize {
                    if values[freecursor].is_none() {
                        inter[idx] = freecursor as u32 | U32_HIGH_BIT;
                        let (_, val) = bucket.into_iter().next().unwrap();
                        values[freecursor] = Some(val);
                        break;
                    }
                    freecursor += 1;
                }
                continue;
            }

            // Search for a basis that maps every key in the bucket to a
            // distinct, unoccupied value slot.
            let mut basis: u32 = 1;
            let mut slots: Vec<usize> = Vec::with_capacity(bucket.len());
            let mut i = 0;
            while i < bucket.len() {
                let slot = fnv1a(&bucket[i].0, basis) as usize % mapsize;
                if values[slot].is_some() || slots.contains(&slot) {
                    basis += 1;
                    if basis >= basis_limit {
                        return Err(CapacityError::BasisOverflow(bucket.len()));
                    }
                    i = 0;
                    slots.clear();
                } else {
                    slots.push(slot);
                    i += 1;
                }
            }

            inter[idx] = basis;
            for (slot, (_, val)) in slots.into_iter().zip(bucket) {
                values[slot] = Some(val);
            }
        }

        // Every input was placed in a distinct slot, so all slots are full.
        let values = values
            .into_iter()
            .map(|v| match v {
                Some(v) => v,
                None => unreachable!("perfect hash left an unfilled value slot"),
            })
            .collect();

        Ok(PerfectHash { inter, values })
    }

    /// Look up `key`. Returns `None` only for an empty table; for a
    /// non-empty table this always lands on a slot (see the type docs for
    /// unknown-key semantics).
    pub fn lookup(&self, key: &[u8]) -> Option<&V> {
        if self.values.is_empty() {
            return None;
        }
        let mid = self.inter[fnv1a(key, FNV_OFFSET_BASIS) as usize % self.inter.len()];
        if mid & U32_HIGH_BIT != 0 {
            self.values.get((mid & !U32_HIGH_BIT) as usize)
        } else {
            Some(&self.values[fnv1a(key, mid) as usize % self.values.len()])
        }
    }

    /// The intermediate table, for serialization.
    pub fn intermediate(&self) -> &[u32] {
        &self.inter
    }

    /// The value array, in final placement order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the table holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: PartialEq> PartialEq for PerfectHash<V> {
    fn eq(&self, other: &Self) -> bool {
        self.inter == other.inter && self.values == other.values
    }
}
