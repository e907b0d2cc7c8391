//! Near-duplicate detection via 64-bit SimHash and Hamming distance,
//! grounded on the reference `engine/simhash.py` algorithm: per-feature
//! SHA-1 fingerprints, frequency-weighted bit accumulation, and a fixed
//! distance threshold.
//!
//! Unlike the reference implementation, the fingerprint set here is not
//! process-global: it is a field of [`SimHashIndex`], owned by the
//! `Builder` and threaded explicitly through the indexing pipeline.

use sha1::{Digest, Sha1};
use std::collections::HashMap;

const BIT_LENGTH: u32 = 64;

/// Computes the 64-bit SimHash fingerprint of a token multiset.
fn simhash(tokens: &[String]) -> u64 {
    let mut frequencies: HashMap<&str, i64> = HashMap::new();
    for t in tokens {
        *frequencies.entry(t.as_str()).or_insert(0) += 1;
    }

    let mut counters = [0i64; BIT_LENGTH as usize];
    for (feature, weight) in frequencies {
        let digest = Sha1::digest(feature.as_bytes());
        // Fold the 160-bit SHA-1 digest down to its low-order 64 bits
        // (the digest's last 8 bytes, big-endian), matching the
        // reference's `int(hexdigest, 16) & (1 << i)` bit test.
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[12..20]);
        let h = u64::from_be_bytes(bytes);

        for (i, counter) in counters.iter_mut().enumerate() {
            if h & (1 << i) != 0 {
                *counter += weight;
            } else {
                *counter -= weight;
            }
        }
    }

    let mut out: u64 = 0;
    for (i, counter) in counters.iter().enumerate() {
        if *counter > 0 {
            out |= 1 << i;
        }
    }
    out
}

/// Hamming distance between two 64-bit fingerprints.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// A totally-ordered, append-only set of previously-accepted fingerprints.
#[derive(Debug, Default)]
pub struct SimHashIndex {
    fingerprints: Vec<u64>,
    hamming_threshold: u32,
}

impl SimHashIndex {
    pub fn new(hamming_threshold: u32) -> Self {
        Self {
            fingerprints: Vec::new(),
            hamming_threshold,
        }
    }

    /// Returns `true` (and records nothing) if `tokens` is a near-duplicate
    /// of any previously-accepted document; otherwise records the
    /// fingerprint and returns `false`. The first call always returns
    /// `false`.
    pub fn is_duplicate(&mut self, tokens: &[String]) -> bool {
        let fp = simhash(tokens);

        for &prior in &self.fingerprints {
            if hamming_distance(prior, fp) <= self.hamming_threshold {
                return true;
            }
        }

        self.fingerprints.push(fp);
        false
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reflexivity() {
        let tokens = toks(&["the", "quick", "brown", "fox"]);
        assert_eq!(hamming_distance(simhash(&tokens), simhash(&tokens)), 0);
    }

    #[test]
    fn first_call_is_never_a_duplicate() {
        let mut idx = SimHashIndex::new(2);
        assert!(!idx.is_duplicate(&toks(&["hello", "world"])));
    }

    #[test]
    fn identical_content_is_flagged_duplicate() {
        let mut idx = SimHashIndex::new(2);
        let tokens = toks(&["the", "quick", "brown", "fox", "jumps"]);
        assert!(!idx.is_duplicate(&tokens));
        assert!(idx.is_duplicate(&tokens));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn distinct_content_is_not_flagged() {
        let mut idx = SimHashIndex::new(2);
        assert!(!idx.is_duplicate(&toks(&["completely", "different", "topic", "here"])));
        assert!(!idx.is_duplicate(&toks(&["lazy", "dog", "sleeps", "all", "day", "long"])));
        assert_eq!(idx.len(), 2);
    }
}
