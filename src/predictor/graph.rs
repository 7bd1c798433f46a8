//! The graph-traversal seam.
//!
//! Building the graph and aligning sequence to it happen elsewhere; the predictor
//! only needs, for a reference sequence, the depth of every node on the path the
//! sequence traces. `KmerGraph` is the minimal adapter over a k-mer count table
//! (for example `jellyfish dump -c` output), where nodes are canonical k-mers.

use crate::utils::{median_in_place, open_text_reader, Result};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use super::coverage::Covg;

pub const MAX_KMER_SIZE: usize = 31;

pub trait CoverageGraph {
    /// Replaces the contents of `depths` with one depth per node along the path
    /// traced by `seq`. Nodes absent from the graph have depth 0.
    fn node_depths(&self, seq: &[u8], depths: &mut Vec<Covg>);
}

#[derive(Debug)]
pub struct KmerGraph {
    k: usize,
    counts: HashMap<u64, Covg>,
}

impl KmerGraph {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_text_reader(path)?;
        Self::from_reader(reader).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut k = 0;
        let mut counts: HashMap<u64, Covg> = HashMap::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (kmer, count) = match (parts.next(), parts.next()) {
                (Some(kmer), Some(count)) => (kmer, count),
                _ => {
                    return Err(format!(
                        "Missing k-mer/count at line {}",
                        line_number + 1
                    ))
                }
            };

            if k == 0 {
                if kmer.len() > MAX_KMER_SIZE {
                    return Err(format!(
                        "K-mer size {} exceeds the maximum of {} at line {}",
                        kmer.len(),
                        MAX_KMER_SIZE,
                        line_number + 1
                    ));
                }
                k = kmer.len();
            } else if kmer.len() != k {
                return Err(format!(
                    "Inconsistent k-mer size at line {}: expected {}, found {}",
                    line_number + 1,
                    k,
                    kmer.len()
                ));
            }

            let count: Covg = count
                .parse()
                .map_err(|_| format!("Invalid count at line {}: {}", line_number + 1, count))?;
            let code = canonical_code(kmer.as_bytes()).ok_or_else(|| {
                format!("Invalid k-mer at line {}: {}", line_number + 1, kmer)
            })?;

            let entry = counts.entry(code).or_insert(0);
            *entry = entry.saturating_add(count);
        }

        if k == 0 {
            return Err("Coverage table contains no k-mers".to_string());
        }
        log::debug!("Loaded {} distinct {}-mers", counts.len(), k);
        Ok(KmerGraph { k, counts })
    }

    pub fn kmer_size(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Median count over k-mers seen at least `min_count` times. Rarer k-mers are
    /// mostly sequencing errors and would drag the estimate towards 1.
    pub fn estimate_depth(&self, min_count: Covg) -> Option<Covg> {
        let mut solid: Vec<Covg> = self
            .counts
            .values()
            .copied()
            .filter(|&c| c >= min_count)
            .collect();
        median_in_place(&mut solid)
    }
}

impl CoverageGraph for KmerGraph {
    fn node_depths(&self, seq: &[u8], depths: &mut Vec<Covg>) {
        depths.clear();
        if seq.len() < self.k {
            return;
        }
        depths.extend(seq.windows(self.k).map(|window| {
            canonical_code(window)
                .and_then(|code| self.counts.get(&code).copied())
                .unwrap_or(0)
        }));
    }
}

fn base_code(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// 2-bit packing of the lexicographically smaller of a k-mer and its reverse
/// complement. `None` if the window contains a non-ACGT base.
fn canonical_code(kmer: &[u8]) -> Option<u64> {
    let mut forward = 0u64;
    let mut reverse = 0u64;
    for (i, &base) in kmer.iter().enumerate() {
        let code = base_code(base)?;
        forward = (forward << 2) | code;
        reverse |= (3 - code) << (2 * i);
    }
    Some(forward.min(reverse))
}
