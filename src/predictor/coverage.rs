//! Summary statistics over the depth array of a traversed path.
//!
//! Each node on a path through the graph carries a depth (number of reads
//! supporting it). A path is summarised by four numbers: median depth, minimum
//! depth, percentage of nodes with any coverage, and an estimate of how many
//! distinct reads support the path. The first and last nodes of an allele sit on
//! bifurcations shared with neighbouring alleles, so callers can trim a number of
//! leading and trailing nodes before the depth statistics are taken.

use crate::utils::median_in_place;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

pub type Covg = u32;
pub const COVG_MAX: Covg = Covg::MAX;

static OVERFLOW_WARNING_EMITTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlleleCoverageStats {
    pub estimated_read_count: Covg,
    pub median_depth: Covg,
    pub min_depth: Covg,
    pub percent_covered: u8,
    /// Set when the trimmed path has fewer than two nodes. All statistics are zero
    /// in that case and must not be read as real measurements.
    #[serde(skip)]
    pub too_short: bool,
}

impl AlleleCoverageStats {
    fn short_sentinel() -> Self {
        AlleleCoverageStats {
            too_short: true,
            ..Default::default()
        }
    }
}

/// Sort workspace for median computation, sized once to the longest allele or
/// gene and reused for every path.
#[derive(Debug, Default)]
pub struct DepthScratch {
    buf: Vec<Covg>,
}

impl DepthScratch {
    pub fn with_capacity(max_len: usize) -> Self {
        DepthScratch {
            buf: Vec::with_capacity(max_len),
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    fn median_of(&mut self, depths: &[Covg]) -> Covg {
        self.reset();
        self.buf.extend_from_slice(depths);
        median_in_place(&mut self.buf).unwrap_or(0)
    }
}

fn trimmed(depths: &[Covg], ignore_first: usize, ignore_last: usize) -> &[Covg] {
    let end = depths.len().saturating_sub(ignore_last);
    if ignore_first >= end {
        &[]
    } else {
        &depths[ignore_first..end]
    }
}

pub fn allele_stats(
    depths: &[Covg],
    scratch: &mut DepthScratch,
    ignore_first: usize,
    ignore_last: usize,
) -> AlleleCoverageStats {
    let window = trimmed(depths, ignore_first, ignore_last);
    if window.len() <= 1 {
        return AlleleCoverageStats::short_sentinel();
    }

    let (estimated_read_count, _) = count_reads_on_path(depths);
    AlleleCoverageStats {
        estimated_read_count,
        median_depth: scratch.median_of(window),
        min_depth: window.iter().copied().min().unwrap_or(0),
        percent_covered: percent_covered(window),
        too_short: false,
    }
}

fn percent_covered(window: &[Covg]) -> u8 {
    let nonzero = window.iter().filter(|&&d| d > 0).count();
    (nonzero * 100 / window.len()) as u8
}

/// Estimates the number of reads supporting a whole allele path from rises in
/// depth. The first and last nodes are bifurcation nodes and are never counted.
/// Returns the estimate and whether the path was too short to use.
pub fn count_reads_on_path(depths: &[Covg]) -> (Covg, bool) {
    let len = depths.len();
    if len <= 1 {
        return (0, true);
    }

    let mut num_reads = depths[1];
    // The final node is where the two branches rejoin.
    for i in 2..len - 1 {
        let next = if i < len - 2 { Some(depths[i + 1]) } else { None };
        num_reads = add_jump(num_reads, depths[i - 1], depths[i], next);
    }
    (num_reads, false)
}

/// Read estimate over a caller-sliced chunk of an allele. Nothing is trimmed; the
/// first element seeds the count.
pub fn count_reads_in_depths(depths: &[Covg]) -> (Covg, bool) {
    let len = depths.len();
    if len <= 1 {
        return (0, true);
    }

    let mut num_reads = depths[0];
    for i in 1..len {
        let next = if i < len - 1 { Some(depths[i + 1]) } else { None };
        num_reads = add_jump(num_reads, depths[i - 1], depths[i], next);
    }
    (num_reads, false)
}

/// A rise in depth signals a new read starting. A rise that the following node
/// undoes back to the previous level is a one-node spike and is not counted.
#[inline]
fn add_jump(num_reads: Covg, prev: Covg, cur: Covg, next: Option<Covg>) -> Covg {
    let jump = cur as i64 - prev as i64;
    let diff_between_next_and_prev = match next {
        Some(next) => next as i64 - prev as i64,
        None => -1,
    };

    if jump <= 0 || diff_between_next_and_prev == 0 {
        return num_reads;
    }

    if COVG_MAX as i64 - jump >= num_reads as i64 {
        num_reads + jump as Covg
    } else {
        if !OVERFLOW_WARNING_EMITTED.swap(true, Ordering::Relaxed) {
            log::warn!("Caught integer overflow (some k-mer coverages may be underestimates)");
        }
        COVG_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rng, Rng};

    fn stats(depths: &[Covg], ignore_first: usize, ignore_last: usize) -> AlleleCoverageStats {
        let mut scratch = DepthScratch::with_capacity(depths.len());
        allele_stats(depths, &mut scratch, ignore_first, ignore_last)
    }

    #[test]
    fn short_paths_are_flagged_and_zeroed() {
        for depths in [vec![], vec![7]] {
            let s = stats(&depths, 0, 0);
            assert!(s.too_short);
            assert_eq!(s, AlleleCoverageStats::short_sentinel());
        }
        // Long enough untrimmed, but only one node survives trimming.
        let s = stats(&[9, 9, 9, 9], 2, 1);
        assert!(s.too_short);
        assert_eq!(s.estimated_read_count, 0);
        assert_eq!(s.median_depth, 0);
        assert_eq!(s.min_depth, 0);
        assert_eq!(s.percent_covered, 0);
    }

    #[test]
    fn trimming_past_the_end_is_too_short() {
        let s = stats(&[1, 2, 3], 5, 5);
        assert!(s.too_short);
    }

    #[test]
    fn basic_statistics() {
        let s = stats(&[4, 0, 6, 2, 8], 0, 0);
        assert!(!s.too_short);
        assert_eq!(s.median_depth, 4);
        assert_eq!(s.min_depth, 0);
        assert_eq!(s.percent_covered, 80);
    }

    #[test]
    fn trimming_excludes_bifurcation_nodes() {
        let s = stats(&[100, 5, 7, 6, 100], 1, 1);
        assert_eq!(s.median_depth, 6);
        assert_eq!(s.min_depth, 5);
        assert_eq!(s.percent_covered, 100);
    }

    #[test]
    fn percent_covered_floors() {
        let s = stats(&[1, 0, 0], 0, 0);
        assert_eq!(s.percent_covered, 33);
    }

    #[test]
    fn percent_covered_bounds() {
        assert_eq!(stats(&[0; 10], 0, 0).percent_covered, 0);
        assert_eq!(stats(&[3; 10], 0, 0).percent_covered, 100);
    }

    #[test]
    fn single_missing_node_collapses_min() {
        let s = stats(&[30, 31, 0, 29, 30], 0, 0);
        assert_eq!(s.min_depth, 0);
        assert_eq!(s.median_depth, 30);
    }

    #[test]
    fn median_matches_sorted_reference_on_random_paths() {
        let mut rng = rng();
        let mut scratch = DepthScratch::with_capacity(200);
        for len in 2..=200usize {
            let depths: Vec<Covg> = (0..len).map(|_| rng.random_range(0..6)).collect();
            let mut sorted = depths.clone();
            sorted.sort();
            let expected = if len % 2 == 1 {
                sorted[len / 2]
            } else {
                ((sorted[len / 2 - 1] as u64 + sorted[len / 2] as u64) / 2) as Covg
            };
            let s = allele_stats(&depths, &mut scratch, 0, 0);
            assert_eq!(s.median_depth, expected, "depths {:?}", depths);
            assert!(s.percent_covered <= 100);
        }
    }

    #[test]
    fn read_count_starts_at_second_node() {
        assert_eq!(count_reads_on_path(&[50, 10, 10, 50]), (10, false));
    }

    #[test]
    fn read_count_adds_sustained_rises() {
        // 10 -> 15 is sustained by the next node, so five new reads arrive.
        assert_eq!(count_reads_on_path(&[0, 10, 15, 15, 15, 0]), (15, false));
    }

    #[test]
    fn read_count_ignores_one_node_spikes() {
        assert_eq!(count_reads_on_path(&[0, 10, 40, 10, 10, 0]), (10, false));
    }

    #[test]
    fn read_count_second_to_last_node_always_counts_rise() {
        // i = len - 2 has no look-ahead, so its rise is always counted.
        assert_eq!(count_reads_on_path(&[0, 10, 10, 14, 0]), (14, false));
    }

    #[test]
    fn read_count_too_short() {
        assert_eq!(count_reads_on_path(&[]), (0, true));
        assert_eq!(count_reads_on_path(&[3]), (0, true));
        assert_eq!(count_reads_in_depths(&[3]), (0, true));
    }

    #[test]
    fn flat_read_count_uses_whole_array() {
        assert_eq!(count_reads_in_depths(&[10, 15, 15]), (15, false));
        // Last element has no look-ahead and its rise is counted.
        assert_eq!(count_reads_in_depths(&[10, 10, 12]), (12, false));
        assert_eq!(count_reads_in_depths(&[10, 40, 10]), (10, false));
    }

    #[test]
    fn read_count_saturates_instead_of_wrapping() {
        let depths = [0, COVG_MAX - 5, 0, COVG_MAX, COVG_MAX, 0, COVG_MAX, COVG_MAX, 0];
        let (count, too_short) = count_reads_on_path(&depths);
        assert!(!too_short);
        assert_eq!(count, COVG_MAX);

        let (count, _) = count_reads_in_depths(&[COVG_MAX, 0, COVG_MAX, COVG_MAX]);
        assert_eq!(count, COVG_MAX);
    }

    #[test]
    fn overflow_warning_flag_is_set_once_and_stays_set() {
        let (count, _) = count_reads_on_path(&[0, COVG_MAX, 0, COVG_MAX, COVG_MAX, 0]);
        assert_eq!(count, COVG_MAX);
        assert!(OVERFLOW_WARNING_EMITTED.load(Ordering::Relaxed));

        for _ in 0..3 {
            let (count, _) = count_reads_in_depths(&[COVG_MAX, 0, COVG_MAX, COVG_MAX]);
            assert_eq!(count, COVG_MAX);
            let (count, _) = count_reads_on_path(&[0, COVG_MAX, 0, COVG_MAX, COVG_MAX, 0]);
            assert_eq!(count, COVG_MAX);
            assert!(OVERFLOW_WARNING_EMITTED.load(Ordering::Relaxed));
        }
    }

    #[test]
    fn read_count_accumulator_never_decreases() {
        let mut rng = rng();
        for _ in 0..200 {
            let len = rng.random_range(2..60);
            let depths: Vec<Covg> = (0..len)
                .map(|_| {
                    if rng.random_bool(0.2) {
                        COVG_MAX - rng.random_range(0..3)
                    } else {
                        rng.random_range(0..50)
                    }
                })
                .collect();

            let mut num_reads = depths[0];
            for i in 1..len {
                let next = if i < len - 1 { Some(depths[i + 1]) } else { None };
                let updated = add_jump(num_reads, depths[i - 1], depths[i], next);
                assert!(updated >= num_reads, "accumulator decreased on {:?}", depths);
                num_reads = updated;
            }
            assert_eq!(count_reads_in_depths(&depths), (num_reads, false));
        }
    }
}
