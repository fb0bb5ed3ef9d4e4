use std::cmp::{max, min};
use std::fmt;

/// Largest Unicode code point.
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// A set of integers kept as a sorted sequence of inclusive ranges.
///
/// The representation is canonical: ranges are sorted, never overlap and
/// never touch (`hi + 1 < next.lo`), so structural equality and hashing
/// coincide with set equality.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntegerSet {
    ranges: Vec<(u32, u32)>,
}

impl IntegerSet {
    /// The empty set.
    pub fn new() -> IntegerSet {
        IntegerSet { ranges: Vec::new() }
    }

    /// The full Unicode code space, `[0, 0x10FFFF]`.
    pub fn codespace() -> IntegerSet {
        IntegerSet {
            ranges: vec![(0, MAX_CODEPOINT)],
        }
    }

    pub fn from_points<I: IntoIterator<Item = u32>>(points: I) -> IntegerSet {
        IntegerSet::from_ranges(points.into_iter().map(|p| (p, p)))
    }

    /// Builds a canonical set from arbitrary inclusive ranges, which may be
    /// unsorted, overlapping or adjacent.
    pub fn from_ranges<I: IntoIterator<Item = (u32, u32)>>(ranges: I) -> IntegerSet {
        let mut ranges: Vec<(u32, u32)> = ranges
            .into_iter()
            .inspect(|&(lo, hi)| debug_assert!(lo <= hi))
            .collect();
        ranges.sort();

        let mut set = IntegerSet::new();
        for range in ranges {
            set.push(range);
        }
        set
    }

    // Appends a range whose start is >= every start already present,
    // merging it with the last range when they overlap or touch.
    fn push(&mut self, (lo, hi): (u32, u32)) {
        if let Some(last) = self.ranges.last_mut() {
            if lo <= last.1.saturating_add(1) {
                last.1 = max(last.1, hi);
                return;
            }
        }
        self.ranges.push((lo, hi));
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of integers in the set.
    pub fn cardinality(&self) -> u64 {
        self.ranges
            .iter()
            .map(|&(lo, hi)| u64::from(hi - lo) + 1)
            .sum()
    }

    pub fn contains(&self, x: u32) -> bool {
        match self.ranges.binary_search_by(|&(lo, _)| lo.cmp(&x)) {
            Ok(_) => true,
            Err(0) => false,
            Err(i) => x <= self.ranges[i - 1].1,
        }
    }

    /// The smallest element, if any.
    pub fn first(&self) -> Option<u32> {
        self.ranges.first().map(|&(lo, _)| lo)
    }

    /// Iterates over the ranges as `(lo, hi)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.ranges.iter().copied()
    }

    pub fn union(&self, other: &IntegerSet) -> IntegerSet {
        let mut set = IntegerSet::new();
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let take_a = j == b.len() || (i < a.len() && a[i] <= b[j]);
            if take_a {
                set.push(a[i]);
                i += 1;
            } else {
                set.push(b[j]);
                j += 1;
            }
        }
        set
    }

    pub fn intersection(&self, other: &IntegerSet) -> IntegerSet {
        let mut ranges = Vec::new();
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let lo = max(a[i].0, b[j].0);
            let hi = min(a[i].1, b[j].1);
            if lo <= hi {
                ranges.push((lo, hi));
            }
            // Advance whichever range ends first.
            if a[i].1 < b[j].1 {
                i += 1;
            } else {
                j += 1;
            }
        }
        IntegerSet { ranges }
    }

    /// The elements of `self` not in `other`.
    pub fn difference(&self, other: &IntegerSet) -> IntegerSet {
        let mut ranges = Vec::new();
        let b = &other.ranges;
        let mut j = 0;
        for &(lo, hi) in &self.ranges {
            let mut lo = lo;
            while j < b.len() && b[j].1 < lo {
                j += 1;
            }
            // Clip by every range of `other` overlapping [lo, hi]. A range
            // of `other` reaching past `hi` may clip the next range of
            // `self` too, so `j` must not move past it.
            let mut k = j;
            let mut covered = false;
            while k < b.len() && b[k].0 <= hi {
                if lo < b[k].0 {
                    ranges.push((lo, b[k].0 - 1));
                }
                if b[k].1 >= hi {
                    covered = true;
                    break;
                }
                lo = b[k].1 + 1;
                k += 1;
            }
            if !covered && lo <= hi {
                ranges.push((lo, hi));
            }
        }
        IntegerSet { ranges }
    }

    pub fn issuperset(&self, other: &IntegerSet) -> bool {
        other.difference(self).is_empty()
    }
}

impl fmt::Debug for IntegerSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.ranges.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::IteratorRandom;
    use std::collections::BTreeSet;

    const ITERATIONS: usize = 1000;
    const RANGE: u32 = 100;
    const SAMPLES: usize = 50;

    fn sample<R: rand::Rng>(rng: &mut R) -> BTreeSet<u32> {
        (0..RANGE)
            .choose_multiple(rng, SAMPLES)
            .into_iter()
            .collect()
    }

    fn from_model(model: &BTreeSet<u32>) -> IntegerSet {
        IntegerSet::from_points(model.iter().copied())
    }

    #[test]
    fn test_construction() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let a = sample(&mut rng);
            let x = from_model(&a);
            assert_eq!(IntegerSet::from_ranges(x.iter()), x);
            assert_eq!(x.cardinality(), a.len() as u64);
        }
    }

    #[test]
    fn test_construction_coalesces() {
        let x = IntegerSet::from_points(vec![3, 1, 2, 2, 7]);
        assert_eq!(x.iter().collect::<Vec<_>>(), vec![(1, 3), (7, 7)]);

        let y = IntegerSet::from_ranges(vec![(5, 9), (0, 3), (4, 4)]);
        assert_eq!(y.iter().collect::<Vec<_>>(), vec![(0, 9)]);
    }

    #[test]
    fn test_contains() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let a = sample(&mut rng);
            let x = from_model(&a);
            assert!(!x.contains(RANGE + 1));
            for j in 0..RANGE {
                assert_eq!(a.contains(&j), x.contains(j));
            }
        }
    }

    #[test]
    fn test_superset() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let a = sample(&mut rng);
            let x = from_model(&a);
            let b: BTreeSet<u32> = a
                .iter()
                .copied()
                .choose_multiple(&mut rng, SAMPLES - 1)
                .into_iter()
                .collect();
            let y = from_model(&b);
            assert!(x.issuperset(&x));
            assert!(x.issuperset(&y));
            assert!(!y.issuperset(&x));
            assert!(x.issuperset(&IntegerSet::new()));
        }
    }

    #[test]
    fn test_union() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let a = sample(&mut rng);
            let b = sample(&mut rng);
            let c: BTreeSet<u32> = a.union(&b).copied().collect();

            let a_ = from_model(&a);
            let b_ = from_model(&b);
            let x = a_.union(&b_);

            assert_eq!(x, b_.union(&a_));
            assert_eq!(x, from_model(&c));
        }
    }

    #[test]
    fn test_intersection() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let a = sample(&mut rng);
            let b = sample(&mut rng);
            let c: BTreeSet<u32> = a.intersection(&b).copied().collect();

            let a_ = from_model(&a);
            let b_ = from_model(&b);

            let x = a_.intersection(&b_);
            assert_eq!(x, b_.intersection(&a_));
            assert_eq!(x, from_model(&c));
        }
    }

    #[test]
    fn test_difference() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let a = sample(&mut rng);
            let b = sample(&mut rng);
            let c: BTreeSet<u32> = a.difference(&b).copied().collect();

            let a_ = from_model(&a);
            let b_ = from_model(&b);

            assert_eq!(a_.difference(&b_), from_model(&c));
        }
    }

    #[test]
    fn test_difference_spanning_range() {
        // One subtrahend range covering the gap between two minuend ranges.
        let a = IntegerSet::from_ranges(vec![(0, 10), (20, 30)]);
        let b = IntegerSet::from_ranges(vec![(5, 25)]);
        assert_eq!(
            a.difference(&b).iter().collect::<Vec<_>>(),
            vec![(0, 4), (26, 30)]
        );
    }

    #[test]
    fn test_codespace() {
        let cs = IntegerSet::codespace();
        assert_eq!(cs.cardinality(), u64::from(MAX_CODEPOINT) + 1);
        assert!(cs.contains(0) && cs.contains(MAX_CODEPOINT));
        assert!(!cs.contains(MAX_CODEPOINT + 1));
        assert!(cs.issuperset(&IntegerSet::from_points(vec![0x61])));
    }
}
