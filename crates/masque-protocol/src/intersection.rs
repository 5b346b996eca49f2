//! Intersection engine
//!
//! Builds a presence set from the smaller input (the first one on a tie) and
//! scans the larger. Duplicates in the scanned side count every time they
//! match; duplicates in the indexed side collapse into one entry. Memory stays
//! bounded by `min(|a|, |b|)` entries.

use std::collections::HashSet;

/// Number of entries of the larger sequence present in the smaller one
pub fn intersect<A, B>(a: &[A], b: &[B]) -> usize
where
    A: AsRef<[u8]>,
    B: AsRef<[u8]>,
{
    if a.len() <= b.len() {
        count_present(a, b)
    } else {
        count_present(b, a)
    }
}

/// The matching values themselves, taken from the scanned (larger) side in
/// scan order
pub fn matching<'a, A, B>(a: &'a [A], b: &'a [B]) -> Vec<&'a [u8]>
where
    A: AsRef<[u8]>,
    B: AsRef<[u8]>,
{
    if a.len() <= b.len() {
        collect_present(a, b)
    } else {
        collect_present(b, a)
    }
}

fn presence<S: AsRef<[u8]>>(smaller: &[S]) -> HashSet<&[u8]> {
    let mut present = HashSet::with_capacity(smaller.len());
    present.extend(smaller.iter().map(AsRef::as_ref));
    present
}

fn count_present<S, L>(smaller: &[S], larger: &[L]) -> usize
where
    S: AsRef<[u8]>,
    L: AsRef<[u8]>,
{
    let present = presence(smaller);
    larger
        .iter()
        .filter(|element| present.contains(element.as_ref()))
        .count()
}

fn collect_present<'a, S, L>(smaller: &'a [S], larger: &'a [L]) -> Vec<&'a [u8]>
where
    S: AsRef<[u8]>,
    L: AsRef<[u8]>,
{
    let present = presence(smaller);
    larger
        .iter()
        .map(AsRef::as_ref)
        .filter(|element| present.contains(element))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_common_elements() {
        let a = ["Lyle", "Jane", "Jack", "Charles"];
        let b = ["Jane", "Charles", "Mallory"];
        assert_eq!(intersect(&a, &b), 2);
        assert_eq!(intersect(&b, &a), 2);
    }

    #[test]
    fn empty_side_gives_zero() {
        let empty: [&str; 0] = [];
        assert_eq!(intersect(&empty, &["Jane"]), 0);
        assert_eq!(intersect(&["Jane"], &empty), 0);
    }

    #[test]
    fn duplicates_in_larger_side_count_again() {
        let smaller = ["x"];
        let larger = ["x", "x", "y"];
        assert_eq!(intersect(&smaller, &larger), 2);
        assert_eq!(intersect(&larger, &smaller), 2);
    }

    #[test]
    fn duplicates_in_smaller_side_collapse() {
        let smaller = ["x", "x"];
        let larger = ["x", "y", "z"];
        assert_eq!(intersect(&smaller, &larger), 1);
    }

    #[test]
    fn tie_indexes_first_argument() {
        let a = ["x", "x", "y"];
        let b = ["x", "x", "x"];
        // `a` is indexed, all three of `b` match.
        assert_eq!(intersect(&a, &b), 3);
        // `b` is indexed, the two x's of `a` match.
        assert_eq!(intersect(&b, &a), 2);
    }

    #[test]
    fn comparison_is_exact_bytes() {
        assert_eq!(intersect(&["jane"], &["Jane"]), 0);
        assert_eq!(intersect(&["Jan"], &["Jane"]), 0);
    }

    #[test]
    fn matching_returns_scanned_values_in_order() {
        let a = ["b", "a"];
        let b = ["a", "c", "b", "a"];
        let found: Vec<&[u8]> = matching(&a, &b);
        assert_eq!(found, vec![&b"a"[..], &b"b"[..], &b"a"[..]]);
    }
}
