//! Mode continuation across velocity steps.
//!
//! Steps are solved independently, so the roots of one step carry no slot
//! labels. Continuation assigns each root to the slot of the nearest root of the
//! previous valid step in the complex plane, globally and greedily: the closest
//! pair is fixed first. Matching on the complex root rather than on frequency
//! alone keeps two coalesced modes apart, since they share a frequency but not a
//! damping.

use nalgebra::Complex;

/// Pick from `candidates` so `result[j]` continues `previous[j]`.
///
/// Ties are broken by lower previous slot, then lower candidate index. There are
/// at least as many candidates as previous roots; extra candidates are dropped.
pub fn match_roots(previous: &[Complex<f64>], candidates: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut pairs: Vec<(f64, usize, usize)> = previous
        .iter()
        .enumerate()
        .flat_map(|(j, prev)| {
            candidates
                .iter()
                .enumerate()
                .map(move |(i, cand)| ((cand - prev).norm(), j, i))
        })
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut slot_of: Vec<Option<usize>> = vec![None; previous.len()];
    let mut taken = vec![false; candidates.len()];
    for (_, j, i) in pairs {
        if slot_of[j].is_none() && !taken[i] {
            slot_of[j] = Some(i);
            taken[i] = true;
        }
    }
    slot_of
        .into_iter()
        .zip(previous)
        .map(|(i, prev)| i.map_or(*prev, |i| candidates[i]))
        .collect()
}

/// Label every step in velocity order. Gaps stay gaps and are bridged: the step
/// after a gap is matched against the last valid step.
pub fn track(steps: &[Option<Vec<Complex<f64>>>]) -> Vec<Option<Vec<Complex<f64>>>> {
    let mut previous: Option<Vec<Complex<f64>>> = None;
    steps
        .iter()
        .map(|step| {
            let roots = step.as_ref()?;
            let labelled = match &previous {
                Some(prev) if prev.len() == roots.len() => match_roots(prev, roots),
                _ => roots.clone(),
            };
            previous = Some(labelled.clone());
            Some(labelled)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn crossing_frequencies_keep_their_slots() {
        // slot 0 rises through slot 1 in frequency
        let steps = vec![
            Some(vec![c(-1.0, 100.0), c(-5.0, 130.0)]),
            Some(vec![c(-1.2, 118.0), c(-5.0, 126.0)]),
            Some(vec![c(-5.0, 124.0), c(-1.4, 136.0)]),
        ];
        let tracked = track(&steps);
        let last = tracked[2].as_ref().unwrap();
        assert_eq!(last[0], c(-1.4, 136.0));
        assert_eq!(last[1], c(-5.0, 124.0));
    }

    #[test]
    fn coalesced_pair_separates_by_damping() {
        let steps = vec![
            Some(vec![c(-20.0, 150.0), c(-25.0, 161.0)]),
            // same frequency, opposite damping trends
            Some(vec![c(-40.0, 155.0), c(-5.0, 155.0)]),
            Some(vec![c(-60.0, 158.0), c(10.0, 158.0)]),
        ];
        let tracked = track(&steps);
        let second = tracked[1].as_ref().unwrap();
        let third = tracked[2].as_ref().unwrap();
        assert_eq!(second[0], c(-5.0, 155.0));
        assert_eq!(third[0], c(10.0, 158.0));
        assert_eq!(third[1], c(-60.0, 158.0));
    }

    #[test]
    fn gaps_are_bridged() {
        let steps = vec![
            Some(vec![c(0.0, 10.0), c(0.0, 20.0)]),
            None,
            Some(vec![c(0.0, 21.0), c(0.0, 11.0)]),
        ];
        let tracked = track(&steps);
        assert!(tracked[1].is_none());
        assert_eq!(tracked[2].as_ref().unwrap(), &vec![c(0.0, 11.0), c(0.0, 21.0)]);
    }

    #[test]
    fn ties_prefer_lower_slot() {
        let prev = vec![c(0.0, 0.0), c(0.0, 0.0)];
        let next = vec![c(1.0, 0.0), c(0.0, 1.0)];
        assert_eq!(match_roots(&prev, &next), next);
    }

    proptest! {
        #[test]
        fn matching_is_a_permutation(
            roots in proptest::collection::vec((-100.0f64..100.0, 0.0f64..1000.0), 1..8),
            shift in 0.0f64..5.0,
        ) {
            let prev: Vec<_> = roots.iter().map(|&(re, im)| c(re, im)).collect();
            let mut next: Vec<_> = prev.iter().map(|p| p + c(shift, shift)).collect();
            next.reverse();
            let matched = match_roots(&prev, &next);
            let mut a: Vec<_> = matched.iter().map(|p| (p.re.to_bits(), p.im.to_bits())).collect();
            let mut b: Vec<_> = next.iter().map(|p| (p.re.to_bits(), p.im.to_bits())).collect();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn extra_candidates_are_dropped() {
        let prev = vec![c(0.0, 10.0), c(0.0, 20.0)];
        let next = vec![c(0.0, 30.0), c(0.0, 19.0), c(0.0, 11.0)];
        assert_eq!(match_roots(&prev, &next), vec![c(0.0, 11.0), c(0.0, 19.0)]);
    }
}
