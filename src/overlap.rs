use crate::scanner::Hit;

/// Candidates whose start offsets differ by at most this much are taken
/// to be the same physical occurrence.
pub const NEIGHBORHOOD_DISTANCE: usize = 1;

/// Collapses redundant detections of the same site into the single best
/// hit per genomic neighborhood.
///
/// Candidates are sorted by (offset, scan index) and grouped into maximal
/// chains of adjacent offsets, so the result does not depend on the order
/// of the input list. Within a neighborhood the hit with the highest
/// homology wins; ties go to the earliest scan order.
pub fn resolve(candidates: &[Hit]) -> Vec<Hit> {
    let mut sorted: Vec<&Hit> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        a.offset
            .cmp(&b.offset)
            .then(a.scan_index.cmp(&b.scan_index))
    });

    let mut resolved = vec![];
    let mut neighborhood: Vec<&Hit> = vec![];
    for hit in sorted {
        let adjacent = neighborhood
            .last()
            .is_some_and(|prev| hit.offset - prev.offset <= NEIGHBORHOOD_DISTANCE);
        if !neighborhood.is_empty() && !adjacent {
            resolved.push(pick_best(&neighborhood));
            neighborhood.clear();
        }
        neighborhood.push(hit);
    }
    if !neighborhood.is_empty() {
        resolved.push(pick_best(&neighborhood));
    }
    resolved
}

fn pick_best(neighborhood: &[&Hit]) -> Hit {
    let mut best = neighborhood[0];
    for hit in &neighborhood[1..] {
        let better = hit
            .homology
            .total_cmp(&best.homology)
            .then(best.scan_index.cmp(&hit.scan_index))
            .is_gt();
        if better {
            best = hit;
        }
    }
    best.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{MotifVariant, Orientation};

    fn hit(offset: usize, homology: f64, scan_index: usize) -> Hit {
        Hit {
            offset,
            matched: b"ACGT".to_vec(),
            variant: MotifVariant::new(b"ACGT".to_vec(), Orientation::Forward),
            mismatches: 0,
            homology,
            scan_index,
        }
    }

    #[test]
    fn test_adjacent_hits_collapse_to_best_homology() {
        let candidates = vec![hit(4, 75.0, 0), hit(5, 100.0, 1)];
        let resolved = resolve(&candidates);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].offset, 5);
        assert_eq!(resolved[0].homology, 100.0);
    }

    #[test]
    fn test_equal_homology_keeps_earliest_scan_order() {
        let candidates = vec![hit(2, 100.0, 0), hit(1, 100.0, 7)];
        let resolved = resolve(&candidates);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].scan_index, 0);
        assert_eq!(resolved[0].offset, 2);
    }

    #[test]
    fn test_result_is_order_independent() {
        let mut candidates = vec![
            hit(0, 75.0, 3),
            hit(1, 100.0, 1),
            hit(2, 75.0, 0),
            hit(5, 100.0, 2),
        ];
        let forward = resolve(&candidates);
        candidates.reverse();
        let backward = resolve(&candidates);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0].offset, 1);
        assert_eq!(forward[1].offset, 5);
    }

    #[test]
    fn test_surviving_hits_are_spaced_apart() {
        let candidates = vec![
            hit(0, 80.0, 0),
            hit(1, 90.0, 1),
            hit(2, 85.0, 2),
            hit(4, 95.0, 3),
            hit(9, 70.0, 4),
        ];
        let resolved = resolve(&candidates);
        for pair in resolved.windows(2) {
            assert!(pair[1].offset - pair[0].offset > NEIGHBORHOOD_DISTANCE);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve(&[]).is_empty());
    }
}
