use crate::consensus::MotifVariant;
use crate::error::RefinderError;
use crate::target::TargetSequence;
use rayon::prelude::*;

/// One candidate match of a motif variant against a target window.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    /// 0-based start offset of the window in the target.
    pub offset: usize,
    /// The exact bases read from the target at that window.
    pub matched: Vec<u8>,
    /// The variant that produced the match.
    pub variant: MotifVariant,
    pub mismatches: usize,
    pub homology: f64,
    /// Position in deterministic scan order (variant-major, then offset);
    /// used to break ties during overlap resolution.
    pub scan_index: usize,
}

/// Count of differing positions between two equal-length windows.
#[inline(always)]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

#[inline(always)]
pub fn homology_percentage(length: usize, mismatches: usize) -> f64 {
    (length - mismatches) as f64 / length as f64 * 100.0
}

/// Fixed, length-proportional mismatch tolerance.
#[inline(always)]
pub fn max_mismatches(variant_length: usize) -> usize {
    variant_length / 4
}

/// Slides every variant over the target and emits all windows within the
/// mismatch budget. Variants are scanned in parallel; output order is the
/// same as a sequential variant-major scan.
pub fn scan(target: &TargetSequence, variants: &[MotifVariant]) -> Result<Vec<Hit>, RefinderError> {
    if variants.iter().any(|v| v.is_empty()) {
        return Err(RefinderError::InvalidPattern(
            "a zero-length variant cannot be scanned".to_string(),
        ));
    }
    let per_variant: Vec<Vec<Hit>> = variants
        .par_iter()
        .map(|variant| scan_variant(target, variant))
        .collect();
    let mut hits: Vec<Hit> = per_variant.into_iter().flatten().collect();
    for (index, hit) in hits.iter_mut().enumerate() {
        hit.scan_index = index;
    }
    Ok(hits)
}

// TODO bit-parallel Hamming over 2-bit packed bases if scanning ever
// dominates profiles; results must stay identical to this loop.
fn scan_variant(target: &TargetSequence, variant: &MotifVariant) -> Vec<Hit> {
    let bases = target.bases();
    let length = variant.len();
    if length > bases.len() {
        // Window range is empty, not an error
        return vec![];
    }
    let budget = max_mismatches(length);
    let mut hits = vec![];
    for offset in 0..=bases.len() - length {
        let window = &bases[offset..offset + length];
        let mismatches = hamming_distance(window, variant.sequence());
        // Homology is computed for every window, independent of acceptance
        let homology = homology_percentage(length, mismatches);
        if mismatches <= budget {
            hits.push(Hit {
                offset,
                matched: window.to_vec(),
                variant: variant.clone(),
                mismatches,
                homology,
                scan_index: 0,
            });
        }
    }
    hits
}
