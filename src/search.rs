use crate::consensus::{ConsensusPattern, MotifVariant};
use crate::error::RefinderError;
use crate::overlap;
use crate::result_table::{rank, ResultTable, SearchOutcome, TargetGroup};
use crate::scanner;
use crate::target::{parse_block, ParsedRecord, TargetSequence};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIS_OFFSET: i64 = 0;
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Inputs of one search call. The mismatch budget is not configurable;
/// it is fixed at a quarter of the variant length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub pattern: String,
    pub tis_offset: i64,
    pub threshold: f64,
}

impl SearchParams {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            tis_offset: DEFAULT_TIS_OFFSET,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    fn validate(&self) -> Result<(), RefinderError> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(RefinderError::InvalidInput(format!(
                "threshold must lie in [0,100], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Phase boundary notifications, for any presentation layer that wants
/// live status without the core depending on it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SearchProgress {
    PatternCompiled { variants: usize },
    TargetScanned { target: String, candidates: usize },
    TargetResolved { target: String, occurrences: usize },
    TargetRanked { target: String, rows: usize },
}

pub fn find_responsive_elements(
    params: &SearchParams,
    targets: &[TargetSequence],
) -> Result<ResultTable, RefinderError> {
    let mut noop = |_| {};
    find_responsive_elements_with_progress(params, targets, &mut noop)
}

/// Runs the full pipeline: compile the pattern once, then scan, resolve
/// and rank each target. Groups appear in caller order. Stateless; the
/// returned table is the only product of the call.
pub fn find_responsive_elements_with_progress(
    params: &SearchParams,
    targets: &[TargetSequence],
    on_progress: &mut dyn FnMut(SearchProgress),
) -> Result<ResultTable, RefinderError> {
    let variants = compile(params, on_progress)?;
    let mut table = ResultTable::default();
    for target in targets {
        table.push_group(search_target(params, &variants, target, on_progress)?);
    }
    Ok(table)
}

/// Like [`find_responsive_elements_with_progress`], but over a parsed
/// record batch: malformed records become `Failed` groups while their
/// siblings are searched normally.
pub fn search_records(
    params: &SearchParams,
    records: &[ParsedRecord],
    on_progress: &mut dyn FnMut(SearchProgress),
) -> Result<ResultTable, RefinderError> {
    let variants = compile(params, on_progress)?;
    let mut table = ResultTable::default();
    for record in records {
        match record {
            ParsedRecord::Target(target) => {
                table.push_group(search_target(params, &variants, target, on_progress)?)
            }
            ParsedRecord::Malformed { name, message } => table.push_group(TargetGroup {
                target: name.clone(),
                outcome: SearchOutcome::Failed {
                    message: message.clone(),
                },
                rows: vec![],
            }),
        }
    }
    Ok(table)
}

/// Searches a pasted multi-record block (or a single unlabeled sequence).
pub fn search_block(
    params: &SearchParams,
    text: &str,
    on_progress: &mut dyn FnMut(SearchProgress),
) -> Result<ResultTable, RefinderError> {
    search_records(params, &parse_block(text), on_progress)
}

fn compile(
    params: &SearchParams,
    on_progress: &mut dyn FnMut(SearchProgress),
) -> Result<Vec<MotifVariant>, RefinderError> {
    params.validate()?;
    let variants = ConsensusPattern::new(&params.pattern)?.expand();
    on_progress(SearchProgress::PatternCompiled {
        variants: variants.len(),
    });
    Ok(variants)
}

fn search_target(
    params: &SearchParams,
    variants: &[MotifVariant],
    target: &TargetSequence,
    on_progress: &mut dyn FnMut(SearchProgress),
) -> Result<TargetGroup, RefinderError> {
    let name = target.name().to_string();
    let candidates = scanner::scan(target, variants)?;
    on_progress(SearchProgress::TargetScanned {
        target: name.clone(),
        candidates: candidates.len(),
    });
    let occurrences = overlap::resolve(&candidates);
    on_progress(SearchProgress::TargetResolved {
        target: name.clone(),
        occurrences: occurrences.len(),
    });
    let (outcome, rows) = rank(&occurrences, target, params.tis_offset, params.threshold);
    on_progress(SearchProgress::TargetRanked {
        target: name.clone(),
        rows: rows.len(),
    });
    Ok(TargetGroup {
        target: name,
        outcome,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::Orientation;

    fn params(pattern: &str, threshold: f64) -> SearchParams {
        SearchParams {
            pattern: pattern.to_string(),
            tis_offset: 0,
            threshold,
        }
    }

    fn single_target(sequence: &str) -> Vec<TargetSequence> {
        vec![TargetSequence::new(Some("prom"), sequence)]
    }

    #[test]
    fn test_single_forward_hit() {
        let table =
            find_responsive_elements(&params("ATG", 80.0), &single_target("CCATGCC")).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.has_hits());
        let group = &table.groups()[0];
        assert_eq!(group.outcome, SearchOutcome::HitsFound);
        let row = &group.rows[0];
        assert_eq!(row.position, 2);
        assert_eq!(row.tis_position, 2);
        assert_eq!(row.homology, 100.0);
        assert_eq!(row.orientation, Orientation::Forward);
        assert_eq!(row.sequence, "ccATGcc");
        assert_eq!(row.reference_variant, "ATG");
    }

    #[test]
    fn test_palindromic_detections_collapse_to_one_hit() {
        // "AT" also matches as its own reverse-complement at the same
        // offset; overlap resolution keeps a single hit
        let table = find_responsive_elements(&params("AT", 100.0), &single_target("AT")).unwrap();
        assert_eq!(table.row_count(), 1);
        let row = &table.groups()[0].rows[0];
        assert_eq!(row.position, 0);
        assert_eq!(row.homology, 100.0);
    }

    #[test]
    fn test_fully_degenerate_pattern_matches_everywhere() {
        let table = find_responsive_elements(&params("NN", 100.0), &single_target("GC")).unwrap();
        let group = &table.groups()[0];
        assert_eq!(group.outcome, SearchOutcome::HitsFound);
        assert_eq!(group.rows.len(), 1);
        assert_eq!(group.rows[0].position, 0);
        assert_eq!(group.rows[0].homology, 100.0);
    }

    #[test]
    fn test_pattern_longer_than_target() {
        let table =
            find_responsive_elements(&params("ATGATGATG", 80.0), &single_target("ATG")).unwrap();
        let group = &table.groups()[0];
        assert_eq!(group.outcome, SearchOutcome::NoCandidateFound);
        assert!(group.rows.is_empty());
    }

    #[test]
    fn test_below_threshold_is_distinct_from_no_candidate() {
        // One candidate at 75% homology, filtered by a 99% threshold
        let table = find_responsive_elements(&params("ATGC", 99.0), &single_target("ATGG")).unwrap();
        let group = &table.groups()[0];
        assert_eq!(group.outcome, SearchOutcome::NoHitAboveThreshold);
        assert!(group.rows.is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let p = params("RATG", 50.0);
        let targets = single_target("CCATGCCAATGAT");
        let first = find_responsive_elements(&p, &targets).unwrap();
        let second = find_responsive_elements(&p, &targets).unwrap();
        assert_eq!(first, second);
        assert!(first.row_count() > 0);
    }

    #[test]
    fn test_invalid_threshold_aborts_before_scanning() {
        let mut p = params("ATG", 80.0);
        p.threshold = 101.0;
        assert!(matches!(
            find_responsive_elements(&p, &single_target("ATG")),
            Err(RefinderError::InvalidInput(_))
        ));
        p.threshold = f64::NAN;
        assert!(matches!(
            find_responsive_elements(&p, &single_target("ATG")),
            Err(RefinderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_pattern_is_an_error() {
        assert!(matches!(
            find_responsive_elements(&params("", 80.0), &single_target("ATG")),
            Err(RefinderError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_progress_phases_in_order() {
        let mut phases = vec![];
        let mut on_progress = |p: SearchProgress| phases.push(p);
        find_responsive_elements_with_progress(
            &params("ATG", 80.0),
            &single_target("CCATGCC"),
            &mut on_progress,
        )
        .unwrap();
        assert_eq!(phases.len(), 4);
        assert!(matches!(phases[0], SearchProgress::PatternCompiled { variants: 4 }));
        assert!(matches!(phases[1], SearchProgress::TargetScanned { .. }));
        assert!(matches!(phases[2], SearchProgress::TargetResolved { .. }));
        assert!(matches!(phases[3], SearchProgress::TargetRanked { rows: 1, .. }));
    }

    #[test]
    fn test_block_search_reports_bad_records_alongside_hits() {
        let mut noop = |_| {};
        let table = search_block(
            &params("ATG", 80.0),
            ">good\nCCATGCC\n>broken\n>also_good\nTTATGTT\n",
            &mut noop,
        )
        .unwrap();
        let outcomes: Vec<&SearchOutcome> =
            table.groups().iter().map(|g| &g.outcome).collect();
        assert_eq!(table.groups().len(), 3);
        assert_eq!(*outcomes[0], SearchOutcome::HitsFound);
        assert!(matches!(outcomes[1], SearchOutcome::Failed { .. }));
        assert_eq!(*outcomes[2], SearchOutcome::HitsFound);
    }

    #[test]
    fn test_groups_preserve_caller_order() {
        let targets = vec![
            TargetSequence::new(Some("zeta"), "CCATGCC"),
            TargetSequence::new(Some("alpha"), "CCATGCC"),
        ];
        let table = find_responsive_elements(&params("ATG", 80.0), &targets).unwrap();
        let names: Vec<&str> = table.groups().iter().map(|g| g.target.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
