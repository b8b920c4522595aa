use crate::scanner::Hit;
use crate::target::TargetSequence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bases of flanking context shown on each side of a match.
pub const CONTEXT_FLANK: usize = 3;

pub const TABLE_HEADER: [&str; 6] = [
    "Position",
    "Position (TIS)",
    "Sequence",
    "% Homology",
    "Ref seq",
    "Prom.",
];

/// Terminal state of one target's search. The two empty states are
/// distinct: no window ever met the mismatch budget, versus candidates
/// that all fell below the homology threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SearchOutcome {
    HitsFound,
    NoCandidateFound,
    NoHitAboveThreshold,
    Failed { message: String },
}

/// One accepted match, fully annotated for display or export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub position: usize,
    pub tis_position: i64,
    /// Match with 3 bases of context each side; flanks lowercase, the
    /// matched span uppercase.
    pub sequence: String,
    /// Rounded to one decimal.
    pub homology: f64,
    pub reference_variant: String,
    pub orientation: crate::consensus::Orientation,
    pub target_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub target: String,
    pub outcome: SearchOutcome,
    pub rows: Vec<ResultRow>,
}

/// Accepted hits grouped by target in caller order, rebuilt from scratch
/// on every search. There is no process-wide result store; callers thread
/// this value to any downstream consumer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    groups: Vec<TargetGroup>,
}

impl ResultTable {
    pub fn push_group(&mut self, group: TargetGroup) {
        self.groups.push(group);
    }

    #[inline(always)]
    pub fn groups(&self) -> &[TargetGroup] {
        &self.groups
    }

    pub fn rows(&self) -> impl Iterator<Item = &ResultRow> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn has_hits(&self) -> bool {
        self.groups
            .iter()
            .any(|g| g.outcome == SearchOutcome::HitsFound)
    }
}

/// Annotates, sorts and filters one target's resolved hits.
/// Rows are ordered by homology descending, ties by offset ascending.
pub fn rank(
    hits: &[Hit],
    target: &TargetSequence,
    tis_offset: i64,
    threshold: f64,
) -> (SearchOutcome, Vec<ResultRow>) {
    if hits.is_empty() {
        return (SearchOutcome::NoCandidateFound, vec![]);
    }
    let mut accepted: Vec<&Hit> = hits.iter().filter(|h| h.homology >= threshold).collect();
    if accepted.is_empty() {
        return (SearchOutcome::NoHitAboveThreshold, vec![]);
    }
    accepted.sort_by(|a, b| {
        b.homology
            .total_cmp(&a.homology)
            .then(a.offset.cmp(&b.offset))
    });
    let rows = accepted
        .iter()
        .map(|hit| build_row(hit, target, tis_offset))
        .collect();
    (SearchOutcome::HitsFound, rows)
}

fn build_row(hit: &Hit, target: &TargetSequence, tis_offset: i64) -> ResultRow {
    ResultRow {
        position: hit.offset,
        tis_position: hit.offset as i64 - tis_offset,
        sequence: context_string(target.bases(), hit.offset, hit.matched.len()),
        homology: (hit.homology * 10.0).round() / 10.0,
        reference_variant: hit.variant.sequence_string(),
        orientation: hit.variant.orientation(),
        target_name: target.name().to_string(),
    }
}

fn context_string(bases: &[u8], offset: usize, length: usize) -> String {
    let start = offset.saturating_sub(CONTEXT_FLANK);
    let end = (offset + length + CONTEXT_FLANK).min(bases.len());
    bases[start..end]
        .iter()
        .enumerate()
        .map(|(i, &base)| {
            let position = start + i;
            if position < offset || position >= offset + length {
                base.to_ascii_lowercase() as char
            } else {
                base.to_ascii_uppercase() as char
            }
        })
        .collect()
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, ">{}", group.target)?;
            match &group.outcome {
                SearchOutcome::HitsFound => write_group_table(f, &group.rows)?,
                SearchOutcome::NoCandidateFound => {
                    writeln!(f, "No consensus sequence found in the promoter region.")?
                }
                SearchOutcome::NoHitAboveThreshold => {
                    writeln!(f, "No consensus sequence found with the specified threshold.")?
                }
                SearchOutcome::Failed { message } => writeln!(f, "Error: {message}")?,
            }
        }
        Ok(())
    }
}

fn write_group_table(f: &mut fmt::Formatter, rows: &[ResultRow]) -> fmt::Result {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|r| {
            [
                r.position.to_string(),
                r.tis_position.to_string(),
                r.sequence.clone(),
                format!("{:.1}", r.homology),
                r.reference_variant.clone(),
                r.target_name.clone(),
            ]
        })
        .collect();
    let mut widths: [usize; 6] = TABLE_HEADER.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    write!(f, "|")?;
    for (header, width) in TABLE_HEADER.iter().zip(widths) {
        write!(f, " {header:<width$} |")?;
    }
    writeln!(f)?;
    write!(f, "|")?;
    for width in widths {
        write!(f, "{:-<pad$}|", "", pad = width + 2)?;
    }
    writeln!(f)?;
    for row in &cells {
        write!(f, "|")?;
        for (cell, width) in row.iter().zip(widths) {
            write!(f, " {cell:<width$} |")?;
        }
        writeln!(f)?;
    }
    Ok(())
}
