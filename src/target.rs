use crate::error::RefinderError;
use bio::io::fasta;
use serde::{Deserialize, Serialize};
use std::fs::File;

/// Display name used for targets that were pasted without a header line.
pub const UNNAMED_TARGET: &str = "n.d.";

/// Record names are shortened for display, as in the result table header.
const MAX_DISPLAY_NAME: usize = 10;

/// A named, immutable DNA sequence to be searched. Bases are uppercased
/// on construction; characters outside A/C/G/T are kept and matched
/// literally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetSequence {
    name: Option<String>,
    bases: Vec<u8>,
}

impl TargetSequence {
    pub fn new(name: Option<&str>, sequence: &str) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let bases = sequence
            .bytes()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self { name, bases }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_TARGET)
    }

    #[inline(always)]
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// One record out of a parsed batch. Malformed records are carried along
/// so that a bad entry never aborts its siblings.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedRecord {
    Target(TargetSequence),
    Malformed { name: String, message: String },
}

fn shorten_name(name: &str) -> String {
    name.chars().take(MAX_DISPLAY_NAME).collect()
}

fn flush_record(name: Option<&str>, lines: &[&str], records: &mut Vec<ParsedRecord>) {
    let display = name
        .map(shorten_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNNAMED_TARGET.to_string());
    let sequence = lines.concat();
    let target = TargetSequence::new(Some(&display), &sequence);
    if target.is_empty() {
        records.push(ParsedRecord::Malformed {
            name: display,
            message: "record has no sequence".to_string(),
        });
    } else {
        records.push(ParsedRecord::Target(target));
    }
}

/// Parses a pasted block of text. A block that does not start with a `>`
/// header is taken as a single unnamed sequence; otherwise each `>` line
/// opens a record whose sequence may span several lines.
pub fn parse_block(text: &str) -> Vec<ParsedRecord> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![];
    }
    if !trimmed.starts_with('>') {
        let target = TargetSequence::new(None, trimmed);
        if target.is_empty() {
            return vec![ParsedRecord::Malformed {
                name: UNNAMED_TARGET.to_string(),
                message: "record has no sequence".to_string(),
            }];
        }
        return vec![ParsedRecord::Target(target)];
    }

    let mut records = vec![];
    let mut current_name: Option<&str> = None;
    let mut current_lines: Vec<&str> = vec![];
    let mut in_record = false;
    for line in trimmed.lines() {
        if let Some(header) = line.strip_prefix('>') {
            if in_record {
                flush_record(current_name, &current_lines, &mut records);
            }
            current_name = Some(header.trim());
            current_lines.clear();
            in_record = true;
        } else if in_record {
            current_lines.push(line);
        }
    }
    if in_record {
        flush_record(current_name, &current_lines, &mut records);
    }
    records
}

/// Reads targets from a FASTA file. Unreadable records are reported as
/// malformed entries instead of aborting the batch.
pub fn parse_fasta_file(filename: &str) -> Result<Vec<ParsedRecord>, RefinderError> {
    let file = File::open(filename)?;
    let mut records = vec![];
    for (i, record) in fasta::Reader::new(file).records().enumerate() {
        match record {
            Ok(record) => {
                let name = shorten_name(record.id());
                let sequence = String::from_utf8_lossy(record.seq()).to_string();
                let target = TargetSequence::new(Some(&name), &sequence);
                if target.is_empty() {
                    records.push(ParsedRecord::Malformed {
                        name,
                        message: "record has no sequence".to_string(),
                    });
                } else {
                    records.push(ParsedRecord::Target(target));
                }
            }
            Err(e) => records.push(ParsedRecord::Malformed {
                name: format!("record {}", i + 1),
                message: e.to_string(),
            }),
        }
    }
    Ok(records)
}
