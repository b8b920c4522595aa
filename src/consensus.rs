use crate::error::RefinderError;
use crate::iupac_code::IupacCode;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four ways a double-stranded motif can face the reference strand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    Reversed,
    Complement,
    ReverseComplement,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Orientation::Forward => "forward",
            Orientation::Reversed => "reversed",
            Orientation::Complement => "complement",
            Orientation::ReverseComplement => "reverse-complement",
        };
        write!(f, "{label}")
    }
}

/// One concrete string derived from a consensus pattern, tagged with the
/// orientation it was generated in. Expansion never changes the length.
#[derive(Clone, Debug, PartialEq)]
pub struct MotifVariant {
    sequence: Vec<u8>,
    orientation: Orientation,
}

impl MotifVariant {
    pub fn new(sequence: Vec<u8>, orientation: Orientation) -> Self {
        Self {
            sequence,
            orientation,
        }
    }

    #[inline(always)]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    #[inline(always)]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn sequence_string(&self) -> String {
        String::from_utf8_lossy(&self.sequence).to_string()
    }
}

/// A degenerate IUPAC consensus sequence, as typed by the user.
/// Uppercased on construction; characters outside the IUPAC alphabet are
/// kept as-is and later matched literally.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusPattern {
    bases: Vec<u8>,
}

impl ConsensusPattern {
    pub fn new(pattern: &str) -> Result<Self, RefinderError> {
        if pattern.is_empty() {
            return Err(RefinderError::InvalidPattern(
                "the consensus sequence is empty".to_string(),
            ));
        }
        Ok(Self {
            bases: pattern.bytes().map(|c| c.to_ascii_uppercase()).collect(),
        })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Full variant set: the Cartesian product of every ambiguity code's
    /// alternatives, crossed with the four orientations. Order matters
    /// downstream (overlap ties are broken by earliest scan order), so
    /// each expansion contributes forward, reversed, complement and
    /// reverse-complement in that sequence.
    pub fn expand(&self) -> Vec<MotifVariant> {
        self.expansions()
            .into_iter()
            .flat_map(orientation_variants)
            .collect()
    }

    /// Left-to-right Cartesian expansion of the ambiguity codes. Plain
    /// bases and unrecognized characters stay fixed at their position.
    fn expansions(&self) -> Vec<Vec<u8>> {
        self.bases
            .iter()
            .map(|&base| {
                if IupacCode::is_ambiguity_code(base) {
                    IupacCode::from_letter(base).alternatives()
                } else {
                    vec![base]
                }
            })
            .multi_cartesian_product()
            .collect()
    }
}

fn orientation_variants(expanded: Vec<u8>) -> Vec<MotifVariant> {
    let reversed: Vec<u8> = expanded.iter().rev().copied().collect();
    let complement: Vec<u8> = expanded
        .iter()
        .map(|&base| IupacCode::letter_complement(base))
        .collect();
    let reverse_complement: Vec<u8> = complement.iter().rev().copied().collect();
    vec![
        MotifVariant {
            sequence: expanded,
            orientation: Orientation::Forward,
        },
        MotifVariant {
            sequence: reversed,
            orientation: Orientation::Reversed,
        },
        MotifVariant {
            sequence: complement,
            orientation: Orientation::Complement,
        },
        MotifVariant {
            sequence: reverse_complement,
            orientation: Orientation::ReverseComplement,
        },
    ]
}
