//! Per-opcode length history and classification.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Add;

/// Whether an opcode has always been seen with the same payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Fixed(u32),
    Variable,
}

impl Classification {
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(len) => write!(f, "fixed({len})"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// Everything known about one opcode in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeRecord {
    pub opcode: u16,
    pub observed_lengths: BTreeSet<u32>,
    pub occurrence_count: u64,
    pub classification: Classification,
}

impl OpcodeRecord {
    /// A record before its first observation has been applied.
    pub(crate) fn new(opcode: u16) -> Self {
        Self {
            opcode,
            observed_lengths: BTreeSet::new(),
            occurrence_count: 0,
            classification: Classification::Variable,
        }
    }

    /// Apply one observation. Returns the classification before the update.
    pub(crate) fn observe(&mut self, len: u32) -> Option<Classification> {
        let previous = (self.occurrence_count > 0).then_some(self.classification);

        self.occurrence_count += 1;
        self.observed_lengths.insert(len);
        self.classification = classify(&self.observed_lengths);

        previous
    }
}

/// Fixed(L) iff exactly one length L has been observed.
fn classify(lengths: &BTreeSet<u32>) -> Classification {
    let mut iter = lengths.iter();
    match (iter.next(), iter.next()) {
        (Some(&len), None) => Classification::Fixed(len),
        _ => Classification::Variable,
    }
}

/// Classification totals derived from a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationCounts {
    pub total: usize,
    pub fixed: usize,
    pub variable: usize,
}

impl ClassificationCounts {
    /// Count records in a single pass.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a OpcodeRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut counts, record| {
                counts.total += 1;
                match record.classification {
                    Classification::Fixed(_) => counts.fixed += 1,
                    Classification::Variable => counts.variable += 1,
                }
                counts
            })
    }
}

impl Add for ClassificationCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            fixed: self.fixed + other.fixed,
            variable: self.variable + other.variable,
        }
    }
}
