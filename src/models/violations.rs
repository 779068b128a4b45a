use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Hard,
    Soft,
}

/// Every rule the constraint evaluator checks.
///
/// The serialized names are the keys of the violation mappings in result documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Night shift directly followed by a Morning shift.
    #[serde(rename = "noche_manana")]
    NightMorning,
    /// Run of working days longer than allowed.
    #[serde(rename = "dias_consecutivos")]
    ConsecutiveDays,
    /// Working shift without the required specialist.
    #[serde(rename = "especialistas")]
    Specialists,
    /// Working shift below minimum headcount.
    #[serde(rename = "cobertura")]
    Coverage,
    /// Preferred day left as rest.
    #[serde(rename = "preferencias")]
    Preferences,
    /// Uneven number of worked days across staff.
    #[serde(rename = "equidad")]
    Equity,
    /// Uneven number of nights across staff.
    #[serde(rename = "noches")]
    Nights,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 7] = [
        ViolationKind::NightMorning,
        ViolationKind::ConsecutiveDays,
        ViolationKind::Specialists,
        ViolationKind::Coverage,
        ViolationKind::Preferences,
        ViolationKind::Equity,
        ViolationKind::Nights,
    ];

    pub fn severity(self) -> Severity {
        match self {
            ViolationKind::NightMorning
            | ViolationKind::ConsecutiveDays
            | ViolationKind::Specialists
            | ViolationKind::Coverage => Severity::Hard,
            ViolationKind::Preferences | ViolationKind::Equity | ViolationKind::Nights => {
                Severity::Soft
            }
        }
    }

    /// External label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            ViolationKind::NightMorning => "noche_manana",
            ViolationKind::ConsecutiveDays => "dias_consecutivos",
            ViolationKind::Specialists => "especialistas",
            ViolationKind::Coverage => "cobertura",
            ViolationKind::Preferences => "preferencias",
            ViolationKind::Equity => "equidad",
            ViolationKind::Nights => "noches",
        }
    }
}

/// Human readable violations of one scored schedule, split by severity.
///
/// Kinds without violations have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationReport {
    pub hard: BTreeMap<ViolationKind, Vec<String>>,
    pub soft: BTreeMap<ViolationKind, Vec<String>>,
}

impl ViolationReport {
    pub fn record(&mut self, kind: ViolationKind, description: String) {
        let bucket = match kind.severity() {
            Severity::Hard => &mut self.hard,
            Severity::Soft => &mut self.soft,
        };
        bucket.entry(kind).or_default().push(description);
    }

    pub fn entries(&self, kind: ViolationKind) -> &[String] {
        let bucket = match kind.severity() {
            Severity::Hard => &self.hard,
            Severity::Soft => &self.soft,
        };
        bucket.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.entries(kind).len()
    }

    pub fn has_hard_violations(&self) -> bool {
        !self.hard.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.hard.is_empty() && self.soft.is_empty()
    }
}
