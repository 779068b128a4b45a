use rand::Rng;
use serde::{Deserialize, Serialize};

/// Version of the shift code/label contract shared with consumers of result documents.
pub const SHIFT_CONTRACT_VERSION: u32 = 1;

/// Duty assigned to one staff member on one day.
///
/// The discriminants are the wire codes and the labels are what result documents
/// carry. Both are a fixed external contract, see [`SHIFT_CONTRACT_VERSION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Shift {
    #[serde(rename = "Libre")]
    Rest = 0,
    #[serde(rename = "Mañana")]
    Morning = 1,
    #[serde(rename = "Tarde")]
    Afternoon = 2,
    #[serde(rename = "Noche")]
    Night = 3,
}

impl Shift {
    pub const ALL: [Shift; 4] = [Shift::Rest, Shift::Morning, Shift::Afternoon, Shift::Night];

    /// Shifts that require coverage. Everything except [`Shift::Rest`].
    pub const WORKING: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Shift::Rest => "Libre",
            Shift::Morning => "Mañana",
            Shift::Afternoon => "Tarde",
            Shift::Night => "Noche",
        }
    }

    pub fn is_working(self) -> bool {
        self != Shift::Rest
    }

    /// Uniformly random shift.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Uniformly random shift different from `self`.
    pub fn random_other<R: Rng>(self, rng: &mut R) -> Self {
        // Draw from the three remaining codes and skip over our own.
        let pick = rng.random_range(0..Self::ALL.len() - 1) as u8;
        let code = if pick >= self.code() { pick + 1 } else { pick };
        Self::ALL[code as usize]
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
