use super::Shift;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One candidate roster: a staff × day grid of shifts.
///
/// This is the chromosome of the genetic algorithm. Cells are stored row-major,
/// one row per staff member, so that a row is a contiguous day sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    staff_count: usize,
    day_count: usize,
    cells: Vec<Shift>,
}

#[derive(Debug, thiserror::Error)]
#[error("ragged schedule: row {row} has {found} days, expected {expected}")]
pub struct RaggedRowsError {
    row: usize,
    found: usize,
    expected: usize,
}

impl Schedule {
    /// Creates a schedule with every cell set to `shift`.
    pub fn filled(staff_count: usize, day_count: usize, shift: Shift) -> Self {
        Self {
            staff_count,
            day_count,
            cells: vec![shift; staff_count * day_count],
        }
    }

    /// Creates a schedule with an independent uniformly random shift per cell.
    #[instrument(level = "debug", skip(rng))]
    pub fn random<R: Rng>(staff_count: usize, day_count: usize, rng: &mut R) -> Self {
        let cells = (0..staff_count * day_count)
            .map(|_| Shift::random(rng))
            .collect();

        Self {
            staff_count,
            day_count,
            cells,
        }
    }

    /// Builds a schedule from explicit rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Shift>>) -> Result<Self, RaggedRowsError> {
        let staff_count = rows.len();
        let day_count = rows.first().map(Vec::len).unwrap_or(0);
        let mut cells = Vec::with_capacity(staff_count * day_count);

        for (row, shifts) in rows.into_iter().enumerate() {
            if shifts.len() != day_count {
                return Err(RaggedRowsError {
                    row,
                    found: shifts.len(),
                    expected: day_count,
                });
            }
            cells.extend(shifts);
        }

        Ok(Self {
            staff_count,
            day_count,
            cells,
        })
    }

    pub(crate) fn from_cells(staff_count: usize, day_count: usize, cells: Vec<Shift>) -> Self {
        debug_assert_eq!(cells.len(), staff_count * day_count);
        Self {
            staff_count,
            day_count,
            cells,
        }
    }

    pub fn staff_count(&self) -> usize {
        self.staff_count
    }

    pub fn day_count(&self) -> usize {
        self.day_count
    }

    pub fn get(&self, staff: usize, day: usize) -> Shift {
        self.cells[staff * self.day_count + day]
    }

    pub fn set(&mut self, staff: usize, day: usize, shift: Shift) {
        self.cells[staff * self.day_count + day] = shift;
    }

    /// The day sequence of one staff member.
    pub fn row(&self, staff: usize) -> &[Shift] {
        let start = staff * self.day_count;
        &self.cells[start..start + self.day_count]
    }

    pub(crate) fn row_mut(&mut self, staff: usize) -> &mut [Shift] {
        let start = staff * self.day_count;
        &mut self.cells[start..start + self.day_count]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Shift]> {
        // chunks(0) panics, an empty grid simply has no rows
        self.cells.chunks(self.day_count.max(1))
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Shift] {
        &mut self.cells
    }

    /// Number of staff assigned to `shift` on `day`.
    pub fn headcount(&self, day: usize, shift: Shift) -> usize {
        (0..self.staff_count)
            .filter(|&staff| self.get(staff, day) == shift)
            .count()
    }

    /// Number of non-rest days worked by `staff`.
    pub fn worked_days(&self, staff: usize) -> usize {
        self.row(staff).iter().filter(|shift| shift.is_working()).count()
    }

    /// Number of night shifts worked by `staff`.
    pub fn nights(&self, staff: usize) -> usize {
        self.row(staff)
            .iter()
            .filter(|&&shift| shift == Shift::Night)
            .count()
    }

    pub fn has_shape(&self, staff_count: usize, day_count: usize) -> bool {
        self.staff_count == staff_count && self.day_count == day_count
    }
}
