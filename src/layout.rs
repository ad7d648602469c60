//! Slot assignment: panels map to a fixed grid of screen slots.

use ratatui::layout::{Constraint, Layout, Rect};

/// Number of slots in the grid.
pub const SLOT_COUNT: usize = 6;

/// Grid shape: 2 columns of 3 rows each.
const COLUMNS: usize = 2;
const ROWS: usize = 3;

/// Assigns panels to a fixed ordered list of screen slots.
///
/// Assignment is positional by insertion order: the Nth panel added takes
/// the Nth free slot in order. Panels beyond capacity share the last slot,
/// where the most recently added one is drawn. A slot stays bound to its
/// panel id until that panel is removed; removal never renumbers other
/// panels' slots, but it does promote the oldest overflow panel into the
/// freed slot.
#[derive(Debug, Clone, Default)]
pub struct SlotGrid {
    slots: [Option<String>; SLOT_COUNT],
    /// Panels beyond capacity, oldest first. All share the last slot.
    overflow: Vec<String>,
}

impl SlotGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a panel to the first free slot, returning the slot index.
    ///
    /// A panel that already holds a slot keeps it. When every slot is taken,
    /// the panel joins the overflow list on the last slot.
    pub fn assign(&mut self, panel_id: &str) -> usize {
        if let Some(idx) = self.slot_of(panel_id) {
            return idx;
        }
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(panel_id.to_string());
                idx
            }
            None => {
                self.overflow.push(panel_id.to_string());
                SLOT_COUNT - 1
            }
        }
    }

    /// The slot currently held by a panel, if any.
    pub fn slot_of(&self, panel_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_deref() == Some(panel_id))
            .or_else(|| {
                self.overflow
                    .iter()
                    .any(|id| id == panel_id)
                    .then_some(SLOT_COUNT - 1)
            })
    }

    /// Free the slot held by a panel. Other assignments keep their slots;
    /// a freed slot is refilled by the oldest overflow panel, if any.
    pub fn release(&mut self, panel_id: &str) {
        for slot in &mut self.slots {
            if slot.as_deref() == Some(panel_id) {
                *slot = if self.overflow.is_empty() {
                    None
                } else {
                    Some(self.overflow.remove(0))
                };
            }
        }
        self.overflow.retain(|id| id != panel_id);
    }

    /// The panel id drawn in a slot, if any.
    ///
    /// On the last slot, the most recent overflow panel takes precedence
    /// over the slot's own occupant.
    pub fn occupant(&self, slot: usize) -> Option<&str> {
        if slot == SLOT_COUNT - 1 {
            if let Some(id) = self.overflow.last() {
                return Some(id);
            }
        }
        self.slots.get(slot).and_then(|s| s.as_deref())
    }

    /// Number of assigned panels, overflow included.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count() + self.overflow.len()
    }
}

/// Split an area into the grid's slot rectangles, indexed row-major.
pub fn slot_rects(area: Rect) -> Vec<Rect> {
    let columns = Layout::horizontal([Constraint::Ratio(1, COLUMNS as u32); COLUMNS]).split(area);

    let mut rects = vec![Rect::default(); SLOT_COUNT];
    for (col, column) in columns.iter().enumerate() {
        let rows = Layout::vertical([Constraint::Ratio(1, ROWS as u32); ROWS]).split(*column);
        for (row, rect) in rows.iter().enumerate() {
            // Slot order is row-major: slot N sits at (N / 2, N % 2)
            rects[row * COLUMNS + col] = *rect;
        }
    }
    rects
}
