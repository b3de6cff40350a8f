use super::control::ControlId;

/// Number of encoder slots on a panel.
pub const SLOTS_PER_PANEL: usize = 8;

/// Encoder axis that moves between panels instead of editing a control.
pub const PANEL_SELECTOR_AXIS: usize = SLOTS_PER_PANEL;

/// Total encoder axes consumed by [`ControlModel::apply_deltas`](super::ControlModel::apply_deltas).
pub const AXIS_COUNT: usize = SLOTS_PER_PANEL + 1;

/// A page of controls mapped to the physical encoders.
///
/// Each panel has exactly [`SLOTS_PER_PANEL`] slots. A `None` slot means
/// the corresponding encoder has no effect while the panel is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Panel {
    pub title: &'static str,
    /// Control ids indexed by encoder position (0–7).
    pub slots: [Option<ControlId>; SLOTS_PER_PANEL],
}

impl Panel {
    pub const fn new(title: &'static str, slots: [Option<ControlId>; SLOTS_PER_PANEL]) -> Self {
        Self { title, slots }
    }

    /// Count the occupied slots.
    pub fn active_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
