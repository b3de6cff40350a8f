use super::control::ControlId;

/// A value source for one field of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    /// Fixed value.
    Constant(i32),
    /// Resolved value of a control plus `offset`.
    Control { id: ControlId, offset: i32 },
}

impl Parameter {
    /// Reference a control without offset.
    pub const fn control(id: u16) -> Self {
        Parameter::Control {
            id: ControlId(id),
            offset: 0,
        }
    }

    /// Reference a control and add `offset` to its resolved value.
    pub const fn control_offset(id: u16, offset: i32) -> Self {
        Parameter::Control {
            id: ControlId(id),
            offset,
        }
    }
}

/// Position of a control inside the model that produced it.
///
/// Only obtainable from [`ControlModel::locate`](super::ControlModel::locate),
/// so it always addresses an existing control of that model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlIndex(pub(crate) usize);

impl ControlIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// A [`Parameter`] whose control reference has been checked and located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operand {
    Constant(i32),
    Control { index: ControlIndex, offset: i32 },
}
