use core::fmt;

use super::control::ControlId;

/// Configuration errors detected while building or binding against a
/// [`ControlModel`](super::ControlModel).
///
/// These indicate a wiring mistake in the instrument definition, not a
/// runtime condition. Callers are expected to treat them as fatal at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// A panel slot or parameter references a control id that does not exist.
    UnknownControl(ControlId),
    /// Two controls share the same id.
    DuplicateControl(ControlId),
    /// Bounds are inverted, the step is not positive, or the initial value
    /// lies outside the bounds.
    InvalidRange(ControlId),
    /// An enumeration control has no options.
    NoOptions(ControlId),
    /// The model was built without any panel.
    NoPanels,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ControlError::UnknownControl(id) => write!(f, "unknown control id {}", id.0),
            ControlError::DuplicateControl(id) => write!(f, "duplicate control id {}", id.0),
            ControlError::InvalidRange(id) => write!(f, "invalid range for control {}", id.0),
            ControlError::NoOptions(id) => write!(f, "enumeration control {} has no options", id.0),
            ControlError::NoPanels => write!(f, "no panels configured"),
        }
    }
}
