use core::fmt;

use sdhi::control_values::ControlError;

/// Errors raised while binding an action list against a control model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionError {
    /// An action parameter could not be bound.
    Control(ControlError),
}

impl From<ControlError> for ActionError {
    fn from(error: ControlError) -> Self {
        ActionError::Control(error)
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ActionError::Control(e) => write!(f, "action parameter: {}", e),
        }
    }
}
