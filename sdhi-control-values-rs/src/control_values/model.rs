use super::control::{Control, ControlId};
use super::error::ControlError;
use super::panel::{Panel, AXIS_COUNT, PANEL_SELECTOR_AXIS, SLOTS_PER_PANEL};
use super::parameter::{ControlIndex, Operand, Parameter};

/// Control state with panel-based organization.
///
/// Owns every control value and the index of the panel currently shown.
/// It is owned by the main loop; encoder deltas arrive through
/// [`apply_deltas()`](Self::apply_deltas) and actions read values through
/// bound [`Operand`]s.
///
/// # Initialization
///
/// [`ControlModel::new()`] validates the whole instrument definition up
/// front. Every panel slot and every parameter bound later must name an
/// existing control, so nothing is looked up by id on the hot path: the
/// current panel's slots are located once, when the panel is selected.
pub struct ControlModel<const C: usize> {
    controls: [Control; C],
    panels: &'static [Panel],
    panel_selector_title: &'static str,
    current_panel: usize,
    /// Located controls of the current panel, by encoder slot.
    slots: [Option<ControlIndex>; SLOTS_PER_PANEL],
}

impl<const C: usize> ControlModel<C> {
    /// Build a model from static configuration, starting on panel 0.
    ///
    /// # Errors
    /// * [`ControlError::NoPanels`] if `panels` is empty
    /// * [`ControlError::DuplicateControl`] if two controls share an id
    /// * [`ControlError::InvalidRange`] / [`ControlError::NoOptions`] for a
    ///   malformed value kind
    /// * [`ControlError::UnknownControl`] if a panel slot names a missing control
    pub fn new(
        controls: [Control; C],
        panels: &'static [Panel],
        panel_selector_title: &'static str,
    ) -> Result<Self, ControlError> {
        if panels.is_empty() {
            return Err(ControlError::NoPanels);
        }

        for (i, control) in controls.iter().enumerate() {
            if controls[..i].iter().any(|other| other.id == control.id) {
                return Err(ControlError::DuplicateControl(control.id));
            }
            control.kind.validate(control.id)?;
        }

        for panel in panels {
            for &id in panel.slots.iter().flatten() {
                if !controls.iter().any(|control| control.id == id) {
                    return Err(ControlError::UnknownControl(id));
                }
            }
        }

        let mut model = Self {
            controls,
            panels,
            panel_selector_title,
            current_panel: 0,
            slots: [None; SLOTS_PER_PANEL],
        };
        model.locate_slots();
        Ok(model)
    }

    // ── Panel navigation ─────────────────────────────────────────────

    /// Returns the index of the panel currently shown.
    pub fn current_panel(&self) -> usize {
        self.current_panel
    }

    /// Returns the panel currently shown.
    pub fn panel(&self) -> &Panel {
        &self.panels[self.current_panel]
    }

    pub fn panels(&self) -> &'static [Panel] {
        self.panels
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Title shown above the panel selector encoder.
    pub fn panel_selector_title(&self) -> &'static str {
        self.panel_selector_title
    }

    /// Move the panel selection by `delta`, clamped to the panel list.
    ///
    /// No acceleration is applied. Returns `true` if the panel changed.
    pub fn select_panel_by(&mut self, delta: i32) -> bool {
        let last = self.panels.len() as i64 - 1;
        let target = (self.current_panel as i64 + i64::from(delta)).clamp(0, last) as usize;
        if target == self.current_panel {
            return false;
        }
        self.current_panel = target;
        self.locate_slots();
        true
    }

    fn locate_slots(&mut self) {
        let panel = self.panels[self.current_panel];
        self.slots = panel.slots.map(|slot| slot.and_then(|id| self.locate(id).ok()));
    }

    // ── Control access ───────────────────────────────────────────────

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, index: ControlIndex) -> &Control {
        &self.controls[index.0]
    }

    pub fn control_by_id(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|control| control.id == id)
    }

    /// Controls of the current panel indexed by encoder slot, for rendering.
    pub fn panel_controls(&self) -> [Option<&Control>; SLOTS_PER_PANEL] {
        self.slots.map(|slot| slot.map(|index| self.control(index)))
    }

    /// Find the position of a control.
    ///
    /// Returns [`ControlError::UnknownControl`] if no control has this id.
    pub fn locate(&self, id: ControlId) -> Result<ControlIndex, ControlError> {
        self.controls
            .iter()
            .position(|control| control.id == id)
            .map(ControlIndex)
            .ok_or(ControlError::UnknownControl(id))
    }

    // ── Parameter resolution ─────────────────────────────────────────

    /// Check a parameter reference once so it can be read without lookup.
    pub fn bind(&self, parameter: &Parameter) -> Result<Operand, ControlError> {
        match *parameter {
            Parameter::Constant(value) => Ok(Operand::Constant(value)),
            Parameter::Control { id, offset } => Ok(Operand::Control {
                index: self.locate(id)?,
                offset,
            }),
        }
    }

    /// Current value of a bound operand.
    ///
    /// Integers and reals yield their stored count, enumerations the value
    /// of the selected option, plus the operand's offset.
    pub fn value_of(&self, operand: &Operand) -> i32 {
        match *operand {
            Operand::Constant(value) => value,
            Operand::Control { index, offset } => {
                self.control(index).kind.wire_value().saturating_add(offset)
            }
        }
    }

    /// Resolve an unbound parameter reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdhi::control_values::{Control, ControlModel, Panel, Parameter};
    ///
    /// static PANELS: [Panel; 1] = [Panel::new("Main", [None; 8])];
    ///
    /// let model = ControlModel::new(
    ///     [Control::integer(0, "Volume", 0, 0, 127, 100)],
    ///     &PANELS,
    ///     "Panel",
    /// )
    /// .unwrap();
    /// assert_eq!(model.resolve(&Parameter::control_offset(0, -64)), Ok(36));
    /// assert_eq!(model.resolve(&Parameter::Constant(7)), Ok(7));
    /// ```
    pub fn resolve(&self, parameter: &Parameter) -> Result<i32, ControlError> {
        Ok(self.value_of(&self.bind(parameter)?))
    }

    // ── Encoder-driven updates ───────────────────────────────────────

    /// Apply an encoder delta to one control.
    ///
    /// Returns `true` if the visible value changed.
    pub fn apply_delta(&mut self, index: ControlIndex, delta: i32) -> bool {
        self.controls[index.0].kind.apply_delta(delta)
    }

    /// Apply one round of drained encoder deltas.
    ///
    /// Axes `0..8` edit the controls in the current panel's slots; deltas on
    /// empty slots are ignored. Axis 8 moves the panel selection, after the
    /// slot deltas have been applied to the panel that was shown when they
    /// were turned.
    ///
    /// Returns `true` if any control value or the current panel changed.
    pub fn apply_deltas(&mut self, deltas: &[i32; AXIS_COUNT]) -> bool {
        let slots = self.slots;
        let mut changed = false;

        for (_slot, (&index, &delta)) in slots.iter().zip(deltas.iter()).enumerate() {
            if delta == 0 {
                continue;
            }
            match index {
                Some(index) => changed |= self.apply_delta(index, delta),
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!(
                        "delta {} on empty slot: panel={}, slot={}",
                        delta,
                        self.current_panel,
                        _slot
                    );
                }
            }
        }

        changed |= self.select_panel_by(deltas[PANEL_SELECTOR_AXIS]);
        changed
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
