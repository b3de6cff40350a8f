use super::error::ControlError;

/// Encoder ticks the enumeration accumulator must gather before the
/// selection moves by one option.
pub const ENUM_STEP_TICKS: i32 = 3;

/// Unique key of a [`Control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlId(pub u16);

/// One selectable option of an enumeration control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnumOption {
    /// Text shown on the display.
    pub label: &'static str,
    /// Value the option resolves to when referenced by an action.
    pub value: i32,
}

impl EnumOption {
    pub const fn new(label: &'static str, value: i32) -> Self {
        Self { label, value }
    }
}

/// Typed value of a control together with its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueKind {
    /// Linear integer, clamped to `[min, max]`.
    Integer { min: i32, max: i32, current: i32 },
    /// Real number stored as a count of `step` units. `min`, `max` and
    /// `current` are all in steps; the displayed value is `current * step`.
    Real {
        min: i32,
        max: i32,
        step: f32,
        current: i32,
    },
    /// Choice among static options, moved with hysteresis.
    Enumeration {
        options: &'static [EnumOption],
        selected: usize,
        /// Ticks gathered toward the next option, always within
        /// `(-ENUM_STEP_TICKS, ENUM_STEP_TICKS)` between updates.
        accumulator: i8,
    },
}

/// A control value prepared for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayValue {
    Integer(i32),
    Real(f32),
    Label(&'static str),
}

impl ValueKind {
    /// Apply an encoder delta.
    ///
    /// Integer and real values move linearly and saturate at their bounds.
    /// Enumerations add the delta to the accumulator and only move the
    /// selection once [`ENUM_STEP_TICKS`] have been gathered in one
    /// direction. At either end of the option list the accumulator is
    /// pinned to zero so that turning past the end does not build up
    /// ticks that would have to be unwound first.
    ///
    /// Returns `true` if the visible value changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdhi::control_values::ValueKind;
    ///
    /// let mut volume = ValueKind::Integer { min: 0, max: 127, current: 100 };
    /// volume.apply_delta(50);
    /// assert_eq!(volume, ValueKind::Integer { min: 0, max: 127, current: 127 });
    /// ```
    pub fn apply_delta(&mut self, delta: i32) -> bool {
        match self {
            ValueKind::Integer { min, max, current } | ValueKind::Real { min, max, current, .. } => {
                let before = *current;
                *current = current.saturating_add(delta).clamp(*min, *max);
                *current != before
            }
            ValueKind::Enumeration {
                options,
                selected,
                accumulator,
            } => {
                let last = options.len().saturating_sub(1);
                let before = *selected;

                let mut ticks = i32::from(*accumulator)
                    .saturating_add(delta)
                    .clamp(i32::from(i8::MIN), i32::from(i8::MAX));
                if (*selected == 0 && ticks < 0) || (*selected == last && ticks > 0) {
                    ticks = 0;
                }

                if ticks >= ENUM_STEP_TICKS {
                    *selected = (*selected + 1).min(last);
                    ticks = 0;
                } else if ticks <= -ENUM_STEP_TICKS {
                    *selected = selected.saturating_sub(1);
                    ticks = 0;
                }
                // Clamped to the i8 range above.
                *accumulator = ticks as i8;

                *selected != before
            }
        }
    }

    /// The value an action sees before its offset is added.
    ///
    /// Integers and reals resolve to their stored count (reals are not
    /// rescaled); enumerations resolve to the selected option's value.
    pub fn wire_value(&self) -> i32 {
        match *self {
            ValueKind::Integer { current, .. } | ValueKind::Real { current, .. } => current,
            ValueKind::Enumeration {
                options, selected, ..
            } => options.get(selected).map_or(0, |option| option.value),
        }
    }

    pub fn display(&self) -> DisplayValue {
        match *self {
            ValueKind::Integer { current, .. } => DisplayValue::Integer(current),
            ValueKind::Real { step, current, .. } => DisplayValue::Real(current as f32 * step),
            ValueKind::Enumeration {
                options, selected, ..
            } => DisplayValue::Label(options.get(selected).map_or("", |option| option.label)),
        }
    }

    /// Position of the value within its range, `0.0..=1.0`, for bar gauges.
    pub fn fraction(&self) -> f32 {
        let (position, span) = match *self {
            ValueKind::Integer { min, max, current } | ValueKind::Real { min, max, current, .. } => (
                i64::from(current) - i64::from(min),
                i64::from(max) - i64::from(min),
            ),
            ValueKind::Enumeration {
                options, selected, ..
            } => (selected as i64, options.len() as i64 - 1),
        };
        if span <= 0 {
            return 0.0;
        }
        position as f32 / span as f32
    }

    /// Check the bounds and the initial value.
    pub(crate) fn validate(&self, id: ControlId) -> Result<(), ControlError> {
        match *self {
            ValueKind::Integer { min, max, current } => {
                if min > max || !(min..=max).contains(&current) {
                    return Err(ControlError::InvalidRange(id));
                }
            }
            ValueKind::Real {
                min,
                max,
                step,
                current,
            } => {
                if !(step > 0.0) || min > max || !(min..=max).contains(&current) {
                    return Err(ControlError::InvalidRange(id));
                }
            }
            ValueKind::Enumeration {
                options, selected, ..
            } => {
                if options.is_empty() {
                    return Err(ControlError::NoOptions(id));
                }
                if selected >= options.len() {
                    return Err(ControlError::InvalidRange(id));
                }
            }
        }
        Ok(())
    }
}

/// A user-adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control {
    pub id: ControlId,
    /// Display title.
    pub title: &'static str,
    /// Adjacent controls sharing a group are framed together on the display.
    pub group: u16,
    pub kind: ValueKind,
}

impl Control {
    /// Integer control in `[min, max]` starting at `initial`.
    pub const fn integer(id: u16, title: &'static str, group: u16, min: i32, max: i32, initial: i32) -> Self {
        Self {
            id: ControlId(id),
            title,
            group,
            kind: ValueKind::Integer {
                min,
                max,
                current: initial,
            },
        }
    }

    /// Real control in `[min, max]` moving by `step` per tick.
    ///
    /// Bounds and initial value are converted to whole steps, truncating
    /// toward zero.
    pub fn real(id: u16, title: &'static str, group: u16, min: f32, max: f32, step: f32, initial: f32) -> Self {
        Self {
            id: ControlId(id),
            title,
            group,
            kind: ValueKind::Real {
                min: (min / step) as i32,
                max: (max / step) as i32,
                step,
                current: (initial / step) as i32,
            },
        }
    }

    /// Enumeration control starting at option `initial`.
    pub const fn enumeration(
        id: u16,
        title: &'static str,
        group: u16,
        options: &'static [EnumOption],
        initial: usize,
    ) -> Self {
        Self {
            id: ControlId(id),
            title,
            group,
            kind: ValueKind::Enumeration {
                options,
                selected: initial,
                accumulator: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static KITS: [EnumOption; 3] = [
        EnumOption::new("Kick", 36),
        EnumOption::new("Kick tight", 35),
        EnumOption::new("Kick soft", 33),
    ];

    fn kit(selected: usize) -> ValueKind {
        ValueKind::Enumeration {
            options: &KITS,
            selected,
            accumulator: 0,
        }
    }

    fn selected(kind: &ValueKind) -> (usize, i8) {
        match *kind {
            ValueKind::Enumeration {
                selected,
                accumulator,
                ..
            } => (selected, accumulator),
            _ => panic!("not an enumeration"),
        }
    }

    fn current(kind: &ValueKind) -> i32 {
        match *kind {
            ValueKind::Integer { current, .. } | ValueKind::Real { current, .. } => current,
            _ => panic!("not linear"),
        }
    }

    // ── Integer ──────────────────────────────────────────────────────

    #[test]
    fn integer_clamps_at_max() {
        let mut kind = ValueKind::Integer { min: 0, max: 127, current: 100 };
        assert!(kind.apply_delta(50));
        assert_eq!(current(&kind), 127);
    }

    #[test]
    fn integer_clamps_at_min() {
        let mut kind = ValueKind::Integer { min: 0, max: 127, current: 127 };
        assert!(kind.apply_delta(-200));
        assert_eq!(current(&kind), 0);
    }

    #[test]
    fn integer_does_not_wrap_on_overflow() {
        let mut kind = ValueKind::Integer { min: -10, max: 10, current: 10 };
        assert!(!kind.apply_delta(i32::MAX));
        assert_eq!(current(&kind), 10);

        kind.apply_delta(i32::MIN);
        assert_eq!(current(&kind), -10);
    }

    #[test]
    fn integer_stays_in_range_for_any_sequence() {
        let mut kind = ValueKind::Integer { min: 5, max: 20, current: 12 };
        for delta in [7, 7, 7, -30, 1, -1, 100, -3, 0, -100, 9] {
            kind.apply_delta(delta);
            assert!((5..=20).contains(&current(&kind)));
        }
    }

    // ── Real ─────────────────────────────────────────────────────────

    #[test]
    fn real_constructor_scales_bounds_to_steps() {
        let control = Control::real(1, "Cutoff", 0, 0.0, 2.0, 0.25, 1.0);
        assert_eq!(
            control.kind,
            ValueKind::Real { min: 0, max: 8, step: 0.25, current: 4 }
        );
    }

    #[test]
    fn real_moves_in_steps_and_displays_scaled() {
        let mut kind = Control::real(1, "Cutoff", 0, 0.0, 2.0, 0.25, 1.0).kind;
        kind.apply_delta(3);
        assert_eq!(kind.wire_value(), 7);
        assert_eq!(kind.display(), DisplayValue::Real(1.75));

        kind.apply_delta(10);
        assert_eq!(kind.wire_value(), 8);
    }

    // ── Enumeration ──────────────────────────────────────────────────

    #[test]
    fn enumeration_advances_once_per_three_ticks() {
        let mut kind = kit(0);
        assert!(!kind.apply_delta(1));
        assert!(!kind.apply_delta(1));
        assert!(kind.apply_delta(1));
        assert_eq!(selected(&kind), (1, 0));
    }

    #[test]
    fn enumeration_rapid_ticks_advance_floor_of_a_third() {
        let mut kind = kit(0);
        for _ in 0..5 {
            kind.apply_delta(1);
        }
        // floor(5 / 3) = 1, two ticks carried.
        assert_eq!(selected(&kind), (1, 2));
    }

    #[test]
    fn enumeration_zero_sum_jitter_never_moves() {
        let mut kind = kit(1);
        for delta in [1, -1, 1, -1, 2, -2, -1, 1] {
            assert!(!kind.apply_delta(delta));
        }
        assert_eq!(selected(&kind), (1, 0));
    }

    #[test]
    fn enumeration_pins_accumulator_at_first_option() {
        let mut kind = kit(0);
        for _ in 0..3 {
            kind.apply_delta(-1);
            assert_eq!(selected(&kind), (0, 0));
        }
    }

    #[test]
    fn enumeration_pins_accumulator_at_last_option() {
        let mut kind = kit(2);
        for _ in 0..10 {
            kind.apply_delta(1);
        }
        assert_eq!(selected(&kind), (2, 0));

        // Turning back responds immediately, nothing to unwind.
        kind.apply_delta(-1);
        kind.apply_delta(-1);
        assert!(kind.apply_delta(-1));
        assert_eq!(selected(&kind), (1, 0));
    }

    #[test]
    fn enumeration_large_delta_moves_one_option() {
        let mut kind = kit(0);
        assert!(kind.apply_delta(9));
        assert_eq!(selected(&kind), (1, 0));
    }

    #[test]
    fn enumeration_resolves_and_displays_selected_option() {
        let kind = kit(1);
        assert_eq!(kind.wire_value(), 35);
        assert_eq!(kind.display(), DisplayValue::Label("Kick tight"));
    }

    // ── Fraction and validation ──────────────────────────────────────

    #[test]
    fn fraction_spans_range() {
        let kind = ValueKind::Integer { min: -64, max: 64, current: 0 };
        assert_eq!(kind.fraction(), 0.5);
        assert_eq!(kit(2).fraction(), 1.0);

        let single = ValueKind::Integer { min: 3, max: 3, current: 3 };
        assert_eq!(single.fraction(), 0.0);
    }

    #[test]
    fn fraction_of_full_i32_range() {
        let top = ValueKind::Integer { min: i32::MIN, max: i32::MAX, current: i32::MAX };
        assert_eq!(top.validate(ControlId(0)), Ok(()));
        assert_eq!(top.fraction(), 1.0);

        let bottom = ValueKind::Integer { min: i32::MIN, max: i32::MAX, current: i32::MIN };
        assert_eq!(bottom.fraction(), 0.0);
    }

    #[test]
    fn validate_rejects_bad_configuration() {
        let id = ControlId(7);
        let inverted = ValueKind::Integer { min: 10, max: 0, current: 5 };
        assert_eq!(inverted.validate(id), Err(ControlError::InvalidRange(id)));

        let outside = ValueKind::Integer { min: 0, max: 10, current: 11 };
        assert_eq!(outside.validate(id), Err(ControlError::InvalidRange(id)));

        let zero_step = ValueKind::Real { min: 0, max: 1, step: 0.0, current: 0 };
        assert_eq!(zero_step.validate(id), Err(ControlError::InvalidRange(id)));

        let empty = ValueKind::Enumeration { options: &[], selected: 0, accumulator: 0 };
        assert_eq!(empty.validate(id), Err(ControlError::NoOptions(id)));

        assert_eq!(kit(3).validate(id), Err(ControlError::InvalidRange(id)));
        assert_eq!(kit(2).validate(id), Ok(()));
    }
}
