//! Change-driven, budget-aware dispatch of actions.
//!
//! Every cycle recomputes what each action would send from the current
//! control values, then walks the action list round-robin from a persistent
//! cursor. An action is dispatched only if its values differ from what it
//! last sent, and only if the sink has room for all of its messages at
//! once. The first action that does not fit stops the scan and is retried
//! first on the next cycle, so no action can starve the others.

use embedded_hal_async::delay::DelayNs;
use sdhi::control_values::{ControlModel, Operand};

use crate::action::{Action, Effect, Values};
use crate::error::ActionError;
use crate::sink::MessageSink;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Pause between admission attempts during [`ActionEngine::init`].
    pub init_retry_ms: u32,
}

impl EngineConfig {
    pub const DEFAULT: Self = Self { init_retry_ms: 10 };
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What one [`ActionEngine::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Actions dispatched this cycle.
    pub dispatched: usize,
    /// The scan stopped on an action the sink had no room for.
    pub stalled: bool,
}

/// Last computed and last sent values of one action.
#[derive(Debug, Clone, Copy, Default)]
struct ActionValue {
    computed: Values,
    /// `None` until the first dispatch.
    sent: Option<Values>,
}

impl ActionValue {
    fn pending(&self) -> bool {
        self.sent != Some(self.computed)
    }
}

/// Dispatches `A` actions against a [`ControlModel`].
///
/// # Example
///
/// ```
/// use midi_transport::{Transport, TransportConfig};
/// use sdhi::control_values::{Control, ControlModel, Panel, Parameter};
/// use sdhi_actions::{Action, ActionEngine, ActionKind};
///
/// static PANELS: [Panel; 1] = [Panel::new("Main", [None; 8])];
/// static MIDI: Transport = Transport::new(TransportConfig::DEFAULT);
///
/// let model = ControlModel::new(
///     [Control::integer(0, "Volume", 0, 0, 127, 100)],
///     &PANELS,
///     "Panel",
/// )
/// .unwrap();
/// let volume = Action::new(0, ActionKind::Controller {
///     number: Parameter::Constant(7),
///     value: Parameter::control(0),
/// });
///
/// let mut engine = ActionEngine::new([volume], &model).unwrap();
/// assert_eq!(engine.update(&model, &MIDI).dispatched, 1);
/// // Nothing changed, nothing is sent again.
/// assert_eq!(engine.update(&model, &MIDI).dispatched, 0);
/// ```
pub struct ActionEngine<const A: usize> {
    config: EngineConfig,
    actions: [Action; A],
    operands: [[Operand; 3]; A],
    values: [ActionValue; A],
    cursor: usize,
}

impl<const A: usize> ActionEngine<A> {
    /// Bind every action parameter against `model`.
    ///
    /// # Errors
    /// * [`ActionError::Control`] if a parameter names a control the model
    ///   does not have.
    pub fn new<const C: usize>(
        actions: [Action; A],
        model: &ControlModel<C>,
    ) -> Result<Self, ActionError> {
        let mut operands = [[Operand::Constant(0); 3]; A];
        for (action, bound) in actions.iter().zip(operands.iter_mut()) {
            for (parameter, operand) in action.parameters().iter().zip(bound.iter_mut()) {
                *operand = model.bind(parameter)?;
            }
        }

        Ok(Self {
            config: EngineConfig::DEFAULT,
            actions,
            operands,
            values: [ActionValue::default(); A],
            cursor: 0,
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn actions(&self) -> &[Action; A] {
        &self.actions
    }

    /// Index of the action the next scan starts at.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Actions whose computed values have not been sent yet.
    pub fn pending(&self) -> usize {
        self.values.iter().filter(|value| value.pending()).count()
    }

    /// Run one dispatch cycle.
    ///
    /// Visits each action at most once, starting at the cursor. Stops early
    /// when the sink cannot take an action's messages; the cursor then stays
    /// on that action.
    pub fn update<const C: usize, S>(&mut self, model: &ControlModel<C>, sink: &S) -> CycleReport
    where
        S: MessageSink,
    {
        self.recompute(model);

        let mut report = CycleReport::default();
        for _ in 0..A {
            let index = self.cursor;
            if self.values[index].pending() {
                if !self.execute(index, sink) {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("dispatch stalled at action {}", index);
                    report.stalled = true;
                    break;
                }
                report.dispatched += 1;
            }
            self.cursor = (index + 1) % A;
        }
        report
    }

    /// Send every action once, in order, waiting for room as needed.
    ///
    /// Ignores what was sent before, so the receiving device ends up in
    /// sync with the model. Meant to run once at startup, before the first
    /// [`update`](Self::update).
    pub async fn init<const C: usize, S, D>(
        &mut self,
        model: &ControlModel<C>,
        sink: &S,
        delay: &mut D,
    ) where
        S: MessageSink,
        D: DelayNs,
    {
        self.cursor = 0;
        self.recompute(model);

        for index in 0..A {
            while !self.execute(index, sink) {
                #[cfg(feature = "defmt")]
                defmt::trace!("init: action {} waiting for queue space", index);
                delay.delay_ms(self.config.init_retry_ms).await;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("{} actions sent", A);
    }

    fn recompute<const C: usize>(&mut self, model: &ControlModel<C>) {
        for (value, operands) in self.values.iter_mut().zip(&self.operands) {
            value.computed = operands.map(|operand| model.value_of(&operand));
        }
    }

    /// Try to dispatch one action. Returns `false` if the sink had no room.
    fn execute<S: MessageSink>(&mut self, index: usize, sink: &S) -> bool {
        let value = &mut self.values[index];
        let effect = self.actions[index].effect(&value.computed);

        if effect.needed() > sink.can_send() {
            return false;
        }

        match effect {
            Effect::Send(messages) => sink.send_many(&messages),
            Effect::MapNote { note, target } => sink.set_mapped_note(note, target),
        }
        value.sent = Some(value.computed);
        true
    }
}
