//! The two execution-context loops.
//!
//! - **Real-time context**: samples the encoders, then moves one byte of
//!   MIDI. Never blocks on anything but the encoder bus.
//! - **Main context**: refreshes the display when it is idle, applies the
//!   drained encoder deltas to the model and runs one engine cycle when
//!   something changed or a stalled cycle left actions unsent.
//!
//! [`main_iteration`] and [`realtime_iteration`] are the loop bodies. The
//! endless [`main_task`] and [`realtime_task`] wrappers need the `task`
//! feature. They are plain `async fn`s, not Embassy tasks; firmware wraps
//! them in a concrete `#[embassy_executor::task]`:
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn realtime(
//!     mut poller: EncoderPoller<'static, MyBus, AXIS_COUNT>,
//!     mut driver: TransportDriver<'static, MyUart>,
//! ) {
//!     realtime_task(&mut poller, &mut driver).await
//! }
//! ```

use encoder_bus::{EncoderDeltas, EncoderPoller, QuadratureSampler};
use midi_transport::{SerialLink, TransportDriver, TransportState};
use sdhi::control_values::{ControlModel, AXIS_COUNT};

use crate::engine::{ActionEngine, CycleReport};
use crate::sink::MessageSink;

/// A display bank that renders the model asynchronously.
pub trait DisplaySurface<const C: usize> {
    /// The previous frame has been fully transferred.
    fn transfer_complete(&mut self) -> bool;

    /// Start rendering the current model state.
    fn render(&mut self, model: &ControlModel<C>);
}

/// One pass of the main loop.
///
/// Runs an engine cycle when the model changed, and keeps running one on
/// every pass while actions from a stalled cycle are still unsent. Returns
/// the engine's report if a cycle ran.
pub fn main_iteration<const C: usize, const A: usize, S, D>(
    model: &mut ControlModel<C>,
    engine: &mut ActionEngine<A>,
    deltas: &EncoderDeltas<AXIS_COUNT>,
    sink: &S,
    display: &mut D,
) -> Option<CycleReport>
where
    S: MessageSink,
    D: DisplaySurface<C>,
{
    if display.transfer_complete() {
        display.render(model);
    }

    let changed = deltas
        .drain()
        .is_some_and(|drained| model.apply_deltas(&drained));
    if !changed && engine.pending() == 0 {
        return None;
    }

    let report = engine.update(model, sink);
    #[cfg(feature = "defmt")]
    if report.stalled {
        defmt::debug!("cycle stalled after {} actions", report.dispatched);
    }
    Some(report)
}

/// One pass of the real-time loop.
///
/// A failed encoder sample is logged and skipped; the transport still
/// steps.
pub async fn realtime_iteration<S, L, const N: usize>(
    poller: &mut EncoderPoller<'_, S, N>,
    driver: &mut TransportDriver<'_, L>,
) -> TransportState
where
    S: QuadratureSampler<N>,
    L: SerialLink,
{
    if poller.poll().await.is_err() {
        #[cfg(feature = "defmt")]
        defmt::warn!("encoder sample failed");
    }
    driver.step()
}

/// Main context loop. Never returns.
#[cfg(feature = "task")]
pub async fn main_task<const C: usize, const A: usize, S, D>(
    model: &mut ControlModel<C>,
    engine: &mut ActionEngine<A>,
    deltas: &EncoderDeltas<AXIS_COUNT>,
    sink: &S,
    display: &mut D,
) -> !
where
    S: MessageSink,
    D: DisplaySurface<C>,
{
    loop {
        main_iteration(model, engine, deltas, sink, display);
        embassy_futures::yield_now().await;
    }
}

/// Real-time context loop. Never returns.
#[cfg(feature = "task")]
pub async fn realtime_task<S, L, const N: usize>(
    poller: &mut EncoderPoller<'_, S, N>,
    driver: &mut TransportDriver<'_, L>,
) -> !
where
    S: QuadratureSampler<N>,
    L: SerialLink,
{
    loop {
        realtime_iteration(poller, driver).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use encoder_bus::QuadraturePins;
    use midi_transport::{Message, Transport, TransportConfig};
    use sdhi::control_values::{Control, ControlId, Panel, Parameter};

    use crate::action::{Action, ActionKind};

    static PANELS: [Panel; 1] = [Panel::new(
        "Sound",
        [Some(ControlId(0)), None, None, None, None, None, None, None],
    )];

    fn fixture() -> (ControlModel<1>, ActionEngine<1>) {
        let model = ControlModel::new(
            [Control::integer(0, "Volume", 0, 0, 127, 100)],
            &PANELS,
            "Change panel",
        )
        .unwrap();
        let volume = Action::new(
            0,
            ActionKind::Controller {
                number: Parameter::Constant(7),
                value: Parameter::control(0),
            },
        );
        let mut engine = ActionEngine::new([volume], &model).unwrap();
        engine.update(&model, &Transport::new(TransportConfig::DEFAULT));
        (model, engine)
    }

    #[derive(Default)]
    struct CountingDisplay {
        busy: bool,
        renders: usize,
    }

    impl<const C: usize> DisplaySurface<C> for CountingDisplay {
        fn transfer_complete(&mut self) -> bool {
            !self.busy
        }

        fn render(&mut self, _model: &ControlModel<C>) {
            self.renders += 1;
        }
    }

    // ── Main context ─────────────────────────────────────────────────

    #[test]
    fn idle_iteration_only_renders() {
        let (mut model, mut engine) = fixture();
        let deltas = EncoderDeltas::new();
        let transport = Transport::new(TransportConfig::DEFAULT);
        let mut display = CountingDisplay::default();

        let report = main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display);

        assert_eq!(report, None);
        assert_eq!(display.renders, 1);
        assert_eq!(transport.pending(), 0);
    }

    #[test]
    fn busy_display_is_skipped() {
        let (mut model, mut engine) = fixture();
        let deltas = EncoderDeltas::new();
        let transport = Transport::new(TransportConfig::DEFAULT);
        let mut display = CountingDisplay { busy: true, ..Default::default() };

        main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display);
        assert_eq!(display.renders, 0);
    }

    #[test]
    fn deltas_drive_an_engine_cycle() {
        let (mut model, mut engine) = fixture();
        let deltas = EncoderDeltas::new();
        let transport = Transport::new(TransportConfig::DEFAULT);
        let mut display = CountingDisplay::default();

        deltas.accumulate(&[-4, 0, 0, 0, 0, 0, 0, 0, 0]);
        let report = main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display);

        assert_eq!(report.map(|r| r.dispatched), Some(1));
        assert_eq!(transport.pending(), 1);
        assert_eq!(deltas.drain(), None);
    }

    #[test]
    fn delta_without_effect_skips_the_cycle() {
        let (mut model, mut engine) = fixture();
        let deltas = EncoderDeltas::new();
        let transport = Transport::new(TransportConfig::DEFAULT);
        let mut display = CountingDisplay::default();

        // Empty slot, and the only panel cannot change.
        deltas.accumulate(&[0, 5, 0, 0, 0, 0, 0, 0, 1]);
        let report = main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display);

        assert_eq!(report, None);
        assert_eq!(engine.pending(), 0);
    }

    #[test]
    fn stalled_actions_are_retried_without_new_deltas() {
        static PANELS: [Panel; 1] = [Panel::new("Mix", [None; 8])];
        let controls: [Control; 10] =
            core::array::from_fn(|i| Control::integer(i as u16, "Level", 0, 0, 127, 64));
        let mut model = ControlModel::new(controls, &PANELS, "Change panel").unwrap();
        let actions: [Action; 10] = core::array::from_fn(|i| {
            Action::new(
                0,
                ActionKind::Controller {
                    number: Parameter::Constant(20 + i as i32),
                    value: Parameter::control(i as u16),
                },
            )
        });
        let mut engine = ActionEngine::new(actions, &model).unwrap();
        let deltas = EncoderDeltas::new();
        let transport = Transport::new(TransportConfig::DEFAULT);
        let mut display = CountingDisplay { busy: true, ..Default::default() };
        let mut driver = TransportDriver::new(&transport, SinkLink { written: 0 });

        const FILLER: Message = Message::ProgramChange { channel: 0, number: 0 };
        transport.send_many(&[FILLER; 14]);
        let report = main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display);
        assert_eq!(report, Some(CycleReport { dispatched: 2, stalled: true }));
        assert_eq!(engine.pending(), 8);

        for _ in 0..200 {
            driver.step();
        }
        assert_eq!(transport.pending(), 0);

        let report = main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display);
        assert_eq!(report, Some(CycleReport { dispatched: 8, stalled: false }));
        assert_eq!(engine.pending(), 0);
        assert_eq!(
            main_iteration(&mut model, &mut engine, &deltas, &transport, &mut display),
            None
        );
    }

    // ── Real-time context ────────────────────────────────────────────

    struct FailingSampler;

    impl QuadratureSampler<1> for FailingSampler {
        type Error = ();

        async fn sample(&mut self) -> Result<[QuadraturePins; 1], ()> {
            Err(())
        }
    }

    struct SinkLink {
        written: usize,
    }

    impl SerialLink for SinkLink {
        fn byte_available(&mut self) -> bool {
            false
        }

        fn read_byte(&mut self) -> u8 {
            0
        }

        fn writable(&mut self) -> bool {
            true
        }

        fn write_byte(&mut self, _byte: u8) {
            self.written += 1;
        }
    }

    #[test]
    fn sample_failure_does_not_stop_the_transport() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        let transport = Transport::new(TransportConfig::DEFAULT);
        let mut poller = EncoderPoller::new(FailingSampler, &deltas);
        let mut driver = TransportDriver::new(&transport, SinkLink { written: 0 });
        transport.send_many(&[Message::ProgramChange { channel: 0, number: 1 }]);

        let mut states = [TransportState::Idle; 4];
        for state in states.iter_mut() {
            *state = block_on(realtime_iteration(&mut poller, &mut driver));
        }

        assert_eq!(
            states,
            [
                TransportState::Transmitting,
                TransportState::Transmitting,
                TransportState::Transmitting,
                TransportState::Idle,
            ]
        );
        assert_eq!(driver.link().written, 2);
    }
}
