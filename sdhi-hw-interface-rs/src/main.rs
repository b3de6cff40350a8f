//! sdhi-hw-interface
//!
//! Drum-voice control surface firmware for the Raspberry Pi Pico 2. Wires the
//! library crates into the two execution contexts:
//!
//! 1. **Core 1 (real-time)**: samples the nine encoders on the GPIO
//!    expanders and moves one byte of MIDI per pass over UART1.
//! 2. **Core 0 (main)**: drains the encoder deltas into the control model,
//!    runs the action engine when a value changed and logs the active panel
//!    in place of the display bank.
//!
//! Before the main loop starts, every action is sent once so the sound
//! module matches the panel.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::pac;
use embassy_rp::peripherals::I2C0;
use embassy_rp::uart::{self, Blocking, Uart};
use embassy_time::{Delay, Duration, Instant};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use encoder_bus::{EncoderDeltas, EncoderPins, EncoderPoller, ExpanderBus, DEFAULT_ADDRESS};
use midi_transport::{SerialLink, Transport, TransportConfig, TransportDriver};
use sdhi::control_values::{
    Control, ControlId, ControlModel, DisplayValue, EnumOption, Panel, Parameter, AXIS_COUNT,
    SLOTS_PER_PANEL,
};
use sdhi_actions::tasks::{main_task, realtime_task};
use sdhi_actions::{Action, ActionEngine, ActionKind, DisplaySurface};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Instrument definition
// ---------------------------------------------------------------------------

const DRUM_TYPE: u16 = 0;
const DRUM_SOUND: u16 = 1;
const VOLUME: u16 = 2;
const ATTACK: u16 = 3;
const DECAY: u16 = 4;
const RELEASE: u16 = 5;
const LPF_CUTOFF: u16 = 6;
const LPF_RESONANCE: u16 = 7;
const HPF_CUTOFF: u16 = 8;
const REVERB: u16 = 9;
const CHORUS: u16 = 10;

const CONTROL_COUNT: usize = 11;
const ACTION_COUNT: usize = 11;

/// All actions address the kick on this channel.
const DRUM_CHANNEL: u8 = 0;
/// Inbound note that triggers the kick.
const KICK_NOTE: i32 = 36;

static KICK_TYPES: [EnumOption; 3] = [
    EnumOption::new("Kick", 36),
    EnumOption::new("Kick tight", 35),
    EnumOption::new("Kick soft", 33),
];

static DRUM_KITS: [EnumOption; 18] = [
    EnumOption::new("Standard", 0),
    EnumOption::new("Standard 2", 1),
    EnumOption::new("Dry", 2),
    EnumOption::new("Brilliant", 3),
    EnumOption::new("Room", 8),
    EnumOption::new("Dark room", 9),
    EnumOption::new("Rock", 16),
    EnumOption::new("Rock 2", 17),
    EnumOption::new("Electro", 24),
    EnumOption::new("Analog", 25),
    EnumOption::new("Analog 2", 26),
    EnumOption::new("Dance", 27),
    EnumOption::new("Hip Hop", 28),
    EnumOption::new("Jungle", 29),
    EnumOption::new("Jazz", 32),
    EnumOption::new("Jazz 2", 33),
    EnumOption::new("Brush", 40),
    EnumOption::new("Symphony", 48),
];

static PANELS: [Panel; 2] = [
    Panel::new(
        "Sound",
        [
            None,
            None,
            Some(ControlId(DRUM_SOUND)),
            Some(ControlId(ATTACK)),
            Some(ControlId(DECAY)),
            Some(ControlId(DRUM_TYPE)),
            Some(ControlId(RELEASE)),
            Some(ControlId(VOLUME)),
        ],
    ),
    Panel::new(
        "Filter",
        [
            Some(ControlId(LPF_CUTOFF)),
            Some(ControlId(LPF_RESONANCE)),
            Some(ControlId(HPF_CUTOFF)),
            Some(ControlId(REVERB)),
            Some(ControlId(CHORUS)),
            None,
            None,
            None,
        ],
    ),
];

/// Relative drum parameters are centred on 64.
fn instrument_controls() -> [Control; CONTROL_COUNT] {
    [
        Control::enumeration(DRUM_TYPE, "Type", 0, &KICK_TYPES, 0),
        Control::enumeration(DRUM_SOUND, "Variation", 0, &DRUM_KITS, 0),
        Control::integer(VOLUME, "Volume", 1, 0, 127, 100),
        Control::integer(ATTACK, "Attack", 2, 0, 127, 64),
        Control::integer(DECAY, "Decay", 2, 0, 127, 64),
        Control::integer(RELEASE, "Release", 2, 0, 127, 64),
        Control::integer(LPF_CUTOFF, "LPF Cutoff", 3, 0, 127, 64),
        Control::integer(LPF_RESONANCE, "LPF Resonance", 3, 0, 127, 64),
        Control::integer(HPF_CUTOFF, "HPF Cutoff", 4, 0, 127, 64),
        Control::integer(REVERB, "Reverb", 5, 0, 127, 40),
        Control::integer(CHORUS, "Chorus", 5, 0, 127, 0),
    ]
}

/// XG drum-instrument NRPN. The LSB is the drum's note, which follows the
/// selected kick type.
fn drum_nrpn(msb: i32, control: u16) -> Action {
    Action::new(
        DRUM_CHANNEL,
        ActionKind::Nrpn {
            msb: Parameter::Constant(msb),
            lsb: Parameter::control(DRUM_TYPE),
            value: Parameter::control(control),
        },
    )
}

fn controller(number: i32, control: u16) -> Action {
    Action::new(
        DRUM_CHANNEL,
        ActionKind::Controller {
            number: Parameter::Constant(number),
            value: Parameter::control(control),
        },
    )
}

/// XG multi-part parameter change for the drum part.
fn part_parameter(parameter: i32, control: u16) -> Action {
    Action::new(
        DRUM_CHANNEL,
        ActionKind::XgParameterChange {
            parameter: Parameter::Constant(parameter),
            value: Parameter::control(control),
        },
    )
}

fn instrument_actions() -> [Action; ACTION_COUNT] {
    [
        Action::new(
            DRUM_CHANNEL,
            ActionKind::NoteMapping {
                note: Parameter::Constant(KICK_NOTE),
                value: Parameter::control(DRUM_TYPE),
            },
        ),
        Action::new(
            DRUM_CHANNEL,
            ActionKind::BankChange {
                program: Parameter::control(DRUM_SOUND),
            },
        ),
        controller(7, VOLUME),
        drum_nrpn(0x16, ATTACK),
        drum_nrpn(0x17, DECAY),
        controller(72, RELEASE),
        drum_nrpn(0x14, LPF_CUTOFF),
        drum_nrpn(0x15, LPF_RESONANCE),
        drum_nrpn(0x24, HPF_CUTOFF),
        part_parameter(0x13, REVERB),
        part_parameter(0x12, CHORUS),
    ]
}

// ---------------------------------------------------------------------------
// Encoder wiring
// ---------------------------------------------------------------------------

const EXPANDERS: [u8; 2] = [DEFAULT_ADDRESS, DEFAULT_ADDRESS + 1];

const fn pair(expander: usize, a_bit: u8) -> EncoderPins {
    EncoderPins {
        expander,
        a_bit,
        b_bit: a_bit + 1,
    }
}

/// Slot encoders fill the second expander; the panel selector sits on
/// port 1, bits 3 and 4 of the first.
const WIRING: [EncoderPins; AXIS_COUNT] = [
    pair(1, 0),
    pair(1, 2),
    pair(1, 4),
    pair(1, 6),
    pair(1, 8),
    pair(1, 10),
    pair(1, 12),
    pair(1, 14),
    pair(0, 11),
];

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Encoder ticks, written on core 1 and drained on core 0.
static DELTAS: EncoderDeltas<AXIS_COUNT> = EncoderDeltas::new();

/// MIDI queues and note mapping shared by both cores.
static MIDI: Transport = Transport::new(TransportConfig::DEFAULT);

static CORE1_STACK: StaticCell<Stack<4096>> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type EncoderI2c = I2c<'static, I2C0, i2c::Async>;
type Encoders = ExpanderBus<EncoderI2c, 2, AXIS_COUNT>;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// MIDI port on UART1, polled through the status flags so no call blocks.
struct MidiUart {
    _uart: Uart<'static, Blocking>,
}

impl SerialLink for MidiUart {
    fn byte_available(&mut self) -> bool {
        !pac::UART1.uartfr().read().rxfe()
    }

    fn read_byte(&mut self) -> u8 {
        pac::UART1.uartdr().read().data()
    }

    fn writable(&mut self) -> bool {
        !pac::UART1.uartfr().read().txff()
    }

    fn write_byte(&mut self, byte: u8) {
        pac::UART1.uartdr().write(|w| w.set_data(byte));
    }
}

type Frame = (usize, [Option<DisplayValue>; SLOTS_PER_PANEL]);

/// Logs the active panel over defmt whenever what it shows changes.
struct LogDisplay {
    period: Duration,
    next_frame: Instant,
    last: Option<Frame>,
}

impl LogDisplay {
    fn new(period: Duration) -> Self {
        Self {
            period,
            next_frame: Instant::now(),
            last: None,
        }
    }
}

impl DisplaySurface<CONTROL_COUNT> for LogDisplay {
    fn transfer_complete(&mut self) -> bool {
        Instant::now() >= self.next_frame
    }

    fn render(&mut self, model: &ControlModel<CONTROL_COUNT>) {
        self.next_frame = Instant::now() + self.period;

        let controls = model.panel_controls();
        let frame = (
            model.current_panel(),
            controls.map(|control| control.map(|c| c.kind.display())),
        );
        if self.last == Some(frame) {
            return;
        }

        info!("[{}] ({})", model.panel().title, model.panel_selector_title());
        for control in controls.iter().flatten() {
            info!("  {}: {}", control.title, control.kind.display());
        }
        self.last = Some(frame);
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Concrete wrapper around the generic real-time loop.
#[embassy_executor::task]
async fn realtime(
    mut poller: EncoderPoller<'static, Encoders, AXIS_COUNT>,
    mut driver: TransportDriver<'static, MidiUart>,
) {
    realtime_task(&mut poller, &mut driver).await
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("sdhi-hw-interface starting");

    // -- Pin assignments -------------------------------------------------------
    // I2C_SDA   → GP4  (p.PIN_4)   GPIO expanders, 400 kHz
    // I2C_SCL   → GP5  (p.PIN_5)
    // MIDI_TX   → GP8  (p.PIN_8)   UART1, 31250 baud 8N1
    // MIDI_RX   → GP9  (p.PIN_9)
    // --------------------------------------------------------------------------

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = 31_250;
    let uart = Uart::new_blocking(p.UART1, p.PIN_8, p.PIN_9, uart_config);
    let driver = TransportDriver::new(&MIDI, MidiUart { _uart: uart });

    // The expander bus is created on core 1 so its interrupt is serviced
    // there.
    let (i2c0, scl, sda) = (p.I2C0, p.PIN_5, p.PIN_4);
    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let mut i2c_config = i2c::Config::default();
        i2c_config.frequency = 400_000;
        let i2c = I2c::new_async(i2c0, scl, sda, Irqs, i2c_config);

        let encoders = unwrap!(ExpanderBus::new(i2c, EXPANDERS, WIRING));
        let poller = EncoderPoller::new(encoders, &DELTAS);

        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| spawner.spawn(unwrap!(realtime(poller, driver))));
    });

    // -- Main context ----------------------------------------------------------

    let mut model = unwrap!(ControlModel::new(
        instrument_controls(),
        &PANELS,
        "Change panel"
    ));
    let mut engine = unwrap!(ActionEngine::new(instrument_actions(), &model));

    // Blocks until every action has been admitted once.
    engine.init(&model, &MIDI, &mut Delay).await;

    let mut display = LogDisplay::new(Duration::from_millis(250));
    main_task(&mut model, &mut engine, &DELTAS, &MIDI, &mut display).await
}
