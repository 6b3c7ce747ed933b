//! The control loop.
//!
//! Interrupt handlers only post to [`Signals`]. Everything else, including
//! capturing pulses, runs from [`ControlLoop::step`] in the main context.

use crate::capture::{CaptureCounter, EdgeLatch, PulseCapture, PulseSample};
use crate::config;
use crate::display::{self, Screen};
use crate::emulator::{self, ReloadRegister};
use crate::shared::{ByteCell, ModeCell};
use crate::speed::{Reading, SpeedSetting};
use crate::time_base::TimeBase;
use crate::wizard;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use embedded_hal::serial;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    Idle = 0,
    Measuring = 1,
    Configuring = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Start,
    Stop,
    Configure,
}

impl Command {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            config::command::START => Some(Command::Start),
            config::command::STOP => Some(Command::Stop),
            config::command::CONFIGURE => Some(Command::Configure),
            _ => None,
        }
    }
}

/// State written by interrupt handlers.
pub struct Signals {
    /// Latest command byte, posted by the serial receive interrupt.
    pub commands: ByteCell,
    /// Published by the control loop so the time base knows whether to count.
    pub mode: ModeCell,
    /// Advanced by the time base interrupt.
    pub time_base: TimeBase,
    /// Advanced by the capture counter's overflow interrupt.
    pub capture: PulseCapture,
}

impl Signals {
    pub const fn new() -> Self {
        Self {
            commands: ByteCell::new(),
            mode: ModeCell::new(),
            time_base: TimeBase::new(),
            capture: PulseCapture::new(),
        }
    }
}

/// Hardware used by the control loop.
pub struct Peripherals<Sensor, Counter, Emulator, Scr, Port, Delay> {
    pub sensor: Sensor,
    pub counter: Counter,
    pub emulator: Emulator,
    pub screen: Scr,
    /// Source of command characters.
    pub port: Port,
    pub delay: Delay,
}

pub struct ControlLoop<'a, Sensor, Counter, Emulator, Scr, Port, Delay> {
    signals: &'a Signals,
    periph: Peripherals<Sensor, Counter, Emulator, Scr, Port, Delay>,
    mode: OperatingMode,
    speed: SpeedSetting,
    latest: PulseSample,
}

impl<'a, Sensor, Counter, Emulator, Scr, Port, Delay>
    ControlLoop<'a, Sensor, Counter, Emulator, Scr, Port, Delay>
where
    Sensor: InputPin + EdgeLatch,
    Counter: CaptureCounter,
    Emulator: ReloadRegister,
    Scr: Screen,
    Port: serial::Read<u8>,
    Delay: DelayMs<u32>,
{
    /// Start in `Idle`, emulating the default speed, with a blank screen.
    pub fn new(
        signals: &'a Signals,
        mut periph: Peripherals<Sensor, Counter, Emulator, Scr, Port, Delay>,
    ) -> Self {
        let speed = SpeedSetting::default();
        emulator::configure_emulation(&mut periph.emulator, speed);
        periph.screen.clear();
        signals.mode.store(OperatingMode::Idle);

        Self {
            signals,
            periph,
            mode: OperatingMode::Idle,
            speed,
            latest: PulseSample::NONE,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn speed(&self) -> SpeedSetting {
        self.speed
    }

    pub fn latest(&self) -> PulseSample {
        self.latest
    }

    pub fn peripherals(&self) -> &Peripherals<Sensor, Counter, Emulator, Scr, Port, Delay> {
        &self.periph
    }

    pub fn peripherals_mut(
        &mut self,
    ) -> &mut Peripherals<Sensor, Counter, Emulator, Scr, Port, Delay> {
        &mut self.periph
    }

    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// One iteration: handle a pending command, sample if a window has
    /// elapsed, and redraw the home screen.
    pub fn step(&mut self) {
        match self.periph.port.read() {
            Ok(byte) => match Command::from_byte(byte) {
                Some(command) => self.execute(command),
                None => debug!("ignoring command byte {=u8:#x}", byte),
            },
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(_)) => warn!("command port read failed"),
        }

        if self.mode == OperatingMode::Measuring && self.signals.time_base.take_window() {
            self.sample();
        }

        display::home(
            &mut self.periph.screen,
            self.mode == OperatingMode::Measuring,
            Reading::from_sample(self.latest),
        );
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Start => {
                if self.mode != OperatingMode::Measuring {
                    self.signals.time_base.restart();
                }
                self.set_mode(OperatingMode::Measuring);
            }
            Command::Stop => self.set_mode(OperatingMode::Idle),
            Command::Configure => {
                self.set_mode(OperatingMode::Configuring);
                self.configure();
                self.set_mode(OperatingMode::Idle);
            }
        }
        self.periph.screen.clear();
    }

    fn configure(&mut self) {
        let Peripherals {
            port,
            screen,
            delay,
            emulator,
            ..
        } = &mut self.periph;

        match wizard::run(port, screen, delay) {
            Ok(speed) => {
                self.speed = speed;
                emulator::configure_emulation(emulator, speed);
                if config::debug::LOG_CONTROL_STATE {
                    info!("speed set to {}", speed.get());
                }
            }
            Err(wizard::Error::Unconfirmed(byte)) => {
                warn!("entry not confirmed ({=u8:#x}), keeping {}", byte, self.speed.get());
            }
            Err(wizard::Error::Port(_)) => {
                warn!("command port failed during entry, keeping {}", self.speed.get());
            }
        }
    }

    fn sample(&mut self) {
        let Peripherals {
            sensor, counter, ..
        } = &mut self.periph;

        match self.signals.capture.capture_one_pulse(sensor, counter) {
            Ok(sample) => {
                if config::debug::LOG_CAPTURES {
                    debug!("captured {}", sample);
                }
                if sample.is_stalled() {
                    warn!("no falling edge within the watchdog period");
                }
                self.latest = sample;
            }
            Err(_) => warn!("sensor read failed, keeping previous sample"),
        }
    }

    fn set_mode(&mut self, mode: OperatingMode) {
        if config::debug::LOG_CONTROL_STATE && mode != self.mode {
            info!("mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        self.signals.mode.store(mode);
    }
}
