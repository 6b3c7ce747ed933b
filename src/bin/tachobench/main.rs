#![no_main]
#![no_std]
#![allow(clippy::let_and_return, clippy::type_complexity)]
#![warn(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::ptr_as_ptr
)]

use defmt_rtt as _; // global logger
use stm32f1xx_hal as _; // memory layout

use panic_probe as _; // panicking-behavior

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

mod hal;
mod time;

use tachobench::control::Signals;

/// Everything the interrupt handlers share with the control loop.
static SIGNALS: Signals = Signals::new();

#[rtic::app(device = stm32f1xx_hal::pac, peripherals = true)]
mod app {
    use crate::hal::pins;
    use crate::hal::tim::{CaptureTimer, EmulationTimer};
    use crate::hal::{Locked, Sensor};
    use crate::time::MonoDelay;
    use crate::SIGNALS;
    use dwt_systick_monotonic::DwtSystick;
    use stm32f1xx_hal::device::{EXTI, TIM2, TIM3, TIM4, USART1};
    use stm32f1xx_hal::gpio::{Edge, ExtiPin};
    use stm32f1xx_hal::prelude::*;
    use stm32f1xx_hal::serial::{Config, Rx, Serial};
    use stm32f1xx_hal::timer::{CounterHz, Event, Timer};
    use tachobench::config;
    use tachobench::control::{ControlLoop, Peripherals};
    use tachobench::display::LogScreen;

    #[shared]
    struct Shared {
        capture_timer: CaptureTimer<TIM2>,
        emulation_timer: EmulationTimer<TIM4>,
    }

    #[local]
    struct Local {
        sensor: pins::A0_SENSOR,
        exti: EXTI,
        time_base: CounterHz<TIM3>,
        emulation_pin: pins::A1_EMULATION,
        rx: Rx<USART1>,
    }

    #[init]
    fn init(mut cx: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("Dumping config...");

        config::dump_to_log();

        defmt::info!("Starting init...");

        let mut afio = cx.device.AFIO.constrain();
        let mut flash = cx.device.FLASH.constrain();
        let mut gpioa = cx.device.GPIOA.split();
        let rcc = cx.device.RCC.constrain();

        defmt::info!("Configuring clocks...");

        let clocks = rcc
            .cfgr
            .use_hse(config::clk::HSE_FREQ)
            .sysclk(config::clk::SYSCLK)
            .pclk1(config::clk::PCLK1)
            .pclk2(config::clk::PCLK2)
            .freeze(&mut flash.acr);

        assert!(config::clk::SYSCLK == clocks.sysclk());
        assert!(config::clk::PCLK1 == clocks.pclk1());
        assert!(config::clk::PCLK2 == clocks.pclk2());

        defmt::info!("Configuring sensor input...");

        let mut exti = cx.device.EXTI;
        let mut sensor: pins::A0_SENSOR = gpioa.pa0.into_pull_down_input(&mut gpioa.crl);
        sensor.make_interrupt_source(&mut afio);
        sensor.trigger_on_edge(&mut exti, Edge::Falling);
        // needed for the pending bit to be set by software; EXTI0 itself stays masked in the NVIC
        sensor.enable_interrupt(&mut exti);
        sensor.clear_interrupt_pending_bit();

        defmt::info!("Configuring capture timer...");

        let capture_timer = CaptureTimer::new(cx.device.TIM2, &clocks);

        defmt::info!("Configuring emulation timer...");

        let emulation_pin: pins::A1_EMULATION = gpioa.pa1.into_push_pull_output(&mut gpioa.crl);
        let emulation_timer = EmulationTimer::new(cx.device.TIM4, &clocks);

        defmt::info!("Configuring time base...");

        let mut time_base = Timer::new(cx.device.TIM3, &clocks).counter_hz();
        time_base.start(config::time_base::TICK_RATE).unwrap();
        time_base.listen(Event::Update);

        defmt::info!("Configuring command port...");

        let tx: pins::A9_USART1_TX = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
        let rx: pins::A10_USART1_RX = gpioa.pa10;
        let serial = Serial::new(
            cx.device.USART1,
            (tx, rx),
            &mut afio.mapr,
            Config::default().baudrate(config::serial::BAUD_RATE.bps()),
            &clocks,
        );
        let (_tx, mut rx) = serial.split();
        rx.listen();

        defmt::info!("Configuring monotonic timer...");

        let mono = DwtMono::new(
            &mut cx.core.DCB,
            cx.core.DWT,
            cx.core.SYST,
            clocks.sysclk().to_Hz(),
        );

        defmt::info!("Finished init.");

        (
            Shared {
                capture_timer,
                emulation_timer,
            },
            Local {
                sensor,
                exti,
                time_base,
                emulation_pin,
                rx,
            },
            init::Monotonics(mono),
        )
    }

    // Task priorities
    //
    // Prio | Task              | Description
    //    3 | capture_overflow  | counts capture timer overflows, runs the watchdog
    //    2 | emulation_toggle  | toggles the emulated sensor output
    //    1 | time_base_tick    | paces sampling
    //    1 | command_received  | posts command bytes
    //    0 | idle              | control loop

    /// This provides a monotonic timer used for blocking delays.
    #[monotonic(binds = SysTick, default = true)]
    type DwtMono = DwtSystick<{ config::clk::SYSCLK_HZ }>;

    /// The control loop runs here and never returns.
    #[idle(shared = [capture_timer, emulation_timer], local = [sensor])]
    fn idle(cx: idle::Context) -> ! {
        let control = ControlLoop::new(
            &SIGNALS,
            Peripherals {
                sensor: Sensor(cx.local.sensor),
                counter: Locked(cx.shared.capture_timer),
                emulator: Locked(cx.shared.emulation_timer),
                screen: LogScreen::new(),
                port: &SIGNALS.commands,
                delay: MonoDelay,
            },
        );

        control.run()
    }

    /// Capture timer overflow.
    ///
    /// This task has the highest priority since a late overflow would be
    /// missing from the captured pulse width.
    #[task(binds = TIM2, shared = [capture_timer], local = [exti], priority = 3)]
    fn capture_overflow(mut cx: capture_overflow::Context) {
        let overflowed = cx.shared.capture_timer.lock(|timer| timer.take_overflow());

        if overflowed && SIGNALS.capture.on_overflow().is_expired() {
            // latch a fake falling edge to release a waiting capture
            cx.local.exti.swier.write(|w| w.swier0().set_bit());
        }
    }

    #[task(binds = TIM4, shared = [emulation_timer], local = [emulation_pin], priority = 2)]
    fn emulation_toggle(mut cx: emulation_toggle::Context) {
        if cx.shared.emulation_timer.lock(|timer| timer.take_overflow()) {
            cx.local.emulation_pin.toggle();
        }
    }

    #[task(binds = TIM3, local = [time_base], priority = 1)]
    fn time_base_tick(cx: time_base_tick::Context) {
        cx.local.time_base.clear_interrupt(Event::Update);
        SIGNALS.time_base.on_tick(SIGNALS.mode.load());
    }

    #[task(binds = USART1, local = [rx], priority = 1)]
    fn command_received(cx: command_received::Context) {
        match cx.local.rx.read() {
            Ok(byte) => SIGNALS.commands.post(byte),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(_)) => defmt::warn!("Command port receive error"),
        }
    }
}
