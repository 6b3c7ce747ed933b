use core::ops::Deref;
use stm32f1xx_hal::device::{tim2, RCC};
use stm32f1xx_hal::rcc::Clocks;
use stm32f1xx_hal::timer::Instance;
use tachobench::capture::StoppedCounter;
use tachobench::config;
use tachobench::emulator::ReloadValue;

/// Enable a general purpose timer and prescale it to `TIMER_TICK`.
///
/// The counter is left stopped, with update interrupts enabled.
// modified from
// https://github.com/stm32-rs/stm32f1xx-hal/blob/f9b24f4d9bac7fc3c93764bd295125800944f53b/src/timer.rs#L713-L735
fn setup<TIM>(tim: &TIM, clocks: &Clocks)
where
    TIM: Instance + Deref<Target = tim2::RegisterBlock>,
{
    unsafe {
        //NOTE(unsafe) this reference will only be used for atomic writes with no side effects
        let rcc = &(*RCC::ptr());
        // Enable and reset the timer peripheral
        TIM::enable(rcc);
        TIM::reset(rcc);
    }

    let clk = TIM::timer_clock(clocks);
    assert!(clk.raw() % config::clk::TIMER_TICK_HZ == 0);
    let psc = clk.raw() / config::clk::TIMER_TICK_HZ;
    tim.psc
        .write(|w| w.psc().bits(u16::try_from(psc - 1).unwrap()));

    // Trigger update event to load the prescaler
    // (also sets the URS bit to prevent an interrupt from being triggered by the UG bit)
    tim.cr1.modify(|_, w| w.urs().set_bit());
    tim.egr.write(|w| w.ug().set_bit());
    tim.cr1.modify(|_, w| w.urs().clear_bit());

    tim.sr.modify(|_, w| w.uif().clear_bit());
    tim.dier.modify(|_, w| w.uie().set_bit());
}

/// Clears the update flag, returning whether it was set.
fn take_update<TIM>(tim: &TIM) -> bool
where
    TIM: Deref<Target = tim2::RegisterBlock>,
{
    let pending = tim.sr.read().uif().bit_is_set();
    if pending {
        tim.sr.modify(|_, w| w.uif().clear_bit());
    }
    pending
}

/// Free-running 16-bit counter used to time pulses.
pub struct CaptureTimer<TIM> {
    tim: TIM,
}

impl<TIM> CaptureTimer<TIM>
where
    TIM: Instance + Deref<Target = tim2::RegisterBlock>,
{
    pub fn new(tim: TIM, clocks: &Clocks) -> Self {
        setup(&tim, clocks);
        tim.arr
            .write(|w| w.arr().bits(u16::try_from(config::capture::COUNTER_TICKS - 1).unwrap()));
        Self { tim }
    }

    pub fn restart(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim.cnt.reset();
        // an overflow that has not been serviced yet belongs to the previous run
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    pub fn stop(&mut self) -> StoppedCounter {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        let remainder = self.tim.cnt.read().cnt().bits();
        let overflow_pending = take_update(&self.tim);
        StoppedCounter {
            remainder,
            overflow_pending,
        }
    }

    /// Call from the update interrupt.
    pub fn take_overflow(&mut self) -> bool {
        take_update(&self.tim)
    }
}

/// Timer that toggles the emulated sensor output every `ticks_per_toggle`.
pub struct EmulationTimer<TIM> {
    tim: TIM,
}

impl<TIM> EmulationTimer<TIM>
where
    TIM: Instance + Deref<Target = tim2::RegisterBlock>,
{
    pub fn new(tim: TIM, clocks: &Clocks) -> Self {
        setup(&tim, clocks);
        // Enable preload for ARR, so a new period starts after the current one
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());
        Self { tim }
    }

    pub fn set_reload(&mut self, reload: ReloadValue) {
        // period is ARR + 1
        let ticks = reload.ticks_per_toggle() - 1;
        self.tim
            .arr
            .write(|w| w.arr().bits(u16::try_from(ticks).unwrap()));
    }

    /// Call from the update interrupt.
    pub fn take_overflow(&mut self) -> bool {
        take_update(&self.tim)
    }
}
