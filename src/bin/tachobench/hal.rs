//! Extensions to the `stm32f1xx-hal` Hardware Abstraction Layer.

pub mod tim;

use crate::hal::tim::{CaptureTimer, EmulationTimer};
use core::convert::Infallible;
use embedded_hal::digital::v2::InputPin;
use stm32f1xx_hal::device::{TIM2, TIM4};
use stm32f1xx_hal::gpio::ExtiPin;
use tachobench::capture::{CaptureCounter, EdgeLatch, StoppedCounter};
use tachobench::emulator::{ReloadRegister, ReloadValue};

#[allow(non_camel_case_types)]
pub mod pins {
    use stm32f1xx_hal::gpio::{Alternate, Floating, Input, Output, Pin, PullDown, PushPull};

    /// Speed sensor input, falling edges latched on EXTI0
    pub type A0_SENSOR = Pin<'A', 0, Input<PullDown>>;

    /// Emulated sensor output, toggled by TIM4
    pub type A1_EMULATION = Pin<'A', 1, Output<PushPull>>;

    /// Command port transmit (unused, but claimed by the serial peripheral)
    pub type A9_USART1_TX = Pin<'A', 9, Alternate<PushPull>>;
    /// Command port receive
    pub type A10_USART1_RX = Pin<'A', 10, Input<Floating>>;
}

/// The sensor line, read directly and through its EXTI pending bit.
///
/// EXTI0 is never unmasked in the NVIC, so the pending bit is only ever polled.
pub struct Sensor<'a>(pub &'a mut pins::A0_SENSOR);

impl InputPin for Sensor<'_> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        InputPin::is_high(&*self.0)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        InputPin::is_low(&*self.0)
    }
}

impl EdgeLatch for Sensor<'_> {
    fn clear_edge(&mut self) {
        self.0.clear_interrupt_pending_bit();
    }

    fn edge_latched(&mut self) -> bool {
        self.0.check_interrupt()
    }
}

/// A timer shared with its interrupt handler, locked for every access.
pub struct Locked<M>(pub M);

impl<M> CaptureCounter for Locked<M>
where
    M: rtic::Mutex<T = CaptureTimer<TIM2>>,
{
    fn restart(&mut self) {
        self.0.lock(|timer| timer.restart());
    }

    fn stop(&mut self) -> StoppedCounter {
        self.0.lock(|timer| timer.stop())
    }
}

impl<M> ReloadRegister for Locked<M>
where
    M: rtic::Mutex<T = EmulationTimer<TIM4>>,
{
    fn set_reload(&mut self, reload: ReloadValue) {
        self.0.lock(|timer| timer.set_reload(reload));
    }
}
