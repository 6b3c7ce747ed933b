pub fn dump_to_log() {
    info!(
        "\n\
        Debugging flags:\n\
        - LOG_CAPTURES: {}\n\
        - LOG_CONTROL_STATE: {}\n\
        Clocks:\n\
        - HSE_FREQ: {} Hz\n\
        - SYSCLK:   {} Hz\n\
        - PCLK1:    {} Hz\n\
        - PCLK2:    {} Hz\n\
        - TIMER_TICK: {} Hz\n\
        Capture:\n\
        - COUNTER_TICKS: {} ({} s)\n\
        - WATCHDOG_CEILING: {} s\n\
        - WATCHDOG_OVERFLOWS: {}\n\
        Time base:\n\
        - TICK_RATE: {} Hz\n\
        - WINDOW_TICKS: {}\n\
        Speed:\n\
        - CALIBRATION_TICKS: {}\n\
        - SETTING: {}..={} (default {})\n\
        - DISPLAY: {}..={}\n\
        ",
        debug::LOG_CAPTURES,
        debug::LOG_CONTROL_STATE,
        clk::HSE_FREQ.to_Hz(),
        clk::SYSCLK.to_Hz(),
        clk::PCLK1.to_Hz(),
        clk::PCLK2.to_Hz(),
        clk::TIMER_TICK.to_Hz(),
        capture::COUNTER_TICKS,
        capture::OVERFLOW_PERIOD_SECS,
        capture::WATCHDOG_CEILING_SECS,
        capture::WATCHDOG_OVERFLOWS,
        time_base::TICK_RATE.to_Hz(),
        time_base::WINDOW_TICKS,
        speed::CALIBRATION_TICKS,
        speed::MIN,
        speed::MAX,
        speed::DEFAULT,
        speed::DISPLAY_MIN,
        speed::DISPLAY_MAX,
    );
}

/// Debugging flags
pub mod debug {
    /// Log every captured pulse
    pub const LOG_CAPTURES: bool = true;
    /// Log operating mode changes and committed speed settings
    pub const LOG_CONTROL_STATE: bool = true;
}

/// Clock configuration
///
/// See clock tree in https://www.st.com/resource/en/datasheet/stm32f103c8.pdf
/// Rough layout:
///
///   HSE -> PLLMUL -> SYSCLK -> AHB prescaler -> APB1 prescaler -> PCLK1 (x2 for TIM2..4)
///           x2..16             / 1,2..512   |   / 1,2,4,8,16
///                                           |
///                                           -> APB2 prescaler -> PCLK2
///                                               / 1,2,4,8,16
///
/// Every timing constant of the bench is expressed in 25 MHz counter ticks,
/// so the clocks are picked to divide down to exactly that.
pub mod clk {
    use fugit::Rate;

    /// 10 MHz crystal
    pub const HSE_FREQ: Rate<u32, 1, 1> = Rate::<u32, 1, 1>::MHz(10);

    /// PLLMUL @ x5
    pub const SYSCLK: Rate<u32, 1, 1> = Rate::<u32, 1, 1>::MHz(50);
    pub const SYSCLK_HZ: u32 = SYSCLK.to_Hz();

    /// APB1 prescaler @ /2 (max 36MHz), so TIM2..4 are clocked at 2 * PCLK1
    pub const PCLK1: Rate<u32, 1, 1> = Rate::<u32, 1, 1>::MHz(25);
    /// APB2 prescaler @ /1 (max 72MHz)
    pub const PCLK2: Rate<u32, 1, 1> = Rate::<u32, 1, 1>::MHz(50);

    /// Counting rate of the capture and emulation timers
    pub const TIMER_TICK: Rate<u32, 1, 1> = Rate::<u32, 1, 1>::MHz(25);
    pub const TIMER_TICK_HZ: u32 = TIMER_TICK.to_Hz();

    const _: () = assert!(
        (2 * PCLK1.to_Hz()) % TIMER_TICK_HZ == 0,
        "timer tick must be an integer division of the APB1 timer clock"
    );
}

/// Pulse capture configuration
pub mod capture {
    use crate::config;

    /// The capture counter is 16 bits wide
    pub const COUNTER_TICKS: u32 = 1 << 16;

    /// Time covered by one counter overflow (2^16 ticks at 25 MHz)
    pub const OVERFLOW_PERIOD_SECS: f32 = 0.00262144;

    /// A capture that runs longer than this is abandoned
    pub const WATCHDOG_CEILING_SECS: f32 = 1.0;
    pub const WATCHDOG_CEILING_TICKS: u32 = config::clk::TIMER_TICK_HZ;

    /// First overflow count whose accumulated duration exceeds the ceiling
    pub const WATCHDOG_OVERFLOWS: u32 = WATCHDOG_CEILING_TICKS / COUNTER_TICKS + 1;

    const _: () = assert!(
        WATCHDOG_CEILING_TICKS % COUNTER_TICKS != 0,
        "ceiling must fall strictly inside a counter period"
    );
}

/// Time base configuration
pub mod time_base {
    use fugit::Rate;

    /// One tick every 4 ms
    pub const TICK_RATE: Rate<u32, 1, 1> = Rate::<u32, 1, 1>::Hz(250);
    pub const TICK_SECS: f32 = 0.004;

    /// A new pulse is sampled once the accumulated time exceeds this
    pub const CADENCE_WINDOW_SECS: f32 = 1.0;

    /// Nominal number of ticks per cadence window
    pub const WINDOW_TICKS: u32 = TICK_RATE.to_Hz();
}

/// Speed configuration
///
/// Speed and pulse duration are related by `speed = CALIBRATION / seconds`.
pub mod speed {
    use crate::config;

    pub const CALIBRATION: f32 = 0.03;

    /// `CALIBRATION` expressed in timer ticks (0.03 s at 25 MHz)
    pub const CALIBRATION_TICKS: u32 = config::clk::TIMER_TICK_HZ / 100 * 3;

    /// Valid speed settings. A setting of `MIN` needs the longest representable
    /// emulation period; much above `MAX` the reload gets too coarse to be useful.
    pub const MIN: u16 = 18;
    pub const MAX: u16 = 902;
    pub const DEFAULT: u16 = 100;

    const _: () = assert!(CALIBRATION_TICKS / MIN as u32 <= u16::MAX as u32);
    const _: () = assert!(MIN <= DEFAULT && DEFAULT <= MAX);

    /// Measured speeds outside this range are shown as "at or below" / "at or above".
    ///
    /// Note that this is narrower than the setting range.
    pub const DISPLAY_MIN: f32 = 20.0;
    pub const DISPLAY_MAX: f32 = 900.0;
}

/// Configuration entry configuration
pub mod wizard {
    /// Characters collected for a new setting
    pub const ENTRY_LEN: usize = 3;

    /// Character that commits an entry
    pub const CONFIRM: u8 = b'e';

    /// How long the error screen stays up
    pub const ERROR_HOLD_MS: u32 = 5000;
}

/// Command characters
pub mod command {
    pub const START: u8 = b'i';
    pub const STOP: u8 = b'p';
    pub const CONFIGURE: u8 = b'r';
}

/// Display geometry
pub mod display {
    /// Text rows, numbered 1..=ROWS
    pub const ROWS: u8 = 8;

    /// Visible characters per row (two 8-character halves)
    pub const COLUMNS: usize = 16;
}

/// Command port configuration
pub mod serial {
    pub const BAUD_RATE: u32 = 9600;
}
