//! Logging macros.
//!
//! These forward to `defmt` when the `defmt` feature is enabled.
//! Without it (e.g. host tests) they compile to nothing,
//! but still borrow their arguments so nothing becomes unused.

macro_rules! log_via {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::$level!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

macro_rules! debug {
    ($($t:tt)*) => { log_via!(debug, $($t)*) };
}

macro_rules! info {
    ($($t:tt)*) => { log_via!(info, $($t)*) };
}

macro_rules! warn {
    ($($t:tt)*) => { log_via!(warn, $($t)*) };
}
