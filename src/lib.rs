//! Timing core of the rotational-speed bench.
//!
//! Everything here is hardware-independent: peripherals are reached through
//! the traits in [`capture`], [`emulator`] and [`display`] plus the
//! `embedded-hal` 0.2 traits, and state shared with interrupt handlers lives in
//! [`control::Signals`].
#![cfg_attr(not(test), no_std)]
#![allow(clippy::let_and_return, clippy::type_complexity)]
#![warn(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::ptr_as_ptr
)]

#[macro_use]
mod log;

pub mod capture;
pub mod config;
pub mod control;
pub mod display;
pub mod emulator;
pub mod math;
pub mod shared;
pub mod speed;
pub mod time;
pub mod time_base;
pub mod wizard;

#[cfg(test)]
mod sim;
