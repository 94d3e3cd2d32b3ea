//! This is a platform-agnostic Rust driver for the MCP9808 temperature sensor
//! based on the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! For further details of the device architecture and operation, please refer
//! to the official [`Datasheet`].
//!
//! [`Datasheet`]: https://ww1.microchip.com/downloads/en/DeviceDoc/25095A.pdf

#![doc(html_root_url = "https://docs.rs/mcp9808/latest")]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

mod fmt;

mod registers;
pub use registers::*;

pub mod interface;
pub use interface::{I2cInterface, RegisterInterface};
#[cfg(feature = "async")]
pub use interface::AsyncRegisterInterface;

#[cfg(feature = "async")]
pub mod asynchronous;

pub mod blocking;

/// I2C address, selected by the A2, A1 and A0 pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    const BASE: u8 = 0b001_1000;

    /// Address for the given pin levels (`true` is tied high).
    pub const fn from_pins(a2: bool, a1: bool, a0: bool) -> Self {
        Self(Self::BASE | (a2 as u8) << 2 | (a1 as u8) << 1 | a0 as u8)
    }
}

impl Default for Address {
    /// All address pins tied to GND, resulting in address `0x18`.
    fn default() -> Self {
        Self::from_pins(false, false, false)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Reasons an argument is refused before any register is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Raw setting code outside the set the field accepts.
    InvalidCode(u8),

    /// Critical limit is below the upper limit.
    CriticalBelowUpper,

    /// Upper and lower limit are less than 2℃ apart.
    WindowTooNarrow,

    /// Temperature is not finite or does not fit the limit register.
    OutOfRange,

    /// The alert output is disabled, so there is nothing to wait for.
    AlertDisabled,
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidCode(code) => write!(f, "invalid setting code {code:#04x}"),
            Self::CriticalBelowUpper => f.write_str("critical limit below upper limit"),
            Self::WindowTooNarrow => f.write_str("upper and lower limit less than 2 degrees apart"),
            Self::OutOfRange => f.write_str("temperature out of range"),
            Self::AlertDisabled => f.write_str("alert output disabled"),
        }
    }
}

/// MCP9808 Errors
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus Error
    Bus(E),

    /// The connected device is not an MCP9808.
    IdentityMismatch {
        /// Manufacturer ID read from the device.
        manufacturer: u16,
        /// Device ID read from the device.
        device: u8,
    },

    /// The device lock bits forbid the change. Only a power cycle clears them.
    Locked(LockMode),

    /// Invalid Input Error
    InvalidParameter(ParameterError),

    /// The ALERT pin could not be waited on.
    AlertPin,
}

impl<E> From<ParameterError> for Error<E> {
    fn from(err: ParameterError) -> Self {
        Self::InvalidParameter(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus error: {e:?}"),
            Self::IdentityMismatch { manufacturer, device } => write!(
                f,
                "unexpected device: manufacturer {manufacturer:#06x}, device {device:#04x}"
            ),
            Self::Locked(mode) => write!(f, "configuration locked ({mode:?})"),
            Self::InvalidParameter(err) => write!(f, "invalid parameter: {err}"),
            Self::AlertPin => f.write_str("alert pin error"),
        }
    }
}
