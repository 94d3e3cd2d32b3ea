#![allow(missing_docs)]
use core::fmt;

use bilge::prelude::*;

use crate::ParameterError;

/// Register addresses
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Reserved for future use.
    Reserved,

    /// Configuration register address.
    Configuration,

    /// Alert temperature upper boundary register address.
    UpperLimit,

    /// Alert temperature lower boundary register address.
    LowerLimit,

    /// Critical temperature register address.
    CriticalLimit,

    /// Ambient temperature register address.
    Temperature,

    /// Manufacturer ID register address.
    ManufacturerId,

    /// Device ID and revision register address.
    DeviceId,

    /// Resolution register address.
    Resolution,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        match reg {
            Register::Reserved => 0,
            Register::Configuration => 1,
            Register::UpperLimit => 2,
            Register::LowerLimit => 3,
            Register::CriticalLimit => 4,
            Register::Temperature => 5,
            Register::ManufacturerId => 6,
            Register::DeviceId => 7,
            Register::Resolution => 8,
        }
    }
}

/// Expected content of the manufacturer ID register.
pub const MANUFACTURER_ID: u16 = 0x0054;

/// Expected device ID (upper byte of the device ID register).
pub const DEVICE_ID: u8 = 0x04;

/// Configuration register.
///
/// All alert, lock, power and hysteresis settings share this one word, so every driver
/// setter goes through a read-modify-write of it.
#[bitsize(16)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct Configuration {
    /// Alert output mode
    pub alert_mode: AlertMode,

    /// Alert output polarity
    pub alert_polarity: Polarity,

    /// Alert output select
    pub alert_response: AlertResponse,

    /// Alert output control
    pub alert_enable: bool,

    /// Alert output status. Owned by the device.
    pub alert_status: bool,

    /// Interrupt clear. Always reads back as zero.
    pub interrupt_clear: bool,

    /// Upper/lower window lock
    pub window_lock: bool,

    /// Critical limit lock
    pub critical_lock: bool,

    /// Shutdown mode
    pub power_mode: PowerMode,

    /// Hysteresis applied to all limits.
    pub hysteresis: Hysteresis,

    reserved11_15: u5,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from(0x0000)
    }
}

impl Configuration {
    /// Configure alert output mode.
    #[must_use]
    pub fn with_alert_mode(mut self, mode: AlertMode) -> Self {
        self.set_alert_mode(mode);
        self
    }

    /// Configure alert polarity.
    #[must_use]
    pub fn with_alert_polarity(mut self, polarity: Polarity) -> Self {
        self.set_alert_polarity(polarity);
        self
    }

    /// Configure which limits drive the alert output.
    #[must_use]
    pub fn with_alert_response(mut self, response: AlertResponse) -> Self {
        self.set_alert_response(response);
        self
    }

    /// Enable or disable the alert output.
    #[must_use]
    pub fn with_alert_enable(mut self, enable: bool) -> Self {
        self.set_alert_enable(enable);
        self
    }

    /// Configure the interrupt clear pulse.
    #[must_use]
    pub fn with_interrupt_clear(mut self, clear: bool) -> Self {
        self.set_interrupt_clear(clear);
        self
    }

    /// Configure power mode.
    #[must_use]
    pub fn with_power_mode(mut self, mode: PowerMode) -> Self {
        self.set_power_mode(mode);
        self
    }

    /// Configure hysteresis.
    #[must_use]
    pub fn with_hysteresis(mut self, hyst: Hysteresis) -> Self {
        self.set_hysteresis(hyst);
        self
    }

    /// Configure both lock bits.
    #[must_use]
    pub fn with_lock(mut self, lock: LockMode) -> Self {
        self.set_lock(lock);
        self
    }

    /// Current combination of the two lock bits.
    pub fn lock(&self) -> LockMode {
        match (self.critical_lock(), self.window_lock()) {
            (false, false) => LockMode::Unlocked,
            (true, false) => LockMode::Critical,
            (false, true) => LockMode::Window,
            (true, true) => LockMode::Both,
        }
    }

    /// Overwrite both lock bits.
    pub fn set_lock(&mut self, lock: LockMode) {
        let (critical, window) = match lock {
            LockMode::Unlocked => (false, false),
            LockMode::Critical => (true, false),
            LockMode::Window => (false, true),
            LockMode::Both => (true, true),
        };
        self.set_critical_lock(critical);
        self.set_window_lock(window);
    }

    /// Whether either lock bit is set.
    pub fn is_locked(&self) -> bool {
        self.critical_lock() || self.window_lock()
    }
}

/// Alert output mode.
#[bitsize(1)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, FromBits, PartialEq, PartialOrd)]
pub enum AlertMode {
    /// The alert output follows the limit comparison and clears itself.
    Comparator,

    /// The alert output latches until cleared through the interrupt clear bit.
    Interrupt,
}

/// Alert output polarity.
#[bitsize(1)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, FromBits, PartialEq, PartialOrd)]
pub enum Polarity {
    /// Active low (default).
    ActiveLow,

    /// Active high.
    ActiveHigh,
}

/// Limits the alert output responds to.
#[bitsize(1)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, FromBits, PartialEq, PartialOrd)]
pub enum AlertResponse {
    /// Upper, lower and critical limits (default).
    UpperLowerCritical,

    /// Critical limit only. The upper/lower window is ignored.
    CriticalOnly,
}

/// Power mode.
#[bitsize(1)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, FromBits, PartialEq, PartialOrd)]
pub enum PowerMode {
    /// Continuous conversion (default).
    Normal,

    /// Shutdown. Conversions stop, the serial interface stays active.
    Shutdown,
}

/// Hysteresis applied when the temperature falls back past a limit.
#[bitsize(2)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, FromBits, PartialEq, PartialOrd)]
pub enum Hysteresis {
    /// 0℃ Hysteresis
    ZeroCelsius,

    /// 1.5℃ Hysteresis
    OnePointFiveCelsius,

    /// 3℃ Hysteresis
    ThreeCelsius,

    /// 6℃ Hysteresis
    SixCelsius,
}

impl Hysteresis {
    /// Hysteresis in degrees Celsius.
    pub fn celsius(self) -> f32 {
        match self {
            Self::ZeroCelsius => 0.0,
            Self::OnePointFiveCelsius => 1.5,
            Self::ThreeCelsius => 3.0,
            Self::SixCelsius => 6.0,
        }
    }
}

impl TryFrom<f32> for Hysteresis {
    type Error = ParameterError;

    fn try_from(celsius: f32) -> Result<Self, Self::Error> {
        [Self::ZeroCelsius, Self::OnePointFiveCelsius, Self::ThreeCelsius, Self::SixCelsius]
            .into_iter()
            .find(|h| {
                let diff = h.celsius() - celsius;
                diff > -f32::EPSILON && diff < f32::EPSILON
            })
            .ok_or(ParameterError::OutOfRange)
    }
}

/// Write protection of the limit registers.
///
/// Lock bits can only be cleared by a power cycle of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockMode {
    /// No lock (default).
    Unlocked,

    /// Critical limit locked.
    Critical,

    /// Upper and lower limits locked.
    Window,

    /// All three limits locked.
    Both,
}

/// Implement `TryFrom<u8>` over the field encoding of a setting, so raw codes coming
/// from outside the type system are rejected as [`ParameterError::InvalidCode`].
macro_rules! impl_try_from_code {
    ( $type:ident, $( $code:literal => $variant:ident ),+ ) => {
        impl TryFrom<u8> for $type {
            type Error = ParameterError;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $( $code => Ok(Self::$variant), )+
                    other => Err(ParameterError::InvalidCode(other)),
                }
            }
        }
    };
}

impl_try_from_code!(AlertMode, 0 => Comparator, 1 => Interrupt);
impl_try_from_code!(Polarity, 0 => ActiveLow, 1 => ActiveHigh);
impl_try_from_code!(AlertResponse, 0 => UpperLowerCritical, 1 => CriticalOnly);
impl_try_from_code!(PowerMode, 0 => Normal, 1 => Shutdown);
impl_try_from_code!(
    Hysteresis,
    0 => ZeroCelsius,
    1 => OnePointFiveCelsius,
    2 => ThreeCelsius,
    3 => SixCelsius
);
impl_try_from_code!(LockMode, 0 => Unlocked, 1 => Window, 2 => Critical, 3 => Both);
impl_try_from_code!(
    Resolution,
    0 => HalfCelsius,
    1 => QuarterCelsius,
    2 => EighthCelsius,
    3 => SixteenthCelsius
);

/// Ambient temperature register.
#[bitsize(16)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct AmbientTemperature {
    /// 13-bit two's complement temperature, 1/16℃ per bit.
    pub raw: u13,

    /// Ambient temperature is below the lower limit.
    pub below_lower: bool,

    /// Ambient temperature is above the upper limit.
    pub above_upper: bool,

    /// Ambient temperature is at or above the critical limit.
    pub above_critical: bool,
}

impl AmbientTemperature {
    const CELSIUS_PER_BIT: f32 = 0.0625;

    /// Temperature in degrees Celsius, ignoring the comparator flags.
    pub fn celsius(&self) -> f32 {
        // Shift the sign bit (bit 12) into bit 15, dropping the flags.
        let value = (u16::from(*self) << 3) as i16;
        f32::from(value >> 3) * Self::CELSIUS_PER_BIT
    }
}

/// Decode the two bytes of the ambient temperature register into degrees Celsius.
pub fn decode_temperature(bytes: [u8; 2]) -> f32 {
    AmbientTemperature::from(u16::from_be_bytes(bytes)).celsius()
}

/// Alert limit register (upper, lower and critical share this layout).
#[bitsize(16)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct Limit {
    reserved0_1: u2,

    /// Fraction in quarter degrees.
    pub quarters: u2,

    /// Integer part of the magnitude.
    pub integer: u8,

    /// Sign bit.
    pub negative: bool,

    reserved13_15: u3,
}

impl Limit {
    /// Limit value in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        let magnitude = f32::from(self.integer()) + f32::from(self.quarters().value()) * 0.25;
        if self.negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl TryFrom<f32> for Limit {
    type Error = ParameterError;

    fn try_from(celsius: f32) -> Result<Self, Self::Error> {
        if !celsius.is_finite() {
            return Err(ParameterError::OutOfRange);
        }

        let (negative, magnitude) = if celsius < 0.0 { (true, -celsius) } else { (false, celsius) };
        if magnitude >= 256.0 {
            return Err(ParameterError::OutOfRange);
        }

        // Truncate the integer part, then floor the fraction to hundredths. The small nudge
        // keeps f32 noise (20.26 -> 20.2599...) from dropping a value into the bucket below,
        // and the clamp keeps it from carrying into the integer.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = magnitude as u32;
        let integer = u8::try_from(whole).map_err(|_| ParameterError::OutOfRange)?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let hundredths = (((magnitude - whole as f32) * 100.0 + 0.01) as u32).min(99);

        let mut limit = Self::from(0u16);
        limit.set_negative(negative);
        limit.set_integer(integer);
        limit.set_quarters(u2::new(quarter_code(hundredths)));
        Ok(limit)
    }
}

/// Map the fractional hundredths of a limit onto the device's quarter-degree code.
///
/// The table is not round-to-nearest: 1..=25 -> .25, 26..=49 -> .50 and
/// everything from 50 up -> .75.
fn quarter_code(hundredths: u32) -> u8 {
    match hundredths {
        0 => 0,
        1..=25 => 1,
        26..=49 => 2,
        _ => 3,
    }
}

/// Encode a temperature in degrees Celsius into the two bytes of a limit register.
///
/// # Errors
///
/// [`ParameterError::OutOfRange`] when the value is not finite or its magnitude does not fit
/// the 8 integer bits of the register.
pub fn encode_threshold(celsius: f32) -> Result<[u8; 2], ParameterError> {
    let limit = Limit::try_from(celsius)?;
    Ok(u16::from(limit).to_be_bytes())
}

/// Decode the two bytes of a limit register into degrees Celsius.
pub fn decode_threshold(bytes: [u8; 2]) -> f32 {
    Limit::from(u16::from_be_bytes(bytes)).celsius()
}

/// The three alert limits, written together.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// Critical limit.
    pub critical: f32,

    /// Upper window limit.
    pub upper: f32,

    /// Lower window limit.
    pub lower: f32,
}

impl Thresholds {
    /// Smallest accepted distance between the upper and lower limit.
    pub const MIN_WINDOW: f32 = 2.0;

    /// Group three limits.
    pub fn new(critical: f32, upper: f32, lower: f32) -> Self {
        Self { critical, upper, lower }
    }

    /// Check ordering and window width, then encode the upper, lower and critical limit
    /// registers, in that order.
    ///
    /// # Errors
    ///
    /// The first violated rule, checked in the order critical/upper ordering, window width,
    /// value range.
    pub fn encode(&self) -> Result<[[u8; 2]; 3], ParameterError> {
        if self.critical < self.upper {
            return Err(ParameterError::CriticalBelowUpper);
        }

        if self.upper - self.lower < Self::MIN_WINDOW {
            return Err(ParameterError::WindowTooNarrow);
        }

        Ok([
            encode_threshold(self.upper)?,
            encode_threshold(self.lower)?,
            encode_threshold(self.critical)?,
        ])
    }
}

/// Device ID register.
#[bitsize(16)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct DeviceId {
    /// Silicon revision.
    pub revision: u8,

    /// Device ID.
    pub id: u8,
}

/// Resolution register.
#[bitsize(8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct ResolutionRegister {
    pub resolution: Resolution,
    reserved2_7: u6,
}

/// Conversion resolution.
#[bitsize(2)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, FromBits, PartialEq, PartialOrd)]
pub enum Resolution {
    /// 0.5℃ steps, 30ms typical conversion time.
    HalfCelsius,

    /// 0.25℃ steps, 65ms typical conversion time.
    QuarterCelsius,

    /// 0.125℃ steps, 130ms typical conversion time.
    EighthCelsius,

    /// 0.0625℃ steps, 250ms typical conversion time (default).
    SixteenthCelsius,
}

impl Resolution {
    /// Step size in degrees Celsius.
    pub fn celsius_per_step(self) -> f32 {
        match self {
            Self::HalfCelsius => 0.5,
            Self::QuarterCelsius => 0.25,
            Self::EighthCelsius => 0.125,
            Self::SixteenthCelsius => 0.0625,
        }
    }

    /// Typical time for one conversion.
    pub fn conversion_time_ms(self) -> u32 {
        match self {
            Self::HalfCelsius => 30,
            Self::QuarterCelsius => 65,
            Self::EighthCelsius => 130,
            Self::SixteenthCelsius => 250,
        }
    }
}

/// Comparator flags and temperature taken from a single read of the ambient temperature
/// register.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ComparatorState {
    /// Ambient temperature in degrees Celsius.
    pub temperature: f32,

    /// TA >= TCRIT
    pub above_critical: bool,

    /// TA > TUPPER
    pub above_upper: bool,

    /// TA < TLOWER
    pub below_lower: bool,
}

impl ComparatorState {
    /// Flags packed as `critical << 2 | upper << 1 | lower`.
    pub fn bits(&self) -> u8 {
        u8::from(self.above_critical) << 2 | u8::from(self.above_upper) << 1 | u8::from(self.below_lower)
    }

    /// Whether any of the three comparisons tripped.
    pub fn any(&self) -> bool {
        self.bits() != 0
    }
}

impl From<AmbientTemperature> for ComparatorState {
    fn from(reg: AmbientTemperature) -> Self {
        Self {
            temperature: reg.celsius(),
            above_critical: reg.above_critical(),
            above_upper: reg.above_upper(),
            below_lower: reg.below_lower(),
        }
    }
}

impl fmt::Display for ComparatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let critical = if self.above_critical { "at/above critical" } else { "below critical" };
        let upper = if self.above_upper { "above upper" } else { "at/below upper" };
        let lower = if self.below_lower { "below lower" } else { "at/above lower" };
        write!(f, "{critical}, {upper}, {lower}")
    }
}
