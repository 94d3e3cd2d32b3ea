//! Mcp9808 Blocking API

use embedded_hal::delay::DelayNs;

use super::{
    Address, AlertMode, AlertResponse, AmbientTemperature, ComparatorState, Configuration, DeviceId, Error,
    Hysteresis, I2cInterface, Limit, LockMode, Polarity, PowerMode, Register, RegisterInterface, Resolution,
    ResolutionRegister, Thresholds, DEVICE_ID, MANUFACTURER_ID,
};

/// MCP9808 blocking device driver
///
/// Nothing is cached: every getter reads the device and every setter performs a fresh
/// read-modify-write. Callers sharing one driver between tasks must serialize access to the
/// whole driver.
pub struct Mcp9808<IFACE> {
    /// The register transport
    iface: IFACE,
}

impl<I2C: embedded_hal::i2c::I2c> Mcp9808<I2cInterface<I2C>> {
    /// Create a new MCP9808 instance on an I2C bus.
    pub fn new_blocking(i2c: I2C, address: Address) -> Self {
        Self::with_interface(I2cInterface::new(i2c, address))
    }

    /// Create a new MCP9808 instance with A2, A1 and A0 tied to GND, resulting in an
    /// instance responding to address `0x18`.
    pub fn new_blocking_with_default_address(i2c: I2C) -> Self {
        Self::new_blocking(i2c, Address::default())
    }

    /// Destroy the driver instance, return the I2C bus instance.
    pub fn destroy(self) -> I2C {
        self.iface.destroy()
    }
}

impl<IFACE: RegisterInterface> Mcp9808<IFACE> {
    /// Create a new MCP9808 instance over any register transport.
    pub fn with_interface(iface: IFACE) -> Self {
        Self { iface }
    }

    /// Destroy the driver instance, return the register transport.
    pub fn release(self) -> IFACE {
        self.iface
    }

    /// Check that the connected device is an MCP9808.
    ///
    /// Call once after the bus is up, before any other operation.
    ///
    /// # Errors
    ///
    /// `Error::IdentityMismatch` when the ID registers hold unexpected values,
    /// `Error::Bus` when the transaction fails
    pub fn initialize(&mut self) -> Result<(), Error<IFACE::Error>> {
        let manufacturer = self.manufacturer_id()?;
        let device = self.device_id()?;
        debug!(
            "manufacturer id {}, device id {}, revision {}",
            manufacturer,
            device.id(),
            device.revision()
        );

        if manufacturer != MANUFACTURER_ID || device.id() != DEVICE_ID {
            warn!("unexpected device: manufacturer {}, device {}", manufacturer, device.id());
            return Err(Error::IdentityMismatch {
                manufacturer,
                device: device.id(),
            });
        }

        Ok(())
    }

    /// Read manufacturer ID register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn manufacturer_id(&mut self) -> Result<u16, Error<IFACE::Error>> {
        Ok(u16::from_be_bytes(self.read(Register::ManufacturerId)?))
    }

    /// Read device ID register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn device_id(&mut self) -> Result<DeviceId, Error<IFACE::Error>> {
        Ok(DeviceId::from(u16::from_be_bytes(self.read(Register::DeviceId)?)))
    }

    /// Read ambient temperature register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn temperature(&mut self) -> Result<f32, Error<IFACE::Error>> {
        Ok(self.ambient()?.celsius())
    }

    /// Wait one conversion time at the configured resolution, then read the temperature.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn wait_for_temperature<DELAY: DelayNs>(&mut self, delay: &mut DELAY) -> Result<f32, Error<IFACE::Error>> {
        let resolution = self.resolution()?;
        delay.delay_ms(resolution.conversion_time_ms());
        self.temperature()
    }

    /// Read temperature and comparator flags from one snapshot of the temperature register.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn comparator_state(&mut self) -> Result<ComparatorState, Error<IFACE::Error>> {
        Ok(ComparatorState::from(self.ambient()?))
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn configuration(&mut self) -> Result<Configuration, Error<IFACE::Error>> {
        Ok(Configuration::from(u16::from_be_bytes(self.read(Register::Configuration)?)))
    }

    /// Read power mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn power_mode(&mut self) -> Result<PowerMode, Error<IFACE::Error>> {
        Ok(self.configuration()?.power_mode())
    }

    /// Set power mode. Not subject to the lock bits.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Error<IFACE::Error>> {
        let config = self.configuration()?.with_power_mode(mode);
        self.write_configuration(config)
    }

    /// Place device in Shutdown mode
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn shutdown(&mut self) -> Result<(), Error<IFACE::Error>> {
        self.set_power_mode(PowerMode::Shutdown)
    }

    /// Resume continuous conversions
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn wake_up(&mut self) -> Result<(), Error<IFACE::Error>> {
        self.set_power_mode(PowerMode::Normal)
    }

    /// Read alert hysteresis.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn hysteresis(&mut self) -> Result<Hysteresis, Error<IFACE::Error>> {
        Ok(self.configuration()?.hysteresis())
    }

    /// Set alert hysteresis.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration()?.with_hysteresis(hysteresis);
        self.write_configuration(config)
    }

    /// Whether the alert output is enabled.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn alert_enabled(&mut self) -> Result<bool, Error<IFACE::Error>> {
        Ok(self.configuration()?.alert_enable())
    }

    /// Enable or disable the alert output.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub fn set_alert_enable(&mut self, enable: bool) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration()?.with_alert_enable(enable);
        self.write_configuration(config)
    }

    /// Read alert output mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn alert_mode(&mut self) -> Result<AlertMode, Error<IFACE::Error>> {
        Ok(self.configuration()?.alert_mode())
    }

    /// Set alert output mode.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub fn set_alert_mode(&mut self, mode: AlertMode) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration()?.with_alert_mode(mode);
        self.write_configuration(config)
    }

    /// Read alert polarity.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn polarity(&mut self) -> Result<Polarity, Error<IFACE::Error>> {
        Ok(self.configuration()?.alert_polarity())
    }

    /// Set alert polarity.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub fn set_polarity(&mut self, polarity: Polarity) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration()?.with_alert_polarity(polarity);
        self.write_configuration(config)
    }

    /// Read which limits drive the alert output.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn alert_response(&mut self) -> Result<AlertResponse, Error<IFACE::Error>> {
        Ok(self.configuration()?.alert_response())
    }

    /// Select which limits drive the alert output.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub fn set_alert_response(&mut self, response: AlertResponse) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration()?.with_alert_response(response);
        self.write_configuration(config)
    }

    /// Read lock bits.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn lock(&mut self) -> Result<LockMode, Error<IFACE::Error>> {
        Ok(self.configuration()?.lock())
    }

    /// Set lock bits.
    ///
    /// This is one-way: once a lock bit is set, only a power cycle of the device clears it.
    /// Passing [`LockMode::Unlocked`] on a locked device leaves the lock in place.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn set_lock(&mut self, lock: LockMode) -> Result<(), Error<IFACE::Error>> {
        let config = self.configuration()?.with_lock(lock);
        self.write_configuration(config)
    }

    /// Clear a latched interrupt. The device ignores this in comparator mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn clear_interrupt(&mut self) -> Result<(), Error<IFACE::Error>> {
        let config = self.configuration()?.with_interrupt_clear(true);
        self.write_configuration(config)
    }

    /// Read all three alert limits.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn thresholds(&mut self) -> Result<Thresholds, Error<IFACE::Error>> {
        Ok(Thresholds {
            critical: self.critical_limit()?,
            upper: self.upper_limit()?,
            lower: self.lower_limit()?,
        })
    }

    /// Set all three alert limits.
    ///
    /// Nothing is written unless the device is unlocked, `critical >= upper` and
    /// `upper - lower >= 2.0`. The upper, lower and critical registers are then written in
    /// that order. The three writes are not atomic: a bus error part way leaves the earlier
    /// limits updated.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::InvalidParameter` when the limits are out of order, too close or out of range,
    /// `Error::Bus` when a transaction fails
    pub fn set_thresholds(&mut self, critical: f32, upper: f32, lower: f32) -> Result<(), Error<IFACE::Error>> {
        let lock = self.lock()?;
        if lock != LockMode::Unlocked {
            warn!("limits locked ({:?})", lock);
            return Err(Error::Locked(lock));
        }

        let [upper, lower, critical] = Thresholds::new(critical, upper, lower).encode()?;
        self.write(Register::UpperLimit, &upper)?;
        self.write(Register::LowerLimit, &lower)?;
        self.write(Register::CriticalLimit, &critical)
    }

    /// Read upper limit register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn upper_limit(&mut self) -> Result<f32, Error<IFACE::Error>> {
        self.limit(Register::UpperLimit)
    }

    /// Read lower limit register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn lower_limit(&mut self) -> Result<f32, Error<IFACE::Error>> {
        self.limit(Register::LowerLimit)
    }

    /// Read critical limit register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn critical_limit(&mut self) -> Result<f32, Error<IFACE::Error>> {
        self.limit(Register::CriticalLimit)
    }

    /// Read resolution register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn resolution(&mut self) -> Result<Resolution, Error<IFACE::Error>> {
        let mut byte = [0; 1];
        self.iface
            .read_register(Register::Resolution, &mut byte)
            .map_err(Error::Bus)?;
        Ok(ResolutionRegister::from(byte[0]).resolution())
    }

    /// Set resolution register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error<IFACE::Error>> {
        let mut reg = ResolutionRegister::from(0u8);
        reg.set_resolution(resolution);
        self.write(Register::Resolution, &[u8::from(reg)])
    }

    /// Configuration, or `Error::Locked` when either lock bit is set.
    fn unlocked_configuration(&mut self) -> Result<Configuration, Error<IFACE::Error>> {
        let config = self.configuration()?;
        if config.is_locked() {
            warn!("configuration locked ({:?})", config.lock());
            return Err(Error::Locked(config.lock()));
        }

        Ok(config)
    }

    fn write_configuration(&mut self, config: Configuration) -> Result<(), Error<IFACE::Error>> {
        self.write(Register::Configuration, &u16::from(config).to_be_bytes())
    }

    fn ambient(&mut self) -> Result<AmbientTemperature, Error<IFACE::Error>> {
        Ok(AmbientTemperature::from(u16::from_be_bytes(self.read(Register::Temperature)?)))
    }

    fn limit(&mut self, reg: Register) -> Result<f32, Error<IFACE::Error>> {
        Ok(Limit::from(u16::from_be_bytes(self.read(reg)?)).celsius())
    }

    fn read(&mut self, reg: Register) -> Result<[u8; 2], Error<IFACE::Error>> {
        let mut bytes = [0; 2];
        self.iface.read_register(reg, &mut bytes).map_err(Error::Bus)?;
        Ok(bytes)
    }

    fn write(&mut self, reg: Register, data: &[u8]) -> Result<(), Error<IFACE::Error>> {
        debug!("write {:?} {:?}", reg, data);
        self.iface.write_register(reg, data).map_err(Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    use super::*;
    use crate::ParameterError;

    const ADDR: u8 = 0x18;

    /// Unlocked register file that refuses every write after the first `fail_after`.
    struct FlakyInterface {
        writes: Vec<(Register, Vec<u8>)>,
        fail_after: usize,
    }

    impl RegisterInterface for FlakyInterface {
        type Error = ();

        fn read_register(&mut self, _reg: Register, buf: &mut [u8]) -> Result<(), Self::Error> {
            buf.fill(0);
            Ok(())
        }

        fn write_register(&mut self, reg: Register, data: &[u8]) -> Result<(), Self::Error> {
            if self.writes.len() == self.fail_after {
                return Err(());
            }
            self.writes.push((reg, data.to_vec()));
            Ok(())
        }
    }

    fn read(reg: u8, data: &[u8]) -> Transaction {
        Transaction::write_read(ADDR, vec![reg], data.to_vec())
    }

    fn write(reg: u8, data: &[u8]) -> [Transaction; 4] {
        [
            Transaction::transaction_start(ADDR),
            Transaction::write(ADDR, vec![reg]),
            Transaction::write(ADDR, data.to_vec()),
            Transaction::transaction_end(ADDR),
        ]
    }

    fn sensor(expectations: &[Transaction]) -> Mcp9808<I2cInterface<Mock>> {
        Mcp9808::new_blocking_with_default_address(Mock::new(expectations))
    }

    #[test]
    fn initialize_checks_identity() {
        let mut tmp = sensor(&[read(0x06, &[0x00, 0x54]), read(0x07, &[0x04, 0x00])]);
        assert!(tmp.initialize().is_ok());
        tmp.destroy().done();

        let mut tmp = sensor(&[read(0x06, &[0x00, 0x54]), read(0x07, &[0x75, 0x01])]);
        assert_eq!(
            tmp.initialize(),
            Err(Error::IdentityMismatch {
                manufacturer: 0x0054,
                device: 0x75
            })
        );
        tmp.destroy().done();

        let mut tmp = sensor(&[read(0x06, &[0x00, 0x41]), read(0x07, &[0x04, 0x00])]);
        assert!(matches!(
            tmp.initialize(),
            Err(Error::IdentityMismatch { manufacturer: 0x0041, .. })
        ));
        tmp.destroy().done();
    }

    #[test]
    fn read_temperature() {
        let expectations = [
            vec![read(0x05, &[0x01, 0x00])],
            vec![read(0x05, &[0x00, 0x50])],
            vec![read(0x05, &[0xc1, 0x94])],
            vec![read(0x05, &[0x1f, 0xf0])],
            vec![read(0x05, &[0x1e, 0x70])],
        ];
        let temps = [16.0, 5.0, 25.25, -1.0, -25.0];

        for (e, t) in expectations.iter().zip(temps.iter()) {
            let mut tmp = sensor(e);
            let temp = tmp.temperature().unwrap();
            assert_approx_eq!(temp, *t, 1e-4);
            tmp.destroy().done();
        }
    }

    #[test]
    fn wait_for_temperature_uses_resolution() {
        let expectations = [read(0x08, &[0x03]), read(0x05, &[0x01, 0x90])];

        let mut tmp = sensor(&expectations);
        let mut delay = NoopDelay::new();
        assert_approx_eq!(tmp.wait_for_temperature(&mut delay).unwrap(), 25.0, 1e-4);
        tmp.destroy().done();
    }

    #[test]
    fn comparator_state_from_single_read() {
        let expectations = [read(0x05, &[0xa1, 0x50])];

        let mut tmp = sensor(&expectations);
        let state = tmp.comparator_state().unwrap();
        assert!(state.above_critical);
        assert!(!state.above_upper);
        assert!(state.below_lower);
        assert_approx_eq!(state.temperature, 21.0, 1e-4);
        tmp.destroy().done();
    }

    #[test]
    fn set_thresholds_writes_upper_lower_critical() {
        let mut expectations = vec![read(0x01, &[0x00, 0x00])];
        expectations.extend(write(0x02, &[0x01, 0x90]));
        expectations.extend(write(0x03, &[0x01, 0x40]));
        expectations.extend(write(0x04, &[0x01, 0xe0]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.set_thresholds(30.0, 25.0, 20.0), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn set_thresholds_rejects_bad_ordering() {
        let expectations = [read(0x01, &[0x00, 0x00])];

        let mut tmp = sensor(&expectations);
        assert_eq!(
            tmp.set_thresholds(25.0, 30.0, 20.0),
            Err(Error::InvalidParameter(ParameterError::CriticalBelowUpper))
        );
        tmp.destroy().done();
    }

    #[test]
    fn set_thresholds_rejects_narrow_window() {
        let expectations = [read(0x01, &[0x00, 0x00])];

        let mut tmp = sensor(&expectations);
        assert_eq!(
            tmp.set_thresholds(30.0, 25.0, 24.0),
            Err(Error::InvalidParameter(ParameterError::WindowTooNarrow))
        );
        tmp.destroy().done();
    }

    #[test]
    fn set_thresholds_refused_while_locked() {
        let expectations = [read(0x01, &[0x00, 0x40])];

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.set_thresholds(30.0, 25.0, 20.0), Err(Error::Locked(LockMode::Window)));
        tmp.destroy().done();
    }

    #[test]
    fn set_thresholds_stops_at_bus_error() {
        let mut tmp = Mcp9808::with_interface(FlakyInterface {
            writes: Vec::new(),
            fail_after: 1,
        });
        assert_eq!(tmp.set_thresholds(30.0, 25.0, 20.0), Err(Error::Bus(())));

        let iface = tmp.release();
        assert_eq!(iface.writes, vec![(Register::UpperLimit, vec![0x01, 0x90])]);
    }

    #[test]
    fn read_thresholds() {
        let expectations = [
            read(0x04, &[0x01, 0xe0]),
            read(0x02, &[0x01, 0x94]),
            read(0x03, &[0x11, 0x48]),
        ];

        let mut tmp = sensor(&expectations);
        let limits = tmp.thresholds().unwrap();
        assert_approx_eq!(limits.critical, 30.0, 1e-4);
        assert_approx_eq!(limits.upper, 25.25, 1e-4);
        assert_approx_eq!(limits.lower, -20.5, 1e-4);
        tmp.destroy().done();
    }

    #[test]
    fn field_setters_refused_while_locked() {
        for lock in [[0x00, 0x40], [0x00, 0x80], [0x00, 0xc0]] {
            let expectations = vec![read(0x01, &lock); 5];

            let mut tmp = sensor(&expectations);
            assert!(matches!(tmp.set_hysteresis(Hysteresis::SixCelsius), Err(Error::Locked(_))));
            assert!(matches!(tmp.set_alert_enable(true), Err(Error::Locked(_))));
            assert!(matches!(tmp.set_alert_mode(AlertMode::Interrupt), Err(Error::Locked(_))));
            assert!(matches!(tmp.set_polarity(Polarity::ActiveHigh), Err(Error::Locked(_))));
            assert!(matches!(
                tmp.set_alert_response(AlertResponse::CriticalOnly),
                Err(Error::Locked(_))
            ));
            tmp.destroy().done();
        }
    }

    #[test]
    fn power_mode_ignores_lock() {
        let mut expectations = vec![read(0x01, &[0x00, 0xc0])];
        expectations.extend(write(0x01, &[0x01, 0xc0]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.shutdown(), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn hysteresis_preserves_other_fields() {
        let mut expectations = vec![read(0x01, &[0x07, 0x3f])];
        expectations.extend(write(0x01, &[0x03, 0x3f]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.set_hysteresis(Hysteresis::OnePointFiveCelsius), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn field_setters_touch_only_their_bits() {
        let mut expectations = vec![read(0x01, &[0x07, 0x3f])];
        expectations.extend(write(0x01, &[0x07, 0x3e]));
        expectations.push(read(0x01, &[0x07, 0x3f]));
        expectations.extend(write(0x01, &[0x07, 0x3d]));
        expectations.push(read(0x01, &[0x07, 0x3f]));
        expectations.extend(write(0x01, &[0x07, 0x3b]));
        expectations.push(read(0x01, &[0x07, 0x3f]));
        expectations.extend(write(0x01, &[0x07, 0x37]));
        expectations.push(read(0x01, &[0x07, 0x3f]));
        expectations.extend(write(0x01, &[0x06, 0x3f]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.set_alert_mode(AlertMode::Comparator), Ok(()));
        assert_eq!(tmp.set_polarity(Polarity::ActiveLow), Ok(()));
        assert_eq!(tmp.set_alert_response(AlertResponse::UpperLowerCritical), Ok(()));
        assert_eq!(tmp.set_alert_enable(false), Ok(()));
        assert_eq!(tmp.wake_up(), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn raw_codes_rejected_before_bus_traffic() {
        let mut tmp = sensor(&[]);
        let result = Hysteresis::try_from(0x06u8)
            .map_err(Error::from)
            .and_then(|h| tmp.set_hysteresis(h));
        assert_eq!(result, Err(Error::InvalidParameter(ParameterError::InvalidCode(0x06))));
        tmp.destroy().done();
    }

    #[test]
    fn getters_decode_configuration() {
        let expectations = vec![read(0x01, &[0x05, 0x4b]); 7];

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.power_mode(), Ok(PowerMode::Shutdown));
        assert_eq!(tmp.hysteresis(), Ok(Hysteresis::ThreeCelsius));
        assert_eq!(tmp.alert_enabled(), Ok(true));
        assert_eq!(tmp.alert_mode(), Ok(AlertMode::Interrupt));
        assert_eq!(tmp.polarity(), Ok(Polarity::ActiveHigh));
        assert_eq!(tmp.alert_response(), Ok(AlertResponse::UpperLowerCritical));
        assert_eq!(tmp.lock(), Ok(LockMode::Window));
        tmp.destroy().done();
    }

    #[test]
    fn lock_is_set_without_gate() {
        let mut expectations = vec![read(0x01, &[0x00, 0x48])];
        expectations.extend(write(0x01, &[0x00, 0xc8]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.set_lock(LockMode::Both), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn clear_interrupt_pulses_bit() {
        let mut expectations = vec![read(0x01, &[0x00, 0x09])];
        expectations.extend(write(0x01, &[0x00, 0x29]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.clear_interrupt(), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn read_write_resolution() {
        let mut expectations = vec![read(0x08, &[0x01])];
        expectations.extend(write(0x08, &[0x02]));

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.resolution(), Ok(Resolution::QuarterCelsius));
        assert_eq!(tmp.set_resolution(Resolution::EighthCelsius), Ok(()));
        tmp.destroy().done();
    }

    #[test]
    fn bus_errors_propagate() {
        let expectations = [read(0x05, &[0x00, 0x00]).with_error(ErrorKind::Other)];

        let mut tmp = sensor(&expectations);
        assert_eq!(tmp.temperature(), Err(Error::Bus(ErrorKind::Other)));
        tmp.destroy().done();
    }
}
