//! Mcp9808 Async API

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

use super::{
    Address, AlertMode, AlertResponse, AmbientTemperature, AsyncRegisterInterface, ComparatorState, Configuration,
    DeviceId, Error, Hysteresis, I2cInterface, Limit, LockMode, ParameterError, Polarity, PowerMode, Register,
    Resolution, ResolutionRegister, Thresholds, DEVICE_ID, MANUFACTURER_ID,
};

/// MCP9808 asynchronous device driver
///
/// Same policy as [`crate::blocking::Mcp9808`]: no caching, one transaction awaited at a time.
pub struct Mcp9808<IFACE> {
    /// The register transport
    iface: IFACE,
}

impl<I2C: embedded_hal_async::i2c::I2c> Mcp9808<I2cInterface<I2C>> {
    /// Create a new MCP9808 instance on an I2C bus.
    pub fn new_async(i2c: I2C, address: Address) -> Self {
        Self::with_interface(I2cInterface::new(i2c, address))
    }

    /// Create a new MCP9808 instance with A2, A1 and A0 tied to GND, resulting in an
    /// instance responding to address `0x18`.
    pub fn new_async_with_default_address(i2c: I2C) -> Self {
        Self::new_async(i2c, Address::default())
    }

    /// Destroy the driver instance, return the I2C bus instance.
    pub fn destroy(self) -> I2C {
        self.iface.destroy()
    }
}

impl<IFACE: AsyncRegisterInterface> Mcp9808<IFACE> {
    /// Create a new MCP9808 instance over any register transport.
    pub fn with_interface(iface: IFACE) -> Self {
        Self { iface }
    }

    /// Destroy the driver instance, return the register transport.
    pub fn release(self) -> IFACE {
        self.iface
    }

    /// Pair the driver with the pin wired to ALERT.
    pub fn into_alert<ALERT: Wait>(self, alert: ALERT) -> AlertMcp9808<IFACE, ALERT> {
        AlertMcp9808::new(self, alert)
    }

    /// Check that the connected device is an MCP9808.
    ///
    /// # Errors
    ///
    /// `Error::IdentityMismatch` when the ID registers hold unexpected values,
    /// `Error::Bus` when the transaction fails
    pub async fn initialize(&mut self) -> Result<(), Error<IFACE::Error>> {
        let manufacturer = self.manufacturer_id().await?;
        let device = self.device_id().await?;
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
    pub async fn manufacturer_id(&mut self) -> Result<u16, Error<IFACE::Error>> {
        Ok(u16::from_be_bytes(self.read(Register::ManufacturerId).await?))
    }

    /// Read device ID register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn device_id(&mut self) -> Result<DeviceId, Error<IFACE::Error>> {
        Ok(DeviceId::from(u16::from_be_bytes(self.read(Register::DeviceId).await?)))
    }

    /// Read ambient temperature register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn temperature(&mut self) -> Result<f32, Error<IFACE::Error>> {
        Ok(self.ambient().await?.celsius())
    }

    /// Wait one conversion time at the configured resolution, then read the temperature.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn wait_for_temperature<DELAY: DelayNs>(
        &mut self,
        delay: &mut DELAY,
    ) -> Result<f32, Error<IFACE::Error>> {
        let resolution = self.resolution().await?;
        delay.delay_ms(resolution.conversion_time_ms()).await;
        self.temperature().await
    }

    /// Read temperature and comparator flags from one snapshot of the temperature register.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn comparator_state(&mut self) -> Result<ComparatorState, Error<IFACE::Error>> {
        Ok(ComparatorState::from(self.ambient().await?))
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn configuration(&mut self) -> Result<Configuration, Error<IFACE::Error>> {
        Ok(Configuration::from(u16::from_be_bytes(
            self.read(Register::Configuration).await?,
        )))
    }

    /// Read power mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn power_mode(&mut self) -> Result<PowerMode, Error<IFACE::Error>> {
        Ok(self.configuration().await?.power_mode())
    }

    /// Set power mode. Not subject to the lock bits.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Error<IFACE::Error>> {
        let config = self.configuration().await?.with_power_mode(mode);
        self.write_configuration(config).await
    }

    /// Place device in Shutdown mode
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn shutdown(&mut self) -> Result<(), Error<IFACE::Error>> {
        self.set_power_mode(PowerMode::Shutdown).await
    }

    /// Resume continuous conversions
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn wake_up(&mut self) -> Result<(), Error<IFACE::Error>> {
        self.set_power_mode(PowerMode::Normal).await
    }

    /// Read alert hysteresis.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn hysteresis(&mut self) -> Result<Hysteresis, Error<IFACE::Error>> {
        Ok(self.configuration().await?.hysteresis())
    }

    /// Set alert hysteresis.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub async fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration().await?.with_hysteresis(hysteresis);
        self.write_configuration(config).await
    }

    /// Whether the alert output is enabled.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn alert_enabled(&mut self) -> Result<bool, Error<IFACE::Error>> {
        Ok(self.configuration().await?.alert_enable())
    }

    /// Enable or disable the alert output.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub async fn set_alert_enable(&mut self, enable: bool) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration().await?.with_alert_enable(enable);
        self.write_configuration(config).await
    }

    /// Read alert output mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn alert_mode(&mut self) -> Result<AlertMode, Error<IFACE::Error>> {
        Ok(self.configuration().await?.alert_mode())
    }

    /// Set alert output mode.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub async fn set_alert_mode(&mut self, mode: AlertMode) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration().await?.with_alert_mode(mode);
        self.write_configuration(config).await
    }

    /// Read alert polarity.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn polarity(&mut self) -> Result<Polarity, Error<IFACE::Error>> {
        Ok(self.configuration().await?.alert_polarity())
    }

    /// Set alert polarity.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub async fn set_polarity(&mut self, polarity: Polarity) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration().await?.with_alert_polarity(polarity);
        self.write_configuration(config).await
    }

    /// Read which limits drive the alert output.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn alert_response(&mut self) -> Result<AlertResponse, Error<IFACE::Error>> {
        Ok(self.configuration().await?.alert_response())
    }

    /// Select which limits drive the alert output.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::Bus` when the transaction fails
    pub async fn set_alert_response(&mut self, response: AlertResponse) -> Result<(), Error<IFACE::Error>> {
        let config = self.unlocked_configuration().await?.with_alert_response(response);
        self.write_configuration(config).await
    }

    /// Read lock bits.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn lock(&mut self) -> Result<LockMode, Error<IFACE::Error>> {
        Ok(self.configuration().await?.lock())
    }

    /// Set lock bits. Only a power cycle of the device clears them again.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn set_lock(&mut self, lock: LockMode) -> Result<(), Error<IFACE::Error>> {
        let config = self.configuration().await?.with_lock(lock);
        self.write_configuration(config).await
    }

    /// Clear a latched interrupt. The device ignores this in comparator mode.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn clear_interrupt(&mut self) -> Result<(), Error<IFACE::Error>> {
        let config = self.configuration().await?.with_interrupt_clear(true);
        self.write_configuration(config).await
    }

    /// Read all three alert limits.
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn thresholds(&mut self) -> Result<Thresholds, Error<IFACE::Error>> {
        Ok(Thresholds {
            critical: self.critical_limit().await?,
            upper: self.upper_limit().await?,
            lower: self.lower_limit().await?,
        })
    }

    /// Set all three alert limits.
    ///
    /// Validated up front like [`crate::blocking::Mcp9808::set_thresholds`], then written in
    /// the order upper, lower, critical.
    ///
    /// # Errors
    ///
    /// `Error::Locked` when a lock bit is set,
    /// `Error::InvalidParameter` when the limits are out of order, too close or out of range,
    /// `Error::Bus` when a transaction fails
    pub async fn set_thresholds(&mut self, critical: f32, upper: f32, lower: f32) -> Result<(), Error<IFACE::Error>> {
        let lock = self.lock().await?;
        if lock != LockMode::Unlocked {
            warn!("limits locked ({:?})", lock);
            return Err(Error::Locked(lock));
        }

        let [upper, lower, critical] = Thresholds::new(critical, upper, lower).encode()?;
        self.write(Register::UpperLimit, &upper).await?;
        self.write(Register::LowerLimit, &lower).await?;
        self.write(Register::CriticalLimit, &critical).await
    }

    /// Read upper limit register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn upper_limit(&mut self) -> Result<f32, Error<IFACE::Error>> {
        self.limit(Register::UpperLimit).await
    }

    /// Read lower limit register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn lower_limit(&mut self) -> Result<f32, Error<IFACE::Error>> {
        self.limit(Register::LowerLimit).await
    }

    /// Read critical limit register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn critical_limit(&mut self) -> Result<f32, Error<IFACE::Error>> {
        self.limit(Register::CriticalLimit).await
    }

    /// Read resolution register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn resolution(&mut self) -> Result<Resolution, Error<IFACE::Error>> {
        let mut byte = [0; 1];
        self.iface
            .read_register(Register::Resolution, &mut byte)
            .await
            .map_err(Error::Bus)?;
        Ok(ResolutionRegister::from(byte[0]).resolution())
    }

    /// Set resolution register
    ///
    /// # Errors
    ///
    /// `Error::Bus` when the transaction fails
    pub async fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error<IFACE::Error>> {
        let mut reg = ResolutionRegister::from(0u8);
        reg.set_resolution(resolution);
        self.write(Register::Resolution, &[u8::from(reg)]).await
    }

    /// Configuration, or `Error::Locked` when either lock bit is set.
    async fn unlocked_configuration(&mut self) -> Result<Configuration, Error<IFACE::Error>> {
        let config = self.configuration().await?;
        if config.is_locked() {
            warn!("configuration locked ({:?})", config.lock());
            return Err(Error::Locked(config.lock()));
        }

        Ok(config)
    }

    async fn write_configuration(&mut self, config: Configuration) -> Result<(), Error<IFACE::Error>> {
        self.write(Register::Configuration, &u16::from(config).to_be_bytes())
            .await
    }

    async fn ambient(&mut self) -> Result<AmbientTemperature, Error<IFACE::Error>> {
        Ok(AmbientTemperature::from(u16::from_be_bytes(
            self.read(Register::Temperature).await?,
        )))
    }

    async fn limit(&mut self, reg: Register) -> Result<f32, Error<IFACE::Error>> {
        Ok(Limit::from(u16::from_be_bytes(self.read(reg).await?)).celsius())
    }

    async fn read(&mut self, reg: Register) -> Result<[u8; 2], Error<IFACE::Error>> {
        let mut bytes = [0; 2];
        self.iface
            .read_register(reg, &mut bytes)
            .await
            .map_err(Error::Bus)?;
        Ok(bytes)
    }

    async fn write(&mut self, reg: Register, data: &[u8]) -> Result<(), Error<IFACE::Error>> {
        debug!("write {:?} {:?}", reg, data);
        self.iface.write_register(reg, data).await.map_err(Error::Bus)
    }
}

/// MCP9808 asynchronous device driver (with alert pin)
pub struct AlertMcp9808<IFACE, ALERT> {
    /// Underlying MCP9808 sensor.
    pub mcp9808: Mcp9808<IFACE>,
    alert: ALERT,
}

impl<I2C: embedded_hal_async::i2c::I2c, ALERT: Wait> AlertMcp9808<I2cInterface<I2C>, ALERT> {
    /// Destroy the driver instance, return the I2C bus instance and ALERT pin instance.
    pub fn destroy(self) -> (I2C, ALERT) {
        (self.mcp9808.destroy(), self.alert)
    }
}

impl<IFACE: AsyncRegisterInterface, ALERT: Wait> AlertMcp9808<IFACE, ALERT> {
    /// Create a new ALERTMCP9808 instance.
    pub fn new(mcp9808: Mcp9808<IFACE>, alert: ALERT) -> Self {
        Self { mcp9808, alert }
    }

    /// Split into the driver and the ALERT pin.
    pub fn release(self) -> (Mcp9808<IFACE>, ALERT) {
        (self.mcp9808, self.alert)
    }

    /// Wait until the ALERT output asserts, then report which limits are crossed.
    ///
    /// In comparator mode the pin stays asserted while the temperature is outside the
    /// window, so calling this in a loop returns again immediately until the temperature
    /// recovers past the hysteresis. In interrupt mode the latched interrupt is cleared after
    /// the snapshot is taken, so the next call waits for a new event.
    ///
    /// # Errors
    ///
    /// `ParameterError::AlertDisabled` when the alert output is off,
    /// `Error::AlertPin` when waiting on the pin fails,
    /// `Error::Bus` when a transaction fails
    pub async fn wait_for_alert(&mut self) -> Result<ComparatorState, Error<IFACE::Error>> {
        let config = self.mcp9808.configuration().await?;
        if !config.alert_enable() {
            return Err(ParameterError::AlertDisabled.into());
        }

        match (config.alert_mode(), config.alert_polarity()) {
            (AlertMode::Comparator, Polarity::ActiveLow) => {
                self.alert.wait_for_low().await.map_err(|_| Error::AlertPin)?;
            }
            (AlertMode::Comparator, Polarity::ActiveHigh) => {
                self.alert.wait_for_high().await.map_err(|_| Error::AlertPin)?;
            }
            (AlertMode::Interrupt, Polarity::ActiveLow) => {
                self.alert.wait_for_falling_edge().await.map_err(|_| Error::AlertPin)?;
            }
            (AlertMode::Interrupt, Polarity::ActiveHigh) => {
                self.alert.wait_for_rising_edge().await.map_err(|_| Error::AlertPin)?;
            }
        }

        let state = self.mcp9808.comparator_state().await?;
        debug!("alert: {}", state);

        if config.alert_mode() == AlertMode::Interrupt {
            self.mcp9808.clear_interrupt().await?;
        }

        Ok(state)
    }
}
