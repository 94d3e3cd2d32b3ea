//! Register access capability the drivers are built on.
//!
//! The drivers only ever need to read or write a whole register, so that is all the traits
//! ask for. [`I2cInterface`] implements them over the `embedded-hal` I2C traits; any other
//! transport (a bridge chip, a simulated device) can implement them directly.

use embedded_hal::i2c::Operation;

use crate::{Address, Register};

/// Blocking register access.
pub trait RegisterInterface {
    /// Transport error.
    type Error;

    /// Fill `buf` with the contents of `reg`, most significant byte first.
    ///
    /// # Errors
    ///
    /// `Self::Error` when the transport fails
    fn read_register(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` into `reg`, most significant byte first.
    ///
    /// # Errors
    ///
    /// `Self::Error` when the transport fails
    fn write_register(&mut self, reg: Register, data: &[u8]) -> Result<(), Self::Error>;
}

/// Async register access.
#[cfg(feature = "async")]
#[allow(async_fn_in_trait)]
pub trait AsyncRegisterInterface {
    /// Transport error.
    type Error;

    /// Fill `buf` with the contents of `reg`, most significant byte first.
    ///
    /// # Errors
    ///
    /// `Self::Error` when the transport fails
    async fn read_register(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` into `reg`, most significant byte first.
    ///
    /// # Errors
    ///
    /// `Self::Error` when the transport fails
    async fn write_register(&mut self, reg: Register, data: &[u8]) -> Result<(), Self::Error>;
}

/// Register access over I2C.
///
/// Reads set the register pointer and read back with a repeated start. Writes send the pointer
/// and the payload in one transaction without a repeated start in between.
pub struct I2cInterface<I2C> {
    /// The concrete I2C bus implementation
    i2c: I2C,

    /// The I2C address.
    pub(crate) addr: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Wrap an I2C bus for the device at `address`.
    pub fn new(i2c: I2C, address: Address) -> Self {
        Self {
            i2c,
            addr: address.into(),
        }
    }

    /// The 7-bit device address in use.
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Destroy the interface, return the I2C bus instance.
    pub fn destroy(self) -> I2C {
        self.i2c
    }
}

impl<I2C: embedded_hal::i2c::I2c> RegisterInterface for I2cInterface<I2C> {
    type Error = I2C::Error;

    fn read_register(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.addr, &[reg.into()], buf)
    }

    fn write_register(&mut self, reg: Register, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c
            .transaction(self.addr, &mut [Operation::Write(&[reg.into()]), Operation::Write(data)])
    }
}

#[cfg(feature = "async")]
impl<I2C: embedded_hal_async::i2c::I2c> AsyncRegisterInterface for I2cInterface<I2C> {
    type Error = I2C::Error;

    async fn read_register(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.addr, &[reg.into()], buf).await
    }

    async fn write_register(&mut self, reg: Register, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c
            .transaction(self.addr, &mut [Operation::Write(&[reg.into()]), Operation::Write(data)])
            .await
    }
}
