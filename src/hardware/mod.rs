//! Hardware abstraction layer for the radio module SDK
//!
//! The fix engine, sensor transport, accelerometer and flash store are
//! vendor subsystems; this module exposes them as traits so the
//! application can be driven by real bindings or by the mocks.

pub mod engine;
pub mod peripherals;
pub mod uart;
pub mod mock;
pub mod error;

pub use engine::{FixCallback, FixEngine, FixMode, FixTimeout};
pub use peripherals::{Accelerometer, FlashStore, SensorMode, SensorSubsystem};
pub use uart::{Parity, UartOptions, UartStream};
pub use mock::{MockAccelerometer, MockFixEngine, MockFlash, MockSensor, SharedBuffer};
pub use error::{HardwareError, HwResult};
