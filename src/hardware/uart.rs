//! UART output stream used as the report sink

use crate::hardware::{HardwareError, HwResult};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Standard baud rates accepted by the LEUART/USART peripherals
pub const SUPPORTED_BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    #[serde(rename = "N")]
    None,
    #[serde(rename = "E")]
    Even,
    #[serde(rename = "O")]
    Odd,
}

impl Parity {
    pub fn as_char(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        }
    }
}

/// UART configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UartOptions {
    /// Peripheral name
    pub device: String,
    /// Pin routing location
    pub location: u8,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    /// Hardware flow control
    pub flow_control: bool,
}

impl Default for UartOptions {
    fn default() -> Self {
        Self {
            device: "LEUART0".to_string(),
            location: 0,
            baud_rate: 9600,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: false,
        }
    }
}

impl UartOptions {
    /// Validate the options against what the peripheral supports
    pub fn validate(&self) -> HwResult<()> {
        if self.device.is_empty() {
            return Err(HardwareError::InvalidUartOptions {
                parameter: "device".to_string(),
                value: "<empty>".to_string(),
            });
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(HardwareError::InvalidUartOptions {
                parameter: "baud_rate".to_string(),
                value: self.baud_rate.to_string(),
            });
        }

        if !(7..=9).contains(&self.data_bits) {
            return Err(HardwareError::InvalidUartOptions {
                parameter: "data_bits".to_string(),
                value: self.data_bits.to_string(),
            });
        }

        if self.stop_bits != 1 && self.stop_bits != 2 {
            return Err(HardwareError::InvalidUartOptions {
                parameter: "stop_bits".to_string(),
                value: self.stop_bits.to_string(),
            });
        }

        Ok(())
    }
}

/// Write-only character stream over a UART
///
/// On the host the "wire" is any `std::io::Write`, typically stdout or a
/// buffer in tests.
pub struct UartStream {
    options: UartOptions,
    writer: Box<dyn Write>,
    open: bool,
    bytes_written: usize,
}

impl UartStream {
    /// Wrap a writer; the stream stays closed until `open`
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            options: UartOptions::default(),
            writer,
            open: false,
            bytes_written: 0,
        }
    }

    /// Open the stream with the given options
    pub fn open(&mut self, options: &UartOptions) -> HwResult<()> {
        options.validate()?;
        self.options = options.clone();
        self.open = true;
        log::info!(
            "UART {} open at {} baud, {}{}{}",
            options.device,
            options.baud_rate,
            options.data_bits,
            options.parity.as_char(),
            options.stop_bits
        );
        Ok(())
    }

    /// Write a block of text in one go and flush it
    pub fn write_str(&mut self, text: &str) -> HwResult<()> {
        if !self.open {
            return Err(HardwareError::StreamClosed);
        }
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        self.bytes_written += text.len();
        Ok(())
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn options(&self) -> &UartOptions {
        &self.options
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}
