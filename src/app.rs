//! Continuous GPS fix application
//!
//! `setup` brings the SDK subsystems up in order and arms a fix session
//! whose callback prints every fix event; `run_once` is one pass of the
//! user loop.

use crate::api::callback::ReportDispatcher;
use crate::api::types::{ApiError, ApiResult};
use crate::hardware::{
    Accelerometer, FixEngine, FlashStore, HardwareError, SensorSubsystem, UartStream,
};
use crate::utils::config::AppConfig;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// SDK subsystems driven by the application
pub struct Peripherals {
    pub uart: UartStream,
    pub flash: Box<dyn FlashStore>,
    pub sensor: Box<dyn SensorSubsystem>,
    pub accelerometer: Box<dyn Accelerometer>,
    pub engine: Box<dyn FixEngine>,
}

pub struct GeolocApp {
    config: AppConfig,
    uart: Rc<RefCell<UartStream>>,
    flash: Box<dyn FlashStore>,
    sensor: Box<dyn SensorSubsystem>,
    accelerometer: Box<dyn Accelerometer>,
    engine: Box<dyn FixEngine>,
    reports_emitted: Option<Rc<Cell<u32>>>,
    iterations: u64,
}

impl GeolocApp {
    pub fn new(config: AppConfig, peripherals: Peripherals) -> Self {
        Self {
            config,
            uart: Rc::new(RefCell::new(peripherals.uart)),
            flash: peripherals.flash,
            sensor: peripherals.sensor,
            accelerometer: peripherals.accelerometer,
            engine: peripherals.engine,
            reports_emitted: None,
            iterations: 0,
        }
    }

    /// User setup: open the stream, reset flash, init subsystems, start fixing
    pub fn setup(&mut self) -> ApiResult<()> {
        if self.is_initialized() {
            return Err(HardwareError::SessionActive.into());
        }
        self.config.check()?;

        self.uart.borrow_mut().open(&self.config.uart)?;

        if self.config.reset_flash_variables {
            self.flash.delete_variables()?;
            log::info!("flash variables reset");
        }

        self.sensor.init(self.config.sensor_mode)?;
        self.engine.init()?;
        self.accelerometer.init()?;

        let dispatcher = ReportDispatcher::new(&self.config.report, Rc::clone(&self.uart));
        let counter = dispatcher.counter();
        self.engine.try_to_fix(
            self.config.fix_mode,
            self.config.fix_timeout,
            dispatcher.into_callback(),
        )?;
        self.reports_emitted = Some(counter);

        log::info!(
            "fix session started: mode={} timeout={:?}",
            self.config.fix_mode,
            self.config.fix_timeout
        );
        Ok(())
    }

    /// User loop: process sensor events, then GPS events
    pub fn run_once(&mut self) -> ApiResult<()> {
        if self.reports_emitted.is_none() {
            return Err(ApiError::NotInitialized);
        }

        self.sensor.process()?;
        self.engine.process()?;
        self.iterations += 1;
        Ok(())
    }

    /// Run `passes` loop passes, skipping passes that fail recoverably
    pub fn run(&mut self, passes: u64, interval: Duration) -> ApiResult<()> {
        for _ in 0..passes {
            match self.run_once() {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => log::warn!("loop pass skipped: {}", e),
                Err(e) => {
                    log::error!("loop pass failed: {}", e);
                    return Err(e);
                }
            }
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.reports_emitted.is_some()
    }

    /// Whether the fix session is still armed
    pub fn is_fixing(&self) -> bool {
        self.engine.is_active()
    }

    pub fn reports_emitted(&self) -> u32 {
        self.reports_emitted.as_ref().map_or(0, |counter| counter.get())
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{LineEnding, ReportFormat};
    use crate::core::{DateTime, FixLevel, FixPosition, FixResult, SatChannel, Satellites};
    use crate::hardware::mock::{call_log, CallLog};
    use crate::hardware::{
        FixMode, FixTimeout, HwResult, MockAccelerometer, MockFixEngine, MockFlash, MockSensor,
        SensorMode, SharedBuffer,
    };

    fn build_app(config: AppConfig, script: Vec<FixResult>) -> (GeolocApp, SharedBuffer, CallLog) {
        let buffer = SharedBuffer::new();
        let log = call_log();
        let peripherals = Peripherals {
            uart: UartStream::new(Box::new(buffer.clone())),
            flash: Box::new(MockFlash::new().with_log(Rc::clone(&log))),
            sensor: Box::new(MockSensor::new().with_log(Rc::clone(&log))),
            accelerometer: Box::new(MockAccelerometer::new().with_log(Rc::clone(&log))),
            engine: Box::new(MockFixEngine::new(script).with_log(Rc::clone(&log))),
        };
        (GeolocApp::new(config, peripherals), buffer, log)
    }

    fn fix_sequence() -> Vec<FixResult> {
        let datetime = DateTime::new(2026, 10, 17, 14, 3, 59);
        let satellites = Satellites::new(
            4,
            vec![
                SatChannel::new(2, 7, true),
                SatChannel::new(5, 5, false),
                SatChannel::new(9, 7, true),
            ],
        );
        vec![
            FixResult::new(FixLevel::None).with_duration(1),
            FixResult::new(FixLevel::Date).with_datetime(datetime).with_duration(12),
            FixResult::new(FixLevel::Fix3D)
                .with_datetime(datetime)
                .with_position(FixPosition::new(436046000, 14442000, 146))
                .with_speed(3)
                .with_duration(41)
                .with_satellites(satellites),
        ]
    }

    #[test]
    fn test_loop_before_setup() {
        let (mut app, _, _) = build_app(AppConfig::default(), Vec::new());
        assert!(matches!(app.run_once(), Err(ApiError::NotInitialized)));
        assert!(!app.is_initialized());
    }

    #[test]
    fn test_setup_order() {
        let (mut app, _, log) = build_app(AppConfig::default(), Vec::new());
        app.setup().unwrap();

        assert!(app.is_initialized());
        assert!(app.is_fixing());
        assert_eq!(
            *log.borrow(),
            vec![
                "flash.delete_variables",
                "sensor.init",
                "geoloc.init",
                "accelero.init",
                "geoloc.try_to_fix",
            ]
        );
    }

    #[test]
    fn test_setup_skips_flash_reset() {
        let mut config = AppConfig::default();
        config.reset_flash_variables = false;
        let (mut app, _, log) = build_app(config, Vec::new());
        app.setup().unwrap();

        assert!(!log.borrow().iter().any(|call| call == "flash.delete_variables"));
    }

    #[test]
    fn test_setup_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.uart.baud_rate = 1;
        let (mut app, _, log) = build_app(config, Vec::new());

        assert!(matches!(app.setup(), Err(ApiError::ConfigurationError { .. })));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_loop_processes_sensor_then_gps() {
        let (mut app, _, log) = build_app(AppConfig::default(), Vec::new());
        app.setup().unwrap();
        log.borrow_mut().clear();

        app.run_once().unwrap();
        app.run_once().unwrap();

        assert_eq!(app.iterations(), 2);
        assert_eq!(
            *log.borrow(),
            vec!["sensor.process", "geoloc.process", "sensor.process", "geoloc.process"]
        );
    }

    #[test]
    fn test_continuous_fix_reports() {
        let (mut app, buffer, _) = build_app(AppConfig::default(), fix_sequence());
        app.setup().unwrap();

        for _ in 0..5 {
            app.run_once().unwrap();
        }

        assert_eq!(app.reports_emitted(), 3);
        assert!(app.is_fixing());

        let expected = "Elapsed: 1 s\r\n\
                        Usable Sats = 0  -  Ephemeris av. = 0  - Ephemeris Downloading 0\r\n\r\n\
                        Time (HH:MM:SS): 14:03:59\r\n\
                        Date (DD/MM/YYYY): 17/10/2026\r\n\
                        Elapsed: 12 s\r\n\
                        Usable Sats = 0  -  Ephemeris av. = 0  - Ephemeris Downloading 0\r\n\r\n\
                        Time (HH:MM:SS): 14:03:59\r\n\
                        Date (DD/MM/YYYY): 17/10/2026\r\n\
                        Position:   43.6046000°N     1.4442000°E\r\n\
                        Speed: 3 km/h\r\n\
                        Altitude: 146 m\r\n\
                        Elapsed: 41 s\r\n\
                        Usable Sats = 4  -  Ephemeris av. = 2  - Ephemeris Downloading 1\r\n\r\n";
        assert_eq!(buffer.contents(), expected);
    }

    #[test]
    fn test_timed_out_session_reports_partial_fix() {
        let mut config = AppConfig::default();
        config.fix_timeout = FixTimeout::Seconds(10);
        config.report = crate::utils::config::ReportConfig {
            format: ReportFormat::Text,
            line_ending: LineEnding::Lf,
        };
        let (mut app, buffer, _) = build_app(config, fix_sequence());
        app.setup().unwrap();

        for _ in 0..4 {
            app.run_once().unwrap();
        }

        assert_eq!(app.reports_emitted(), 2);
        assert!(!app.is_fixing());
        assert!(buffer.contents().contains("Date (DD/MM/YYYY): 17/10/2026\nElapsed: 12 s\n"));
        assert!(!buffer.contents().contains("Position"));
    }

    #[test]
    fn test_json_reports() {
        let mut config = AppConfig::default();
        config.report.format = ReportFormat::Json;
        config.report.line_ending = LineEnding::Lf;
        let (mut app, buffer, _) = build_app(config, fix_sequence());
        app.setup().unwrap();

        for _ in 0..3 {
            app.run_once().unwrap();
        }

        let documents: Vec<serde_json::Value> = buffer
            .contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0]["level"], "none");
        assert_eq!(documents[2]["altitude_m"], 146);
        assert_eq!(documents[2]["ephemeris"]["downloading"], 1);
    }

    #[test]
    fn test_second_setup_rejected() {
        let mut config = AppConfig::default();
        config.fix_mode = FixMode::HardwareBackup;
        let (mut app, _, log) = build_app(config, Vec::new());
        app.setup().unwrap();
        log.borrow_mut().clear();

        let result = app.setup();
        assert!(matches!(
            result,
            Err(ApiError::HardwareError { error: HardwareError::SessionActive })
        ));
        assert!(log.borrow().is_empty());
        assert!(app.is_fixing());
    }

    /// Sensor whose first `failures` process calls return `error`
    struct FailingSensor {
        error: HardwareError,
        failures: u32,
    }

    impl SensorSubsystem for FailingSensor {
        fn init(&mut self, _mode: SensorMode) -> HwResult<()> {
            Ok(())
        }

        fn process(&mut self) -> HwResult<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(self.error.clone());
            }
            Ok(())
        }
    }

    fn app_with_sensor(sensor: FailingSensor) -> (GeolocApp, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let peripherals = Peripherals {
            uart: UartStream::new(Box::new(buffer.clone())),
            flash: Box::new(MockFlash::new()),
            sensor: Box::new(sensor),
            accelerometer: Box::new(MockAccelerometer::new()),
            engine: Box::new(MockFixEngine::new(fix_sequence())),
        };
        (GeolocApp::new(AppConfig::default(), peripherals), buffer)
    }

    #[test]
    fn test_run_skips_recoverable_errors() {
        let (mut app, _) = app_with_sensor(FailingSensor {
            error: HardwareError::Io {
                message: "radio busy".to_string(),
            },
            failures: 2,
        });
        app.setup().unwrap();

        app.run(5, Duration::ZERO).unwrap();

        assert_eq!(app.iterations(), 3);
        assert_eq!(app.reports_emitted(), 3);
    }

    #[test]
    fn test_run_stops_on_fatal_error() {
        let (mut app, _) = app_with_sensor(FailingSensor {
            error: HardwareError::NotInitialized {
                subsystem: "sensor".to_string(),
            },
            failures: 1,
        });
        app.setup().unwrap();

        let result = app.run(5, Duration::ZERO);
        assert!(matches!(
            result,
            Err(ApiError::HardwareError { error: HardwareError::NotInitialized { .. } })
        ));
        assert_eq!(app.iterations(), 0);
        assert_eq!(app.reports_emitted(), 0);
    }

    #[test]
    fn test_run_before_setup() {
        let (mut app, _) = app_with_sensor(FailingSensor {
            error: HardwareError::StreamClosed,
            failures: 0,
        });
        assert!(matches!(app.run(1, Duration::ZERO), Err(ApiError::NotInitialized)));
    }
}
