//! Mock hardware for testing and host-side replay

use crate::core::{FixLevel, FixResult, MAX_QUALITY_INDICATOR};
use crate::hardware::{
    Accelerometer, FixCallback, FixEngine, FixMode, FixTimeout, FlashStore, HardwareError,
    HwResult, SensorMode, SensorSubsystem,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

/// Shared record of calls made on the mocks, in order
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(log: &Option<CallLog>, call: &str) {
    if let Some(log) = log {
        log.borrow_mut().push(call.to_string());
    }
}

/// In-memory writer whose contents stay readable after it is boxed
#[derive(Clone, Default)]
pub struct SharedBuffer {
    data: Rc<RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Flash store keeping variables in a map
#[derive(Default)]
pub struct MockFlash {
    variables: HashMap<u32, Vec<u8>>,
    log: Option<CallLog>,
}

impl MockFlash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn write_variable(&mut self, id: u32, value: Vec<u8>) {
        self.variables.insert(id, value);
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

impl FlashStore for MockFlash {
    fn delete_variables(&mut self) -> HwResult<()> {
        record(&self.log, "flash.delete_variables");
        self.variables.clear();
        Ok(())
    }
}

/// Sensor subsystem counting process calls
#[derive(Default)]
pub struct MockSensor {
    mode: Option<SensorMode>,
    process_count: Rc<RefCell<u32>>,
    log: Option<CallLog>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn mode(&self) -> Option<SensorMode> {
        self.mode
    }

    /// Handle on the process counter that survives boxing
    pub fn process_counter(&self) -> Rc<RefCell<u32>> {
        Rc::clone(&self.process_count)
    }
}

impl SensorSubsystem for MockSensor {
    fn init(&mut self, mode: SensorMode) -> HwResult<()> {
        record(&self.log, "sensor.init");
        self.mode = Some(mode);
        Ok(())
    }

    fn process(&mut self) -> HwResult<()> {
        if self.mode.is_none() {
            return Err(HardwareError::NotInitialized {
                subsystem: "sensor".to_string(),
            });
        }
        record(&self.log, "sensor.process");
        *self.process_count.borrow_mut() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockAccelerometer {
    initialized: bool,
    log: Option<CallLog>,
}

impl MockAccelerometer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Accelerometer for MockAccelerometer {
    fn init(&mut self) -> HwResult<()> {
        record(&self.log, "accelero.init");
        self.initialized = true;
        Ok(())
    }
}

/// Fix engine replaying a script of fix events, one per `process` call
///
/// With `FixTimeout::Infinite` every scripted event is reported and the
/// session never ends. With `FixTimeout::Seconds(t)` the session ends on a
/// 3D fix, or on the first event at or past `t` seconds which is then
/// flagged as timed out.
pub struct MockFixEngine {
    script: VecDeque<FixResult>,
    callback: Option<FixCallback>,
    mode: FixMode,
    timeout: FixTimeout,
    initialized: bool,
    events_delivered: u32,
    log: Option<CallLog>,
}

impl MockFixEngine {
    pub fn new(script: Vec<FixResult>) -> Self {
        Self {
            script: script.into(),
            callback: None,
            mode: FixMode::Off,
            timeout: FixTimeout::Infinite,
            initialized: false,
            events_delivered: 0,
            log: None,
        }
    }

    /// Create an engine replaying a JSON script file
    pub fn from_script_file<P: AsRef<Path>>(path: P) -> HwResult<Self> {
        Ok(Self::new(load_script(path)?))
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn events_delivered(&self) -> u32 {
        self.events_delivered
    }

    pub fn mode(&self) -> FixMode {
        self.mode
    }
}

impl FixEngine for MockFixEngine {
    fn init(&mut self) -> HwResult<()> {
        record(&self.log, "geoloc.init");
        self.initialized = true;
        Ok(())
    }

    fn try_to_fix(&mut self, mode: FixMode, timeout: FixTimeout, callback: FixCallback) -> HwResult<()> {
        if !self.initialized {
            return Err(HardwareError::NotInitialized {
                subsystem: "fix engine".to_string(),
            });
        }
        if self.callback.is_some() {
            return Err(HardwareError::SessionActive);
        }
        if mode == FixMode::Off {
            return Err(HardwareError::InvalidMode {
                mode: mode.to_string(),
            });
        }

        record(&self.log, "geoloc.try_to_fix");
        self.mode = mode;
        self.timeout = timeout;
        self.callback = Some(callback);
        Ok(())
    }

    fn process(&mut self) -> HwResult<()> {
        if !self.initialized {
            return Err(HardwareError::NotInitialized {
                subsystem: "fix engine".to_string(),
            });
        }
        record(&self.log, "geoloc.process");

        let callback = match self.callback.as_mut() {
            Some(callback) => callback,
            None => return Ok(()),
        };
        let mut fix = match self.script.pop_front() {
            Some(fix) => fix,
            None => return Ok(()),
        };

        let session_over = match self.timeout {
            FixTimeout::Infinite => false,
            FixTimeout::Seconds(_) => {
                fix.timed_out = fix.timed_out
                    || (fix.level < FixLevel::Fix3D && self.timeout.expired(fix.duration_s));
                fix.timed_out || fix.level == FixLevel::Fix3D
            }
        };

        callback(&fix, fix.timed_out);
        self.events_delivered += 1;

        if session_over {
            self.stop();
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.callback = None;
    }

    fn is_active(&self) -> bool {
        self.callback.is_some()
    }
}

/// Load a JSON array of fix events
pub fn load_script<P: AsRef<Path>>(path: P) -> HwResult<Vec<FixResult>> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| HardwareError::ScriptError {
        message: format!("{}: {}", path.as_ref().display(), e),
    })?;
    parse_script(&content)
}

/// Parse a JSON array of fix events, rejecting out-of-range quality indicators
pub fn parse_script(content: &str) -> HwResult<Vec<FixResult>> {
    let script: Vec<FixResult> =
        serde_json::from_str(content).map_err(|e| HardwareError::ScriptError {
            message: e.to_string(),
        })?;

    for (index, fix) in script.iter().enumerate() {
        if let Some(channel) = fix
            .satellites
            .channels
            .iter()
            .find(|c| c.quality > MAX_QUALITY_INDICATOR)
        {
            return Err(HardwareError::ScriptError {
                message: format!(
                    "event {}: satellite {} has quality {}",
                    index, channel.svid, channel.quality
                ),
            });
        }
    }

    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> (Rc<RefCell<Vec<(FixLevel, bool)>>>, FixCallback) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let callback: FixCallback = Box::new(move |fix: &FixResult, timed_out: bool| {
            sink.borrow_mut().push((fix.level, timed_out));
        });
        (seen, callback)
    }

    #[test]
    fn test_engine_requires_init() {
        let mut engine = MockFixEngine::new(Vec::new());
        let (_, callback) = capture();

        let result = engine.try_to_fix(FixMode::Navigation, FixTimeout::Infinite, callback);
        assert!(matches!(result, Err(HardwareError::NotInitialized { .. })));
        assert!(engine.process().is_err());
    }

    #[test]
    fn test_engine_rejects_off_mode_and_double_arm() {
        let mut engine = MockFixEngine::new(Vec::new());
        engine.init().unwrap();

        let (_, callback) = capture();
        let result = engine.try_to_fix(FixMode::Off, FixTimeout::Infinite, callback);
        assert!(matches!(result, Err(HardwareError::InvalidMode { .. })));

        let (_, callback) = capture();
        engine.try_to_fix(FixMode::Navigation, FixTimeout::Infinite, callback).unwrap();
        let (_, callback) = capture();
        let result = engine.try_to_fix(FixMode::Navigation, FixTimeout::Infinite, callback);
        assert_eq!(result, Err(HardwareError::SessionActive));
    }

    #[test]
    fn test_infinite_session_reports_every_event() {
        let script = vec![
            FixResult::new(FixLevel::None).with_duration(1),
            FixResult::new(FixLevel::Time).with_duration(2),
            FixResult::new(FixLevel::Fix3D).with_duration(30),
            FixResult::new(FixLevel::Fix3D).with_duration(31),
        ];
        let mut engine = MockFixEngine::new(script);
        engine.init().unwrap();
        let (seen, callback) = capture();
        engine.try_to_fix(FixMode::Navigation, FixTimeout::Infinite, callback).unwrap();

        for _ in 0..6 {
            engine.process().unwrap();
        }

        assert_eq!(engine.events_delivered(), 4);
        assert!(engine.is_active());
        assert_eq!(
            *seen.borrow(),
            vec![
                (FixLevel::None, false),
                (FixLevel::Time, false),
                (FixLevel::Fix3D, false),
                (FixLevel::Fix3D, false),
            ]
        );
    }

    #[test]
    fn test_infinite_session_survives_scripted_timeout() {
        let script = vec![
            FixResult::new(FixLevel::Time).with_duration(300).with_timeout(true),
            FixResult::new(FixLevel::Fix3D).with_duration(310),
        ];
        let mut engine = MockFixEngine::new(script);
        engine.init().unwrap();
        let (seen, callback) = capture();
        engine.try_to_fix(FixMode::Navigation, FixTimeout::Infinite, callback).unwrap();

        engine.process().unwrap();
        engine.process().unwrap();

        assert!(engine.is_active());
        assert_eq!(engine.events_delivered(), 2);
        assert_eq!(engine.remaining(), 0);
        assert_eq!(*seen.borrow(), vec![(FixLevel::Time, true), (FixLevel::Fix3D, false)]);
    }

    #[test]
    fn test_finite_session_times_out() {
        let script = vec![
            FixResult::new(FixLevel::Time).with_duration(50),
            FixResult::new(FixLevel::Date).with_duration(100),
            FixResult::new(FixLevel::Fix3D).with_duration(150),
        ];
        let mut engine = MockFixEngine::new(script);
        engine.init().unwrap();
        let (seen, callback) = capture();
        engine.try_to_fix(FixMode::Navigation, FixTimeout::Seconds(100), callback).unwrap();

        engine.process().unwrap();
        engine.process().unwrap();
        engine.process().unwrap();

        assert!(!engine.is_active());
        assert_eq!(engine.remaining(), 1);
        assert_eq!(*seen.borrow(), vec![(FixLevel::Time, false), (FixLevel::Date, true)]);
    }

    #[test]
    fn test_finite_session_ends_on_3d_fix() {
        let script = vec![
            FixResult::new(FixLevel::Fix3D).with_duration(20),
            FixResult::new(FixLevel::Fix3D).with_duration(21),
        ];
        let mut engine = MockFixEngine::new(script);
        engine.init().unwrap();
        let (seen, callback) = capture();
        engine.try_to_fix(FixMode::PowerSave, FixTimeout::Seconds(60), callback).unwrap();

        engine.process().unwrap();
        engine.process().unwrap();

        assert!(!engine.is_active());
        assert_eq!(*seen.borrow(), vec![(FixLevel::Fix3D, false)]);
    }

    #[test]
    fn test_parse_script() {
        let script = parse_script(
            r#"[
                { "level": "none", "duration_s": 3 },
                { "level": "3d", "position": { "latitude": 1, "longitude": 2, "altitude": 3 } }
            ]"#,
        )
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[1].level, FixLevel::Fix3D);

        let bad = parse_script(r#"[ { "level": "5d" } ]"#);
        assert!(matches!(bad, Err(HardwareError::ScriptError { .. })));

        let bad_quality = parse_script(
            r#"[ { "level": "none", "satellites": { "usable": 0, "channels": [ { "svid": 4, "quality": 9, "ephemeris": false } ] } } ]"#,
        );
        assert!(matches!(bad_quality, Err(HardwareError::ScriptError { .. })));
    }

    #[test]
    fn test_load_demo_script() {
        let script = load_script("demos/fix_script.json").unwrap();
        assert_eq!(script.len(), 3);
        assert_eq!(script[2].level, FixLevel::Fix3D);
        assert_eq!(script[2].satellites.channels.len(), 5);
    }

    #[test]
    fn test_load_missing_script() {
        let result = load_script("does/not/exist.json");
        assert!(matches!(result, Err(HardwareError::ScriptError { .. })));
    }

    #[test]
    fn test_mock_peripherals() {
        let log = call_log();
        let mut flash = MockFlash::new().with_log(Rc::clone(&log));
        flash.write_variable(1, vec![0xAA]);
        flash.delete_variables().unwrap();
        assert_eq!(flash.variable_count(), 0);

        let mut sensor = MockSensor::new().with_log(Rc::clone(&log));
        assert!(sensor.process().is_err());
        sensor.init(SensorMode::Transmitter).unwrap();
        sensor.process().unwrap();
        assert_eq!(*sensor.process_counter().borrow(), 1);

        let mut accelero = MockAccelerometer::new().with_log(Rc::clone(&log));
        accelero.init().unwrap();
        assert!(accelero.is_initialized());

        assert_eq!(
            *log.borrow(),
            vec!["flash.delete_variables", "sensor.init", "sensor.process", "accelero.init"]
        );
    }
}
