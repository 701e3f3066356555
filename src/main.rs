use clap::{App, Arg};
use geoloc_fix::core::{DateTime, FixLevel, FixPosition, FixResult, SatChannel, Satellites};
use geoloc_fix::hardware::{MockAccelerometer, MockFixEngine, MockFlash, MockSensor, UartStream};
use geoloc_fix::utils::{logging, AppConfig, ConfigurationManager};
use geoloc_fix::{GeolocApp, Peripherals};
use std::time::Duration;

/// Acquisition sequence replayed when no script file is given
fn demo_script() -> Vec<FixResult> {
    let datetime = DateTime::new(2026, 10, 17, 8, 41, 12);
    let tracking = |ephemeris: usize| -> Satellites {
        let channels = (0..8u8)
            .map(|i| SatChannel::new(i * 3 + 1, 7 - i % 4, (i as usize) < ephemeris))
            .collect();
        Satellites::new(ephemeris as u8, channels)
    };
    let position = FixPosition::new(-337688000, 1510833000, 58);

    vec![
        FixResult::new(FixLevel::None).with_duration(2).with_satellites(tracking(0)),
        FixResult::new(FixLevel::Time)
            .with_datetime(datetime)
            .with_duration(9)
            .with_satellites(tracking(1)),
        FixResult::new(FixLevel::Date)
            .with_datetime(datetime)
            .with_duration(18)
            .with_satellites(tracking(2)),
        FixResult::new(FixLevel::Fix2D)
            .with_datetime(datetime)
            .with_position(position)
            .with_speed(4)
            .with_duration(27)
            .with_satellites(tracking(3)),
        FixResult::new(FixLevel::Fix3D)
            .with_datetime(datetime)
            .with_position(position)
            .with_speed(5)
            .with_duration(34)
            .with_satellites(tracking(5)),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("geoloc-fix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Continuous GPS fix reporting over a UART stream")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("JSON configuration file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("script")
                .short("s")
                .long("script")
                .help("JSON array of fix events to replay")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("iterations")
                .short("n")
                .long("iterations")
                .help("Number of loop passes to run")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("interval_ms")
                .short("i")
                .long("interval-ms")
                .help("Delay between loop passes in milliseconds")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("write_config")
                .long("write-config")
                .help("Write the default configuration to this file and exit")
                .takes_value(true),
        )
        .get_matches();

    if let Some(path) = matches.value_of("write_config") {
        AppConfig::default().save_to_file(path)?;
        println!("Default configuration written to {}", path);
        return Ok(());
    }

    let config = match matches.value_of("config") {
        Some(path) => ConfigurationManager::from_file(path)?.into_config(),
        None => AppConfig::default(),
    };
    logging::init(config.debug_logging)?;

    for warning in config.validate().warnings {
        log::warn!("{}", warning);
    }

    let engine = match matches.value_of("script") {
        Some(path) => MockFixEngine::from_script_file(path)?,
        None => MockFixEngine::new(demo_script()),
    };
    let iterations: u64 = match matches.value_of("iterations") {
        Some(value) => value.parse()?,
        None => engine.remaining() as u64 + 1,
    };
    let interval = Duration::from_millis(match matches.value_of("interval_ms") {
        Some(value) => value.parse()?,
        None => 0,
    });

    let peripherals = Peripherals {
        uart: UartStream::new(Box::new(std::io::stdout())),
        flash: Box::new(MockFlash::new()),
        sensor: Box::new(MockSensor::new()),
        accelerometer: Box::new(MockAccelerometer::new()),
        engine: Box::new(engine),
    };

    let mut app = GeolocApp::new(config, peripherals);
    app.setup()?;

    app.run(iterations, interval)?;

    log::info!(
        "{} loop passes, {} fix reports, session {}",
        app.iterations(),
        app.reports_emitted(),
        if app.is_fixing() { "still active" } else { "finished" }
    );
    Ok(())
}
