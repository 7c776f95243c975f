//! sarathi-link - Headless console client for the robot link
//!
//! Stands in for the GUI: maps typed console commands to control intents,
//! subscribes to the session's domain events and logs them. One poll loop
//! services the TCP control channel, the UDP telemetry socket, the console
//! and the event stream; a refresh timer only paces the logged telemetry
//! snapshot, never the parsing path.

use sarathi_link::config::AppConfig;
use sarathi_link::error::{Error, Result};
use sarathi_link::protocol::PidGains;
use sarathi_link::session::{CalibrationTarget, ConnectionState, LinkEvent, LinkSession};
use sarathi_link::telemetry::PidSeries;
use sarathi_link::transport::{ControlLink, DnsResolver, TcpControlLink, TelemetrySocket};
use std::env;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Poll loop cadence
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Parse config path from command line arguments.
///
/// Supports:
/// - `sarathi-link <path>` (positional)
/// - `sarathi-link --config <path>` (flag-based)
/// - `sarathi-link -c <path>` (short flag)
///
/// Defaults to `sarathi-link.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "sarathi-link.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = match AppConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "No usable config at {} ({}), using classic defaults",
                config_path, e
            );
            AppConfig::classic_defaults()
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("sarathi-link starting");
    log::info!(
        "Robot: {} (control {}, telemetry {}, {:?} firmware)",
        config.link.host,
        config.link.control_port,
        config.link.telemetry_port,
        config.link.generation
    );

    // Shared link handle: the session writes through it, this loop reads
    let link = Arc::new(Mutex::new(TcpControlLink::new()));
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut session = LinkSession::new(
        config.link.generation,
        config.link.control_port,
        Box::new(DnsResolver),
        Box::new(Arc::clone(&link)),
        event_tx,
    );

    let telemetry_socket = TelemetrySocket::bind(config.link.telemetry_port)?;

    // Console reader thread; stdin has no non-blocking mode worth using
    let (console_tx, console_rx) = crossbeam_channel::unbounded::<String>();
    let _console_handle = thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if console_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map_err(|e| Error::Other(format!("Failed to spawn console thread: {}", e)))?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    print_help();

    let refresh = Duration::from_millis(config.display.refresh_ms);
    let mut last_refresh = Instant::now();
    let mut stream_buf = [0u8; 2048];
    let mut dgram_buf = [0u8; 2048];

    while running.load(Ordering::Relaxed) {
        // TCP control channel
        if session.state() == ConnectionState::Connected {
            let read = {
                let mut guard = link.lock().unwrap_or_else(|e| e.into_inner());
                if guard.is_open() {
                    guard.recv(&mut stream_buf)
                } else {
                    Ok(None)
                }
            };
            match read {
                Ok(Some(0)) => session.handle_link_closed(),
                Ok(Some(n)) => session.handle_control_data(&stream_buf[..n]),
                Ok(None) => {}
                Err(e) => session.handle_link_error(&e.to_string()),
            }
        }

        // UDP telemetry channel, drain everything pending
        loop {
            match telemetry_socket.recv_datagram(&mut dgram_buf) {
                Ok(Some(n)) => session.handle_datagram(&dgram_buf[..n]),
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Telemetry socket error: {}", e);
                    break;
                }
            }
        }

        // Console intents
        for line in console_rx.try_iter() {
            match handle_console(&mut session, &config, &line) {
                Ok(true) => running.store(false, Ordering::Relaxed),
                Ok(false) => {}
                Err(e) => log::warn!("Refused: {}", e),
            }
        }

        // Domain events, stand-in for the rendering layer
        for event in event_rx.try_iter() {
            report_event(&event);
        }

        // Periodic telemetry snapshot; pacing display only
        if last_refresh.elapsed() >= refresh {
            last_refresh = Instant::now();
            if let Some([q0, q1, q2, q3]) = session.telemetry().orientation() {
                log::debug!(
                    "attitude q=[{:.3} {:.3} {:.3} {:.3}] pid samples in/out: {}/{}",
                    q0,
                    q1,
                    q2,
                    q3,
                    session.telemetry().series(PidSeries::Input).len(),
                    session.telemetry().series(PidSeries::Output).len()
                );
            }
        }

        thread::sleep(POLL_INTERVAL);
    }

    if session.state() != ConnectionState::Disconnected {
        let _ = session.disconnect();
    }
    log::info!("sarathi-link stopped");
    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  connect [host]       open the control channel");
    println!("  disconnect           close the control channel");
    println!("  run                  toggle autonomous control (classic firmware)");
    println!("  manual               toggle manual takeover (autonomous firmware)");
    println!("  pid [kp ki kd [sp]]  toggle PID streaming, optionally pushing gains");
    println!("  move <left> <right>  toggle movement at the given speeds");
    println!("  setpid <kp> <ki> <kd>  push PID gains");
    println!("  config               request robot configuration");
    println!("  cal <acc|gyro|mag>   start a sensor calibration");
    println!("  shutdown             ask the robot to shut down");
    println!("  quit                 exit");
}

/// Map one console line to a session intent. `Ok(true)` means quit.
fn handle_console(session: &mut LinkSession, config: &AppConfig, line: &str) -> Result<bool> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [] => {}
        ["connect"] => session.connect(&config.link.host)?,
        ["connect", host] => session.connect(host)?,
        ["disconnect"] => session.disconnect()?,
        ["run"] => session.toggle_running()?,
        ["manual"] => session.toggle_manual_control()?,
        ["pid"] => session.toggle_pid_stream(None)?,
        ["pid", kp, ki, kd] => {
            let g = parse_floats(&[kp, ki, kd], "pid [kp ki kd [setpoint]]")?;
            session.toggle_pid_stream(Some(PidGains {
                kp: g[0],
                ki: g[1],
                kd: g[2],
                setpoint: None,
            }))?
        }
        ["pid", kp, ki, kd, sp] => {
            let g = parse_floats(&[kp, ki, kd, sp], "pid [kp ki kd [setpoint]]")?;
            session.toggle_pid_stream(Some(PidGains {
                kp: g[0],
                ki: g[1],
                kd: g[2],
                setpoint: Some(g[3]),
            }))?
        }
        ["move", left, right] => {
            let s = parse_floats(&[left, right], "move <left> <right>")?;
            session.toggle_moving(s[0], s[1])?
        }
        ["setpid", kp, ki, kd] => {
            let g = parse_floats(&[kp, ki, kd], "setpid <kp> <ki> <kd>")?;
            session.set_pid(g[0], g[1], g[2])?
        }
        ["config"] => session.request_config()?,
        ["cal", "acc"] => session.calibrate(CalibrationTarget::Accelerometer)?,
        ["cal", "gyro"] => session.calibrate(CalibrationTarget::Gyroscope)?,
        ["cal", "mag"] => session.calibrate(CalibrationTarget::Magnetometer)?,
        ["shutdown"] => session.remote_shutdown()?,
        ["quit"] | ["exit"] => return Ok(true),
        _ => log::warn!("Unknown command: {}", line),
    }
    Ok(false)
}

fn parse_floats(tokens: &[&&str], usage: &str) -> Result<Vec<f64>> {
    tokens
        .iter()
        .map(|t| t.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| Error::InvalidParameter(usage.to_string()))
}

/// Log domain events the way a GUI would render them
fn report_event(event: &LinkEvent) {
    match event {
        LinkEvent::OrientationChanged(_) | LinkEvent::PidSampleAdded { .. } => {
            // High-rate telemetry; the snapshot timer reports these
        }
        LinkEvent::PidOutputCleared => log::info!("PID output series cleared"),
        LinkEvent::ConfigReceived(config) => log::info!(
            "Robot configuration: kp={} ki={} kd={} speedL={} speedR={} setpoint={}",
            config.kp,
            config.ki,
            config.kd,
            config.speed_factor_left,
            config.speed_factor_right,
            config.setpoint
        ),
        LinkEvent::ConnectionStateChanged(state) => log::info!("Connection: {:?}", state),
        LinkEvent::ControlFlagsChanged(flags) => log::info!(
            "Modes: running={} pid_streaming={} moving={} manual={}",
            flags.running,
            flags.pid_streaming,
            flags.moving,
            flags.manual_control
        ),
        LinkEvent::ConnectionError(message) => log::error!("Connection error: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarathi_link::transport::{MockLink, MockResolver};
    use sarathi_link::Generation;

    fn console_session() -> LinkSession {
        let (events, _rx) = crossbeam_channel::unbounded();
        LinkSession::new(
            Generation::Classic,
            43210,
            Box::new(MockResolver::localhost()),
            Box::new(MockLink::new()),
            events,
        )
    }

    #[test]
    fn test_console_rejects_non_numeric_arguments() {
        let mut session = console_session();
        let config = AppConfig::classic_defaults();

        for line in ["setpid a b c", "move fast slow", "pid 1 x 3", "pid 1 2 3 top"] {
            match handle_console(&mut session, &config, line) {
                Err(Error::InvalidParameter(_)) => {}
                other => panic!("{:?} should be an invalid-parameter refusal, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_console_quit_and_exit() {
        let mut session = console_session();
        let config = AppConfig::classic_defaults();

        assert_eq!(handle_console(&mut session, &config, "quit").ok(), Some(true));
        assert_eq!(handle_console(&mut session, &config, "exit").ok(), Some(true));
    }

    #[test]
    fn test_console_unknown_command_is_not_an_error() {
        let mut session = console_session();
        let config = AppConfig::classic_defaults();

        assert_eq!(handle_console(&mut session, &config, "launch").ok(), Some(false));
        assert_eq!(handle_console(&mut session, &config, "").ok(), Some(false));
    }
}
