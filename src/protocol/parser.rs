//! Inbound command parsing
//!
//! One complete frame (no delimiter) is decoded into a closed [`Command`]
//! variant. Frame layout is `<tag> <arg> <arg> ...` with a single-character
//! tag and space-separated decimal arguments:
//!
//! | Tag | Args | Command |
//! |-----|------|---------|
//! | `q` | 4    | [`Command::Orientation`] — attitude quaternion q0..q3 |
//! | `p` | 2–3  | [`Command::PidSample`] — x, controller input, optional output |
//! | `c` | 6    | [`Command::Config`] — kp ki kd speedL speedR setpoint |
//!
//! The protocol is chatty and best-effort: an unknown tag, wrong argument
//! count, or non-numeric argument drops the frame without surfacing an
//! error. A `p` frame with only two arguments is a protocol-level signal
//! that the controller output series ends here (the autonomous loop has no
//! output to report), not merely a missing value.

use serde::{Deserialize, Serialize};

/// Robot controller configuration, payload of the `c` command
///
/// Speed factors are accepted but not consumed further by this crate; the
/// field exists for forward compatibility with the robot firmware.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Left motor speed correction factor
    pub speed_factor_left: f64,
    /// Right motor speed correction factor
    pub speed_factor_right: f64,
    /// Controller setpoint
    pub setpoint: f64,
}

/// A decoded inbound command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Attitude quaternion components q0..q3, as sent (not normalized)
    Orientation([f64; 4]),
    /// One PID tuning sample; `output` absent means "clear the output series"
    PidSample {
        /// Sample abscissa (robot-side time)
        x: f64,
        /// Controller input value
        input: f64,
        /// Controller output value, absent while the loop reports none
        output: Option<f64>,
    },
    /// Robot configuration values
    Config(RobotConfig),
}

/// Parse one complete frame into a [`Command`]
///
/// Returns `None` for anything malformed; malformed frames are inert by
/// design and never an error.
pub fn parse(frame: &str) -> Option<Command> {
    let mut tokens = frame.split(' ');
    let tag_token = tokens.next()?;

    // The deployed senders always write the tag as its own token; a frame
    // gluing tag and first argument together never decoded correctly.
    let mut chars = tag_token.chars();
    let tag = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let args: Option<Vec<f64>> = tokens.map(|t| t.parse::<f64>().ok()).collect();
    let args = args?;

    match (tag, args.len()) {
        ('q', 4) => Some(Command::Orientation([args[0], args[1], args[2], args[3]])),
        ('p', 2) => Some(Command::PidSample {
            x: args[0],
            input: args[1],
            output: None,
        }),
        ('p', 3) => Some(Command::PidSample {
            x: args[0],
            input: args[1],
            output: Some(args[2]),
        }),
        ('c', 6) => Some(Command::Config(RobotConfig {
            kp: args[0],
            ki: args[1],
            kd: args[2],
            speed_factor_left: args[3],
            speed_factor_right: args[4],
            setpoint: args[5],
        })),
        _ => None,
    }
}
