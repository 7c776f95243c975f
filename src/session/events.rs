//! Session state types and the upward event interface
//!
//! The session publishes domain events instead of mutating widgets; an
//! independent presentation layer subscribes and drives its own rendering.

use crate::protocol::RobotConfig;
use crate::telemetry::PidSeries;

/// Connection lifecycle of the TCP control channel
///
/// `Disconnected → Resolving → Connecting → Connected → Disconnected`;
/// failure at any non-terminal step returns straight to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No control channel; connect intent is accepted
    Disconnected,
    /// Hostname lookup in progress
    Resolving,
    /// Socket connect in progress
    Connecting,
    /// Control channel established
    Connected,
}

/// Per-feature mode toggles, all forced false while disconnected
///
/// Each flag flips on its intent (edge-triggered); legal combinations depend
/// on the connection state and firmware generation, enforced by the session
/// so illegal combinations are never representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFlags {
    /// Autonomous/PID control engaged (`G`/`S`)
    pub running: bool,
    /// PID telemetry streaming active (`P`/`N`)
    pub pid_streaming: bool,
    /// Robot currently moving on operator speeds (`M`/`H`)
    pub moving: bool,
    /// Operator holds manual control (`S`/`G`, inverted)
    pub manual_control: bool,
}

/// Operator intents, used both to drive the session and to query legality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Open the control channel
    Connect,
    /// Close the control channel
    Disconnect,
    /// Toggle autonomous control
    ToggleRunning,
    /// Toggle operator manual control
    ToggleManualControl,
    /// Toggle PID telemetry streaming
    TogglePidStream,
    /// Toggle movement
    ToggleMoving,
    /// Push PID gains
    SetPid,
    /// Ask for the robot configuration
    RequestConfig,
    /// Start a sensor calibration cycle
    Calibrate(CalibrationTarget),
    /// Ask the robot to shut down
    RemoteShutdown,
}

/// Sensor to calibrate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationTarget {
    /// Accelerometer
    Accelerometer,
    /// Gyroscope
    Gyroscope,
    /// Magnetometer
    Magnetometer,
}

/// Events published by the session to renderers and UI
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// New attitude quaternion q0..q3
    OrientationChanged([f64; 4]),
    /// A PID sample was appended to a series
    PidSampleAdded {
        /// Which series received the sample
        series: PidSeries,
        /// Sample abscissa
        x: f64,
        /// Sample value
        y: f64,
    },
    /// The PID output series was cleared by an output-less sample
    PidOutputCleared,
    /// Robot configuration received
    ConfigReceived(RobotConfig),
    /// Connection lifecycle changed
    ConnectionStateChanged(ConnectionState),
    /// One or more control flags flipped
    ControlFlagsChanged(ControlFlags),
    /// Resolution or connection failure, with the underlying message
    ConnectionError(String),
}
