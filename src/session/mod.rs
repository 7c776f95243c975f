//! Control state machine for the robot link
//!
//! [`LinkSession`] is the single source of truth for what the operator may
//! do at any moment. It consumes UI intents and inbound bytes, owns the
//! connection state and mode flags, drives the order encoder over the
//! [`ControlLink`] capability, and publishes [`LinkEvent`]s for renderers.
//!
//! Everything here runs on one thread and never blocks: socket readiness,
//! inbound data and lifecycle changes arrive as discrete `handle_*` calls
//! from whoever runs the I/O loop.

mod events;

pub use events::{CalibrationTarget, ConnectionState, ControlFlags, Intent, LinkEvent};

use crate::error::{Error, Result};
use crate::protocol::{self, Command, FrameSplitter, Order, PidGains, RobotConfig};
use crate::telemetry::{PidSeries, TelemetryModel};
use crate::transport::{ControlLink, Resolver};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Robot firmware generation the session targets
///
/// The two generations gate intents differently and never coexist on one
/// robot: `Classic` exposes the run toggle and sensor calibration,
/// `Autonomous` exposes the manual-takeover toggle and asks for the robot
/// configuration on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Run-gated firmware: `G`/`S` engage the robot, calibration while running
    #[default]
    Classic,
    /// Autonomous firmware: robot drives itself until the operator takes over
    Autonomous,
}

/// Control state machine and protocol engine
pub struct LinkSession {
    generation: Generation,
    control_port: u16,
    state: ConnectionState,
    flags: ControlFlags,
    splitter: FrameSplitter,
    telemetry: TelemetryModel,
    last_config: Option<RobotConfig>,
    resolver: Box<dyn Resolver>,
    link: Box<dyn ControlLink>,
    events: Sender<LinkEvent>,
}

impl LinkSession {
    /// Create a session over the given capabilities
    pub fn new(
        generation: Generation,
        control_port: u16,
        resolver: Box<dyn Resolver>,
        link: Box<dyn ControlLink>,
        events: Sender<LinkEvent>,
    ) -> Self {
        Self {
            generation,
            control_port,
            state: ConnectionState::Disconnected,
            flags: ControlFlags::default(),
            splitter: FrameSplitter::new(),
            telemetry: TelemetryModel::new(),
            last_config: None,
            resolver,
            link,
            events,
        }
    }

    // ----- read-only surface -------------------------------------------------

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current control flags
    pub fn flags(&self) -> ControlFlags {
        self.flags
    }

    /// Decoded telemetry, read by renderers at their own cadence
    pub fn telemetry(&self) -> &TelemetryModel {
        &self.telemetry
    }

    /// Last configuration the robot reported, if any
    pub fn last_config(&self) -> Option<RobotConfig> {
        self.last_config
    }

    /// Whether an intent is currently acceptable
    ///
    /// This is the UI-enablement contract: buttons mirror exactly this
    /// predicate, and every intent entry point enforces it.
    pub fn is_legal(&self, intent: Intent) -> bool {
        match intent {
            Intent::Connect => self.state == ConnectionState::Disconnected,
            Intent::Disconnect => self.state != ConnectionState::Disconnected,
            _ if self.state != ConnectionState::Connected => false,
            Intent::ToggleRunning => self.generation == Generation::Classic,
            Intent::ToggleManualControl => self.generation == Generation::Autonomous,
            Intent::TogglePidStream | Intent::RequestConfig | Intent::RemoteShutdown => true,
            Intent::ToggleMoving | Intent::SetPid => match self.generation {
                Generation::Classic => true,
                // The autonomous loop holds the robot until the operator
                // takes over; manual controls are refused until then
                Generation::Autonomous => self.flags.manual_control,
            },
            Intent::Calibrate(_) => self.generation == Generation::Classic && self.flags.running,
        }
    }

    // ----- connection lifecycle ----------------------------------------------

    /// Connect to the robot at `host`
    ///
    /// Walks Resolving → Connecting → Connected, emitting each state.
    /// Resolution or connect failure surfaces a [`LinkEvent::ConnectionError`]
    /// and returns the session to Disconnected, re-enabling the intent.
    pub fn connect(&mut self, host: &str) -> Result<()> {
        if !self.is_legal(Intent::Connect) {
            return Err(Error::IllegalIntent("connect"));
        }

        self.set_state(ConnectionState::Resolving);
        let ip = match self.resolver.resolve(host) {
            Ok(ip) => ip,
            Err(e) => {
                log::warn!("Resolution failed for '{}': {}", host, e);
                self.emit(LinkEvent::ConnectionError(e.to_string()));
                self.set_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        self.set_state(ConnectionState::Connecting);
        let addr = SocketAddr::new(ip, self.control_port);
        if let Err(e) = self.link.connect(addr) {
            log::warn!("Connection to {} failed: {}", addr, e);
            self.emit(LinkEvent::ConnectionError(e.to_string()));
            self.set_state(ConnectionState::Disconnected);
            return Err(e);
        }

        self.set_flags(ControlFlags::default());
        self.set_state(ConnectionState::Connected);
        log::info!("Connected to {} ({:?} firmware)", addr, self.generation);

        // Autonomous firmware reports its configuration on request; ask
        // right away so the operator sees live gains
        if self.generation == Generation::Autonomous {
            self.send_order(&Order::RequestConfig)?;
        }
        Ok(())
    }

    /// User-initiated disconnect; immediate, nothing to wait for
    pub fn disconnect(&mut self) -> Result<()> {
        if !self.is_legal(Intent::Disconnect) {
            return Err(Error::IllegalIntent("disconnect"));
        }
        self.link.close();
        self.drop_connection();
        Ok(())
    }

    /// The remote closed the channel gracefully; not an error
    pub fn handle_link_closed(&mut self) {
        log::info!("Remote closed the control channel");
        self.link.close();
        self.drop_connection();
    }

    /// A socket error occurred on the control channel
    pub fn handle_link_error(&mut self, message: &str) {
        log::warn!("Control channel error: {}", message);
        self.emit(LinkEvent::ConnectionError(message.to_string()));
        self.link.close();
        self.drop_connection();
    }

    fn drop_connection(&mut self) {
        self.set_flags(ControlFlags::default());
        self.set_state(ConnectionState::Disconnected);
    }

    // ----- operator intents --------------------------------------------------

    /// Toggle autonomous control: `G` to engage, `S` to disengage
    ///
    /// While running, sensor calibration intents become acceptable.
    pub fn toggle_running(&mut self) -> Result<()> {
        if !self.is_legal(Intent::ToggleRunning) {
            return Err(Error::IllegalIntent("toggle running"));
        }
        let engage = !self.flags.running;
        self.send_order(if engage { &Order::Go } else { &Order::Stop })?;
        let mut flags = self.flags;
        flags.running = engage;
        self.set_flags(flags);
        Ok(())
    }

    /// Toggle operator manual control: `S` takes over, `G` hands back
    ///
    /// Inverted with respect to [`toggle_running`](Self::toggle_running):
    /// taking over stops the autonomous loop.
    pub fn toggle_manual_control(&mut self) -> Result<()> {
        if !self.is_legal(Intent::ToggleManualControl) {
            return Err(Error::IllegalIntent("toggle manual control"));
        }
        let take_over = !self.flags.manual_control;
        self.send_order(if take_over { &Order::Stop } else { &Order::Go })?;
        let mut flags = self.flags;
        flags.manual_control = take_over;
        self.set_flags(flags);
        Ok(())
    }

    /// Toggle PID telemetry streaming: `P` (optionally pushing gains) / `N`
    ///
    /// Renderers switch their visible series off the resulting
    /// [`LinkEvent::ControlFlagsChanged`]: PID input/output while streaming,
    /// orientation otherwise.
    pub fn toggle_pid_stream(&mut self, gains: Option<PidGains>) -> Result<()> {
        if !self.is_legal(Intent::TogglePidStream) {
            return Err(Error::IllegalIntent("toggle pid stream"));
        }
        let start = !self.flags.pid_streaming;
        if start {
            self.send_order(&Order::StartPidStream(gains))?;
        } else {
            self.send_order(&Order::StopPidStream)?;
        }
        let mut flags = self.flags;
        flags.pid_streaming = start;
        self.set_flags(flags);
        Ok(())
    }

    /// Toggle movement: `M left right` to move, `H` to halt
    ///
    /// Speeds are read from the intent payload when turning on and ignored
    /// when turning off.
    pub fn toggle_moving(&mut self, left: f64, right: f64) -> Result<()> {
        if !self.is_legal(Intent::ToggleMoving) {
            return Err(Error::IllegalIntent("toggle moving"));
        }
        let start = !self.flags.moving;
        if start {
            self.send_order(&Order::Move { left, right })?;
        } else {
            self.send_order(&Order::Halt)?;
        }
        let mut flags = self.flags;
        flags.moving = start;
        self.set_flags(flags);
        Ok(())
    }

    /// Push PID gains to the robot
    pub fn set_pid(&mut self, kp: f64, ki: f64, kd: f64) -> Result<()> {
        if !self.is_legal(Intent::SetPid) {
            return Err(Error::IllegalIntent("set pid"));
        }
        self.send_order(&Order::SetPid { kp, ki, kd })
    }

    /// Ask the robot for its configuration
    pub fn request_config(&mut self) -> Result<()> {
        if !self.is_legal(Intent::RequestConfig) {
            return Err(Error::IllegalIntent("request config"));
        }
        self.send_order(&Order::RequestConfig)
    }

    /// Start a sensor calibration cycle
    ///
    /// Classic firmware accepts these only while running. The wire protocol
    /// defines no order for them yet, so an accepted intent is logged and
    /// otherwise inert.
    pub fn calibrate(&mut self, target: CalibrationTarget) -> Result<()> {
        if !self.is_legal(Intent::Calibrate(target)) {
            return Err(Error::IllegalIntent("calibrate"));
        }
        log::info!("Calibration requested for {:?} (no wire order defined)", target);
        Ok(())
    }

    /// Ask the robot to shut down
    pub fn remote_shutdown(&mut self) -> Result<()> {
        if !self.is_legal(Intent::RemoteShutdown) {
            return Err(Error::IllegalIntent("remote shutdown"));
        }
        self.send_order(&Order::RemoteShutdown)
    }

    // ----- inbound data ------------------------------------------------------

    /// Feed bytes read from the TCP control channel
    ///
    /// Chunks may cut frames anywhere; the per-channel splitter reassembles
    /// them and every completed frame is applied immediately.
    pub fn handle_control_data(&mut self, bytes: &[u8]) {
        for frame in self.splitter.feed(bytes) {
            self.apply_frame(&frame);
        }
    }

    /// Feed one self-contained UDP telemetry datagram
    pub fn handle_datagram(&mut self, bytes: &[u8]) {
        for frame in protocol::split_datagram(bytes) {
            self.apply_frame(&frame);
        }
    }

    fn apply_frame(&mut self, frame: &str) {
        let Some(cmd) = protocol::parse(frame) else {
            // Best-effort protocol: malformed frames are inert by design
            log::debug!("Dropping malformed frame: {:?}", frame);
            return;
        };
        match cmd {
            Command::Orientation(quat) => {
                self.telemetry.set_orientation(quat);
                self.emit(LinkEvent::OrientationChanged(quat));
            }
            Command::PidSample { x, input, output } => {
                let cleared = self.telemetry.push_pid_sample(x, input, output);
                self.emit(LinkEvent::PidSampleAdded {
                    series: PidSeries::Input,
                    x,
                    y: input,
                });
                if let Some(y) = output {
                    self.emit(LinkEvent::PidSampleAdded {
                        series: PidSeries::Output,
                        x,
                        y,
                    });
                } else if cleared {
                    self.emit(LinkEvent::PidOutputCleared);
                }
            }
            Command::Config(config) => {
                log::info!(
                    "Robot config: kp={} ki={} kd={} setpoint={}",
                    config.kp,
                    config.ki,
                    config.kd,
                    config.setpoint
                );
                self.last_config = Some(config);
                self.emit(LinkEvent::ConfigReceived(config));
            }
        }
    }

    // ----- internals ---------------------------------------------------------

    fn send_order(&mut self, order: &Order) -> Result<()> {
        if !self.link.is_open() {
            return Err(Error::NotConnected);
        }
        let frame = order.encode();
        log::debug!("Sending order: {:?}", frame);
        if let Err(e) = self.link.send(frame.as_bytes()) {
            // A failed write means the channel is gone
            self.handle_link_error(&e.to_string());
            return Err(e);
        }
        Ok(())
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.emit(LinkEvent::ConnectionStateChanged(state));
        }
    }

    fn set_flags(&mut self, flags: ControlFlags) {
        if self.flags != flags {
            self.flags = flags;
            self.emit(LinkEvent::ControlFlagsChanged(flags));
        }
    }

    fn emit(&self, event: LinkEvent) {
        // Receiver gone means the presentation layer shut down first
        let _ = self.events.send(event);
    }
}
