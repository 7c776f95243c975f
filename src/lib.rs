//! sarathi-link - Operator-side link engine for an IMU-balanced robot
//!
//! This library implements the protocol and control-state core of a ground
//! station: frame reassembly and command decoding for the robot's ASCII
//! wire protocol, order encoding for operator intents, the telemetry model
//! behind the orientation and PID tuning views, and the session state
//! machine that decides which intents are legal at any moment.
//!
//! Rendering and window chrome are someone else's job: the session
//! publishes [`session::LinkEvent`]s and a presentation layer of any kind
//! subscribes.

pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use session::{Generation, LinkSession};
