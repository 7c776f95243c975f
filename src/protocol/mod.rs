//! Wire protocol for the robot control link
//!
//! ASCII frames terminated by `#`, single-character tags, space-separated
//! decimal arguments. Inbound frames (robot → operator) are reassembled by
//! [`FrameSplitter`] and decoded by [`parse`]; outbound control intents
//! (operator → robot) are rendered by [`Order::encode`].

pub mod framing;
pub mod orders;
pub mod parser;

pub use framing::{split_datagram, FrameSplitter, DELIMITER};
pub use orders::{Order, PidGains};
pub use parser::{parse, Command, RobotConfig};
