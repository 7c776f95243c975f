//! Outbound order encoding
//!
//! Control intents are rendered as ASCII frames: tag, space-separated
//! arguments, terminating `#`, nothing after the delimiter. The catalog is
//! the union across robot firmware generations; which orders are legal at a
//! given moment is the session's business, encoding itself is pure and
//! stateless.
//!
//! | Tag | Args | Meaning |
//! |-----|------|---------|
//! | `G` | 0    | engage autonomous/PID control |
//! | `S` | 0    | disengage autonomous control, halt |
//! | `P` | 0 or 3–4 | start PID telemetry streaming, optionally pushing gains |
//! | `N` | 0    | stop PID telemetry streaming |
//! | `H` | 0    | halt movement |
//! | `M` | 2    | move at given left/right differential speeds |
//! | `C` | 0 or 3 | request configuration, or push kp/ki/kd |
//! | `K` | 0    | request remote shutdown |

/// PID gains pushed alongside a stream-start order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Controller setpoint, omitted by older firmware
    pub setpoint: Option<f64>,
}

/// An outbound control order
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Engage autonomous control; robot starts sending quaternions
    Go,
    /// Disengage autonomous control and halt
    Stop,
    /// Start PID telemetry streaming, optionally pushing gains
    StartPidStream(Option<PidGains>),
    /// Stop PID telemetry streaming
    StopPidStream,
    /// Halt movement
    Halt,
    /// Move at differential speeds
    Move {
        /// Left wheel speed
        left: f64,
        /// Right wheel speed
        right: f64,
    },
    /// Ask the robot for its current configuration
    RequestConfig,
    /// Push PID gains to the robot
    SetPid {
        /// Proportional gain
        kp: f64,
        /// Integral gain
        ki: f64,
        /// Derivative gain
        kd: f64,
    },
    /// Request remote shutdown
    RemoteShutdown,
}

impl Order {
    /// Wire tag for this order
    pub fn tag(&self) -> char {
        match self {
            Order::Go => 'G',
            Order::Stop => 'S',
            Order::StartPidStream(_) => 'P',
            Order::StopPidStream => 'N',
            Order::Halt => 'H',
            Order::Move { .. } => 'M',
            Order::RequestConfig | Order::SetPid { .. } => 'C',
            Order::RemoteShutdown => 'K',
        }
    }

    /// Encode as a complete wire frame, delimiter included
    pub fn encode(&self) -> String {
        let mut frame = self.tag().to_string();
        match self {
            Order::StartPidStream(Some(gains)) => {
                frame.push_str(&format!(" {} {} {}", gains.kp, gains.ki, gains.kd));
                if let Some(setpoint) = gains.setpoint {
                    frame.push_str(&format!(" {}", setpoint));
                }
            }
            Order::Move { left, right } => {
                frame.push_str(&format!(" {} {}", left, right));
            }
            Order::SetPid { kp, ki, kd } => {
                frame.push_str(&format!(" {} {} {}", kp, ki, kd));
            }
            _ => {}
        }
        frame.push(super::framing::DELIMITER);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_arg_orders() {
        assert_eq!(Order::Go.encode(), "G#");
        assert_eq!(Order::Stop.encode(), "S#");
        assert_eq!(Order::StopPidStream.encode(), "N#");
        assert_eq!(Order::Halt.encode(), "H#");
        assert_eq!(Order::RequestConfig.encode(), "C#");
        assert_eq!(Order::RemoteShutdown.encode(), "K#");
        assert_eq!(Order::StartPidStream(None).encode(), "P#");
    }

    #[test]
    fn test_move_encoding() {
        let order = Order::Move {
            left: 1.5,
            right: -1.5,
        };
        assert_eq!(order.encode(), "M 1.5 -1.5#");
        assert_eq!(order.encode().as_bytes(), b"M 1.5 -1.5#");
    }

    #[test]
    fn test_pid_stream_with_gains() {
        let order = Order::StartPidStream(Some(PidGains {
            kp: 1.0,
            ki: 0.5,
            kd: 0.25,
            setpoint: None,
        }));
        assert_eq!(order.encode(), "P 1 0.5 0.25#");

        let order = Order::StartPidStream(Some(PidGains {
            kp: 1.0,
            ki: 0.5,
            kd: 0.25,
            setpoint: Some(-2.5),
        }));
        assert_eq!(order.encode(), "P 1 0.5 0.25 -2.5#");
    }

    #[test]
    fn test_set_pid_encoding() {
        let order = Order::SetPid {
            kp: 2.0,
            ki: 0.0,
            kd: 0.1,
        };
        assert_eq!(order.encode(), "C 2 0 0.1#");
    }

    #[test]
    fn test_encoding_is_pure() {
        let order = Order::Move {
            left: 0.75,
            right: 0.75,
        };
        assert_eq!(order.encode(), order.encode());
    }

    #[test]
    fn test_outbound_tags_inert_inbound() {
        // Outbound tags are unknown to the inbound parser by design
        assert_eq!(crate::protocol::parse("G"), None);
        assert_eq!(crate::protocol::parse("M 1.5 -1.5"), None);
    }
}
