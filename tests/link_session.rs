//! End-to-end session scenarios over mock capabilities
//!
//! Drives a full operator session the way the console client would:
//! connect, command, receive telemetry over both channels, lose the link,
//! reconnect. Asserts on the wire bytes and the published event stream.

use crossbeam_channel::{unbounded, Receiver};
use sarathi_link::protocol::PidGains;
use sarathi_link::session::{ConnectionState, ControlFlags, LinkEvent};
use sarathi_link::telemetry::PidSeries;
use sarathi_link::transport::{ControlLink, MockLink, MockResolver};
use sarathi_link::{Generation, LinkSession};

fn classic_session() -> (LinkSession, MockLink, Receiver<LinkEvent>) {
    let (tx, rx) = unbounded();
    let link = MockLink::new();
    let session = LinkSession::new(
        Generation::Classic,
        43210,
        Box::new(MockResolver::localhost()),
        Box::new(link.clone()),
        tx,
    );
    (session, link, rx)
}

fn drain(rx: &Receiver<LinkEvent>) -> Vec<LinkEvent> {
    rx.try_iter().collect()
}

#[test]
fn full_tuning_session() {
    let (mut session, link, rx) = classic_session();

    session.connect("robot.local").unwrap();
    assert_eq!(
        drain(&rx),
        [
            LinkEvent::ConnectionStateChanged(ConnectionState::Resolving),
            LinkEvent::ConnectionStateChanged(ConnectionState::Connecting),
            LinkEvent::ConnectionStateChanged(ConnectionState::Connected),
        ]
    );

    // Engage the robot and start streaming PID samples with pushed gains
    session.toggle_running().unwrap();
    session
        .toggle_pid_stream(Some(PidGains {
            kp: 1.0,
            ki: 0.5,
            kd: 0.25,
            setpoint: None,
        }))
        .unwrap();
    assert_eq!(link.sent_text(), "G#P 1 0.5 0.25#");

    // Robot answers over TCP, chunked arbitrarily mid-frame
    session.handle_control_data(b"p 1.0 2.0 ");
    session.handle_control_data(b"3.0#p 2.0 2.1 2.9#");
    assert_eq!(
        session.telemetry().series(PidSeries::Input),
        &[(1.0, 2.0), (2.0, 2.1)]
    );
    assert_eq!(
        session.telemetry().series(PidSeries::Output),
        &[(1.0, 3.0), (2.0, 2.9)]
    );

    // Orientation keeps flowing on the UDP channel meanwhile
    session.handle_datagram(b"q 0.98 0.01 -0.12 0.05#");
    assert_eq!(
        session.telemetry().orientation(),
        Some([0.98, 0.01, -0.12, 0.05])
    );

    // The autonomous loop stops reporting an output: series is cut
    session.handle_control_data(b"p 3.0 2.2#");
    assert!(session.telemetry().series(PidSeries::Output).is_empty());
    assert!(drain(&rx).contains(&LinkEvent::PidOutputCleared));

    // Stop streaming and stand down
    session.toggle_pid_stream(None).unwrap();
    session.toggle_running().unwrap();
    session.disconnect().unwrap();
    assert_eq!(link.sent_text(), "G#P 1 0.5 0.25#N#S#");
    assert!(!link.is_open());
}

#[test]
fn flags_reset_across_a_dropped_link() {
    let (mut session, _link, _rx) = classic_session();

    session.connect("robot.local").unwrap();
    session.toggle_running().unwrap();
    session.toggle_moving(0.5, 0.5).unwrap();
    assert!(session.flags().running);
    assert!(session.flags().moving);

    // Socket dies under us; all modes drop with it
    session.handle_link_error("connection reset by peer");
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(session.flags(), ControlFlags::default());

    // A fresh connection starts from a clean slate
    session.connect("robot.local").unwrap();
    assert_eq!(session.flags(), ControlFlags::default());
    assert!(!session.flags().running);
}

#[test]
fn interleaved_channels_share_one_model() {
    let (mut session, _link, _rx) = classic_session();
    session.connect("robot.local").unwrap();

    // No ordering between the channels; both funnel into the same model
    session.handle_datagram(b"q 1 0 0 0#");
    session.handle_control_data(b"p 1.0 ");
    session.handle_datagram(b"q 0.9 0.1 0 0#");
    session.handle_control_data(b"2.0 3.0#");

    assert_eq!(session.telemetry().orientation(), Some([0.9, 0.1, 0.0, 0.0]));
    assert_eq!(session.telemetry().series(PidSeries::Input), &[(1.0, 2.0)]);
}

#[test]
fn config_round_trip_and_arity_policing() {
    let (mut session, link, rx) = classic_session();
    session.connect("robot.local").unwrap();
    let _ = drain(&rx);

    session.request_config().unwrap();
    assert_eq!(link.sent_text(), "C#");

    // Wrong arity is inert, six fields land in positional order
    session.handle_control_data(b"c 1 2 3 4 5#c 1 2 3 4 5 6 7#");
    assert_eq!(session.last_config(), None);
    assert!(drain(&rx).is_empty());

    session.handle_control_data(b"c 2.5 0.8 0.05 0.95 1.05 -1.5#");
    let config = session.last_config().unwrap();
    assert_eq!(config.kp, 2.5);
    assert_eq!(config.ki, 0.8);
    assert_eq!(config.kd, 0.05);
    assert_eq!(config.speed_factor_left, 0.95);
    assert_eq!(config.speed_factor_right, 1.05);
    assert_eq!(config.setpoint, -1.5);
    assert_eq!(
        drain(&rx),
        [LinkEvent::ConfigReceived(config)]
    );
}

#[test]
fn remote_shutdown_sends_kill_order() {
    let (mut session, link, _rx) = classic_session();
    session.connect("robot.local").unwrap();
    session.remote_shutdown().unwrap();
    assert_eq!(link.sent_text(), "K#");
}
