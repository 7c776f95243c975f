//! Telemetry state fed by decoded inbound commands
//!
//! [`TelemetryModel`] is the single holder of decoded telemetry: the latest
//! orientation quaternion (no history) and the growing PID input/output
//! sample series used for tuning plots. The session updates it from every
//! parsed frame as it arrives; renderers read it at their own cadence, so
//! orientation samples may be coalesced from the renderer's point of view
//! but are never dropped from the model's.
//!
//! Orientation components are stored exactly as received; the robot is
//! trusted to send a rotation quaternion and no normalization is applied.

/// Identifies one of the two PID plot series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidSeries {
    /// Controller input samples
    Input,
    /// Controller output samples
    Output,
}

/// Latest orientation plus PID sample series
#[derive(Debug, Default)]
pub struct TelemetryModel {
    orientation: Option<[f64; 4]>,
    input_series: Vec<(f64, f64)>,
    output_series: Vec<(f64, f64)>,
}

impl TelemetryModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the orientation with the latest received quaternion
    pub fn set_orientation(&mut self, quat: [f64; 4]) {
        self.orientation = Some(quat);
    }

    /// Latest orientation, `None` until the first `q` frame arrives
    pub fn orientation(&self) -> Option<[f64; 4]> {
        self.orientation
    }

    /// Append one PID sample
    ///
    /// A sample without an output value marks a protocol-level mode change
    /// (the autonomous loop currently reports no controller output): the
    /// output series is cleared going forward. Returns `true` if that clear
    /// actually discarded samples.
    pub fn push_pid_sample(&mut self, x: f64, input: f64, output: Option<f64>) -> bool {
        self.input_series.push((x, input));
        match output {
            Some(y) => {
                self.output_series.push((x, y));
                false
            }
            None => {
                let had_samples = !self.output_series.is_empty();
                self.output_series.clear();
                had_samples
            }
        }
    }

    /// Samples of one series, oldest first
    pub fn series(&self, series: PidSeries) -> &[(f64, f64)] {
        match series {
            PidSeries::Input => &self.input_series,
            PidSeries::Output => &self.output_series,
        }
    }
}
