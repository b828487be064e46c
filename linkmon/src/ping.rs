use std::io;
use std::process::Command;

use data_model::{timestamp_now, LatencySample};

use crate::task::Probe;

/// Measures round-trip latency by running the system `ping` utility and
/// parsing the per-attempt times out of its output
pub(crate) struct PingProbe {
    host: String,
    count: u32,
}

impl PingProbe {
    pub fn new(host: String, count: u32) -> Self {
        PingProbe { host, count }
    }
}

impl Probe for PingProbe {
    type Sample = LatencySample;

    fn name(&self) -> &'static str {
        "ping"
    }

    fn measure(&self) -> Result<LatencySample, io::Error> {
        let timestamp = timestamp_now();
        let output = Command::new("ping")
            .arg("-c")
            .arg(self.count.to_string())
            .arg(&self.host)
            .output()
            .map_err(|e| {
                io::Error::new(io::ErrorKind::NotFound, format!("Could not execute 'ping': {e}"))
            })?;

        let times = parse_times(&String::from_utf8_lossy(&output.stdout));
        stats(timestamp, &times, self.count)
    }
}

// Each reply line carries "time=<float> ms"; lines without a time (timeouts,
// the summary) are skipped
fn parse_times(data: &str) -> Vec<f64> {
    let mut times = Vec::new();

    for line in data.lines() {
        if let Some(rest) = line.split("time=").nth(1) {
            if let Some(time) = rest.split(' ').next() {
                if let Ok(ms) = time.parse::<f64>() {
                    times.push(ms);
                }
            }
        }
    }

    times
}

/// min/avg/max over the observed times, plus the share of the `count`
/// attempts that produced no time. No times at all means no sample.
pub(crate) fn stats(
    timestamp: String,
    times: &[f64],
    count: u32,
) -> Result<LatencySample, io::Error> {
    if times.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "No replies received",
        ));
    }

    let min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = times.iter().sum::<f64>() / times.len() as f64;
    let lost = count.saturating_sub(times.len() as u32);
    let packet_loss = lost as f64 / count as f64 * 100.0;

    Ok(LatencySample {
        timestamp,
        min_ms: min,
        avg_ms: avg,
        max_ms: max,
        packet_loss,
    })
}
