use std::io;
use std::process::Command;

use data_model::{timestamp_now, ThroughputSample};
use serde_derive::Deserialize;

use crate::task::Probe;

/// Measures bandwidth by running `speedtest-cli` against its auto-selected
/// best server and parsing the json report
pub(crate) struct SpeedProbe;

// The fields of the json report we use; rates are raw per-second values
#[derive(Deserialize, Debug, PartialEq)]
struct SpeedTestReport {
    download: f64,
    upload: f64,
    ping: f64,
}

impl Probe for SpeedProbe {
    type Sample = ThroughputSample;

    fn name(&self) -> &'static str {
        "speed test"
    }

    fn measure(&self) -> Result<ThroughputSample, io::Error> {
        let timestamp = timestamp_now();
        println!("Starting speed test...");

        let output = Command::new("speedtest-cli").arg("--json").output().map_err(|e| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("Could not execute 'speedtest-cli': {e}"),
            )
        })?;

        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}", String::from_utf8_lossy(&output.stderr)),
            ));
        }

        let report: SpeedTestReport =
            serde_json::from_slice(&output.stdout).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Could not parse speed test report: {e}"),
                )
            })?;

        Ok(normalize(timestamp, &report))
    }
}

// Raw per-second rates become Mbps, everything rounded to two decimals
fn normalize(timestamp: String, report: &SpeedTestReport) -> ThroughputSample {
    ThroughputSample {
        timestamp,
        download_mbps: round2(report.download / 1_000_000.0),
        upload_mbps: round2(report.upload / 1_000_000.0),
        ping_ms: round2(report.ping),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::{normalize, round2, SpeedTestReport};

    const REPORT_JSON: &str = r#"{
        "download": 68380000.0,
        "upload": 19433000.0,
        "ping": 35.811,
        "server": {"sponsor": "Example", "d": 12.3},
        "timestamp": "2024-01-01T12:00:00.000000Z",
        "bytes_sent": 25165824,
        "bytes_received": 85877492,
        "share": null
    }"#;

    #[test]
    fn parse_report_ignores_extra_fields() {
        let report: SpeedTestReport = serde_json::from_str(REPORT_JSON).unwrap();
        assert_eq!(
            report,
            SpeedTestReport {
                download: 68_380_000.0,
                upload: 19_433_000.0,
                ping: 35.811,
            }
        );
    }

    #[test]
    fn normalize_to_mbps_and_two_decimals() {
        let report: SpeedTestReport = serde_json::from_str(REPORT_JSON).unwrap();
        let sample = normalize("2024-01-01 12:00:00".to_owned(), &report);
        assert_eq!(sample.download_mbps, 68.38);
        assert_eq!(sample.upload_mbps, 19.43);
        assert_eq!(sample.ping_ms, 35.81);
    }

    #[test]
    fn round2_halfway_rounds_up() {
        assert_eq!(round2(1.005), 1.0); // binary representation lands below .005
        assert_eq!(round2(1.015000000000001), 1.02);
        assert_eq!(round2(123.456), 123.46);
    }
}
