use std::fmt::{Display, Formatter};

use chrono::Local;
use serde_derive::{Deserialize, Serialize};

/// Wall-clock format used for every sample row, second granularity, local time
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The timestamp recorded with a sample, captured when its measurement starts
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One row of an append-only csv log. `header()` is written once per physical
/// file, `row()` once per successful measurement.
pub trait CsvRecord {
    fn header() -> &'static str;
    fn row(&self) -> String;
}

/// One reading of wifi signal strength from the platform tool
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SignalSample {
    pub timestamp: String,
    pub rssi_dbm: i32,
    pub strength_pct: u8,
}

impl CsvRecord for SignalSample {
    fn header() -> &'static str {
        "timestamp,rssi_dbm,strength_pct"
    }

    fn row(&self) -> String {
        format!("{},{},{}", self.timestamp, self.rssi_dbm, self.strength_pct)
    }
}

impl Display for SignalSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RSSI: {} dBm, Strength: {}%",
            self.rssi_dbm, self.strength_pct
        )
    }
}

/// Round-trip statistics over one batch of ping attempts
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LatencySample {
    pub timestamp: String,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    /// Percentage of attempts that returned no time, 0-100
    pub packet_loss: f64,
}

impl CsvRecord for LatencySample {
    fn header() -> &'static str {
        "timestamp,min_ms,avg_ms,max_ms,packet_loss"
    }

    fn row(&self) -> String {
        format!(
            "{},{:.2},{:.2},{:.2},{:.2}",
            self.timestamp, self.min_ms, self.avg_ms, self.max_ms, self.packet_loss
        )
    }
}

impl Display for LatencySample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ping: {:.2}ms (min {:.2}, max {:.2}, loss {:.2}%)",
            self.avg_ms, self.min_ms, self.max_ms, self.packet_loss
        )
    }
}

/// One bandwidth measurement against the auto-selected server
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ThroughputSample {
    pub timestamp: String,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
}

impl CsvRecord for ThroughputSample {
    fn header() -> &'static str {
        "timestamp,download_mbps,upload_mbps,ping_ms"
    }

    fn row(&self) -> String {
        format!(
            "{},{:.2},{:.2},{:.2}",
            self.timestamp, self.download_mbps, self.upload_mbps, self.ping_ms
        )
    }
}

impl Display for ThroughputSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] Speed Test:", self.timestamp)?;
        writeln!(f, "Download: {:.2} Mbps", self.download_mbps)?;
        writeln!(f, "Upload: {:.2} Mbps", self.upload_mbps)?;
        write!(f, "Ping: {:.2} ms", self.ping_ms)
    }
}
