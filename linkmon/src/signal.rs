use std::io;
use std::process::Command;

use data_model::{timestamp_now, SignalSample};

use crate::task::Probe;

#[cfg(target_os = "macos")]
const AIRPORT_PATH: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

/// Reads the signal strength of the current wifi association from the
/// platform tool and derives an approximate percentage from the raw dBm
pub(crate) struct SignalProbe {
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    interface: String,
}

impl SignalProbe {
    pub fn new(interface: String) -> Self {
        SignalProbe { interface }
    }
}

impl Probe for SignalProbe {
    type Sample = SignalSample;

    fn name(&self) -> &'static str {
        "signal"
    }

    fn measure(&self) -> Result<SignalSample, io::Error> {
        let timestamp = timestamp_now();
        let rssi = self.get_rssi()?;

        Ok(SignalSample {
            timestamp,
            rssi_dbm: rssi,
            strength_pct: strength_percentage(rssi),
        })
    }
}

/// Approximate conversion from dBm to a 0-100 strength percentage
pub(crate) fn strength_percentage(rssi_dbm: i32) -> u8 {
    ((rssi_dbm + 100) * 2).clamp(0, 100) as u8
}

impl SignalProbe {
    #[cfg(target_os = "macos")]
    fn get_rssi(&self) -> Result<i32, io::Error> {
        let output = Command::new(AIRPORT_PATH)
            .arg("-I")
            .output()
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Could not execute 'airport': {e}"),
                )
            })?;

        parse_rssi(&String::from_utf8_lossy(&output.stdout), "agrCtlRSSI")
    }

    #[cfg(target_os = "linux")]
    fn get_rssi(&self) -> Result<i32, io::Error> {
        let output = Command::new("iw")
            .arg("dev")
            .arg(&self.interface)
            .arg("link")
            .output()
            .map_err(|e| {
                io::Error::new(io::ErrorKind::NotFound, format!("Could not execute 'iw': {e}"))
            })?;

        parse_rssi(&String::from_utf8_lossy(&output.stdout), "signal")
    }
}

// The marker line reads "<marker>: <value> [dBm]"; split on ':' and take the
// leading number of the remainder
fn parse_rssi(data: &str, marker: &str) -> Result<i32, io::Error> {
    for line in data.lines() {
        let mut pair = line.trim().split(':');
        if pair.next().map(str::trim) == Some(marker) {
            let value = pair
                .next()
                .and_then(|rest| rest.trim().split(' ').next())
                .and_then(|num| num.parse::<i32>().ok());
            return value.ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Could not parse '{marker}' value: '{line}'"),
                )
            });
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("No '{marker}' line in tool output"),
    ))
}
