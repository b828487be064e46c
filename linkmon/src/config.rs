use std::path::PathBuf;
use std::time::Duration;
use std::{env, io};

use serde_derive::{Deserialize, Serialize};

pub(crate) const CONFIG_FILE_NAME: &str = "linkmon.toml";

const DEFAULT_PING_PERIOD_SECONDS: u64 = 5;
const DEFAULT_PING_HOST: &str = "8.8.8.8";
const DEFAULT_PING_COUNT: u32 = 3;
const DEFAULT_SPEED_PERIOD_SECONDS: u64 = 300;
const DEFAULT_SIGNAL_PERIOD_SECONDS: u64 = 5;
const DEFAULT_SIGNAL_INTERFACE: &str = "wlan0";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct PingSpec {
    period_seconds: Option<u64>,
    host: Option<String>,
    count: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct SpeedSpec {
    period_seconds: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct SignalSpec {
    period_seconds: Option<u64>,
    interface: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct LogSpec {
    directory: Option<String>,
}

#[derive(Default, Serialize, Deserialize)]
pub(crate) struct Config {
    #[serde(rename = "ping")]
    pub ping_spec: Option<PingSpec>,
    #[serde(rename = "speed")]
    pub speed_spec: Option<SpeedSpec>,
    #[serde(rename = "signal")]
    pub signal_spec: Option<SignalSpec>,
    #[serde(rename = "log")]
    pub log_spec: Option<LogSpec>,
    #[serde(skip)]
    pub ping_period: Duration,
    #[serde(skip)]
    pub ping_host: String,
    #[serde(skip)]
    pub ping_count: u32,
    #[serde(skip)]
    pub speed_period: Duration,
    #[serde(skip)]
    pub signal_period: Duration,
    #[serde(skip)]
    pub signal_interface: String,
    #[serde(skip)]
    pub log_directory: PathBuf,
}

/// Load config from the nearest `linkmon.toml`, falling back to the built-in
/// default cadences and host when no file exists
pub(crate) fn load_config() -> Config {
    match find_config_file(CONFIG_FILE_NAME) {
        Ok(config_file_path) => match read_config(&config_file_path) {
            Ok(config) => {
                println!("Config file loaded from: \"{}\"", config_file_path.display());
                config
            }
            Err(e) => {
                eprintln!(
                    "Could not read config file '{}': {e}: using defaults",
                    config_file_path.display()
                );
                resolve(Config::default())
            }
        },
        Err(_) => resolve(Config::default()),
    }
}

pub(crate) fn find_config_file(file_name: &str) -> Result<PathBuf, io::Error> {
    let mut dir = env::current_dir().ok();

    // Loop until no parent director exists. (i.e. stop at "/")
    while let Some(directory) = dir {
        let config_path = directory.join(file_name);

        if config_path.exists() {
            return Ok(config_path);
        }

        dir = directory.parent().map(|p| p.to_path_buf());
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "linkmon toml config file not found",
    ))
}

pub(crate) fn read_config(config_file_path: &PathBuf) -> Result<Config, io::Error> {
    let config_string = std::fs::read_to_string(config_file_path)?;
    let config: Config = toml::from_str(&config_string)
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "Could not parse toml config file"))?;

    Ok(resolve(config))
}

// Fill the skipped fields from the optional specs, defaulting any field the
// file does not set
fn resolve(mut config: Config) -> Config {
    let ping = config.ping_spec.as_ref();
    config.ping_period = Duration::from_secs(
        ping.and_then(|spec| spec.period_seconds)
            .unwrap_or(DEFAULT_PING_PERIOD_SECONDS),
    );
    config.ping_host = ping
        .and_then(|spec| spec.host.clone())
        .unwrap_or_else(|| DEFAULT_PING_HOST.to_owned());
    config.ping_count = ping
        .and_then(|spec| spec.count)
        .unwrap_or(DEFAULT_PING_COUNT);

    config.speed_period = Duration::from_secs(
        config
            .speed_spec
            .as_ref()
            .and_then(|spec| spec.period_seconds)
            .unwrap_or(DEFAULT_SPEED_PERIOD_SECONDS),
    );

    let signal = config.signal_spec.as_ref();
    config.signal_period = Duration::from_secs(
        signal
            .and_then(|spec| spec.period_seconds)
            .unwrap_or(DEFAULT_SIGNAL_PERIOD_SECONDS),
    );
    config.signal_interface = signal
        .and_then(|spec| spec.interface.clone())
        .unwrap_or_else(|| DEFAULT_SIGNAL_INTERFACE.to_owned());

    config.log_directory = config
        .log_spec
        .as_ref()
        .and_then(|spec| spec.directory.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    config
}
