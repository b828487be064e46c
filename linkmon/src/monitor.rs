use std::io;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::Config;
use crate::ping::PingProbe;
use crate::recorder::SampleLog;
use crate::signal::SignalProbe;
use crate::speed::SpeedProbe;
use crate::task::{PeriodicTask, Probe};

const PING_LOG_FILE_NAME: &str = "ping_log.csv";
const SPEED_LOG_FILE_NAME: &str = "speed_log.csv";
const SIGNAL_LOG_FILE_NAME: &str = "signal_log.csv";

// How often the supervising thread wakes to check for termination
const HEARTBEAT: Duration = Duration::from_secs(1);

/// Owns the recording tasks, one per measurement kind. Tasks run until the
/// process exits; they are never joined, since the logs are append-only and
/// a sample lost mid-flight at shutdown costs nothing.
pub(crate) struct Monitor {
    tasks: Vec<JoinHandle<()>>,
}

impl Monitor {
    /// Open one log and spawn one task per measurement kind. A log that
    /// cannot be opened disables that kind only; its siblings still start.
    pub fn start(config: &Config) -> Result<Monitor, io::Error> {
        std::fs::create_dir_all(&config.log_directory)?;

        let mut monitor = Monitor { tasks: vec![] };

        monitor.start_task(
            SignalProbe::new(config.signal_interface.clone()),
            &config.log_directory.join(SIGNAL_LOG_FILE_NAME),
            config.signal_period,
        );
        monitor.start_task(
            PingProbe::new(config.ping_host.clone(), config.ping_count),
            &config.log_directory.join(PING_LOG_FILE_NAME),
            config.ping_period,
        );
        monitor.start_task(
            SpeedProbe,
            &config.log_directory.join(SPEED_LOG_FILE_NAME),
            config.speed_period,
        );

        Ok(monitor)
    }

    fn start_task<P>(&mut self, probe: P, log_path: &Path, period: Duration)
    where
        P: Probe + Send + 'static,
    {
        match SampleLog::open(log_path) {
            Ok(log) => self.tasks.push(PeriodicTask::new(probe, log, period).spawn()),
            Err(e) => eprintln!(
                "Could not open log '{}': {e}: {} samples will not be recorded",
                log_path.display(),
                probe.name()
            ),
        }
    }

    /// Hold the calling thread until a termination message arrives. A
    /// "sleep", interruptible by receiving a message to exit. Normal looping
    /// will produce a timeout error, in which case keep waiting.
    pub fn run(self, term_receiver: Receiver<()>) {
        while term_receiver.recv_timeout(HEARTBEAT).is_err() {}

        println!("\nData collection stopped.");
    }

    #[cfg(test)]
    fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
