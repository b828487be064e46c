use std::fmt::Display;
use std::io;
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use data_model::CsvRecord;

use crate::recorder::SampleLog;

/// One measurement capability. `Err` means the measurement is unavailable
/// this cycle; it is reported, never propagated further.
pub(crate) trait Probe {
    type Sample: CsvRecord + Display + Send + 'static;

    fn name(&self) -> &'static str;
    fn measure(&self) -> Result<Self::Sample, io::Error>;
}

/// Pairs one probe with one log at a fixed cadence. Each task runs forever on
/// its own thread and shares nothing with its siblings.
pub(crate) struct PeriodicTask<P: Probe> {
    probe: P,
    log: SampleLog<P::Sample>,
    period: Duration,
}

impl<P: Probe> PeriodicTask<P> {
    pub fn new(probe: P, log: SampleLog<P::Sample>, period: Duration) -> Self {
        PeriodicTask { probe, log, period }
    }

    // One measure-record cycle. Returns the sleep remaining until the next
    // cycle, measured from cycle start so probe latency never stretches the
    // period (it can only shrink the sleep, to zero at worst).
    fn cycle(&mut self) -> Duration {
        let cycle_start = Instant::now();

        match self.probe.measure() {
            Ok(sample) => {
                println!("{sample}");
                if let Err(e) = self.log.append(&sample) {
                    eprintln!(
                        "Error recording {} sample: {e}: sample dropped",
                        self.probe.name()
                    );
                }
            }
            Err(e) => eprintln!(
                "{} measurement unavailable: {e}: skipping this cycle",
                self.probe.name()
            ),
        }

        self.period.saturating_sub(cycle_start.elapsed())
    }

    pub fn spawn(mut self) -> JoinHandle<()>
    where
        P: Send + 'static,
    {
        thread::spawn(move || loop {
            let remaining = self.cycle();
            thread::sleep(remaining);
        })
    }
}

#[cfg(test)]
mod test {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use data_model::LatencySample;

    use super::{PeriodicTask, Probe};
    use crate::recorder::SampleLog;

    // Deterministic stand-in for the external ping utility
    struct FixedLatencyProbe {
        times: Vec<f64>,
        delay: Duration,
        cycles: Arc<AtomicUsize>,
    }

    impl FixedLatencyProbe {
        fn new(times: Vec<f64>) -> Self {
            FixedLatencyProbe {
                times,
                delay: Duration::ZERO,
                cycles: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Probe for FixedLatencyProbe {
        type Sample = LatencySample;

        fn name(&self) -> &'static str {
            "ping"
        }

        fn measure(&self) -> Result<LatencySample, io::Error> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            crate::ping::stats("2024-01-01 12:00:00".to_owned(), &self.times, 3)
        }
    }

    fn open_log(dir: &tempfile::TempDir) -> SampleLog<LatencySample> {
        SampleLog::open(&dir.path().join("ping_log.csv")).unwrap()
    }

    #[test]
    fn successful_cycle_appends_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut task = PeriodicTask::new(
            FixedLatencyProbe::new(vec![10.0, 12.0, 11.0]),
            open_log(&dir),
            Duration::from_secs(5),
        );

        task.cycle();

        let contents = std::fs::read_to_string(dir.path().join("ping_log.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2024-01-01 12:00:00,10.00,11.00,12.00,0.00");
    }

    #[test]
    fn unavailable_probe_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut task = PeriodicTask::new(
            FixedLatencyProbe::new(vec![]),
            open_log(&dir),
            Duration::from_secs(5),
        );

        task.cycle();
        task.cycle();

        let contents = std::fs::read_to_string(dir.path().join("ping_log.csv")).unwrap();
        // header only, no placeholder rows
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn probe_latency_eats_into_the_sleep_budget() {
        let dir = tempfile::tempdir().unwrap();
        let mut probe = FixedLatencyProbe::new(vec![10.0]);
        probe.delay = Duration::from_millis(40);
        let mut task = PeriodicTask::new(probe, open_log(&dir), Duration::from_millis(100));

        let remaining = task.cycle();
        assert!(remaining <= Duration::from_millis(60));
    }

    #[test]
    fn probe_slower_than_period_floors_sleep_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut probe = FixedLatencyProbe::new(vec![10.0]);
        probe.delay = Duration::from_millis(30);
        let mut task = PeriodicTask::new(probe, open_log(&dir), Duration::from_millis(10));

        assert_eq!(task.cycle(), Duration::ZERO);
    }

    #[test]
    fn failing_task_does_not_stop_a_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let failing = FixedLatencyProbe::new(vec![]);
        let working = FixedLatencyProbe::new(vec![10.0, 12.0, 11.0]);
        let working_cycles = working.cycles.clone();

        let failing_log: SampleLog<LatencySample> =
            SampleLog::open(&dir.path().join("failing_log.csv")).unwrap();
        let working_log: SampleLog<LatencySample> =
            SampleLog::open(&dir.path().join("working_log.csv")).unwrap();

        PeriodicTask::new(failing, failing_log, Duration::from_millis(10)).spawn();
        PeriodicTask::new(working, working_log, Duration::from_millis(10)).spawn();

        std::thread::sleep(Duration::from_millis(100));

        // The working task kept its cadence despite the sibling failing every
        // cycle, and the failing task wrote no rows
        assert!(working_cycles.load(Ordering::SeqCst) >= 2);
        let working_contents =
            std::fs::read_to_string(dir.path().join("working_log.csv")).unwrap();
        assert!(working_contents.lines().count() >= 3);
        let failing_contents =
            std::fs::read_to_string(dir.path().join("failing_log.csv")).unwrap();
        assert_eq!(failing_contents.lines().count(), 1);
    }
}
