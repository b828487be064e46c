use std::io;
use std::sync::mpsc::channel;

mod config;
mod monitor;
mod ping;
mod recorder;
mod signal;
mod speed;
mod task;

fn main() -> Result<(), io::Error> {
    let config = config::load_config();

    println!("Starting network performance logging... Press Ctrl-C to stop.");

    let (tx, rx) = channel();
    ctrlc::set_handler(move || tx.send(()).expect("Could not send signal on channel."))
        .expect("Error setting Ctrl-C handler");

    let monitor = monitor::Monitor::start(&config)?;
    monitor.run(rx);

    Ok(())
}
