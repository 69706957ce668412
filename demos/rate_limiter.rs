//! Two periodic producers share one uplink, modeled as a binary
//! semaphore. Each producer fires on its own cadence and holds
//! the link for a fixed transmission time, so jobs that land
//! while the link is busy queue up and drain in arrival order.
//!
//! Run it to watch the contention unfold on stderr.

use desync::{ticker, BinarySemaphore, Simulation};
use std::cell::Cell;
use std::rc::Rc;

fn submit(sim: &mut Simulation<u64>, link: BinarySemaphore<u64>, name: &'static str, hold: u64, sent: Rc<Cell<usize>>) {
    log::debug!("{} job queued at {}", name, sim.now());
    let exit = link.clone();
    link.acquire(sim, move |sim: &mut Simulation<u64>| {
        log::info!("{} job takes the link at {}", name, sim.now());
        sim.schedule(sim.now() + hold, move |sim: &mut Simulation<u64>| {
            log::info!("{} job done at {}", name, sim.now());
            sent.set(sent.get() + 1);
            exit.release(sim);
        });
    });
}

fn set_up_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn main() {
    set_up_logger().expect("logger installs once");

    let mut sim = Simulation::new(0_u64);
    let link = BinarySemaphore::new();
    let sent = Rc::new(Cell::new(0_usize));

    for (name, period, hold) in [("telemetry", 7, 4), ("audit", 11, 6)] {
        let link = link.clone();
        let sent = Rc::clone(&sent);
        ticker(&mut sim, period, period, move |sim: &mut Simulation<u64>| {
            submit(sim, link.clone(), name, hold, Rc::clone(&sent));
        });
    }

    sim.run_until(200);
    println!("{} transmissions completed by time {}", sent.get(), sim.now());
}
