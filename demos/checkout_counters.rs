//! A checkout line with three tellers, modeled as a counting
//! semaphore. Customers arrive with exponentially distributed
//! spacing and hold a teller for an exponentially distributed
//! service time; arrivals stop once the shop closes and the
//! simulation drains the remaining customers.
//!
//! Per-event activity goes to stderr through the `log` facade,
//! and a summary of the day prints to stdout at the end.

use desync::{CountingSemaphore, Simulation};
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::ops::Add;
use std::rc::Rc;

/// Wrap f64 with a new type so we can implement the Ord trait.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
struct Minutes(f64);

impl Eq for Minutes {}

impl Ord for Minutes {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl desync::SimTime for Minutes {}

impl Add<f64> for Minutes {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

struct Stats {
    served: usize,
    total_wait: f64,
}

/// Everything the closures need to share: the teller pool, the
/// random number generator, and the running statistics.
struct Shop {
    tellers: CountingSemaphore<Minutes>,
    rng: RefCell<Pcg64>,
    arrivals: Exp<f64>,
    services: Exp<f64>,
    close_time: f64,
    stats: RefCell<Stats>,
}

impl Shop {
    fn new(num_tellers: usize, close_time: f64) -> Self {
        Self {
            tellers: CountingSemaphore::new(num_tellers),
            rng: RefCell::new(Pcg64::seed_from_u64(13009076887838060007)),
            arrivals: Exp::new(1.0 / 4.0).unwrap(),
            services: Exp::new(1.0 / 10.0).unwrap(),
            close_time,
            stats: RefCell::new(Stats {
                served: 0,
                total_wait: 0.0,
            }),
        }
    }

    fn draw_interarrival(&self) -> f64 {
        self.arrivals.sample(&mut *self.rng.borrow_mut())
    }

    fn draw_service(&self) -> f64 {
        self.services.sample(&mut *self.rng.borrow_mut())
    }
}

fn schedule_arrival(sim: &mut Simulation<Minutes>, shop: Rc<Shop>) {
    let time = *sim.now() + shop.draw_interarrival();
    let next = Rc::clone(&shop);
    sim.schedule(time, move |sim: &mut Simulation<Minutes>| arrive(sim, next));
}

fn arrive(sim: &mut Simulation<Minutes>, shop: Rc<Shop>) {
    if sim.now().0 >= shop.close_time {
        log::info!("doors close at {:.3}; serving whoever is inside", sim.now().0);
        return;
    }
    log::info!("customer arrives at {:.3}", sim.now().0);

    let arrived_at = *sim.now();
    let for_service = Rc::clone(&shop);
    shop.tellers
        .acquire(sim, move |sim: &mut Simulation<Minutes>| serve(sim, for_service, arrived_at));

    schedule_arrival(sim, shop);
}

fn serve(sim: &mut Simulation<Minutes>, shop: Rc<Shop>, arrived_at: Minutes) {
    let wait = sim.now().0 - arrived_at.0;
    shop.stats.borrow_mut().total_wait += wait;
    log::info!("teller free; customer waited {:.3} in line", wait);

    let departure = *sim.now() + shop.draw_service();
    sim.schedule(departure, move |sim: &mut Simulation<Minutes>| {
        log::info!("service complete at {:.3}", sim.now().0);
        shop.stats.borrow_mut().served += 1;
        shop.tellers.release(sim);
    });
}

fn set_up_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn main() {
    set_up_logger().expect("logger installs once");

    let shop = Rc::new(Shop::new(3, 540.0));
    let mut sim = Simulation::new(Minutes(0.0));
    schedule_arrival(&mut sim, Rc::clone(&shop));
    sim.run_until_done();

    let stats = shop.stats.borrow();
    println!("served {} customers by {:.3}", stats.served, sim.now().0);
    println!(
        "average wait for a teller: {:.3} minutes",
        stats.total_wait / stats.served as f64
    );
}
