use desync::{BinarySemaphore, Condition, CountingSemaphore, EventId, Simulation};
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn signals_wake_waiters_in_registration_order_at_signal_time() {
    let woken: Rc<RefCell<Vec<(&'static str, u64)>>> = Rc::default();
    let mut sim = Simulation::new(0_u64);
    let cond = Condition::new();

    for label in ["first", "second"] {
        let woken = Rc::clone(&woken);
        cond.wait(move |sim: &mut Simulation<u64>| {
            woken.borrow_mut().push((label, *sim.now()));
        });
    }

    for signal_time in [5, 10] {
        let cond = cond.clone();
        sim.schedule(signal_time, move |sim: &mut Simulation<u64>| {
            cond.signal(sim);
        });
    }
    sim.run_until_done();

    assert_eq!(*woken.borrow(), vec![("first", 5), ("second", 10)]);
}

#[test]
fn broadcast_from_inside_an_action_wakes_everyone_at_that_instant() {
    let woken: Rc<RefCell<Vec<(&'static str, u64)>>> = Rc::default();
    let mut sim = Simulation::new(0_u64);
    let cond = Condition::new();

    for label in ["a", "b", "c"] {
        let woken = Rc::clone(&woken);
        cond.wait(move |sim: &mut Simulation<u64>| {
            woken.borrow_mut().push((label, *sim.now()));
        });
    }

    let broadcaster = cond.clone();
    sim.schedule(42, move |sim: &mut Simulation<u64>| {
        broadcaster.broadcast(sim);
    });
    sim.run_until_done();

    assert_eq!(*woken.borrow(), vec![("a", 42), ("b", 42), ("c", 42)]);
    assert!(cond.is_empty());
}

/// The timeout idiom from the crate's concurrency model: a wait and a deadline race, and whichever fires first
/// cancels the other. Signalled in time here, so the deadline must come back already-cancelled.
#[test]
fn timed_wait_won_by_the_signal() {
    let outcome: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let mut sim = Simulation::new(0_u64);
    let cond = Condition::new();
    let deadline_id: Rc<Cell<Option<EventId>>> = Rc::default();

    let wake_outcome = Rc::clone(&outcome);
    let pending_deadline = Rc::clone(&deadline_id);
    let wait_id = cond.wait(move |sim: &mut Simulation<u64>| {
        if let Some(id) = pending_deadline.get() {
            assert!(sim.cancel(id), "deadline still pending when the signal wins");
        }
        wake_outcome.borrow_mut().push("woken");
    });

    let timeout_outcome = Rc::clone(&outcome);
    let abandoned = cond.clone();
    let id = sim.schedule(10, move |_: &mut Simulation<u64>| {
        if abandoned.cancel(wait_id) {
            timeout_outcome.borrow_mut().push("timed out");
        }
    });
    deadline_id.set(Some(id));

    let signaller = cond.clone();
    sim.schedule(5, move |sim: &mut Simulation<u64>| {
        signaller.signal(sim);
    });
    sim.run_until_done();

    assert_eq!(*outcome.borrow(), vec!["woken"]);
}

#[test]
fn timed_wait_lost_to_the_deadline() {
    let outcome: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let mut sim = Simulation::new(0_u64);
    let cond = Condition::new();

    let wake_outcome = Rc::clone(&outcome);
    let wait_id = cond.wait(move |_: &mut Simulation<u64>| {
        wake_outcome.borrow_mut().push("woken");
    });

    let timeout_outcome = Rc::clone(&outcome);
    let abandoned = cond.clone();
    sim.schedule(10, move |_: &mut Simulation<u64>| {
        if abandoned.cancel(wait_id) {
            timeout_outcome.borrow_mut().push("timed out");
        }
    });

    // The signal arrives too late: the waiter is gone, so this is a no-op.
    let signaller = cond.clone();
    sim.schedule(20, move |sim: &mut Simulation<u64>| {
        signaller.signal(sim);
    });
    sim.run_until_done();

    assert_eq!(*outcome.borrow(), vec!["timed out"]);
}

#[derive(Default)]
struct Gauge {
    active: isize,
    peak: isize,
    completed: usize,
}

#[test]
fn counting_semaphore_peaks_at_exactly_its_capacity() {
    const CAPACITY: usize = 3;
    const CUSTOMERS: usize = 10;

    let gauge: Rc<RefCell<Gauge>> = Rc::default();
    let mut sim = Simulation::new(0_u64);
    let tellers = CountingSemaphore::new(CAPACITY);

    for customer in 0..CUSTOMERS {
        let gauge = Rc::clone(&gauge);
        let exit = tellers.clone();
        tellers.acquire(&mut sim, move |sim: &mut Simulation<u64>| {
            {
                let mut gauge = gauge.borrow_mut();
                gauge.active += 1;
                gauge.peak = gauge.peak.max(gauge.active);
            }
            let service_time = 4 + (customer % 5) as u64;
            sim.schedule(sim.now() + service_time, move |sim: &mut Simulation<u64>| {
                let mut g = gauge.borrow_mut();
                g.active -= 1;
                g.completed += 1;
                drop(g);
                exit.release(sim);
            });
        });
    }
    sim.run_until_done();

    let gauge = gauge.borrow();
    assert_eq!(gauge.peak, CAPACITY as isize, "admissions must saturate the capacity");
    assert_eq!(gauge.completed, CUSTOMERS, "every acquisition must eventually execute");
    assert_eq!(gauge.active, 0, "all permits returned");
}

#[test]
fn binary_semaphore_holders_never_overlap() {
    let in_critical = Rc::new(Cell::new(false));
    let completions = Rc::new(Cell::new(0_usize));
    let mut sim = Simulation::new(0_u64);
    let gate = BinarySemaphore::new();

    for holder in 0..6_u64 {
        let in_critical = Rc::clone(&in_critical);
        let completions = Rc::clone(&completions);
        let exit = gate.clone();
        gate.acquire(&mut sim, move |sim: &mut Simulation<u64>| {
            assert!(!in_critical.get(), "two holders inside the critical section");
            in_critical.set(true);
            sim.schedule(sim.now() + 3 + holder, move |sim: &mut Simulation<u64>| {
                assert!(in_critical.get());
                in_critical.set(false);
                completions.set(completions.get() + 1);
                exit.release(sim);
            });
        });
    }
    sim.run_until_done();

    assert_eq!(completions.get(), 6);
    assert!(!in_critical.get());
}

/// Staggered arrivals with exponential service times, in integer microtick units so the clock stays an integer.
/// Structural invariants must hold for any draw: nobody is dropped, capacity is never exceeded, permits balance.
#[test]
fn randomized_service_times_never_exceed_teller_capacity() {
    const CAPACITY: usize = 3;
    const CUSTOMERS: usize = 25;

    let mut rng = Pcg64::seed_from_u64(7082446179938253086);
    let interarrival = Exp::new(1.0 / 40.0).unwrap();
    let service = Exp::new(1.0 / 90.0).unwrap();

    let gauge: Rc<RefCell<Gauge>> = Rc::default();
    let mut sim = Simulation::new(0_u64);
    let tellers = CountingSemaphore::new(CAPACITY);

    let mut arrival_time = 0_u64;
    for _ in 0..CUSTOMERS {
        arrival_time += 1 + interarrival.sample(&mut rng) as u64;
        let service_time = 1 + service.sample(&mut rng) as u64;

        let gauge = Rc::clone(&gauge);
        let tellers_at_arrival = tellers.clone();
        sim.schedule(arrival_time, move |sim: &mut Simulation<u64>| {
            let exit = tellers_at_arrival.clone();
            let gauge_at_exit = Rc::clone(&gauge);
            tellers_at_arrival.acquire(sim, move |sim: &mut Simulation<u64>| {
                {
                    let mut gauge = gauge_at_exit.borrow_mut();
                    gauge.active += 1;
                    gauge.peak = gauge.peak.max(gauge.active);
                    assert!(gauge.active <= CAPACITY as isize, "capacity breached");
                }
                sim.schedule(sim.now() + service_time, move |sim: &mut Simulation<u64>| {
                    let mut g = gauge_at_exit.borrow_mut();
                    g.active -= 1;
                    g.completed += 1;
                    drop(g);
                    exit.release(sim);
                });
            });
        });
    }
    sim.run_until_done();

    let gauge = gauge.borrow();
    assert_eq!(gauge.completed, CUSTOMERS);
    assert_eq!(gauge.active, 0);
    assert!(gauge.peak >= 1 && gauge.peak <= CAPACITY as isize);
    assert!(*sim.now() >= arrival_time, "the last arrival must have been processed");
}
