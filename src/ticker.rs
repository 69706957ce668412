use crate::events::Action;
use crate::{SimTime, Simulation};

use std::ops::Add;

/// Schedule `tick` to fire at `start` and then at a regular `interval` forever after.
///
/// A convenience built purely on [`Simulation::schedule()`]: each firing invokes `tick`, then reschedules itself for
/// the current time plus `interval`. The schedule is unbounded, so drive the simulation with
/// [`Simulation::run_until()`] - [`Simulation::run_until_done()`] would never return - or have `tick` arrange its own
/// cutoff.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let fired = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&fired);
///
/// let mut sim = desync::Simulation::new(0u64);
/// desync::ticker(&mut sim, 0, 3, move |_sim: &mut desync::Simulation<u64>| {
///     counter.set(counter.get() + 1);
/// });
/// sim.run_until(15);
/// assert_eq!(fired.get(), 6); // fires at 0, 3, 6, 9, 12, 15
/// ```
///
/// [`Simulation::schedule()`]: crate::Simulation::schedule
/// [`Simulation::run_until()`]: crate::Simulation::run_until
/// [`Simulation::run_until_done()`]: crate::Simulation::run_until_done
pub fn ticker<Time, F>(sim: &mut Simulation<Time>, start: Time, interval: Time, tick: F)
where
    Time: SimTime + Clone + Add<Output = Time> + 'static,
    F: FnMut(&mut Simulation<Time>) + 'static,
{
    sim.schedule(start, Tick { interval, tick });
}

/// One firing of a periodic schedule. Runs the callback, then moves itself back onto the queue one interval later.
struct Tick<Time, F> {
    interval: Time,
    tick: F,
}

impl<Time, F> Action<Time> for Tick<Time, F>
where
    Time: SimTime + Clone + Add<Output = Time> + 'static,
    F: FnMut(&mut Simulation<Time>) + 'static,
{
    fn run(mut self: Box<Self>, sim: &mut Simulation<Time>) {
        (self.tick)(sim);
        let next = sim.now().clone() + self.interval.clone();
        sim.schedule_boxed(next, self);
    }
}
