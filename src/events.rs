use crate::{SimTime, Simulation};

/// A behavior or state change that occurs within a simulation.
///
/// This trait has one required method that describes what happens when the implementing type executes. An action is
/// handed exclusive access to the owning [`Simulation`], allowing it to read the clock, mutate any state it has
/// captured, and schedule or cancel further events.
///
/// Actions are consumed by execution: [`run()`] receives the boxed action by value, which keeps scheduling compatible
/// with one-shot closures and lets self-perpetuating actions move themselves back onto the queue. A blanket
/// implementation is provided for all `FnOnce(&mut Simulation<Time>)` closures, so most call sites never name this
/// trait at all:
///
/// ```
/// let mut sim = desync::Simulation::new(0u64);
/// sim.schedule(5, |sim: &mut desync::Simulation<u64>| {
///     assert_eq!(*sim.now(), 5);
/// });
/// sim.run_until_done();
/// ```
///
/// Implement the trait directly when an action needs to reschedule itself, as a closure cannot capture its own
/// definition.
///
/// [`run()`]: Action::run
pub trait Action<Time>
where
    Time: SimTime,
{
    /// Update the simulation according to the specific type of action. The simulation will invoke this method from
    /// [`Simulation::step()`] once the action's scheduled time is reached, after updating the clock.
    ///
    /// Scheduling or cancelling events on `sim` from inside this method affects only future steps, never the action
    /// currently executing.
    ///
    /// [`Simulation::step()`]: crate::Simulation::step
    fn run(self: Box<Self>, sim: &mut Simulation<Time>);
}

impl<Time, F> Action<Time> for F
where
    Time: SimTime,
    F: FnOnce(&mut Simulation<Time>),
{
    fn run(self: Box<Self>, sim: &mut Simulation<Time>) {
        (*self)(sim);
    }
}

/// Identifier for an event scheduled on a [`Simulation`].
///
/// Assigned in strictly increasing order by [`Simulation::schedule()`], which makes the identifier double as the
/// tie-breaker among events sharing an execution time. Holding an `EventId` permits cancellation through
/// [`Simulation::cancel()`]; identifiers are never reused within one simulation.
///
/// [`Simulation::schedule()`]: crate::Simulation::schedule
/// [`Simulation::cancel()`]: crate::Simulation::cancel
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub(crate) u64);
