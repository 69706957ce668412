use crate::condition::Condition;
use crate::events::Action;
use crate::{SimTime, Simulation};

use std::cell::RefCell;
use std::fmt::Formatter;
use std::rc::Rc;

/// A permit-counting gate limiting how many actions may be logically "in progress" at once.
///
/// Up to `max` acquired actions may be executing - in the simulation sense of "between acquisition and matching
/// release" - at any virtual instant. Further acquisitions park on an internal [`Condition`] and are admitted, in
/// arrival order, as releases free permits.
///
/// [`acquire()`] never runs anything synchronously: the admission check itself is scheduled as an "as soon as
/// possible" event, so all execution happens inside the single-threaded simulation loop. A `CountingSemaphore` is a
/// cheap-clone handle; clones share the same permit counter and wait queue.
///
/// Every executed action must be paired with exactly one [`release()`]. Calling `release()` without a matching
/// acquisition is not defended against: the permit counter silently leaves its documented range and admission
/// control is corrupted from then on.
///
/// [`acquire()`]: CountingSemaphore::acquire
/// [`release()`]: CountingSemaphore::release
pub struct CountingSemaphore<Time>
where
    Time: SimTime,
{
    shared: Rc<RefCell<Shared<Time>>>,
}

struct Shared<Time>
where
    Time: SimTime,
{
    /// Permit ceiling, fixed at construction. Always at least 1.
    max: isize,
    /// Count of admitted-but-not-yet-released actions. Signed so that an unmatched release runs it negative instead
    /// of being masked.
    executing: isize,
    /// Parked admission checks awaiting a free permit.
    ready: Condition<Time>,
}

impl<Time> CountingSemaphore<Time>
where
    Time: SimTime,
{
    /// Create a semaphore with `max` permits.
    ///
    /// # Panics
    ///
    /// Panics if `max < 1`; a semaphore that can admit nothing is a construction bug, caught before any simulated
    /// time elapses.
    pub fn new(max: usize) -> Self {
        assert!(max >= 1, "semaphore capacity must be at least 1");
        Self {
            shared: Rc::new(RefCell::new(Shared {
                max: max as isize,
                executing: 0,
                ready: Condition::new(),
            })),
        }
    }
}

impl<Time> CountingSemaphore<Time>
where
    Time: SimTime + Clone + 'static,
{
    /// Request admission for `action`.
    ///
    /// The admission check is scheduled at the current virtual time rather than performed here. Once it runs: if a
    /// permit is free, the permit count is incremented and `action` executes immediately; otherwise the check parks
    /// on the internal condition and is retried when a release signals it. Do not forget to call [`release()`] when
    /// the action's logical work is done, unless the permit is intentionally held longer.
    ///
    /// [`release()`]: CountingSemaphore::release
    pub fn acquire<A>(&self, sim: &mut Simulation<Time>, action: A)
    where
        A: Action<Time> + 'static,
    {
        sim.schedule_now(Admission {
            shared: Rc::clone(&self.shared),
            action: Box::new(action),
        });
    }

    /// Return a permit, admitting one parked acquisition if any are waiting.
    ///
    /// Must be paired 1:1 with the execution of a previously acquired action. An unmatched call is undefined: the
    /// permit counter may go negative, silently corrupting admission control thereafter.
    pub fn release(&self, sim: &mut Simulation<Time>) {
        let ready = {
            let mut shared = self.shared.borrow_mut();
            shared.executing -= 1;
            log::trace!("semaphore release: {}/{} executing", shared.executing, shared.max);
            (shared.executing < shared.max).then(|| shared.ready.clone())
        };
        if let Some(ready) = ready {
            ready.signal(sim);
        }
    }
}

impl<Time> Clone for CountingSemaphore<Time>
where
    Time: SimTime,
{
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<Time> std::fmt::Debug for CountingSemaphore<Time>
where
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("CountingSemaphore")
            .field("max", &shared.max)
            .field("executing", &shared.executing)
            .field("waiting", &shared.ready.len())
            .finish()
    }
}

/// The scheduled admission check. Parks itself - not the payload - when no permit is free, so that a wakeup re-runs
/// the check against the then-current permit count.
struct Admission<Time>
where
    Time: SimTime,
{
    shared: Rc<RefCell<Shared<Time>>>,
    action: Box<dyn Action<Time>>,
}

impl<Time> Action<Time> for Admission<Time>
where
    Time: SimTime + Clone + 'static,
{
    fn run(self: Box<Self>, sim: &mut Simulation<Time>) {
        let shared = Rc::clone(&self.shared);
        let mut state = shared.borrow_mut();
        if state.executing >= state.max {
            log::trace!("semaphore full ({}/{} executing), parking acquisition", state.executing, state.max);
            state.ready.wait_boxed(self);
            return;
        }
        state.executing += 1;
        log::trace!("semaphore admits action: {}/{} executing", state.executing, state.max);
        drop(state);
        self.action.run(sim);
    }
}

/// A two-state gate: acquired or free.
///
/// Literally a [`CountingSemaphore`] constructed with `max = 1`. Because a simulation only ever runs one action at a
/// time, no mutex is needed for data - a binary semaphore is for gating *logical* critical sections that span
/// multiple events.
///
/// Non-reentrant: no owner identity is tracked, so a holder can call [`release()`] on behalf of anyone, and the same
/// actor cannot safely acquire twice.
///
/// [`release()`]: BinarySemaphore::release
pub struct BinarySemaphore<Time>
where
    Time: SimTime,
{
    semaphore: CountingSemaphore<Time>,
}

impl<Time> BinarySemaphore<Time>
where
    Time: SimTime,
{
    /// Create a free binary semaphore.
    pub fn new() -> Self {
        Self {
            semaphore: CountingSemaphore::new(1),
        }
    }
}

impl<Time> BinarySemaphore<Time>
where
    Time: SimTime + Clone + 'static,
{
    /// Request the gate for `action`. See [`CountingSemaphore::acquire()`].
    pub fn acquire<A>(&self, sim: &mut Simulation<Time>, action: A)
    where
        A: Action<Time> + 'static,
    {
        self.semaphore.acquire(sim, action);
    }

    /// Free the gate. See [`CountingSemaphore::release()`].
    pub fn release(&self, sim: &mut Simulation<Time>) {
        self.semaphore.release(sim);
    }
}

impl<Time> Clone for BinarySemaphore<Time>
where
    Time: SimTime,
{
    fn clone(&self) -> Self {
        Self {
            semaphore: self.semaphore.clone(),
        }
    }
}

impl<Time> Default for BinarySemaphore<Time>
where
    Time: SimTime,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Time> std::fmt::Debug for BinarySemaphore<Time>
where
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("BinarySemaphore").field("inner", &self.semaphore).finish()
    }
}
