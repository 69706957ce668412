use crate::events::Action;
use crate::queue::IndexedHeap;
use crate::{SimTime, Simulation};

use std::cell::RefCell;
use std::fmt::Formatter;
use std::rc::Rc;

/// Identifier for an action parked on a [`Condition`].
///
/// Each condition numbers its waiters from its own counter, independent of the owning simulation's event identifiers
/// and of every other condition. Holding a `WaiterId` permits cancellation through [`Condition::cancel()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaiterId(pub(crate) u64);

/// A rendezvous point where actions park until another action wakes them.
///
/// Any number of actions can register on the same condition and be released one at a time by [`signal()`] or all at
/// once by [`broadcast()`], similar to a condition variable - except that nothing ever blocks. A parked action is
/// simply held off the simulation's queue; waking re-injects it as an "as soon as possible" event at the current
/// virtual time, so woken actions run inside the normal event loop and in their original registration order.
///
/// A `Condition` is a cheap-clone handle: clones share the same wait queue, which is what lets scheduled
/// continuations reach the condition when they later execute. Registration is independent of virtual time - a waiter
/// stays parked across any number of steps until woken or cancelled.
///
/// [`signal()`]: Condition::signal
/// [`broadcast()`]: Condition::broadcast
pub struct Condition<Time>
where
    Time: SimTime,
{
    inner: Rc<RefCell<Inner<Time>>>,
}

struct Inner<Time>
where
    Time: SimTime,
{
    /// Waiting actions keyed purely by registration order.
    waiters: IndexedHeap<(), Box<dyn Action<Time>>>,
    next_id: u64,
}

impl<Time> Condition<Time>
where
    Time: SimTime,
{
    /// Create a condition with no waiters.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                waiters: IndexedHeap::new(),
                next_id: 0,
            })),
        }
    }

    /// Park `action` on this condition and return the identifier under which it waits.
    ///
    /// Waiters are woken in registration order, first in, first out.
    pub fn wait<A>(&self, action: A) -> WaiterId
    where
        A: Action<Time> + 'static,
    {
        self.wait_boxed(Box::new(action))
    }

    /// Boxed variant of [`wait()`].
    ///
    /// [`wait()`]: Condition::wait
    pub fn wait_boxed(&self, action: Box<dyn Action<Time>>) -> WaiterId {
        let mut inner = self.inner.borrow_mut();
        let id = WaiterId(inner.next_id);
        inner.next_id += 1;
        log::trace!("condition parks waiter {:?}", id);
        inner.waiters.push(id.0, (), action);
        id
    }

    /// Remove a still-pending waiter. Returns `true` iff the waiter was found.
    ///
    /// A `false` return is the normal outcome for a waiter that was already woken, cancelled before, or never
    /// existed.
    pub fn cancel(&self, id: WaiterId) -> bool {
        let pending = self.inner.borrow_mut().waiters.remove(id.0).is_some();
        log::trace!("condition cancels waiter {:?}: pending={}", id, pending);
        pending
    }

    /// Number of actions currently parked.
    pub fn len(&self) -> usize {
        self.inner.borrow().waiters.len()
    }

    /// Whether no actions are currently parked.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().waiters.is_empty()
    }
}

impl<Time> Condition<Time>
where
    Time: SimTime + Clone,
{
    /// Wake the earliest-registered waiter, if any, by scheduling it on `sim` at the current virtual time.
    ///
    /// With no waiters this is a no-op. The woken action does not run inside this call; it runs once the simulation
    /// loop reaches it, ordered after anything already scheduled for "now" by the simulation's id tie-break.
    pub fn signal(&self, sim: &mut Simulation<Time>) {
        let entry = {
            let mut inner = self.inner.borrow_mut();
            if inner.waiters.is_empty() {
                return;
            }
            inner.waiters.pop()
        };
        log::trace!("condition wakes waiter {:?}", WaiterId(entry.id));
        sim.schedule_now_boxed(entry.value);
    }

    /// Wake every currently parked waiter, in registration order.
    ///
    /// All woken actions are scheduled at the virtual time current at the moment of the broadcast; their relative
    /// order is preserved through the simulation's id tie-break. Waiters registered by a woken action after this call
    /// are not included.
    pub fn broadcast(&self, sim: &mut Simulation<Time>) {
        let woken = {
            let mut inner = self.inner.borrow_mut();
            let mut woken = Vec::with_capacity(inner.waiters.len());
            while !inner.waiters.is_empty() {
                woken.push(inner.waiters.pop());
            }
            woken
        };
        log::trace!("condition broadcasts to {} waiters", woken.len());
        for entry in woken {
            sim.schedule_now_boxed(entry.value);
        }
    }
}

impl<Time> Clone for Condition<Time>
where
    Time: SimTime,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<Time> Default for Condition<Time>
where
    Time: SimTime,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Time> std::fmt::Debug for Condition<Time>
where
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Condition").field("waiters", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<(u64, &'static str)>>>;

    fn waiter(trace: &Trace, label: &'static str) -> impl FnOnce(&mut Simulation<u64>) + 'static {
        let trace = Rc::clone(trace);
        move |sim: &mut Simulation<u64>| trace.borrow_mut().push((*sim.now(), label))
    }

    #[test]
    fn signal_wakes_only_the_earliest_waiter() {
        let trace: Trace = Rc::default();
        let mut sim = Simulation::new(0);
        let cond = Condition::new();
        cond.wait(waiter(&trace, "first"));
        cond.wait(waiter(&trace, "second"));

        cond.signal(&mut sim);
        sim.run_until_done();
        assert_eq!(*trace.borrow(), vec![(0, "first")]);
        assert_eq!(cond.len(), 1);

        cond.signal(&mut sim);
        sim.run_until_done();
        assert_eq!(*trace.borrow(), vec![(0, "first"), (0, "second")]);
        assert!(cond.is_empty());
    }

    #[test]
    fn signal_without_waiters_is_a_no_op() {
        let mut sim = Simulation::<u64>::new(0);
        let cond = Condition::new();
        cond.signal(&mut sim);
        assert!(sim.is_empty());
    }

    #[test]
    fn broadcast_wakes_everyone_in_registration_order() {
        let trace: Trace = Rc::default();
        let mut sim = Simulation::new(0);
        let cond = Condition::new();
        for label in ["a", "b", "c"] {
            cond.wait(waiter(&trace, label));
        }

        // Advance the clock before broadcasting so the wake time is observable.
        sim.schedule(42, |_: &mut Simulation<u64>| {});
        sim.run_until_done();
        cond.broadcast(&mut sim);
        sim.run_until_done();

        assert_eq!(*trace.borrow(), vec![(42, "a"), (42, "b"), (42, "c")]);
        assert!(cond.is_empty());
    }

    #[test]
    fn cancelled_waiters_are_skipped() {
        let trace: Trace = Rc::default();
        let mut sim = Simulation::new(0);
        let cond = Condition::new();
        cond.wait(waiter(&trace, "kept"));
        let dropped = cond.wait(waiter(&trace, "dropped"));
        cond.wait(waiter(&trace, "also kept"));

        assert!(cond.cancel(dropped));
        assert!(!cond.cancel(dropped), "second cancellation must miss");

        cond.broadcast(&mut sim);
        sim.run_until_done();
        assert_eq!(*trace.borrow(), vec![(0, "kept"), (0, "also kept")]);
    }

    #[test]
    fn conditions_number_waiters_independently() {
        let first = Condition::<u64>::new();
        let second = Condition::<u64>::new();
        let id_on_first = first.wait(|_: &mut Simulation<u64>| {});
        let id_on_second = second.wait(|_: &mut Simulation<u64>| {});
        assert_eq!(id_on_first, id_on_second, "fresh conditions start numbering from zero");
    }

    #[test]
    fn woken_action_may_wait_again() {
        let trace: Trace = Rc::default();
        let mut sim = Simulation::new(0);
        let cond = Condition::new();

        let rewait_cond = cond.clone();
        let rewait_trace = Rc::clone(&trace);
        cond.wait(move |sim: &mut Simulation<u64>| {
            rewait_trace.borrow_mut().push((*sim.now(), "woken"));
            rewait_cond.wait(waiter(&rewait_trace, "re-parked"));
        });

        cond.signal(&mut sim);
        sim.run_until_done();
        assert_eq!(*trace.borrow(), vec![(0, "woken")]);
        assert_eq!(cond.len(), 1, "the re-registered waiter stays parked");
    }
}
