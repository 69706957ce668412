use crate::events::{Action, EventId};
use crate::queue::IndexedHeap;
use crate::SimTime;

use std::fmt::Formatter;

/// Contains the virtual clock and the event queue driving a discrete-event simulation.
///
/// A `Simulation` owns a priority queue of scheduled actions and a clock that only ever moves forward. Actions
/// execute one at a time, to completion, in ascending order of their scheduled time; two actions sharing a time
/// execute in the order they were scheduled. There is no real parallelism anywhere - "concurrency" in a simulation is
/// purely an artifact of interleaved event times.
///
/// The expected workflow is:
///
/// 1. Construct a `Simulation` with a starting clock value.
/// 2. Schedule at least one initial action.
/// 3. Drive it with [`run_until_done()`], [`run_until()`], or repeated calls to [`step()`].
/// 4. Inspect whatever state the actions captured.
///
/// Actions receive `&mut Simulation` while executing and are free to schedule or cancel other events; such changes
/// are visible to future steps only. Scheduling a time at or before the current clock is legal and means "as soon as
/// possible": the entry sorts ahead of all later-dated work but the clock never rewinds to meet it.
///
/// [`run_until_done()`]: Simulation::run_until_done
/// [`run_until()`]: Simulation::run_until
/// [`step()`]: Simulation::step
pub struct Simulation<Time>
where
    Time: SimTime,
{
    /// The current point in virtual time. Never decreases.
    now: Time,
    /// Source of event identifiers, incremented on every schedule call. Instance-owned so that multiple simulations
    /// never interfere with each other's numbering.
    next_id: u64,
    /// Pending actions, ordered ascending by (time, id).
    queue: IndexedHeap<Time, Box<dyn Action<Time>>>,
}

impl<Time> Simulation<Time>
where
    Time: SimTime,
{
    /// Initialize a simulation with an empty queue and the clock set to the provided starting time.
    pub fn new(start_time: Time) -> Self {
        Self {
            now: start_time,
            next_id: 0,
            queue: IndexedHeap::new(),
        }
    }

    /// Get a shared reference to the current virtual time.
    pub fn now(&self) -> &Time {
        &self.now
    }

    /// Number of events still pending on the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether any events remain pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Schedule `action` to run at `time` and return the identifier under which it was enqueued.
    ///
    /// `time` may be in the past or equal to the current clock; either means "as soon as possible" and does not move
    /// the clock backward when the action eventually executes.
    pub fn schedule<A>(&mut self, time: Time, action: A) -> EventId
    where
        A: Action<Time> + 'static,
    {
        self.schedule_boxed(time, Box::new(action))
    }

    /// Schedule an already-boxed action at `time`. Useful when re-injecting an action that was previously parked
    /// elsewhere, such as a condition waiter.
    pub fn schedule_boxed(&mut self, time: Time, action: Box<dyn Action<Time>>) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        log::trace!("schedule {:?} at {:?}", id, time);
        self.queue.push(id.0, time, action);
        id
    }

    /// Cancel a pending event. Returns `true` iff the event was still on the queue.
    ///
    /// Once an event has been popped for execution it can no longer be cancelled; a `false` return is the normal
    /// outcome for an event that already fired, was cancelled before, or never existed.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let pending = self.queue.remove(id.0).is_some();
        log::trace!("cancel {:?}: pending={}", id, pending);
        pending
    }

    /// Execute the single next event, if any.
    ///
    /// Returns `false` without side effects when the queue is empty. Otherwise pops the entry with the smallest
    /// (time, id), advances the clock to the entry's time if - and only if - that time is strictly after the current
    /// clock, runs the action with exclusive access to `self`, and returns `true`.
    pub fn step(&mut self) -> bool {
        if self.queue.is_empty() {
            return false;
        }
        let entry = self.queue.pop();
        if entry.key > self.now {
            log::trace!("advancing clock from {:?} to {:?}", self.now, entry.key);
            self.now = entry.key;
        }
        entry.value.run(self);
        true
    }

    /// Execute events in order as long as the next entry's time does not exceed `deadline`.
    ///
    /// Entries scheduled beyond `deadline` remain queued, and the clock is not dragged up to the deadline: it rests
    /// at the time of the last event executed.
    pub fn run_until(&mut self, deadline: Time) {
        while !self.queue.is_empty() && self.queue.peek().key <= deadline {
            self.step();
        }
    }

    /// Execute events until the queue is exhausted.
    ///
    /// Never returns if actions keep scheduling further actions indefinitely, e.g. an unbounded periodic action;
    /// bounding such schedules is the caller's responsibility.
    pub fn run_until_done(&mut self) {
        while self.step() {}
    }
}

impl<Time> Simulation<Time>
where
    Time: SimTime + Clone,
{
    /// Schedule the provided action to execute at the current virtual time. Events previously scheduled for "now"
    /// will still execute before this action does.
    pub fn schedule_now<A>(&mut self, action: A) -> EventId
    where
        A: Action<Time> + 'static,
    {
        let time = self.now.clone();
        self.schedule(time, action)
    }

    /// Boxed variant of [`schedule_now()`].
    ///
    /// [`schedule_now()`]: Simulation::schedule_now
    pub fn schedule_now_boxed(&mut self, action: Box<dyn Action<Time>>) -> EventId {
        let time = self.now.clone();
        self.schedule_boxed(time, action)
    }
}

impl<Time> Default for Simulation<Time>
where
    Time: SimTime + Default,
{
    fn default() -> Self {
        Self::new(Time::default())
    }
}

impl<Time> std::fmt::Debug for Simulation<Time>
where
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &self.now)
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl<Time> std::fmt::Display for Simulation<Time>
where
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {:?} with {} pending events", self.now, self.queue.len())
    }
}
