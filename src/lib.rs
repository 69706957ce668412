//! # Overview
//!
//! desync is a lightweight core for discrete-event simulation: a virtual clock, a deterministic event scheduler, and
//! a small set of synchronization primitives built entirely on top of that scheduler rather than on real threads. It
//! lets a host program model time-ordered activity - arrivals, service times, rate limiting, resource contention -
//! by scheduling actions to run at specific virtual times, and by letting actions park their logical progress until
//! woken by another action.
//!
//! * The [`Simulation`] struct owns the clock and a cancellable priority queue of [`Action`]s, executed one at a
//!   time in ascending order of (time, scheduling order). Identical times always resolve in scheduling order, so
//!   every run of the same schedule is reproducible.
//! * The [`Condition`] struct is a FIFO wait queue: actions registered on it stay parked, independent of virtual
//!   time, until another action signals or broadcasts, which re-injects them into the simulation as "as soon as
//!   possible" events.
//! * The [`CountingSemaphore`] and [`BinarySemaphore`] structs gate how many actions may be logically in progress at
//!   once, parking surplus acquisitions on an internal condition.
//! * The [`ticker()`] helper schedules a callback at a fixed cadence by rescheduling itself after every firing.
//!
//! Execution is single-threaded and cooperative: exactly one action runs at a time, to completion, with no
//! preemption and no locks. "Waiting" is modeled structurally - an action that cannot proceed registers a
//! continuation and returns - so the concurrency on display is an artifact of scheduling, not of threads.
//!
//! ```
//! use desync::{CountingSemaphore, Simulation};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! // Two service counters, three customers arriving together.
//! let served = Rc::new(RefCell::new(Vec::new()));
//! let mut sim = Simulation::new(0u64);
//! let counters = CountingSemaphore::new(2);
//!
//! for name in ["ada", "grace", "edsger"] {
//!     let exit = counters.clone();
//!     let served = Rc::clone(&served);
//!     counters.acquire(&mut sim, move |sim: &mut Simulation<u64>| {
//!         served.borrow_mut().push((name, *sim.now()));
//!         // Hold the counter for five time units, then free it.
//!         sim.schedule(sim.now() + 5, move |sim: &mut Simulation<u64>| exit.release(sim));
//!     });
//! }
//! sim.run_until_done();
//!
//! // Two customers are admitted at once; the third waits for the first release.
//! assert_eq!(*served.borrow(), vec![("ada", 0), ("grace", 0), ("edsger", 5)]);
//! ```
//!
//! # Features
//!
//! desync offers one feature, `ordered-float`, which provides the option to add a dependency on the
//! [`ordered-float`] crate so that its [`OrderedFloat`] and [`NotNan`] structs may be used as [`SimTime`]. Its `std`
//! feature will be enabled, but no other features of [`ordered-float`] are enforced - add them in your Cargo.toml if
//! you need them. By default, this feature is disabled to avoid a potentially unnecessary dependency.
//!
//! [`ordered-float`]: https://docs.rs/ordered-float/4
//! [`OrderedFloat`]: https://docs.rs/ordered-float/4/ordered_float/struct.OrderedFloat.html
//! [`NotNan`]: https://docs.rs/ordered-float/4/ordered_float/struct.NotNan.html
//! [`ticker()`]: ticker

mod condition;
mod events;
mod queue;
mod semaphore;
mod simulation;
mod ticker;
mod time;

pub use condition::{Condition, WaiterId};
pub use events::{Action, EventId};
pub use semaphore::{BinarySemaphore, CountingSemaphore};
pub use simulation::Simulation;
pub use ticker::ticker;
pub use time::SimTime;
