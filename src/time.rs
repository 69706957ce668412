use std::fmt::Debug;

/// The generic type used for a simulation's clock.
///
/// Kept generic to support as many variations of clock as possible. This trait is a superset of [`Ord`] and [`Debug`]
/// with no additional requirements or functionality.
///
/// Your implementation of this trait should use the [`Ord`] trait to account for the overall sequencing of events.
/// Note that events will be executed in ascending order of execution time, i.e. if
/// `a.cmp(&b) == std::cmp::Ordering::Less` then an event at time `a` will execute before an event at time `b`. Ties
/// are always resolved by the order in which events were scheduled, so two events sharing a time execute in a stable,
/// reproducible order.
///
/// [`Debug`] is necessary for the implementation of [`Debug`] on [`Simulation`] and for trace logging of scheduling
/// decisions.
///
/// Implementations are provided for the integral builtin types and for [`std::time::Duration`], but not for
/// floating-point builtin types as the latter do not implement [`Ord`]. If you wish to use either [`f32`] or [`f64`]
/// as your [`SimTime`], either enable the `ordered-float` feature (and so add a dependency on the [`ordered-float`]
/// crate) to gain access to an implementation on the [`OrderedFloat`] and [`NotNan`] structs, or create your own
/// wrapper that guarantees full ordering.
///
/// [`Simulation`]: crate::Simulation
/// [`ordered-float`]: https://docs.rs/ordered-float/4
/// [`OrderedFloat`]: https://docs.rs/ordered-float/4/ordered_float/struct.OrderedFloat.html
/// [`NotNan`]: https://docs.rs/ordered-float/4/ordered_float/struct.NotNan.html
pub trait SimTime: Ord + Debug {}

impl SimTime for u8 {}
impl SimTime for u16 {}
impl SimTime for u32 {}
impl SimTime for u64 {}
impl SimTime for u128 {}
impl SimTime for usize {}
impl SimTime for i8 {}
impl SimTime for i16 {}
impl SimTime for i32 {}
impl SimTime for i64 {}
impl SimTime for i128 {}
impl SimTime for isize {}

impl SimTime for std::time::Duration {}

#[cfg(feature = "ordered-float")]
impl<Float> SimTime for ordered_float::OrderedFloat<Float> where Float: ordered_float::FloatCore + Debug {}

#[cfg(feature = "ordered-float")]
impl<Float> SimTime for ordered_float::NotNan<Float> where Float: ordered_float::FloatCore + Debug {}
