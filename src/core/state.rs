//! State values and the objects that carry them.
//!
//! The engine never owns the object whose state it manages. It reads and
//! writes a named attribute through the [`Subject`] trait, and treats the
//! attribute's value as an opaque [`StateValue`].

use std::fmt::Debug;

/// Trait for values a state attribute can hold.
///
/// A state value only needs to be comparable, cloneable and debuggable.
/// The absence of a value ("nil" state) is modelled as `None` wherever an
/// attribute value appears, so `StateValue` itself never needs a sentinel.
///
/// Implemented automatically for every eligible type.
///
/// # Example
///
/// ```rust
/// use statewise::core::StateValue;
///
/// fn assert_state_value<V: StateValue>() {}
///
/// assert_state_value::<&'static str>();
/// assert_state_value::<String>();
/// assert_state_value::<u8>();
/// ```
pub trait StateValue: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> StateValue for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// An object carrying one or more named state attributes.
///
/// Several machines may drive different attributes of the same object (this
/// is how parallel machines coordinate), so every access names the
/// attribute.
///
/// # Example
///
/// ```rust
/// use statewise::core::Subject;
///
/// struct Vehicle {
///     state: Option<&'static str>,
/// }
///
/// impl Subject<&'static str> for Vehicle {
///     fn read_state(&self, attribute: &str) -> Option<&'static str> {
///         match attribute {
///             "state" => self.state,
///             _ => None,
///         }
///     }
///
///     fn write_state(&mut self, attribute: &str, value: Option<&'static str>) {
///         if attribute == "state" {
///             self.state = value;
///         }
///     }
/// }
///
/// let mut vehicle = Vehicle { state: Some("parked") };
/// vehicle.write_state("state", Some("idling"));
/// assert_eq!(vehicle.read_state("state"), Some("idling"));
/// ```
pub trait Subject<V: StateValue> {
    /// Current value of `attribute`, `None` when the attribute holds no value.
    fn read_state(&self, attribute: &str) -> Option<V>;

    /// Overwrite `attribute` with `value`.
    fn write_state(&mut self, attribute: &str, value: Option<V>);
}
