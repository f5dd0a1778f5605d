//! Outbound delivery of rendered event messages.
//!
//! - [`Dispatcher`]: concurrent fan-out of one message to every
//!   destination of a hook, single attempt per destination.
//! - [`delivery::mentions`]: neutralizes broadcast mentions before sending.

pub mod delivery;

pub use delivery::webhook::{
    DeliveryError, DispatchError, DispatchReport, Dispatcher, DEFAULT_DELIVERY_TIMEOUT,
};
