//! Application core: the measurement cycle, zero direct I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod controller;
pub mod device;
pub mod events;
pub mod ports;

