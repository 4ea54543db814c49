//! Actuator drivers and hardware initialisation.

pub mod buzzer;
pub mod hw_init;
pub mod indicator;
