//! Stepping harness: a clocked chip attached to memory.
//!
//! The [`Stepper`] advances a [`Simulator`](crate::engine::Simulator) one
//! clock edge at a time and answers its bus cycles from a [`Bus`]. Its
//! [`run`](Stepper::run) loop is a cooperative task that yields after every
//! half-step and stops cleanly when its cancellation token fires.

mod memory;
mod stepper;

pub use memory::{Bus, Memory, RESET_VECTOR};
pub use stepper::{BusPins, ChipStatus, Stepper};
