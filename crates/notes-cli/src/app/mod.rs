//! Interactive front end: form state machine plus its text rendering.

pub mod controller;
pub mod view;

pub use controller::{FormController, Outcome};
