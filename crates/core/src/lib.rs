//! Domain services for finboard: account lifecycle, moderation, the inquiry desk and sweeps.

pub mod services;

pub use services::*;
