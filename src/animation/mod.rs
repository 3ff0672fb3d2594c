pub mod controller;
pub mod curve;
pub mod ease;
pub mod signal;
