pub mod data;
pub mod position;
pub mod prune;
pub mod registry;
pub mod residency;
