pub mod characters;
pub mod controller;
pub mod dispatch;
pub mod host;
