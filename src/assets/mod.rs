pub mod decode;
pub mod fetch;
pub mod preload;
pub mod preloader;
pub mod resolve;
pub mod store;
