//! Rasterization of the stage display tree.

pub mod cpu;

pub use cpu::{CpuStageRenderer, FrameRGBA};
