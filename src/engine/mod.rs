//! Deterministic buy-classification and draw-assembly logic.

pub mod assembler;
pub mod classifier;

pub use assembler::{DrawAssembler, DrawReport, DRAW_CAP};
pub use classifier::{classify_buys, MIN_SOL_SPEND};
