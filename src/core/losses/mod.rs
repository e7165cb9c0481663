//! # 손실 모듈

pub mod assembler;
pub mod stacked;

pub use assembler::{build_losses, l2_loss};
pub use stacked::build_stacked_losses;

#[cfg(test)]
mod __tests__;
