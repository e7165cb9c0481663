pub mod autoencoder;

pub use autoencoder::{collect_argmax_masks, Autoencoder};

#[cfg(test)]
mod __tests__;
