pub mod autoencoder_test;
