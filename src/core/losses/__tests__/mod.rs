pub mod stacked_test;
