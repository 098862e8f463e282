pub mod flock_generator;
