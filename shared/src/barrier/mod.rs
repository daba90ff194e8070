pub mod barrier_round;
