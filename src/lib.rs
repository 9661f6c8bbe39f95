pub mod board;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod grid;
pub mod movement;
pub mod rng;
pub mod session;
pub mod types;
pub mod world;
