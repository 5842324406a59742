pub mod autopilot;
pub mod body;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod input;
pub mod maze;
pub mod player;
pub mod rng;
pub mod scoreboard;
pub mod server_protocol;
pub mod types;
