pub mod alerts;
pub mod config;
pub mod leboncoin;
pub mod simulation;
pub mod sniper;
pub mod stats;
pub mod store;
pub mod strategies;
