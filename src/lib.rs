pub mod cli;
pub mod controller;
pub mod core;
pub mod generator;
pub mod storage;
