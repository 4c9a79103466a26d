pub mod config;
pub mod domain;
pub mod engine;
pub mod generator;
pub mod notify;
pub mod storage;
pub mod tooling;
