pub mod config;
pub mod logging;

pub mod control;
pub mod error;
pub mod job;
pub mod naming;
pub mod parser;
pub mod runner;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod title;
