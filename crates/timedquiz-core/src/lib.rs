//! Timed-question protocol, question banks, and scoring.
//!
//! Each question races a one-shot deadline against a collector reading the
//! participant's input; the first to finish decides the question's outcome.

pub mod arbiter;
pub mod collector;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod timer;
pub mod traits;
