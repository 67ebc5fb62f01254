//! Background Tasks Module
//!
//! # Tasks
//! - Expiry Sweeper: purges expired keys from a memory backend

mod sweeper;

pub use sweeper::spawn_sweeper;
