//! Daily login reward server: monthly reward allocations, per-player ledgers
//! and the scheduler that grants one reward per day of play.

pub mod backend;
