pub mod config;
pub mod ledger_record;
pub mod month;
pub mod reward;

pub use config::*;
pub use ledger_record::*;
pub use month::*;
pub use reward::*;
