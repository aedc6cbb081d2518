//! Espionage and magic mechanics: success curves, specialist attrition, and
//! the infamy/mastery/resilience ledger

pub mod ledger;
pub mod losses;
pub mod success;

pub use losses::OpType;
pub use success::{black_op_chance, info_chance, invasion_succeeds, is_overwhelmed, theft_chance};
