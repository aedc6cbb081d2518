//! Invasion mechanics: casualties, land transfer, prestige, and boats

pub mod boats;
pub mod casualties;
pub mod land;
pub mod prestige;
