pub mod defaults;
pub mod risk;
