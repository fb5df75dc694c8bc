pub mod defaults;
pub mod normalize;
pub mod patch;
pub mod types;
