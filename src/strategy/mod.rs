pub mod panic;
pub mod skip;
