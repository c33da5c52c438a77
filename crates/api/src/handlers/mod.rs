pub mod preferences;
pub mod recommendations;
