pub mod preference;
pub mod queue;
pub mod recipe;
pub mod recommendation;
