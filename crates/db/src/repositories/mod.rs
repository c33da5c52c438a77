pub mod preference_repo;
pub mod queue_repo;
pub mod recipe_repo;
pub mod recommendation_repo;

pub use preference_repo::PreferenceRepo;
pub use queue_repo::QueueRepo;
pub use recipe_repo::RecipeRepo;
pub use recommendation_repo::RecommendationRepo;
