//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod level_repo;
pub mod question_repo;
pub mod quiz_result_repo;
pub mod settings_repo;

pub use level_repo::LevelRepo;
pub use question_repo::QuestionRepo;
pub use quiz_result_repo::QuizResultRepo;
pub use settings_repo::SettingsRepo;
