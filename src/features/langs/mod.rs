pub mod engine;
pub mod models;

pub use engine::count_subject_langs;
pub use models::{CountOptions, LangShare};
