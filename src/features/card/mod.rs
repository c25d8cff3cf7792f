pub mod colors;
pub mod handler;
pub mod renderer;
pub mod types;

pub use handler::create_card_router;
pub use renderer::{DEFAULT_BACKGROUND, render_lang_card, render_placeholder_card};
pub use types::CardQuery;
