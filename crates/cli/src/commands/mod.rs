pub mod chapter;
pub mod config;
pub mod glossary;
pub mod history;
pub mod novel;
pub mod patch;
pub mod rank;
pub mod toc;

pub use chapter::handle_chapter_command;
pub use config::handle_config_command;
pub use glossary::handle_glossary_command;
pub use history::handle_history_command;
pub use novel::handle_novel_command;
pub use patch::handle_patch_command;
pub use rank::handle_rank_command;
pub use toc::handle_toc_command;
