//! CLI command implementations.

mod config;
mod list;
mod recall;
mod search;
mod serve;

pub use config::run_config;
pub use list::run_list;
pub use recall::run_recall;
pub use search::run_search;
pub use serve::run_serve;
