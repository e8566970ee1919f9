mod app_context;
mod config_warnings;
mod project_root;

pub use app_context::{AppContext, Workbench, open_store};
pub use config_warnings::warn_unconfigured;
pub use project_root::find_project_root;
