pub mod auth;
pub mod history;
pub mod run;
pub mod session;
pub mod single;

pub use auth::AuthCommands;
pub use history::HistoryCommands;
pub use run::RunArgs;
pub use session::{ApiResultsArgs, ExportArgs, FileFormat, HandoffArgs, RetryArgs, SyncArgs};
pub use single::SingleArgs;
