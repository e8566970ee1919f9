pub mod api_results;
pub mod auth;
pub mod dispatch;
pub mod export;
pub mod handoff;
pub mod history;
pub mod retry;
pub mod run;
pub mod shared;
pub mod single;
pub mod sync;
