pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod heal;
pub mod info;
pub mod ledger;
pub mod locator;
pub mod output;
pub mod replay;
pub mod runtime;
pub mod similarity;

pub use app::run;
