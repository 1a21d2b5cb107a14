pub mod check;
pub mod complete;
pub mod list;
pub mod query;
pub mod show;
