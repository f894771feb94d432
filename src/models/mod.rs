pub mod chart;
pub mod chat;
pub mod dataset;
pub mod query;

pub use chart::*;
pub use chat::*;
pub use dataset::*;
pub use query::*;
