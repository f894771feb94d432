pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod session;
pub mod translator;

pub use catalog::*;
pub use classifier::*;
pub use engine::*;
pub use session::*;
pub use translator::*;
