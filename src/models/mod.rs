pub mod catalog;
pub mod pipeline;
pub mod trend;
pub mod user;

pub use catalog::*;
pub use pipeline::*;
pub use trend::*;
pub use user::*;
