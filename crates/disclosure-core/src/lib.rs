pub mod error;
pub mod reference;
pub mod types;

pub use error::*;
pub use types::*;
