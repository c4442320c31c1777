pub mod entities;
pub mod ports;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use fedimark_errors::{FedimarkError, FedimarkResult};
pub use ports::*;
pub use repositories::*;
pub use value_objects::*;
