pub mod cache;
pub mod snapshot;
pub mod value;

pub use cache::*;
pub use snapshot::*;
pub use value::*;
