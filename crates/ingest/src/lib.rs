pub mod adapter;
pub mod apply;
pub mod geojson;
pub mod unwrap;

pub use adapter::*;
pub use apply::*;
pub use geojson::*;
pub use unwrap::*;
