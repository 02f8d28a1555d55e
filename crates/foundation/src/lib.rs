pub mod ids;
pub mod kinds;

// Foundation crate: small, dependency-free primitives only.
pub use ids::*;
pub use kinds::*;
