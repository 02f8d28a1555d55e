pub mod load;
pub mod retry;

pub use load::*;
pub use retry::*;
