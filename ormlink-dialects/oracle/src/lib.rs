mod conf;
pub use conf::*;
mod dialect;
pub use dialect::*;
