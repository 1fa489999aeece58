mod connection;
pub use connection::*;
mod dialect;
pub use dialect::*;
