mod conf;
pub use conf::*;
mod connection;
pub use connection::*;
mod data;
pub use data::*;
mod dialect;
pub use dialect::*;
mod pool;
pub use pool::*;
