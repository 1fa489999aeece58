pub mod common;
pub mod interface;

#[cfg(any(test, feature = "test"))]
pub mod test;
