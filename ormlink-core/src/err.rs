// Errors are carried as anyhow errors throughout the workspace,
// with context attached where they cross a storage boundary
pub use anyhow::{anyhow, bail, ensure, Context, Error, Result};
