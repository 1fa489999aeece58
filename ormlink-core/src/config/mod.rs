pub use serde_yaml::{from_value, Mapping, Value};

mod util;
pub use util::*;
