use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize};
use serde_yaml::{Deserializer, Value};

/// Parses the supplied string as a config value
pub fn parse_config<'a>(conf_str: impl Into<&'a str>) -> Result<Value> {
    Value::deserialize(Deserializer::from_str(conf_str.into()))
        .context("Failed to parse configuration yaml")
}

/// Parses a config value into its strongly typed form.
///
/// A null value (eg an absent options block) is treated as an empty mapping
/// so that types with defaults for every field can be left unconfigured.
pub fn parse_options<T: DeserializeOwned>(options: Value) -> Result<T> {
    let options = match options {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    };

    serde_yaml::from_value::<T>(options).context("Failed to parse configuration options")
}
