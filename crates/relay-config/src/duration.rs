use std::time::Duration;

use serde::{Deserialize, Deserializer, de};

/// Deserialize a human-readable duration such as `"20s"` or `"1m 30s"`
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    duration_str::parse(&raw).map_err(|e| de::Error::custom(format!("invalid duration '{raw}': {e}")))
}

/// Optional variant of [`deserialize`]
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| duration_str::parse(&raw).map_err(|e| de::Error::custom(format!("invalid duration '{raw}': {e}"))))
        .transpose()
}
