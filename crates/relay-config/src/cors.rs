use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// CORS configuration for browsers calling the relay from another origin
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins
    #[serde(default)]
    pub origins: AllowList,
    /// Allowed HTTP methods
    #[serde(default)]
    pub methods: AllowList,
    /// Allowed request headers
    #[serde(default)]
    pub headers: AllowList,
    /// Allow credentials
    #[serde(default)]
    pub credentials: bool,
    /// Preflight cache lifetime (e.g. "10m")
    #[serde(default, deserialize_with = "crate::duration::deserialize_option")]
    pub max_age: Option<Duration>,
}

/// Either the wildcard `"*"` or an explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowList {
    /// Match any value
    #[default]
    Any,
    /// Only the listed values
    Only(Vec<String>),
}

impl<'de> Deserialize<'de> for AllowList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        let values = match Raw::deserialize(deserializer)? {
            Raw::One(value) => vec![value],
            Raw::Many(values) => values,
        };

        // A wildcard anywhere widens the whole list
        if values.iter().any(|v| v == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::Only(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        cors: CorsConfig,
    }

    fn parse(raw: &str) -> CorsConfig {
        toml::from_str::<Wrapper>(raw).unwrap().cors
    }

    #[test]
    fn wildcard_string_is_any() {
        let cors = parse("[cors]\norigins = \"*\"");
        assert_eq!(cors.origins, AllowList::Any);
    }

    #[test]
    fn wildcard_inside_list_is_any() {
        let cors = parse("[cors]\norigins = [\"https://ai4u.space\", \"*\"]");
        assert_eq!(cors.origins, AllowList::Any);
    }

    #[test]
    fn explicit_origins_and_max_age() {
        let cors = parse("[cors]\norigins = [\"https://ai4u.space\"]\nmax_age = \"10m\"");
        assert_eq!(cors.origins, AllowList::Only(vec!["https://ai4u.space".to_owned()]));
        assert_eq!(cors.methods, AllowList::Any);
        assert_eq!(cors.max_age, Some(Duration::from_secs(600)));
    }
}
