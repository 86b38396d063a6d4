use serde::{Deserialize, Serialize};
use toml::Value;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StrategyConfig {
    pub name: String,
    // This will hold the `params = { ... }` table from the TOML
    #[serde(default = "empty_params")]
    pub params: Value,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// A config with an empty parameter table, so every setting takes its default.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, empty_params())
    }
}

fn empty_params() -> Value {
    Value::Table(toml::map::Map::new())
}
