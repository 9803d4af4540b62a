use pokestate_battle::EngineConfig;
use serde::Deserialize;

/// Settings for one battle session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Room the outgoing commands are addressed to
    pub room_id: Option<String>,
    /// Lines buffered for the session before routing waits
    pub line_capacity: usize,
    pub engine: EngineConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            room_id: None,
            line_capacity: 256,
            engine: EngineConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn for_room(&self, room_id: impl Into<String>) -> Self {
        Self {
            room_id: Some(room_id.into()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_engine_config() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"engine": {"username": "Alice", "strict_conditions": true}}"#)
                .unwrap();
        assert_eq!(config.line_capacity, 256);
        assert_eq!(config.engine.username.as_deref(), Some("Alice"));
        assert!(config.engine.strict_conditions);

        let room = config.for_room("battle-gen9ou-1");
        assert_eq!(room.room_id.as_deref(), Some("battle-gen9ou-1"));
        assert_eq!(room.engine, config.engine);
    }
}
