//! Global field state

use std::collections::BTreeSet;

use super::conditions::{Field, Weather, condition_id};

/// State shared by both sides: weather plus active field effects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub weather: Option<Weather>,
    pub fields: BTreeSet<Field>,
    /// Field effects with no known kind, by id
    pub unknown: BTreeSet<String>,
}

impl FieldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weather replaces whatever was there; `None` clears it
    pub fn set_weather(&mut self, weather: Option<Weather>) {
        self.weather = weather;
    }

    /// Start a field effect. A terrain pushes out any other terrain
    pub fn start(&mut self, field: Field) {
        if field.is_terrain() {
            self.fields.retain(|f| !f.is_terrain());
        }
        self.fields.insert(field);
    }

    /// End a field effect, returns false if it was not active
    pub fn end(&mut self, field: Field) -> bool {
        self.fields.remove(&field)
    }

    pub fn start_unknown(&mut self, name: &str) {
        self.unknown.insert(condition_id(name));
    }

    /// End an unknown field effect, returns false if it was never started
    pub fn end_unknown(&mut self, name: &str) -> bool {
        self.unknown.remove(&condition_id(name))
    }

    pub fn is_active(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn terrain(&self) -> Option<Field> {
        self.fields.iter().copied().find(Field::is_terrain)
    }
}
