//! Field-wide conditions: weather, terrain and pseudo-weather.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::{ConditionState, Id};

/// The shared field.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Field {
    pub weather: Option<ConditionState>,
    pub terrain: Option<ConditionState>,
    pub pseudo_weather: OrdMap<Id, ConditionState>,
}

impl Field {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current weather id, if any.
    #[must_use]
    pub fn weather_id(&self) -> Option<&Id> {
        self.weather.as_ref().map(|w| &w.id)
    }

    /// Current terrain id, if any.
    #[must_use]
    pub fn terrain_id(&self) -> Option<&Id> {
        self.terrain.as_ref().map(|t| &t.id)
    }

    #[must_use]
    pub fn is_weather(&self, id: &str) -> bool {
        self.weather_id().is_some_and(|w| *w == Id::new(id))
    }

    #[must_use]
    pub fn is_terrain(&self, id: &str) -> bool {
        self.terrain_id().is_some_and(|t| *t == Id::new(id))
    }

    #[must_use]
    pub fn has_pseudo_weather(&self, id: &str) -> bool {
        self.pseudo_weather.contains_key(&Id::new(id))
    }

    /// Install weather. Returns false if that weather is already up.
    pub fn set_weather(&mut self, state: ConditionState) -> bool {
        if self.weather_id() == Some(&state.id) {
            return false;
        }
        self.weather = Some(state);
        true
    }

    /// Install terrain. Returns false if that terrain is already up.
    pub fn set_terrain(&mut self, state: ConditionState) -> bool {
        if self.terrain_id() == Some(&state.id) {
            return false;
        }
        self.terrain = Some(state);
        true
    }

    /// Add a pseudo-weather. Returns false if already present.
    pub fn add_pseudo_weather(&mut self, state: ConditionState) -> bool {
        if self.pseudo_weather.contains_key(&state.id) {
            return false;
        }
        self.pseudo_weather.insert(state.id.clone(), state);
        true
    }
}
