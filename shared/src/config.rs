use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, ViewportRegion};
use crate::{
    CoordinateError, DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, DEFAULT_LATITUDE_DELTA,
    DEFAULT_LONGITUDE_DELTA,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MapTap,
    DeletePlaces,
}

impl Feature {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MapTap => "map_tap",
            Self::DeletePlaces => "delete_places",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional interactions. The plain viewer has neither; the full screen has both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub map_tap: bool,
    pub delete_places: bool,
}

impl Features {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            map_tap: true,
            delete_places: true,
        }
    }

    #[must_use]
    pub const fn viewer_only() -> Self {
        Self {
            map_tap: false,
            delete_places: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(self, feature: Feature) -> bool {
        match feature {
            Feature::MapTap => self.map_tap,
            Feature::DeletePlaces => self.delete_places,
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::all()
    }
}

/// What happens to a selection sitting after a deleted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeleteSelectionPolicy {
    /// Leave the raw index alone. It may end up pointing at a different
    /// place, or past the end of the list.
    #[default]
    KeepIndex,
    /// Shift the index down so it keeps pointing at the same place.
    FollowPlace,
}

/// Raw region as sent by the shell, validated into a [`ViewportRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl RegionConfig {
    pub fn to_region(self) -> Result<ViewportRegion, CoordinateError> {
        let center = Coordinate::new(self.latitude, self.longitude)?;
        ViewportRegion::new(center, self.latitude_delta, self.longitude_delta)
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_CENTER_LAT,
            longitude: DEFAULT_CENTER_LON,
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MapConfig {
    pub features: Features,
    pub default_region: RegionConfig,
    pub delete_selection_policy: DeleteSelectionPolicy,
}

impl MapConfig {
    #[must_use]
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub fn with_default_region(mut self, region: RegionConfig) -> Self {
        self.default_region = region;
        self
    }

    #[must_use]
    pub fn with_delete_selection_policy(mut self, policy: DeleteSelectionPolicy) -> Self {
        self.delete_selection_policy = policy;
        self
    }

    /// Falls back to the built-in default region if the configured one is unusable.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if let Err(e) = self.default_region.to_region() {
            tracing::warn!(error = %e, "ignoring invalid default region");
            self.default_region = RegionConfig::default();
        }
        self
    }

    #[must_use]
    pub fn default_region(&self) -> ViewportRegion {
        self.default_region.to_region().unwrap_or_default()
    }
}
