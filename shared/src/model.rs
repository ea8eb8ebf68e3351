use serde::{Deserialize, Serialize};

use crate::config::{DeleteSelectionPolicy, MapConfig};
use crate::{
    CoordinateError, MapError, ValidationError, COORDINATE_DISPLAY_PRECISION, DEFAULT_CENTER_LAT,
    DEFAULT_CENTER_LON, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE_DELTA, FOCUS_DELTA,
};

/// Validated lat/lon. Serialized as a `[lat, lon]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub const fn as_tuple(self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// `lat: 17.80327, lng: 102.74789`
    #[must_use]
    pub fn display_text(self) -> String {
        format!(
            "lat: {:.prec$}, lng: {:.prec$}",
            self.latitude,
            self.longitude,
            prec = COORDINATE_DISPLAY_PRECISION
        )
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.as_tuple()
    }
}

/// Where the user is currently standing or pointing. Replaced wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveLocation {
    pub coordinate: Coordinate,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

impl ActiveLocation {
    /// A bare point, as produced by a map tap.
    #[must_use]
    pub const fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy: None,
            altitude: None,
            heading: None,
            speed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlace {
    coordinate: Coordinate,
    name: String,
    description: String,
}

impl SavedPlace {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRegion {
    center: Coordinate,
    latitude_delta: f64,
    longitude_delta: f64,
}

impl ViewportRegion {
    pub fn new(
        center: Coordinate,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Result<Self, CoordinateError> {
        for delta in [latitude_delta, longitude_delta] {
            if !delta.is_finite() || delta <= 0.0 {
                return Err(CoordinateError::InvalidSpan(delta));
            }
        }
        Ok(Self {
            center,
            latitude_delta,
            longitude_delta,
        })
    }

    /// Close zoom around a single point.
    #[must_use]
    pub const fn focused_on(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: FOCUS_DELTA,
            longitude_delta: FOCUS_DELTA,
        }
    }

    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    #[must_use]
    pub const fn latitude_delta(&self) -> f64 {
        self.latitude_delta
    }

    #[must_use]
    pub const fn longitude_delta(&self) -> f64 {
        self.longitude_delta
    }
}

impl Default for ViewportRegion {
    fn default() -> Self {
        Self {
            center: Coordinate {
                latitude: DEFAULT_CENTER_LAT,
                longitude: DEFAULT_CENTER_LON,
            },
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }
}

/// All mutable state of the map screen. Every transition is a method here so
/// the rules can be exercised without a shell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationState {
    active_location: Option<ActiveLocation>,
    viewport: ViewportRegion,
    saved_places: Vec<SavedPlace>,
    selected_index: Option<usize>,
    save_form_open: bool,
    draft_name: String,
    draft_description: String,
}

impl LocationState {
    #[must_use]
    pub const fn active_location(&self) -> Option<&ActiveLocation> {
        self.active_location.as_ref()
    }

    #[must_use]
    pub const fn viewport(&self) -> &ViewportRegion {
        &self.viewport
    }

    #[must_use]
    pub fn saved_places(&self) -> &[SavedPlace] {
        &self.saved_places
    }

    /// Raw selection, which may point past the end after a delete under
    /// [`DeleteSelectionPolicy::KeepIndex`].
    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    #[must_use]
    pub fn selected_place(&self) -> Option<&SavedPlace> {
        self.selected_index.and_then(|i| self.saved_places.get(i))
    }

    #[must_use]
    pub const fn is_save_form_open(&self) -> bool {
        self.save_form_open
    }

    #[must_use]
    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    #[must_use]
    pub fn draft_description(&self) -> &str {
        &self.draft_description
    }

    /// Hint for the submit button; [`Self::commit_save`] validates regardless.
    #[must_use]
    pub fn can_commit(&self) -> bool {
        self.active_location.is_some() && !self.draft_name.trim().is_empty()
    }

    pub fn set_active_location(&mut self, location: ActiveLocation) {
        self.viewport = ViewportRegion::focused_on(location.coordinate);
        self.active_location = Some(location);
    }

    pub fn set_active_location_from_tap(&mut self, coordinate: Coordinate) {
        self.set_active_location(ActiveLocation::at(coordinate));
    }

    pub(crate) fn reset_viewport(&mut self, viewport: ViewportRegion) {
        self.viewport = viewport;
    }

    pub fn open_save_form(&mut self) {
        self.save_form_open = true;
    }

    pub fn cancel_save_form(&mut self) {
        self.save_form_open = false;
    }

    pub fn set_draft_name(&mut self, name: impl Into<String>) {
        self.draft_name = name.into();
    }

    pub fn set_draft_description(&mut self, description: impl Into<String>) {
        self.draft_description = description.into();
    }

    /// Checks the active location before the name. On failure nothing
    /// changes, including the form flag.
    pub fn commit_save(&mut self) -> Result<&SavedPlace, ValidationError> {
        let location = self
            .active_location
            .ok_or(ValidationError::NoActiveLocation)?;
        if self.draft_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        self.saved_places.push(SavedPlace {
            coordinate: location.coordinate,
            name: std::mem::take(&mut self.draft_name),
            description: std::mem::take(&mut self.draft_description),
        });
        self.save_form_open = false;

        let index = self.saved_places.len() - 1;
        Ok(&self.saved_places[index])
    }

    pub fn select_saved_place(&mut self, index: usize) -> Result<&SavedPlace, MapError> {
        let len = self.saved_places.len();
        let place = self
            .saved_places
            .get(index)
            .ok_or(MapError::IndexOutOfRange { index, len })?;

        self.viewport = ViewportRegion::focused_on(place.coordinate);
        self.selected_index = Some(index);
        Ok(place)
    }

    pub fn delete_saved_place(
        &mut self,
        index: usize,
        policy: DeleteSelectionPolicy,
    ) -> Result<SavedPlace, MapError> {
        let len = self.saved_places.len();
        if index >= len {
            return Err(MapError::IndexOutOfRange { index, len });
        }

        let removed = self.saved_places.remove(index);
        self.selected_index = match (self.selected_index, policy) {
            (Some(selected), _) if selected == index => None,
            (Some(selected), DeleteSelectionPolicy::FollowPlace) if selected > index => {
                Some(selected - 1)
            }
            (selected, _) => selected,
        };
        Ok(removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

/// Non-blocking message for the user, shown until dismissed or replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub code: Option<String>,
}

impl Notice {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            message: message.into(),
            kind,
            code: None,
        }
    }

    #[must_use]
    pub fn from_error(error: &MapError) -> Option<Self> {
        let kind = error.notice_kind()?;
        Some(Self {
            message: error.user_facing_message(),
            kind,
            code: Some(error.code().to_string()),
        })
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: MapConfig,
    pub places: LocationState,
    pub notice: Option<Notice>,
    /// Locate requests awaiting the shell. Concurrent requests are allowed.
    pub locate_requests_in_flight: usize,
}

impl Model {
    /// Applies shell configuration. The viewport snaps to the configured
    /// default only while nothing is focused.
    pub fn configure(&mut self, config: MapConfig) {
        self.config = config.validated();
        if self.places.active_location().is_none() && self.places.selected_place().is_none() {
            self.places.reset_viewport(self.config.default_region());
        }
    }
}
