// lib.rs - shared core for the map pins screen

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod view;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{
    Capabilities, DevicePosition, Effect, LocationError, LocationOperation, LocationOutput,
    PermissionStatus, PositionOutcome,
};
pub use config::{DeleteSelectionPolicy, Feature, Features, MapConfig, RegionConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::{
    ActiveLocation, Coordinate, LocationState, Model, Notice, NoticeKind, SavedPlace,
    ViewportRegion,
};
pub use view::{MarkerColor, MarkerView, RegionView, SaveFormView, SavedPlaceRow, ViewModel};

pub const DEFAULT_CENTER_LAT: f64 = 17.803_266;
pub const DEFAULT_CENTER_LON: f64 = 102.747_888;
pub const DEFAULT_LATITUDE_DELTA: f64 = 0.0922;
pub const DEFAULT_LONGITUDE_DELTA: f64 = 0.0421;
/// Span used whenever the viewport follows a single point.
pub const FOCUS_DELTA: f64 = 0.01;
pub const COORDINATE_DISPLAY_PRECISION: usize = 5;
pub const CURRENT_LOCATION_TITLE: &str = "My location";
pub const CURRENT_LOCATION_DESCRIPTION: &str = "I am here";

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
    #[error("Region span {0} must be positive and finite")]
    InvalidSpan(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ValidationError {
    #[error("no location selected")]
    NoActiveLocation,
    #[error("missing place name")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("location permission denied")]
    PermissionDenied { permanently: bool },

    #[error("position unavailable: {0}")]
    PositionUnavailable(#[from] LocationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("index {index} is out of range for {len} saved places")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("feature disabled: {0}")]
    FeatureDisabled(Feature),
}

impl MapError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "LOCATION_PERMISSION_DENIED",
            Self::PositionUnavailable(_) => "POSITION_UNAVAILABLE",
            Self::Validation(ValidationError::NoActiveLocation) => "NO_ACTIVE_LOCATION",
            Self::Validation(ValidationError::EmptyName) => "EMPTY_NAME",
            Self::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            Self::InvalidCoordinate(_) => "INVALID_COORDINATE",
            Self::FeatureDisabled(_) => "FEATURE_DISABLED",
        }
    }

    /// Whether pressing the same control again can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::PositionUnavailable(e) => e.is_retryable(),
            Self::PermissionDenied { permanently } => !*permanently,
            _ => false,
        }
    }

    /// `None` means the failure is logged but never shown.
    #[must_use]
    pub const fn notice_kind(&self) -> Option<NoticeKind> {
        match self {
            Self::PermissionDenied { .. }
            | Self::PositionUnavailable(_)
            | Self::Validation(_) => Some(NoticeKind::Warning),
            Self::IndexOutOfRange { .. } | Self::InvalidCoordinate(_) => Some(NoticeKind::Error),
            Self::FeatureDisabled(_) => None,
        }
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self {
            Self::PermissionDenied { permanently: false } => {
                "Permission denied. Cannot access location.".into()
            }
            Self::PermissionDenied { permanently: true } => {
                "Location access is required. Please enable location permissions in Settings."
                    .into()
            }
            Self::PositionUnavailable(_) => {
                "Unable to determine your location. Please check your GPS settings.".into()
            }
            Self::Validation(ValidationError::NoActiveLocation) => {
                "No location selected. Find your position or tap the map before saving.".into()
            }
            Self::Validation(ValidationError::EmptyName) => "Please enter a place name.".into(),
            Self::IndexOutOfRange { .. } => "That place no longer exists.".into(),
            Self::InvalidCoordinate(e) => format!("Invalid coordinate: {e}"),
            Self::FeatureDisabled(feature) => format!("{feature} is not available."),
        }
    }
}

pub type MapResult<T> = Result<T, MapError>;

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::capabilities::Capabilities;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn report(model: &mut Model, error: &MapError) {
            warn!(code = error.code(), error = %error, "map operation failed");
            if let Some(notice) = Notice::from_error(error) {
                model.notice = Some(notice);
            }
        }

        fn apply_position_outcome(model: &mut Model, outcome: PositionOutcome) -> MapResult<()> {
            match outcome {
                PositionOutcome::Granted(position) => {
                    let location = position.into_active_location()?;
                    info!(
                        lat = location.coordinate.latitude(),
                        lon = location.coordinate.longitude(),
                        accuracy = ?location.accuracy,
                        "active location set from device"
                    );
                    model.places.set_active_location(location);
                    Ok(())
                }
                PositionOutcome::Denied(status) => Err(MapError::PermissionDenied {
                    permanently: status.should_show_settings_prompt(),
                }),
                PositionOutcome::Unavailable(e) => Err(MapError::PositionUnavailable(e)),
            }
        }

        fn handle_map_tap(model: &mut Model, latitude: f64, longitude: f64) -> MapResult<()> {
            if !model.config.features.is_enabled(Feature::MapTap) {
                return Err(MapError::FeatureDisabled(Feature::MapTap));
            }
            let coordinate = Coordinate::new(latitude, longitude)?;
            model.places.set_active_location_from_tap(coordinate);
            info!(lat = latitude, lon = longitude, "active location set from map tap");
            Ok(())
        }

        fn handle_save(model: &mut Model) -> MapResult<()> {
            let place = model.places.commit_save()?;
            info!(name = place.name(), "place saved");
            model.notice = Some(Notice::new("Place saved.", NoticeKind::Success));
            Ok(())
        }

        fn handle_select(model: &mut Model, index: usize) -> MapResult<()> {
            let place = model.places.select_saved_place(index)?;
            debug!(index, name = place.name(), "place selected");
            Ok(())
        }

        fn handle_delete(model: &mut Model, index: usize) -> MapResult<()> {
            if !model.config.features.is_enabled(Feature::DeletePlaces) {
                return Err(MapError::FeatureDisabled(Feature::DeletePlaces));
            }
            let policy = model.config.delete_selection_policy;
            let removed = model.places.delete_saved_place(index, policy)?;
            info!(
                index,
                name = removed.name(),
                selected = ?model.places.selected_index(),
                "place deleted"
            );
            Ok(())
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), user = event.is_user_initiated(), "update");

            let result = match event {
                Event::Noop => return,

                Event::Configure(config) => {
                    model.configure(config);
                    Ok(())
                }

                Event::LocateRequested => {
                    model.locate_requests_in_flight += 1;
                    caps.location.current_position(Event::PositionResolved);
                    Ok(())
                }

                Event::PositionResolved(outcome) => {
                    model.locate_requests_in_flight =
                        model.locate_requests_in_flight.saturating_sub(1);
                    Self::apply_position_outcome(model, outcome)
                }

                Event::MapTapped {
                    latitude,
                    longitude,
                } => Self::handle_map_tap(model, latitude, longitude),

                Event::SaveFormOpened => {
                    model.places.open_save_form();
                    Ok(())
                }

                Event::SaveFormCancelled => {
                    model.places.cancel_save_form();
                    Ok(())
                }

                Event::DraftNameChanged(name) => {
                    model.places.set_draft_name(name);
                    Ok(())
                }

                Event::DraftDescriptionChanged(description) => {
                    model.places.set_draft_description(description);
                    Ok(())
                }

                Event::SaveSubmitted => Self::handle_save(model),

                Event::PlaceSelected { index } => Self::handle_select(model, index),

                Event::PlaceDeleted { index } => Self::handle_delete(model, index),

                Event::DismissNotice => {
                    model.notice = None;
                    Ok(())
                }
            };

            if let Err(e) = result {
                Self::report(model, &e);
            }

            caps.render.render();
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel::build(model)
        }
    }
}
