use serde::{Deserialize, Serialize};

use crate::config::Features;
use crate::model::{Coordinate, Model, NoticeKind, ViewportRegion};
use crate::{CURRENT_LOCATION_DESCRIPTION, CURRENT_LOCATION_TITLE};

pub const CURRENT_LOCATION_MARKER_KEY: &str = "current-location";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Blue,
    Green,
    Red,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegionView {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl From<&ViewportRegion> for RegionView {
    fn from(region: &ViewportRegion) -> Self {
        Self {
            latitude: region.center().latitude(),
            longitude: region.center().longitude(),
            latitude_delta: region.latitude_delta(),
            longitude_delta: region.longitude_delta(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerView {
    pub key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub description: String,
    pub color: MarkerColor,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveFormView {
    pub visible: bool,
    pub name: String,
    pub description: String,
    pub can_submit: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedPlaceRow {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub coordinate_text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeView {
    pub message: String,
    pub kind: NoticeKind,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub region: RegionView,
    pub markers: Vec<MarkerView>,
    pub save_form: SaveFormView,
    pub saved_places: Vec<SavedPlaceRow>,
    pub show_saved_list: bool,
    pub features: Features,
    pub notice: Option<NoticeView>,
    pub locating: bool,
}

impl ViewModel {
    #[must_use]
    pub fn build(model: &Model) -> Self {
        let places = &model.places;

        Self {
            region: RegionView::from(places.viewport()),
            markers: build_markers(model),
            save_form: SaveFormView {
                visible: places.is_save_form_open(),
                name: places.draft_name().to_string(),
                description: places.draft_description().to_string(),
                can_submit: places.can_commit(),
            },
            saved_places: build_rows(model),
            show_saved_list: !places.saved_places().is_empty(),
            features: model.config.features,
            notice: model.notice.as_ref().map(|n| NoticeView {
                message: n.message.clone(),
                kind: n.kind,
                duration_ms: n.kind.default_duration_ms(),
            }),
            locating: model.locate_requests_in_flight > 0,
        }
    }
}

/// Stale indices past the end match nothing.
fn is_selected(model: &Model, index: usize) -> bool {
    model.places.selected_index() == Some(index)
}

fn build_markers(model: &Model) -> Vec<MarkerView> {
    let places = model.places.saved_places();
    let mut markers = Vec::with_capacity(places.len() + 1);

    // Always present: falls back to the configured default center.
    let current: Coordinate = model
        .places
        .active_location()
        .map_or_else(|| model.config.default_region().center(), |l| l.coordinate);
    markers.push(MarkerView {
        key: CURRENT_LOCATION_MARKER_KEY.into(),
        latitude: current.latitude(),
        longitude: current.longitude(),
        title: CURRENT_LOCATION_TITLE.into(),
        description: CURRENT_LOCATION_DESCRIPTION.into(),
        color: MarkerColor::Blue,
    });

    for (index, place) in places.iter().enumerate() {
        markers.push(MarkerView {
            key: format!("place-{index}"),
            latitude: place.coordinate().latitude(),
            longitude: place.coordinate().longitude(),
            title: place.name().to_string(),
            description: place.description().to_string(),
            color: if is_selected(model, index) {
                MarkerColor::Red
            } else {
                MarkerColor::Green
            },
        });
    }

    markers
}

fn build_rows(model: &Model) -> Vec<SavedPlaceRow> {
    model
        .places
        .saved_places()
        .iter()
        .enumerate()
        .map(|(index, place)| SavedPlaceRow {
            index,
            name: place.name().to_string(),
            description: place.description().to_string(),
            coordinate_text: place.coordinate().display_text(),
            selected: is_selected(model, index),
        })
        .collect()
}
