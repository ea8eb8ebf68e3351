use serde::{Deserialize, Serialize};

use crate::capabilities::PositionOutcome;
use crate::config::MapConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Event {
    #[default]
    Noop,

    Configure(MapConfig),

    LocateRequested,
    #[serde(skip)]
    PositionResolved(PositionOutcome),

    MapTapped {
        latitude: f64,
        longitude: f64,
    },

    SaveFormOpened,
    SaveFormCancelled,
    DraftNameChanged(String),
    DraftDescriptionChanged(String),
    SaveSubmitted,

    PlaceSelected {
        index: usize,
    },
    PlaceDeleted {
        index: usize,
    },

    DismissNotice,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::LocateRequested => "locate_requested",
            Self::PositionResolved(_) => "position_resolved",
            Self::MapTapped { .. } => "map_tapped",
            Self::SaveFormOpened => "save_form_opened",
            Self::SaveFormCancelled => "save_form_cancelled",
            Self::DraftNameChanged(_) => "draft_name_changed",
            Self::DraftDescriptionChanged(_) => "draft_description_changed",
            Self::SaveSubmitted => "save_submitted",
            Self::PlaceSelected { .. } => "place_selected",
            Self::PlaceDeleted { .. } => "place_deleted",
            Self::DismissNotice => "dismiss_notice",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::Noop | Self::Configure(_) | Self::PositionResolved(_)
        )
    }
}
