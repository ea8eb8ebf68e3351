mod location;

pub use self::location::{
    DevicePosition, Location, LocationError, LocationOperation, LocationOutput, LocationResult,
    PermissionStatus, PositionOutcome,
};

pub use crux_core::render::Render;

use crate::event::Event;
use crate::App;

pub type AppLocation = Location<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub location: Location<Event>,
}
