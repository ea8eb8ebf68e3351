use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{ActiveLocation, Coordinate};
use crate::CoordinateError;

/// Device position lookup, fulfilled by the shell.
pub struct Location<E> {
    context: CapabilityContext<LocationOperation, E>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<E> Location<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, E>) -> Self {
        Self { context }
    }

    /// Asks for permission, then for the position, and reports a single
    /// outcome. The position is never requested unless permission is granted.
    pub fn current_position<F>(&self, callback: F)
    where
        F: FnOnce(PositionOutcome) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let outcome = locate(ctx.clone()).await;
            ctx.update_app(callback(outcome));
        });
    }
}

async fn locate<E: 'static>(ctx: CapabilityContext<LocationOperation, E>) -> PositionOutcome {
    let status = match ctx
        .request_from_shell(LocationOperation::RequestPermission)
        .await
    {
        Ok(LocationOutput::Permission(status)) => status,
        Ok(other) => return PositionOutcome::Unavailable(LocationError::unexpected(&other)),
        Err(e) => return PositionOutcome::Unavailable(e),
    };

    if !status.is_granted() {
        debug!(?status, "location permission not granted");
        return PositionOutcome::Denied(status);
    }

    match ctx
        .request_from_shell(LocationOperation::GetCurrentPosition)
        .await
    {
        Ok(LocationOutput::Position(position)) => PositionOutcome::Granted(position),
        Ok(other) => PositionOutcome::Unavailable(LocationError::unexpected(&other)),
        Err(e) => PositionOutcome::Unavailable(e),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    RequestPermission,
    GetCurrentPosition,
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    DeniedPermanently,
    Restricted,
    NotDetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }

    pub fn should_show_settings_prompt(&self) -> bool {
        matches!(
            self,
            PermissionStatus::DeniedPermanently | PermissionStatus::Restricted
        )
    }
}

/// Fix as reported by the device. Only latitude and longitude are checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevicePosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

impl DevicePosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            altitude: None,
            heading: None,
            speed: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn into_active_location(self) -> Result<ActiveLocation, CoordinateError> {
        Ok(ActiveLocation {
            coordinate: Coordinate::new(self.latitude, self.longitude)?,
            accuracy: self.accuracy,
            altitude: self.altitude,
            heading: self.heading,
            speed: self.speed,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LocationOutput {
    Permission(PermissionStatus),
    Position(DevicePosition),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("position unavailable: {reason}")]
    PositionUnavailable { reason: String },

    #[error("location services are disabled")]
    ServicesDisabled,

    #[error("location not supported on this platform")]
    NotSupported,

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LocationError {
    fn unexpected(output: &LocationOutput) -> Self {
        LocationError::Internal {
            message: format!("unexpected shell output: {output:?}"),
        }
    }

    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            LocationError::PositionUnavailable { .. } | LocationError::ServicesDisabled
        )
    }
}

pub type LocationResult = Result<LocationOutput, LocationError>;

/// Result of the combined permission + position flow.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionOutcome {
    Granted(DevicePosition),
    Denied(PermissionStatus),
    Unavailable(LocationError),
}
