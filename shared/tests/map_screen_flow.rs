use assert_matches::assert_matches;
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use shared::{
    App, DeleteSelectionPolicy, DevicePosition, Effect, Event, Features, LocationError,
    LocationOperation, LocationOutput, MapConfig, MarkerColor, Model, NoticeKind,
    PermissionStatus, PositionOutcome,
};

fn location_request(update: Update<Effect, Event>) -> Request<LocationOperation> {
    update
        .effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .expect("expected a location request")
}

fn has_location_request(update: &Update<Effect, Event>) -> bool {
    update
        .effects
        .iter()
        .any(|effect| matches!(effect, Effect::Location(_)))
}

fn has_render(update: &Update<Effect, Event>) -> bool {
    update
        .effects
        .iter()
        .any(|effect| matches!(effect, Effect::Render(_)))
}

/// Drives the permission prompt and returns the event the app receives back.
fn locate(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    permission: PermissionStatus,
    position: Option<Result<LocationOutput, LocationError>>,
) -> Event {
    let update = app.update(Event::LocateRequested, model);
    let mut request = location_request(update);
    assert_eq!(request.operation, LocationOperation::RequestPermission);

    let mut update = app
        .resolve(&mut request, Ok(LocationOutput::Permission(permission)))
        .expect("resolve permission");

    if let Some(position) = position {
        let mut request = location_request(update);
        assert_eq!(request.operation, LocationOperation::GetCurrentPosition);
        update = app.resolve(&mut request, position).expect("resolve position");
    }

    update.events.pop().expect("expected a resolved event")
}

fn tap(app: &AppTester<App, Effect>, model: &mut Model, latitude: f64, longitude: f64) {
    app.update(
        Event::MapTapped {
            latitude,
            longitude,
        },
        model,
    );
}

fn save(app: &AppTester<App, Effect>, model: &mut Model, name: &str, description: &str) {
    app.update(Event::SaveFormOpened, model);
    app.update(Event::DraftNameChanged(name.into()), model);
    app.update(Event::DraftDescriptionChanged(description.into()), model);
    app.update(Event::SaveSubmitted, model);
}

#[test]
fn locate_granted_sets_active_location_and_zooms_in() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let position = DevicePosition::new(17.8, 102.7).with_accuracy(12.0);
    let event = locate(
        &app,
        &mut model,
        PermissionStatus::Granted,
        Some(Ok(LocationOutput::Position(position))),
    );
    assert_eq!(event, Event::PositionResolved(PositionOutcome::Granted(position)));
    assert!(app.view(&model).locating);

    let update = app.update(event, &mut model);
    assert!(has_render(&update));

    let active = model.places.active_location().unwrap();
    assert_eq!(active.coordinate.as_tuple(), (17.8, 102.7));
    assert_eq!(active.accuracy, Some(12.0));

    let view = app.view(&model);
    assert_eq!((view.region.latitude, view.region.longitude), (17.8, 102.7));
    assert_eq!(view.region.latitude_delta, 0.01);
    assert_eq!(view.region.longitude_delta, 0.01);
    assert!(!view.locating);
    assert_eq!(view.notice, None);
}

#[test]
fn locate_denied_never_asks_for_position() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::LocateRequested, &mut model);
    let mut request = location_request(update);
    let update = app
        .resolve(
            &mut request,
            Ok(LocationOutput::Permission(PermissionStatus::Denied)),
        )
        .unwrap();
    assert!(!has_location_request(&update));

    let before = model.places.clone();
    let event = update.events.into_iter().next().unwrap();
    assert_eq!(
        event,
        Event::PositionResolved(PositionOutcome::Denied(PermissionStatus::Denied))
    );
    app.update(event, &mut model);

    assert_eq!(model.places, before);
    let notice = model.notice.as_ref().unwrap();
    assert_eq!(notice.kind, NoticeKind::Warning);
    assert_eq!(notice.code.as_deref(), Some("LOCATION_PERMISSION_DENIED"));
}

#[test]
fn locate_unavailable_warns_and_leaves_state() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let event = locate(
        &app,
        &mut model,
        PermissionStatus::Granted,
        Some(Err(LocationError::PositionUnavailable {
            reason: "no fix".into(),
        })),
    );
    app.update(event, &mut model);

    assert!(model.places.active_location().is_none());
    assert_eq!(
        model.notice.as_ref().and_then(|n| n.code.as_deref()),
        Some("POSITION_UNAVAILABLE")
    );
}

#[test]
fn locate_with_invalid_fix_is_rejected() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let event = locate(
        &app,
        &mut model,
        PermissionStatus::Granted,
        Some(Ok(LocationOutput::Position(DevicePosition::new(95.0, 0.0)))),
    );
    app.update(event, &mut model);

    assert!(model.places.active_location().is_none());
    assert_eq!(model.notice.as_ref().unwrap().kind, NoticeKind::Error);
}

#[test]
fn overlapping_locates_are_last_write_wins() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let mut first = location_request(app.update(Event::LocateRequested, &mut model));
    let mut second = location_request(app.update(Event::LocateRequested, &mut model));
    assert_eq!(model.locate_requests_in_flight, 2);

    let granted = Ok(LocationOutput::Permission(PermissionStatus::Granted));
    let mut first = location_request(app.resolve(&mut first, granted.clone()).unwrap());
    let mut second = location_request(app.resolve(&mut second, granted).unwrap());

    let second_fix = DevicePosition::new(2.0, 2.0);
    let first_fix = DevicePosition::new(1.0, 1.0);

    let mut update = app
        .resolve(&mut second, Ok(LocationOutput::Position(second_fix)))
        .unwrap();
    app.update(update.events.pop().unwrap(), &mut model);

    update = app
        .resolve(&mut first, Ok(LocationOutput::Position(first_fix)))
        .unwrap();
    app.update(update.events.pop().unwrap(), &mut model);

    assert_eq!(
        model.places.active_location().unwrap().coordinate.as_tuple(),
        (1.0, 1.0)
    );
    assert_eq!(model.locate_requests_in_flight, 0);
}

#[test]
fn tap_then_save_scenario() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    tap(&app, &mut model, 17.8, 102.7);
    save(&app, &mut model, "Park", "");

    let places = model.places.saved_places();
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].coordinate().as_tuple(), (17.8, 102.7));
    assert_eq!(places[0].name(), "Park");
    assert_eq!(places[0].description(), "");
    assert!(!model.places.is_save_form_open());
    assert_eq!(model.places.draft_name(), "");
    assert_eq!(model.notice.as_ref().unwrap().kind, NoticeKind::Success);
}

#[test]
fn save_without_location_fails() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    save(&app, &mut model, "Park", "");

    assert!(model.places.saved_places().is_empty());
    assert!(model.places.is_save_form_open());
    assert_eq!(model.places.draft_name(), "Park");
    assert_eq!(
        model.notice.as_ref().and_then(|n| n.code.as_deref()),
        Some("NO_ACTIVE_LOCATION")
    );
}

#[test]
fn save_with_blank_name_fails() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    tap(&app, &mut model, 1.0, 1.0);
    save(&app, &mut model, "   ", "described anyway");

    assert!(model.places.saved_places().is_empty());
    assert_eq!(
        model.notice.as_ref().and_then(|n| n.code.as_deref()),
        Some("EMPTY_NAME")
    );
}

#[test]
fn submit_with_form_closed_still_saves() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    tap(&app, &mut model, 4.0, 5.0);
    app.update(Event::DraftNameChanged("Quick".into()), &mut model);
    assert!(!model.places.is_save_form_open());

    app.update(Event::SaveSubmitted, &mut model);

    let places = model.places.saved_places();
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].name(), "Quick");
    assert_eq!(places[0].coordinate().as_tuple(), (4.0, 5.0));
    assert!(!model.places.is_save_form_open());
    assert_eq!(model.places.draft_name(), "");
}

#[test]
fn reopening_form_keeps_cancelled_drafts() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::SaveFormOpened, &mut model);
    app.update(Event::DraftNameChanged("Mark".into()), &mut model);
    app.update(Event::SaveFormCancelled, &mut model);
    app.update(Event::SaveFormOpened, &mut model);

    let form = app.view(&model).save_form;
    assert!(form.visible);
    assert_eq!(form.name, "Mark");
}

#[test]
fn select_then_delete_clears_selection() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    tap(&app, &mut model, 1.0, 1.0);
    save(&app, &mut model, "A", "");
    tap(&app, &mut model, 2.0, 2.0);
    save(&app, &mut model, "B", "");

    app.update(Event::PlaceSelected { index: 0 }, &mut model);
    assert_eq!(model.places.selected_index(), Some(0));
    assert_eq!(app.view(&model).region.latitude, 1.0);

    app.update(Event::PlaceDeleted { index: 0 }, &mut model);
    assert_eq!(model.places.selected_index(), None);
    assert_eq!(model.places.saved_places()[0].name(), "B");
}

#[test]
fn delete_before_selection_keeps_stale_index_by_default() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        tap(&app, &mut model, f64::from(u8::try_from(i).unwrap()), 0.0);
        save(&app, &mut model, name, "");
    }
    app.update(Event::PlaceSelected { index: 2 }, &mut model);
    app.update(Event::PlaceDeleted { index: 0 }, &mut model);

    let names: Vec<&str> = model.places.saved_places().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["B", "C"]);
    assert_eq!(model.places.selected_index(), Some(2));
    assert!(app
        .view(&model)
        .markers
        .iter()
        .all(|m| m.color != MarkerColor::Red));
}

#[test]
fn delete_before_selection_follows_place_when_configured() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(
        Event::Configure(
            MapConfig::default().with_delete_selection_policy(DeleteSelectionPolicy::FollowPlace),
        ),
        &mut model,
    );

    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        tap(&app, &mut model, f64::from(u8::try_from(i).unwrap()), 0.0);
        save(&app, &mut model, name, "");
    }
    app.update(Event::PlaceSelected { index: 2 }, &mut model);
    app.update(Event::PlaceDeleted { index: 0 }, &mut model);

    assert_eq!(model.places.selected_index(), Some(1));
    assert_eq!(model.places.selected_place().unwrap().name(), "C");
}

#[test]
fn out_of_range_index_is_reported() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::PlaceSelected { index: 0 }, &mut model);
    assert_eq!(model.places.selected_index(), None);
    assert_eq!(
        model.notice.as_ref().and_then(|n| n.code.as_deref()),
        Some("INDEX_OUT_OF_RANGE")
    );

    app.update(Event::DismissNotice, &mut model);
    assert_eq!(model.notice, None);
}

#[test]
fn viewer_only_ignores_tap_and_delete() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::Configure(MapConfig::default().with_features(Features::viewer_only())),
        &mut model,
    );
    tap(&app, &mut model, 3.0, 3.0);
    assert!(model.places.active_location().is_none());
    assert_eq!(model.notice, None);

    let event = locate(
        &app,
        &mut model,
        PermissionStatus::Granted,
        Some(Ok(LocationOutput::Position(DevicePosition::new(3.0, 3.0)))),
    );
    app.update(event, &mut model);
    save(&app, &mut model, "Home", "");
    assert_eq!(model.places.saved_places().len(), 1);

    app.update(Event::PlaceDeleted { index: 0 }, &mut model);
    assert_eq!(model.places.saved_places().len(), 1);
    assert!(!app.view(&model).features.delete_places);
}

#[test]
fn invalid_tap_is_rejected() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    tap(&app, &mut model, f64::NAN, 10.0);

    assert!(model.places.active_location().is_none());
    assert_matches!(
        model.notice.as_ref().map(|n| n.kind),
        Some(NoticeKind::Error)
    );
}

#[test]
fn noop_does_not_render() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::Noop, &mut model);
    assert!(update.effects.is_empty());
}
