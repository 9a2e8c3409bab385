//! End-to-end gesture behaviour of a day surface driven through the router.

use daybook_client::shared::{DayKey, Point, Size, StickerKind};
use daybook_client::{
    CanvasConfig, CanvasError, GestureEvent, GesturePhase, GestureRouter, GestureTarget, Journal,
    MemoryStore, Surface, SurfaceChange,
};

const CONTAINER: Size = Size::new(400.0, 400.0);

fn router() -> GestureRouter {
    GestureRouter::new(CanvasConfig::default(), CONTAINER)
}

fn surface() -> Surface {
    Surface::new(DayKey::from_ymd(2024, 4, 1).unwrap())
}

fn tap_at(x: f32, y: f32) -> GestureEvent {
    GestureEvent::DragEnd {
        translation: Point::new(0.0, 0.0),
        location: Point::new(x, y),
    }
}

fn drag_change(dx: f32, dy: f32) -> GestureEvent {
    GestureEvent::DragChange {
        translation: Point::new(dx, dy),
        location: Point::new(200.0 + dx, 200.0 + dy),
    }
}

fn drag_end(dx: f32, dy: f32) -> GestureEvent {
    GestureEvent::DragEnd {
        translation: Point::new(dx, dy),
        location: Point::new(200.0 + dx, 200.0 + dy),
    }
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn sticker_position_is_clamped_after_drag() {
    let router = router();
    let mut surface = surface();
    let id = surface.add_emoji("🐝", Point::new(0.5, 0.5)).unwrap();
    assert_eq!(
        router.dispatch(&mut surface, tap_at(200.0, 200.0)),
        Some(SurfaceChange::Selected(Some(id.clone())))
    );

    router.dispatch(&mut surface, drag_change(300.0, 0.0));
    // Unclamped while the finger is still down.
    assert!(close(surface.sticker(&id).unwrap().transform.position.x, 1.25));
    let change = router.dispatch(&mut surface, drag_end(300.0, -400.0));

    assert_eq!(change, Some(SurfaceChange::Moved(GestureTarget::Sticker(id.clone()))));
    assert_eq!(surface.sticker(&id).unwrap().transform.position, Point::new(1.0, 0.0));
    assert_eq!(surface.background().position, Point::new(0.5, 0.5));
}

#[test]
fn background_position_is_never_clamped() {
    let router = router();
    let mut surface = surface();
    router.dispatch(&mut surface, drag_change(300.0, -400.0));
    let change = router.dispatch(&mut surface, drag_end(300.0, -400.0));

    assert_eq!(change, Some(SurfaceChange::Moved(GestureTarget::Background)));
    let position = surface.background().position;
    assert!(close(position.x, 1.25));
    assert!(close(position.y, -0.5));
}

#[test]
fn selection_is_locked_during_background_drag() {
    let router = router();
    let mut surface = surface();
    let id = surface.add_emoji("🦋", Point::new(0.2, 0.2)).unwrap();

    router.dispatch(&mut surface, drag_change(40.0, 0.0));
    assert_eq!(surface.gesture_phase(), GesturePhase::DraggingBackground);
    assert_eq!(surface.select_sticker(&id), Err(CanvasError::GestureInProgress));
    assert_eq!(surface.delete_sticker(&id), Err(CanvasError::GestureInProgress));

    // A pinch joining the drag follows the captured target.
    router.dispatch(&mut surface, GestureEvent::PinchChange { ratio: 2.0 });
    assert_eq!(surface.gesture_target(), Some(&GestureTarget::Background));
    assert_eq!(surface.sticker(&id).unwrap().transform.scale, 1.0);
    assert_eq!(surface.background().scale, 2.0);

    router.dispatch(&mut surface, drag_end(40.0, 0.0));
    router.dispatch(&mut surface, GestureEvent::PinchEnd { ratio: 2.0 });
    assert!(!surface.is_gesture_active());
    assert_eq!(surface.selected(), None);
    assert!(surface.select_sticker(&id).is_ok());
}

#[test]
fn selected_sticker_receives_every_stream() {
    let router = router();
    let mut surface = surface();
    let id = surface.add_emoji("🌻", Point::new(0.5, 0.5)).unwrap();
    surface.select_sticker(&id).unwrap();

    // The drag starts far away from the sticker and still moves it.
    router.dispatch(
        &mut surface,
        GestureEvent::DragChange {
            translation: Point::new(40.0, 40.0),
            location: Point::new(20.0, 380.0),
        },
    );
    assert_eq!(surface.gesture_phase(), GesturePhase::DraggingSticker(id.clone()));
    router.dispatch(&mut surface, drag_end(40.0, 40.0));
    router.dispatch(&mut surface, GestureEvent::RotateChange { degrees: 10.0 });
    assert_eq!(surface.gesture_phase(), GesturePhase::RotatingSticker(id.clone()));
    router.dispatch(&mut surface, GestureEvent::RotateEnd { degrees: 10.0 });

    let sticker = surface.sticker(&id).unwrap();
    assert!(close(sticker.transform.position.x, 0.6));
    assert!(close(sticker.transform.position.y, 0.6));
    assert_eq!(sticker.transform.rotation_degrees, 10.0);
    assert_eq!(surface.background().position, Point::new(0.5, 0.5));
    assert_eq!(surface.gesture_phase(), GesturePhase::Idle);
}

#[test]
fn scale_multiplies_across_gestures() {
    let router = router();
    let mut surface = surface();
    router.dispatch(&mut surface, GestureEvent::PinchChange { ratio: 1.4 });
    assert_eq!(surface.gesture_phase(), GesturePhase::ScalingBackground);
    let change = router.dispatch(&mut surface, GestureEvent::PinchEnd { ratio: 2.0 });
    assert_eq!(change, Some(SurfaceChange::Scaled(GestureTarget::Background)));
    router.dispatch(&mut surface, GestureEvent::PinchChange { ratio: 1.2 });
    router.dispatch(&mut surface, GestureEvent::PinchEnd { ratio: 1.5 });

    assert!(close(surface.background().scale, 3.0));
}

#[test]
fn rotation_adds_across_gestures() {
    let router = router();
    let mut surface = surface();
    let id = surface.add_emoji("🌀", Point::new(0.5, 0.5)).unwrap();
    surface.select_sticker(&id).unwrap();

    router.dispatch(&mut surface, GestureEvent::RotateChange { degrees: 12.0 });
    let change = router.dispatch(&mut surface, GestureEvent::RotateEnd { degrees: 30.0 });
    assert_eq!(change, Some(SurfaceChange::Rotated(id.clone())));
    router.dispatch(&mut surface, GestureEvent::RotateEnd { degrees: 45.0 });

    assert!(close(surface.sticker(&id).unwrap().transform.rotation_degrees, 75.0));
}

#[test]
fn four_pixels_is_a_tap_and_five_is_a_drag() {
    let router = router();
    let mut surface = surface();

    let change = router.dispatch(&mut surface, drag_end(4.0, 0.0));
    assert_eq!(change, Some(SurfaceChange::Selected(None)));
    assert_eq!(surface.background().position, Point::new(0.5, 0.5));

    let change = router.dispatch(&mut surface, drag_end(5.0, 0.0));
    assert_eq!(change, Some(SurfaceChange::Moved(GestureTarget::Background)));
    assert!(close(surface.background().position.x, 0.5125));
}

#[test]
fn tapping_background_commits_typed_text() {
    let router = router();
    let mut surface = surface();
    surface.type_text("H");
    surface.type_text("i");
    assert_eq!(surface.pending_text(), "Hi");

    let change = router.dispatch(&mut surface, tap_at(10.0, 10.0));

    let Some(SurfaceChange::StickerAdded(id)) = change.clone() else {
        panic!("expected a new sticker, got {change:?}");
    };
    assert_eq!(surface.stickers().len(), 1);
    let sticker = &surface.stickers()[0];
    assert_eq!(sticker.id, id);
    assert_eq!(sticker.kind, StickerKind::Text);
    assert_eq!(sticker.content, "Hi");
    assert_eq!(
        sticker.transform.position,
        CanvasConfig::default().default_sticker_position
    );
    assert_eq!(surface.pending_text(), "");
    assert_eq!(surface.selected(), None);
}

#[test]
fn tap_on_overlap_selects_topmost_sticker() {
    let router = router();
    let mut surface = surface();
    let _below = surface.add_emoji("🍎", Point::new(0.5, 0.5)).unwrap();
    let above = surface.add_emoji("🍐", Point::new(0.55, 0.5)).unwrap();

    let change = router.dispatch(&mut surface, tap_at(210.0, 200.0));
    assert_eq!(change, Some(SurfaceChange::Selected(Some(above.clone()))));
    assert_eq!(surface.selected(), Some(&above));

    // Tapping empty space deselects without creating anything.
    let change = router.dispatch(&mut surface, tap_at(390.0, 10.0));
    assert_eq!(change, Some(SurfaceChange::Selected(None)));
    assert_eq!(surface.stickers().len(), 2);
}

#[test]
fn hit_padding_reaches_past_the_glyph() {
    let router = router();
    let mut surface = surface();
    let id = surface.add_emoji("⚽", Point::new(0.5, 0.5)).unwrap();
    // Emoji box is 48px wide, so its edge is 24px from the centre.
    let change = router.dispatch(&mut surface, tap_at(200.0 + 24.0 + 19.0, 200.0));
    assert_eq!(change, Some(SurfaceChange::Selected(Some(id))));
}

#[test]
fn journal_persists_committed_gestures_only() {
    let mut journal = Journal::new(MemoryStore::new(), router());
    let day = DayKey::from_ymd(2024, 4, 2).unwrap();
    let mut surface = journal.open_day(day);

    journal.handle(&mut surface, drag_change(80.0, 0.0));
    assert!(journal.store().is_empty());
    journal.handle(&mut surface, drag_end(80.0, 0.0));
    assert_eq!(journal.store().len(), 1);

    let reopened = journal.open_day(day);
    assert!(close(reopened.background().position.x, 0.7));
    assert!(!reopened.is_gesture_active());
}

#[test]
fn journal_commits_text_on_done() {
    let mut journal = Journal::new(MemoryStore::new(), router());
    let day = DayKey::from_ymd(2024, 4, 3).unwrap();
    let mut surface = journal.open_day(day);
    surface.type_text("gym 7pm");
    let id = journal.commit_text(&mut surface).unwrap();

    let reopened = journal.open_day(day);
    assert_eq!(reopened.stickers().len(), 1);
    assert_eq!(reopened.stickers()[0].id, id);
    assert_eq!(reopened.stickers()[0].content, "gym 7pm");
}

#[test]
fn photo_pick_during_background_drag_keeps_reset_position() {
    let router = router();
    let mut surface = surface();
    let ticket = surface.begin_photo_pick();

    router.dispatch(&mut surface, drag_change(200.0, 0.0));
    assert!(close(surface.background().position.x, 1.0));
    assert!(surface.finish_photo_pick(ticket, Some(vec![1, 2, 3])));
    assert_eq!(surface.background().position, Point::new(0.5, 0.5));

    router.dispatch(&mut surface, drag_change(240.0, 0.0));
    let change = router.dispatch(&mut surface, drag_end(200.0, 0.0));

    assert_eq!(change, None);
    assert_eq!(surface.background().position, Point::new(0.5, 0.5));
    assert_eq!(surface.background_image(), Some(&[1, 2, 3][..]));
    assert!(!surface.is_gesture_active());

    // The next gesture applies normally.
    router.dispatch(&mut surface, drag_end(40.0, 0.0));
    assert!(close(surface.background().position.x, 0.6));
}

#[test]
fn clearing_background_during_pinch_keeps_reset_scale() {
    let router = router();
    let mut surface = surface();
    router.dispatch(&mut surface, GestureEvent::PinchChange { ratio: 2.0 });
    assert_eq!(surface.background().scale, 2.0);

    assert!(surface.clear_background());
    let change = router.dispatch(&mut surface, GestureEvent::PinchEnd { ratio: 3.0 });

    assert_eq!(change, None);
    assert_eq!(surface.background_image(), None);
    assert_eq!(surface.background().scale, 1.0);
    assert!(!surface.is_gesture_active());
}

#[test]
fn photo_pick_leaves_live_sticker_gesture_alone() {
    let router = router();
    let mut surface = surface();
    let id = surface.add_emoji("🌙", Point::new(0.5, 0.5)).unwrap();
    surface.select_sticker(&id).unwrap();
    let ticket = surface.begin_photo_pick();

    router.dispatch(&mut surface, drag_change(40.0, 0.0));
    assert!(surface.finish_photo_pick(ticket, Some(vec![9])));
    let change = router.dispatch(&mut surface, drag_end(40.0, 0.0));

    assert_eq!(change, Some(SurfaceChange::Moved(GestureTarget::Sticker(id.clone()))));
    assert!(close(surface.sticker(&id).unwrap().transform.position.x, 0.6));
    assert_eq!(surface.background().position, Point::new(0.5, 0.5));
}
