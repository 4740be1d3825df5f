//! End-to-end input sequences against the rapier-backed sandbox

use glam::Vec2;
use key_drop::consts::{MIN_SIZE, SIM_DT};
use key_drop::physics::PhysicsWorld;
use key_drop::platform::PermissionState;
use key_drop::sim::{GestureState, InputEvent, Sandbox, SandboxEvent, tick};
use key_drop::{PreviewMode, Settings};

fn down(id: u32, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown { id, x, y }
}

fn mv(id: u32, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove { id, x, y }
}

fn up(id: u32) -> InputEvent {
    InputEvent::PointerUp { id }
}

/// Sandbox past the start screen, level device
fn started(settings: Settings) -> Sandbox {
    let mut sandbox = Sandbox::new(settings, 1234, 800.0, 600.0, false);
    tick(&mut sandbox, &[down(0, 400.0, 300.0), up(0)], SIM_DT);
    assert!(sandbox.is_running());
    sandbox.drain_events();
    sandbox
}

#[test]
fn undersized_box_creates_nothing() {
    let mut sandbox = started(Settings::default());
    let just_short = MIN_SIZE - 0.5;
    tick(
        &mut sandbox,
        &[down(0, 100.0, 100.0), mv(0, 100.0 + just_short, 300.0), up(0)],
        SIM_DT,
    );
    tick(
        &mut sandbox,
        &[down(0, 100.0, 100.0), mv(0, 300.0, 100.0 + just_short), up(0)],
        SIM_DT,
    );
    assert!(sandbox.keys.is_empty());
    // Only the four walls
    assert_eq!(sandbox.world.body_count(), 4);
    let events = sandbox.drain_events();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| matches!(e, SandboxEvent::CreateDiscarded { .. })));
}

#[test]
fn box_at_min_size_creates_one_key_at_centroid() {
    let mut sandbox = started(Settings::default());
    tick(
        &mut sandbox,
        &[down(0, 100.0, 100.0), mv(0, 100.0 + MIN_SIZE, 100.0 + MIN_SIZE), up(0)],
        SIM_DT,
    );
    assert_eq!(sandbox.keys.len(), 1);

    let mut sandbox = started(Settings::default());
    // Drag from bottom-right to top-left, then release before any step
    let events = [down(0, 500.0, 400.0), mv(0, 300.0, 300.0), up(0)];
    for event in &events {
        key_drop::sim::apply_event(&mut sandbox, event);
    }
    assert_eq!(sandbox.keys.len(), 1);
    let key = &sandbox.keys[0];
    assert_eq!(key.box_size, Vec2::new(200.0, 100.0));
    let pose = sandbox.world.body_pose(key.body).unwrap();
    assert_eq!(pose.position, Vec2::new(400.0, 350.0));
    assert_eq!(pose.angle, 0.0);
    assert!(key.params.bow_width <= 100.0);
    assert!((22.5..=31.5).contains(&key.params.shaft_height));
}

#[test]
fn grab_head_then_release_twice() {
    let mut sandbox = started(Settings::default());
    tick(
        &mut sandbox,
        &[down(0, 300.0, 200.0), mv(0, 500.0, 300.0), up(0)],
        SIM_DT,
    );
    let key = sandbox.keys[0].clone();
    let pose = sandbox.world.body_pose(key.body).unwrap();
    let head = pose.to_world(key.layout().head.center);

    tick(&mut sandbox, &[down(3, head.x, head.y)], SIM_DT);
    assert!(matches!(
        sandbox.gesture.state(),
        GestureState::Grabbing(link) if link.key_id == key.id
    ));
    assert_eq!(sandbox.world.spring_count(), 1);

    // Dragging the grab moves the key toward the pointer
    for _ in 0..30 {
        tick(&mut sandbox, &[mv(3, head.x + 150.0, head.y)], SIM_DT);
    }
    let moved = sandbox.world.body_pose(key.body).unwrap();
    assert!(moved.position.x > pose.position.x + 10.0);

    tick(&mut sandbox, &[up(3), up(3)], SIM_DT);
    assert_eq!(*sandbox.gesture.state(), GestureState::Idle);
    assert_eq!(sandbox.world.spring_count(), 0);
    let releases = sandbox
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SandboxEvent::GrabReleased { .. }))
        .count();
    assert_eq!(releases, 1);
    // Grabbing never creates a key
    assert_eq!(sandbox.keys.len(), 1);
}

#[test]
fn empty_space_falls_through_to_create() {
    let mut sandbox = started(Settings::default());
    tick(
        &mut sandbox,
        &[down(0, 300.0, 200.0), mv(0, 500.0, 300.0), up(0)],
        SIM_DT,
    );
    tick(&mut sandbox, &[down(0, 50.0, 500.0)], SIM_DT);
    assert!(matches!(
        sandbox.gesture.state(),
        GestureState::DraggingCreate { .. }
    ));
    assert_eq!(sandbox.world.spring_count(), 0);
}

#[test]
fn second_pointer_is_ignored_until_primary_lifts() {
    let mut sandbox = started(Settings::default());
    tick(
        &mut sandbox,
        &[
            down(1, 100.0, 100.0),
            down(2, 600.0, 400.0),
            mv(2, 700.0, 500.0),
            mv(1, 250.0, 200.0),
            up(2),
        ],
        SIM_DT,
    );
    assert!(sandbox.keys.is_empty());
    tick(&mut sandbox, &[up(1)], SIM_DT);
    assert_eq!(sandbox.keys.len(), 1);
    assert_eq!(sandbox.keys[0].box_size, Vec2::new(150.0, 100.0));
}

#[test]
fn resize_rebuilds_walls_without_leaking() {
    let mut sandbox = started(Settings::default());
    for (w, h) in [(1024.0, 768.0), (375.0, 812.0), (800.0, 600.0)] {
        tick(&mut sandbox, &[InputEvent::Resize { w, h }], SIM_DT);
    }
    assert_eq!(sandbox.world.body_count(), 4);
    assert_eq!(sandbox.bounds.size(), Vec2::new(800.0, 600.0));
}

#[test]
fn stable_preview_is_the_committed_key() {
    let settings = Settings {
        preview_mode: PreviewMode::Stable,
        ..Settings::default()
    };
    let mut sandbox = started(settings);
    tick(&mut sandbox, &[down(0, 100.0, 100.0), mv(0, 340.0, 220.0)], SIM_DT);
    let preview = sandbox
        .gesture
        .preview(&mut sandbox.rng, PreviewMode::Stable)
        .unwrap();
    tick(&mut sandbox, &[up(0)], SIM_DT);
    assert_eq!(sandbox.keys[0].params, preview.params);
}

#[test]
fn keys_settle_on_the_floor_when_tilted() {
    let mut sandbox = started(Settings::default());
    tick(
        &mut sandbox,
        &[down(0, 300.0, 100.0), mv(0, 500.0, 200.0), up(0)],
        SIM_DT,
    );
    tick(&mut sandbox, &[InputEvent::Orientation { x: 45.0, y: 0.0 }], SIM_DT);
    for _ in 0..300 {
        tick(&mut sandbox, &[], SIM_DT);
    }
    let pose = sandbox.world.body_pose(sandbox.keys[0].body).unwrap();
    // Fell, but the floor wall held it inside the viewport
    assert!(pose.position.y > 300.0);
    assert!(pose.position.y < 600.0);
}

#[test]
fn denied_permission_runs_without_tilt() {
    let mut sandbox = Sandbox::new(Settings::default(), 1, 800.0, 600.0, true);
    tick(&mut sandbox, &[down(0, 400.0, 300.0)], SIM_DT);
    assert_eq!(sandbox.permission, PermissionState::Pending);
    tick(
        &mut sandbox,
        &[up(0), InputEvent::PermissionResult { granted: false }],
        SIM_DT,
    );
    assert_eq!(sandbox.permission, PermissionState::Denied);
    tick(
        &mut sandbox,
        &[InputEvent::Orientation { x: 60.0, y: 60.0 }],
        SIM_DT,
    );
    assert_eq!(sandbox.world.gravity(), Vec2::ZERO);

    // Gestures still work
    tick(
        &mut sandbox,
        &[down(0, 100.0, 100.0), mv(0, 200.0, 200.0), up(0)],
        SIM_DT,
    );
    assert_eq!(sandbox.keys.len(), 1);
}

#[test]
fn lost_release_does_not_stretch_the_next_box() {
    let mut sandbox = started(Settings::default());
    // Release happened off-surface and never arrived
    tick(&mut sandbox, &[down(1, 100.0, 100.0), mv(1, 300.0, 250.0)], SIM_DT);
    tick(&mut sandbox, &[down(1, 600.0, 400.0)], SIM_DT);
    assert!(matches!(
        sandbox.gesture.state(),
        GestureState::DraggingCreate { start, .. } if *start == Vec2::new(600.0, 400.0)
    ));
    tick(&mut sandbox, &[mv(1, 700.0, 500.0), up(1)], SIM_DT);
    assert_eq!(sandbox.keys.len(), 1);
    assert_eq!(sandbox.keys[0].box_size, Vec2::new(100.0, 100.0));
    let pose = sandbox.world.body_pose(sandbox.keys[0].body).unwrap();
    assert!((pose.position - Vec2::new(650.0, 450.0)).length() < 1e-3);
}
