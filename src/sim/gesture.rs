//! Pointer gesture state machine
//!
//! A pointer-down either grabs the key under it or starts dragging out a box
//! for a new key. Only the primary pointer (the first one down) is tracked;
//! every other pointer is ignored until the primary is released.
//!
//! The controller never owns keys. It queries and springs bodies through the
//! physics world and reports what happened as a [`GestureOutcome`]; the
//! sandbox turns a [`GestureOutcome::Create`] into a key.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::key::KeyEntity;
use super::shape::{ShapeParameters, generate_key_params};
use crate::consts::MIN_SIZE;
use crate::corners_to_box;
use crate::physics::{BodyId, PhysicsWorld, SpringDesc, SpringId};
use crate::settings::{PreviewMode, Settings};

/// Platform pointer identifier (touch identifier or pointerId)
pub type PointerId = u32;

/// Live spring between the pointer and a grabbed key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabLink {
    pub spring: SpringId,
    pub key_id: u32,
    pub body: BodyId,
    /// Grab point in the body's frame, fixed at grab time
    pub local_anchor: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Dragging out a box for a new key
    DraggingCreate {
        start: Vec2,
        end: Vec2,
        /// Seed for the stable preview, rolled when the drag starts
        preview_seed: u64,
    },
    Grabbing(GrabLink),
}

/// What a pointer event did
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Not the primary pointer, or nothing to do
    Ignored,
    Grabbed { key_id: u32 },
    DragStarted { start: Vec2 },
    Moved,
    /// Grab link removed
    Released { key_id: u32 },
    /// Box big enough: the caller should spawn this key
    Create {
        center: Vec2,
        box_size: Vec2,
        params: ShapeParameters,
    },
    /// Box smaller than [`MIN_SIZE`] on some side
    Discarded { box_size: Vec2 },
}

/// Key shape shown while dragging
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub center: Vec2,
    pub box_size: Vec2,
    pub params: ShapeParameters,
}

/// Whether a dragged box commits a key
pub fn box_is_large_enough(box_size: Vec2) -> bool {
    box_size.x >= MIN_SIZE && box_size.y >= MIN_SIZE
}

/// Params for a stable-preview gesture; the same seed and box always give
/// the same key.
pub fn seeded_params(seed: u64, box_size: Vec2) -> ShapeParameters {
    generate_key_params(&mut Pcg32::seed_from_u64(seed), box_size.x, box_size.y)
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    primary: Option<PointerId>,
    /// Last position of the primary pointer
    pointer: Vec2,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            primary: None,
            pointer: Vec2::ZERO,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn primary(&self) -> Option<PointerId> {
        self.primary
    }

    pub fn grab_link(&self) -> Option<&GrabLink> {
        match &self.state {
            GestureState::Grabbing(link) => Some(link),
            _ => None,
        }
    }

    /// Primary pointer pressed: grab the first key under it, else start a
    /// create drag.
    pub fn pointer_down<W: PhysicsWorld + ?Sized>(
        &mut self,
        id: PointerId,
        pos: Vec2,
        world: &mut W,
        keys: &[KeyEntity],
        rng: &mut Pcg32,
        settings: &Settings,
    ) -> GestureOutcome {
        match self.primary {
            // Same pointer pressed again: its release never reached us
            Some(primary) if primary == id => {
                log::warn!("Pointer {} pressed without a release; restarting gesture", id);
                self.cancel(world);
            }
            Some(_) => return GestureOutcome::Ignored,
            None => {}
        }
        self.primary = Some(id);
        self.pointer = pos;

        if let Some(link) = try_grab(world, keys, pos, settings) {
            log::info!("Grabbed key {} at ({:.0}, {:.0})", link.key_id, pos.x, pos.y);
            self.state = GestureState::Grabbing(link);
            return GestureOutcome::Grabbed {
                key_id: link.key_id,
            };
        }

        self.state = GestureState::DraggingCreate {
            start: pos,
            end: pos,
            preview_seed: rng.random(),
        };
        GestureOutcome::DragStarted { start: pos }
    }

    /// Primary pointer moved. A grab only records the pointer here; the
    /// spring target follows it once per tick.
    pub fn pointer_move(&mut self, id: PointerId, pos: Vec2) -> GestureOutcome {
        if self.primary != Some(id) {
            return GestureOutcome::Ignored;
        }
        self.pointer = pos;
        if let GestureState::DraggingCreate { end, .. } = &mut self.state {
            *end = pos;
        }
        GestureOutcome::Moved
    }

    /// Primary pointer released: drop the grab or commit/discard the box.
    /// Releasing with nothing in progress only clears the state.
    pub fn pointer_up<W: PhysicsWorld + ?Sized>(
        &mut self,
        id: PointerId,
        world: &mut W,
        rng: &mut Pcg32,
        mode: PreviewMode,
    ) -> GestureOutcome {
        if self.primary != Some(id) {
            return GestureOutcome::Ignored;
        }
        self.primary = None;

        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => GestureOutcome::Ignored,
            GestureState::Grabbing(link) => {
                world.remove_spring(link.spring);
                log::info!("Released key {}", link.key_id);
                GestureOutcome::Released {
                    key_id: link.key_id,
                }
            }
            GestureState::DraggingCreate {
                start,
                end,
                preview_seed,
            } => {
                let (center, box_size) = corners_to_box(start, end);
                if !box_is_large_enough(box_size) {
                    log::debug!("Discarded {:.0}x{:.0} box", box_size.x, box_size.y);
                    return GestureOutcome::Discarded { box_size };
                }
                let params = match mode {
                    PreviewMode::Stable => seeded_params(preview_seed, box_size),
                    PreviewMode::Shimmer => generate_key_params(rng, box_size.x, box_size.y),
                };
                GestureOutcome::Create {
                    center,
                    box_size,
                    params,
                }
            }
        }
    }

    /// End whatever is in progress without a pointer-up. A grab drops its
    /// spring; a create drag is abandoned without committing.
    pub fn cancel<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> GestureOutcome {
        self.primary = None;
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Grabbing(link) => {
                world.remove_spring(link.spring);
                log::info!("Released key {} (cancelled)", link.key_id);
                GestureOutcome::Released {
                    key_id: link.key_id,
                }
            }
            GestureState::DraggingCreate { .. } | GestureState::Idle => GestureOutcome::Ignored,
        }
    }

    /// Move the grab spring's pointer end to the last pointer position
    pub fn update_link<W: PhysicsWorld + ?Sized>(&self, world: &mut W) {
        if let GestureState::Grabbing(link) = &self.state {
            world.set_spring_target(link.spring, self.pointer);
        }
    }

    /// The key shape to draw under the drag box, None unless dragging a box
    /// that would commit.
    pub fn preview(&self, rng: &mut Pcg32, mode: PreviewMode) -> Option<Preview> {
        let GestureState::DraggingCreate {
            start,
            end,
            preview_seed,
        } = self.state
        else {
            return None;
        };
        let (center, box_size) = corners_to_box(start, end);
        if !box_is_large_enough(box_size) {
            return None;
        }
        let params = match mode {
            PreviewMode::Stable => seeded_params(preview_seed, box_size),
            PreviewMode::Shimmer => generate_key_params(rng, box_size.x, box_size.y),
        };
        Some(Preview {
            center,
            box_size,
            params,
        })
    }
}

/// Spring the first key whose shape contains `pos`
fn try_grab<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    keys: &[KeyEntity],
    pos: Vec2,
    settings: &Settings,
) -> Option<GrabLink> {
    let bodies: Vec<BodyId> = keys.iter().map(|k| k.body).collect();
    let body = *world.bodies_at_point(&bodies, pos).first()?;
    let key = keys.iter().find(|k| k.body == body)?;
    let pose = world.body_pose(body)?;
    let local_anchor = pose.to_local(pos);

    let spring = world.add_spring(&SpringDesc {
        body,
        target: pos,
        local_anchor,
        stiffness: settings.grab_stiffness,
        damping: settings.grab_damping,
    })?;

    Some(GrabLink {
        spring,
        key_id: key.id,
        body,
        local_anchor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RapierWorld;

    struct Fixture {
        world: RapierWorld,
        keys: Vec<KeyEntity>,
        rng: Pcg32,
        settings: Settings,
        gesture: GestureController,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: RapierWorld::new(1000.0),
                keys: Vec::new(),
                rng: Pcg32::seed_from_u64(1),
                settings: Settings::default(),
                gesture: GestureController::new(),
            }
        }

        fn with_key(mut self, center: Vec2, size: Vec2) -> Self {
            let params = seeded_params(42, size);
            let key = KeyEntity::spawn(&mut self.world, 1, center, size, params);
            self.keys.push(key);
            self
        }

        fn down(&mut self, id: PointerId, x: f32, y: f32) -> GestureOutcome {
            self.gesture.pointer_down(
                id,
                Vec2::new(x, y),
                &mut self.world,
                &self.keys,
                &mut self.rng,
                &self.settings,
            )
        }

        fn up(&mut self, id: PointerId) -> GestureOutcome {
            self.gesture
                .pointer_up(id, &mut self.world, &mut self.rng, self.settings.preview_mode)
        }
    }

    #[test]
    fn test_drag_commits_key_at_centroid() {
        let mut f = Fixture::new();
        assert_eq!(f.down(0, 100.0, 100.0), GestureOutcome::DragStarted {
            start: Vec2::new(100.0, 100.0)
        });
        f.gesture.pointer_move(0, Vec2::new(300.0, 200.0));
        match f.up(0) {
            GestureOutcome::Create {
                center, box_size, ..
            } => {
                assert_eq!(center, Vec2::new(200.0, 150.0));
                assert_eq!(box_size, Vec2::new(200.0, 100.0));
            }
            other => panic!("expected Create, got {:?}", other),
        }
        assert_eq!(*f.gesture.state(), GestureState::Idle);
    }

    #[test]
    fn test_reverse_drag_uses_absolute_size() {
        let mut f = Fixture::new();
        f.down(0, 300.0, 200.0);
        f.gesture.pointer_move(0, Vec2::new(100.0, 100.0));
        assert!(matches!(
            f.up(0),
            GestureOutcome::Create { box_size, .. } if box_size == Vec2::new(200.0, 100.0)
        ));
    }

    #[test]
    fn test_small_box_discarded() {
        let mut f = Fixture::new();
        f.down(0, 100.0, 100.0);
        f.gesture.pointer_move(0, Vec2::new(123.0, 300.0));
        assert_eq!(f.up(0), GestureOutcome::Discarded {
            box_size: Vec2::new(23.0, 200.0)
        });
        assert_eq!(*f.gesture.state(), GestureState::Idle);
    }

    #[test]
    fn test_grab_head_then_release() {
        let mut f = Fixture::new().with_key(Vec2::new(400.0, 300.0), Vec2::new(200.0, 100.0));
        let head = f.keys[0].layout().head.center + Vec2::new(400.0, 300.0);
        assert_eq!(f.down(7, head.x, head.y), GestureOutcome::Grabbed { key_id: 1 });
        assert_eq!(f.world.spring_count(), 1);
        let link = *f.gesture.grab_link().unwrap();
        assert!((link.local_anchor - f.keys[0].layout().head.center).length() < 1e-3);

        assert_eq!(f.up(7), GestureOutcome::Released { key_id: 1 });
        assert_eq!(f.world.spring_count(), 0);
        // A second release has nothing left to do
        assert_eq!(f.up(7), GestureOutcome::Ignored);
        assert_eq!(f.gesture.cancel(&mut f.world), GestureOutcome::Ignored);
        assert_eq!(f.world.spring_count(), 0);
    }

    #[test]
    fn test_cancel_drops_grab_and_drag() {
        let mut f = Fixture::new().with_key(Vec2::new(400.0, 300.0), Vec2::new(200.0, 100.0));
        let head = f.keys[0].layout().head.center + Vec2::new(400.0, 300.0);
        f.down(0, head.x, head.y);
        assert_eq!(f.gesture.cancel(&mut f.world), GestureOutcome::Released { key_id: 1 });
        assert_eq!(f.world.spring_count(), 0);
        assert_eq!(f.gesture.primary(), None);

        f.down(0, 10.0, 10.0);
        f.gesture.pointer_move(0, Vec2::new(200.0, 200.0));
        assert_eq!(f.gesture.cancel(&mut f.world), GestureOutcome::Ignored);
        assert_eq!(*f.gesture.state(), GestureState::Idle);
        // Nothing left to commit
        assert_eq!(f.up(0), GestureOutcome::Ignored);
    }

    #[test]
    fn test_lost_release_restarts_drag() {
        let mut f = Fixture::new();
        f.down(1, 100.0, 100.0);
        f.gesture.pointer_move(1, Vec2::new(300.0, 250.0));
        // Released off-surface, then pressed again with the same id
        assert_eq!(f.down(1, 600.0, 400.0), GestureOutcome::DragStarted {
            start: Vec2::new(600.0, 400.0)
        });
        f.gesture.pointer_move(1, Vec2::new(700.0, 500.0));
        match f.up(1) {
            GestureOutcome::Create {
                center, box_size, ..
            } => {
                assert_eq!(center, Vec2::new(650.0, 450.0));
                assert_eq!(box_size, Vec2::new(100.0, 100.0));
            }
            other => panic!("expected Create, got {:?}", other),
        }
    }

    #[test]
    fn test_lost_release_during_grab_drops_spring() {
        let mut f = Fixture::new().with_key(Vec2::new(400.0, 300.0), Vec2::new(200.0, 100.0));
        let head = f.keys[0].layout().head.center + Vec2::new(400.0, 300.0);
        f.down(1, head.x, head.y);
        assert_eq!(f.world.spring_count(), 1);
        assert!(matches!(f.down(1, 20.0, 20.0), GestureOutcome::DragStarted { .. }));
        assert_eq!(f.world.spring_count(), 0);
    }

    #[test]
    fn test_miss_falls_through_to_create() {
        let mut f = Fixture::new().with_key(Vec2::new(400.0, 300.0), Vec2::new(200.0, 100.0));
        assert!(matches!(f.down(0, 50.0, 50.0), GestureOutcome::DragStarted { .. }));
        assert_eq!(f.world.spring_count(), 0);
    }

    #[test]
    fn test_only_primary_pointer_tracked() {
        let mut f = Fixture::new();
        f.down(1, 100.0, 100.0);
        assert_eq!(f.down(2, 500.0, 500.0), GestureOutcome::Ignored);
        assert_eq!(f.gesture.pointer_move(2, Vec2::new(0.0, 0.0)), GestureOutcome::Ignored);
        assert_eq!(f.up(2), GestureOutcome::Ignored);
        f.gesture.pointer_move(1, Vec2::new(200.0, 200.0));
        assert!(matches!(f.up(1), GestureOutcome::Create { .. }));
        // Primary freed; a new pointer may start
        assert!(matches!(f.down(2, 10.0, 10.0), GestureOutcome::DragStarted { .. }));
    }

    #[test]
    fn test_grab_move_defers_spring_target() {
        let mut f = Fixture::new().with_key(Vec2::new(400.0, 300.0), Vec2::new(200.0, 100.0));
        f.down(0, 400.0, 300.0);
        f.gesture.pointer_move(0, Vec2::new(420.0, 280.0));
        assert_eq!(f.gesture.pointer(), Vec2::new(420.0, 280.0));
        f.gesture.update_link(&mut f.world);
        assert!(f.gesture.grab_link().is_some());
    }

    #[test]
    fn test_stable_preview_matches_committed_key() {
        let mut f = Fixture::new();
        f.down(0, 100.0, 100.0);
        f.gesture.pointer_move(0, Vec2::new(260.0, 190.0));
        let first = f.gesture.preview(&mut f.rng, PreviewMode::Stable).unwrap();
        let second = f.gesture.preview(&mut f.rng, PreviewMode::Stable).unwrap();
        assert_eq!(first, second);
        match f.up(0) {
            GestureOutcome::Create { params, .. } => assert_eq!(params, first.params),
            other => panic!("expected Create, got {:?}", other),
        }
    }

    #[test]
    fn test_shimmer_preview_rerolls() {
        let mut f = Fixture::new();
        f.down(0, 100.0, 100.0);
        f.gesture.pointer_move(0, Vec2::new(260.0, 190.0));
        let a = f.gesture.preview(&mut f.rng, PreviewMode::Shimmer).unwrap();
        let b = f.gesture.preview(&mut f.rng, PreviewMode::Shimmer).unwrap();
        assert_eq!(a.center, b.center);
        assert_ne!(a.params, b.params);
    }

    #[test]
    fn test_no_preview_below_min_size() {
        let mut f = Fixture::new();
        f.down(0, 100.0, 100.0);
        assert!(f.gesture.preview(&mut f.rng, PreviewMode::Stable).is_none());
        f.gesture.pointer_move(0, Vec2::new(110.0, 300.0));
        assert!(f.gesture.preview(&mut f.rng, PreviewMode::Stable).is_none());
    }
}
