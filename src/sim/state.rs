//! Sandbox state
//!
//! One explicit context owns everything that lives for the session: the
//! physics world, the keys, the gesture and calibration controllers, the
//! walls and the seeded RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bounds::BoundaryManager;
use super::calibration::CalibrationController;
use super::gesture::{GestureController, GestureOutcome, PointerId};
use super::key::{KeyEntity, draw_key_graphic};
use super::shape::ShapeParameters;
use crate::consts::{START_BUTTON_H, START_BUTTON_W};
use crate::physics::{PhysicsWorld, RapierWorld};
use crate::platform::{OrientationSample, PermissionError, PermissionState};
use crate::renderer::Canvas;
use crate::renderer::vertex::colors;
use crate::settings::Settings;

pub const START_LABEL: &str = "Start";
pub const START_HINT: &str = "The angle at the moment you tap becomes the floor";

/// Something the shell or a test may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SandboxEvent {
    KeyCreated {
        key_id: u32,
        center: Vec2,
        box_size: Vec2,
    },
    CreateDiscarded {
        box_size: Vec2,
    },
    GrabStarted {
        key_id: u32,
    },
    GrabReleased {
        key_id: u32,
    },
    /// The shell should show the platform permission prompt
    PermissionRequested,
    /// The shell should tell the user (alert)
    PermissionDenied(PermissionError),
    Calibrated {
        x: f32,
        y: f32,
    },
}

/// The whole sandbox
pub struct Sandbox<W: PhysicsWorld = RapierWorld> {
    pub settings: Settings,
    /// Run seed
    pub seed: u64,
    pub world: W,
    /// Keys in creation order (ascending id)
    pub keys: Vec<KeyEntity>,
    pub gesture: GestureController,
    pub calibration: CalibrationController,
    pub permission: PermissionState,
    pub bounds: BoundaryManager,
    pub rng: Pcg32,
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// Latest orientation reading
    pub orientation: OrientationSample,
    /// Simulation steps taken
    pub time_ticks: u64,
    events: Vec<SandboxEvent>,
    next_key_id: u32,
}

impl Sandbox<RapierWorld> {
    /// Sandbox on the rapier backend
    pub fn new(settings: Settings, seed: u64, width: f32, height: f32, needs_prompt: bool) -> Self {
        let world = RapierWorld::new(settings.gravity_scale);
        Self::with_world(world, settings, seed, width, height, needs_prompt)
    }
}

impl<W: PhysicsWorld> Sandbox<W> {
    /// Sandbox on any physics backend. Gravity starts at zero and the start
    /// screen is up until calibration (or a permission denial).
    pub fn with_world(
        mut world: W,
        settings: Settings,
        seed: u64,
        width: f32,
        height: f32,
        needs_prompt: bool,
    ) -> Self {
        world.set_gravity(Vec2::ZERO);
        let bounds = BoundaryManager::new(&mut world, width, height);
        let permission = PermissionState::initial(needs_prompt);
        log::info!(
            "Sandbox {}x{} seed {} permission {:?}",
            width,
            height,
            seed,
            permission
        );
        Self {
            settings,
            seed,
            world,
            keys: Vec::new(),
            gesture: GestureController::new(),
            calibration: CalibrationController::new(),
            permission,
            bounds,
            rng: Pcg32::seed_from_u64(seed),
            viewport: Vec2::new(width, height),
            orientation: OrientationSample::default(),
            time_ticks: 0,
            events: Vec::new(),
            next_key_id: 1,
        }
    }

    /// Past the start screen: calibrated, or running without tilt after a
    /// denial
    pub fn is_running(&self) -> bool {
        self.calibration.is_calibrated() || self.permission == PermissionState::Denied
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<SandboxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn key(&self, id: u32) -> Option<&KeyEntity> {
        self.keys.iter().find(|k| k.id == id)
    }

    /// Whether `pos` is on the start button (centered, edges excluded)
    pub fn start_button_contains(&self, pos: Vec2) -> bool {
        let d = (pos - self.viewport * 0.5).abs();
        d.x < START_BUTTON_W / 2.0 && d.y < START_BUTTON_H / 2.0
    }

    /// Start button pressed: calibrate now, or ask for permission first
    pub fn press_start(&mut self) {
        match self.permission {
            PermissionState::Unsupported | PermissionState::Granted => self.calibrate_now(),
            PermissionState::NotDetermined => {
                self.permission = PermissionState::Pending;
                log::info!("Requesting orientation permission");
                self.events.push(SandboxEvent::PermissionRequested);
            }
            PermissionState::Pending | PermissionState::Denied => {}
        }
    }

    /// Answer from the permission prompt
    pub fn permission_result(&mut self, result: Result<(), PermissionError>) {
        if self.permission != PermissionState::Pending {
            log::warn!("Permission answer while {:?}", self.permission);
        }
        match result {
            Ok(()) => {
                self.permission = PermissionState::Granted;
                self.calibrate_now();
            }
            Err(err) => {
                log::warn!("{}", err);
                self.permission = PermissionState::Denied;
                self.events.push(SandboxEvent::PermissionDenied(err));
            }
        }
    }

    /// Zero the tilt at the latest reading
    pub fn calibrate_now(&mut self) {
        let OrientationSample { x, y } = self.orientation;
        self.calibration.calibrate(x, y);
        self.events.push(SandboxEvent::Calibrated { x, y });
    }

    pub fn set_orientation(&mut self, sample: OrientationSample) {
        self.orientation = sample;
    }

    pub fn pointer_down(&mut self, id: PointerId, pos: Vec2) {
        if !self.is_running() {
            if self.start_button_contains(pos) {
                self.press_start();
            }
            return;
        }
        let outcome = self.gesture.pointer_down(
            id,
            pos,
            &mut self.world,
            &self.keys,
            &mut self.rng,
            &self.settings,
        );
        self.apply_outcome(outcome);
    }

    pub fn pointer_move(&mut self, id: PointerId, pos: Vec2) {
        self.gesture.pointer_move(id, pos);
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        let outcome =
            self.gesture
                .pointer_up(id, &mut self.world, &mut self.rng, self.settings.preview_mode);
        self.apply_outcome(outcome);
    }

    /// Abandon the gesture in progress, e.g. when the page loses focus
    pub fn cancel_gesture(&mut self) {
        let outcome = self.gesture.cancel(&mut self.world);
        self.apply_outcome(outcome);
    }

    /// New viewport size; walls follow
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.bounds.rebuild(&mut self.world, width, height);
    }

    /// Gravity from the latest tilt, when tilt is usable and calibrated
    pub fn update_gravity(&mut self) {
        if !self.permission.allows_orientation() {
            return;
        }
        let OrientationSample { x, y } = self.orientation;
        if let Some(gravity) = self.calibration.compute_gravity(x, y) {
            self.world.set_gravity(gravity);
        }
    }

    /// Spawn a key centered at `center` and record it
    pub fn add_key(&mut self, center: Vec2, box_size: Vec2, params: ShapeParameters) -> u32 {
        let key_id = self.next_key_id;
        self.next_key_id += 1;
        let key = KeyEntity::spawn(&mut self.world, key_id, center, box_size, params);
        log::info!(
            "Created key {} ({:.0}x{:.0}, {} notches) at ({:.0}, {:.0})",
            key_id,
            box_size.x,
            box_size.y,
            key.params.notch_count,
            center.x,
            center.y
        );
        self.keys.push(key);
        self.events.push(SandboxEvent::KeyCreated {
            key_id,
            center,
            box_size,
        });
        key_id
    }

    fn apply_outcome(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::Ignored | GestureOutcome::Moved | GestureOutcome::DragStarted { .. } => {}
            GestureOutcome::Grabbed { key_id } => {
                self.events.push(SandboxEvent::GrabStarted { key_id })
            }
            GestureOutcome::Released { key_id } => {
                self.events.push(SandboxEvent::GrabReleased { key_id })
            }
            GestureOutcome::Create {
                center,
                box_size,
                params,
            } => {
                self.add_key(center, box_size, params);
            }
            GestureOutcome::Discarded { box_size } => {
                self.events.push(SandboxEvent::CreateDiscarded { box_size })
            }
        }
    }

    /// Draw one frame. The background itself is the surface clear color.
    pub fn render<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        if !self.is_running() {
            self.render_start_screen(canvas);
            return;
        }

        self.bounds.render(canvas);

        let background = self.settings.background_rgb();
        for key in &self.keys {
            if let Some(pose) = self.world.body_pose(key.body) {
                key.render(canvas, pose, background);
            }
        }

        if let Some(preview) = self.gesture.preview(&mut self.rng, self.settings.preview_mode) {
            canvas.push();
            canvas.no_fill();
            canvas.stroke(colors::PREVIEW_OUTLINE, colors::PREVIEW_OUTLINE_WEIGHT);
            canvas.rect(preview.center, preview.box_size);
            canvas.pop();
            draw_key_graphic(
                canvas,
                preview.center,
                preview.box_size,
                &preview.params,
                background,
            );
        }
    }

    fn render_start_screen<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let center = self.viewport * 0.5;
        canvas.push();
        canvas.no_stroke();
        canvas.fill(colors::OVERLAY);
        canvas.rect(center, self.viewport);
        canvas.fill(colors::START_BUTTON);
        canvas.rect(center, Vec2::new(START_BUTTON_W, START_BUTTON_H));
        canvas.fill(colors::TEXT);
        canvas.text(center, 22.0, START_LABEL);
        canvas.text(center + Vec2::new(0.0, 60.0), 14.0, START_HINT);
        canvas.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Primitive, RecordingCanvas};

    fn running() -> Sandbox {
        let mut sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, false);
        sandbox.press_start();
        sandbox.drain_events();
        sandbox
    }

    #[test]
    fn test_new_sandbox_waits_on_start_screen() {
        let sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, false);
        assert!(!sandbox.is_running());
        assert_eq!(sandbox.world.gravity(), Vec2::ZERO);
        assert_eq!(sandbox.world.body_count(), 4);
        assert_eq!(sandbox.permission, PermissionState::Unsupported);
    }

    #[test]
    fn test_start_without_prompt_calibrates_at_latest_reading() {
        let mut sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, false);
        sandbox.set_orientation(OrientationSample::new(20.0, -5.0));
        sandbox.pointer_down(0, Vec2::new(400.0, 300.0));
        assert!(sandbox.is_running());
        assert_eq!(sandbox.calibration.offsets(), (20.0, -5.0));
        assert_eq!(sandbox.drain_events(), vec![SandboxEvent::Calibrated {
            x: 20.0,
            y: -5.0
        }]);
    }

    #[test]
    fn test_taps_off_the_button_are_ignored() {
        let mut sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, false);
        sandbox.pointer_down(0, Vec2::new(10.0, 10.0));
        // Button edge is excluded
        sandbox.pointer_down(0, Vec2::new(510.0, 300.0));
        assert!(!sandbox.is_running());
        assert!(sandbox.drain_events().is_empty());
    }

    #[test]
    fn test_prompt_flow_granted() {
        let mut sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, true);
        sandbox.press_start();
        assert_eq!(sandbox.permission, PermissionState::Pending);
        assert_eq!(sandbox.drain_events(), vec![SandboxEvent::PermissionRequested]);
        // A second tap while the prompt is up does nothing
        sandbox.press_start();
        assert!(sandbox.drain_events().is_empty());

        sandbox.permission_result(Ok(()));
        assert_eq!(sandbox.permission, PermissionState::Granted);
        assert!(sandbox.calibration.is_calibrated());
    }

    #[test]
    fn test_prompt_flow_denied_runs_without_gravity() {
        let mut sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, true);
        sandbox.press_start();
        sandbox.drain_events();
        sandbox.permission_result(Err(PermissionError::Denied));
        assert_eq!(sandbox.drain_events(), vec![SandboxEvent::PermissionDenied(
            PermissionError::Denied
        )]);
        assert!(sandbox.is_running());
        assert!(!sandbox.calibration.is_calibrated());

        sandbox.set_orientation(OrientationSample::new(80.0, 80.0));
        sandbox.update_gravity();
        assert_eq!(sandbox.world.gravity(), Vec2::ZERO);
    }

    #[test]
    fn test_update_gravity_uses_latest_reading() {
        let mut sandbox = running();
        sandbox.set_orientation(OrientationSample::new(45.0, -45.0));
        sandbox.update_gravity();
        assert!((sandbox.world.gravity() - Vec2::new(-1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_key_ids_increase() {
        let mut sandbox = running();
        let params = crate::sim::gesture::seeded_params(1, Vec2::new(100.0, 50.0));
        let a = sandbox.add_key(Vec2::new(200.0, 200.0), Vec2::new(100.0, 50.0), params.clone());
        let b = sandbox.add_key(Vec2::new(500.0, 200.0), Vec2::new(100.0, 50.0), params);
        assert!(b > a);
        assert_eq!(sandbox.key(b).map(|k| k.id), Some(b));
        assert_eq!(sandbox.world.body_count(), 6);
    }

    #[test]
    fn test_start_screen_render() {
        let mut sandbox = Sandbox::new(Settings::default(), 7, 800.0, 600.0, false);
        let mut canvas = RecordingCanvas::new();
        sandbox.render(&mut canvas);
        let ops = canvas.ops();
        assert_eq!(ops[0].size, Vec2::new(800.0, 600.0));
        assert_eq!(ops[1].size, Vec2::new(220.0, 70.0));
        assert_eq!(ops[1].color, colors::START_BUTTON);
        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec![START_LABEL, START_HINT]);
    }

    #[test]
    fn test_running_render_draws_ground_keys_and_preview() {
        let mut sandbox = running();
        let size = Vec2::new(200.0, 100.0);
        let params = crate::sim::gesture::seeded_params(3, size);
        let notches = params.notch_count as usize;
        sandbox.add_key(Vec2::new(400.0, 300.0), size, params);

        sandbox.pointer_down(0, Vec2::new(20.0, 20.0));
        sandbox.pointer_move(0, Vec2::new(120.0, 80.0));

        let mut canvas = RecordingCanvas::new();
        sandbox.render(&mut canvas);
        let ops = canvas.ops();
        // Ground, key (head, hollow, shaft, notches), preview outline, preview key
        assert_eq!(ops[0].color, colors::GROUND);
        let outline = &ops[4 + notches];
        assert_eq!(outline.primitive, Primitive::RectOutline { weight: 1.0 });
        assert_eq!(outline.center, Vec2::new(70.0, 50.0));
        assert_eq!(outline.size, Vec2::new(100.0, 60.0));
        assert!(ops.len() > 5 + notches);
        assert_eq!(canvas.depth(), 0);
    }
}
