//! Key Drop entry point
//!
//! Handles platform-specific initialization and runs the sandbox loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::anyhow;
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{DeviceOrientationEvent, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use key_drop::consts::*;
    use key_drop::renderer::{RenderState, TextLabel, VertexCanvas};
    use key_drop::sim::{InputEvent, Sandbox, SandboxEvent, apply_event, tick};
    use key_drop::{PreviewMode, Settings};

    // Motion permission only exists on some browsers (iOS Safari)
    #[wasm_bindgen(inline_js = "
        export function orientation_needs_permission() {
            return typeof DeviceOrientationEvent !== 'undefined'
                && typeof DeviceOrientationEvent.requestPermission === 'function';
        }

        export function request_orientation_permission() {
            return DeviceOrientationEvent.requestPermission();
        }
    ")]
    extern "C" {
        fn orientation_needs_permission() -> bool;
        fn request_orientation_permission() -> js_sys::Promise;
    }

    /// Sandbox instance plus everything the browser loop needs
    struct App {
        sandbox: Sandbox,
        render_state: Option<RenderState>,
        canvas: VertexCanvas,
        /// Input queued since the last frame
        pending: Vec<InputEvent>,
        accumulator: f32,
        last_time: f64,
        /// Labels currently laid out in the DOM
        shown_labels: Vec<TextLabel>,
    }

    impl App {
        fn new(settings: Settings, seed: u64, width: f32, height: f32) -> Self {
            let needs_prompt = orientation_needs_permission();
            Self {
                sandbox: Sandbox::new(settings, seed, width, height, needs_prompt),
                render_state: None,
                canvas: VertexCanvas::new(),
                pending: Vec::new(),
                accumulator: 0.0,
                last_time: 0.0,
                shown_labels: Vec::new(),
            }
        }

        /// Run fixed simulation steps; queued input goes into the first one
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut events = std::mem::take(&mut self.pending);
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.sandbox, &events, SIM_DT);
                events.clear();
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
            if !events.is_empty() {
                // No step this frame; keep the input for the next one
                self.pending = events;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            self.canvas.clear();
            self.sandbox.render(&mut self.canvas);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.canvas.vertices()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    /// React to what the sandbox reported
    fn handle_sandbox_events(app: &Rc<RefCell<App>>) {
        let events = app.borrow_mut().sandbox.drain_events();
        for event in events {
            match event {
                SandboxEvent::PermissionRequested => request_permission(app.clone()),
                SandboxEvent::PermissionDenied(err) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&err.to_string());
                    }
                }
                SandboxEvent::KeyCreated { .. } => {
                    let count = app.borrow().sandbox.keys.len();
                    set_text("key-count", &count.to_string());
                }
                _ => {}
            }
        }
    }

    /// Ask for motion access; the answer arrives as an input event
    fn request_permission(app: Rc<RefCell<App>>) {
        let promise = request_orientation_permission();
        spawn_local(async move {
            let event = match JsFuture::from(promise).await {
                Ok(answer) => InputEvent::PermissionResult {
                    granted: answer.as_string().as_deref() == Some("granted"),
                },
                Err(e) => InputEvent::PermissionFailed {
                    message: e.as_string().unwrap_or_else(|| format!("{:?}", e)),
                },
            };
            app.borrow_mut().pending.push(event);
        });
    }

    fn set_text(id: &str, text: &str) {
        let el = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id));
        if let Some(el) = el {
            el.set_text_content(Some(text));
        }
    }

    /// Lay out canvas text as absolutely positioned elements over the canvas
    fn update_labels(app: &mut App) {
        let labels = app.canvas.labels();
        if labels == app.shown_labels.as_slice() {
            return;
        }
        app.shown_labels = labels.to_vec();

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(container) = document.get_element_by_id("labels") else {
            return;
        };
        container.set_inner_html("");
        for label in &app.shown_labels {
            let Ok(el) = document.create_element("div") else {
                continue;
            };
            let [r, g, b, a] = label.color;
            let style = format!(
                "position:absolute;left:{}px;top:{}px;transform:translate(-50%,-50%);\
                 font-size:{}px;color:rgba({},{},{},{});white-space:nowrap;pointer-events:none",
                label.position.x,
                label.position.y,
                label.size,
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                a
            );
            let _ = el.set_attribute("style", &style);
            el.set_text_content(Some(&label.text));
            let _ = container.append_child(&el);
        }
    }

    pub async fn run() -> anyhow::Result<()> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| anyhow!("{}", e))?;

        log::info!("Key Drop starting...");

        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
        let document = window.document().ok_or_else(|| anyhow!("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| anyhow!("missing #canvas"))?
            .dyn_into()
            .map_err(|e| anyhow!("{:?}", e))?;

        // Logical size drives the sandbox, device pixels drive the surface
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let background = settings.background;
        let app = Rc::new(RefCell::new(App::new(
            settings,
            seed,
            client_w as f32,
            client_h as f32,
        )));
        log::info!("Sandbox initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            RenderState::new(surface, &adapter, width, height, dpr as f32, background).await?;
        app.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, app.clone());
        setup_orientation(app.clone());
        setup_resize(&canvas, app.clone());
        setup_keyboard(app.clone());

        request_animation_frame(app);

        log::info!("Key Drop running!");
        Ok(())
    }

    fn pointer_pos(event: &PointerEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer down
        {
            let app = app.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                // Keep receiving move/up for this pointer after it leaves the canvas
                if let Err(e) = target.set_pointer_capture(event.pointer_id()) {
                    log::warn!("Pointer capture failed: {:?}", e);
                }
                let pos = pointer_pos(&event);
                let input = InputEvent::PointerDown {
                    id: event.pointer_id() as u32,
                    x: pos.x,
                    y: pos.y,
                };
                let on_start_screen = !app.borrow().sandbox.is_running();
                if on_start_screen {
                    // The permission prompt must open inside the user gesture
                    apply_event(&mut app.borrow_mut().sandbox, &input);
                    handle_sandbox_events(&app);
                } else {
                    app.borrow_mut().pending.push(input);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let pos = pointer_pos(&event);
                app.borrow_mut().pending.push(InputEvent::PointerMove {
                    id: event.pointer_id() as u32,
                    x: pos.x,
                    y: pos.y,
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up / cancel both end the gesture
        for name in ["pointerup", "pointercancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut().pending.push(InputEvent::PointerUp {
                    id: event.pointer_id() as u32,
                });
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: the release may never arrive
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().pending.push(InputEvent::FocusLost);
                log::info!("Gesture cancelled (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_orientation(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            let sample =
                key_drop::platform::OrientationSample::from_beta_gamma(event.beta(), event.gamma());
            app.borrow_mut().pending.push(InputEvent::Orientation {
                x: sample.x,
                y: sample.y,
            });
        });
        let _ = window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut a = app.borrow_mut();
            if let Some(ref mut render_state) = a.render_state {
                render_state.scale = dpr as f32;
                render_state.resize(width, height);
            }
            a.pending.push(InputEvent::Resize {
                w: client_w as f32,
                h: client_h as f32,
            });
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if matches!(event.key().as_str(), "p" | "P") {
                let mut a = app.borrow_mut();
                let settings = &mut a.sandbox.settings;
                settings.preview_mode = match settings.preview_mode {
                    PreviewMode::Stable => PreviewMode::Shimmer,
                    PreviewMode::Shimmer => PreviewMode::Stable,
                };
                settings.save();
                log::info!("Preview mode: {}", settings.preview_mode.as_str());
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            update_labels(&mut a);
        }
        handle_sandbox_events(&app);

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Key Drop failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: tap start, tilt the device, drop a few keys and report
/// where they settle.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use key_drop::consts::SIM_DT;
    use key_drop::{PreviewMode, Settings};
    use key_drop::physics::PhysicsWorld;
    use key_drop::renderer::RecordingCanvas;
    use key_drop::sim::{InputEvent, Sandbox, tick};

    env_logger::init();
    log::info!("Key Drop (native) starting...");
    log::info!("Native mode runs a scripted demo - serve the wasm build for the interactive sandbox");

    let mut settings = Settings::load();
    // Optional first argument overrides the preview mode ("stable"/"shimmer")
    if let Some(arg) = std::env::args().nth(1) {
        match PreviewMode::from_str(&arg) {
            Some(mode) => settings.preview_mode = mode,
            None => log::warn!("Unknown preview mode '{}'", arg),
        }
    }
    let seed = settings.seed.unwrap_or(2024);
    let mut sandbox = Sandbox::new(settings, seed, 800.0, 600.0, false);

    // Level device, tap start
    tick(
        &mut sandbox,
        &[
            InputEvent::Orientation { x: 0.0, y: 0.0 },
            InputEvent::PointerDown {
                id: 0,
                x: 400.0,
                y: 300.0,
            },
            InputEvent::PointerUp { id: 0 },
        ],
        SIM_DT,
    );

    let boxes = [
        ((80.0, 60.0), (300.0, 160.0)),
        ((420.0, 80.0), (700.0, 220.0)),
        ((200.0, 260.0), (380.0, 340.0)),
        ((500.0, 300.0), (510.0, 400.0)),
    ];
    for ((x0, y0), (x1, y1)) in boxes {
        tick(
            &mut sandbox,
            &[
                InputEvent::PointerDown { id: 0, x: x0, y: y0 },
                InputEvent::PointerMove { id: 0, x: x1, y: y1 },
                InputEvent::PointerUp { id: 0 },
            ],
            SIM_DT,
        );
    }

    // Tip the device toward the user: keys slide to the floor
    tick(&mut sandbox, &[InputEvent::Orientation { x: 45.0, y: 10.0 }], SIM_DT);
    for _ in 0..240 {
        tick(&mut sandbox, &[], SIM_DT);
    }

    for event in sandbox.drain_events() {
        log::debug!("{:?}", event);
    }
    println!(
        "{} keys after {} steps (gravity {:?})",
        sandbox.keys.len(),
        sandbox.time_ticks,
        sandbox.world.gravity()
    );
    let mut canvas = RecordingCanvas::new();
    sandbox.render(&mut canvas);
    println!(
        "final frame: {} draw ops, {} filled",
        canvas.ops().len(),
        canvas.fills().count()
    );

    for key in &sandbox.keys {
        if let Some(pose) = sandbox.world.body_pose(key.body) {
            println!(
                "key {} at ({:.1}, {:.1}) angle {:.2}: {}",
                key.id,
                pose.position.x,
                pose.position.y,
                pose.angle,
                serde_json::to_string(&key.params)?
            );
        }
    }
    Ok(())
}
