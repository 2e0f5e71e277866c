// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod audio;
pub mod config;
pub mod confetti;
pub mod entries;
pub mod error;
pub mod render;
pub mod session;
pub mod spin;
pub mod store;
pub mod ui;

// External crate imports
use pixels::{Pixels, SurfaceTexture};
use tracing::{info, warn};

// Standard library imports
use std::sync::Arc;
use std::time::{Duration, Instant};

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::WindowBuilder;

pub use config::{Color, PickerConfig, SpinTuning};
pub use entries::Segment;
pub use error::{PickerError, StoreError};
pub use session::{Session, SessionEvent};
pub use spin::{PickCount, SessionState};
pub use store::{EntryStore, FileStore, MemoryStore};

use audio::AudioCues;
use confetti::Confetti;
use render::{load_font, Canvas};
use ui::{build_scene, dispatch, hit_test, key_action, KeyInput, Layout};

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// The picker window. Owns its configuration; everything else lives for
/// the duration of [`Picker::show`].
#[derive(Debug, Clone)]
pub struct Picker {
    config: PickerConfig,
}

impl Picker {
    pub fn new(config: PickerConfig) -> Self {
        Self { config }
    }

    /// Open the window and block until it is closed.
    pub fn show(&mut self) -> Result<(), PickerError> {
        let store = self.open_store();
        let mut session = Session::new(
            store,
            self.config.palette.clone(),
            &self.config.default_roster,
            self.config.spin,
        );
        if self.config.pick_two {
            session.set_pick_count(PickCount::Two);
        }
        let audio = AudioCues::new(self.config.mute);
        self.run_window(session, audio)
    }

    fn open_store(&self) -> Box<dyn EntryStore> {
        let store = match &self.config.storage_path {
            Some(path) => Ok(FileStore::new(path)),
            None => FileStore::at_default_location(),
        };
        match store {
            Ok(store) => {
                info!(path = %store.path().display(), "roster store");
                Box::new(store)
            }
            Err(err) => {
                warn!(%err, "persistent store unavailable, roster will not be saved");
                Box::new(MemoryStore::default())
            }
        }
    }

    fn run_window(
        &self,
        mut session: Session<Box<dyn EntryStore>>,
        audio: AudioCues,
    ) -> Result<(), PickerError> {
        let config = &self.config;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = Arc::new(window);
        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let font = match load_font(config.font_path.as_deref()) {
            Ok(font) => Some(font),
            Err(err) => {
                warn!(%err, "labels disabled");
                None
            }
        };
        let mut confetti = Confetti::new();
        let mut rng = rand::rng();
        let mut layout = Layout::new(fb_width, fb_height, config);
        let mut cursor = (0.0, 0.0);
        let mut modifiers = ModifiersState::empty();

        let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate.max(1.0));
        let mut last_frame = Instant::now();

        info!(
            width = fb_width,
            height = fb_height,
            entries = session.segments().len(),
            muted = audio.is_muted(),
            "picker window open"
        );

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                        layout = Layout::new(fb_width, fb_height, config);
                    }
                    WindowEvent::ModifiersChanged(new_modifiers) => {
                        modifiers = new_modifiers.state();
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = (position.x, position.y);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        if let Some(action) = hit_test(&layout, session.state(), cursor.0, cursor.1)
                        {
                            dispatch(&mut session, &action, &mut rng);
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed {
                            return;
                        }
                        let command = modifiers.control_key() || modifiers.super_key();
                        let action = key_input(&event).and_then(|key| {
                            key_action(session.state(), &key, command, event.repeat)
                        });
                        if let Some(action) = action {
                            dispatch(&mut session, &action, &mut rng);
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        match session.advance(&mut rng) {
                            Some(SessionEvent::Tick) => audio.play_tick(),
                            Some(SessionEvent::Landed(_)) => {
                                audio.play_win();
                                confetti.burst(config.confetti_count, fb_width, fb_height, &mut rng);
                            }
                            None => {}
                        }
                        if session.state() != SessionState::Celebrating && confetti.is_active() {
                            confetti.clear();
                        }
                        confetti.update(&mut rng);

                        let scene = build_scene(&layout, &session, &confetti, config);
                        let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                        scene.render(&mut canvas, font.as_ref());
                        if let Err(err) = pixels.render() {
                            warn!(%err, "failed to present frame");
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        info!("picker window closed");
        Ok(())
    }
}

// ============================================================================
// INPUT TRANSLATION
// ============================================================================

fn key_input(event: &KeyEvent) -> Option<KeyInput> {
    match &event.logical_key {
        Key::Named(NamedKey::Enter) => Some(KeyInput::Enter),
        Key::Named(NamedKey::Escape) => Some(KeyInput::Escape),
        Key::Named(NamedKey::Backspace) => Some(KeyInput::Backspace),
        _ => event.text.as_ref().map(|text| KeyInput::Text(text.to_string())),
    }
}
