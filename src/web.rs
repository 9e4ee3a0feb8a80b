//! Browser bindings
//!
//! A thin wasm-bindgen wrapper over `Session`. The page owns the canvas,
//! the asset loading and the requestAnimationFrame loop; it forwards DOM
//! input here and renders the JSON snapshot each frame returns.

use wasm_bindgen::prelude::*;

use crate::session::{Key, Session};
use crate::sim::{Scenario, StoryTimeline, World};
use crate::tuning::Tuning;

/// Install the panic hook and the console logger. Safe to call twice.
#[wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Scroll Quest core ready");
    }
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session,
}

#[wasm_bindgen]
impl WebSession {
    /// The built-in journey, seeded from the clock
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSession {
        let seed = js_sys::Date::now() as u64;
        WebSession {
            session: Session::new(Scenario::nepal(), seed),
        }
    }

    /// A custom world/story/tuning triple. Empty strings select the built-ins.
    pub fn with_config(world: &str, story: &str, tuning: &str) -> Result<WebSession, JsError> {
        let world = if world.is_empty() {
            World::nepal()
        } else {
            World::from_json(world)?
        };
        let story = if story.is_empty() {
            StoryTimeline::nepal()
        } else {
            StoryTimeline::from_json(story)?
        };
        let tuning = if tuning.is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning)?
        };
        let scenario = Scenario::new(world, story, tuning)?;
        Ok(WebSession {
            session: Session::new(scenario, js_sys::Date::now() as u64),
        })
    }

    pub fn start(&mut self) {
        self.session.start();
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    /// `KeyboardEvent.code`
    pub fn key_down(&mut self, code: &str) {
        self.session.key_down(Key::from_code(code));
    }

    pub fn key_up(&mut self, code: &str) {
        self.session.key_up(Key::from_code(code));
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.session.wheel(delta_y);
    }

    pub fn touch_start(&mut self, y: f32) {
        self.session.touch_start(y);
    }

    pub fn touch_move(&mut self, y: f32) {
        self.session.touch_move(y);
    }

    pub fn touch_end(&mut self) {
        self.session.touch_end();
    }

    /// Advance by `dt` seconds and return the frame snapshot as JSON
    pub fn frame(&mut self, dt: f32) -> Result<String, JsError> {
        let snapshot = self.session.frame(dt);
        Ok(serde_json::to_string(&snapshot)?)
    }
}

impl Default for WebSession {
    fn default() -> Self {
        Self::new()
    }
}
