//! WASM bridge for CR: exposes the resize engine to the editor host.
//!
//! Compiled via `wasm-pack build --target web`. Every fallible call returns
//! a JSON string, `{"ok":true,...}` or `{"ok":false,"error":"..."}`, so the
//! host can surface errors without exceptions crossing the boundary.

use cr_core::{DrawableObject, ObjectId, ResizeConfig, Scene, Snapshot, Viewport};
use cr_editor::{EngineError, FeedbackEvent, FeedbackScheduler, RenderSurface, ResizeEngine};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type Callback = Rc<RefCell<Option<js_sys::Function>>>;

/// The WASM-facing canvas controller.
#[wasm_bindgen]
pub struct CrCanvas {
    engine: ResizeEngine,
    on_render: Callback,
    on_feedback: Callback,
}

#[wasm_bindgen]
impl CrCanvas {
    /// Create a controller over an empty surface of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<CrCanvas, JsValue> {
        console_error_panic_hook_setup();

        let on_render: Callback = Rc::default();
        let on_feedback: Callback = Rc::default();
        let engine = ResizeEngine::new(Scene::new(Viewport::new(width, height)))
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .with_surface(JsSurface {
                callback: Rc::clone(&on_render),
            })
            .with_feedback(TimeoutScheduler {
                callback: Rc::clone(&on_feedback),
            });

        Ok(Self {
            engine,
            on_render,
            on_feedback,
        })
    }

    /// Register (or clear, with `undefined`) the render callback.
    /// Called with the scene JSON whenever the layout settles.
    pub fn on_render(&mut self, callback: Option<js_sys::Function>) {
        *self.on_render.borrow_mut() = callback;
    }

    /// Register (or clear) the feedback subscriber. Events scheduled while
    /// no subscriber is registered are dropped when they fire.
    pub fn on_feedback(&mut self, callback: Option<js_sys::Function>) {
        *self.on_feedback.borrow_mut() = callback;
    }

    /// Replace the scene from JSON and reset history.
    pub fn load_scene_json(&mut self, json: &str) -> String {
        let scene: Scene = match serde_json::from_str(json) {
            Ok(s) => s,
            Err(e) => return error_json(&format!("invalid scene: {e}")),
        };
        status_json(self.engine.load_scene(scene))
    }

    pub fn scene_json(&self) -> String {
        serde_json::to_string(self.engine.scene()).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    /// Apply a partial `ResizeConfig` JSON object.
    pub fn set_config_json(&mut self, json: &str) -> String {
        let config: ResizeConfig = match serde_json::from_str(json) {
            Ok(c) => c,
            Err(e) => return error_json(&format!("invalid config: {e}")),
        };
        status_json(self.engine.set_config(config))
    }

    pub fn add_object_json(&mut self, json: &str) -> String {
        let object: DrawableObject = match serde_json::from_str(json) {
            Ok(o) => o,
            Err(e) => return error_json(&format!("invalid object: {e}")),
        };
        status_json(self.engine.add_object(object))
    }

    pub fn move_object(&mut self, id: &str, x: f32, y: f32) -> String {
        status_json(self.engine.move_object(ObjectId::intern(id), x, y))
    }

    pub fn remove_object(&mut self, id: &str) -> String {
        status_json(self.engine.remove_object(ObjectId::intern(id)).map(|_| ()))
    }

    /// Scene-space bounds of an object, or `{}` if not found.
    pub fn get_object_bounds(&self, id: &str) -> String {
        bounds_json(self.engine.scene(), id)
    }

    /// Binary snapshot of the live scene for the host to persist.
    pub fn save_snapshot(&self) -> Result<Vec<u8>, JsValue> {
        self.engine
            .save_snapshot()
            .map(|snapshot| snapshot.as_bytes().to_vec())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the scene from bytes produced by `save_snapshot` and reset history.
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> String {
        status_json(self.engine.load_snapshot(&Snapshot::from_bytes(bytes.to_vec())))
    }

    /// Resize the surface. Returns
    /// `{"ok":true,"strategy":..,"attempts":[..],"confidence":..,"reasoning":..,"overflow":{..}}`.
    pub fn resize_to(&mut self, width: f32, height: f32) -> String {
        match self.engine.resize_to(width, height) {
            Ok(outcome) => {
                let (confidence, reasoning) = outcome
                    .recommendation
                    .as_ref()
                    .map(|r| (r.confidence, r.reasoning.clone()))
                    .unzip();
                serde_json::json!({
                    "ok": true,
                    "strategy": outcome.strategy,
                    "attempts": outcome.attempts.as_slice(),
                    "confidence": confidence,
                    "reasoning": reasoning,
                    "overflow": outcome.report,
                })
                .to_string()
            }
            Err(e) => engine_error_json(&e),
        }
    }

    /// Returns `{"ok":true,"changed":bool}`; a corrupt snapshot is reported
    /// as an error and leaves the scene as it was.
    pub fn undo(&mut self) -> String {
        changed_json(self.engine.undo())
    }

    pub fn redo(&mut self) -> String {
        changed_json(self.engine.redo())
    }

    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.can_redo()
    }

    pub fn has_overflow(&self) -> bool {
        self.engine.has_overflow()
    }

    /// Returns `{"ok":true,"moved":n}`.
    pub fn recenter_overflow(&mut self) -> String {
        match self.engine.recenter_overflow() {
            Ok(moved) => format!(r#"{{"ok":true,"moved":{moved}}}"#),
            Err(e) => engine_error_json(&e),
        }
    }
}

// ─── Collaborators ───────────────────────────────────────────────────────

struct JsSurface {
    callback: Callback,
}

impl RenderSurface for JsSurface {
    fn render_all(&mut self, scene: &Scene) {
        let Some(cb) = self.callback.borrow().clone() else {
            return;
        };
        match serde_json::to_string(scene) {
            Ok(json) => {
                if let Err(e) = cb.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("render callback threw: {e:?}");
                }
            }
            Err(e) => log::error!("scene serialization failed: {e}"),
        }
    }
}

/// Fires feedback through `window.setTimeout`. The subscriber is looked up
/// when the timer fires, so an unmounted host simply drops the event.
struct TimeoutScheduler {
    callback: Callback,
}

impl FeedbackScheduler for TimeoutScheduler {
    fn schedule(&mut self, delay: Duration, event: FeedbackEvent) {
        let Some(window) = web_sys::window() else {
            log::debug!("feedback: no window, dropping {}", event.action_id);
            return;
        };
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                log::error!("feedback serialization failed: {e}");
                return;
            }
        };

        let callback = Rc::clone(&self.callback);
        let fire = Closure::once_into_js(move || {
            if let Some(cb) = callback.borrow().as_ref() {
                let _ = cb.call1(&JsValue::NULL, &JsValue::from_str(&json));
            }
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(fire.unchecked_ref(), millis)
        {
            log::warn!("feedback: setTimeout failed: {e:?}");
        }
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn bounds_json(scene: &Scene, id: &str) -> String {
    match scene.get(ObjectId::intern(id)) {
        Some(object) => {
            let b = object.bounds();
            serde_json::json!({ "x": b.x, "y": b.y, "width": b.width, "height": b.height })
                .to_string()
        }
        None => "{}".to_string(),
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

fn engine_error_json(e: &EngineError) -> String {
    error_json(&e.to_string())
}

fn status_json(result: Result<(), EngineError>) -> String {
    match result {
        Ok(()) => r#"{"ok":true}"#.to_string(),
        Err(e) => engine_error_json(&e),
    }
}

fn changed_json(result: Result<bool, EngineError>) -> String {
    match result {
        Ok(changed) => format!(r#"{{"ok":true,"changed":{changed}}}"#),
        Err(e) => engine_error_json(&e),
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("CR WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
