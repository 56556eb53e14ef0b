//! Browser host bindings
//!
//! Exposes `WebPicker` to JavaScript and runs the reveal animator from
//! `requestAnimationFrame`. The pending frame handle is kept so teardown can
//! cancel it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::Clock;
use crate::settings::PickerSettings;
use crate::sim::{Entry, EntryId, PickerEvent, PickerState, SpinPhase, tick};

/// `performance.now()` for frames, `Date.now()` for history stamps
pub struct WebClock {
    performance: Option<web_sys::Performance>,
}

impl WebClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Default for WebClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WebClock {
    fn monotonic_ms(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }

    fn wall_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

struct Host {
    state: PickerState,
    clock: WebClock,
    raf_handle: Option<i32>,
    torn_down: bool,
    on_complete: Option<js_sys::Function>,
    on_frame: Option<js_sys::Function>,
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Ticker Picker ready");
}

/// Picker handle for the page script
#[wasm_bindgen]
pub struct WebPicker {
    host: Rc<RefCell<Host>>,
}

#[wasm_bindgen]
impl WebPicker {
    /// Create a picker; `settings_json` may be omitted or partial
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> WebPicker {
        let settings = settings_json
            .as_deref()
            .map(PickerSettings::from_json_or_default)
            .unwrap_or_default();
        let state = PickerState::from_entropy().with_settings(settings);
        WebPicker {
            host: Rc::new(RefCell::new(Host {
                state,
                clock: WebClock::new(),
                raf_handle: None,
                torn_down: false,
                on_complete: None,
                on_frame: None,
            })),
        }
    }

    /// Called with a JSON array of winners once per settled spin
    pub fn set_on_complete(&self, callback: js_sys::Function) {
        self.host.borrow_mut().on_complete = Some(callback);
    }

    /// Called after every animation frame so the page can re-render
    pub fn set_on_frame(&self, callback: js_sys::Function) {
        self.host.borrow_mut().on_frame = Some(callback);
    }

    pub fn add(&self, label: &str) -> Option<String> {
        self.host
            .borrow_mut()
            .state
            .add(label)
            .map(|id| id.as_str().to_string())
    }

    pub fn add_many(&self, text: &str) -> usize {
        self.host.borrow_mut().state.add_many(text)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.host.borrow_mut().state.remove(&EntryId::new(id))
    }

    pub fn clear(&self) {
        self.host.borrow_mut().state.clear();
    }

    pub fn clear_history(&self) {
        self.host.borrow_mut().state.clear_history();
    }

    /// Non-numeric input (NaN) counts as 1
    pub fn set_winner_count(&self, count: f64) {
        self.host.borrow_mut().state.set_winner_count(count_from_js(count));
    }

    pub fn increment_winner_count(&self) {
        self.host.borrow_mut().state.increment_winner_count();
    }

    pub fn decrement_winner_count(&self) {
        self.host.borrow_mut().state.decrement_winner_count();
    }

    /// Start a spin with the configured winner count
    pub fn spin(&self) -> bool {
        let count = self.host.borrow().state.settings.winner_count;
        self.request_spin(f64::from(count))
    }

    pub fn request_spin(&self, count: f64) -> bool {
        let started = {
            let mut host = self.host.borrow_mut();
            !host.torn_down && host.state.request_spin(count_from_js(count))
        };
        if started && self.host.borrow().raf_handle.is_none() {
            schedule_frame(&self.host);
        }
        started
    }

    pub fn dismiss(&self) {
        self.host.borrow_mut().state.dismiss();
    }

    pub fn remove_from_pool(&self) -> usize {
        self.host.borrow_mut().state.remove_from_pool()
    }

    /// Cancel the pending frame and abandon any running spin
    pub fn teardown(&self) {
        teardown(&self.host);
    }

    pub fn phase(&self) -> String {
        match self.host.borrow().state.phase() {
            SpinPhase::Idle => "idle",
            SpinPhase::Running => "running",
            SpinPhase::Settled => "settled",
        }
        .to_string()
    }

    pub fn display_label(&self) -> String {
        self.host.borrow().state.display().label.clone()
    }

    pub fn display_color(&self) -> String {
        self.host.borrow().state.display().color.clone()
    }

    pub fn scale(&self) -> f32 {
        self.host.borrow().state.scale()
    }

    pub fn title(&self) -> String {
        self.host.borrow().state.settings.title.clone()
    }

    pub fn set_title(&self, title: String) {
        self.host.borrow_mut().state.settings.title = title;
    }

    pub fn winner_count(&self) -> u32 {
        self.host.borrow().state.settings.winner_count
    }

    pub fn max_winners(&self) -> usize {
        self.host.borrow().state.max_winners()
    }

    pub fn pool_size(&self) -> usize {
        self.host.borrow().state.pool().len()
    }

    pub fn spin_button_label(&self) -> String {
        self.host.borrow().state.spin_button_label()
    }

    /// Preview of the pool (at most `preview_limit` entries) as JSON
    pub fn pool_json(&self) -> Result<String, JsValue> {
        let host = self.host.borrow();
        host.state
            .pool()
            .preview_json(host.state.settings.preview_limit)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn winners_json(&self) -> Result<String, JsValue> {
        entries_json(self.host.borrow().state.winners())
    }

    pub fn history_json(&self) -> Result<String, JsValue> {
        self.host
            .borrow()
            .state
            .history()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Drop for WebPicker {
    fn drop(&mut self) {
        teardown(&self.host);
    }
}

fn count_from_js(count: f64) -> i64 {
    if count.is_finite() { count.trunc() as i64 } else { 1 }
}

fn entries_json(entries: &[Entry]) -> Result<String, JsValue> {
    serde_json::to_string(entries).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn teardown(host: &Rc<RefCell<Host>>) {
    let mut host = host.borrow_mut();
    if host.torn_down {
        return;
    }
    if let Some(handle) = host.raf_handle.take()
        && let Some(window) = web_sys::window()
    {
        let _ = window.cancel_animation_frame(handle);
    }
    host.state.teardown();
    host.torn_down = true;
    log::info!("Picker torn down");
}

fn schedule_frame(host: &Rc<RefCell<Host>>) {
    let Some(window) = web_sys::window() else {
        log::warn!("No window, cannot animate");
        return;
    };
    let weak = Rc::downgrade(host);
    let closure = Closure::once(move |_time: f64| run_frame(weak));
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => host.borrow_mut().raf_handle = Some(handle),
        Err(err) => log::warn!("requestAnimationFrame failed: {err:?}"),
    }
    closure.forget();
}

fn run_frame(host: Weak<RefCell<Host>>) {
    // Picker already dropped
    let Some(host) = host.upgrade() else {
        return;
    };

    let (events, wants_frame, on_complete, on_frame) = {
        let mut guard = host.borrow_mut();
        guard.raf_handle = None;
        if guard.torn_down {
            return;
        }
        let frame = guard.clock.frame();
        tick(&mut guard.state, &frame);
        (
            guard.state.drain_events(),
            guard.state.wants_frame(),
            guard.on_complete.clone(),
            guard.on_frame.clone(),
        )
    };

    // Callbacks run outside the borrow so they can call back into the picker
    for event in events {
        if let PickerEvent::SpinComplete { winners, .. } = event
            && let Some(callback) = &on_complete
        {
            match entries_json(&winners) {
                Ok(json) => {
                    let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
                }
                Err(err) => log::warn!("Could not encode winners: {err:?}"),
            }
        }
    }
    if let Some(callback) = on_frame {
        let _ = callback.call0(&JsValue::NULL);
    }

    let keep_going = {
        let guard = host.borrow();
        wants_frame && !guard.torn_down && guard.raf_handle.is_none()
    };
    if keep_going {
        schedule_frame(&host);
    }
}
