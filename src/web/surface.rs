//! `<canvas>` surfaces, page storage and the browser clock

use crate::capture::input::types::SyntheticEvent;
use crate::capture::traits::{Rect, Surface, SurfaceProvider, ViewportOffsets};
use crate::processing::normalize::SurfaceSize;
use crate::recorder::error::{DispatchError, RecorderError, RecorderResult};
use crate::recorder::store::KeyValueStore;
use crate::recorder::timer::Timer;
use async_trait::async_trait;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlCanvasElement, MouseEvent, MouseEventInit, Storage};

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// A numeric window property, or 0 when the browser withholds it
pub(crate) fn number(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// A canvas element in the page
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }

    fn bounding_rect(&self) -> Rect {
        let rect = self.canvas.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn viewport_offsets(&self) -> ViewportOffsets {
        let Some(window) = web_sys::window() else {
            return ViewportOffsets::default();
        };
        ViewportOffsets {
            scroll_x: window.scroll_x().unwrap_or(0.0),
            scroll_y: window.scroll_y().unwrap_or(0.0),
            screen_x: number(window.screen_x()),
            screen_y: number(window.screen_y()),
        }
    }

    fn dispatch(&self, event: &SyntheticEvent) -> Result<(), DispatchError> {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_client_x(event.client_x.round() as i32);
        init.set_client_y(event.client_y.round() as i32);
        init.set_screen_x(event.screen_x.round() as i32);
        init.set_screen_y(event.screen_y.round() as i32);
        init.set_button(0);

        let mouse = MouseEvent::new_with_mouse_event_init_dict(event.kind.dom_type(), &init)
            .map_err(|e| DispatchError(describe(&e)))?;
        self.canvas
            .dispatch_event(&mouse)
            .map_err(|e| DispatchError(describe(&e)))?;
        Ok(())
    }

    fn fallback_click(&self) -> Result<(), DispatchError> {
        if !self.is_attached() {
            let reason = "canvas is no longer in the document";
            return Err(DispatchError(reason.to_string()));
        }
        self.canvas.click();
        Ok(())
    }
}

/// Every `<canvas>` in a document, in document order
#[derive(Debug, Clone)]
pub struct DocumentCanvases {
    document: Document,
}

impl DocumentCanvases {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SurfaceProvider for DocumentCanvases {
    type Surface = CanvasSurface;

    fn candidates(&self) -> Vec<CanvasSurface> {
        let elements = self.document.get_elements_by_tag_name("canvas");
        (0..elements.length())
            .filter_map(|i| elements.item(i))
            .filter_map(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .map(CanvasSurface::new)
            .collect()
    }
}

/// `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn from_window() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> RecorderResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| RecorderError::Persistence(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> RecorderResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| RecorderError::Persistence(describe(&e)))
    }

    fn remove(&self, key: &str) -> RecorderResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| RecorderError::Persistence(describe(&e)))
    }
}

/// Browser timer: `gloo-timers` sleeps, wall-clock `now`
#[derive(Debug, Clone, Copy)]
pub struct BrowserTimer {
    origin_ms: f64,
}

impl BrowserTimer {
    pub fn new() -> Self {
        Self {
            origin_ms: js_sys::Date::now(),
        }
    }
}

impl Default for BrowserTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        let elapsed = (js_sys::Date::now() - self.origin_ms).max(0.0);
        Duration::from_secs_f64(elapsed / 1000.0)
    }
}
