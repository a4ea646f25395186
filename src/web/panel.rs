//! Floating control panel DOM

use super::{html_element, js_error};
use crate::commands::PanelView;
use anyhow::Result;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

pub const PANEL_ID: &str = "click-recorder-panel";
pub const HEADER_ID: &str = "click-recorder-header";

const PANEL_HTML: &str = r#"
<div id="click-recorder-header" style="cursor:move;display:flex;justify-content:space-between;align-items:center;margin-bottom:8px;user-select:none;">
  <strong>Click Recorder</strong>
  <button id="hide-btn" title="Hide panel">_</button>
</div>
<div id="click-count">Clicks: 0</div>
<div id="save-state" style="font-size:11px;"></div>
<div id="status-line" style="margin:6px 0;color:#ffc107;"></div>
<div id="record-buttons">
  <button id="start-record">New recording</button>
  <button id="append-record">Append</button>
</div>
<button id="stop-record" style="background:#dc3545;color:#fff;">Stop recording</button>
<div id="play-buttons" style="margin-top:6px;">
  <button id="play-once">Play once</button>
  <button id="play-loop">Loop</button>
</div>
<button id="stop-play" style="margin-top:6px;background:#dc3545;color:#fff;">Stop</button>
<div style="margin-top:6px;">
  <button id="show-markers">Show</button>
  <button id="edit-mode">Edit</button>
  <button id="clear-record">Clear</button>
</div>
<div style="margin-top:6px;">
  <button id="toggle-list">Points</button>
  <span id="min-distance" style="font-size:11px;"></span>
</div>
<div id="point-list" style="white-space:pre;font-size:11px;max-height:120px;overflow:auto;"></div>
"#;

pub struct PanelDom {
    root: HtmlElement,
    show_button: HtmlElement,
}

impl PanelDom {
    pub fn mount(document: &Document) -> Result<Self> {
        let body = document
            .body()
            .ok_or_else(|| anyhow::anyhow!("document has no body"))?;

        let root = html_element(document, "div")?;
        root.set_id(PANEL_ID);
        root.style().set_css_text(
            "position:fixed;top:10px;right:10px;z-index:999999;padding:10px;\
             background:rgba(0,0,0,0.85);color:#fff;font:12px sans-serif;\
             border-radius:8px;min-width:180px;",
        );
        root.set_inner_html(PANEL_HTML);
        body.append_child(&root).map_err(js_error)?;

        let show_button = html_element(document, "button")?;
        show_button.set_id("show-btn");
        show_button.set_text_content(Some("Recorder"));
        show_button.style().set_css_text(
            "position:fixed;top:10px;right:10px;z-index:999999;display:none;",
        );
        body.append_child(&show_button).map_err(js_error)?;

        Ok(Self { root, show_button })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn show_button(&self) -> &HtmlElement {
        &self.show_button
    }

    fn find(&self, id: &str) -> Result<HtmlElement> {
        self.root
            .query_selector(&format!("#{}", id))
            .map_err(js_error)?
            .ok_or_else(|| anyhow::anyhow!("panel element #{} missing", id))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| anyhow::anyhow!("#{} is not an HTML element", id))
    }

    fn set_visible(&self, id: &str, visible: bool) -> Result<()> {
        let display = if visible { "" } else { "none" };
        self.find(id)?
            .style()
            .set_property("display", display)
            .map_err(js_error)
    }

    fn set_text(&self, id: &str, text: &str) -> Result<()> {
        self.find(id)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let background = if active { "#007bff" } else { "" };
        self.find(id)?
            .style()
            .set_property("background", background)
            .map_err(js_error)
    }

    pub fn render(&self, view: &PanelView) -> Result<()> {
        let (panel_display, button_display) = if view.hidden {
            ("none", "")
        } else {
            ("", "none")
        };
        self.root
            .style()
            .set_property("display", panel_display)
            .map_err(js_error)?;
        self.show_button
            .style()
            .set_property("display", button_display)
            .map_err(js_error)?;

        let count = format!("Clicks: {}", view.click_count);
        self.set_text("click-count", &count)?;
        let saved = if view.saved { "Saved" } else { "Not saved" };
        self.set_text("save-state", saved)?;
        self.set_text("status-line", &view.status)?;

        let record_buttons = view.show_record_buttons;
        self.set_visible("record-buttons", record_buttons)?;
        self.set_visible("stop-record", view.show_stop_record)?;
        self.set_visible("play-buttons", view.show_play_buttons)?;
        self.set_visible("stop-play", view.show_stop_play)?;

        self.set_text("show-markers", view.markers_label)?;
        self.set_active("show-markers", view.markers_active)?;
        self.set_text("edit-mode", view.edit_label)?;
        self.set_active("edit-mode", view.edit_active)?;

        let min_distance = format!("min distance {}px", view.min_distance);
        self.set_text("min-distance", &min_distance)?;
        self.set_visible("point-list", view.list_expanded)?;
        self.set_text("point-list", &view.point_lines.join("\n"))?;

        Ok(())
    }

    /// Top-left corner of the panel in client coordinates
    pub fn origin(&self) -> (f64, f64) {
        let rect = self.root.get_bounding_client_rect();
        (rect.left(), rect.top())
    }

    pub fn size(&self) -> (f64, f64) {
        (
            self.root.offset_width() as f64,
            self.root.offset_height() as f64,
        )
    }

    pub fn move_to(&self, x: f64, y: f64) -> Result<()> {
        let style = self.root.style();
        style
            .set_property("left", &format!("{}px", x))
            .map_err(js_error)?;
        style
            .set_property("top", &format!("{}px", y))
            .map_err(js_error)?;
        style.set_property("right", "auto").map_err(js_error)
    }
}

/// Id of the panel button an event landed on
pub fn button_id(target: &Element) -> Option<String> {
    let button = target.closest("button").ok()??;
    let id = button.id();
    (!id.is_empty()).then_some(id)
}
