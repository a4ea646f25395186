//! Marker overlay and click indicators

use super::{html_element, js_error};
use crate::processing::markers::{Indicator, IndicatorKind, Marker};
use crate::recorder::timer::Timer;
use crate::web::surface::BrowserTimer;
use anyhow::Result;
use web_sys::{Document, Element, HtmlElement};

pub const OVERLAY_ID: &str = "click-marker-overlay";
const MARKER_CLASS: &str = "click-marker";
const MARKER_SIZE: f64 = 24.0;

pub struct Overlay {
    document: Document,
    root: HtmlElement,
}

impl Overlay {
    pub fn mount(document: &Document) -> Result<Self> {
        let root = html_element(document, "div")?;
        root.set_id(OVERLAY_ID);
        root.style().set_css_text(
            "position:fixed;left:0;top:0;width:100%;height:100%;\
             pointer-events:none;z-index:999998;",
        );

        let body = document
            .body()
            .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
        body.append_child(&root).map_err(js_error)?;

        Ok(Self {
            document: document.clone(),
            root,
        })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    /// Replace the markers with `markers`
    pub fn render(&self, markers: &[Marker]) -> Result<()> {
        self.root.set_inner_html("");

        for marker in markers {
            let el = html_element(&self.document, "div")?;
            el.set_class_name(MARKER_CLASS);
            el.set_attribute("data-index", &marker.index.to_string())
                .map_err(js_error)?;
            el.set_text_content(Some(&marker.label));

            let (background, pointer, cursor) = if marker.editable {
                ("rgba(255,0,0,0.7)", "auto", "pointer")
            } else {
                ("rgba(0,188,212,0.7)", "none", "default")
            };
            el.style().set_css_text(&format!(
                "position:fixed;left:{}px;top:{}px;width:{size}px;height:{size}px;\
                 line-height:{size}px;border-radius:50%;border:2px solid #fff;\
                 background:{};color:#fff;font:bold 11px sans-serif;text-align:center;\
                 pointer-events:{};cursor:{};box-sizing:border-box;",
                marker.client_x - MARKER_SIZE / 2.0,
                marker.client_y - MARKER_SIZE / 2.0,
                background,
                pointer,
                cursor,
                size = MARKER_SIZE,
            ));
            if marker.editable {
                el.set_title(&format!("Delete click #{}", marker.label));
            }

            self.root.append_child(&el).map_err(js_error)?;
        }

        Ok(())
    }

    /// Show a short-lived ring where a click landed
    pub fn flash(&self, indicator: &Indicator, timer: BrowserTimer) -> Result<()> {
        let el = html_element(&self.document, "div")?;
        let (border, fill) = match indicator.kind {
            IndicatorKind::Accepted => ("3px solid red", "transparent"),
            IndicatorKind::Rejected => ("2px solid gray", "rgba(128,128,128,0.3)"),
        };
        let (left, top) = indicator.origin();
        el.style().set_css_text(&format!(
            "position:fixed;left:{}px;top:{}px;width:{d}px;height:{d}px;border-radius:50%;\
             border:{};background:{};pointer-events:none;z-index:999999;box-sizing:border-box;",
            left,
            top,
            border,
            fill,
            d = indicator.diameter,
        ));
        let body = self
            .document
            .body()
            .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
        body.append_child(&el).map_err(js_error)?;

        let ttl = indicator.ttl;
        wasm_bindgen_futures::spawn_local(async move {
            timer.sleep(ttl).await;
            el.remove();
        });
        Ok(())
    }
}

/// Index of the editable marker an event landed on
pub fn marker_index(target: &Element) -> Option<usize> {
    let marker = target.closest(&format!(".{}", MARKER_CLASS)).ok()??;
    marker.get_attribute("data-index")?.parse().ok()
}
