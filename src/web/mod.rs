//! Browser entry point
//!
//! Mounts the control panel and marker overlay into the game page, locates
//! the game canvas and routes DOM events into the session.

pub mod console;
pub mod overlay;
pub mod panel;
pub mod surface;

use crate::capture::input::types::PointerClick;
use crate::capture::locator::{wait_for_surface, RetryPolicy};
use crate::commands::{self, Command, CommandEffect, PanelState, PanelView};
use crate::recorder::player::Playback;
use crate::recorder::session::{ClickOutcome, Session};
use crate::recorder::state::{should_activate, RecorderConfig, CONFIG_STORAGE_KEY};
use crate::recorder::store::{KeyValueStore, MemoryStore};
use crate::recorder::timer::Timer;
use overlay::Overlay;
use panel::PanelDom;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use surface::{number, BrowserTimer, CanvasSurface, DocumentCanvases, LocalStorageStore};
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, MouseEvent};

type BrowserSession = Session<CanvasSurface, Box<dyn KeyValueStore>>;

pub(crate) fn js_error(value: JsValue) -> anyhow::Error {
    let message = value.as_string().unwrap_or_else(|| format!("{:?}", value));
    anyhow::anyhow!(message)
}

pub(crate) fn html_element(document: &Document, tag: &str) -> anyhow::Result<HtmlElement> {
    document
        .create_element(tag)
        .map_err(js_error)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| anyhow::anyhow!("<{}> is not an HTML element", tag))
}

/// Attach `handler` for the page lifetime
fn listen<E, F>(target: &EventTarget, kind: &str, capture: bool, handler: F) -> anyhow::Result<()>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target
        .add_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), capture)
        .map_err(js_error)?;
    closure.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn viewport() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (0.0, 0.0);
    };
    (number(window.inner_width()), number(window.inner_height()))
}

struct App {
    document: Document,
    session: RefCell<BrowserSession>,
    panel_state: RefCell<PanelState>,
    panel: PanelDom,
    overlay: Overlay,
    timer: BrowserTimer,
    locating: Cell<bool>,
}

impl App {
    fn mount(document: Document) -> anyhow::Result<Rc<Self>> {
        let backend: Box<dyn KeyValueStore> = match LocalStorageStore::from_window() {
            Some(storage) => Box::new(storage),
            None => {
                tracing::warn!("localStorage unavailable, recordings stay in memory");
                Box::new(MemoryStore::new())
            }
        };

        let raw_config = backend.get(CONFIG_STORAGE_KEY).ok().flatten();
        let config = RecorderConfig::from_json_or_default(raw_config.as_deref());
        tracing::debug!("Config: {:?}", config);

        let mut session = Session::new(backend, config);
        session.load();

        let app = Rc::new(Self {
            panel: PanelDom::mount(&document)?,
            overlay: Overlay::mount(&document)?,
            document,
            session: RefCell::new(session),
            panel_state: RefCell::new(PanelState::default()),
            timer: BrowserTimer::new(),
            locating: Cell::new(false),
        });

        app.bind_panel()?;
        app.bind_overlay()?;
        app.bind_viewport()?;
        app.render();
        app.locate_surface();

        tracing::info!("Click recorder ready");
        Ok(app)
    }

    fn bind_panel(self: &Rc<Self>) -> anyhow::Result<()> {
        for target in [self.panel.root(), self.panel.show_button()] {
            let app = Rc::clone(self);
            listen(target, "click", false, move |event: MouseEvent| {
                let Some(id) = event_element(&event).and_then(|el| panel::button_id(&el)) else {
                    return;
                };
                if let Some(command) = Command::from_button_id(&id) {
                    event.stop_propagation();
                    app.dispatch(command);
                }
            })?;
        }

        let header = self
            .document
            .get_element_by_id(panel::HEADER_ID)
            .ok_or_else(|| anyhow::anyhow!("panel header missing"))?;

        let app = Rc::clone(self);
        listen(&header, "mousedown", false, move |event: MouseEvent| {
            let on_button = event_element(&event)
                .and_then(|el| el.closest("button").ok().flatten())
                .is_some();
            let pointer = (event.client_x() as f64, event.client_y() as f64);
            app.panel_state
                .borrow_mut()
                .drag
                .start(pointer, app.panel.origin(), on_button);
        })?;

        let app = Rc::clone(self);
        listen(&self.document, "mousemove", false, move |event: MouseEvent| {
            let pointer = (event.client_x() as f64, event.client_y() as f64);
            let next = app
                .panel_state
                .borrow()
                .drag
                .move_to(pointer, app.panel.size(), viewport());
            if let Some((x, y)) = next {
                if let Err(e) = app.panel.move_to(x, y) {
                    tracing::warn!("Failed to move panel: {}", e);
                }
            }
        })?;

        let app = Rc::clone(self);
        listen(&self.document, "mouseup", false, move |_: MouseEvent| {
            app.panel_state.borrow_mut().drag.end();
        })
    }

    fn bind_overlay(self: &Rc<Self>) -> anyhow::Result<()> {
        let app = Rc::clone(self);
        listen(self.overlay.root(), "click", false, move |event: MouseEvent| {
            let target = event_element(&event);
            let Some(index) = target.and_then(|el| overlay::marker_index(&el)) else {
                return;
            };
            event.stop_propagation();
            event.prevent_default();
            app.dispatch(Command::DeletePoint(index));
        })
    }

    fn bind_viewport(self: &Rc<Self>) -> anyhow::Result<()> {
        let window = web_sys::window()
            .ok_or_else(|| anyhow::anyhow!("no window"))?;
        for kind in ["resize", "scroll"] {
            let app = Rc::clone(self);
            listen(&window, kind, false, move |_: Event| app.render_overlay())?;
        }
        Ok(())
    }

    /// Record clicks on the canvas before the game sees them
    fn bind_canvas(self: &Rc<Self>, surface: &CanvasSurface) -> anyhow::Result<()> {
        let app = Rc::clone(self);
        listen(surface.element(), "click", true, move |event: MouseEvent| {
            let click = PointerClick::new(event.client_x() as f64, event.client_y() as f64);
            let outcome = app.session.borrow_mut().handle_click(click);
            match outcome {
                Ok(ClickOutcome::Ignored) => return,
                Ok(_) => {}
                Err(e) => tracing::debug!("Click not recorded: {}", e),
            }
            app.render();
        })
    }

    fn locate_surface(self: &Rc<Self>) {
        if self.locating.replace(true) {
            return;
        }

        let app = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let provider = DocumentCanvases::new(app.document.clone());
            let policy = RetryPolicy::fixed(app.session.borrow().config().locate_interval());

            match wait_for_surface(&provider, &app.timer, policy).await {
                Ok(surface) => {
                    if let Err(e) = app.bind_canvas(&surface) {
                        tracing::error!("Failed to listen on canvas: {}", e);
                    }
                    app.session.borrow_mut().attach_surface(surface);
                }
                Err(e) => tracing::error!("Canvas lookup gave up: {}", e),
            }
            app.locating.set(false);
            app.render();
        });
    }

    /// Drop a canvas that has left the document and look for its replacement
    fn refresh_surface(self: &Rc<Self>) {
        let released = self.session.borrow_mut().release_detached_surface();
        if released.is_some() {
            self.locate_surface();
        }
    }

    fn dispatch(self: &Rc<Self>, command: Command) {
        self.refresh_surface();

        let now = self.timer.now();
        let result = {
            let mut session = self.session.borrow_mut();
            let mut panel = self.panel_state.borrow_mut();
            commands::execute(&mut *session, &mut *panel, command, now)
        };

        match result {
            Ok(CommandEffect::Render) => {}
            Ok(CommandEffect::Play(playback)) => self.spawn_playback(playback),
            Ok(CommandEffect::ArmClearTimeout(window)) => self.spawn_clear_timeout(window),
            Err(e) => tracing::debug!("{:?} refused: {}", command, e),
        }

        self.render();
    }

    fn spawn_playback(self: &Rc<Self>, playback: Playback<CanvasSurface>) {
        let app = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let result = playback
                .run(&app.timer, &mut |progress| {
                    app.session.borrow_mut().report_progress(progress);
                    app.render_panel();
                })
                .await;
            app.session.borrow_mut().finish_playback(&result);
            app.render();
        });
    }

    fn spawn_clear_timeout(self: &Rc<Self>, window: Duration) {
        let app = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            app.timer.sleep(window).await;
            let now = app.timer.now();
            if app.session.borrow_mut().expire_clear(now) {
                app.render_panel();
            }
        });
    }

    fn render(&self) {
        self.render_panel();
        self.render_overlay();
    }

    fn render_panel(&self) {
        let view = PanelView::build(&*self.session.borrow(), &*self.panel_state.borrow());
        if let Err(e) = self.panel.render(&view) {
            tracing::warn!("Failed to render panel: {}", e);
        }
    }

    fn render_overlay(&self) {
        let (markers, indicators) = {
            let mut session = self.session.borrow_mut();
            (session.markers(), session.take_indicators())
        };

        if let Err(e) = self.overlay.render(&markers) {
            tracing::warn!("Failed to render markers: {}", e);
        }
        for indicator in &indicators {
            if let Err(e) = self.overlay.flash(indicator, self.timer) {
                tracing::warn!("Failed to show indicator: {}", e);
            }
        }
    }
}

fn launch(document: Document) {
    match App::mount(document) {
        // Listeners hold their own references for the page lifetime
        Ok(_) => {}
        Err(e) => tracing::error!("Click recorder failed to start: {:#}", e),
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let href = window.location().href().unwrap_or_default();
    if !should_activate(&href) {
        return;
    }

    console::init();
    tracing::info!("Canvas Click Recorder v{}", env!("CARGO_PKG_VERSION"));

    let Some(document) = window.document() else {
        tracing::error!("No document to attach to");
        return;
    };

    if document.ready_state() == "loading" {
        let target = document.clone();
        let mut pending = Some(document);
        let result = listen(&target, "DOMContentLoaded", false, move |_: Event| {
            if let Some(document) = pending.take() {
                launch(document);
            }
        });
        if let Err(e) = result {
            tracing::error!("Failed to wait for the document: {}", e);
        }
    } else {
        launch(document);
    }
}
