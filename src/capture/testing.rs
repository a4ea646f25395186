//! In-memory surfaces for unit tests

use crate::capture::input::types::{EventKind, SyntheticEvent};
use crate::capture::traits::{Rect, Surface, SurfaceProvider};
use crate::processing::normalize::SurfaceSize;
use crate::recorder::error::DispatchError;
use crate::recorder::player::CancellationToken;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct FakeState {
    size: SurfaceSize,
    rect: Rect,
    events: Vec<SyntheticEvent>,
    fail_on: Option<EventKind>,
    fallback_fails: bool,
    fallback_clicks: usize,
    cancel_after: Option<(usize, CancellationToken)>,
    abort_after: Option<(usize, CancellationToken)>,
    detached: bool,
}

/// Surface that records dispatched events instead of touching a DOM
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    state: Rc<RefCell<FakeState>>,
}

impl FakeSurface {
    /// Surface at the viewport origin whose CSS box matches its intrinsic size
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_rect(width, height, Rect::new(0.0, 0.0, width, height))
    }

    pub fn with_rect(width: f64, height: f64, rect: Rect) -> Self {
        let surface = Self::default();
        {
            let mut state = surface.state.borrow_mut();
            state.size = SurfaceSize::new(width, height);
            state.rect = rect;
        }
        surface
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut state = self.state.borrow_mut();
        state.size = SurfaceSize::new(width, height);
        state.rect = Rect::new(state.rect.left, state.rect.top, width, height);
    }

    /// Simulate the element being removed from the page
    pub fn detach(&self) {
        self.state.borrow_mut().detached = true;
    }

    pub fn fail_on(&self, kind: EventKind) {
        self.state.borrow_mut().fail_on = Some(kind);
    }

    pub fn break_fallback(&self) {
        self.state.borrow_mut().fallback_fails = true;
    }

    /// Gracefully cancel `token` once `clicks` click events have fired
    pub fn cancel_after_clicks(&self, clicks: usize, token: CancellationToken) {
        self.state.borrow_mut().cancel_after = Some((clicks, token));
    }

    /// Abort `token` once `clicks` click events have fired
    pub fn abort_after_clicks(&self, clicks: usize, token: CancellationToken) {
        self.state.borrow_mut().abort_after = Some((clicks, token));
    }

    pub fn events(&self) -> Vec<SyntheticEvent> {
        self.state.borrow().events.clone()
    }

    /// Surface-relative positions of the dispatched click events
    pub fn clicks(&self) -> Vec<(f64, f64)> {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Click)
            .map(|e| (e.surface_x, e.surface_y))
            .collect()
    }

    pub fn fallback_clicks(&self) -> usize {
        self.state.borrow().fallback_clicks
    }
}

impl Surface for FakeSurface {
    fn size(&self) -> SurfaceSize {
        self.state.borrow().size
    }

    fn is_attached(&self) -> bool {
        !self.state.borrow().detached
    }

    fn bounding_rect(&self) -> Rect {
        self.state.borrow().rect
    }

    fn dispatch(&self, event: &SyntheticEvent) -> Result<(), DispatchError> {
        let mut state = self.state.borrow_mut();
        if state.fail_on == Some(event.kind) {
            return Err(DispatchError(format!("{} rejected", event.kind)));
        }
        state.events.push(*event);

        let clicks = state
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Click)
            .count();
        if let Some((after, token)) = &state.cancel_after {
            if clicks == *after {
                token.cancel();
            }
        }
        if let Some((after, token)) = &state.abort_after {
            if clicks == *after {
                token.abort();
            }
        }
        Ok(())
    }

    fn fallback_click(&self) -> Result<(), DispatchError> {
        let mut state = self.state.borrow_mut();
        if state.fallback_fails {
            return Err(DispatchError("element detached".to_string()));
        }
        state.fallback_clicks += 1;
        Ok(())
    }
}

/// Provider returning a fixed list of candidates, optionally after a delay
#[derive(Default)]
pub struct FakeProvider {
    pub surfaces: RefCell<Vec<FakeSurface>>,
    pub misses_before_ready: RefCell<usize>,
    pub calls: RefCell<usize>,
}

impl FakeProvider {
    pub fn new(surfaces: Vec<FakeSurface>) -> Self {
        Self {
            surfaces: RefCell::new(surfaces),
            ..Default::default()
        }
    }

    /// Report no candidates for the first `misses` lookups
    pub fn ready_after(surfaces: Vec<FakeSurface>, misses: usize) -> Self {
        let provider = Self::new(surfaces);
        *provider.misses_before_ready.borrow_mut() = misses;
        provider
    }
}

impl SurfaceProvider for FakeProvider {
    type Surface = FakeSurface;

    fn candidates(&self) -> Vec<FakeSurface> {
        *self.calls.borrow_mut() += 1;
        let mut misses = self.misses_before_ready.borrow_mut();
        if *misses > 0 {
            *misses -= 1;
            return Vec::new();
        }
        self.surfaces.borrow().clone()
    }
}
