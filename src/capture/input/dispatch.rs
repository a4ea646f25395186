use crate::capture::input::types::{EventKind, SyntheticEvent};
use crate::capture::traits::Surface;
use crate::recorder::error::DispatchError;
use crate::recorder::timer::Timer;
use std::time::Duration;

/// How a synthesized click reached the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDelivery {
    /// Full pointer-down / pointer-up / click sequence
    Synthesized,
    /// Event synthesis failed, the simplified click went through
    Fallback,
}

/// Build one event at an intrinsic-pixel offset from the surface origin
pub fn synthesize<S: Surface>(surface: &S, kind: EventKind, x: f64, y: f64) -> SyntheticEvent {
    let rect = surface.bounding_rect();
    let offsets = surface.viewport_offsets();
    let client_x = rect.left + x;
    let client_y = rect.top + y;

    SyntheticEvent {
        kind,
        client_x,
        client_y,
        page_x: client_x + offsets.scroll_x,
        page_y: client_y + offsets.scroll_y,
        screen_x: client_x + offsets.screen_x,
        screen_y: client_y + offsets.screen_y,
        surface_x: x,
        surface_y: y,
    }
}

/// Dispatch pointer-down, pointer-up and click at `(x, y)`
///
/// Events are spaced by `intra_event_delay`. If any dispatch fails, one
/// simplified click is attempted before the error is returned.
pub async fn click_at<S, T>(
    surface: &S,
    timer: &T,
    x: f64,
    y: f64,
    intra_event_delay: Duration,
) -> Result<ClickDelivery, DispatchError>
where
    S: Surface,
    T: Timer + ?Sized,
{
    let sequence = [
        EventKind::PointerDown,
        EventKind::PointerUp,
        EventKind::Click,
    ];

    for (i, kind) in sequence.iter().enumerate() {
        let event = synthesize(surface, *kind, x, y);
        if let Err(err) = surface.dispatch(&event) {
            tracing::warn!(
                "Dispatching {} failed: {}, trying a plain click",
                kind,
                err
            );
            return surface.fallback_click().map(|_| ClickDelivery::Fallback);
        }
        if i + 1 < sequence.len() {
            timer.sleep(intra_event_delay).await;
        }
    }

    tracing::debug!("Click dispatched at ({:.0}, {:.0})", x, y);
    Ok(ClickDelivery::Synthesized)
}
