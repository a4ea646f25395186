//! Control panel view model
//!
//! Which buttons the floating panel shows, what its labels say, and where it
//! may be dragged. The DOM layer renders this and nothing else.

use crate::capture::traits::Surface;
use crate::processing::markers::MarkerMode;
use crate::recorder::session::Session;
use crate::recorder::state::Mode;
use crate::recorder::store::KeyValueStore;
use serde::Serialize;

/// Presentation-only panel state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub hidden: bool,
    pub list_expanded: bool,
    pub drag: DragState,
}

/// Snapshot of everything the panel displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub hidden: bool,
    pub click_count: usize,
    pub saved: bool,
    pub status: String,
    pub show_record_buttons: bool,
    pub show_stop_record: bool,
    pub show_play_buttons: bool,
    pub show_stop_play: bool,
    pub markers_label: &'static str,
    pub markers_active: bool,
    pub edit_label: &'static str,
    pub edit_active: bool,
    pub list_expanded: bool,
    /// One line per recorded point, for the expandable list
    pub point_lines: Vec<String>,
    pub min_distance: f64,
}

impl PanelView {
    pub fn build<S, K>(session: &Session<S, K>, panel: &PanelState) -> Self
    where
        S: Surface,
        K: KeyValueStore,
    {
        let mode = session.mode();
        let markers = session.marker_mode();
        let replaying = mode.is_replaying();
        let (markers_label, edit_label) = match markers {
            MarkerMode::Hidden => ("Show", "Edit"),
            MarkerMode::ReadOnly => ("Hide", "Edit"),
            MarkerMode::Editable => ("Show", "Exit"),
        };

        Self {
            hidden: panel.hidden,
            click_count: session.sequence().len(),
            saved: session.is_saved(),
            status: session.status().to_string(),
            show_record_buttons: !mode.is_recording(),
            show_stop_record: mode.is_recording(),
            show_play_buttons: !replaying,
            show_stop_play: matches!(mode, Mode::Replaying { looping: true, .. }),
            markers_label,
            markers_active: markers == MarkerMode::ReadOnly,
            edit_label,
            edit_active: markers == MarkerMode::Editable,
            list_expanded: panel.list_expanded,
            point_lines: session
                .sequence()
                .iter()
                .enumerate()
                .map(|(i, p)| format!("#{}: ({:.1}%, {:.1}%)", i + 1, p.x, p.y))
                .collect(),
            min_distance: session.config().min_distance,
        }
    }
}

/// Keep a panel of `panel_size` fully inside a viewport of `viewport`
pub fn clamp_panel_position(
    x: f64,
    y: f64,
    panel_size: (f64, f64),
    viewport: (f64, f64),
) -> (f64, f64) {
    let max_x = (viewport.0 - panel_size.0).max(0.0);
    let max_y = (viewport.1 - panel_size.1).max(0.0);
    (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
}

/// Header drag tracking
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    grab_offset: Option<(f64, f64)>,
}

impl DragState {
    /// Begin a drag; presses on header buttons do not start one
    pub fn start(&mut self, pointer: (f64, f64), panel_origin: (f64, f64), on_button: bool) {
        if on_button {
            return;
        }
        self.grab_offset = Some((pointer.0 - panel_origin.0, pointer.1 - panel_origin.1));
    }

    pub fn is_dragging(&self) -> bool {
        self.grab_offset.is_some()
    }

    /// New clamped panel origin, or `None` when not dragging
    pub fn move_to(
        &self,
        pointer: (f64, f64),
        panel_size: (f64, f64),
        viewport: (f64, f64),
    ) -> Option<(f64, f64)> {
        let (dx, dy) = self.grab_offset?;
        Some(clamp_panel_position(
            pointer.0 - dx,
            pointer.1 - dy,
            panel_size,
            viewport,
        ))
    }

    pub fn end(&mut self) {
        self.grab_offset = None;
    }
}
