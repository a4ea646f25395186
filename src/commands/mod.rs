//! Operator command handlers
//!
//! Every button on the control panel maps to a [`Command`]. Synchronous
//! commands complete inside [`execute`]; replay commands hand back a
//! [`Playback`] for the caller to drive on its event loop.

pub mod panel;

pub use panel::{clamp_panel_position, DragState, PanelState, PanelView};

use crate::capture::traits::Surface;
use crate::recorder::error::RecorderResult;
use crate::recorder::player::Playback;
use crate::recorder::session::{ClearStep, Session};
use crate::recorder::store::KeyValueStore;
use std::time::Duration;

/// Commands exposed by the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartRecording,
    AppendRecording,
    StopRecording,
    PlayOnce,
    PlayLoop,
    StopPlayback,
    ToggleMarkers,
    ToggleEdit,
    DeletePoint(usize),
    Clear,
    ToggleList,
    HidePanel,
    ShowPanel,
}

impl Command {
    /// Map a panel button id to its command
    pub fn from_button_id(id: &str) -> Option<Self> {
        let command = match id {
            "start-record" => Command::StartRecording,
            "append-record" => Command::AppendRecording,
            "stop-record" => Command::StopRecording,
            "play-once" => Command::PlayOnce,
            "play-loop" => Command::PlayLoop,
            "stop-play" => Command::StopPlayback,
            "show-markers" => Command::ToggleMarkers,
            "edit-mode" => Command::ToggleEdit,
            "clear-record" => Command::Clear,
            "toggle-list" => Command::ToggleList,
            "hide-btn" => Command::HidePanel,
            "show-btn" => Command::ShowPanel,
            _ => return None,
        };
        Some(command)
    }
}

/// What the caller has to do after a command ran
#[derive(Debug)]
pub enum CommandEffect<S> {
    /// Re-render the panel and overlay
    Render,
    /// Drive this replay to completion, then call `Session::finish_playback`
    Play(Playback<S>),
    /// A clear was armed; call `Session::expire_clear` after this long
    ArmClearTimeout(Duration),
}

/// Run one command against the session
///
/// Failures have already been turned into a status line by the session, so
/// the error is only returned for logging.
pub fn execute<S, K>(
    session: &mut Session<S, K>,
    panel: &mut PanelState,
    command: Command,
    now: Duration,
) -> RecorderResult<CommandEffect<S>>
where
    S: Surface,
    K: KeyValueStore,
{
    tracing::debug!("Command: {:?}", command);

    match command {
        Command::StartRecording => session.start_recording(false)?,
        Command::AppendRecording => session.start_recording(true)?,
        Command::StopRecording => {
            session.stop_recording()?;
        }
        Command::PlayOnce => return session.begin_playback(false).map(CommandEffect::Play),
        Command::PlayLoop => return session.begin_playback(true).map(CommandEffect::Play),
        Command::StopPlayback => {
            session.stop_playback();
        }
        Command::ToggleMarkers => {
            session.toggle_markers();
        }
        Command::ToggleEdit => {
            session.toggle_edit()?;
        }
        Command::DeletePoint(index) => {
            session.delete_point(index)?;
        }
        Command::Clear => {
            if session.request_clear(now)? == ClearStep::Armed {
                return Ok(CommandEffect::ArmClearTimeout(
                    session.config().clear_confirm_window(),
                ));
            }
        }
        Command::ToggleList => panel.list_expanded = !panel.list_expanded,
        Command::HidePanel => panel.hidden = true,
        Command::ShowPanel => panel.hidden = false,
    }

    Ok(CommandEffect::Render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::PointerClick;
    use crate::capture::testing::FakeSurface;
    use crate::recorder::error::RecorderError;
    use crate::recorder::state::RecorderConfig;
    use crate::recorder::store::MemoryStore;
    use crate::recorder::timer::TokioTimer;

    type TestSession = Session<FakeSurface, MemoryStore>;

    fn session() -> TestSession {
        let mut session = Session::new(MemoryStore::new(), RecorderConfig::default());
        session.attach_surface(FakeSurface::new(1000.0, 800.0));
        session
    }

    fn run(
        session: &mut TestSession,
        panel: &mut PanelState,
        command: Command,
    ) -> RecorderResult<CommandEffect<FakeSurface>> {
        execute(session, panel, command, Duration::ZERO)
    }

    #[test]
    fn test_button_ids() {
        let play_loop = Command::from_button_id("play-loop");
        assert_eq!(play_loop, Some(Command::PlayLoop));
        let clear = Command::from_button_id("clear-record");
        assert_eq!(clear, Some(Command::Clear));
        assert_eq!(Command::from_button_id("unknown"), None);
    }

    #[test]
    fn test_panel_visibility() {
        let mut session = session();
        let mut ui = PanelState::default();

        run(&mut session, &mut ui, Command::HidePanel).unwrap();
        assert!(ui.hidden);
        run(&mut session, &mut ui, Command::ShowPanel).unwrap();
        assert!(!ui.hidden);
        run(&mut session, &mut ui, Command::ToggleList).unwrap();
        assert!(ui.list_expanded);
    }

    #[test]
    fn test_failed_command_reports_status() {
        let mut session = session();
        let mut ui = PanelState::default();

        let result = run(&mut session, &mut ui, Command::PlayOnce);
        assert!(matches!(result, Err(RecorderError::EmptySequence)));
        let status = session.status();
        assert_eq!(status, "Nothing recorded yet, start a new recording");
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_command_flow() {
        let mut session = session();
        let mut ui = PanelState::default();
        let timer = TokioTimer::new();

        run(&mut session, &mut ui, Command::StartRecording).unwrap();
        for (x, y) in [(100.0, 100.0), (500.0, 100.0)] {
            session.handle_click(PointerClick::new(x, y)).unwrap();
        }
        run(&mut session, &mut ui, Command::StopRecording).unwrap();

        let effect = run(&mut session, &mut ui, Command::PlayOnce).unwrap();
        let CommandEffect::Play(playback) = effect else {
            panic!("expected a playback");
        };
        let result = playback
            .run(&timer, &mut |p| session.report_progress(p))
            .await;
        session.finish_playback(&result);
        assert_eq!(result.unwrap().clicks, 2);

        let effect = run(&mut session, &mut ui, Command::Clear).unwrap();
        assert!(matches!(
            effect,
            CommandEffect::ArmClearTimeout(window) if window == Duration::from_secs(3)
        ));
        let confirm = Duration::from_secs(1);
        let confirmed = execute(&mut session, &mut ui, Command::Clear, confirm);
        assert!(confirmed.is_ok());
        assert!(session.sequence().is_empty());
    }
}
