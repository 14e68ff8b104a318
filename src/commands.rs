use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::api::{HttpBackend, PrinterBackend, SavedValues};
use crate::cli::{Command, FlagArgs, LayoutArgs, MapArgs, PickArgs, SaveValuesArgs, SnapshotArgs};
use crate::config::{save_config, AppConfig};
use crate::errors::{MattaError, MattaResult};
use crate::geometry::{
    compute_preview_transform, map_click_to_nozzle, ClickPoint, DisplaySettings, Size,
    ViewportGeometry,
};
use crate::preview::{PanelCommand, PanelEvent, PanelHandle, PanelState, PreviewEngine};

/// A running `PreviewEngine` driven one command at a time.
pub struct Session {
    handle: PanelHandle,
    events: broadcast::Receiver<PanelEvent>,
    engine: JoinHandle<PanelState>,
}

impl Session {
    pub fn start(backend: Arc<dyn PrinterBackend>) -> Self {
        let (engine, handle) = PreviewEngine::new(backend);
        let events = handle.subscribe();
        let engine = tokio::spawn(engine.run_loop());
        Self {
            handle,
            events,
            engine,
        }
    }

    /// Send `command` and wait for the state it produces.
    ///
    /// Every command ends in exactly one state replacement; an error event
    /// seen before it turns the result into `MattaError::Action`.
    pub async fn request(&mut self, command: PanelCommand) -> MattaResult<PanelState> {
        self.handle.send(command).await?;
        let mut failure = None;
        loop {
            match self.events.recv().await {
                Ok(PanelEvent::Error { action, message }) => failure = Some((action, message)),
                Ok(PanelEvent::StateChanged { state }) => {
                    return match failure {
                        Some((action, message)) => Err(MattaError::Action {
                            action: action.to_string(),
                            message,
                        }),
                        None => Ok(state),
                    };
                }
                Ok(PanelEvent::Status { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "panel events lagged");
                }
                Err(RecvError::Closed) => return Err(MattaError::Cancelled),
            }
        }
    }

    pub async fn finish(self) -> MattaResult<PanelState> {
        self.handle.send(PanelCommand::Stop).await?;
        self.engine
            .await
            .map_err(|e| MattaError::Action {
                action: "stop".into(),
                message: e.to_string(),
            })
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> MattaResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(state: &PanelState) {
    println!("{}", state.status.as_deref().unwrap_or_default());
}

fn settings_from(flags: &FlagArgs) -> DisplaySettings {
    DisplaySettings {
        flip_horizontal: flags.flip_h,
        flip_vertical: flags.flip_v,
        rotate: flags.rotate,
    }
}

/// Offline click mapping.
pub fn map(args: &MapArgs) -> MattaResult<()> {
    let geometry = ViewportGeometry {
        displayed_width: args.displayed_width,
        displayed_height: args.displayed_height,
        natural_width: args.natural_width,
        natural_height: args.natural_height,
    };
    let selection = map_click_to_nozzle(
        ClickPoint::new(args.x, args.y),
        &geometry,
        &settings_from(&args.flags),
    )?;
    print_json(&selection)
}

/// Offline layout computation.
pub fn layout(args: &LayoutArgs) -> MattaResult<()> {
    let layout = compute_preview_transform(
        &settings_from(&args.flags),
        args.natural_width,
        args.natural_height,
        args.container_width,
    )?;
    print_json(&serde_json::json!({
        "layout": layout,
        "container_css": layout.container_css(),
        "image_css": layout.image_css(),
    }))
}

async fn snapshot(session: &mut Session, config: &AppConfig, args: &SnapshotArgs) -> MattaResult<()> {
    let container_width = args.container_width.unwrap_or(config.preview.container_width);
    let state = session.request(PanelCommand::Refresh { container_width }).await?;
    let Some(frame) = state.frame else {
        return Err(MattaError::SnapshotUnavailable("no frame produced".into()));
    };

    if let Some(path) = args.out.clone().or_else(|| config.preview.snapshot_path.clone()) {
        tokio::fs::write(&path, &frame.jpeg).await?;
        tracing::info!(path = %path.display(), bytes = frame.jpeg.len(), "snapshot written");
    }
    print_json(&serde_json::json!({
        "frame": frame,
        "container_css": frame.layout.container_css(),
        "image_css": frame.layout.image_css(),
    }))
}

async fn pick(session: &mut Session, config: &AppConfig, args: &PickArgs) -> MattaResult<()> {
    let container_width = args.container_width.unwrap_or(config.preview.container_width);
    session.request(PanelCommand::Refresh { container_width }).await?;

    let displayed = match (args.displayed_width, args.displayed_height) {
        (Some(width), Some(height)) => Some(Size { width, height }),
        _ => None,
    };
    let state = session
        .request(PanelCommand::Click {
            point: ClickPoint::new(args.x, args.y),
            displayed,
        })
        .await?;
    let selection = state.selection.ok_or(MattaError::NoSelection)?;
    print_json(&selection)?;

    if args.save {
        let state = session.request(PanelCommand::SaveSelection).await?;
        print_status(&state);
    }
    Ok(())
}

async fn run_remote(command: &Command, config: &AppConfig) -> MattaResult<()> {
    let backend: Arc<dyn PrinterBackend> = Arc::new(HttpBackend::from_config(&config.backend)?);

    if let Command::Settings = command {
        return print_json(&backend.get_settings().await?);
    }

    let mut session = Session::start(backend);
    match command {
        Command::Home => print_status(&session.request(PanelCommand::HomePrinter).await?),
        Command::State => print_status(&session.request(PanelCommand::PrinterState).await?),
        Command::TestToken => print_status(&session.request(PanelCommand::TestAuthToken).await?),
        Command::Temps => {
            let state = session.request(PanelCommand::Temps).await?;
            print_json(&state.temps.unwrap_or_default())?;
        }
        Command::Values => {
            let state = session.request(PanelCommand::LoadValues).await?;
            print_json(&state.values.unwrap_or_default())?;
        }
        Command::SaveValues(SaveValuesArgs {
            auth_token,
            terminal_cmds,
        }) => {
            let values = SavedValues {
                auth_token: auth_token.clone(),
                terminal_cmds: terminal_cmds.clone(),
                ..SavedValues::default()
            };
            print_status(&session.request(PanelCommand::SaveValues(values)).await?);
        }
        Command::Snapshot(args) => snapshot(&mut session, config, args).await?,
        Command::Pick(args) => pick(&mut session, config, args).await?,
        Command::Settings | Command::Map(_) | Command::Layout(_) | Command::InitConfig(_) => {}
    }
    session.finish().await?;
    Ok(())
}

/// Execute one CLI command.
pub async fn execute(command: &Command, config: &AppConfig) -> MattaResult<()> {
    match command {
        Command::Map(args) => map(args),
        Command::Layout(args) => layout(args),
        Command::InitConfig(args) => {
            let path = save_config(&AppConfig::default(), args.path.clone(), args.force)?;
            println!("{}", path.display());
            Ok(())
        }
        remote => run_remote(remote, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::testing::FakeBackend;

    #[tokio::test]
    async fn session_request_returns_state() {
        let backend = Arc::new(FakeBackend::new(800, 600));
        let mut session = Session::start(backend.clone());

        let state = session.request(PanelCommand::Refresh { container_width: 400.0 }).await.unwrap();
        assert_eq!(state.frame.as_ref().unwrap().natural_size.width, 800.0);

        let state = session
            .request(PanelCommand::Click {
                point: ClickPoint::new(250.0, 150.0),
                displayed: None,
            })
            .await
            .unwrap();
        assert_eq!(state.selection.unwrap().nozzle.x, 500);

        let final_state = session.finish().await.unwrap();
        assert_eq!(final_state.revision, 2);
    }

    #[tokio::test]
    async fn session_request_surfaces_errors() {
        let backend = Arc::new(FakeBackend::new(800, 600));
        let mut session = Session::start(backend);
        let err = session.request(PanelCommand::SaveSelection).await.unwrap_err();
        match err {
            MattaError::Action { action, message } => {
                assert_eq!(action, "save_selection");
                assert_eq!(message, "No nozzle coordinate selected");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn offline_map_rejects_zero_width() {
        let args = MapArgs {
            x: 1.0,
            y: 1.0,
            displayed_width: 0.0,
            displayed_height: 300.0,
            natural_width: 800.0,
            natural_height: 600.0,
            flags: FlagArgs {
                flip_h: false,
                flip_v: false,
                rotate: true,
            },
        };
        assert!(matches!(map(&args), Err(MattaError::Geometry(_))));
    }
}
