mod app;
mod message;
mod state;
pub mod screens;
pub mod widgets;

pub use app::RoadcountApp;
pub use message::Message;
pub use state::AppState;

use crate::Settings;

/// Open the desktop window and block until it is closed.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    tracing::info!(
        detection = %state.settings.detection_endpoint,
        stream = %state.settings.stream_endpoint,
        "starting gui"
    );
    iced::application(
        move || RoadcountApp::new(state.clone()),
        RoadcountApp::update,
        RoadcountApp::view,
    )
    .title(RoadcountApp::title)
    .subscription(RoadcountApp::subscription)
    .theme(RoadcountApp::theme)
    .window_size((1280.0, 860.0))
    .run()?;
    Ok(())
}
