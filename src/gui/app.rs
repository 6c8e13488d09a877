use iced::{Element, Event, Subscription, Task, Theme, event, window};

use super::{
    AppState, Message,
    screens::{Screen, dashboard::DashboardScreen, stream::StreamScreen, upload::{UploadMessage, UploadScreen}},
    widgets::{self, Tab},
};

/// Root of the window. Every tab keeps its state while hidden.
pub struct RoadcountApp {
    state: AppState,
    tab: Tab,
    upload: UploadScreen,
    stream: StreamScreen,
    dashboard: DashboardScreen,
}

impl RoadcountApp {
    pub fn new(state: AppState) -> (Self, Task<Message>) {
        let upload = UploadScreen::new(&state);
        let (stream, stream_task) = StreamScreen::new(&state);
        let dashboard = DashboardScreen::new(&state);
        (
            Self {
                state,
                tab: Tab::default(),
                upload,
                stream,
                dashboard,
            },
            stream_task.map(Message::Stream),
        )
    }

    pub fn title(&self) -> String {
        format!("Roadcount · {}", self.tab.label())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.tab = tab;
                Task::none()
            }
            Message::FileDropped(path) => {
                tracing::debug!(?path, "file dropped on window");
                self.tab = Tab::Upload;
                self.upload
                    .update(UploadMessage::ImagePicked(Some(path)), &mut self.state)
                    .map(Message::Upload)
            }
            Message::Upload(msg) => self.upload.update(msg, &mut self.state).map(Message::Upload),
            Message::Stream(msg) => self.stream.update(msg, &mut self.state).map(Message::Stream),
            Message::Dashboard(msg) => self
                .dashboard
                .update(msg, &mut self.state)
                .map(Message::Dashboard),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = match self.tab {
            Tab::Upload => self.upload.view().map(Message::Upload),
            Tab::Live => self.stream.view().map(Message::Stream),
            Tab::Dashboard => self.dashboard.view().map(Message::Dashboard),
        };
        widgets::layout(self.tab, content)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}
