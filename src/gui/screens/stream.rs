use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use iced::{
    Alignment::Center,
    Color, Element, Length, Task,
    task,
    widget::{Column, button, column, container, image::Handle, row, text, text_input},
};

use crate::{
    client::ClientError,
    gui::{
        AppState,
        screens::Screen,
        widgets::{ERROR_COLOR, MUTED_COLOR, PENDING_COLOR, SUCCESS_COLOR, error_banner, panel},
    },
    models::GpuStatus,
};

const GPU_REFRESH_DELAY: Duration = Duration::from_millis(500);
const STREAM_FAILED: &str = "ไม่สามารถโหลดสตรีมวิดีโอได้";
const CONNECTION_OK: &str = "✅ API เชื่อมต่อสำเร็จ!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "เชื่อมต่อแล้ว",
            ConnectionStatus::Connecting => "กำลังเชื่อมต่อ...",
            ConnectionStatus::Error => "เชื่อมต่อไม่ได้",
            ConnectionStatus::Disconnected => "ยังไม่ได้เชื่อมต่อ",
        }
    }

    fn color(self) -> Color {
        match self {
            ConnectionStatus::Connected => SUCCESS_COLOR,
            ConnectionStatus::Connecting => PENDING_COLOR,
            ConnectionStatus::Error => ERROR_COLOR,
            ConnectionStatus::Disconnected => MUTED_COLOR,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StreamEvent {
    Frame(Handle),
    Failed(Arc<ClientError>),
    Ended,
}

#[derive(Debug, Clone)]
pub enum StreamMessage {
    EndpointChanged(String),
    RefreshGpu(u64),
    GpuChecked(u64, Result<GpuStatus, Arc<ClientError>>),
    TestConnection,
    ConnectionTested(Result<GpuStatus, Arc<ClientError>>),
    Start,
    Stop,
    Stream(u64, StreamEvent),
}

pub struct StreamScreen {
    endpoint: String,
    status: ConnectionStatus,
    frame: Option<Handle>,
    frames: u64,
    gpu: Option<GpuStatus>,
    error: Option<String>,
    notice: Option<String>,
    testing: bool,
    stream: Option<task::Handle>,
    stream_session: u64,
    gpu_generation: u64,
}

impl StreamScreen {
    pub fn new(state: &AppState) -> (Self, Task<StreamMessage>) {
        let screen = Self {
            endpoint: state.settings.stream_endpoint.clone(),
            status: ConnectionStatus::Disconnected,
            frame: None,
            frames: 0,
            gpu: None,
            error: None,
            notice: None,
            testing: false,
            stream: None,
            stream_session: 0,
            gpu_generation: 0,
        };
        let task = screen.check_gpu(state);
        (screen, task)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_testing(&self) -> bool {
        self.testing
    }

    fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    fn check_gpu(&self, state: &AppState) -> Task<StreamMessage> {
        let client = state.client.clone();
        let endpoint = self.endpoint.clone();
        let generation = self.gpu_generation;
        Task::perform(
            async move { client.gpu_status(&endpoint).await.map_err(Arc::new) },
            move |result| StreamMessage::GpuChecked(generation, result),
        )
    }

    fn start(&mut self, state: &AppState) -> Task<StreamMessage> {
        self.stop();
        self.stream_session += 1;
        self.status = ConnectionStatus::Connecting;
        self.error = None;
        self.frames = 0;

        let client = state.client.clone();
        let endpoint = self.endpoint.clone();
        let events = stream::once(async move { client.video_frames(&endpoint).await })
            .flat_map(|opened| match opened {
                Ok(frames) => frames
                    .map(|frame| match frame {
                        Ok(bytes) => StreamEvent::Frame(Handle::from_bytes(bytes)),
                        Err(e) => StreamEvent::Failed(Arc::new(e)),
                    })
                    .left_stream(),
                Err(e) => stream::iter([StreamEvent::Failed(Arc::new(e))]).right_stream(),
            })
            .chain(stream::once(async { StreamEvent::Ended }));

        let session = self.stream_session;
        let (task, handle) =
            Task::run(events, move |event| StreamMessage::Stream(session, event)).abortable();
        self.stream = Some(handle);
        task
    }

    fn stop(&mut self) {
        if let Some(handle) = self.stream.take() {
            handle.abort();
            tracing::info!(frames = self.frames, "video stream stopped");
        }
        self.frame = None;
        self.status = ConnectionStatus::Disconnected;
    }

    fn on_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Frame(handle) => {
                if self.frames == 0 {
                    tracing::info!("first video frame received");
                }
                self.frames += 1;
                self.frame = Some(handle);
                self.status = ConnectionStatus::Connected;
            }
            StreamEvent::Failed(e) => {
                tracing::warn!("video stream failed: {e}");
                self.status = ConnectionStatus::Error;
                self.error = Some(STREAM_FAILED.to_string());
            }
            StreamEvent::Ended => {
                self.stream = None;
                if self.status != ConnectionStatus::Error {
                    self.status = ConnectionStatus::Disconnected;
                }
            }
        }
    }

    fn controls(&self) -> Element<'_, StreamMessage> {
        let endpoint = row![
            text_input("http://localhost:8000", &self.endpoint)
                .on_input(StreamMessage::EndpointChanged)
                .width(Length::Fill),
            button(if self.testing { "Testing..." } else { "Test" })
                .on_press_maybe((!self.testing).then_some(StreamMessage::TestConnection)),
        ]
        .spacing(8);

        let toggle = if self.is_streaming() {
            button("Stop Stream")
                .style(button::danger)
                .on_press(StreamMessage::Stop)
        } else {
            button("Start Stream").on_press(StreamMessage::Start)
        };
        let status = row![
            toggle,
            text(self.status.label()).color(self.status.color()),
        ]
        .spacing(12)
        .align_y(Center);

        panel("Stream Endpoint", column![endpoint, status].spacing(10))
    }

    fn gpu_panel(&self) -> Element<'_, StreamMessage> {
        let body: Element<'_, StreamMessage> = match &self.gpu {
            None => text("ไม่ทราบสถานะ GPU").color(MUTED_COLOR).into(),
            Some(gpu) if !gpu.gpu_available => text("GPU: ไม่พร้อมใช้งาน (CPU)").color(PENDING_COLOR).into(),
            Some(gpu) => {
                let mut lines = Column::new().spacing(4);
                lines = lines.push(
                    text(format!("GPU: {}", gpu.gpu_name.as_deref().unwrap_or("-"))).color(SUCCESS_COLOR),
                );
                if let Some(allocated) = gpu.allocated_mb() {
                    lines = lines.push(text(format!("Allocated: {allocated}")));
                }
                if let Some(reserved) = gpu.reserved_mb() {
                    lines = lines.push(text(format!("Reserved: {reserved}")));
                }
                lines.into()
            }
        };
        panel("GPU Status", body)
    }

    fn viewer(&self) -> Element<'_, StreamMessage> {
        let body: Element<'_, StreamMessage> = match &self.frame {
            Some(frame) => iced::widget::image(frame.clone()).width(Length::Fill).into(),
            None => container(text("(ไม่มีภาพ)").color(MUTED_COLOR))
                .center_x(Length::Fill)
                .padding(80)
                .into(),
        };
        let caption = text(format!("frames: {}", self.frames)).size(12).color(MUTED_COLOR);
        panel("Live Stream", column![body, caption].spacing(8))
    }
}

impl Screen for StreamScreen {
    type Message = StreamMessage;

    fn view(&self) -> Element<'_, StreamMessage> {
        let mut left = column![self.controls(), self.gpu_panel()].spacing(16);
        if let Some(error) = &self.error {
            left = left.push(error_banner(error));
        }
        if let Some(notice) = &self.notice {
            left = left.push(text(notice.as_str()).color(SUCCESS_COLOR));
        }
        row![
            container(left).width(Length::FillPortion(2)),
            container(self.viewer()).width(Length::FillPortion(3)),
        ]
        .spacing(20)
        .into()
    }

    fn update(&mut self, message: StreamMessage, state: &mut AppState) -> Task<StreamMessage> {
        match message {
            StreamMessage::EndpointChanged(endpoint) => {
                self.endpoint = endpoint;
                self.gpu_generation += 1;
                let generation = self.gpu_generation;
                Task::perform(tokio::time::sleep(GPU_REFRESH_DELAY), move |_| {
                    StreamMessage::RefreshGpu(generation)
                })
            }
            StreamMessage::RefreshGpu(generation) if generation == self.gpu_generation => {
                self.check_gpu(state)
            }
            StreamMessage::RefreshGpu(_) => Task::none(),
            StreamMessage::GpuChecked(generation, result) => {
                if generation == self.gpu_generation {
                    match result {
                        Ok(gpu) => self.gpu = Some(gpu),
                        Err(e) => {
                            tracing::debug!("gpu status unavailable: {e}");
                            self.gpu = None;
                        }
                    }
                }
                Task::none()
            }
            StreamMessage::TestConnection => {
                if self.testing {
                    return Task::none();
                }
                self.testing = true;
                // A running stream owns the status.
                if !self.is_streaming() {
                    self.status = ConnectionStatus::Connecting;
                }
                let client = state.client.clone();
                let endpoint = self.endpoint.clone();
                self.notice = None;
                Task::perform(
                    async move { client.gpu_status(&endpoint).await.map_err(Arc::new) },
                    StreamMessage::ConnectionTested,
                )
            }
            StreamMessage::ConnectionTested(result) => {
                self.testing = false;
                let status = match result {
                    Ok(gpu) => {
                        self.gpu = Some(gpu);
                        self.error = None;
                        self.notice = Some(CONNECTION_OK.to_string());
                        ConnectionStatus::Connected
                    }
                    Err(e) => {
                        tracing::warn!("connection test failed: {e}");
                        self.notice = None;
                        self.error = Some(e.user_message());
                        ConnectionStatus::Error
                    }
                };
                if !self.is_streaming() {
                    self.status = status;
                }
                Task::none()
            }
            StreamMessage::Start => self.start(state),
            StreamMessage::Stop => {
                self.stop();
                Task::none()
            }
            StreamMessage::Stream(session, event) => {
                if session == self.stream_session && self.is_streaming() {
                    self.on_stream_event(event);
                }
                Task::none()
            }
        }
    }
}
