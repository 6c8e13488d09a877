use std::path::PathBuf;
use std::sync::Arc;

use iced::{
    Alignment::Center,
    Element, Font, Length, Task,
    widget::{Column, button, column, container, image::Handle, mouse_area, row, scrollable, text, text_input},
};
use image::RgbaImage;
use rfd::AsyncFileDialog;

use crate::{
    client::ClientError,
    gui::{
        AppState,
        screens::Screen,
        widgets::{MUTED_COLOR, SUCCESS_COLOR, error_banner, highlight_style, panel, rgba_color, swatch},
    },
    models::{Detection, HealthStatus, class_summary},
    render::{self, EXPORT_FILE_NAME, OverlayRenderer, class_color, format_confidence},
    session::{RequestId, SelectedImage, UploadSession},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "gif"];

pub struct UploadScreen {
    endpoint: String,
    session: UploadSession,
    renderer: OverlayRenderer,
    raster: Option<RgbaImage>,
    preview: Option<Handle>,
    show_json: bool,
    notice: Option<String>,
}

#[derive(Debug, Clone)]
pub enum UploadMessage {
    EndpointChanged(String),
    TestHealth,
    HealthChecked(Result<HealthStatus, Arc<ClientError>>),
    PickImage,
    ImagePicked(Option<PathBuf>),
    ImageLoaded(Result<SelectedImage, String>),
    Detect,
    Detected(RequestId, Result<Vec<Detection>, Arc<ClientError>>),
    Hover(Option<usize>),
    ToggleJson,
    CopyJson,
    Download,
    DownloadTarget(Option<PathBuf>),
    Clear,
}

impl UploadScreen {
    pub fn new(state: &AppState) -> Self {
        Self {
            endpoint: state.settings.detection_endpoint.clone(),
            session: UploadSession::new(),
            renderer: OverlayRenderer::from_settings(&state.settings),
            raster: None,
            preview: None,
            show_json: false,
            notice: None,
        }
    }

    /// Redraw the whole overlay from the source image.
    fn rerender(&mut self) {
        let Some(selected) = self.session.selected() else {
            self.raster = None;
            self.preview = None;
            return;
        };
        let raster = self.renderer.render(
            &selected.image,
            self.session.detections(),
            self.session.hover(),
        );
        self.preview = Some(Handle::from_rgba(
            raster.width(),
            raster.height(),
            raster.as_raw().clone(),
        ));
        self.raster = Some(raster);
    }

    fn detections_json(&self) -> String {
        serde_json::to_string_pretty(self.session.detections()).unwrap_or_default()
    }

    fn controls(&self) -> Element<'_, UploadMessage> {
        let has_results = !self.session.detections().is_empty();
        let endpoint = row![
            text_input("http://localhost:5000", &self.endpoint)
                .on_input(UploadMessage::EndpointChanged)
                .width(Length::Fill),
            button("Test").on_press(UploadMessage::TestHealth),
        ]
        .spacing(8);

        let actions = row![
            button(if self.show_json { "Hide JSON" } else { "Show JSON" })
                .on_press_maybe(has_results.then_some(UploadMessage::ToggleJson)),
            button("Copy JSON").on_press_maybe(has_results.then_some(UploadMessage::CopyJson)),
            button("Download").on_press_maybe(has_results.then_some(UploadMessage::Download)),
            button("Clear")
                .style(button::danger)
                .on_press(UploadMessage::Clear),
        ]
        .spacing(8);

        panel("API Endpoint", column![endpoint, actions].spacing(10))
    }

    fn upload_area(&self) -> Element<'_, UploadMessage> {
        let mut body = Column::new().spacing(10).align_x(Center);
        body = body.push(
            button(
                container(text("คลิกหรือวางไฟล์ที่นี่"))
                    .padding(24)
                    .center_x(Length::Fill),
            )
            .style(button::secondary)
            .width(Length::Fill)
            .on_press(UploadMessage::PickImage),
        );
        if let Some(selected) = self.session.selected() {
            body = body.push(text(format!("📄 {}", selected.file_name)).color(MUTED_COLOR));
        }
        let label = if self.session.is_loading() {
            "Analyzing..."
        } else {
            "Detect Objects"
        };
        body = body.push(
            button(container(text(label)).center_x(Length::Fill))
                .width(Length::Fill)
                .on_press_maybe(self.session.can_submit().then_some(UploadMessage::Detect)),
        );
        panel("Upload Image", body)
    }

    fn summary(&self) -> Option<Element<'_, UploadMessage>> {
        let summary = class_summary(self.session.detections());
        if summary.is_empty() {
            return None;
        }
        let chips = row(summary.into_iter().map(|(name, count)| {
            container(text(format!("{name}: {count}")))
                .padding([4, 10])
                .style(highlight_style(false))
                .into()
        }))
        .spacing(6)
        .wrap();
        Some(panel("Summary", chips))
    }

    fn json_view(&self) -> Element<'_, UploadMessage> {
        panel(
            "JSON",
            scrollable(text(self.detections_json()).font(Font::MONOSPACE).size(12))
                .height(Length::Fixed(260.0)),
        )
    }

    fn canvas(&self) -> Element<'_, UploadMessage> {
        let body: Element<'_, UploadMessage> = match &self.preview {
            Some(handle) => iced::widget::image(handle.clone()).width(Length::Fill).into(),
            None => container(text("(ยังไม่เลือกรูป)").color(MUTED_COLOR))
                .center_x(Length::Fill)
                .padding(60)
                .into(),
        };
        let mut content = column![body].spacing(8);
        if self.session.is_loading() {
            content = content.push(text("Processing...").color(MUTED_COLOR));
        }
        panel("Preview", content)
    }

    fn results(&self) -> Element<'_, UploadMessage> {
        let detections = self.session.detections();
        let rows = detections.iter().enumerate().map(|(index, det)| {
            let color = self
                .renderer
                .palette()
                .get(det.class)
                .unwrap_or_else(|| class_color(det.class));
            let line = row![
                swatch(rgba_color(color)),
                text(det.class_name.as_str()).width(Length::Fill),
                text(format_confidence(det.confidence)).color(SUCCESS_COLOR),
            ]
            .spacing(8)
            .align_y(Center);
            let item = container(column![line, text(det.rounded_bbox()).size(12).color(MUTED_COLOR)].spacing(4))
                .padding(8)
                .width(Length::Fill)
                .style(highlight_style(self.session.hover() == Some(index)));
            mouse_area(item)
                .on_enter(UploadMessage::Hover(Some(index)))
                .on_exit(UploadMessage::Hover(None))
                .into()
        });
        let title = format!("Results ({}) · Hover to highlight", detections.len());
        panel(
            title,
            scrollable(Column::with_children(rows).spacing(6)).height(Length::Fixed(320.0)),
        )
    }
}

impl Screen for UploadScreen {
    type Message = UploadMessage;

    fn view(&self) -> Element<'_, UploadMessage> {
        let mut left = column![self.controls(), self.upload_area()].spacing(16);
        if let Some(error) = self.session.error() {
            left = left.push(error_banner(error));
        }
        if let Some(notice) = &self.notice {
            left = left.push(text(notice.as_str()).color(SUCCESS_COLOR));
        }
        if let Some(summary) = self.summary() {
            left = left.push(summary);
        }
        if self.show_json && !self.session.detections().is_empty() {
            left = left.push(self.json_view());
        }

        let mut right = column![self.canvas()].spacing(16);
        if !self.session.detections().is_empty() {
            right = right.push(self.results());
        }

        scrollable(
            row![
                container(left).width(Length::FillPortion(2)),
                container(right).width(Length::FillPortion(3)),
            ]
            .spacing(20),
        )
        .into()
    }

    fn update(&mut self, message: UploadMessage, state: &mut AppState) -> Task<UploadMessage> {
        match message {
            UploadMessage::EndpointChanged(endpoint) => {
                self.endpoint = endpoint;
                Task::none()
            }
            UploadMessage::TestHealth => {
                let client = state.client.clone();
                let endpoint = self.endpoint.clone();
                self.notice = None;
                Task::perform(
                    async move { client.check_health(&endpoint).await.map_err(Arc::new) },
                    UploadMessage::HealthChecked,
                )
            }
            UploadMessage::HealthChecked(result) => {
                let healthy = matches!(result, Ok(HealthStatus::Healthy));
                self.session.record_health(result);
                self.notice = healthy.then(|| "✅ API พร้อมใช้งาน".to_string());
                Task::none()
            }
            UploadMessage::PickImage => Task::perform(
                AsyncFileDialog::new()
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file(),
                |handle| UploadMessage::ImagePicked(handle.map(|h| h.path().to_path_buf())),
            ),
            UploadMessage::ImagePicked(None) => Task::none(),
            UploadMessage::ImagePicked(Some(path)) => Task::perform(
                async move { SelectedImage::open(path).await.map_err(|e| format!("{e:#}")) },
                UploadMessage::ImageLoaded,
            ),
            UploadMessage::ImageLoaded(Ok(selected)) => {
                tracing::info!(
                    file = %selected.file_name,
                    width = selected.image.width(),
                    height = selected.image.height(),
                    "image selected"
                );
                self.session.select_image(selected);
                self.notice = None;
                self.rerender();
                Task::none()
            }
            UploadMessage::ImageLoaded(Err(message)) => {
                self.session.set_error(message);
                Task::none()
            }
            UploadMessage::Detect => {
                let Some(pending) = self.session.begin_submit() else {
                    return Task::none();
                };
                let client = state.client.clone();
                let endpoint = self.endpoint.clone();
                let id = pending.id;
                self.notice = None;
                Task::perform(
                    async move {
                        client
                            .submit_image(&endpoint, &pending.file_name, pending.bytes.to_vec())
                            .await
                            .map_err(Arc::new)
                    },
                    move |result| UploadMessage::Detected(id, result),
                )
            }
            UploadMessage::Detected(id, result) => {
                if self.session.finish_submit(id, result) {
                    self.rerender();
                }
                Task::none()
            }
            UploadMessage::Hover(hover) => {
                if self.session.set_hover(hover) {
                    self.rerender();
                }
                Task::none()
            }
            UploadMessage::ToggleJson => {
                self.show_json = !self.show_json;
                Task::none()
            }
            UploadMessage::CopyJson => iced::clipboard::write(self.detections_json()),
            UploadMessage::Download => Task::perform(
                AsyncFileDialog::new()
                    .set_directory(&state.settings.export_dir)
                    .set_file_name(EXPORT_FILE_NAME)
                    .add_filter("PNG", &["png"])
                    .save_file(),
                |handle| UploadMessage::DownloadTarget(handle.map(|h| h.path().to_path_buf())),
            ),
            UploadMessage::DownloadTarget(None) => Task::none(),
            UploadMessage::DownloadTarget(Some(path)) => {
                if let Some(raster) = &self.raster {
                    match render::save_png(raster, &path) {
                        Ok(()) => {
                            tracing::info!(?path, "exported annotated image");
                            self.notice = Some(format!("Saved {}", path.display()));
                        }
                        Err(e) => self.session.set_error(format!("{e:#}")),
                    }
                }
                Task::none()
            }
            UploadMessage::Clear => {
                self.session.reset();
                self.show_json = false;
                self.notice = None;
                self.rerender();
                Task::none()
            }
        }
    }
}
