use std::path::PathBuf;

use crate::gui::screens::{
    dashboard::DashboardMessage, stream::StreamMessage, upload::UploadMessage,
};
use crate::gui::widgets::Tab;

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    Upload(UploadMessage),
    Stream(StreamMessage),
    Dashboard(DashboardMessage),
    FileDropped(PathBuf),
}
