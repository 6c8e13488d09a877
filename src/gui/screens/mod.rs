pub mod dashboard;
pub mod stream;
pub mod upload;

use iced::{Element, Task};

use crate::gui::AppState;

/// One tab of the shell. Each screen owns its own state; shared resources
/// come in through [`AppState`].
pub trait Screen: Sized {
    type Message: std::fmt::Debug + Clone;
    fn view(&self) -> Element<'_, Self::Message>;
    fn update(&mut self, message: Self::Message, state: &mut AppState) -> Task<Self::Message>;
}
