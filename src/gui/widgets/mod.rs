use iced::{
    Alignment::Center, Color, Element, Length, Theme, border,
    widget::{button, column, container, container::Style, container::bordered_box, progress_bar, row, text},
};

use crate::gui::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Live,
    Dashboard,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Upload, Tab::Live, Tab::Dashboard];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Upload => "Image Detection",
            Tab::Live => "Live Stream",
            Tab::Dashboard => "Dashboard",
        }
    }

    fn button<'a>(self, active: Tab) -> Element<'a, Message> {
        let style = if self == active {
            button::primary
        } else {
            button::secondary
        };
        button(text(self.label()))
            .padding([8, 16])
            .style(style)
            .on_press(Message::TabSelected(self))
            .into()
    }
}

pub const ERROR_COLOR: Color = Color::from_rgb(0.94, 0.27, 0.27);
pub const SUCCESS_COLOR: Color = Color::from_rgb(0.06, 0.73, 0.51);
pub const PENDING_COLOR: Color = Color::from_rgb(0.96, 0.62, 0.04);
pub const MUTED_COLOR: Color = Color::from_rgb(0.6, 0.6, 0.6);

/// Header with the tab bar above the active screen.
pub fn layout<'a>(active: Tab, content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    let tabs = row(Tab::ALL.iter().map(|tab| tab.button(active))).spacing(8);
    let header = column![
        text("Vehicle Detection and Counting for Thai Roads using Deep Learning").size(28),
        text("การพัฒนาโมเดลการรู้จำและนับจำนวนยานพาหนะบนท้องถนนในประเทศไทยโดยใช้การเรียนรู้เชิงลึกสำหรับการใช้งานบนเว็บไซต์")
            .size(14)
            .color(MUTED_COLOR),
        tabs,
    ]
    .spacing(12)
    .align_x(Center);

    container(
        column![header, container(content.into()).height(Length::Fill)]
            .spacing(20)
            .padding(20),
    )
    .center_x(Length::Fill)
    .into()
}

/// Bordered panel with a heading.
pub fn panel<'a, M: 'a>(
    title: impl text::IntoFragment<'a>,
    body: impl Into<Element<'a, M>>,
) -> Element<'a, M> {
    container(column![text(title).size(18), body.into()].spacing(10))
        .padding(14)
        .width(Length::Fill)
        .style(panel_style)
        .into()
}

fn panel_style(theme: &Theme) -> Style {
    bordered_box(theme).border(border::rounded(8).width(1))
}

/// Highlighted background for the hovered result row.
pub fn highlight_style(active: bool) -> impl Fn(&Theme) -> Style {
    move |theme: &Theme| {
        let style = bordered_box(theme).border(border::rounded(6).width(1));
        if active {
            let primary = theme.palette().primary;
            style
                .border(border::rounded(6).width(2).color(primary))
                .background(Color { a: 0.15, ..primary })
        } else {
            style
        }
    }
}

pub fn swatch<'a, M: 'a>(color: Color) -> Element<'a, M> {
    container(text(""))
        .width(Length::Fixed(12.0))
        .height(Length::Fixed(12.0))
        .style(move |_: &Theme| Style::default().background(color).border(border::rounded(6)))
        .into()
}

pub fn error_banner<'a, M: 'a>(message: &'a str) -> Element<'a, M> {
    container(text(message).color(ERROR_COLOR))
        .padding(10)
        .width(Length::Fill)
        .style(|theme: &Theme| {
            bordered_box(theme)
                .border(border::rounded(6).width(1).color(ERROR_COLOR))
                .background(Color { a: 0.1, ..ERROR_COLOR })
        })
        .into()
}

pub fn metric_card<'a, M: 'a>(label: &'a str, value: String) -> Element<'a, M> {
    container(column![text(label).size(14).color(MUTED_COLOR), text(value).size(30)].spacing(6))
        .padding(16)
        .width(Length::FillPortion(1))
        .style(panel_style)
        .into()
}

/// One labelled horizontal bar, scaled against `max`.
pub fn bar_row<'a, M: 'a>(label: String, value: u32, max: u32) -> Element<'a, M> {
    let max = max.max(1) as f32;
    row![
        text(label).width(Length::FillPortion(2)),
        container(progress_bar(0.0..=max, value as f32)).width(Length::FillPortion(5)),
        text(value.to_string()).width(Length::FillPortion(1)),
    ]
    .spacing(10)
    .align_y(Center)
    .into()
}

pub fn rgba_color(color: image::Rgba<u8>) -> Color {
    let image::Rgba([r, g, b, _]) = color;
    Color::from_rgb8(r, g, b)
}
