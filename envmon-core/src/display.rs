//! Content of the status display.
//!
//! A [`Frame`] is composed from a snapshot of the shared readings and drawn onto any monochrome
//! [`DrawTarget`]. Clearing and committing the frame buffer is the job of the display driver.

use crate::state::Readings;
use core::fmt::Write;
use embedded_graphics::{
    Drawable,
    mono_font::{MonoTextStyle, ascii::FONT_6X12},
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, Point},
    text::{Baseline, Text},
};

/// Vertical distance between the origins of two text lines.
pub const LINE_PITCH: i32 = 16;

const MAX_LINES: usize = 4;

/// Long enough for any `f32` rendered by the line formats below.
pub type LineText = heapless::String<64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Layout {
    /// All four readings.
    Normal,
    /// Temperature warning, only the temperature is shown.
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub origin: Point,
    pub text: LineText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    layout: Layout,
    lines: heapless::Vec<Line, MAX_LINES>,
}

impl Frame {
    /// Selects the layout from the temperature alone and fills in its lines, top to bottom.
    pub fn compose(readings: &Readings) -> Self {
        let layout = if crate::above_warning_threshold(readings.temperature) {
            Layout::Critical
        } else {
            Layout::Normal
        };

        let mut frame = Self {
            layout,
            lines: heapless::Vec::new(),
        };

        let temperature = format_line(format_args!("Temperature: {:.1} C", readings.temperature));

        match layout {
            Layout::Normal => {
                frame.push(temperature);
                frame.push(format_line(format_args!(
                    "Humidity: {:.2} %RH",
                    readings.humidity
                )));
                frame.push(text_line(if readings.vibrating {
                    "Vibrating"
                } else {
                    "No vibration"
                }));
                frame.push(text_line(if readings.object_detected {
                    "Object detected"
                } else {
                    "No object"
                }));
            }
            Layout::Critical => {
                frame.push(text_line("HIGH TEMPERATURE!!"));
                frame.push(temperature);
            }
        }

        frame
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn push(&mut self, text: LineText) {
        let origin = Point::new(0, self.lines.len() as i32 * LINE_PITCH);

        // Every layout has at most MAX_LINES lines
        let _ = self.lines.push(Line { origin, text });
    }
}

impl Drawable for Frame {
    type Color = BinaryColor;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        let style = MonoTextStyle::new(&FONT_6X12, BinaryColor::On);

        for line in &self.lines {
            Text::with_baseline(&line.text, line.origin, style, Baseline::Top).draw(target)?;
        }

        Ok(())
    }
}

fn format_line(args: core::fmt::Arguments<'_>) -> LineText {
    let mut text = LineText::new();
    let _ = text.write_fmt(args);
    text
}

fn text_line(s: &str) -> LineText {
    format_line(format_args!("{s}"))
}
