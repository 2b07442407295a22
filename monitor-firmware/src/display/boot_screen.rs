use embedded_graphics::{
    Drawable,
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, Point, Primitive},
    primitives::{PrimitiveStyleBuilder, StrokeAlignment},
    text::{Alignment, Text},
};

pub(super) struct BootScreen;

impl Drawable for BootScreen {
    type Color = BinaryColor;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        let line_style = PrimitiveStyleBuilder::new()
            .stroke_color(BinaryColor::On)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();

        let display_box = target.bounding_box();

        // Draw a one pixel border around the display
        display_box.into_styled(line_style).draw(target)?;

        Text::with_alignment(
            "envmon",
            display_box.center(),
            MonoTextStyle::new(&FONT_10X20, BinaryColor::On),
            Alignment::Center,
        )
        .draw(target)?;

        // Show the firmware version
        Text::with_alignment(
            git_version::git_version!(fallback = "unknown"),
            display_box.center() + Point::new(0, 18),
            MonoTextStyle::new(&FONT_6X10, BinaryColor::On),
            Alignment::Center,
        )
        .draw(target)?;

        Ok(())
    }
}
