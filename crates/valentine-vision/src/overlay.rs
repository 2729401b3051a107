//! Crown overlay compositor.
//!
//! The drawing surface is an RGB image exposed to `embedded-graphics` as a
//! [`DrawTarget`], so the crown and the caption are drawn with its
//! primitives and mono fonts.

use crate::types::FaceBox;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use image::{Rgb, RgbImage};
use std::convert::Infallible;
use std::io::Cursor;
use thiserror::Error;

/// Crown width relative to the face box width.
pub const CROWN_SCALE: f32 = 0.8;
/// Gap between the crown's bottom edge and the top of the face box.
pub const CROWN_LIFT: f32 = 20.0;

pub const CAPTION_LINES: [&str; 2] = ["Happy Valentine's Day,", "My Queen! <3"];
/// Caption baselines, measured up from the bottom edge of the frame.
pub const CAPTION_BASELINE_OFFSETS: [i32; 2] = [70, 20];
pub const CAPTION_FILL: Rgb888 = Rgb888::new(0xFF, 0x14, 0x93);
pub const CAPTION_OUTLINE: Rgb888 = Rgb888::WHITE;
/// FONT_10X20 scaled up to roughly a 40px line.
const CAPTION_SCALE: u32 = 2;
const CAPTION_OUTLINE_WIDTH: i32 = 2;

const CROWN_GOLD: Rgb888 = Rgb888::new(0xFF, 0xC8, 0x28);
const CROWN_JEWEL: Rgb888 = Rgb888::new(0xDC, 0x14, 0x3C);

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("frame is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("nothing has been composited yet")]
    Empty,
    #[error("encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Where a crown goes for one face: horizontally centred on the box, its
/// bottom edge [`CROWN_LIFT`] pixels above the box top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrownPlacement {
    pub center_x: f32,
    pub bottom_y: f32,
    pub size: f32,
}

pub fn crown_placement(face: &FaceBox) -> Option<CrownPlacement> {
    let width = face.width();
    if width.is_nan() || width <= 0.0 {
        return None;
    }
    Some(CrownPlacement {
        center_x: face.top_left.0 + width / 2.0,
        bottom_y: face.top_left.1 - CROWN_LIFT,
        size: width * CROWN_SCALE,
    })
}

/// RGB drawing surface sized to the source frame.
struct Surface {
    image: RgbImage,
}

impl DrawTarget for Surface {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < width && y < height {
                self.image.put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        let (width, height) = self.image.dimensions();
        Size::new(width, height)
    }
}

/// Draws every pixel as a `scale`×`scale` block, shifted by `offset`.
struct Scaled<'a> {
    surface: &'a mut Surface,
    scale: u32,
    offset: Point,
}

impl DrawTarget for Scaled<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i32;
        let offset = self.offset;
        let blocks = pixels.into_iter().flat_map(move |Pixel(point, color)| {
            let origin = Point::new(point.x * scale, point.y * scale) + offset;
            (0..scale).flat_map(move |dy| {
                (0..scale).map(move |dx| Pixel(origin + Point::new(dx, dy), color))
            })
        });
        self.surface.draw_iter(blocks)
    }
}

impl OriginDimensions for Scaled<'_> {
    fn size(&self) -> Size {
        self.surface.size() / self.scale
    }
}

/// Composites frames with crowns and the caption.
pub struct Compositor {
    surface: Surface,
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            surface: Surface {
                image: RgbImage::new(0, 0),
            },
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.image.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.surface.image
    }

    /// Draw one frame: the raw RGB frame, a crown per face, then the caption.
    pub fn composite(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        faces: &[FaceBox],
    ) -> Result<(), OverlayError> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(OverlayError::FrameSize {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }

        if self.dimensions() != (width, height) {
            tracing::debug!(width, height, "resizing overlay surface");
            self.surface.image = RgbImage::new(width, height);
        }
        self.surface.image.copy_from_slice(rgb);

        for placement in faces.iter().filter_map(crown_placement) {
            draw_crown(&mut self.surface, placement);
        }
        draw_caption(&mut self.surface);
        Ok(())
    }

    /// Encode the current surface as PNG.
    pub fn snapshot(&self) -> Result<Vec<u8>, OverlayError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(OverlayError::Empty);
        }
        let mut png = Vec::new();
        self.surface
            .image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(png)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Crown glyph: a gold band topped with three points, each tipped with a
/// jewel. `size` is its width; the height is 0.8 of that.
fn draw_crown(surface: &mut Surface, placement: CrownPlacement) {
    let w = placement.size;
    let h = w * 0.8;
    let left = placement.center_x - w / 2.0;
    let bottom = placement.bottom_y;
    let band_top = bottom - h * 0.3;
    let top = bottom - h;
    let p = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);

    let gold = PrimitiveStyle::with_fill(CROWN_GOLD);
    let jewel = PrimitiveStyle::with_fill(CROWN_JEWEL);
    let jewel_diameter = ((w * 0.12).round() as u32).max(1);

    let _ = Rectangle::with_corners(p(left, band_top), p(left + w, bottom))
        .into_styled(gold)
        .draw(surface);

    for i in 0..3 {
        let base_left = left + w * i as f32 / 3.0;
        let base_right = left + w * (i + 1) as f32 / 3.0;
        let apex = p((base_left + base_right) / 2.0, top);
        let _ = Triangle::new(p(base_left, band_top), apex, p(base_right, band_top))
            .into_styled(gold)
            .draw(surface);
        let _ = Circle::with_center(apex, jewel_diameter)
            .into_styled(jewel)
            .draw(surface);
    }

    let _ = Circle::with_center(p(placement.center_x, (band_top + bottom) / 2.0), jewel_diameter)
        .into_styled(jewel)
        .draw(surface);
}

/// Two caption lines centred at the bottom, outline first, then fill.
fn draw_caption(surface: &mut Surface) {
    let (width, height) = surface.image.dimensions();
    let center_x = width as i32 / 2;
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Alphabetic)
        .build();
    let outline = MonoTextStyle::new(&FONT_10X20, CAPTION_OUTLINE);
    let fill = MonoTextStyle::new(&FONT_10X20, CAPTION_FILL);

    for (line, from_bottom) in CAPTION_LINES.iter().zip(CAPTION_BASELINE_OFFSETS) {
        let anchor = Point::new(center_x, height as i32 - from_bottom);
        let text = |style| Text::with_text_style(line, Point::zero(), style, text_style);

        for dy in -CAPTION_OUTLINE_WIDTH..=CAPTION_OUTLINE_WIDTH {
            for dx in -CAPTION_OUTLINE_WIDTH..=CAPTION_OUTLINE_WIDTH {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let mut target = Scaled {
                    surface: &mut *surface,
                    scale: CAPTION_SCALE,
                    offset: anchor + Point::new(dx, dy),
                };
                let _ = text(outline).draw(&mut target);
            }
        }

        let mut target = Scaled {
            surface: &mut *surface,
            scale: CAPTION_SCALE,
            offset: anchor,
        };
        let _ = text(fill).draw(&mut target);
    }
}
