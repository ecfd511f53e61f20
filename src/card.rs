//! Card rendering and export.
//!
//! Turns a fetched quote and background photo into a downloadable PNG. Two
//! strategies exist because the page had two: a snapshot of the on-screen
//! card at 2x scale, and a from-scratch 800x400 canvas.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, ImageEncoder, Rgba, RgbaImage};
use rusttype::{Font, Scale, point};

use crate::constants::{
    ATTRIBUTION, ATTRIBUTION_PX, CANVAS_HEIGHT, CANVAS_WIDTH, CARD_HEIGHT, CARD_WIDTH, LABEL_PX,
    LINE_HEIGHT, QUOTE_PX, QUOTE_PX_FLOOR, QUOTE_REGION_BOTTOM, SNAPSHOT_FILE_NAME,
    SNAPSHOT_SCALE, TEXT_MARGIN, TEXT_TOP,
};
use crate::theme::Theme;

const FALLBACK_FILL: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 255]);
const QUOTE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([0xcc, 0xcc, 0xcc, 255]);
const ATTRIBUTION_COLOR: Rgba<u8> = Rgba([0xaa, 0xaa, 0xaa, 255]);
const SCRIM: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SCRIM_OPACITY: f32 = 0.5;

/// Errors from card rendering and export.
#[derive(Debug)]
pub enum CardError {
    /// The canvas could not be encoded to PNG.
    Encode(image::ImageError),
    /// The font file could not be loaded or parsed.
    Font(String),
}

impl std::fmt::Display for CardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "Failed to encode card PNG: {err}"),
            Self::Font(message) => write!(f, "Failed to load font: {message}"),
        }
    }
}

impl std::error::Error for CardError {}

/// Which rasterization path produces the card.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportStrategy {
    /// Reproduce the on-screen card layout at 2x scale; fixed file name.
    Snapshot,
    /// Draw the fixed 800x400 canvas from scratch; file name derived from the
    /// theme.
    ManualDraw,
}

impl ExportStrategy {
    /// Download name for a card exported with this strategy.
    pub fn file_name(self, theme: Theme) -> String {
        match self {
            ExportStrategy::Snapshot => SNAPSHOT_FILE_NAME.to_string(),
            ExportStrategy::ManualDraw => format!("quote-{theme}.png"),
        }
    }
}

impl FromStr for ExportStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "snapshot" => Ok(ExportStrategy::Snapshot),
            "manual" | "manual-draw" => Ok(ExportStrategy::ManualDraw),
            other => Err(format!("unknown export strategy: {other}")),
        }
    }
}

/// A finished card: encoded PNG plus its download name.
#[derive(Clone, Debug)]
pub struct ExportedCard {
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    /// Deterministic download file name.
    pub file_name: String,
}

impl ExportedCard {
    /// The canvas serialized as a data URL, the form a browser download link
    /// carries.
    pub fn as_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// Greedy word wrap: words accumulate into a line until the next word would
/// push the measured width past `max_width`, then the line is committed and a
/// new one starts. The final partial line is always emitted. A single word
/// wider than `max_width` stays on its own line, never split.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line = word.to_string();
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Steps the text size down until the wrapped block fits `max_block_height`
/// (measured from the first baseline to the last), clamped at the floor.
/// Returns the chosen size, the matching line height and the wrapped lines.
fn fit_block(
    text: &str,
    max_width: f32,
    max_block_height: f32,
    measure_at: impl Fn(&str, f32) -> f32,
) -> (f32, f32, Vec<String>) {
    let mut px = QUOTE_PX;
    loop {
        let lines = wrap_words(text, max_width, |line| measure_at(line, px));
        let line_height = LINE_HEIGHT * px / QUOTE_PX;
        let block_height = lines.len().saturating_sub(1) as f32 * line_height;
        if block_height <= max_block_height || px <= QUOTE_PX_FLOOR {
            return (px, line_height, lines);
        }
        px -= 2.0;
    }
}

/// How the background photo fills the canvas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BackgroundFit {
    /// Stretched to the canvas, aspect ignored (manual draw).
    Stretch,
    /// Scaled to cover, center-cropped (snapshot of the on-screen card).
    Cover,
}

fn compose_background(
    width: u32,
    height: u32,
    background: Option<&DynamicImage>,
    fit: BackgroundFit,
) -> RgbaImage {
    match background {
        Some(photo) => match fit {
            BackgroundFit::Stretch => {
                image::imageops::resize(&photo.to_rgba8(), width, height, FilterType::Lanczos3)
            }
            BackgroundFit::Cover => photo.resize_to_fill(width, height, FilterType::Lanczos3).to_rgba8(),
        },
        None => ImageBuffer::from_pixel(width, height, FALLBACK_FILL),
    }
}

fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for channel in 0..3 {
        dst.0[channel] = (color.0[channel] as f32 * alpha + dst.0[channel] as f32 * inv) as u8;
    }
    dst.0[3] = 255;
}

fn fill_rect(canvas: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>, opacity: f32) {
    let x1 = x1.min(canvas.width());
    let y1 = y1.min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(canvas.get_pixel_mut(x, y), color, opacity);
        }
    }
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, CardError> {
    let mut output = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut output);
    encoder
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(CardError::Encode)?;
    Ok(output)
}

/// Draws quote cards with a single loaded font.
pub struct CardRenderer {
    font: Font<'static>,
}

impl CardRenderer {
    /// Wraps an already loaded font.
    pub fn new(font: Font<'static>) -> Self {
        Self { font }
    }

    /// Loads the font from a TTF file.
    pub fn from_font_file(path: &std::path::Path) -> Result<Self, CardError> {
        let bytes = std::fs::read(path)
            .map_err(|err| CardError::Font(format!("{}: {err}", path.display())))?;
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| CardError::Font(format!("{} is not a usable font", path.display())))?;
        Ok(Self::new(font))
    }

    /// Renders the card with the given strategy and encodes it to PNG. The
    /// background, when present, must already be fully decoded.
    pub fn export(
        &self,
        strategy: ExportStrategy,
        quote: &str,
        theme: Theme,
        background: Option<&DynamicImage>,
    ) -> Result<ExportedCard, CardError> {
        let canvas = match strategy {
            ExportStrategy::ManualDraw => self.draw_manual(quote, theme, background),
            ExportStrategy::Snapshot => self.draw_snapshot(quote, background),
        };
        Ok(ExportedCard {
            png: encode_png(&canvas)?,
            file_name: strategy.file_name(theme),
        })
    }

    fn draw_manual(
        &self,
        quote: &str,
        theme: Theme,
        background: Option<&DynamicImage>,
    ) -> RgbaImage {
        let mut canvas =
            compose_background(CANVAS_WIDTH, CANVAS_HEIGHT, background, BackgroundFit::Stretch);
        fill_rect(
            &mut canvas,
            0,
            0,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            SCRIM,
            SCRIM_OPACITY,
        );

        let max_width = (CANVAS_WIDTH - 2 * TEXT_MARGIN) as f32;
        let (px, line_height, lines) = fit_block(
            quote,
            max_width,
            QUOTE_REGION_BOTTOM - TEXT_TOP,
            |line, size| self.text_width(line, size),
        );

        let cx = CANVAS_WIDTH as f32 / 2.0;
        for (index, line) in lines.iter().enumerate() {
            let baseline = TEXT_TOP + index as f32 * line_height;
            self.draw_text_centered(&mut canvas, line, px, cx, baseline, QUOTE_COLOR);
        }

        self.draw_text_centered(
            &mut canvas,
            &format!("{theme} Quote"),
            LABEL_PX,
            cx,
            (CANVAS_HEIGHT - 30) as f32,
            LABEL_COLOR,
        );
        self.draw_text_centered(
            &mut canvas,
            ATTRIBUTION,
            ATTRIBUTION_PX,
            cx,
            (CANVAS_HEIGHT - 10) as f32,
            ATTRIBUTION_COLOR,
        );

        canvas
    }

    fn draw_snapshot(&self, quote: &str, background: Option<&DynamicImage>) -> RgbaImage {
        let width = CARD_WIDTH * SNAPSHOT_SCALE;
        let height = CARD_HEIGHT * SNAPSHOT_SCALE;
        let margin = TEXT_MARGIN * SNAPSHOT_SCALE;
        let mut canvas = compose_background(width, height, background, BackgroundFit::Cover);

        // Fitting runs in unscaled card units; drawing scales up afterwards.
        let scale = SNAPSHOT_SCALE as f32;
        let max_width = (width - 2 * margin) as f32;
        let (px, line_height, lines) = fit_block(
            quote,
            max_width / scale,
            (height - 2 * margin) as f32 / scale,
            |line, size| self.text_width(line, size),
        );
        let px = px * scale;
        let line_height = line_height * scale;

        // The on-screen card keeps its scrim behind the quote block only.
        let block_height = lines.len().saturating_sub(1) as f32 * line_height;
        let first_baseline = (height as f32 - block_height) / 2.0;
        let widest = lines
            .iter()
            .map(|line| self.text_width(line, px))
            .fold(0.0, f32::max);
        let pad = px;
        let cx = width as f32 / 2.0;
        let x0 = (cx - widest / 2.0 - pad).max(0.0) as u32;
        let x1 = (cx + widest / 2.0 + pad).min(width as f32) as u32;
        let y0 = (first_baseline - px - pad / 2.0).max(0.0) as u32;
        let y1 = (first_baseline + block_height + pad).min(height as f32) as u32;
        fill_rect(&mut canvas, x0, y0, x1, y1, SCRIM, SCRIM_OPACITY);

        for (index, line) in lines.iter().enumerate() {
            let baseline = first_baseline + index as f32 * line_height;
            self.draw_text_centered(&mut canvas, line, px, cx, baseline, QUOTE_COLOR);
        }

        canvas
    }

    fn text_width(&self, text: &str, px: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        self.font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .filter_map(|glyph| glyph.pixel_bounding_box())
            .map(|bb| bb.max.x as f32)
            .fold(0.0, f32::max)
    }

    fn draw_text_centered(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        px: f32,
        cx: f32,
        baseline_y: f32,
        color: Rgba<u8>,
    ) {
        let width = self.text_width(text, px);
        self.draw_text(canvas, text, px, cx - width / 2.0, baseline_y, color);
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        px: f32,
        x: f32,
        baseline_y: f32,
        color: Rgba<u8>,
    ) {
        let scale = Scale::uniform(px);
        for glyph in self.font.layout(text, scale, point(x, baseline_y)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let px_x = gx as i32 + bb.min.x;
                    let px_y = gy as i32 + bb.min.y;
                    if px_x < 0 || px_y < 0 {
                        return;
                    }
                    let (px_x, px_y) = (px_x as u32, px_y as u32);
                    if px_x >= canvas.width() || px_y >= canvas.height() {
                        return;
                    }
                    blend_pixel(canvas.get_pixel_mut(px_x, px_y), color, coverage);
                });
            }
        }
    }
}
