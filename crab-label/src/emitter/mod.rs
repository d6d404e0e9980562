//! Per-language label emitters
//!
//! Each emitter implements `LabelEmitter` and serializes one element kind per
//! method. `Emitter` is the closed set selected by the print config; the
//! element match in [`Emitter::emit`] is the only place that walks a template.

use enum_dispatch::enum_dispatch;
use tracing::debug;

use crate::command::CommandBuilder;
use crate::config::{PrinterLanguage, ThermalPrintConfig};
use crate::error::LabelResult;
use crate::model::{
    BarcodeElement, ElementBase, ImageElement, LabelElement, LabelTemplate, LineElement,
    QrCodeElement, RectangleElement, TextAlign, TextElement,
};
use crate::units::{Rotation, font_size_to_dots, px_to_dots, to_dots};

mod epl;
mod tspl;
mod zpl;

pub use epl::EplEmitter;
pub use tspl::TsplEmitter;
pub use zpl::ZplEmitter;

/// Line pitch relative to font height for multi-line text
const LINE_PITCH: f64 = 1.2;

/// Serialization rules for one printer language
#[enum_dispatch]
pub trait LabelEmitter {
    fn language(&self) -> PrinterLanguage;

    /// Whether the footer can request N copies itself
    fn native_copies(&self) -> bool;

    fn builder(&self) -> CommandBuilder;

    fn header(&self, out: &mut CommandBuilder, ctx: &EmitContext<'_>);

    fn text(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &TextElement,
    ) -> LabelResult<()>;

    fn barcode(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &BarcodeElement,
    ) -> LabelResult<()>;

    fn qr_code(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &QrCodeElement,
    ) -> LabelResult<()>;

    fn image(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &ImageElement,
    ) -> LabelResult<()>;

    fn rectangle(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &RectangleElement,
    ) -> LabelResult<()>;

    fn line(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &LineElement,
    ) -> LabelResult<()>;

    /// Close the form, requesting `copies` when the language supports it
    fn footer(&self, out: &mut CommandBuilder, ctx: &EmitContext<'_>, copies: u32);
}

/// The supported emitters, one per printer language
#[enum_dispatch(LabelEmitter)]
#[derive(Debug, Clone, Copy)]
pub enum Emitter {
    Zpl(ZplEmitter),
    Epl(EplEmitter),
    Tspl(TsplEmitter),
}

impl From<PrinterLanguage> for Emitter {
    fn from(language: PrinterLanguage) -> Self {
        match language {
            PrinterLanguage::Zpl => Emitter::Zpl(ZplEmitter),
            PrinterLanguage::Epl => Emitter::Epl(EplEmitter),
            PrinterLanguage::Tspl => Emitter::Tspl(TsplEmitter),
        }
    }
}

impl Emitter {
    /// Serialize `template` into a complete command stream, copies included
    pub fn emit(
        &self,
        template: &LabelTemplate,
        config: &ThermalPrintConfig,
    ) -> LabelResult<Vec<u8>> {
        let ctx = EmitContext::new(self.language(), config);
        let copies = config.copies().max(1);

        if self.native_copies() {
            return self.emit_form(template, &ctx, copies);
        }

        let form = self.emit_form(template, &ctx, 1)?;
        let mut buf = Vec::with_capacity(form.len() * copies as usize);
        for _ in 0..copies {
            buf.extend_from_slice(&form);
        }
        Ok(buf)
    }

    fn emit_form(
        &self,
        template: &LabelTemplate,
        ctx: &EmitContext<'_>,
        copies: u32,
    ) -> LabelResult<Vec<u8>> {
        let mut out = self.builder();
        self.header(&mut out, ctx);
        for element in template.ordered_elements() {
            match element {
                LabelElement::Text(el) => self.text(&mut out, ctx, el)?,
                LabelElement::Barcode(el) => self.barcode(&mut out, ctx, el)?,
                LabelElement::QrCode(el) => self.qr_code(&mut out, ctx, el)?,
                LabelElement::Image(el) => self.image(&mut out, ctx, el)?,
                LabelElement::Rectangle(el) => self.rectangle(&mut out, ctx, el)?,
                LabelElement::Line(el) => self.line(&mut out, ctx, el)?,
            }
        }
        self.footer(&mut out, ctx, copies);
        Ok(out.build())
    }
}

/// Per-call conversion context handed to every emitter method
pub struct EmitContext<'a> {
    pub language: PrinterLanguage,
    pub config: &'a ThermalPrintConfig,
}

impl<'a> EmitContext<'a> {
    pub fn new(language: PrinterLanguage, config: &'a ThermalPrintConfig) -> Self {
        Self { language, config }
    }

    pub fn dpi(&self) -> u32 {
        self.config.dpi
    }

    pub fn px(&self, value: f64) -> i64 {
        px_to_dots(value, self.config.dpi)
    }

    pub fn mm(&self, value: f64) -> i64 {
        to_dots(value, self.config.dpi)
    }

    pub fn font(&self, size_px: f64) -> i64 {
        font_size_to_dots(size_px, self.config.dpi).max(1)
    }

    pub fn label_width(&self) -> i64 {
        self.mm(self.config.label_width)
    }

    pub fn label_height(&self) -> i64 {
        self.mm(self.config.label_height)
    }

    /// Horizontal shift of the second bold pass
    pub fn bold_offset(&self) -> i64 {
        self.px(1.0).max(1)
    }

    /// Element box in dots, width and height swapped for quarter turns
    pub fn frame(&self, base: &ElementBase) -> Frame {
        let rotation = Rotation::from_degrees(base.rotation);
        let (w, h) = (self.px(base.width), self.px(base.height));
        let (width, height) = if rotation.is_sideways() { (h, w) } else { (w, h) };
        Frame {
            x: self.px(base.x),
            y: self.px(base.y),
            width,
            height,
            rotation,
        }
    }
}

/// Element placement in printer dots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub rotation: Rotation,
}

/// Solid rectangle in dots (underlines, filled shapes, lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// One positioned line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine<'a> {
    pub text: &'a str,
    pub x: i64,
    pub y: i64,
}

/// Text element resolved into printable lines and decorations
#[derive(Debug, Clone)]
pub struct TextLayout<'a> {
    pub lines: Vec<PlacedLine<'a>>,
    pub rotation: Rotation,
    /// X offsets of each pass; two passes when bold
    pub passes: Vec<i64>,
    pub underlines: Vec<Bar>,
}

/// Start-of-box offset that aligns `content` inside `available`
pub fn align_offset(align: TextAlign, available: i64, content: i64) -> i64 {
    let offset = match align {
        TextAlign::Left => 0,
        TextAlign::Center => (available - content) / 2,
        TextAlign::Right => available - content,
    };
    offset.max(0)
}

/// Lay out a text element given its font height and a width measure
///
/// `measure` returns the printed width of a line in dots. Alignment applies to
/// unrotated text only; rotated lines stack along the rotated axis.
pub fn layout_text<'a>(
    ctx: &EmitContext<'_>,
    el: &'a TextElement,
    font_height: i64,
    measure: impl Fn(&str) -> i64,
) -> TextLayout<'a> {
    let frame = ctx.frame(&el.base);
    let pitch = (font_height as f64 * LINE_PITCH).round() as i64;
    let (dx, dy) = match frame.rotation {
        Rotation::None => (0, pitch),
        Rotation::Cw90 => (-pitch, 0),
        Rotation::Cw180 => (0, -pitch),
        Rotation::Cw270 => (pitch, 0),
    };

    if el.italic {
        debug!(element = %el.base.id, language = %ctx.language, "italic has no thermal font, ignored");
    }

    let mut lines = Vec::new();
    let mut underlines = Vec::new();
    let thickness = (font_height / 12).max(1);

    for (i, text) in el.content.lines().enumerate() {
        let i = i as i64;
        if text.is_empty() {
            continue;
        }
        let width = measure(text);
        let x = match frame.rotation {
            Rotation::None => frame.x + align_offset(el.align, frame.width, width),
            _ => frame.x,
        } + dx * i;
        let y = frame.y + dy * i;

        if el.underline {
            if frame.rotation == Rotation::None {
                underlines.push(Bar {
                    x,
                    y: y + font_height,
                    width,
                    height: thickness,
                });
            } else {
                debug!(element = %el.base.id, "underline on rotated text ignored");
            }
        }
        lines.push(PlacedLine { text, x, y });
    }

    let passes = if el.is_bold() {
        vec![0, ctx.bold_offset()]
    } else {
        vec![0]
    };

    TextLayout {
        lines,
        rotation: frame.rotation,
        passes,
        underlines,
    }
}

/// X coordinate of a 1-D barcode aligned inside its box by estimated width
pub fn barcode_x(frame: &Frame, align: TextAlign, estimated: i64) -> i64 {
    match frame.rotation {
        Rotation::None => frame.x + align_offset(align, frame.width, estimated),
        _ => frame.x,
    }
}

/// Stroke thickness in dots, `None` for an invisible stroke
pub fn stroke_dots(ctx: &EmitContext<'_>, stroke_width: f64, color: Option<&str>) -> Option<i64> {
    if !(stroke_width.is_finite() && stroke_width > 0.0) {
        return None;
    }
    if color.is_some_and(|c| !is_ink(c)) {
        return None;
    }
    Some(ctx.px(stroke_width).max(1))
}

/// Whether a color prints on monochrome stock
pub fn is_ink(color: &str) -> bool {
    let c: String = color
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    !matches!(
        c.as_str(),
        "" | "none"
            | "transparent"
            | "white"
            | "#fff"
            | "#ffff"
            | "#ffffff"
            | "#ffffffff"
            | "rgb(255,255,255)"
            | "rgba(255,255,255,1)"
    ) && !(c.starts_with("rgba(") && c.ends_with(",0)"))
}

/// A line element reduced to a single bar
pub fn line_bar(ctx: &EmitContext<'_>, el: &LineElement) -> Option<Bar> {
    let thickness = stroke_dots(ctx, el.stroke_width, el.stroke_color.as_deref())?;
    let frame = ctx.frame(&el.base);
    let bar = if frame.width >= frame.height {
        Bar {
            x: frame.x,
            y: frame.y,
            width: frame.width.max(1),
            height: thickness,
        }
    } else {
        Bar {
            x: frame.x,
            y: frame.y,
            width: thickness,
            height: frame.height.max(1),
        }
    };
    Some(bar)
}

/// How a rectangle element is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectangleShape {
    Filled(Bar),
    Outline {
        bar: Bar,
        thickness: i64,
        radius: i64,
    },
}

/// Resolve a rectangle into a fill or an outline; `None` when nothing prints
pub fn rectangle_shape(ctx: &EmitContext<'_>, el: &RectangleElement) -> Option<RectangleShape> {
    let frame = ctx.frame(&el.base);
    let bar = Bar {
        x: frame.x,
        y: frame.y,
        width: frame.width,
        height: frame.height,
    };
    if el.fill_color.as_deref().is_some_and(is_ink) {
        return Some(RectangleShape::Filled(bar));
    }
    match stroke_dots(ctx, el.stroke_width, el.stroke_color.as_deref()) {
        Some(thickness) => Some(RectangleShape::Outline {
            bar,
            thickness,
            radius: ctx.px(el.corner_radius.max(0.0)),
        }),
        None => {
            debug!(element = %el.base.id, "rectangle has no fill or stroke, skipped");
            None
        }
    }
}

/// Pack rows with bits flipped (languages where 0 prints black)
pub fn invert_bits(rows: &[u8]) -> Vec<u8> {
    rows.iter().map(|b| !b).collect()
}

/// Resident bitmap font cell in dots
#[derive(Debug, PartialEq, Eq)]
pub struct BitmapFont {
    pub id: &'static str,
    pub width: i64,
    pub height: i64,
}

/// Chosen resident font and integer magnification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontChoice {
    pub font: &'static BitmapFont,
    pub multiplier: i64,
}

impl FontChoice {
    pub fn advance(&self, text: &str) -> i64 {
        text.chars().count() as i64 * self.font.width * self.multiplier
    }

    pub fn height(&self) -> i64 {
        self.font.height * self.multiplier
    }
}

/// Largest font not taller than `target`, magnified when the target exceeds the table
///
/// `table` is sorted by ascending height and never empty.
pub fn pick_font(table: &'static [BitmapFont], target: i64, max_multiplier: i64) -> FontChoice {
    let font = table
        .iter()
        .rev()
        .find(|f| f.height <= target)
        .unwrap_or(&table[0]);
    let multiplier = if target > font.height {
        (target as f64 / font.height as f64).round() as i64
    } else {
        1
    };
    FontChoice {
        font,
        multiplier: multiplier.clamp(1, max_multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FONTS: [BitmapFont; 2] = [
        BitmapFont { id: "1", width: 8, height: 12 },
        BitmapFont { id: "2", width: 16, height: 24 },
    ];

    #[test]
    fn test_align_offset() {
        assert_eq!(align_offset(TextAlign::Left, 100, 40), 0);
        assert_eq!(align_offset(TextAlign::Center, 100, 40), 30);
        assert_eq!(align_offset(TextAlign::Right, 100, 40), 60);
        assert_eq!(align_offset(TextAlign::Right, 100, 140), 0);
    }

    #[test]
    fn test_pick_font() {
        let c = pick_font(&FONTS, 10, 9);
        assert_eq!((c.font.id, c.multiplier), ("1", 1));
        let c = pick_font(&FONTS, 20, 9);
        assert_eq!((c.font.id, c.multiplier), ("1", 2));
        let c = pick_font(&FONTS, 24, 9);
        assert_eq!((c.font.id, c.multiplier), ("2", 1));
        let c = pick_font(&FONTS, 500, 9);
        assert_eq!((c.font.id, c.multiplier), ("2", 9));
        assert_eq!(c.advance("ab"), 2 * 16 * 9);
    }

    #[test]
    fn test_is_ink() {
        assert!(is_ink("#000"));
        assert!(is_ink("black"));
        assert!(is_ink("#ff0000"));
        assert!(!is_ink("transparent"));
        assert!(!is_ink("#FFFFFF"));
        assert!(!is_ink("rgba(0, 0, 0, 0)"));
        assert!(!is_ink(""));
    }

    #[test]
    fn test_layout_text_alignment_and_lines() {
        let config = ThermalPrintConfig::new(PrinterLanguage::Zpl, 96, 40.0, 30.0);
        let ctx = EmitContext::new(PrinterLanguage::Zpl, &config);
        let mut el = TextElement::new(ElementBase::new("t", 10.0, 20.0, 100.0, 40.0), "ab\ncdef");
        el.align = TextAlign::Right;
        el.underline = true;
        el.bold = true;

        let layout = layout_text(&ctx, &el, 10, |s| s.len() as i64 * 10);
        assert_eq!(
            layout.lines,
            vec![
                PlacedLine { text: "ab", x: 90, y: 20 },
                PlacedLine { text: "cdef", x: 70, y: 32 },
            ]
        );
        assert_eq!(layout.passes, vec![0, 1]);
        assert_eq!(
            layout.underlines[1],
            Bar { x: 70, y: 42, width: 40, height: 1 }
        );
    }

    #[test]
    fn test_layout_rotated_text_ignores_alignment() {
        let config = ThermalPrintConfig::new(PrinterLanguage::Zpl, 96, 40.0, 30.0);
        let ctx = EmitContext::new(PrinterLanguage::Zpl, &config);
        let mut el = TextElement::new(ElementBase::new("t", 50.0, 0.0, 100.0, 40.0), "a\nb");
        el.align = TextAlign::Center;
        el.base.rotation = Some(90.0);

        let layout = layout_text(&ctx, &el, 10, |s| s.len() as i64 * 10);
        assert_eq!(layout.rotation, Rotation::Cw90);
        assert_eq!(layout.lines[0].x, 50);
        assert_eq!(layout.lines[1].x, 38);
    }

    #[test]
    fn test_line_orientation() {
        let config = ThermalPrintConfig::new(PrinterLanguage::Epl, 96, 40.0, 30.0);
        let ctx = EmitContext::new(PrinterLanguage::Epl, &config);
        let mut el = LineElement::new(ElementBase::new("l", 5.0, 5.0, 80.0, 2.0));
        el.stroke_width = 3.0;
        assert_eq!(
            line_bar(&ctx, &el),
            Some(Bar { x: 5, y: 5, width: 80, height: 3 })
        );

        el.base.rotation = Some(90.0);
        assert_eq!(
            line_bar(&ctx, &el),
            Some(Bar { x: 5, y: 5, width: 3, height: 80 })
        );

        el.stroke_width = 0.0;
        assert_eq!(line_bar(&ctx, &el), None);
    }

    #[test]
    fn test_rectangle_shape() {
        let config = ThermalPrintConfig::new(PrinterLanguage::Tspl, 96, 40.0, 30.0);
        let ctx = EmitContext::new(PrinterLanguage::Tspl, &config);
        let mut el = RectangleElement::new(ElementBase::new("r", 0.0, 0.0, 50.0, 20.0));
        assert!(matches!(
            rectangle_shape(&ctx, &el),
            Some(RectangleShape::Outline { thickness: 1, .. })
        ));
        el.fill_color = Some("#000000".into());
        assert!(matches!(rectangle_shape(&ctx, &el), Some(RectangleShape::Filled(_))));
        el.fill_color = Some("white".into());
        el.stroke_width = 0.0;
        assert_eq!(rectangle_shape(&ctx, &el), None);
    }
}
