//! EPL2 emitter
//!
//! Resident bitmap fonts, Windows-1252 text. EPL has no QR command in the
//! printers we target, and forms are repeated instead of using a copy count.

use tracing::debug;

use super::{
    Bar, BitmapFont, EmitContext, LabelEmitter, RectangleShape, barcode_x, invert_bits,
    layout_text, line_bar, pick_font, rectangle_shape,
};
use crate::barcode::{NARROW_BAR_DOTS, WIDE_BAR_DOTS, estimate_width};
use crate::command::{CommandBuilder, TextEncoding};
use crate::config::PrinterLanguage;
use crate::encoding::escape_quoted;
use crate::error::{LabelError, LabelResult};
use crate::model::{
    BarcodeElement, ImageElement, LineElement, QrCodeElement, RectangleElement, TextElement,
};
use crate::symbology::symbology_code;
use crate::units::Rotation;

/// Font cells (glyph plus inter-character gap) at 203 dpi
static FONTS_203: [BitmapFont; 5] = [
    BitmapFont { id: "1", width: 10, height: 12 },
    BitmapFont { id: "2", width: 12, height: 16 },
    BitmapFont { id: "3", width: 14, height: 20 },
    BitmapFont { id: "4", width: 16, height: 24 },
    BitmapFont { id: "5", width: 34, height: 48 },
];

/// Font cells at 300 dpi
static FONTS_300: [BitmapFont; 5] = [
    BitmapFont { id: "1", width: 14, height: 20 },
    BitmapFont { id: "2", width: 18, height: 28 },
    BitmapFont { id: "3", width: 22, height: 36 },
    BitmapFont { id: "4", width: 26, height: 44 },
    BitmapFont { id: "5", width: 50, height: 80 },
];

/// EPL accepts multipliers 1-9 (horizontal 1-6 on older firmware)
const MAX_MULTIPLIER: i64 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct EplEmitter;

fn rotation_code(rotation: Rotation) -> u8 {
    match rotation {
        Rotation::None => 0,
        Rotation::Cw90 => 1,
        Rotation::Cw180 => 2,
        Rotation::Cw270 => 3,
    }
}

fn fonts(ctx: &EmitContext<'_>) -> &'static [BitmapFont] {
    if ctx.dpi() >= 300 { &FONTS_300 } else { &FONTS_203 }
}

fn bar(out: &mut CommandBuilder, b: &Bar) {
    out.line(&format!(
        "LO{},{},{},{}",
        b.x,
        b.y,
        b.width.max(1),
        b.height.max(1)
    ));
}

impl LabelEmitter for EplEmitter {
    fn language(&self) -> PrinterLanguage {
        PrinterLanguage::Epl
    }

    fn native_copies(&self) -> bool {
        false
    }

    fn builder(&self) -> CommandBuilder {
        CommandBuilder::new(TextEncoding::Cp1252, "\r\n")
    }

    fn header(&self, out: &mut CommandBuilder, ctx: &EmitContext<'_>) {
        // Leading blank line flushes any partial command left in the printer
        out.newline();
        out.line("N");
        out.line("I8,A,001");
        out.line(&format!("q{}", ctx.label_width()));
        out.line(&format!(
            "Q{},{}",
            ctx.label_height(),
            ctx.mm(ctx.config.gap_mm())
        ));
        if let Some(speed) = ctx.config.speed {
            out.line(&format!("S{}", speed.clamp(1, 6)));
        }
        if let Some(darkness) = ctx.config.darkness {
            out.line(&format!("D{}", darkness.min(15)));
        }
    }

    fn text(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &TextElement,
    ) -> LabelResult<()> {
        let choice = pick_font(fonts(ctx), ctx.font(el.font_size), MAX_MULTIPLIER);
        let layout = layout_text(ctx, el, choice.height(), |s| choice.advance(s));
        let rotation = rotation_code(layout.rotation);

        for pass in &layout.passes {
            for line in &layout.lines {
                out.line(&format!(
                    "A{},{},{},{},{},{},N,\"{}\"",
                    line.x + pass,
                    line.y,
                    rotation,
                    choice.font.id,
                    choice.multiplier,
                    choice.multiplier,
                    escape_quoted(line.text)
                ));
            }
        }
        for underline in &layout.underlines {
            bar(out, underline);
        }
        Ok(())
    }

    fn barcode(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &BarcodeElement,
    ) -> LabelResult<()> {
        if el.value.is_empty() {
            debug!(element = %el.base.id, "empty barcode value, skipped");
            return Ok(());
        }
        let frame = ctx.frame(&el.base);
        let x = barcode_x(&frame, el.align, estimate_width(&el.format, &el.value));
        out.line(&format!(
            "B{},{},{},{},{},{},{},{},\"{}\"",
            x,
            frame.y,
            rotation_code(frame.rotation),
            symbology_code(PrinterLanguage::Epl, &el.format),
            NARROW_BAR_DOTS,
            WIDE_BAR_DOTS,
            ctx.px(el.base.height).max(1),
            if el.display_value { 'B' } else { 'N' },
            escape_quoted(&el.value)
        ));
        Ok(())
    }

    fn qr_code(
        &self,
        _out: &mut CommandBuilder,
        _ctx: &EmitContext<'_>,
        el: &QrCodeElement,
    ) -> LabelResult<()> {
        Err(LabelError::UnsupportedElement {
            element_id: el.base.id.clone(),
            element_type: "qrcode",
            language: PrinterLanguage::Epl,
            reason: "EPL2 has no native QR code command".into(),
        })
    }

    fn image(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &ImageElement,
    ) -> LabelResult<()> {
        let Some(bitmap) = &el.bitmap else {
            return Err(LabelError::UnsupportedElement {
                element_id: el.base.id.clone(),
                element_type: "image",
                language: PrinterLanguage::Epl,
                reason: "image is not rasterized to monochrome".into(),
            });
        };
        let rows = bitmap.decode().map_err(|reason| LabelError::InvalidImageData {
            element_id: el.base.id.clone(),
            reason,
        })?;
        if el.opacity <= 0.0 {
            debug!(element = %el.base.id, "transparent image, skipped");
            return Ok(());
        }

        // GW expects 0 = black
        out.text(&format!(
            "GW{},{},{},{},",
            ctx.px(el.base.x),
            ctx.px(el.base.y),
            bitmap.bytes_per_row(),
            bitmap.height
        ));
        out.raw(&invert_bits(&rows));
        out.newline();
        Ok(())
    }

    fn rectangle(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &RectangleElement,
    ) -> LabelResult<()> {
        match rectangle_shape(ctx, el) {
            Some(RectangleShape::Filled(b)) => bar(out, &b),
            Some(RectangleShape::Outline {
                bar: b,
                thickness,
                radius,
            }) => {
                if radius > 0 {
                    debug!(element = %el.base.id, "EPL boxes have square corners");
                }
                out.line(&format!(
                    "X{},{},{},{},{}",
                    b.x,
                    b.y,
                    thickness,
                    b.x + b.width,
                    b.y + b.height
                ));
            }
            None => {}
        }
        Ok(())
    }

    fn line(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &LineElement,
    ) -> LabelResult<()> {
        if let Some(b) = line_bar(ctx, el) {
            bar(out, &b);
        }
        Ok(())
    }

    fn footer(&self, out: &mut CommandBuilder, _ctx: &EmitContext<'_>, copies: u32) {
        out.line(&format!("P{}", copies));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThermalPrintConfig;
    use crate::model::{ElementBase, MonochromeBitmap, TextAlign};
    use crate::symbology::BarcodeFormat;

    fn emit_one<F>(config: &ThermalPrintConfig, f: F) -> Vec<u8>
    where
        F: FnOnce(&EplEmitter, &mut CommandBuilder, &EmitContext<'_>) -> LabelResult<()>,
    {
        let emitter = EplEmitter;
        let ctx = EmitContext::new(PrinterLanguage::Epl, config);
        let mut out = emitter.builder();
        f(&emitter, &mut out, &ctx).unwrap();
        out.build()
    }

    fn config() -> ThermalPrintConfig {
        ThermalPrintConfig::new(PrinterLanguage::Epl, 203, 40.0, 30.0)
    }

    #[test]
    fn test_header() {
        let cfg = config().with_speed(9).with_darkness(20);
        let data = emit_one(&cfg, |e, out, ctx| {
            e.header(out, ctx);
            Ok(())
        });
        assert_eq!(data, b"\r\nN\r\nI8,A,001\r\nq320\r\nQ240,16\r\nS6\r\nD15\r\n".to_vec());
    }

    #[test]
    fn test_text_font_selection_and_encoding() {
        // 10px at 203 dpi = 21 dots, font 3 (20 dots) at 1x
        let mut el = TextElement::new(ElementBase::new("t", 0.0, 0.0, 200.0, 20.0), "Preço \"A\"");
        el.font_size = 10.0;
        let data = emit_one(&config(), |e, out, ctx| e.text(out, ctx, &el));
        assert_eq!(data, b"A0,0,0,3,1,1,N,\"Pre\xE7o \\\"A\\\"\"\r\n".to_vec());
    }

    #[test]
    fn test_text_right_aligned_with_underline() {
        let mut el = TextElement::new(ElementBase::new("t", 0.0, 0.0, 96.0, 20.0), "AB");
        el.font_size = 10.0;
        el.align = TextAlign::Right;
        el.underline = true;
        let data = emit_one(&config(), |e, out, ctx| e.text(out, ctx, &el));
        // box 203 dots, 2 chars * 14 = 28 wide
        assert_eq!(data, b"A175,0,0,3,1,1,N,\"AB\"\r\nLO175,20,28,1\r\n".to_vec());
    }

    #[test]
    fn test_barcode_right_aligned() {
        let mut el = BarcodeElement::new(
            ElementBase::new("b", 0.0, 10.0, 192.0, 48.0),
            BarcodeFormat::Ean8,
            "12345670",
        );
        el.align = TextAlign::Right;
        let data = emit_one(&config(), |e, out, ctx| e.barcode(out, ctx, &el));
        // box 406 dots, EAN8 estimate 134
        assert_eq!(data, b"B272,21,0,E80,2,4,102,B,\"12345670\"\r\n".to_vec());
    }

    #[test]
    fn test_rotated_barcode_keeps_bar_height() {
        let mut el = BarcodeElement::new(
            ElementBase::new("b", 0.0, 0.0, 300.0, 60.0),
            BarcodeFormat::Code128,
            "ABC",
        );
        el.base.rotation = Some(90.0);
        let cfg = ThermalPrintConfig::new(PrinterLanguage::Epl, 96, 40.0, 30.0);
        let data = emit_one(&cfg, |e, out, ctx| e.barcode(out, ctx, &el));
        assert_eq!(data, b"B0,0,1,1,2,4,60,B,\"ABC\"\r\n".to_vec());
    }

    #[test]
    fn test_qr_unsupported() {
        let el = QrCodeElement::new(ElementBase::new("q1", 0.0, 0.0, 50.0, 50.0), "x");
        let ctx_cfg = config();
        let ctx = EmitContext::new(PrinterLanguage::Epl, &ctx_cfg);
        let mut out = EplEmitter.builder();
        match EplEmitter.qr_code(&mut out, &ctx, &el) {
            Err(LabelError::UnsupportedElement {
                element_id,
                element_type,
                language,
                ..
            }) => {
                assert_eq!(element_id, "q1");
                assert_eq!(element_type, "qrcode");
                assert_eq!(language, PrinterLanguage::Epl);
            }
            other => panic!("expected UnsupportedElement, got {:?}", other),
        }
    }

    #[test]
    fn test_image_inverted() {
        let el = ImageElement {
            base: ElementBase::new("i", 0.0, 0.0, 8.0, 1.0),
            src: "logo.png".into(),
            opacity: 1.0,
            fit: Default::default(),
            bitmap: Some(MonochromeBitmap::from_rows(8, 1, &[0xF0])),
        };
        let data = emit_one(&config(), |e, out, ctx| e.image(out, ctx, &el));
        assert_eq!(data, b"GW0,0,1,1,\x0F\r\n".to_vec());
    }

    #[test]
    fn test_outline_box() {
        let mut el = RectangleElement::new(ElementBase::new("r", 0.0, 0.0, 96.0, 48.0));
        el.stroke_width = 2.0;
        let data = emit_one(&config(), |e, out, ctx| e.rectangle(out, ctx, &el));
        assert_eq!(data, b"X0,0,4,203,102\r\n".to_vec());
    }
}
