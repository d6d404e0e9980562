//! TSPL emitter

use tracing::debug;

use super::{
    Bar, BitmapFont, EmitContext, LabelEmitter, RectangleShape, barcode_x, invert_bits,
    layout_text, line_bar, pick_font, rectangle_shape,
};
use crate::barcode::{NARROW_BAR_DOTS, WIDE_BAR_DOTS, estimate_width, qr_magnification};
use crate::command::{CommandBuilder, TextEncoding};
use crate::config::PrinterLanguage;
use crate::encoding::escape_quoted;
use crate::error::{LabelError, LabelResult};
use crate::model::{
    BarcodeElement, ImageElement, LineElement, QrCodeElement, RectangleElement, TextElement,
};
use crate::symbology::symbology_code;

/// Resident fonts in dots
static FONTS: [BitmapFont; 5] = [
    BitmapFont { id: "1", width: 8, height: 12 },
    BitmapFont { id: "2", width: 12, height: 20 },
    BitmapFont { id: "3", width: 16, height: 24 },
    BitmapFont { id: "4", width: 24, height: 32 },
    BitmapFont { id: "5", width: 32, height: 48 },
];

const MAX_MULTIPLIER: i64 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct TsplEmitter;

/// Millimeters with at most two decimals, no trailing zeros
fn format_mm(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn bar(out: &mut CommandBuilder, b: &Bar) {
    out.line(&format!(
        "BAR {},{},{},{}",
        b.x,
        b.y,
        b.width.max(1),
        b.height.max(1)
    ));
}

impl LabelEmitter for TsplEmitter {
    fn language(&self) -> PrinterLanguage {
        PrinterLanguage::Tspl
    }

    fn native_copies(&self) -> bool {
        true
    }

    fn builder(&self) -> CommandBuilder {
        CommandBuilder::new(TextEncoding::Cp1252, "\r\n")
    }

    fn header(&self, out: &mut CommandBuilder, ctx: &EmitContext<'_>) {
        out.line(&format!(
            "SIZE {} mm,{} mm",
            format_mm(ctx.config.label_width),
            format_mm(ctx.config.label_height)
        ));
        out.line(&format!("GAP {} mm,0 mm", format_mm(ctx.config.gap_mm())));
        out.line("DIRECTION 1");
        out.line("REFERENCE 0,0");
        if let Some(speed) = ctx.config.speed {
            out.line(&format!("SPEED {}", speed.clamp(1, 10)));
        }
        if let Some(darkness) = ctx.config.darkness {
            out.line(&format!("DENSITY {}", darkness.min(15)));
        }
        out.line("CODEPAGE 1252");
        out.line("CLS");
    }

    fn text(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &TextElement,
    ) -> LabelResult<()> {
        let choice = pick_font(&FONTS, ctx.font(el.font_size), MAX_MULTIPLIER);
        let layout = layout_text(ctx, el, choice.height(), |s| choice.advance(s));

        for pass in &layout.passes {
            for line in &layout.lines {
                out.line(&format!(
                    "TEXT {},{},\"{}\",{},{},{},\"{}\"",
                    line.x + pass,
                    line.y,
                    choice.font.id,
                    layout.rotation.degrees(),
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
            "BARCODE {},{},\"{}\",{},{},{},{},{},\"{}\"",
            x,
            frame.y,
            symbology_code(PrinterLanguage::Tspl, &el.format),
            ctx.px(el.base.height).max(1),
            u8::from(el.display_value),
            frame.rotation.degrees(),
            NARROW_BAR_DOTS,
            WIDE_BAR_DOTS,
            escape_quoted(&el.value)
        ));
        Ok(())
    }

    fn qr_code(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &QrCodeElement,
    ) -> LabelResult<()> {
        if el.value.is_empty() {
            debug!(element = %el.base.id, "empty qr value, skipped");
            return Ok(());
        }
        let frame = ctx.frame(&el.base);
        let cell = qr_magnification(
            frame.width.min(frame.height),
            el.value.len(),
            el.error_correction,
        );
        out.line(&format!(
            "QRCODE {},{},{},{},A,{},\"{}\"",
            frame.x,
            frame.y,
            el.error_correction.as_char(),
            cell,
            frame.rotation.degrees(),
            escape_quoted(&el.value)
        ));
        Ok(())
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
                language: PrinterLanguage::Tspl,
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

        // BITMAP mode 0 (overwrite), 0 = black
        out.text(&format!(
            "BITMAP {},{},{},{},0,",
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
                let mut cmd = format!(
                    "BOX {},{},{},{},{}",
                    b.x,
                    b.y,
                    b.x + b.width,
                    b.y + b.height,
                    thickness
                );
                if radius > 0 {
                    cmd.push_str(&format!(",{}", radius));
                }
                out.line(&cmd);
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
        out.line(&format!("PRINT 1,{}", copies));
    }
}
