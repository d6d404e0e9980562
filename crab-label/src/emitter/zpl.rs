//! ZPL emitter
//!
//! One `^XA ... ^XZ` form. Text uses scalable font `0` with UTF-8 field data;
//! copies are requested with `^PQ`.

use std::fmt::Write as _;

use tracing::debug;

use super::{
    Bar, EmitContext, LabelEmitter, RectangleShape, barcode_x, layout_text, line_bar,
    rectangle_shape,
};
use crate::barcode::{NARROW_BAR_DOTS, estimate_width, qr_magnification};
use crate::command::{CommandBuilder, TextEncoding};
use crate::config::PrinterLanguage;
use crate::encoding::{char_count, escape_zpl};
use crate::error::{LabelError, LabelResult};
use crate::model::{
    BarcodeElement, ImageElement, LineElement, QrCodeElement, RectangleElement, TextElement,
};
use crate::symbology::symbology_code;
use crate::units::Rotation;

/// Average glyph advance of font 0 relative to its height
const FONT0_ADVANCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, Default)]
pub struct ZplEmitter;

fn orientation(rotation: Rotation) -> char {
    match rotation {
        Rotation::None => 'N',
        Rotation::Cw90 => 'R',
        Rotation::Cw180 => 'I',
        Rotation::Cw270 => 'B',
    }
}

/// `^FD` field with `^FH` escaping when needed
fn field_data(value: &str) -> String {
    match escape_zpl(value) {
        Some(escaped) => format!("^FH^FD{}^FS", escaped),
        None => format!("^FD{}^FS", value),
    }
}

fn bar(out: &mut CommandBuilder, b: &Bar) {
    let thickness = b.width.min(b.height).max(1);
    out.line(&format!(
        "^FO{},{}^GB{},{},{}^FS",
        b.x,
        b.y,
        b.width.max(1),
        b.height.max(1),
        thickness
    ));
}

impl LabelEmitter for ZplEmitter {
    fn language(&self) -> PrinterLanguage {
        PrinterLanguage::Zpl
    }

    fn native_copies(&self) -> bool {
        true
    }

    fn builder(&self) -> CommandBuilder {
        CommandBuilder::new(TextEncoding::Utf8, "\n")
    }

    fn header(&self, out: &mut CommandBuilder, ctx: &EmitContext<'_>) {
        out.line("^XA");
        out.line("^CI28");
        out.line(&format!("^PW{}", ctx.label_width()));
        out.line(&format!("^LL{}", ctx.label_height()));
        out.line("^LH0,0");
        if let Some(speed) = ctx.config.speed {
            out.line(&format!("^PR{}", speed.clamp(1, 14)));
        }
        if let Some(darkness) = ctx.config.darkness {
            out.line(&format!("~SD{:02}", darkness.min(30)));
        }
    }

    fn text(
        &self,
        out: &mut CommandBuilder,
        ctx: &EmitContext<'_>,
        el: &TextElement,
    ) -> LabelResult<()> {
        let height = ctx.font(el.font_size);
        let layout = layout_text(ctx, el, height, |s| {
            (char_count(s) as f64 * height as f64 * FONT0_ADVANCE).round() as i64
        });
        let o = orientation(layout.rotation);

        for pass in &layout.passes {
            for line in &layout.lines {
                out.line(&format!(
                    "^FO{},{}^A0{},{},{}{}",
                    line.x + pass,
                    line.y,
                    o,
                    height,
                    height,
                    field_data(line.text)
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
        let command = symbology_code(PrinterLanguage::Zpl, &el.format);
        let x = barcode_x(&frame, el.align, estimate_width(&el.format, &el.value));
        let o = orientation(frame.rotation);
        let hri = if el.display_value { 'Y' } else { 'N' };
        // Bar height runs along the bars, unaffected by rotation
        let height = ctx.px(el.base.height).max(1);

        // ^B3 and ^BM take a check-digit flag before the height
        let params = match command {
            "^B3" => format!("{}{},N,{},{},N", command, o, height, hri),
            "^BM" => format!("{}{},A,{},{},N", command, o, height, hri),
            _ => format!("{}{},{},{},N", command, o, height, hri),
        };
        out.line(&format!(
            "^FO{},{}^BY{}{}{}",
            x,
            frame.y,
            NARROW_BAR_DOTS,
            params,
            field_data(&el.value)
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
        let magnification = qr_magnification(
            frame.width.min(frame.height),
            el.value.len(),
            el.error_correction,
        );
        let data = format!("{}A,{}", el.error_correction.as_char(), el.value);
        out.line(&format!(
            "^FO{},{}^BQN,2,{}{}",
            frame.x,
            frame.y,
            magnification,
            field_data(&data)
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
                language: PrinterLanguage::Zpl,
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

        let mut hex = String::with_capacity(rows.len() * 2);
        for byte in &rows {
            let _ = write!(hex, "{:02X}", byte);
        }
        out.line(&format!(
            "^FO{},{}^GFA,{},{},{},{}^FS",
            ctx.px(el.base.x),
            ctx.px(el.base.y),
            rows.len(),
            rows.len(),
            bitmap.bytes_per_row(),
            hex
        ));
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
                let shorter = b.width.min(b.height).max(1);
                let rounding = (radius * 16 + shorter / 2) / shorter;
                out.line(&format!(
                    "^FO{},{}^GB{},{},{},B,{}^FS",
                    b.x,
                    b.y,
                    b.width.max(thickness),
                    b.height.max(thickness),
                    thickness,
                    rounding.clamp(0, 8)
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
        out.line(&format!("^PQ{}", copies));
        out.line("^XZ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThermalPrintConfig;
    use crate::model::{ElementBase, MonochromeBitmap, TextAlign};
    use crate::symbology::BarcodeFormat;

    fn emit_one<F>(config: &ThermalPrintConfig, f: F) -> String
    where
        F: FnOnce(&ZplEmitter, &mut CommandBuilder, &EmitContext<'_>) -> LabelResult<()>,
    {
        let emitter = ZplEmitter;
        let ctx = EmitContext::new(PrinterLanguage::Zpl, config);
        let mut out = emitter.builder();
        f(&emitter, &mut out, &ctx).unwrap();
        String::from_utf8(out.build()).unwrap()
    }

    fn reference_config() -> ThermalPrintConfig {
        ThermalPrintConfig::new(PrinterLanguage::Zpl, 96, 40.0, 30.0)
    }

    #[test]
    fn test_header_with_speed_and_darkness() {
        let config = ThermalPrintConfig::default().with_speed(4).with_darkness(8);
        let s = emit_one(&config, |e, out, ctx| {
            e.header(out, ctx);
            Ok(())
        });
        assert_eq!(s, "^XA\n^CI28\n^PW320\n^LL240\n^LH0,0\n^PR4\n~SD08\n");
    }

    #[test]
    fn test_text_bold_escaped() {
        let mut el = TextElement::new(ElementBase::new("t", 10.0, 20.0, 200.0, 30.0), "a^b");
        el.font_size = 20.0;
        el.bold = true;
        let s = emit_one(&reference_config(), |e, out, ctx| e.text(out, ctx, &el));
        assert_eq!(
            s,
            "^FO10,20^A0N,20,20^FH^FDa_5Eb^FS\n^FO11,20^A0N,20,20^FH^FDa_5Eb^FS\n"
        );
    }

    #[test]
    fn test_text_centered() {
        let mut el = TextElement::new(ElementBase::new("t", 0.0, 0.0, 100.0, 20.0), "abcd");
        el.font_size = 10.0;
        el.align = TextAlign::Center;
        let s = emit_one(&reference_config(), |e, out, ctx| e.text(out, ctx, &el));
        // 4 chars * 10 * 0.6 = 24 dots wide
        assert_eq!(s, "^FO38,0^A0N,10,10^FDabcd^FS\n");
    }

    #[test]
    fn test_barcode_centered_by_estimate() {
        let mut el = BarcodeElement::new(
            ElementBase::new("b", 0.0, 50.0, 300.0, 60.0),
            BarcodeFormat::Ean13,
            "7891234567890",
        );
        el.align = TextAlign::Center;
        let s = emit_one(&reference_config(), |e, out, ctx| e.barcode(out, ctx, &el));
        assert_eq!(s, "^FO55,50^BY2^BEN,60,Y,N^FD7891234567890^FS\n");
    }

    #[test]
    fn test_code39_parameter_order() {
        let mut el = BarcodeElement::new(
            ElementBase::new("b", 0.0, 0.0, 300.0, 40.0),
            BarcodeFormat::Code39,
            "AB12",
        );
        el.display_value = false;
        let s = emit_one(&reference_config(), |e, out, ctx| e.barcode(out, ctx, &el));
        assert_eq!(s, "^FO0,0^BY2^B3N,N,40,N,N^FDAB12^FS\n");
    }

    #[test]
    fn test_msi_check_digit_mode() {
        let el = BarcodeElement::new(
            ElementBase::new("b", 0.0, 0.0, 300.0, 40.0),
            BarcodeFormat::Msi,
            "1234",
        );
        let s = emit_one(&reference_config(), |e, out, ctx| e.barcode(out, ctx, &el));
        assert_eq!(s, "^FO0,0^BY2^BMN,A,40,Y,N^FD1234^FS\n");
    }

    #[test]
    fn test_rotated_barcode_keeps_bar_height() {
        let mut el = BarcodeElement::new(
            ElementBase::new("b", 0.0, 0.0, 300.0, 60.0),
            BarcodeFormat::Code128,
            "ABC",
        );
        el.base.rotation = Some(90.0);
        let s = emit_one(&reference_config(), |e, out, ctx| e.barcode(out, ctx, &el));
        assert_eq!(s, "^FO0,0^BY2^BCR,60,Y,N^FDABC^FS\n");
    }

    #[test]
    fn test_qr_code() {
        let el = QrCodeElement::new(ElementBase::new("q", 5.0, 5.0, 84.0, 84.0), "hello");
        let s = emit_one(&reference_config(), |e, out, ctx| e.qr_code(out, ctx, &el));
        assert_eq!(s, "^FO5,5^BQN,2,4^FDMA,hello^FS\n");
    }

    #[test]
    fn test_image_hex() {
        let el = ImageElement {
            base: ElementBase::new("i", 2.0, 3.0, 16.0, 2.0),
            src: String::new(),
            opacity: 1.0,
            fit: Default::default(),
            bitmap: Some(MonochromeBitmap::from_rows(16, 2, &[0xF0, 0x0F, 0x00, 0xFF])),
        };
        let s = emit_one(&reference_config(), |e, out, ctx| e.image(out, ctx, &el));
        assert_eq!(s, "^FO2,3^GFA,4,4,2,F00F00FF^FS\n");
    }

    #[test]
    fn test_rounded_outline() {
        let mut el = RectangleElement::new(ElementBase::new("r", 0.0, 0.0, 40.0, 20.0));
        el.stroke_width = 2.0;
        el.corner_radius = 5.0;
        let s = emit_one(&reference_config(), |e, out, ctx| e.rectangle(out, ctx, &el));
        assert_eq!(s, "^FO0,0^GB40,20,2,B,4^FS\n");
    }
}
