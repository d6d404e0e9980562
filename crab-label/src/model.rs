//! Label Template Model
//!
//! Everything here is expressed in the editor's reference pixel unit
//! (96 per inch) except `LabelConfig`, which carries its own unit.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::symbology::BarcodeFormat;

/// Unit of measure for label dimensions
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Mm,
    Px,
    In,
}

/// Horizontal alignment inside an element's box
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// QR error-correction level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn as_char(self) -> char {
        match self {
            ErrorCorrection::L => 'L',
            ErrorCorrection::M => 'M',
            ErrorCorrection::Q => 'Q',
            ErrorCorrection::H => 'H',
        }
    }
}

/// How an image fills its box in the editor
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Contain,
    Cover,
    Fill,
}

/// Geometry shared by every element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees in [0, 360)
    #[serde(default)]
    pub rotation: Option<f64>,
    /// Stacking order, lower is drawn first
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub locked: bool,
}

impl ElementBase {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            rotation: None,
            z_index: 0,
            locked: false,
        }
    }

    fn validate(&self) -> LabelResult<()> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(LabelError::InvalidElement {
                    element_id: self.id.clone(),
                    reason: format!("{} must be a finite non-negative number, got {}", name, value),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(flatten)]
    pub base: ElementBase,
    pub content: String,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// CSS-like weight: "normal", "bold" or a numeric weight
    #[serde(default)]
    pub font_weight: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "textAlign")]
    pub align: TextAlign,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

impl TextElement {
    pub fn new(base: ElementBase, content: impl Into<String>) -> Self {
        Self {
            base,
            content: content.into(),
            font_family: None,
            font_size: default_font_size(),
            font_weight: None,
            color: None,
            align: TextAlign::Left,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn is_bold(&self) -> bool {
        if self.bold {
            return true;
        }
        match self.font_weight.as_deref().map(str::trim) {
            Some(w) if w.eq_ignore_ascii_case("bold") || w.eq_ignore_ascii_case("bolder") => true,
            Some(w) => w.parse::<u16>().is_ok_and(|n| n >= 600),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeElement {
    #[serde(flatten)]
    pub base: ElementBase,
    pub value: String,
    #[serde(default)]
    pub format: BarcodeFormat,
    /// Print human-readable text beneath the symbol
    #[serde(default = "default_true")]
    pub display_value: bool,
    #[serde(default)]
    pub align: TextAlign,
}

impl BarcodeElement {
    pub fn new(base: ElementBase, format: BarcodeFormat, value: impl Into<String>) -> Self {
        Self {
            base,
            value: value.into(),
            format,
            display_value: true,
            align: TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeElement {
    #[serde(flatten)]
    pub base: ElementBase,
    pub value: String,
    #[serde(default)]
    pub foreground_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub error_correction: ErrorCorrection,
}

impl QrCodeElement {
    pub fn new(base: ElementBase, value: impl Into<String>) -> Self {
        Self {
            base,
            value: value.into(),
            foreground_color: None,
            background_color: None,
            error_correction: ErrorCorrection::M,
        }
    }
}

/// Pre-rasterized 1-bit image, rows packed MSB first, 1 = black
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonochromeBitmap {
    /// Width in printer dots
    pub width: u32,
    /// Height in printer dots
    pub height: u32,
    /// Base64 of the packed rows
    pub data: String,
}

impl MonochromeBitmap {
    pub fn from_rows(width: u32, height: u32, rows: &[u8]) -> Self {
        Self {
            width,
            height,
            data: base64::engine::general_purpose::STANDARD.encode(rows),
        }
    }

    pub fn bytes_per_row(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    /// Decode the payload and check it covers exactly `bytes_per_row * height` bytes
    pub fn decode(&self) -> Result<Vec<u8>, String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| format!("base64 decode failed: {}", e))?;
        let expected = self.bytes_per_row() * self.height as usize;
        if bytes.len() != expected {
            return Err(format!(
                "expected {} bytes for {}x{} bitmap, got {}",
                expected,
                self.width,
                self.height,
                bytes.len()
            ));
        }
        Ok(bytes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    #[serde(flatten)]
    pub base: ElementBase,
    /// Editor-side source reference (URL or data URI)
    #[serde(default)]
    pub src: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub fit: ImageFit,
    /// Monochrome data prepared by the rasterizer; required for printing
    #[serde(default)]
    pub bitmap: Option<MonochromeBitmap>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RectangleElement {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_color: Option<String>,
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub corner_radius: f64,
}

impl RectangleElement {
    pub fn new(base: ElementBase) -> Self {
        Self {
            base,
            stroke_width: default_stroke_width(),
            stroke_color: None,
            fill_color: None,
            corner_radius: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_color: Option<String>,
}

impl LineElement {
    pub fn new(base: ElementBase) -> Self {
        Self {
            base,
            stroke_width: default_stroke_width(),
            stroke_color: None,
        }
    }
}

/// One drawable item on a label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LabelElement {
    Text(TextElement),
    Barcode(BarcodeElement),
    QrCode(QrCodeElement),
    Image(ImageElement),
    Rectangle(RectangleElement),
    Line(LineElement),
}

impl LabelElement {
    pub fn base(&self) -> &ElementBase {
        match self {
            LabelElement::Text(e) => &e.base,
            LabelElement::Barcode(e) => &e.base,
            LabelElement::QrCode(e) => &e.base,
            LabelElement::Image(e) => &e.base,
            LabelElement::Rectangle(e) => &e.base,
            LabelElement::Line(e) => &e.base,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LabelElement::Text(_) => "text",
            LabelElement::Barcode(_) => "barcode",
            LabelElement::QrCode(_) => "qrcode",
            LabelElement::Image(_) => "image",
            LabelElement::Rectangle(_) => "rectangle",
            LabelElement::Line(_) => "line",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Sheet layout for page printing; carried through untouched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
}

/// Physical label description from the editor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: LengthUnit,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub grid: Option<GridLayout>,
    #[serde(default)]
    pub margin: Option<Margins>,
    #[serde(default)]
    pub spacing: Option<f64>,
}

impl LabelConfig {
    pub fn millimeters(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            unit: LengthUnit::Mm,
            background_color: None,
            grid: None,
            margin: None,
            spacing: None,
        }
    }
}

/// A label design: ordered elements plus physical config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelTemplate {
    #[serde(default)]
    pub elements: Vec<LabelElement>,
    pub config: LabelConfig,
}

impl LabelTemplate {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            elements: Vec::new(),
            config,
        }
    }

    pub fn with_element(mut self, element: LabelElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Elements in ascending stacking order; ties keep their sequence order
    pub fn ordered_elements(&self) -> Vec<&LabelElement> {
        let mut ordered: Vec<&LabelElement> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.base().z_index);
        ordered
    }

    pub fn validate(&self) -> LabelResult<()> {
        self.elements.iter().try_for_each(|e| e.base().validate())
    }
}

fn default_font_size() -> f64 {
    12.0
}

fn default_stroke_width() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}
