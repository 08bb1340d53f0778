use serde::{Deserialize, Serialize};

use crate::foundation::core::{BoxMm, Rgb};

/// Semantic role of a drawn element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementRole {
    Background,
    Header,
    Kicker,
    Title,
    Subtitle,
    Chip,
    Media,
    Placeholder,
    Body,
    Metric,
    Flow,
    Table,
    Callout,
    Footer,
    Decorative,
    Debug,
}

impl ElementRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Header => "header",
            Self::Kicker => "kicker",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Chip => "chip",
            Self::Media => "media",
            Self::Placeholder => "placeholder",
            Self::Body => "body",
            Self::Metric => "metric",
            Self::Flow => "flow",
            Self::Table => "table",
            Self::Callout => "callout",
            Self::Footer => "footer",
            Self::Decorative => "decorative",
            Self::Debug => "debug",
        }
    }

    /// Roles exempt from the footer lane and content-coverage accounting.
    pub fn is_frame(self) -> bool {
        matches!(
            self,
            Self::Background | Self::Header | Self::Kicker | Self::Footer | Self::Decorative
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    Cover,
    Contain,
}

/// Drawable payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    Image {
        asset: String,
        fit: ImageFit,
    },
    Text {
        text: String,
        font_family: String,
        font_size_pt: f64,
        line_height: f64,
        color: Rgb,
        bold: bool,
        align: TextAlign,
    },
    Rect {
        fill: Rgb,
        fill_opacity: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke: Option<Rgb>,
        stroke_mm: f64,
        radius_mm: f64,
    },
    /// Segment from the box's top-left to its bottom-right corner.
    Line { stroke: Rgb, stroke_mm: f64 },
}

/// One positioned element, in millimetres from the page's top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x_mm: f64,
    pub y_mm: f64,
    pub w_mm: f64,
    pub h_mm: f64,
    pub role: ElementRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision_group: Option<String>,
    #[serde(default)]
    pub is_collision_protected: bool,
    #[serde(default)]
    pub debug_only: bool,
    #[serde(default)]
    pub allow_text_occlusion: bool,
}

impl Element {
    fn base(id: impl Into<String>, kind: ElementKind, b: BoxMm, role: ElementRole) -> Self {
        Self {
            id: id.into(),
            kind,
            x_mm: b.x_mm,
            y_mm: b.y_mm,
            w_mm: b.w_mm,
            h_mm: b.h_mm,
            role,
            collision_group: None,
            is_collision_protected: false,
            debug_only: false,
            allow_text_occlusion: false,
        }
    }

    pub fn image(id: impl Into<String>, asset: &str, b: BoxMm, fit: ImageFit) -> Self {
        Self::base(
            id,
            ElementKind::Image {
                asset: asset.to_string(),
                fit,
            },
            b,
            ElementRole::Media,
        )
    }

    pub fn rect(id: impl Into<String>, b: BoxMm, fill: Rgb, role: ElementRole) -> Self {
        Self::base(
            id,
            ElementKind::Rect {
                fill,
                fill_opacity: 1.0,
                stroke: None,
                stroke_mm: 0.0,
                radius_mm: 0.0,
            },
            b,
            role,
        )
    }

    pub fn line(id: impl Into<String>, b: BoxMm, stroke: Rgb, stroke_mm: f64) -> Self {
        Self::base(
            id,
            ElementKind::Line { stroke, stroke_mm },
            b,
            ElementRole::Decorative,
        )
    }

    pub fn text(id: impl Into<String>, b: BoxMm, style: TextStyle, text: String, role: ElementRole) -> Self {
        Self::base(
            id,
            ElementKind::Text {
                text,
                font_family: style.font_family,
                font_size_pt: style.font_size_pt,
                line_height: style.line_height,
                color: style.color,
                bold: style.bold,
                align: style.align,
            },
            b,
            role,
        )
    }

    pub fn protected_in(mut self, group: impl Into<String>) -> Self {
        self.collision_group = Some(group.into());
        self.is_collision_protected = true;
        self
    }

    pub fn protected(mut self) -> Self {
        self.is_collision_protected = true;
        self
    }

    pub fn debug(mut self) -> Self {
        self.debug_only = true;
        self
    }

    pub fn with_role(mut self, role: ElementRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        if let ElementKind::Rect { radius_mm, .. } = &mut self.kind {
            *radius_mm = radius;
        }
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        if let ElementKind::Rect { fill_opacity, .. } = &mut self.kind {
            *fill_opacity = opacity;
        }
        self
    }

    pub fn with_stroke(mut self, color: Rgb, width_mm: f64) -> Self {
        if let ElementKind::Rect {
            stroke, stroke_mm, ..
        } = &mut self.kind
        {
            *stroke = Some(color);
            *stroke_mm = width_mm;
        }
        self
    }

    pub fn rect_box(&self) -> BoxMm {
        BoxMm::new(self.x_mm, self.y_mm, self.w_mm, self.h_mm)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Image { .. } => "image",
            ElementKind::Text { .. } => "text",
            ElementKind::Rect { .. } => "rect",
            ElementKind::Line { .. } => "line",
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Editable in the target slide format (anything but a raster image).
    pub fn is_editable(&self) -> bool {
        !matches!(self.kind, ElementKind::Image { .. })
    }

    /// Images and near-opaque rects hide whatever they are drawn over.
    pub fn is_opaque(&self) -> bool {
        match self.kind {
            ElementKind::Image { .. } => true,
            ElementKind::Rect { fill_opacity, .. } => fill_opacity >= 0.75,
            _ => false,
        }
    }
}

/// Resolved text styling handed to [`Element::text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size_pt: f64,
    pub line_height: f64,
    pub color: Rgb,
    pub bold: bool,
    pub align: TextAlign,
}
