use crate::build::copy::PageBrief;
use crate::build::elements::{Element, ElementRole, ImageFit, TextAlign, TextStyle};
use crate::build::layout::PageLayout;
use crate::foundation::core::{BoxMm, PageSizeMm, Rgb};
use crate::references::archetype::LayoutTuning;
use crate::storyboard::request::DocKind;
use crate::storyboard::role::PageRole;
use crate::style::tokens::{
    BODY_PT_RANGE, StyleTokens, SUBTITLE_PT_RANGE, TITLE_PT_RANGE,
};
use crate::templates::catalog::{ImagePolicy, TemplateId, TextBudget};
use crate::templates::zones::{TemplateZone, ZonePurpose, build_zones, zone};
use crate::validate::text_fit::fits;

/// Smallest font scale the builder shrinks to before dropping words.
const MIN_FONT_SCALE: f64 = 0.7;
const FONT_STEP_PT: f64 = 0.5;
const POSTER_TYPE_SCALE: f64 = 1.2;
const MAX_CHIPS: usize = 3;

/// Everything one page build reads.
#[derive(Clone, Copy, Debug)]
pub struct PageInputs<'a> {
    pub asset: Option<&'a str>,
    pub brief: &'a PageBrief,
    pub page_number: usize,
    pub page: PageSizeMm,
    pub tokens: &'a StyleTokens,
    pub template: TemplateId,
    pub tuning: Option<&'a LayoutTuning>,
    pub doc_kind: DocKind,
    pub role: PageRole,
    pub debug: bool,
}

/// Resolved point sizes for one document kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeScale {
    pub title_pt: f64,
    pub subtitle_pt: f64,
    pub body_pt: f64,
    pub caption_pt: f64,
}

pub fn type_scale(tokens: &StyleTokens, kind: DocKind) -> TypeScale {
    let t = &tokens.typography;
    if kind == DocKind::Poster {
        TypeScale {
            title_pt: (t.title_pt * POSTER_TYPE_SCALE).clamp(TITLE_PT_RANGE.0, TITLE_PT_RANGE.1),
            subtitle_pt: (t.subtitle_pt * POSTER_TYPE_SCALE)
                .clamp(SUBTITLE_PT_RANGE.0, SUBTITLE_PT_RANGE.1),
            body_pt: (t.body_pt * POSTER_TYPE_SCALE).clamp(BODY_PT_RANGE.0, BODY_PT_RANGE.1),
            caption_pt: t.caption_pt,
        }
    } else {
        TypeScale {
            title_pt: t.title_pt,
            subtitle_pt: t.subtitle_pt,
            body_pt: t.body_pt,
            caption_pt: t.caption_pt,
        }
    }
}

/// Cut `text` to at most `max_chars` at a word boundary. Never appends a marker.
pub fn clip_words(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut out = String::new();
    for word in text.split(' ') {
        let next = if out.is_empty() {
            word.chars().count()
        } else {
            out.chars().count() + 1 + word.chars().count()
        };
        if next > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        out = text.chars().take(max_chars).collect();
    }
    tracing::debug!(
        max_chars,
        kept_chars = out.chars().count(),
        total_chars = text.chars().count(),
        "clipped copy to text budget"
    );
    out
}

/// Shrink then trim `text` until the estimator accepts it in `b`.
pub fn fit_text(text: &str, b: BoxMm, pt: f64, line_height: f64) -> Option<(String, f64)> {
    if text.trim().is_empty() {
        return None;
    }
    let min_pt = pt * MIN_FONT_SCALE;
    let mut size = pt;
    while size >= min_pt - 1e-9 {
        if fits(text, b.w_mm, b.h_mm, size, line_height) {
            return Some((text.to_string(), size));
        }
        size -= FONT_STEP_PT;
    }
    let size = min_pt;
    let lines: Vec<&str> = text.split('\n').collect();
    for keep_lines in (1..=lines.len()).rev() {
        let head = lines[..keep_lines].join("\n");
        let mut words: Vec<&str> = head.split(' ').collect();
        while !words.is_empty() {
            let candidate = words.join(" ");
            if fits(&candidate, b.w_mm, b.h_mm, size, line_height) {
                let total = text.split_whitespace().count();
                let kept = candidate.split_whitespace().count();
                tracing::debug!(
                    kept_words = kept,
                    dropped_words = total.saturating_sub(kept),
                    font_size_pt = size,
                    "dropped words to fit text box"
                );
                return Some((candidate.trim_end().to_string(), size));
            }
            words.pop();
        }
    }
    None
}

struct PageBuilder<'a> {
    prefix: String,
    tokens: &'a StyleTokens,
    scale: TypeScale,
    elements: Vec<Element>,
}

impl PageBuilder<'_> {
    fn id(&self, name: &str) -> String {
        format!("{}-{name}", self.prefix)
    }

    fn style(&self, pt: f64, color: Rgb, heading: bool, align: TextAlign) -> TextStyle {
        let t = &self.tokens.typography;
        TextStyle {
            font_family: if heading {
                t.heading_font.clone()
            } else {
                t.body_font.clone()
            },
            font_size_pt: pt,
            line_height: t.line_height,
            color,
            bold: heading,
            align,
        }
    }

    /// Fit and push a text element; returns its index when anything was drawn.
    fn text(
        &mut self,
        name: &str,
        b: BoxMm,
        text: &str,
        style: TextStyle,
        role: ElementRole,
    ) -> Option<usize> {
        let (fitted, size) = fit_text(text, b, style.font_size_pt, style.line_height)?;
        let style = TextStyle {
            font_size_pt: size,
            ..style
        };
        self.elements
            .push(Element::text(self.id(name), b, style, fitted, role));
        Some(self.elements.len() - 1)
    }

    fn push(&mut self, e: Element) -> usize {
        self.elements.push(e);
        self.elements.len() - 1
    }

    fn pad(&self, b: BoxMm) -> BoxMm {
        b.inset((self.tokens.spacing.gutter_mm * 0.4).min(b.h_mm * 0.2))
    }
}

fn density_count(tuning: Option<&LayoutTuning>, base: usize, span: f64, max: usize) -> usize {
    let d = tuning.map_or(0.5, |t| t.card_density.clamp(0.0, 1.0));
    (base + (d * span).round() as usize).clamp(base, max)
}

/// Split `b` into `n` equal columns separated by `gap`.
fn columns(b: BoxMm, n: usize, gap: f64) -> Vec<BoxMm> {
    if n == 0 {
        return Vec::new();
    }
    let w = ((b.w_mm - gap * (n as f64 - 1.0)) / n as f64).max(0.0);
    (0..n)
        .map(|i| BoxMm::new(b.x_mm + i as f64 * (w + gap), b.y_mm, w, b.h_mm))
        .collect()
}

fn body_text(brief: &PageBrief, budget: &TextBudget) -> String {
    let mut total = 0usize;
    let mut lines: Vec<String> = Vec::new();
    for bullet in brief.bullets.iter().take(budget.bullets) {
        let clipped = clip_words(bullet, budget.bullet);
        let len = clipped.chars().count() + 2;
        if clipped.is_empty() || total + len > budget.body {
            break;
        }
        total += len;
        lines.push(format!("\u{2022} {clipped}"));
    }
    if lines.is_empty() && budget.body > 0 {
        let lead = if budget.subtitle == 0 {
            &brief.subtitle
        } else {
            &brief.callout
        };
        return clip_words(lead, budget.body);
    }
    lines.join("\n")
}

/// Compose the page's elements from its zones. Pure.
pub fn build_page(input: &PageInputs<'_>) -> PageLayout {
    let tokens = input.tokens;
    let colors = &tokens.colors;
    let brief = input.brief;
    let budget = input.template.budget_for(input.doc_kind);
    let zones = build_zones(input.template, input.page, &tokens.spacing, input.tuning);
    let gap = tokens.spacing.gutter_mm * 0.5;
    let radius = tokens.spacing.radius_mm;
    let stroke = tokens.spacing.stroke_mm;

    let mut b = PageBuilder {
        prefix: format!("p{}", input.page_number),
        tokens,
        scale: type_scale(tokens, input.doc_kind),
        elements: Vec::new(),
    };
    let s = b.scale;
    let z = |p: ZonePurpose| zone(&zones, p).map(TemplateZone::rect);

    b.push(Element::rect(
        b.id("background"),
        input.page.bounds(),
        colors.background,
        ElementRole::Background,
    ));

    if let Some(header) = z(ZonePurpose::Header) {
        b.push(Element::rect(b.id("header-band"), header, colors.soft, ElementRole::Header).with_radius(radius));
        let (left, right) = (
            BoxMm::new(header.x_mm, header.y_mm, header.w_mm * 0.6, header.h_mm),
            BoxMm::new(header.x_mm + header.w_mm * 0.6, header.y_mm, header.w_mm * 0.4, header.h_mm),
        );
        let st = b.style(s.caption_pt, colors.muted, false, TextAlign::Left);
        b.text("kicker", b.pad(left), &brief.kicker, st, ElementRole::Kicker);
        if input.debug {
            let label = format!("{} {}", input.template.as_str(), input.role.as_str());
            let st = b.style(s.caption_pt, colors.muted, false, TextAlign::Left);
            if let Some(i) = b.text("debug", b.pad(right), &label, st, ElementRole::Debug) {
                b.elements[i].debug_only = true;
            }
        }
    }

    if let Some(media) = z(ZonePurpose::Media) {
        let policy = input.template.image_policy();
        match input.asset {
            Some(asset) if policy != ImagePolicy::None => {
                let fit = if input.template.is_full_bleed() {
                    ImageFit::Cover
                } else {
                    ImageFit::Contain
                };
                b.push(Element::image(b.id("media"), asset, media, fit).protected_in("media"));
            }
            None if policy == ImagePolicy::Required => {
                b.push(
                    Element::rect(b.id("media-placeholder"), media, colors.soft, ElementRole::Placeholder)
                        .with_radius(radius)
                        .protected_in("media"),
                );
                let st = b.style(s.caption_pt, colors.muted, false, TextAlign::Center);
                if let Some(i) = b.text("media-label", b.pad(media), "Image pending", st, ElementRole::Placeholder) {
                    let e = &mut b.elements[i];
                    e.collision_group = Some("media".to_string());
                    e.is_collision_protected = true;
                }
            }
            _ => {}
        }
    }

    if let Some(title) = z(ZonePurpose::Title) {
        let st = b.style(s.title_pt, colors.text, true, TextAlign::Left);
        let text = clip_words(&brief.title, budget.title);
        if let Some(i) = b.text("title", title, &text, st, ElementRole::Title) {
            b.elements[i].is_collision_protected = true;
        }
    }

    if let (Some(sub), true) = (z(ZonePurpose::Subtitle), budget.subtitle > 0) {
        let st = b.style(s.subtitle_pt, colors.muted, false, TextAlign::Left);
        let text = clip_words(&brief.subtitle, budget.subtitle);
        if let Some(i) = b.text("subtitle", sub, &text, st, ElementRole::Subtitle) {
            b.elements[i].is_collision_protected = true;
        }
    }

    if let Some(chips) = z(ZonePurpose::Chips) {
        let n = brief.chips.len().min(MAX_CHIPS);
        let slots = columns(chips, MAX_CHIPS, gap);
        for (i, (label, slot)) in brief.chips.iter().zip(slots).take(n).enumerate() {
            let group = format!("chip-{}", i + 1);
            b.push(
                Element::rect(b.id(&group), slot, colors.soft, ElementRole::Chip)
                    .with_radius(slot.h_mm / 2.0)
                    .protected_in(group.clone()),
            );
            let st = b.style(s.caption_pt, colors.accent, false, TextAlign::Center);
            let inner = b.pad(slot);
            if let Some(k) = b.text(&format!("{group}-label"), inner, label, st, ElementRole::Chip) {
                b.elements[k] = b.elements[k].clone().protected_in(group);
            }
        }
    }

    if let Some(metrics) = z(ZonePurpose::Metrics) {
        let n = density_count(input.tuning, 2, 2.0, 4);
        let cards = columns(metrics, n, gap);
        for (i, card) in cards.into_iter().enumerate() {
            let group = format!("metric-{}", i + 1);
            let metric = brief.metrics.get(i);
            let mut rect = Element::rect(b.id(&group), card, colors.surface, ElementRole::Metric)
                .with_radius(radius)
                .with_stroke(colors.soft, stroke)
                .protected_in(group.clone());
            if metric.is_none() {
                if !input.debug {
                    continue;
                }
                rect = rect.debug();
            }
            b.push(rect);
            let (value, label) = metric
                .map(|m| (m.value.as_str(), m.label.as_str()))
                .unwrap_or(("0", "placeholder"));
            let inner = b.pad(card);
            let top = BoxMm::new(inner.x_mm, inner.y_mm, inner.w_mm, inner.h_mm * 0.55);
            let bottom = BoxMm::new(inner.x_mm, top.bottom(), inner.w_mm, inner.h_mm * 0.45);
            let debug = metric.is_none();
            let st = b.style(s.subtitle_pt, colors.accent, true, TextAlign::Left);
            if let Some(k) = b.text(&format!("{group}-value"), top, value, st, ElementRole::Metric) {
                let e = b.elements[k].clone().protected_in(group.clone());
                b.elements[k] = if debug { e.debug() } else { e };
            }
            let st = b.style(s.caption_pt, colors.muted, false, TextAlign::Left);
            if let Some(k) = b.text(&format!("{group}-label"), bottom, label, st, ElementRole::Metric) {
                let e = b.elements[k].clone().protected_in(group.clone());
                b.elements[k] = if debug { e.debug() } else { e };
            }
        }
    }

    if let Some(flow) = z(ZonePurpose::Flow) {
        let wanted = density_count(input.tuning, 3, 3.0, 6);
        let n = wanted.min(brief.steps.len());
        if n > 0 {
            let connector = gap * 2.0;
            let cards = columns(flow, n, connector);
            for (i, card) in cards.iter().enumerate() {
                let group = format!("step-{}", i + 1);
                b.push(
                    Element::rect(b.id(&group), *card, colors.surface, ElementRole::Flow)
                        .with_radius(radius)
                        .with_stroke(colors.accent, stroke)
                        .protected_in(group.clone()),
                );
                let st = b.style(s.body_pt, colors.text, true, TextAlign::Center);
                let label = format!("{}. {}", i + 1, brief.steps[i]);
                if let Some(k) = b.text(&format!("{group}-label"), b.pad(*card), &label, st, ElementRole::Flow) {
                    b.elements[k] = b.elements[k].clone().protected_in(group);
                }
                if let Some(next) = cards.get(i + 1) {
                    let mid = card.y_mm + card.h_mm / 2.0;
                    b.push(Element::line(
                        b.id(&format!("connector-{}", i + 1)),
                        BoxMm::new(card.right(), mid, next.x_mm - card.right(), 0.0),
                        colors.accent,
                        stroke,
                    ));
                }
            }
        }
    }

    if let Some(table) = z(ZonePurpose::Table) {
        let n = density_count(input.tuning, 2, 3.0, 5).min(brief.rows.len());
        if n > 0 {
            let row_h = table.h_mm / n as f64;
            let split = table.w_mm * 0.4;
            for (i, row) in brief.rows.iter().take(n).enumerate() {
                let group = format!("row-{}", i + 1);
                let rb = BoxMm::new(table.x_mm, table.y_mm + row_h * i as f64, table.w_mm, row_h);
                let fill = if i % 2 == 0 { colors.soft } else { colors.surface };
                b.push(Element::rect(b.id(&group), rb, fill, ElementRole::Table).protected_in(group.clone()));
                let left = b.pad(BoxMm::new(rb.x_mm, rb.y_mm, split, rb.h_mm));
                let right = b.pad(BoxMm::new(rb.x_mm + split, rb.y_mm, rb.w_mm - split, rb.h_mm));
                let st = b.style(s.body_pt, colors.text, true, TextAlign::Left);
                let label = clip_words(&row.label, budget.bullet);
                if let Some(k) = b.text(&format!("{group}-label"), left, &label, st, ElementRole::Table) {
                    b.elements[k] = b.elements[k].clone().protected_in(group.clone());
                }
                let st = b.style(s.body_pt, colors.text, false, TextAlign::Left);
                let value = clip_words(&row.value, budget.bullet);
                if let Some(k) = b.text(&format!("{group}-value"), right, &value, st, ElementRole::Table) {
                    b.elements[k] = b.elements[k].clone().protected_in(group);
                }
            }
            b.push(Element::line(
                b.id("table-divider"),
                BoxMm::new(table.x_mm + split, table.y_mm, 0.0, row_h * n as f64),
                colors.muted,
                stroke,
            ));
        }
    }

    if let Some(body) = z(ZonePurpose::Body) {
        let text = body_text(brief, &budget);
        if !text.is_empty() {
            b.push(
                Element::rect(b.id("body-panel"), body, colors.surface, ElementRole::Body)
                    .with_radius(radius)
                    .protected_in("body"),
            );
            let st = b.style(s.body_pt, colors.text, false, TextAlign::Left);
            if let Some(k) = b.text("body", b.pad(body), &text, st, ElementRole::Body) {
                b.elements[k] = b.elements[k].clone().protected_in("body");
            }
        }
    }

    if let (Some(callout), true) = (z(ZonePurpose::Callout), budget.callout > 0) {
        let text = clip_words(&brief.callout, budget.callout);
        if !text.is_empty() {
            let (fill, ink) = if input.role.is_emphatic() {
                (colors.accent, colors.on_accent)
            } else {
                (colors.soft, colors.text)
            };
            b.push(
                Element::rect(b.id("callout-panel"), callout, fill, ElementRole::Callout)
                    .with_radius(radius)
                    .protected_in("callout"),
            );
            let st = b.style(s.subtitle_pt, ink, true, TextAlign::Left);
            if let Some(k) = b.text("callout", b.pad(callout), &text, st, ElementRole::Callout) {
                b.elements[k] = b.elements[k].clone().protected_in("callout");
            }
        }
    }

    let footer = z(ZonePurpose::Footer).unwrap_or_else(|| {
        BoxMm::new(0.0, input.page.height_mm, input.page.width_mm, 0.0)
    });
    b.push(Element::line(
        b.id("footer-rule"),
        BoxMm::new(footer.x_mm, footer.y_mm, footer.w_mm, 0.0),
        colors.soft,
        stroke,
    ));
    let st = b.style(s.caption_pt, colors.muted, false, TextAlign::Left);
    b.text("footer", b.pad(footer), &brief.footer, st, ElementRole::Footer);

    PageLayout {
        page_number: input.page_number,
        template_id: input.template,
        width_mm: input.page.width_mm,
        height_mm: input.page.height_mm,
        footer_top_mm: footer.y_mm,
        elements: b.elements,
        meta: None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/page.rs"]
mod tests;
