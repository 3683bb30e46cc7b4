//! Inline SVG chart rendering.
//!
//! Every chart shares one minimal theme: white background, centered title,
//! no legend, fixed margins. Charts are emitted as standalone `<svg>`
//! strings that scale to their container.

use crate::models::{FrequencyTable, Histogram};
use crate::report::format::{escape_xml, format_axis_label, format_percent, truncate_label};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Reversed "Blues" sequential ramp, darkest first.
pub const BLUES_R: [&str; 9] = [
    "#08306b", "#08519c", "#2171b5", "#4292c6", "#6baed6", "#9ecae1", "#c6dbef", "#deebf7",
    "#f7fbff",
];

/// Shared visual settings.
#[derive(Debug, Clone)]
pub struct Theme {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_side: f64,
    pub font_family: &'static str,
    pub font_size: f64,
    pub title_size: f64,
    pub bar_color: &'static str,
    pub axis_color: &'static str,
    pub text_color: &'static str,
    pub background: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 360.0,
            margin_top: 50.0,
            margin_bottom: 0.0,
            margin_side: 12.0,
            font_family: "\"Source Sans Pro\", Arial, sans-serif",
            font_size: 12.0,
            title_size: 16.0,
            bar_color: "#1f77b4",
            axis_color: "#444444",
            text_color: "#262730",
            background: "#ffffff",
        }
    }
}

/// Height reserved under the plot for x-axis ticks and labels.
const X_AXIS_BAND: f64 = 40.0;
const TICK_LEN: f64 = 5.0;
const MAX_TICKS: usize = 5;

/// Rough text width: ~0.6em per glyph.
fn text_width(text: &str, font_size: f64) -> f64 {
    0.6 * font_size * text.chars().count() as f64
}

/// Generate "nice" tick values covering [min, max] with roughly `max_ticks` steps.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = if max > min { max - min } else { 1.0 };
    let raw_step = range / (max_ticks.max(1)) as f64;
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };

    let start = (min / step).floor() * step;
    let mut ticks = Vec::new();
    let mut i = 0;
    loop {
        let v = start + step * i as f64;
        ticks.push(v);
        if v >= max - step * 1e-9 || ticks.len() > max_ticks * 3 {
            break;
        }
        i += 1;
    }
    ticks
}

/// Integer ticks for count axes; always reaches at least `max`.
fn count_ticks(max: usize) -> Vec<f64> {
    let ticks = nice_ticks(0.0, max.max(1) as f64, MAX_TICKS);
    let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
    if step < 1.0 {
        return (0..=max.max(1)).map(|v| v as f64).collect();
    }
    ticks
}

/// Relative luminance of a `#rrggbb` colour, 0 (black) to 1 (white).
fn luminance(hex: &str) -> f64 {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .map(|c| f64::from(c) / 255.0)
            .unwrap_or(0.0)
    };
    0.2126 * channel(0) + 0.7152 * channel(2) + 0.0722 * channel(4)
}

fn svg_open(out: &mut String, theme: &Theme, title: &str) {
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="100%" role="img" aria-label="{}" font-family="{}" font-size="{}">"#,
        theme.width,
        theme.height,
        escape_xml(title),
        escape_xml(theme.font_family),
        theme.font_size
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        theme.width, theme.height, theme.background
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<text class="chart-title" x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{}">{}</text>"#,
        theme.width / 2.0,
        theme.margin_top * 0.6,
        theme.title_size,
        theme.text_color,
        escape_xml(title)
    ));
    out.push('\n');
}

fn svg_close(out: &mut String) {
    out.push_str("</svg>\n");
}

/// Tooltip shown on hover.
fn hover_title(label: &str, count: usize) -> String {
    format!("<title>{}: {}</title>", escape_xml(label), count)
}

fn no_data(out: &mut String, theme: &Theme) {
    out.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" fill="{}">No data</text>"#,
        theme.width / 2.0,
        (theme.margin_top + theme.height - theme.margin_bottom) / 2.0,
        theme.axis_color
    ));
    out.push('\n');
}

/// Horizontal bar chart. The first entry is drawn at the bottom, so an
/// ascending table puts the largest bar on top.
pub fn bar_chart(title: &str, data: &FrequencyTable, theme: &Theme) -> String {
    let mut out = String::new();
    svg_open(&mut out, theme, title);

    if data.is_empty() {
        no_data(&mut out, theme);
        svg_close(&mut out);
        return out;
    }

    // Category labels get up to 40% of the width
    let glyph = 0.6 * theme.font_size;
    let longest = data.iter().map(|c| c.label.chars().count()).max().unwrap_or(0);
    let label_cap = theme.width * 0.4 - 8.0;
    let max_chars = if longest as f64 * glyph <= label_cap {
        longest
    } else {
        (label_cap / glyph).floor().max(1.0) as usize
    };
    let label_area = max_chars as f64 * glyph + 8.0;

    let x0 = theme.margin_side + label_area;
    let x1 = theme.width - theme.margin_side;
    let y0 = theme.margin_top;
    let y1 = theme.height - theme.margin_bottom - X_AXIS_BAND;
    let plot_w = x1 - x0;
    let plot_h = y1 - y0;

    let max_count = data.iter().map(|c| c.count).max().unwrap_or(0);
    let ticks = count_ticks(max_count);
    let x_max = ticks.last().copied().unwrap_or(1.0).max(1.0);
    let to_x = |v: f64| x0 + v / x_max * plot_w;

    let band = plot_h / data.len() as f64;
    let bar_h = band * 0.8;

    for (i, entry) in data.iter().enumerate() {
        let y_center = y1 - band * (i as f64 + 0.5);
        let bar_w = to_x(entry.count as f64) - x0;

        out.push_str(&format!(
            r#"<rect class="bar" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}">{}</rect>"#,
            x0,
            y_center - bar_h / 2.0,
            bar_w,
            bar_h,
            theme.bar_color,
            hover_title(&entry.label, entry.count)
        ));
        out.push('\n');

        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" dominant-baseline="middle" fill="{}">{}</text>"#,
            x0 - 6.0,
            y_center,
            theme.text_color,
            escape_xml(&truncate_label(&entry.label, max_chars))
        ));
        out.push('\n');

        // Count label inside the bar end when it fits, just outside otherwise
        let count = entry.count.to_string();
        let (label_x, anchor, fill) = if bar_w > text_width(&count, theme.font_size) + 8.0 {
            (x0 + bar_w - 4.0, "end", "#ffffff")
        } else {
            (x0 + bar_w + 4.0, "start", theme.text_color)
        };
        out.push_str(&format!(
            r#"<text class="bar-value" x="{:.2}" y="{:.2}" text-anchor="{}" dominant-baseline="middle" fill="{}">{}</text>"#,
            label_x, y_center, anchor, fill, count
        ));
        out.push('\n');
    }

    // Axes
    out.push_str(&format!(
        r#"<path d="M{:.2} {:.2}V{:.2}H{:.2}" fill="none" stroke="{}"/>"#,
        x0, y0, y1, x1, theme.axis_color
    ));
    out.push('\n');
    for &v in &ticks {
        let px = to_x(v);
        out.push_str(&format!(
            r#"<path d="M{:.2} {:.2}v{}" stroke="{}"/><text x="{:.2}" y="{:.2}" text-anchor="middle" fill="{}">{}</text>"#,
            px,
            y1,
            TICK_LEN,
            theme.axis_color,
            px,
            y1 + TICK_LEN + theme.font_size,
            theme.text_color,
            format_axis_label(v)
        ));
        out.push('\n');
    }
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" fill="{}">Count</text>"#,
        x0 + plot_w / 2.0,
        y1 + X_AXIS_BAND - 4.0,
        theme.text_color
    ));
    out.push('\n');

    svg_close(&mut out);
    out
}

/// Histogram of pre-binned values, bars without outline.
pub fn histogram_chart(title: &str, x_label: &str, hist: &Histogram, theme: &Theme) -> String {
    let mut out = String::new();
    svg_open(&mut out, theme, title);

    let (first, last) = match (hist.bins.first(), hist.bins.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            no_data(&mut out, theme);
            svg_close(&mut out);
            return out;
        }
    };

    let y_ticks = count_ticks(hist.max_count());
    let y_max = y_ticks.last().copied().unwrap_or(1.0).max(1.0);
    let y_label_w = y_ticks
        .iter()
        .map(|v| text_width(&format_axis_label(*v), theme.font_size))
        .fold(0.0, f64::max);

    let x0 = theme.margin_side + y_label_w + TICK_LEN + 20.0;
    let x1 = theme.width - theme.margin_side - 10.0;
    let y0 = theme.margin_top;
    let y1 = theme.height - theme.margin_bottom - X_AXIS_BAND;
    let plot_w = x1 - x0;
    let plot_h = y1 - y0;

    let x_min = first.start;
    let x_span = (last.end - first.start).max(f64::EPSILON);
    let to_x = |v: f64| x0 + (v - x_min) / x_span * plot_w;
    let to_y = |v: f64| y1 - v / y_max * plot_h;

    for bin in &hist.bins {
        if bin.count == 0 {
            continue;
        }
        let left = to_x(bin.start);
        let top = to_y(bin.count as f64);
        out.push_str(&format!(
            r#"<rect class="bin" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke-width="0">{}</rect>"#,
            left,
            top,
            to_x(bin.end) - left,
            y1 - top,
            theme.bar_color,
            hover_title(
                &format!(
                    "{} - {}",
                    format_axis_label(bin.start),
                    format_axis_label(bin.end)
                ),
                bin.count
            )
        ));
        out.push('\n');
    }

    out.push_str(&format!(
        r#"<path d="M{:.2} {:.2}V{:.2}H{:.2}" fill="none" stroke="{}"/>"#,
        x0, y0, y1, x1, theme.axis_color
    ));
    out.push('\n');

    for v in nice_ticks(first.start, last.end, MAX_TICKS) {
        if v < first.start || v > last.end {
            continue;
        }
        let px = to_x(v);
        out.push_str(&format!(
            r#"<path d="M{:.2} {:.2}v{}" stroke="{}"/><text x="{:.2}" y="{:.2}" text-anchor="middle" fill="{}">{}</text>"#,
            px,
            y1,
            TICK_LEN,
            theme.axis_color,
            px,
            y1 + TICK_LEN + theme.font_size,
            theme.text_color,
            format_axis_label(v)
        ));
        out.push('\n');
    }

    for &v in &y_ticks {
        let py = to_y(v);
        out.push_str(&format!(
            r#"<path d="M{:.2} {:.2}h{}" stroke="{}"/><text x="{:.2}" y="{:.2}" text-anchor="end" dominant-baseline="middle" fill="{}">{}</text>"#,
            x0,
            py,
            -TICK_LEN,
            theme.axis_color,
            x0 - TICK_LEN - 3.0,
            py,
            theme.text_color,
            format_axis_label(v)
        ));
        out.push('\n');
    }

    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" fill="{}">{}</text>"#,
        x0 + plot_w / 2.0,
        y1 + X_AXIS_BAND - 4.0,
        theme.text_color,
        escape_xml(x_label)
    ));
    out.push('\n');
    let y_mid = y0 + plot_h / 2.0;
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" transform="rotate(-90 {:.2} {:.2})" fill="{}">count</text>"#,
        theme.margin_side + 4.0,
        y_mid,
        theme.margin_side + 4.0,
        y_mid,
        theme.text_color
    ));
    out.push('\n');

    svg_close(&mut out);
    out
}

/// Inner radius as a share of the outer radius.
const DONUT_HOLE: f64 = 0.4;

/// Smallest slice sweep (radians) that still gets an inside label.
const MIN_LABEL_SWEEP: f64 = 0.25;

/// Donut chart, slices counterclockwise from 12 o'clock in table order, with
/// label and percentage inside each slice.
pub fn donut_chart(title: &str, data: &FrequencyTable, theme: &Theme) -> String {
    let mut out = String::new();
    svg_open(&mut out, theme, title);

    let total = data.total();
    if total == 0 {
        no_data(&mut out, theme);
        svg_close(&mut out);
        return out;
    }

    let plot_h = theme.height - theme.margin_top - theme.margin_bottom;
    let plot_w = theme.width - 2.0 * theme.margin_side;
    let cx = theme.width / 2.0;
    let cy = theme.margin_top + plot_h / 2.0;
    let outer = (plot_w.min(plot_h) / 2.0 - 6.0).max(10.0);
    let inner = outer * DONUT_HOLE;
    let mid = (outer + inner) / 2.0;

    let point = |r: f64, angle: f64| (cx + r * angle.cos(), cy + r * angle.sin());

    let mut angle = -FRAC_PI_2;
    for (i, entry) in data.iter().enumerate() {
        if entry.count == 0 {
            continue;
        }
        let fraction = entry.count as f64 / total as f64;
        let sweep = fraction * TAU;
        let color = BLUES_R[i % BLUES_R.len()];

        if fraction >= 1.0 {
            // A lone slice is a full ring; arcs cannot start and end on the same point
            out.push_str(&format!(
                r##"<circle class="slice" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}">{}</circle>"##,
                cx,
                cy,
                mid,
                color,
                outer - inner,
                hover_title(&entry.label, entry.count)
            ));
        } else {
            let end = angle - sweep;
            let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
            let (ox0, oy0) = point(outer, angle);
            let (ox1, oy1) = point(outer, end);
            let (ix1, iy1) = point(inner, end);
            let (ix0, iy0) = point(inner, angle);
            out.push_str(&format!(
                r##"<path class="slice" d="M{:.2} {:.2}A{:.2} {:.2} 0 {} 0 {:.2} {:.2}L{:.2} {:.2}A{:.2} {:.2} 0 {} 1 {:.2} {:.2}Z" fill="{}" stroke="#ffffff" stroke-width="1">{}</path>"##,
                ox0, oy0, outer, outer, large, ox1, oy1, ix1, iy1, inner, inner, large, ix0, iy0,
                color,
                hover_title(&entry.label, entry.count)
            ));
        }
        out.push('\n');

        if sweep >= MIN_LABEL_SWEEP {
            let (tx, ty) = point(mid, angle - sweep / 2.0);
            let fill = if luminance(color) < 0.5 {
                "#ffffff"
            } else {
                theme.text_color
            };
            out.push_str(&format!(
                r#"<text class="slice-label" x="{:.2}" y="{:.2}" text-anchor="middle" fill="{}"><tspan x="{:.2}" dy="-0.2em">{}</tspan><tspan x="{:.2}" dy="1.2em">{}</tspan></text>"#,
                tx,
                ty,
                fill,
                tx,
                escape_xml(&entry.label),
                tx,
                format_percent(fraction)
            ));
            out.push('\n');
        }

        angle -= sweep;
    }

    svg_close(&mut out);
    out
}
