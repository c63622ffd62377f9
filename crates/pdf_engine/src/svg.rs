//! Inline SVG
//!
//! Only basic shapes are drawn: `<rect>`, `<line>` and `<circle>`, inside any
//! number of `<g>` groups. Each `<svg>` becomes a figure whose alternate text
//! comes from its `<title>` child or `aria-label` attribute.

use serde::{Deserialize, Serialize};

use crate::content::ContentStream;
use crate::html::Element;
use crate::style::{parse_length, Color};

/// What the renderer does with inline `<svg>` elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgHandling {
    /// Leave them out of the document
    #[default]
    Skip,
    /// Draw supported shapes as vector paths
    Vector,
}

/// Bezier control point distance for a quarter circle
const KAPPA: f64 = 0.552_284_749_8;

/// A drawable shape in SVG user units (y axis pointing down)
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: Paint,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        paint: Paint,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        paint: Paint,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

/// A parsed `<svg>` element
#[derive(Debug, Clone, PartialEq)]
pub struct SvgFigure {
    /// Size on the page in points
    pub width: f64,
    pub height: f64,
    /// Scale from user units to points
    scale_x: f64,
    scale_y: f64,
    pub shapes: Vec<Shape>,
    pub alt: String,
}

impl SvgFigure {
    pub fn parse(svg: &Element) -> Self {
        let view_box: Option<Vec<f64>> = svg.attr("viewbox").map(|v| {
            v.split(|c: char| c == ',' || c.is_whitespace())
                .filter_map(|n| n.parse().ok())
                .collect()
        });
        let view_box = view_box.filter(|v| v.len() == 4 && v[2] > 0.0 && v[3] > 0.0);

        let width = svg
            .attr("width")
            .and_then(pixels)
            .or_else(|| view_box.as_ref().map(|v| v[2] * 0.75))
            .unwrap_or(225.0);
        let height = svg
            .attr("height")
            .and_then(pixels)
            .or_else(|| view_box.as_ref().map(|v| v[3] * 0.75))
            .unwrap_or(112.5);

        let (scale_x, scale_y) = match &view_box {
            Some(v) => (width / v[2], height / v[3]),
            None => (0.75, 0.75),
        };

        let alt = svg
            .find("title")
            .map(|title| title.text_content().trim().to_string())
            .filter(|title| !title.is_empty())
            .or_else(|| svg.attr("aria-label").map(str::to_string))
            .unwrap_or_else(|| "svg".to_string());

        let mut shapes = Vec::new();
        collect_shapes(svg, &mut shapes);

        Self {
            width,
            height,
            scale_x,
            scale_y,
            shapes,
            alt,
        }
    }

    /// Draw the figure with its lower-left corner at (`x`, `y`)
    pub fn draw(&self, content: &mut ContentStream, x: f64, y: f64) {
        let top = y + self.height;
        let px = |ux: f64| x + ux * self.scale_x;
        let py = |uy: f64| top - uy * self.scale_y;

        for shape in &self.shapes {
            let paint = match shape {
                Shape::Rect { paint, .. } | Shape::Line { paint, .. } | Shape::Circle { paint, .. } => paint,
            };
            if paint.fill.is_none() && paint.stroke.is_none() {
                continue;
            }

            content.save_state();
            if let Some(fill) = paint.fill {
                content.set_fill_rgb(fill.r, fill.g, fill.b);
            }
            if let Some(stroke) = paint.stroke {
                content
                    .set_stroke_rgb(stroke.r, stroke.g, stroke.b)
                    .set_line_width(paint.stroke_width * self.scale_x);
            }

            match shape {
                Shape::Rect { x, y, width, height, .. } => {
                    content.rect(
                        px(*x),
                        py(y + height),
                        width * self.scale_x,
                        height * self.scale_y,
                    );
                }
                Shape::Line { x1, y1, x2, y2, .. } => {
                    content.move_to(px(*x1), py(*y1)).line_to(px(*x2), py(*y2));
                }
                Shape::Circle { cx, cy, r, .. } => {
                    let (cx, cy) = (px(*cx), py(*cy));
                    let (rx, ry) = (r * self.scale_x, r * self.scale_y);
                    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
                    content
                        .move_to(cx + rx, cy)
                        .curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry)
                        .curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy)
                        .curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry)
                        .curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy)
                        .close_path();
                }
            }

            let is_line = matches!(shape, Shape::Line { .. });
            match (paint.fill.is_some() && !is_line, paint.stroke.is_some()) {
                (true, true) => content.fill_and_stroke(),
                (true, false) => content.fill(),
                (false, _) => content.stroke(),
            };
            content.restore_state();
        }
    }
}

/// SVG lengths without a unit are CSS pixels
fn pixels(value: &str) -> Option<f64> {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(number) => Some(number * 0.75),
        Err(_) => parse_length(value, 12.0),
    }
}

fn number(element: &Element, name: &str) -> f64 {
    element
        .attr(name)
        .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
        .unwrap_or(0.0)
}

fn paint(element: &Element, default_fill: Option<Color>) -> Paint {
    let color = |name: &str, default: Option<Color>| match element.attr(name) {
        Some("none") => None,
        Some(value) => Color::parse(value).or(default),
        None => default,
    };
    Paint {
        fill: color("fill", default_fill),
        stroke: color("stroke", None),
        stroke_width: element
            .attr("stroke-width")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(1.0),
    }
}

fn collect_shapes(parent: &Element, shapes: &mut Vec<Shape>) {
    for element in parent.elements() {
        match element.name.as_str() {
            "rect" => shapes.push(Shape::Rect {
                x: number(element, "x"),
                y: number(element, "y"),
                width: number(element, "width"),
                height: number(element, "height"),
                paint: paint(element, Some(Color::BLACK)),
            }),
            "line" => shapes.push(Shape::Line {
                x1: number(element, "x1"),
                y1: number(element, "y1"),
                x2: number(element, "x2"),
                y2: number(element, "y2"),
                paint: paint(element, None),
            }),
            "circle" => shapes.push(Shape::Circle {
                cx: number(element, "cx"),
                cy: number(element, "cy"),
                r: number(element, "r"),
                paint: paint(element, Some(Color::BLACK)),
            }),
            "g" => collect_shapes(element, shapes),
            "title" | "desc" => {}
            other => tracing::warn!(element = other, "unsupported svg element skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_document;

    #[test]
    fn test_parse_shapes_and_alt() {
        let svg = parse_document(
            r##"<svg width="200" height="100"><title>Sales chart</title>
<rect x="10" y="10" width="50" height="20" fill="#ff0000"/>
<g><line x1="0" y1="0" x2="100" y2="100" stroke="black"/></g>
<circle cx="50" cy="50" r="10"/>
<path d="M0 0"/></svg>"##,
        )
        .unwrap();
        let figure = SvgFigure::parse(&svg);

        assert_eq!(figure.alt, "Sales chart");
        assert_eq!(figure.width, 150.0);
        assert_eq!(figure.height, 75.0);
        assert_eq!(figure.shapes.len(), 3);
    }

    #[test]
    fn test_default_alt_and_view_box() {
        let svg = parse_document(r#"<svg viewBox="0 0 100 50"><rect width="100" height="50"/></svg>"#).unwrap();
        let figure = SvgFigure::parse(&svg);
        assert_eq!(figure.alt, "svg");
        assert_eq!(figure.width, 75.0);

        let mut content = ContentStream::new();
        figure.draw(&mut content, 10.0, 20.0);
        let ops = String::from_utf8(content.into_bytes()).unwrap();
        assert!(ops.contains("10 20 75 37.5 re"));
        assert!(ops.contains("\nf\n"));
    }

    #[test]
    fn test_unpainted_shapes_are_not_drawn() {
        let svg = parse_document(r#"<svg><rect width="1" height="1" fill="none"/></svg>"#).unwrap();
        let mut content = ContentStream::new();
        SvgFigure::parse(&svg).draw(&mut content, 0.0, 0.0);
        assert!(content.into_bytes().is_empty());
    }
}
