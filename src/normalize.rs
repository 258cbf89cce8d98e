//! Flatten SVG document into the list of canonical paths
use crate::{
    Element, ElementFilter, Error, Paint, Point, Scalar, ViewBox,
    element::{Circle, Ellipse, Path, Polygon, Rect},
};

/// Nominal size and coordinate system of the document
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Canvas {
    pub width: Scalar,
    pub height: Scalar,
    pub view_box: ViewBox,
}

impl Canvas {
    /// Canvas with the view box covering `(0, 0, width, height)`
    pub fn new(width: Scalar, height: Scalar) -> Self {
        Self {
            width,
            height,
            view_box: ViewBox::new(0.0, 0.0, width, height),
        }
    }
}

/// Normalized document, all shapes are converted to paths
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drawing {
    pub canvas: Canvas,
    pub paths: Vec<Path>,
}

impl Drawing {
    /// Parse SVG document, elements matching `filter` are dropped
    pub fn parse(text: &str, filter: &dyn ElementFilter) -> Result<Self, Error> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        let tag = root.tag_name().name();
        if tag != "svg" {
            return Err(Error::UnsupportedElement(tag.to_owned()));
        }

        let mut paths = Vec::new();
        normalize_children(root, filter, &mut paths)?;
        if paths.is_empty() {
            return Err(Error::EmptyDrawing);
        }
        let canvas = parse_canvas(root)?;
        tracing::debug!("[normalize:paths_count] {}", paths.len());
        Ok(Self { canvas, paths })
    }
}

fn parse_canvas(root: roxmltree::Node<'_, '_>) -> Result<Canvas, Error> {
    let view_box = root
        .attribute("viewBox")
        .map(|value| {
            let numbers = parse_number_list("viewBox", value)?;
            match numbers[..] {
                [min_x, min_y, width, height] => Ok(ViewBox::new(min_x, min_y, width, height)),
                _ => Err(invalid_attribute("viewBox", value)),
            }
        })
        .transpose()?;
    // size falls back to the view box and vice versa
    let width = optional_number(root, "width")?.or(view_box.map(|vb| vb.width));
    let height = optional_number(root, "height")?.or(view_box.map(|vb| vb.height));
    let mut canvas = Canvas::new(width.unwrap_or(0.0), height.unwrap_or(0.0));
    if let Some(view_box) = view_box {
        if view_box.width != 0.0 || view_box.height != 0.0 {
            canvas.view_box = view_box;
        }
    }
    let ViewBox { width, height, .. } = canvas.view_box;
    if !(width > 0.0 && height > 0.0) {
        return Err(Error::MarkupParse(format!(
            "view box must have positive size: {:?}",
            canvas.view_box
        )));
    }
    Ok(canvas)
}

/// Normalize element children in document order, groups are spliced in place
fn normalize_children(
    node: roxmltree::Node<'_, '_>,
    filter: &dyn ElementFilter,
    paths: &mut Vec<Path>,
) -> Result<(), Error> {
    for child in node.children().filter(|n| n.is_element()) {
        let element = match child.tag_name().name() {
            "g" => {
                normalize_children(child, filter, paths)?;
                continue;
            }
            "title" | "desc" | "metadata" => continue,
            "path" => Element::Path(Path {
                d: child.attribute("d").unwrap_or_default().to_owned(),
                paint: parse_paint(child)?,
            }),
            "rect" => Element::Rect(Rect {
                x: number(child, "x")?,
                y: number(child, "y")?,
                width: number(child, "width")?,
                height: number(child, "height")?,
                paint: parse_paint(child)?,
            }),
            "circle" => Element::Circle(Circle {
                cx: number(child, "cx")?,
                cy: number(child, "cy")?,
                r: number(child, "r")?,
                paint: parse_paint(child)?,
            }),
            "ellipse" => Element::Ellipse(Ellipse {
                cx: number(child, "cx")?,
                cy: number(child, "cy")?,
                rx: number(child, "rx")?,
                ry: number(child, "ry")?,
                paint: parse_paint(child)?,
            }),
            tag @ ("polygon" | "polyline") => Element::Polygon(Polygon {
                points: parse_points(child.attribute("points").unwrap_or_default())?,
                closed: tag == "polygon",
                paint: parse_paint(child)?,
            }),
            tag => return Err(Error::UnsupportedElement(tag.to_owned())),
        };
        if filter.excludes(&element) {
            tracing::debug!("[normalize:exclude] {:?}", element);
            continue;
        }
        paths.push(element.into_path());
    }
    Ok(())
}

fn parse_paint(node: roxmltree::Node<'_, '_>) -> Result<Paint, Error> {
    Ok(Paint {
        fill: node.attribute("fill").unwrap_or_default().to_owned(),
        fill_opacity: optional_opacity(node, "fill-opacity")?,
        opacity: optional_opacity(node, "opacity")?,
    })
}

fn invalid_attribute(name: &str, value: &str) -> Error {
    Error::MarkupParse(format!("invalid value of the attribute {name}: {value:?}"))
}

fn parse_scalar(name: &str, value: &str) -> Result<Scalar, Error> {
    let value = value.trim();
    let digits = value.strip_suffix("px").unwrap_or(value).trim_end();
    let number: Scalar =
        lexical_core::parse(digits.as_bytes()).map_err(|_| invalid_attribute(name, value))?;
    if !number.is_finite() {
        return Err(invalid_attribute(name, value));
    }
    Ok(number)
}

fn optional_number(node: roxmltree::Node<'_, '_>, name: &str) -> Result<Option<Scalar>, Error> {
    node.attribute(name)
        .map(|value| parse_scalar(name, value))
        .transpose()
}

/// Numeric attribute, missing attribute is `0`
fn number(node: roxmltree::Node<'_, '_>, name: &str) -> Result<Scalar, Error> {
    Ok(optional_number(node, name)?.unwrap_or(0.0))
}

/// Opacity is either a number or a percentage
fn optional_opacity(node: roxmltree::Node<'_, '_>, name: &str) -> Result<Option<Scalar>, Error> {
    node.attribute(name)
        .map(|value| match value.trim().strip_suffix('%') {
            Some(percent) => Ok(parse_scalar(name, percent)? / 100.0),
            None => parse_scalar(name, value),
        })
        .transpose()
}

fn parse_number_list(name: &str, value: &str) -> Result<Vec<Scalar>, Error> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| parse_scalar(name, s))
        .collect()
}

fn parse_points(value: &str) -> Result<Vec<Point>, Error> {
    let numbers = parse_number_list("points", value)?;
    if numbers.len() % 2 != 0 {
        return Err(invalid_attribute("points", value));
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|xy| Point::new(xy[0], xy[1]))
        .collect())
}
