//! SVG elements understood by the converter
use crate::{Error, PathCmd, Point, Scalar, format_path_data, parse_path_data};

/// Fill of an element
///
/// Only the fill token takes part in equality, opacities are ignored.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Paint {
    /// Raw value of the `fill` attribute, empty if missing
    pub fill: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fill_opacity: Option<Scalar>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub opacity: Option<Scalar>,
}

impl PartialEq for Paint {
    fn eq(&self, other: &Self) -> bool {
        self.fill == other.fill
    }
}

impl Paint {
    pub fn new(fill: impl Into<String>) -> Self {
        Self {
            fill: fill.into(),
            ..Default::default()
        }
    }

    /// Whether fill is exactly `none`
    pub fn is_none(&self) -> bool {
        self.fill == "none"
    }

    /// Combined opacity of the fill in `[0, 1]`
    pub fn alpha(&self) -> Scalar {
        let opacity = self.opacity.unwrap_or(1.0) * self.fill_opacity.unwrap_or(1.0);
        opacity.clamp(0.0, 1.0)
    }
}

/// `<path>`, also the canonical form every other shape is converted into
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Path {
    pub d: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub paint: Paint,
}

impl Path {
    pub fn new(d: impl Into<String>, paint: Paint) -> Self {
        Self { d: d.into(), paint }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Circle {
    pub cx: Scalar,
    pub cy: Scalar,
    pub r: Scalar,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub paint: Paint,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Ellipse {
    pub cx: Scalar,
    pub cy: Scalar,
    pub rx: Scalar,
    pub ry: Scalar,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub paint: Paint,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Rect {
    pub x: Scalar,
    pub y: Scalar,
    pub width: Scalar,
    pub height: Scalar,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub paint: Paint,
}

/// `<polygon>` or `<polyline>` (not closed)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Polygon {
    pub points: Vec<Point>,
    pub closed: bool,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub paint: Paint,
}

impl Default for Polygon {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            closed: true,
            paint: Paint::default(),
        }
    }
}

/// Drawable SVG element
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum Element {
    Path(Path),
    Circle(Circle),
    Rect(Rect),
    Ellipse(Ellipse),
    Polygon(Polygon),
}

impl Element {
    /// Tag name of the element
    pub fn name(&self) -> &'static str {
        match self {
            Element::Path(_) => "path",
            Element::Circle(_) => "circle",
            Element::Rect(_) => "rect",
            Element::Ellipse(_) => "ellipse",
            Element::Polygon(polygon) if polygon.closed => "polygon",
            Element::Polygon(_) => "polyline",
        }
    }

    pub fn paint(&self) -> &Paint {
        match self {
            Element::Path(path) => &path.paint,
            Element::Circle(circle) => &circle.paint,
            Element::Rect(rect) => &rect.paint,
            Element::Ellipse(ellipse) => &ellipse.paint,
            Element::Polygon(polygon) => &polygon.paint,
        }
    }

    pub fn fill(&self) -> &str {
        &self.paint().fill
    }

    /// Path commands drawing the same shape, fails if path data is malformed
    pub fn to_path_cmds(&self) -> Result<Vec<PathCmd>, Error> {
        match self {
            Element::Path(path) => parse_path_data(&path.d),
            shape => Ok(shape.shape_cmds()),
        }
    }

    /// Commands of the basic shapes, paths carry their own data
    fn shape_cmds(&self) -> Vec<PathCmd> {
        match self {
            Element::Path(_) => Vec::new(),
            Element::Rect(rect) => rect_cmds(rect),
            Element::Circle(circle) => {
                ellipse_cmds(Point::new(circle.cx, circle.cy), circle.r, circle.r)
            }
            Element::Ellipse(ellipse) => {
                ellipse_cmds(Point::new(ellipse.cx, ellipse.cy), ellipse.rx, ellipse.ry)
            }
            Element::Polygon(polygon) => polygon_cmds(polygon),
        }
    }

    /// Convert element into the canonical path
    ///
    /// Path data of `<path>` elements is kept untouched.
    pub fn into_path(self) -> Path {
        match self {
            Element::Path(path) => path,
            shape => {
                let d = format_path_data(&shape.shape_cmds());
                Path::new(d, shape.paint().clone())
            }
        }
    }
}

impl From<Path> for Element {
    fn from(path: Path) -> Self {
        Element::Path(path)
    }
}

/// Move to the top-left corner, then horizontal and vertical lines around the box
fn rect_cmds(rect: &Rect) -> Vec<PathCmd> {
    vec![
        PathCmd::MoveTo {
            abs: true,
            to: Point::new(rect.x, rect.y),
        },
        PathCmd::HLineTo {
            abs: false,
            x: rect.width,
        },
        PathCmd::VLineTo {
            abs: false,
            y: rect.height,
        },
        PathCmd::HLineTo {
            abs: false,
            x: -rect.width,
        },
        PathCmd::Close,
    ]
}

/// Two half-ellipse arcs starting from the left-most point
fn ellipse_cmds(center: Point, rx: Scalar, ry: Scalar) -> Vec<PathCmd> {
    let radii = Point::new(rx, ry);
    let arc = |dx: Scalar| PathCmd::ArcTo {
        abs: false,
        radii,
        x_axis_rot: 0.0,
        large: true,
        sweep: false,
        to: Point::new(dx, 0.0),
    };
    vec![
        PathCmd::MoveTo {
            abs: true,
            to: Point::new(center.x() - rx, center.y()),
        },
        arc(2.0 * rx),
        arc(-2.0 * rx),
        PathCmd::Close,
    ]
}

fn polygon_cmds(polygon: &Polygon) -> Vec<PathCmd> {
    let mut cmds: Vec<PathCmd> = polygon
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            if index == 0 {
                PathCmd::MoveTo {
                    abs: true,
                    to: *point,
                }
            } else {
                PathCmd::LineTo {
                    abs: true,
                    to: *point,
                }
            }
        })
        .collect();
    if polygon.closed && !cmds.is_empty() {
        cmds.push(PathCmd::Close);
    }
    cmds
}
