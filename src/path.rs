//! SVG path data parser
//!
//! See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
use crate::{Error, Point, Scalar, ScalarFmt};
use std::fmt;

/// Maximum number of characters of the input reported with a parse error
const FRAGMENT_LEN: usize = 16;

/// Single SVG path command, exactly as it was written.
///
/// `abs` is `true` for upper case (absolute) commands, operands of relative
/// commands are offsets from the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo {
        abs: bool,
        to: Point,
    },
    LineTo {
        abs: bool,
        to: Point,
    },
    HLineTo {
        abs: bool,
        x: Scalar,
    },
    VLineTo {
        abs: bool,
        y: Scalar,
    },
    CubicTo {
        abs: bool,
        c1: Point,
        c2: Point,
        to: Point,
    },
    /// Cubic with the first control point reflected from the previous cubic
    SmoothCubicTo {
        abs: bool,
        c2: Point,
        to: Point,
    },
    QuadTo {
        abs: bool,
        c1: Point,
        to: Point,
    },
    /// Quad with the control point reflected from the previous quad
    SmoothQuadTo {
        abs: bool,
        to: Point,
    },
    ArcTo {
        abs: bool,
        radii: Point,
        /// rotation of the ellipse x axis in degrees
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

impl PathCmd {
    /// SVG command letter
    pub fn letter(&self) -> char {
        use PathCmd::*;
        let (upper, abs) = match *self {
            MoveTo { abs, .. } => ('M', abs),
            LineTo { abs, .. } => ('L', abs),
            HLineTo { abs, .. } => ('H', abs),
            VLineTo { abs, .. } => ('V', abs),
            CubicTo { abs, .. } => ('C', abs),
            SmoothCubicTo { abs, .. } => ('S', abs),
            QuadTo { abs, .. } => ('Q', abs),
            SmoothQuadTo { abs, .. } => ('T', abs),
            ArcTo { abs, .. } => ('A', abs),
            Close => ('Z', true),
        };
        if abs { upper } else { upper.to_ascii_lowercase() }
    }
}

impl fmt::Display for PathCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PathCmd::*;
        fn points(f: &mut fmt::Formatter<'_>, points: &[Point]) -> fmt::Result {
            for (index, point) in points.iter().enumerate() {
                if index != 0 {
                    write!(f, " ")?;
                }
                write!(f, "{} {}", ScalarFmt(point.x()), ScalarFmt(point.y()))?;
            }
            Ok(())
        }

        write!(f, "{}", self.letter())?;
        match *self {
            MoveTo { to, .. } | LineTo { to, .. } | SmoothQuadTo { to, .. } => points(f, &[to]),
            HLineTo { x, .. } => write!(f, "{}", ScalarFmt(x)),
            VLineTo { y, .. } => write!(f, "{}", ScalarFmt(y)),
            CubicTo { c1, c2, to, .. } => points(f, &[c1, c2, to]),
            SmoothCubicTo { c2, to, .. } => points(f, &[c2, to]),
            QuadTo { c1, to, .. } => points(f, &[c1, to]),
            ArcTo {
                radii,
                x_axis_rot,
                large,
                sweep,
                to,
                ..
            } => {
                points(f, &[radii])?;
                write!(
                    f,
                    " {} {} {} ",
                    ScalarFmt(x_axis_rot),
                    large as u8,
                    sweep as u8
                )?;
                points(f, &[to])
            }
            Close => Ok(()),
        }
    }
}

/// Write commands as compact SVG path data
pub fn format_path_data(cmds: &[PathCmd]) -> String {
    cmds.iter().map(|cmd| cmd.to_string()).collect()
}

/// Parse SVG path data into the list of commands
pub fn parse_path_data(text: &str) -> Result<Vec<PathCmd>, Error> {
    PathParser::new(text).collect()
}

/// Absolute path segment with all control points spelled out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Move(Point),
    Line(Point),
    Quad(Point, Point),
    Cubic(Point, Point, Point),
    Arc {
        radii: Point,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        to: Point,
    },
    /// Close current sub-path, carries the sub-path start point
    Close(Point),
}

impl Segment {
    /// Destination point of the segment
    pub fn dst(&self) -> Point {
        use Segment::*;
        match *self {
            Move(dst) | Line(dst) | Quad(_, dst) | Cubic(_, _, dst) | Close(dst) => dst,
            Arc { to, .. } => to,
        }
    }
}

/// Family of the curve, smooth commands only reflect control points of the same family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFamily {
    Quad,
    Cubic,
}

/// State carried between path commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathCursor {
    // current position from which next relative command will start
    position: Point,
    // current sub-path starting position
    subpath_start: Point,
    // last control point of the previous command if it was a curve
    prev_ctrl: Option<(CurveFamily, Point)>,
}

impl PathCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position
    pub fn position(&self) -> Point {
        self.position
    }

    /// Control point of the previous curve if it is of the given family
    pub fn prev_ctrl(&self, family: CurveFamily) -> Option<Point> {
        match self.prev_ctrl {
            Some((prev, ctrl)) if prev == family => Some(ctrl),
            _ => None,
        }
    }

    /// Implicit first control point of a smooth curve of the given family
    pub fn smooth_ctrl(&self, family: CurveFamily) -> Point {
        match self.prev_ctrl(family) {
            Some(ctrl) => ctrl.reflect(self.position),
            None => self.position,
        }
    }

    fn point(&self, abs: bool, point: Point) -> Point {
        if abs { point } else { point + self.position }
    }

    /// Resolve command into an absolute segment and advance the cursor
    pub fn resolve(&mut self, cmd: &PathCmd) -> Segment {
        use PathCmd::*;
        let mut ctrl = None;
        let segment = match *cmd {
            MoveTo { abs, to } => {
                let to = self.point(abs, to);
                self.subpath_start = to;
                Segment::Move(to)
            }
            LineTo { abs, to } => Segment::Line(self.point(abs, to)),
            HLineTo { abs, x } => {
                let p0 = self.position;
                let x = if abs { x } else { p0.x() + x };
                Segment::Line(Point::new(x, p0.y()))
            }
            VLineTo { abs, y } => {
                let p0 = self.position;
                let y = if abs { y } else { p0.y() + y };
                Segment::Line(Point::new(p0.x(), y))
            }
            CubicTo { abs, c1, c2, to } => {
                let c2 = self.point(abs, c2);
                ctrl = Some((CurveFamily::Cubic, c2));
                Segment::Cubic(self.point(abs, c1), c2, self.point(abs, to))
            }
            SmoothCubicTo { abs, c2, to } => {
                let c1 = self.smooth_ctrl(CurveFamily::Cubic);
                let c2 = self.point(abs, c2);
                ctrl = Some((CurveFamily::Cubic, c2));
                Segment::Cubic(c1, c2, self.point(abs, to))
            }
            QuadTo { abs, c1, to } => {
                let c1 = self.point(abs, c1);
                ctrl = Some((CurveFamily::Quad, c1));
                Segment::Quad(c1, self.point(abs, to))
            }
            SmoothQuadTo { abs, to } => {
                let c1 = self.smooth_ctrl(CurveFamily::Quad);
                ctrl = Some((CurveFamily::Quad, c1));
                Segment::Quad(c1, self.point(abs, to))
            }
            ArcTo {
                abs,
                radii,
                x_axis_rot,
                large,
                sweep,
                to,
            } => Segment::Arc {
                radii,
                x_axis_rot,
                large,
                sweep,
                to: self.point(abs, to),
            },
            Close => Segment::Close(self.subpath_start),
        };
        self.position = segment.dst();
        self.prev_ctrl = ctrl;
        segment
    }
}

/// Resolve all commands into absolute segments
pub fn resolve_path_data(cmds: &[PathCmd]) -> Vec<Segment> {
    let mut cursor = PathCursor::new();
    cmds.iter().map(|cmd| cursor.resolve(cmd)).collect()
}

/// Path parser for SVG encoded path
#[derive(Debug)]
pub struct PathParser<'a> {
    // text containing unparsed path
    text: &'a [u8],
    // current offset in the text
    offset: usize,
    // command repeated when coordinates follow without a command letter
    prev_cmd: Option<u8>,
    // whether the leading move-to has been parsed
    started: bool,
    // parser stops after the first error
    failed: bool,
}

impl<'a> PathParser<'a> {
    pub fn new(text: &'a str) -> PathParser<'a> {
        Self {
            text: text.as_bytes(),
            offset: 0,
            prev_cmd: None,
            started: false,
            failed: false,
        }
    }

    /// Error construction helper
    fn error_at<S: Into<String>>(&self, offset: usize, reason: S) -> Error {
        let rest = String::from_utf8_lossy(&self.text[offset.min(self.text.len())..]);
        Error::MalformedPathData {
            reason: reason.into(),
            offset,
            fragment: rest.chars().take(FRAGMENT_LEN).collect(),
        }
    }

    fn error<S: Into<String>>(&self, reason: S) -> Error {
        self.error_at(self.offset, reason)
    }

    /// Byte at the current position
    fn peek(&self) -> Option<u8> {
        self.text.get(self.offset).copied()
    }

    /// Advance current position by `count` bytes
    fn advance(&mut self, count: usize) {
        self.offset += count;
    }

    /// Consume insignificant separators
    fn parse_separators(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n' | b'\x0c' | b',') = self.peek() {
            self.advance(1);
        }
    }

    /// Consume digits, returns true if at least one digit was found
    fn parse_digits(&mut self) -> bool {
        let start = self.offset;
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance(1);
        }
        self.offset > start
    }

    /// Consume `+|-` sign
    fn parse_sign(&mut self) {
        if let Some(b'-' | b'+') = self.peek() {
            self.advance(1);
        }
    }

    /// Parse single scalar
    fn parse_scalar(&mut self) -> Result<Scalar, Error> {
        self.parse_separators();
        let start = self.offset;
        self.parse_sign();
        let whole = self.parse_digits();
        let fraction = match self.peek() {
            Some(b'.') => {
                self.advance(1);
                self.parse_digits()
            }
            _ => false,
        };
        if !whole && !fraction {
            self.offset = start;
            return Err(self.error("expected number"));
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.advance(1);
            self.parse_sign();
            if !self.parse_digits() {
                return Err(self.error_at(start, "malformed exponent"));
            }
        }
        let value: Scalar = lexical_core::parse(&self.text[start..self.offset])
            .map_err(|_| self.error_at(start, "malformed number"))?;
        if !value.is_finite() {
            return Err(self.error_at(start, "number out of range"));
        }
        Ok(value)
    }

    /// Parse pair of scalars
    fn parse_point(&mut self) -> Result<Point, Error> {
        let x = self.parse_scalar()?;
        let y = self.parse_scalar()?;
        Ok(Point::new(x, y))
    }

    /// Parse SVG flag `0|1` used by elliptic arc command
    fn parse_flag(&mut self) -> Result<bool, Error> {
        self.parse_separators();
        match self.peek() {
            Some(b'0') => {
                self.advance(1);
                Ok(false)
            }
            Some(b'1') => {
                self.advance(1);
                Ok(true)
            }
            _ => Err(self.error("expected flag")),
        }
    }

    /// Parse SVG command letter, or reuse the previous one for implicit repetition
    fn parse_op(&mut self) -> Result<u8, Error> {
        let (op, explicit) = match self.peek() {
            Some(
                op @ (b'M' | b'm' | b'L' | b'l' | b'V' | b'v' | b'H' | b'h' | b'C' | b'c' | b'S'
                | b's' | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' | b'Z' | b'z'),
            ) => (op, true),
            Some(byte) if byte.is_ascii_alphabetic() => {
                return Err(self.error("unknown command"));
            }
            _ => match self.prev_cmd {
                Some(op) => (op, false),
                None => return Err(self.error("expected command")),
            },
        };
        if !self.started && !matches!(op, b'M' | b'm') {
            return Err(self.error("path data must start with a move command"));
        }
        if explicit {
            self.advance(1);
        }
        self.started = true;
        self.prev_cmd = match op {
            b'M' => Some(b'L'),
            b'm' => Some(b'l'),
            b'Z' | b'z' => None,
            op => Some(op),
        };
        Ok(op)
    }

    /// Parse single SVG path command, none indicates end of input
    pub fn parse_cmd(&mut self) -> Result<Option<PathCmd>, Error> {
        self.parse_separators();
        if self.peek().is_none() {
            return Ok(None);
        }
        let op = self.parse_op()?;
        let abs = op.is_ascii_uppercase();
        let cmd = match op.to_ascii_lowercase() {
            b'm' => PathCmd::MoveTo {
                abs,
                to: self.parse_point()?,
            },
            b'l' => PathCmd::LineTo {
                abs,
                to: self.parse_point()?,
            },
            b'h' => PathCmd::HLineTo {
                abs,
                x: self.parse_scalar()?,
            },
            b'v' => PathCmd::VLineTo {
                abs,
                y: self.parse_scalar()?,
            },
            b'c' => PathCmd::CubicTo {
                abs,
                c1: self.parse_point()?,
                c2: self.parse_point()?,
                to: self.parse_point()?,
            },
            b's' => PathCmd::SmoothCubicTo {
                abs,
                c2: self.parse_point()?,
                to: self.parse_point()?,
            },
            b'q' => PathCmd::QuadTo {
                abs,
                c1: self.parse_point()?,
                to: self.parse_point()?,
            },
            b't' => PathCmd::SmoothQuadTo {
                abs,
                to: self.parse_point()?,
            },
            b'a' => PathCmd::ArcTo {
                abs,
                radii: self.parse_point()?,
                x_axis_rot: self.parse_scalar()?,
                large: self.parse_flag()?,
                sweep: self.parse_flag()?,
                to: self.parse_point()?,
            },
            b'z' => PathCmd::Close,
            _ => unreachable!(),
        };
        Ok(Some(cmd))
    }
}

impl Iterator for PathParser<'_> {
    type Item = Result<PathCmd, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.parse_cmd().transpose();
        self.failed = matches!(result, Some(Err(_)));
        result
    }
}
