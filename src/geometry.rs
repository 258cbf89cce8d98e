use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

pub type Scalar = f32;
pub const EPSILON: f32 = 1e-4;

/// Format scalar in the shortest form which parses back to the same value
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        // also turns `-0` into `0`
        write!(f, "{}", value as i64)
    } else {
        let mut buffer = [0u8; lexical_core::BUFFER_SIZE];
        let bytes = lexical_core::write(value, &mut buffer);
        // lexical only ever produces ascii
        f.write_str(std::str::from_utf8(bytes).map_err(|_| fmt::Error)?)
    }
}

/// Wrapper which formats a scalar with [`scalar_fmt`]
#[derive(Clone, Copy)]
pub struct ScalarFmt(pub Scalar);

impl fmt::Display for ScalarFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        scalar_fmt(f, self.0)
    }
}

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        scalar_fmt(f, *x)?;
        write!(f, ",")?;
        scalar_fmt(f, *y)?;
        Ok(())
    }
}

impl Point {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` component of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Reflect `self` through `center`, used to infer smooth curve control points
    pub fn reflect(self, center: Point) -> Point {
        2.0 * center - self
    }

    /// Determine if self is close to the other within the margin of error `eps`
    pub fn is_close_to(self, other: Point, eps: Scalar) -> bool {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).abs() < eps && (y0 - y1).abs() < eps
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

/// Source view box `(min_x, min_y, width, height)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewBox {
    pub min_x: Scalar,
    pub min_y: Scalar,
    pub width: Scalar,
    pub height: Scalar,
}

impl ViewBox {
    pub fn new(min_x: Scalar, min_y: Scalar, width: Scalar, height: Scalar) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width / 2.0,
            self.min_y + self.height / 2.0,
        )
    }
}

/// Uniform scale followed by translation, maps source coordinates into
/// icon space `[-size/2, size/2]` centered at the origin.
#[derive(Clone, Copy, PartialEq)]
pub struct Transform {
    scale: Scalar,
    center: Point,
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scale({}) center({:?})", ScalarFmt(self.scale), self.center)
    }
}

impl Transform {
    /// Fit view box into a square of the size `size`, preserving aspect ratio
    pub fn fit(view_box: &ViewBox, size: Scalar) -> Self {
        Self {
            scale: size / view_box.width.max(view_box.height),
            center: view_box.center(),
        }
    }

    pub fn scale(&self) -> Scalar {
        self.scale
    }

    /// Map absolute point
    pub fn apply(&self, point: Point) -> Point {
        self.scale * (point - self.center)
    }

    pub fn apply_x(&self, x: Scalar) -> Scalar {
        self.scale * (x - self.center.x())
    }

    pub fn apply_y(&self, y: Scalar) -> Scalar {
        self.scale * (y - self.center.y())
    }

    /// Map vector, translation is not applied
    pub fn apply_vector(&self, vector: Point) -> Point {
        self.scale * vector
    }

    /// Inverse of [`Transform::apply`]
    pub fn invert(&self, point: Point) -> Point {
        (1.0 / self.scale) * point + self.center
    }
}
