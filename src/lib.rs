//! Small converter from SVG icons to the compact binary [IconVG] format.
//!
//! Main features:
//!  - SVG path data parsing and generation
//!  - Normalization of basic shapes (rect, circle, ellipse, polygon, polyline) into paths
//!  - Configurable exclusion of elements, such as invisible bounding boxes
//!  - Size optimized IconVG encoding, shortest of absolute or relative forms is chosen
//!    for every command
//!
//! ```no_run
//! use ivgconv::{ConvertOptions, convert_file};
//!
//! let options = ConvertOptions::default().with_output_size(24.0);
//! let icon = convert_file("icon.svg", &options)?;
//! # Ok::<(), ivgconv::Error>(())
//! ```
//!
//! [IconVG]: https://github.com/google/iconvg
mod color;
mod convert;
#[cfg(test)]
mod disasm;
pub mod element;
mod encode;
mod error;
mod exclude;
mod geometry;
mod normalize;
mod number;
mod path;

pub use color::{Rgba, encode_color, opacity_weight};
pub use convert::{ConvertOptions, DEFAULT_OUTPUT_SIZE, convert, convert_drawing, convert_file};
pub use element::{Element, Paint};
pub use encode::{Encoder, MAGIC};
pub use error::Error;
pub use exclude::{ElementFilter, ExcludeRule, Exclusions};
pub use geometry::{EPSILON, Point, Scalar, ScalarFmt, Transform, ViewBox, scalar_fmt};
pub use normalize::{Canvas, Drawing};
pub use number::{Buffer, coordinate_len, quantize_coordinate, zero_to_one_len};
pub use path::{
    CurveFamily, PathCmd, PathCursor, PathParser, Segment, format_path_data, parse_path_data,
    resolve_path_data,
};

#[cfg(test)]
mod tests {
    #[macro_export]
    macro_rules! assert_approx_eq {
        ( $v0:expr, $v1: expr ) => {{
            assert!(($v0 - $v1).abs() < $crate::EPSILON, "{} != {}", $v0, $v1);
        }};
        ( $v0:expr, $v1: expr, $e: expr ) => {{
            assert!(($v0 - $v1).abs() < $e, "{} != {}", $v0, $v1);
        }};
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<crate::ConvertOptions>();
        assert_send_sync::<crate::Drawing>();
        assert_send_sync::<crate::Exclusions>();
    }
}
