//! Reference IconVG decoder used to verify encoded output
use crate::{Point, Scalar, Segment, Transform, parse_path_data, resolve_path_data};

/// Decoded icon
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub view_box: [Scalar; 4],
    /// raw bytes of the suggested palette colors
    pub palette: Vec<Vec<u8>>,
    /// color registers set with indirect colors `(adj, [t, c0, c1])`
    pub registers: Vec<(u8, [u8; 3])>,
    pub paths: Vec<IconPath>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconPath {
    /// color register adjustment of the start path opcode
    pub adj: u8,
    /// one letter per decoded command, lower case for relative forms,
    /// `M` for start and `Z` for every close
    pub ops: String,
    /// absolute segments in the icon space
    pub segments: Vec<Segment>,
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    fn bytes(&mut self, count: usize) -> Result<&'a [u8], String> {
        let end = self.offset + count;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or_else(|| format!("unexpected end of data at {}", self.offset))?;
        self.offset = end;
        Ok(bytes)
    }

    fn byte(&mut self) -> Result<u8, String> {
        Ok(self.bytes(1)?[0])
    }

    fn peek(&self) -> Result<u8, String> {
        self.data
            .get(self.offset)
            .copied()
            .ok_or_else(|| format!("unexpected end of data at {}", self.offset))
    }

    /// Width tagged little-endian number, returns `(value, width)`
    fn tagged(&mut self) -> Result<(u32, usize), String> {
        let first = self.peek()?;
        if first & 1 == 0 {
            Ok((self.byte()? as u32, 1))
        } else if first & 3 == 1 {
            let bytes = self.bytes(2)?;
            Ok((u16::from_le_bytes([bytes[0], bytes[1]]) as u32, 2))
        } else {
            let bytes = self.bytes(4)?;
            Ok((u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 4))
        }
    }

    fn natural(&mut self) -> Result<u32, String> {
        Ok(match self.tagged()? {
            (value, 1) => value >> 1,
            (value, _) => value >> 2,
        })
    }

    fn coordinate(&mut self) -> Result<Scalar, String> {
        Ok(match self.tagged()? {
            (value, 1) => (value >> 1) as Scalar - 64.0,
            (value, 2) => ((value >> 2) as Scalar - 8192.0) / 64.0,
            (value, _) => Scalar::from_bits(value & !3),
        })
    }

    fn zero_to_one(&mut self) -> Result<Scalar, String> {
        Ok(match self.tagged()? {
            (value, 1) => (value >> 1) as Scalar / 120.0,
            (value, 2) => (value >> 2) as Scalar / 15120.0,
            (value, _) => Scalar::from_bits(value & !3),
        })
    }

    fn point(&mut self) -> Result<Point, String> {
        let x = self.coordinate()?;
        let y = self.coordinate()?;
        Ok(Point::new(x, y))
    }
}

/// Decoder state of a single path
struct PathDecoder {
    pen: Point,
    start: Point,
    // last control point and whether it was a cubic one
    ctrl: Option<(bool, Point)>,
    ops: String,
    segments: Vec<Segment>,
}

impl PathDecoder {
    fn point(&self, reader: &mut Reader<'_>, rel: bool) -> Result<Point, String> {
        let point = reader.point()?;
        Ok(if rel { self.pen + point } else { point })
    }

    fn smooth_ctrl(&self, cubic: bool) -> Point {
        match self.ctrl {
            Some((prev, ctrl)) if prev == cubic => ctrl.reflect(self.pen),
            _ => self.pen,
        }
    }

    fn push(&mut self, op: char, rel: bool, segment: Segment, ctrl: Option<(bool, Point)>) {
        self.ops.push(if rel { op.to_ascii_lowercase() } else { op });
        self.pen = segment.dst();
        self.ctrl = ctrl;
        self.segments.push(segment);
    }

    fn close(&mut self) {
        self.ops.push('Z');
        self.segments.push(Segment::Close(self.start));
        self.pen = self.start;
        self.ctrl = None;
    }

    /// Decode drawing opcodes until the path is ended
    fn decode(&mut self, reader: &mut Reader<'_>) -> Result<(), String> {
        loop {
            let opcode = reader.byte()?;
            match opcode {
                0x00..=0x3f => {
                    let rel = opcode >= 0x20;
                    for _ in 0..=(opcode & 0x1f) {
                        let to = self.point(reader, rel)?;
                        self.push('L', rel, Segment::Line(to), None);
                    }
                }
                0x40..=0xdf => {
                    let rel = opcode & 0x10 != 0;
                    for _ in 0..=(opcode & 0x0f) {
                        match opcode & 0xe0 {
                            0x40 => {
                                let c1 = self.smooth_ctrl(false);
                                let to = self.point(reader, rel)?;
                                self.push('T', rel, Segment::Quad(c1, to), Some((false, c1)));
                            }
                            0x60 => {
                                let c1 = self.point(reader, rel)?;
                                let to = self.point(reader, rel)?;
                                self.push('Q', rel, Segment::Quad(c1, to), Some((false, c1)));
                            }
                            0x80 => {
                                let c1 = self.smooth_ctrl(true);
                                let c2 = self.point(reader, rel)?;
                                let to = self.point(reader, rel)?;
                                let segment = Segment::Cubic(c1, c2, to);
                                self.push('S', rel, segment, Some((true, c2)));
                            }
                            0xa0 => {
                                let c1 = self.point(reader, rel)?;
                                let c2 = self.point(reader, rel)?;
                                let to = self.point(reader, rel)?;
                                let segment = Segment::Cubic(c1, c2, to);
                                self.push('C', rel, segment, Some((true, c2)));
                            }
                            _ => {
                                let radii = reader.point()?;
                                let x_axis_rot = reader.zero_to_one()? * 360.0;
                                let flags = reader.natural()?;
                                let to = self.point(reader, rel)?;
                                let segment = Segment::Arc {
                                    radii,
                                    x_axis_rot,
                                    large: flags & 1 != 0,
                                    sweep: flags & 2 != 0,
                                    to,
                                };
                                self.push('A', rel, segment, None);
                            }
                        }
                    }
                }
                0xe1 => {
                    self.close();
                    return Ok(());
                }
                0xe2 | 0xe3 => {
                    self.close();
                    let rel = opcode == 0xe3;
                    let to = self.point(reader, rel)?;
                    self.start = to;
                    self.push('M', rel, Segment::Move(to), None);
                }
                0xe6..=0xe9 => {
                    let rel = opcode & 1 != 0;
                    let value = reader.coordinate()?;
                    let horizontal = opcode < 0xe8;
                    let Point([x, y]) = self.pen;
                    let to = match (horizontal, rel) {
                        (true, false) => Point::new(value, y),
                        (true, true) => Point::new(x + value, y),
                        (false, false) => Point::new(x, value),
                        (false, true) => Point::new(x, y + value),
                    };
                    let op = if horizontal { 'H' } else { 'V' };
                    self.push(op, rel, Segment::Line(to), None);
                }
                _ => return Err(format!("unsupported drawing opcode {opcode:#04x}")),
            }
        }
    }
}

/// Decode IconVG data
pub fn decode(data: &[u8]) -> Result<Icon, String> {
    let mut reader = Reader { data, offset: 0 };
    if reader.bytes(4)? != &crate::encode::MAGIC[..] {
        return Err("invalid magic".to_owned());
    }
    let mut icon = Icon {
        view_box: [-32.0, -32.0, 32.0, 32.0],
        palette: Vec::new(),
        registers: Vec::new(),
        paths: Vec::new(),
    };

    let chunks = reader.natural()?;
    for _ in 0..chunks {
        let len = reader.natural()? as usize;
        let chunk_end = reader.offset + len;
        match reader.natural()? {
            0 => {
                for value in icon.view_box.iter_mut() {
                    *value = reader.coordinate()?;
                }
            }
            1 => {
                let layout = reader.byte()?;
                let count = (layout & 0x3f) as usize + 1;
                let size = (layout >> 6) as usize + 1;
                for _ in 0..count {
                    icon.palette.push(reader.bytes(size)?.to_vec());
                }
            }
            mid => return Err(format!("unsupported metadata {mid}")),
        }
        if reader.offset != chunk_end {
            return Err(format!("metadata chunk length mismatch at {}", reader.offset));
        }
    }

    // styling mode
    while !reader.is_empty() {
        let opcode = reader.byte()?;
        match opcode {
            0xa0..=0xa6 => {
                let bytes = reader.bytes(3)?;
                icon.registers
                    .push((opcode & 7, [bytes[0], bytes[1], bytes[2]]));
            }
            0xc0..=0xc6 => {
                let start = reader.point()?;
                let mut path = PathDecoder {
                    pen: start,
                    start,
                    ctrl: None,
                    ops: "M".to_owned(),
                    segments: vec![Segment::Move(start)],
                };
                path.decode(&mut reader)?;
                icon.paths.push(IconPath {
                    adj: opcode & 7,
                    ops: path.ops,
                    segments: path.segments,
                });
            }
            _ => return Err(format!("unsupported styling opcode {opcode:#04x}")),
        }
    }
    Ok(icon)
}

/// Segments the encoder is expected to reproduce for the path data, mapped
/// into the icon space. Every sub-path ends with exactly one close, drawing
/// after close starts with an explicit move.
pub fn reference(d: &str, tr: &Transform) -> Vec<Segment> {
    let segments = match parse_path_data(d) {
        Ok(cmds) => resolve_path_data(&cmds),
        Err(error) => panic!("invalid path data: {error}"),
    };
    let scale = tr.scale();
    let mut result = Vec::new();
    let mut started = false;
    let mut closed = false;
    let mut start = Point::default();
    for segment in segments {
        let segment = match segment {
            Segment::Move(to) => Segment::Move(tr.apply(to)),
            Segment::Line(to) => Segment::Line(tr.apply(to)),
            Segment::Quad(c1, to) => Segment::Quad(tr.apply(c1), tr.apply(to)),
            Segment::Cubic(c1, c2, to) => Segment::Cubic(tr.apply(c1), tr.apply(c2), tr.apply(to)),
            Segment::Arc {
                radii,
                x_axis_rot,
                large,
                sweep,
                to,
            } => Segment::Arc {
                radii: scale * radii,
                x_axis_rot: x_axis_rot.rem_euclid(360.0),
                large,
                sweep,
                to: tr.apply(to),
            },
            Segment::Close(to) => Segment::Close(tr.apply(to)),
        };
        match segment {
            Segment::Move(to) => {
                if started && !closed {
                    result.push(Segment::Close(start));
                }
                started = true;
                closed = false;
                start = to;
                result.push(segment);
            }
            Segment::Close(_) => {
                if !closed {
                    result.push(Segment::Close(start));
                    closed = true;
                }
            }
            segment => {
                if closed {
                    result.push(Segment::Move(start));
                    closed = false;
                }
                result.push(segment);
            }
        }
    }
    if started && !closed {
        result.push(Segment::Close(start));
    }
    result
}

fn segment_points(segment: &Segment) -> Vec<Point> {
    match *segment {
        Segment::Move(to) | Segment::Line(to) | Segment::Close(to) => vec![to],
        Segment::Quad(c1, to) => vec![c1, to],
        Segment::Cubic(c1, c2, to) => vec![c1, c2, to],
        Segment::Arc {
            radii,
            x_axis_rot,
            to,
            ..
        } => vec![radii, Point::new(x_axis_rot, 0.0), to],
    }
}

/// Compare segments kind by kind, points within `eps`
pub fn assert_segments_eq(actual: &[Segment], expected: &[Segment], eps: Scalar) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "\nactual: {:?}\nexpected: {:?}",
        actual,
        expected
    );
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            std::mem::discriminant(a),
            std::mem::discriminant(e),
            "segment {index}: {a:?} != {e:?}"
        );
        if let (
            Segment::Arc {
                large: l0,
                sweep: s0,
                ..
            },
            Segment::Arc {
                large: l1,
                sweep: s1,
                ..
            },
        ) = (a, e)
        {
            assert_eq!((l0, s0), (l1, s1), "segment {index}: arc flags");
        }
        for (pa, pe) in segment_points(a).into_iter().zip(segment_points(e)) {
            assert!(
                pa.is_close_to(pe, eps),
                "segment {index}: {a:?} != {e:?}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewBox;

    #[test]
    fn test_reference_closes() {
        // icon space is the default one, points are kept as is
        let tr = Transform::fit(&ViewBox::new(-32.0, -32.0, 64.0, 64.0), 64.0);
        let segments = reference("M0 0L1 0ZZl0 1M5 5L6 6", &tr);
        assert_eq!(
            segments,
            vec![
                Segment::Move(Point::new(0.0, 0.0)),
                Segment::Line(Point::new(1.0, 0.0)),
                Segment::Close(Point::new(0.0, 0.0)),
                Segment::Move(Point::new(0.0, 0.0)),
                Segment::Line(Point::new(0.0, 1.0)),
                Segment::Close(Point::new(0.0, 0.0)),
                Segment::Move(Point::new(5.0, 5.0)),
                Segment::Line(Point::new(6.0, 6.0)),
                Segment::Close(Point::new(5.0, 5.0)),
            ]
        );
    }

    #[test]
    fn test_decode_numbers() {
        let mut reader = Reader {
            data: &[0x80, 0x81, 0x80, 0x78, 0xc5, 0x0e, 0x02, 0x01, 0x02],
            offset: 0,
        };
        assert_eq!(reader.coordinate(), Ok(0.0));
        assert_eq!(reader.coordinate(), Ok(0.5));
        assert_eq!(reader.zero_to_one(), Ok(0.5));
        assert_eq!(reader.zero_to_one(), Ok(0.0625));
        assert_eq!(reader.natural(), Ok(1));
        assert_eq!(reader.natural(), Ok(128));
        assert!(reader.is_empty());
        assert!(decode(&[0x89, 0x49, 0x56]).is_err());
        assert!(decode(&[0x89, 0x49, 0x56, 0x46, 0x00]).is_err());
    }
}
