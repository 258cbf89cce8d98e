//! IconVG encoder
//!
//! See [IconVG](https://github.com/google/iconvg/blob/main/spec/iconvg-spec.md)
//! for the description of the format. Every drawing command is emitted in
//! absolute or relative form whichever is shorter, the encoder tracks the pen
//! position exactly as the decoder will compute it from the quantized numbers.
use crate::{
    CurveFamily, DEFAULT_OUTPUT_SIZE, Drawing, Error, PathCmd, Point, Rgba, Scalar, Transform,
    color::{COLOR1_PALETTE0, COLOR1_TRANSPARENT, encode_color, opacity_weight},
    number::{Buffer, coordinate_len, quantize_coordinate},
    parse_path_data,
};

/// IconVG magic identifier
pub const MAGIC: [u8; 4] = [0x89, 0x49, 0x56, 0x47];

/// Half size of the default IconVG view box `(-32, -32, 32, 32)`
const DEFAULT_HALF_SIZE: Scalar = 32.0;

const MID_VIEW_BOX: u32 = 0;
const MID_SUGGESTED_PALETTE: u32 = 1;

/// Number of color registers used for translucent paths, adjustments `1..=6`
const REGISTERS_COUNT: usize = 6;

// styling mode opcodes
const OP_SET_CREG_INDIRECT: u8 = 0xa0;
const OP_START_PATH: u8 = 0xc0;

// drawing mode opcodes
const OP_CLOSE_END_PATH: u8 = 0xe1;
const OP_CLOSE_ABS_MOVE: u8 = 0xe2;
const OP_CLOSE_REL_MOVE: u8 = 0xe3;
const OP_HLINE: u8 = 0xe6;
const OP_VLINE: u8 = 0xe8;

/// Drawing opcodes carrying a repeat count in their low bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Line,
    SmoothQuad,
    Quad,
    SmoothCubic,
    Cubic,
    Arc,
}

impl Op {
    fn opcode(self, abs: bool) -> u8 {
        let (abs_op, rel_op) = match self {
            Op::Line => (0x00, 0x20),
            Op::SmoothQuad => (0x40, 0x50),
            Op::Quad => (0x60, 0x70),
            Op::SmoothCubic => (0x80, 0x90),
            Op::Cubic => (0xa0, 0xb0),
            Op::Arc => (0xc0, 0xd0),
        };
        if abs { abs_op } else { rel_op }
    }

    fn max_repeat(self) -> u8 {
        match self {
            Op::Line => 32,
            _ => 16,
        }
    }

    fn family(self) -> Option<CurveFamily> {
        match self {
            Op::Quad | Op::SmoothQuad => Some(CurveFamily::Quad),
            Op::Cubic | Op::SmoothCubic => Some(CurveFamily::Cubic),
            Op::Line | Op::Arc => None,
        }
    }
}

/// Point as decoder will see it after encoding
fn quantize(point: Point) -> Point {
    Point::new(quantize_coordinate(point.x()), quantize_coordinate(point.y()))
}

fn point_len(point: Point) -> usize {
    coordinate_len(point.x()) + coordinate_len(point.y())
}

/// Operand in both forms, `(absolute, relative to the pen)`
type Operand = (Point, Point);

/// Whether absolute form is strictly shorter than the relative one
fn prefer_abs(operands: &[Operand]) -> bool {
    let (abs_len, rel_len) = operands
        .iter()
        .fold((0, 0), |(abs_len, rel_len), (abs, rel)| {
            (abs_len + point_len(*abs), rel_len + point_len(*rel))
        });
    abs_len < rel_len
}

/// Color registers holding translucent versions of the foreground
#[derive(Debug, Default)]
struct Registers {
    // alpha held by register with adjustment `index + 1`
    alphas: Vec<u8>,
    // register replaced next once all of them are taken
    next: usize,
}

impl Registers {
    /// Color register adjustment to draw with given alpha, emits register
    /// initialization if the alpha is not cached.
    fn select(&mut self, alpha: u8, out: &mut Buffer) -> u8 {
        if alpha == 255 {
            return 0;
        }
        let index = match self.alphas.iter().position(|a| *a == alpha) {
            Some(index) => return index as u8 + 1,
            None if self.alphas.len() < REGISTERS_COUNT => {
                self.alphas.push(alpha);
                self.alphas.len() - 1
            }
            None => {
                let index = self.next;
                self.alphas[index] = alpha;
                self.next = (self.next + 1) % REGISTERS_COUNT;
                index
            }
        };
        let adj = index as u8 + 1;
        // blend between transparent and the first palette entry
        out.push(OP_SET_CREG_INDIRECT | adj);
        out.extend_from_slice(&[alpha, COLOR1_TRANSPARENT, COLOR1_PALETTE0]);
        adj
    }
}

/// Run of the same opcode which can still be extended
#[derive(Debug, Clone, Copy)]
struct Run {
    op: Op,
    abs: bool,
    // index of the opcode byte
    index: usize,
    count: u8,
}

/// Emits drawing opcodes of a single path
struct PathWriter<'a> {
    out: &'a mut Buffer,
    tr: Transform,
    adj: u8,
    // pen position as tracked by the decoder
    pen: Point,
    // start of the current sub-path
    start: Point,
    started: bool,
    // sub-path was closed, close is emitted lazily
    closed: bool,
    // family of the last emitted curve
    family: Option<CurveFamily>,
    run: Option<Run>,
}

impl<'a> PathWriter<'a> {
    fn new(out: &'a mut Buffer, tr: Transform, adj: u8) -> Self {
        Self {
            out,
            tr,
            adj,
            pen: Point::default(),
            start: Point::default(),
            started: false,
            closed: false,
            family: None,
            run: None,
        }
    }

    /// Emit opcode which does not take part in repeat runs
    fn single(&mut self, opcode: u8) {
        self.run = None;
        self.out.push(opcode);
    }

    /// Emit repeatable opcode, merging it into the current run when possible
    fn repeat(&mut self, op: Op, abs: bool) {
        if let Some(run) = &mut self.run {
            if run.op == op && run.abs == abs && run.count < op.max_repeat() {
                run.count += 1;
                self.out.set(run.index, op.opcode(abs) + run.count - 1);
                return;
            }
        }
        self.run = Some(Run {
            op,
            abs,
            index: self.out.len(),
            count: 1,
        });
        self.out.push(op.opcode(abs));
    }

    fn write_point(&mut self, point: Point) {
        self.out.encode_coordinate(point.x());
        self.out.encode_coordinate(point.y());
    }

    /// Source point in both forms relative to the pen
    fn operand(&self, abs: bool, point: Point) -> Operand {
        if abs {
            let target = self.tr.apply(point);
            (target, target - self.pen)
        } else {
            let delta = self.tr.apply_vector(point);
            (self.pen + delta, delta)
        }
    }

    /// Control point coinciding with the pen
    fn pen_operand(&self) -> Operand {
        (self.pen, Point::default())
    }

    /// Write operands in the chosen form and move the pen to the last one
    fn write_operands(&mut self, abs: bool, operands: &[Operand]) {
        for (abs_point, rel_point) in operands {
            self.write_point(if abs { *abs_point } else { *rel_point });
        }
        if let Some((abs_point, rel_point)) = operands.last() {
            self.pen = if abs {
                quantize(*abs_point)
            } else {
                self.pen + quantize(*rel_point)
            };
        }
    }

    fn segment(&mut self, op: Op, operands: &[Operand]) {
        let abs = prefer_abs(operands);
        self.repeat(op, abs);
        self.write_operands(abs, operands);
        self.family = op.family();
    }

    /// Horizontal (`axis == 0`) or vertical (`axis == 1`) line
    fn axis_line(&mut self, axis: usize, abs: bool, value: Scalar) {
        let pen = self.pen.0[axis];
        let (abs_value, rel_value) = if abs {
            let target = if axis == 0 {
                self.tr.apply_x(value)
            } else {
                self.tr.apply_y(value)
            };
            (target, target - pen)
        } else {
            let delta = self.tr.scale() * value;
            (pen + delta, delta)
        };
        let use_abs = coordinate_len(abs_value) < coordinate_len(rel_value);
        let opcode = if axis == 0 { OP_HLINE } else { OP_VLINE };
        self.single(opcode + (!use_abs) as u8);
        if use_abs {
            self.out.encode_coordinate(abs_value);
            self.pen.0[axis] = quantize_coordinate(abs_value);
        } else {
            self.out.encode_coordinate(rel_value);
            self.pen.0[axis] = pen + quantize_coordinate(rel_value);
        }
        self.family = None;
    }

    fn move_to(&mut self, abs: bool, to: Point) {
        if !self.started {
            // no current point yet, relative move starts from the origin
            let target = quantize(self.tr.apply(to));
            self.single(OP_START_PATH | self.adj);
            self.write_point(target);
            self.started = true;
            self.pen = target;
            self.start = target;
        } else {
            let (target, _) = self.operand(abs, to);
            self.close_move(target);
        }
    }

    /// Close current sub-path and start a new one at `target`
    fn close_move(&mut self, target: Point) {
        // decoder closes the sub-path first, relative move is from its start
        let operand = (target, target - self.start);
        let use_abs = prefer_abs(&[operand]);
        self.single(if use_abs {
            OP_CLOSE_ABS_MOVE
        } else {
            OP_CLOSE_REL_MOVE
        });
        self.pen = self.start;
        self.write_operands(use_abs, &[operand]);
        self.start = self.pen;
        self.closed = false;
        self.family = None;
    }

    fn cmd(&mut self, cmd: &PathCmd) {
        // drawing after close starts a new sub-path at the same point
        if self.closed && !matches!(cmd, PathCmd::MoveTo { .. } | PathCmd::Close) {
            self.close_move(self.start);
        }
        self.draw(*cmd);
    }

    fn draw(&mut self, cmd: PathCmd) {
        use PathCmd::*;
        match cmd {
            LineTo { abs, to } => {
                let operands = [self.operand(abs, to)];
                self.segment(Op::Line, &operands)
            }
            HLineTo { abs, x } => self.axis_line(0, abs, x),
            VLineTo { abs, y } => self.axis_line(1, abs, y),
            CubicTo { abs, c1, c2, to } => {
                let operands = [
                    self.operand(abs, c1),
                    self.operand(abs, c2),
                    self.operand(abs, to),
                ];
                self.segment(Op::Cubic, &operands)
            }
            SmoothCubicTo { abs, c2, to } => {
                let c2 = self.operand(abs, c2);
                let to = self.operand(abs, to);
                if self.family == Some(CurveFamily::Cubic) {
                    self.segment(Op::SmoothCubic, &[c2, to])
                } else {
                    let c1 = self.pen_operand();
                    self.segment(Op::Cubic, &[c1, c2, to])
                }
            }
            QuadTo { abs, c1, to } => {
                let operands = [self.operand(abs, c1), self.operand(abs, to)];
                self.segment(Op::Quad, &operands)
            }
            SmoothQuadTo { abs, to } => {
                let to = self.operand(abs, to);
                if self.family == Some(CurveFamily::Quad) {
                    self.segment(Op::SmoothQuad, &[to])
                } else {
                    let c1 = self.pen_operand();
                    self.segment(Op::Quad, &[c1, to])
                }
            }
            ArcTo {
                abs,
                radii,
                x_axis_rot,
                large,
                sweep,
                to,
            } => {
                let to = self.operand(abs, to);
                let use_abs = prefer_abs(&[to]);
                self.repeat(Op::Arc, use_abs);
                self.write_point(self.tr.apply_vector(radii));
                self.out
                    .encode_zero_to_one(x_axis_rot.rem_euclid(360.0) / 360.0);
                self.out
                    .encode_natural((large as u32) | ((sweep as u32) << 1));
                self.write_operands(use_abs, &[to]);
                self.family = None;
            }
            MoveTo { abs, to } => self.move_to(abs, to),
            Close => {
                self.closed = true;
                self.pen = self.start;
                self.family = None;
            }
        }
    }

    /// Close the last sub-path and return to styling mode
    fn finish(mut self) {
        if self.started {
            self.single(OP_CLOSE_END_PATH);
        }
    }
}

/// IconVG encoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoder {
    output_size: Scalar,
    foreground: Rgba,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_SIZE, Rgba::BLACK)
    }
}

impl Encoder {
    pub fn new(output_size: Scalar, foreground: Rgba) -> Self {
        Self {
            output_size,
            foreground,
        }
    }

    pub fn output_size(&self) -> Scalar {
        self.output_size
    }

    /// Magic and metadata chunks
    fn write_header(&self, out: &mut Buffer) {
        out.extend_from_slice(&MAGIC);

        let mut chunks: Vec<(u32, Buffer)> = Vec::new();
        let half = self.output_size / 2.0;
        if half != DEFAULT_HALF_SIZE {
            let mut data = Buffer::new();
            for value in [-half, -half, half, half] {
                data.encode_coordinate(value);
            }
            chunks.push((MID_VIEW_BOX, data));
        }
        if self.foreground != Rgba::BLACK {
            // single entry palette: `(entries - 1) | color_size << 6`
            let (color_size, color) = encode_color(self.foreground);
            let mut data = Buffer::new();
            data.push(color_size << 6);
            data.extend_from_slice(&color);
            chunks.push((MID_SUGGESTED_PALETTE, data));
        }

        out.encode_natural(chunks.len() as u32);
        for (mid, data) in chunks {
            let mut mid_bytes = Buffer::new();
            mid_bytes.encode_natural(mid);
            out.encode_natural((mid_bytes.len() + data.len()) as u32);
            out.extend_from_slice(mid_bytes.as_slice());
            out.extend_from_slice(data.as_slice());
        }
    }

    /// Encode normalized drawing
    ///
    /// Paths without commands are skipped, a drawing made only of them is empty.
    pub fn encode(&self, drawing: &Drawing) -> Result<Vec<u8>, Error> {
        let mut out = Buffer::new();
        self.write_header(&mut out);

        let tr = Transform::fit(&drawing.canvas.view_box, self.output_size);
        let mut registers = Registers::default();
        let mut groups = 0;
        for path in drawing.paths.iter() {
            let cmds = parse_path_data(&path.d)?;
            if cmds.is_empty() {
                tracing::debug!("[encode:skip_empty] {:?}", path);
                continue;
            }
            let offset = out.len();
            let adj = registers.select(opacity_weight(path.paint.alpha()), &mut out);
            let mut writer = PathWriter::new(&mut out, tr, adj);
            for cmd in cmds.iter() {
                writer.cmd(cmd);
            }
            writer.finish();
            groups += 1;
            tracing::trace!(
                "[encode:path] adj={} commands={} bytes={}",
                adj,
                cmds.len(),
                out.len() - offset
            );
        }

        if groups == 0 {
            return Err(Error::EmptyDrawing);
        }
        tracing::debug!("[encode:bytes] {}", out.len());
        Ok(out.into_vec())
    }
}
