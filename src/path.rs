//! Path data: typed instructions for the `d` attribute.
//!
//! Decoding lives in [`crate::parse::path_data`]. A [`PathData`] can be
//! resolved to absolute coordinates, mapped through an [`AffineMatrix`] and
//! encoded back to attribute text.
//!
//! The first coordinate pair of the first instruction is absolute even when
//! the letter is lower case; resolution and transformation both honour that.

use glam::{DVec2, dvec2};

use crate::errors::GeometryError;
use crate::matrix::{AffineMatrix, Axis};
use crate::types::{DEFAULT_PRECISION, fmt_num};

/// Rates below this are treated as a chord that just fits the radii.
const RATE_TOLERANCE: f64 = 1e-9;

/// Path command, independent of case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveTo,
    LineTo,
    CurveTo,
    SmoothCurveTo,
    QuadTo,
    SmoothQuadTo,
    Arc,
    HorizontalLine,
    VerticalLine,
    ClosePath,
}

impl Command {
    /// The command for `letter` and whether it is relative (lower case).
    pub fn from_letter(letter: char) -> Option<(Command, bool)> {
        let command = match letter.to_ascii_uppercase() {
            'M' => Command::MoveTo,
            'L' => Command::LineTo,
            'C' => Command::CurveTo,
            'S' => Command::SmoothCurveTo,
            'Q' => Command::QuadTo,
            'T' => Command::SmoothQuadTo,
            'A' => Command::Arc,
            'H' => Command::HorizontalLine,
            'V' => Command::VerticalLine,
            'Z' => Command::ClosePath,
            _ => return None,
        };
        Some((command, letter.is_ascii_lowercase()))
    }

    pub fn letter(self, relative: bool) -> char {
        let upper = match self {
            Command::MoveTo => 'M',
            Command::LineTo => 'L',
            Command::CurveTo => 'C',
            Command::SmoothCurveTo => 'S',
            Command::QuadTo => 'Q',
            Command::SmoothQuadTo => 'T',
            Command::Arc => 'A',
            Command::HorizontalLine => 'H',
            Command::VerticalLine => 'V',
            Command::ClosePath => 'Z',
        };
        if relative {
            upper.to_ascii_lowercase()
        } else {
            upper
        }
    }

    /// Numbers consumed per repetition of the command.
    pub fn arity(self) -> usize {
        match self {
            Command::ClosePath => 0,
            Command::HorizontalLine | Command::VerticalLine => 1,
            Command::MoveTo | Command::LineTo | Command::SmoothQuadTo => 2,
            Command::SmoothCurveTo | Command::QuadTo => 4,
            Command::CurveTo => 6,
            Command::Arc => 7,
        }
    }

    /// Points per repetition for point-valued commands.
    fn points_per_group(self) -> usize {
        (self.arity() / 2).max(1)
    }
}

/// One repetition of an elliptical arc command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub radii: DVec2,
    /// x-axis-rotation in degrees
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub end: DVec2,
    /// Pen position before the arc, recorded by [`PathData::to_absolute`].
    pub start: Option<DVec2>,
}

/// Arguments of an instruction, grouped by what they mean.
#[derive(Debug, Clone, PartialEq)]
pub enum Operands {
    /// Coordinates; curves store their control points inline.
    Points(Vec<DVec2>),
    Arcs(Vec<ArcSegment>),
    /// Single-axis coordinates of `H`/`V`.
    Scalars(Vec<f64>),
    Empty,
}

/// A command letter plus its (possibly repeated) arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PathInstruction {
    pub command: Command,
    pub relative: bool,
    pub operands: Operands,
}

impl PathInstruction {
    /// Build from a flat number run whose length is a multiple of the arity.
    pub fn from_numbers(command: Command, relative: bool, numbers: &[f64]) -> Self {
        let operands = match command {
            Command::ClosePath => Operands::Empty,
            Command::HorizontalLine | Command::VerticalLine => Operands::Scalars(numbers.to_vec()),
            Command::Arc => Operands::Arcs(
                numbers
                    .chunks_exact(7)
                    .map(|v| ArcSegment {
                        radii: dvec2(v[0], v[1]),
                        rotation: v[2],
                        large_arc: v[3] != 0.0,
                        sweep: v[4] != 0.0,
                        end: dvec2(v[5], v[6]),
                        start: None,
                    })
                    .collect(),
            ),
            _ => Operands::Points(
                numbers
                    .chunks_exact(2)
                    .map(|v| dvec2(v[0], v[1]))
                    .collect(),
            ),
        };
        Self {
            command,
            relative,
            operands,
        }
    }

    pub fn letter(&self) -> char {
        self.command.letter(self.relative)
    }

    /// Map this instruction through `matrix`.
    ///
    /// Arc radii and x-axis-rotation are recomputed from the mapped ellipse.
    /// `order` is the instruction's index in its path: at order 0 the first
    /// point is absolute regardless of case. Relative coordinates only see the
    /// linear part. Relative `h`/`v` become relative `l`, since a rotated or
    /// skewed axis line no longer stays on one axis; absolute `H`/`V` need the
    /// pen and must be resolved first.
    pub fn transform(
        &self,
        matrix: &AffineMatrix,
        order: usize,
    ) -> Result<PathInstruction, GeometryError> {
        let map = |index: usize, p: DVec2| {
            if self.relative && !(order == 0 && index == 0) {
                matrix.apply_to_point_diff(p)
            } else {
                matrix.apply_to_point(p)
            }
        };

        let (command, operands) = match &self.operands {
            Operands::Points(points) => (
                self.command,
                Operands::Points(points.iter().enumerate().map(|(i, p)| map(i, *p)).collect()),
            ),
            Operands::Arcs(arcs) => {
                let reflect = matrix.is_reflection();
                let arcs = arcs
                    .iter()
                    .enumerate()
                    .map(|(i, arc)| {
                        let (radii, rotation) = matrix.apply_to_ellipse(arc.radii, arc.rotation);
                        ArcSegment {
                            radii,
                            rotation,
                            sweep: arc.sweep != reflect,
                            end: map(i, arc.end),
                            start: arc.start.map(|s| matrix.apply_to_point(s)),
                            ..*arc
                        }
                    })
                    .collect();
                (Command::Arc, Operands::Arcs(arcs))
            }
            Operands::Scalars(values) => {
                if !self.relative {
                    return Err(GeometryError::UnresolvedAxisLine {
                        command: self.letter(),
                    });
                }
                let axis = if self.command == Command::HorizontalLine {
                    Axis::X
                } else {
                    Axis::Y
                };
                let points = values
                    .iter()
                    .map(|v| matrix.apply_to_point_diff(axis.basis() * *v))
                    .collect();
                (Command::LineTo, Operands::Points(points))
            }
            Operands::Empty => (self.command, Operands::Empty),
        };

        Ok(PathInstruction {
            command,
            relative: self.relative,
            operands,
        })
    }

    /// Letter followed by space-joined fields; points are written `x,y`.
    pub fn encode(&self, precision: usize) -> String {
        let num = |v: f64| fmt_num(v, precision);
        let point = |p: DVec2| format!("{},{}", num(p.x), num(p.y));

        let mut tokens = vec![self.letter().to_string()];
        match &self.operands {
            Operands::Points(points) => tokens.extend(points.iter().map(|p| point(*p))),
            Operands::Arcs(arcs) => {
                for arc in arcs {
                    tokens.push(point(arc.radii));
                    tokens.push(num(arc.rotation));
                    tokens.push(u8::from(arc.large_arc).to_string());
                    tokens.push(u8::from(arc.sweep).to_string());
                    tokens.push(point(arc.end));
                }
            }
            Operands::Scalars(values) => tokens.extend(values.iter().map(|v| num(*v))),
            Operands::Empty => {}
        }
        tokens.join(" ")
    }
}

/// A parsed `d` attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData {
    pub instructions: Vec<PathInstruction>,
}

impl PathData {
    pub fn new(instructions: Vec<PathInstruction>) -> Self {
        Self { instructions }
    }

    /// A single absolute moveto through `points`, the path equivalent of a
    /// polygon or polyline `points` list.
    pub fn from_points(points: Vec<DVec2>) -> Self {
        Self::new(vec![PathInstruction {
            command: Command::MoveTo,
            relative: false,
            operands: Operands::Points(points),
        }])
    }

    /// Every point-valued coordinate, in order.
    pub fn points(&self) -> Vec<DVec2> {
        self.instructions
            .iter()
            .flat_map(|inst| match &inst.operands {
                Operands::Points(points) => points.clone(),
                Operands::Arcs(arcs) => arcs.iter().map(|a| a.end).collect(),
                Operands::Scalars(_) | Operands::Empty => Vec::new(),
            })
            .collect()
    }

    /// Resolve every instruction against the pen position.
    ///
    /// `H`/`V` become `L`; arcs record the pen they start from. Within a
    /// repetition of a curve all points are relative to the pen at the start
    /// of that repetition.
    pub fn to_absolute(&self) -> PathData {
        let mut pen = DVec2::ZERO;
        let mut subpath_start = DVec2::ZERO;
        let mut instructions = Vec::with_capacity(self.instructions.len());

        for (order, inst) in self.instructions.iter().enumerate() {
            let forced = |group: usize, index: usize| order == 0 && group == 0 && index == 0;

            let (command, operands) = match &inst.operands {
                Operands::Points(points) => {
                    let mut resolved = Vec::with_capacity(points.len());
                    for (group, chunk) in points.chunks(inst.command.points_per_group()).enumerate()
                    {
                        let origin = pen;
                        for (index, p) in chunk.iter().enumerate() {
                            resolved.push(if inst.relative && !forced(group, index) {
                                origin + *p
                            } else {
                                *p
                            });
                        }
                        if let Some(last) = resolved.last() {
                            pen = *last;
                        }
                        if inst.command == Command::MoveTo && group == 0 {
                            subpath_start = pen;
                        }
                    }
                    (inst.command, Operands::Points(resolved))
                }
                Operands::Arcs(arcs) => {
                    let mut resolved = Vec::with_capacity(arcs.len());
                    for (index, arc) in arcs.iter().enumerate() {
                        let end = if inst.relative && !forced(0, index) {
                            pen + arc.end
                        } else {
                            arc.end
                        };
                        resolved.push(ArcSegment {
                            end,
                            start: Some(pen),
                            ..*arc
                        });
                        pen = end;
                    }
                    (Command::Arc, Operands::Arcs(resolved))
                }
                Operands::Scalars(values) => {
                    let mut resolved = Vec::with_capacity(values.len());
                    for v in values {
                        pen = match (inst.command, inst.relative) {
                            (Command::HorizontalLine, true) => dvec2(pen.x + v, pen.y),
                            (Command::HorizontalLine, false) => dvec2(*v, pen.y),
                            (_, true) => dvec2(pen.x, pen.y + v),
                            (_, false) => dvec2(pen.x, *v),
                        };
                        resolved.push(pen);
                    }
                    (Command::LineTo, Operands::Points(resolved))
                }
                Operands::Empty => {
                    pen = subpath_start;
                    (inst.command, Operands::Empty)
                }
            };

            instructions.push(PathInstruction {
                command,
                relative: false,
                operands,
            });
        }

        PathData::new(instructions)
    }

    /// Resolve to absolute and map every instruction through `matrix`.
    ///
    /// Arcs are checked against their start point first; radii too small for
    /// the chord are an error rather than being scaled up.
    pub fn transform(&self, matrix: &AffineMatrix) -> Result<PathData, GeometryError> {
        let absolute = self.to_absolute();
        for inst in &absolute.instructions {
            let Operands::Arcs(arcs) = &inst.operands else {
                continue;
            };
            for arc in arcs {
                if let Some(start) = arc.start {
                    ArcCenter::solve(start, arc).map_err(|err| match err {
                        GeometryError::ArcRadiiTooSmall {
                            rx, ry, start, end, ..
                        } => GeometryError::ArcRadiiTooSmall {
                            rx,
                            ry,
                            start,
                            end,
                            details: Some(format!(
                                "matrix: {matrix}\ninstruction: {}",
                                inst.encode(DEFAULT_PRECISION)
                            )),
                        },
                        other => other,
                    })?;
                }
            }
        }

        let instructions = absolute
            .instructions
            .iter()
            .enumerate()
            .map(|(order, inst)| inst.transform(matrix, order))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PathData::new(instructions))
    }

    /// Space-joined instruction encodings.
    pub fn encode(&self, precision: usize) -> String {
        self.instructions
            .iter()
            .map(|inst| inst.encode(precision))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Center parameterisation of an endpoint arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcCenter {
    pub center: DVec2,
    /// Angle of the start point on the unit circle, radians.
    pub start_angle: f64,
    /// Signed sweep, radians; positive means increasing angle.
    pub sweep_angle: f64,
}

impl ArcCenter {
    /// Reconstruct center and angles for the arc from `start` to `arc.end`.
    ///
    /// Returns `Ok(None)` for degenerate arcs (a zero radius or coincident
    /// endpoints), which render as straight lines.
    pub fn solve(start: DVec2, arc: &ArcSegment) -> Result<Option<ArcCenter>, GeometryError> {
        let (rx, ry) = (arc.radii.x.abs(), arc.radii.y.abs());
        if rx == 0.0 || ry == 0.0 || start == arc.end {
            return Ok(None);
        }

        let (sin, cos) = arc.rotation.to_radians().sin_cos();
        let half = (start - arc.end) / 2.0;
        let v = dvec2(cos * half.x + sin * half.y, -sin * half.x + cos * half.y);

        let (rx2, ry2) = (rx * rx, ry * ry);
        let denominator = rx2 * v.y * v.y + ry2 * v.x * v.x;
        let rate = (rx2 * ry2 - rx2 * v.y * v.y - ry2 * v.x * v.x) / denominator;
        if rate < -RATE_TOLERANCE {
            return Err(GeometryError::ArcRadiiTooSmall {
                rx,
                ry,
                start: start.to_array(),
                end: arc.end.to_array(),
                details: None,
            });
        }

        let sign = if arc.large_arc == arc.sweep { -1.0 } else { 1.0 };
        let coef = sign * rate.max(0.0).sqrt();
        let c = dvec2(coef * rx * v.y / ry, -coef * ry * v.x / rx);

        let midpoint = (start + arc.end) / 2.0;
        let center = dvec2(cos * c.x - sin * c.y, sin * c.x + cos * c.y) + midpoint;

        let u = dvec2((v.x - c.x) / rx, (v.y - c.y) / ry);
        let w = dvec2((-v.x - c.x) / rx, (-v.y - c.y) / ry);
        let mut sweep_angle = u.perp_dot(w).atan2(u.dot(w));
        if !arc.sweep && sweep_angle > 0.0 {
            sweep_angle -= std::f64::consts::TAU;
        } else if arc.sweep && sweep_angle < 0.0 {
            sweep_angle += std::f64::consts::TAU;
        }

        Ok(Some(ArcCenter {
            center,
            start_angle: u.y.atan2(u.x),
            sweep_angle,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::path_data;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn assert_close(expected: DVec2, actual: DVec2) {
        assert!(
            (expected - actual).length() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn points_of(inst: &PathInstruction) -> &[DVec2] {
        match &inst.operands {
            Operands::Points(points) => points,
            other => panic!("expected points, got {other:?}"),
        }
    }

    fn arcs_of(inst: &PathInstruction) -> &[ArcSegment] {
        match &inst.operands {
            Operands::Arcs(arcs) => arcs,
            other => panic!("expected arcs, got {other:?}"),
        }
    }

    #[test]
    fn decode_encode_decode_is_stable() {
        for text in ["M0,1 3,4 5,6", "a 0,1,2,3,4,5,6 h7.0 v 8e-1"] {
            let decoded = path_data(text).unwrap();
            let again = path_data(&decoded.encode(6)).unwrap();
            assert_eq!(decoded, again, "round trip of {text:?}");
        }
    }

    #[test]
    fn encode_format() {
        let path = path_data("M0,1 3,4 5,6").unwrap();
        insta::assert_snapshot!(path.encode(6), @"M 0,1 3,4 5,6");

        let path = path_data("a 0,1,2,3,4,5,6 h7.0 v 8e-1 Z").unwrap();
        insta::assert_snapshot!(path.encode(6), @"a 0,1 2 1 1 5,6 h 7 v 0.8 Z");
    }

    #[test]
    fn first_moveto_point_is_absolute() {
        let path = path_data("m 1,2 -6,7").unwrap().to_absolute();
        assert_eq!(points_of(&path.instructions[0]), &[dvec2(1.0, 2.0), dvec2(-5.0, 9.0)]);
    }

    #[test]
    fn relative_resolution_tracks_pen() {
        let path = path_data("M10,10 l5,0 h-2 v3 c1,1 2,2 3,3 z l1,1").unwrap();
        let abs = path.to_absolute();
        assert!(abs.instructions.iter().all(|inst| !inst.relative));
        assert_eq!(points_of(&abs.instructions[1]), &[dvec2(15.0, 10.0)]);
        assert_eq!(abs.instructions[2].command, Command::LineTo);
        assert_eq!(points_of(&abs.instructions[2]), &[dvec2(13.0, 10.0)]);
        assert_eq!(points_of(&abs.instructions[3]), &[dvec2(13.0, 13.0)]);
        // control points are relative to the segment start, not each other
        assert_eq!(
            points_of(&abs.instructions[4]),
            &[dvec2(14.0, 14.0), dvec2(15.0, 15.0), dvec2(16.0, 16.0)]
        );
        // closepath returns the pen to the subpath start
        assert_eq!(points_of(&abs.instructions[6]), &[dvec2(11.0, 11.0)]);
    }

    #[test]
    fn absolute_arc_records_start() {
        let abs = path_data("M1,1 a2,2 0 0 1 4,0").unwrap().to_absolute();
        let arc = arcs_of(&abs.instructions[1])[0];
        assert_eq!(arc.start, Some(dvec2(1.0, 1.0)));
        assert_eq!(arc.end, dvec2(5.0, 1.0));
    }

    #[test]
    fn relative_arc_transform_maps_radii_and_point_diff() {
        let matrix =
            AffineMatrix::from_columns(dvec2(2.0, 0.0), dvec2(0.0, 3.0), dvec2(4.0, 5.0));
        let path = path_data("a 1,2 3,4,5 6,7").unwrap();
        let transformed = path.instructions[0].transform(&matrix, 1).unwrap();
        let arc = arcs_of(&transformed)[0];
        assert_close(dvec2(12.0, 21.0), arc.end);
        assert!(transformed.relative);
        assert_close(dvec2(2.0, 6.0), matrix.apply_to_length_pair(dvec2(1.0, 2.0)));
        // a 3 degree tilt stays close to the axis-aligned length pair
        assert!((arc.radii.x * arc.radii.y - 12.0).abs() < 1e-9);
        assert!((arc.radii - dvec2(2.0, 6.0)).abs().max_element() < 0.1, "{:?}", arc.radii);

        let untilted = path_data("a 1,2 0,4,5 6,7").unwrap();
        let transformed = untilted.instructions[0].transform(&matrix, 1).unwrap();
        let arc = arcs_of(&transformed)[0];
        assert_close(dvec2(2.0, 6.0), arc.radii);
        assert_eq!(arc.rotation, 0.0);
    }

    #[test]
    fn absolute_axis_line_needs_resolution() {
        let path = path_data("H 5").unwrap();
        let err = path.instructions[0]
            .transform(&AffineMatrix::scale(2.0, 2.0), 1)
            .unwrap_err();
        assert!(matches!(err, GeometryError::UnresolvedAxisLine { command: 'H' }));

        let relative = path_data("v 5").unwrap().instructions[0]
            .transform(&AffineMatrix::rotation(FRAC_PI_2), 1)
            .unwrap();
        assert_eq!(relative.command, Command::LineTo);
        assert_close(dvec2(-5.0, 0.0), points_of(&relative)[0]);
    }

    #[test]
    fn path_transform_resolves_then_maps() {
        let matrix = AffineMatrix::translation(10.0, 0.0) * AffineMatrix::scale(2.0, 2.0);
        let path = path_data("m1,1 h2 v2 z").unwrap();
        let out = path.transform(&matrix).unwrap();
        insta::assert_snapshot!(out.encode(6), @"M 12,2 L 16,2 L 16,6 Z");
    }

    #[test]
    fn rotated_arc_turns_its_ellipse() {
        let path = path_data("M0,0 A2,1 0 0 1 4,0").unwrap();
        let out = path.transform(&AffineMatrix::rotation(FRAC_PI_2)).unwrap();
        let arc = arcs_of(&out.instructions[1])[0];
        assert_close(dvec2(1.0, 2.0), arc.radii);
        assert_eq!(arc.rotation, 0.0);
        assert_close(dvec2(0.0, 4.0), arc.end);
        insta::assert_snapshot!(out.encode(6), @"M 0,0 A 1,2 0 0 1 0,4");

        // the output is a valid arc again
        let again = path_data(&out.encode(6)).unwrap();
        assert!(again.transform(&AffineMatrix::IDENTITY).is_ok());
    }

    #[test]
    fn skewed_arc_stays_solvable() {
        let matrix = AffineMatrix::shear(30f64.to_radians().tan(), 0.0);
        let path = path_data("M0,0 A5,3 20 0 1 6,2").unwrap();
        let out = path.transform(&matrix).unwrap();
        let arc = arcs_of(&out.instructions[1])[0];
        assert!(arc.rotation != 20.0);
        // skew keeps area, so the product of the semi-axes is unchanged
        assert!((arc.radii.x * arc.radii.y - 15.0).abs() < 1e-6);
        let start = arc.start.unwrap();
        assert!(ArcCenter::solve(start, &arc).unwrap().is_some());
    }

    #[test]
    fn reflection_flips_sweep() {
        let path = path_data("M0,0 A1,1 0 0 1 2,0").unwrap();
        let out = path.transform(&AffineMatrix::scale(1.0, -1.0)).unwrap();
        let arc = arcs_of(&out.instructions[1])[0];
        assert!(!arc.sweep);
        assert_close(dvec2(2.0, 0.0), arc.end);
    }

    #[test]
    fn arc_center_of_semicircle() {
        let arc = ArcSegment {
            radii: dvec2(1.0, 1.0),
            rotation: 0.0,
            large_arc: false,
            sweep: true,
            end: dvec2(2.0, 0.0),
            start: None,
        };
        let solved = ArcCenter::solve(dvec2(0.0, 0.0), &arc).unwrap().unwrap();
        assert_close(dvec2(1.0, 0.0), solved.center);
        assert!((solved.sweep_angle - PI).abs() < EPS);
    }

    #[test]
    fn arc_center_of_quarter_circle() {
        let arc = ArcSegment {
            radii: dvec2(1.0, 1.0),
            rotation: 0.0,
            large_arc: false,
            sweep: true,
            end: dvec2(0.0, 1.0),
            start: None,
        };
        let solved = ArcCenter::solve(dvec2(1.0, 0.0), &arc).unwrap().unwrap();
        assert_close(DVec2::ZERO, solved.center);
        assert!(solved.start_angle.abs() < EPS);
        assert!((solved.sweep_angle - FRAC_PI_2).abs() < EPS);

        let large = ArcSegment {
            large_arc: true,
            ..arc
        };
        let solved = ArcCenter::solve(dvec2(1.0, 0.0), &large).unwrap().unwrap();
        assert_close(dvec2(1.0, 1.0), solved.center);
        assert!((solved.sweep_angle - 3.0 * FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn arc_radii_too_small() {
        let path = path_data("M0,0 A0.5,0.5 0 0 1 2,0").unwrap();
        let err = path.transform(&AffineMatrix::IDENTITY).unwrap_err();
        match err {
            GeometryError::ArcRadiiTooSmall { rx, details, .. } => {
                assert_eq!(rx, 0.5);
                assert!(details.unwrap().contains("A 0.5,0.5 0 0 1 2,0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn degenerate_arcs_are_not_checked() {
        let path = path_data("M0,0 A0,0 0 0 1 2,0 A1,1 0 0 1 2,0").unwrap();
        assert!(path.transform(&AffineMatrix::IDENTITY).is_ok());
    }

    #[test]
    fn polygon_points_round_trip_through_path() {
        let path = PathData::from_points(vec![dvec2(0.0, 0.0), dvec2(1.0, 2.0)]);
        let out = path.transform(&AffineMatrix::translation(1.0, 1.0)).unwrap();
        assert_eq!(out.points(), vec![dvec2(1.0, 1.0), dvec2(2.0, 3.0)]);
    }
}
