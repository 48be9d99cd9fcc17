//! Plan-space geometry for walls, doors and dimension annotations.
//!
//! Everything here is pure: the canvas asks for a layout and then strokes it.
//! Coordinates are meters with the y axis pointing down the page. "Left" of a
//! wall walked from `p1` to `p2` is the side its normal `(-dy, dx)` points to,
//! which is the clockwise side on paper.

use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, dvec2};

/// A straight piece of line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Circular arc. Angles are radians measured with `atan2(dy, dx)` in page
/// space, so a positive sweep turns clockwise on paper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: DVec2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl Arc {
    pub fn point_at(&self, angle: f64) -> DVec2 {
        self.center + self.radius * dvec2(angle.cos(), angle.sin())
    }

    pub fn start(&self) -> DVec2 {
        self.point_at(self.start_angle)
    }

    /// Cubic Bézier pieces `(p0, c1, c2, p3)`, none sweeping more than 90°.
    pub fn to_cubics(&self) -> Vec<[DVec2; 4]> {
        let pieces = (self.sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = self.sweep / pieces as f64;
        // Tangent handle length for a circular piece of `step` radians
        let k = 4.0 / 3.0 * (step / 4.0).tan() * self.radius;

        (0..pieces)
            .map(|i| {
                let a0 = self.start_angle + step * i as f64;
                let a1 = a0 + step;
                let p0 = self.point_at(a0);
                let p3 = self.point_at(a1);
                let c1 = p0 + k * dvec2(-a0.sin(), a0.cos());
                let c2 = p3 - k * dvec2(-a1.sin(), a1.cos());
                [p0, c1, c2, p3]
            })
            .collect()
    }
}

/// Euclidean distance between two plan points
pub fn length(p1: DVec2, p2: DVec2) -> f64 {
    p1.distance(p2)
}

/// Point at arc length `offset` along `p1 → p2`.
///
/// A zero-length segment yields `p1` instead of NaNs.
pub fn at_offset(p1: DVec2, p2: DVec2, offset: f64) -> DVec2 {
    let len = length(p1, p2);
    if len == 0.0 {
        return p1;
    }
    p1 + (p2 - p1) * (offset / len)
}

/// Unit direction of `p1 → p2`, zero for coincident points
pub fn direction(p1: DVec2, p2: DVec2) -> DVec2 {
    (p2 - p1).normalize_or_zero()
}

/// Unit normal on the left of a wall going along `dir`.
///
/// This is `dir` turned by +90° in page coordinates: an eastward wall
/// (`(1, 0)`) has its left side down the page (`(0, 1)`).
pub fn left_normal(dir: DVec2) -> DVec2 {
    dvec2(-dir.y, dir.x)
}

/// Which side of the wall a door leaf swings into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Which gap edge carries the hinge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapEdge {
    /// The edge at `door_offset`, nearer `p1`
    First,
    /// The edge at `door_offset + door_width`, nearer `p2`
    Second,
}

/// Door swing orientation.
///
/// `First*` hinges on the gap edge nearer `p1`, `Second*` on the one nearer
/// `p2`. `*Left` / `*Right` is the side of the wall (walking `p1 → p2`) the
/// leaf opens into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorDirection {
    FirstLeft,
    FirstRight,
    SecondLeft,
    SecondRight,
}

impl DoorDirection {
    pub const ALL: [DoorDirection; 4] = [
        DoorDirection::FirstLeft,
        DoorDirection::FirstRight,
        DoorDirection::SecondLeft,
        DoorDirection::SecondRight,
    ];

    pub fn hinge(self) -> GapEdge {
        match self {
            DoorDirection::FirstLeft | DoorDirection::FirstRight => GapEdge::First,
            DoorDirection::SecondLeft | DoorDirection::SecondRight => GapEdge::Second,
        }
    }

    pub fn side(self) -> Side {
        match self {
            DoorDirection::FirstLeft | DoorDirection::SecondLeft => Side::Left,
            DoorDirection::FirstRight | DoorDirection::SecondRight => Side::Right,
        }
    }

    /// Signed sweep of the swing arc, from the closed position to the open leaf.
    ///
    /// The closed leaf points along the wall towards the other gap edge. Turning
    /// it onto the left normal is a positive quarter turn when the hinge is
    /// first, a negative one when it is second.
    pub fn sweep(self) -> f64 {
        match self {
            DoorDirection::FirstLeft => FRAC_PI_2,
            DoorDirection::FirstRight => -FRAC_PI_2,
            DoorDirection::SecondLeft => -FRAC_PI_2,
            DoorDirection::SecondRight => FRAC_PI_2,
        }
    }
}

/// Everything needed to draw a wall with a door cut-out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorLayout {
    /// Wall from `p1` to the first gap edge
    pub before: Segment,
    /// Wall from the second gap edge to `p2`
    pub after: Segment,
    /// Open door leaf, hinge to tip
    pub leaf: Segment,
    /// Swing arc, from the closed position to the leaf tip
    pub swing: Arc,
}

impl DoorLayout {
    pub fn new(p1: DVec2, p2: DVec2, door_offset: f64, door_width: f64, swing: DoorDirection) -> Self {
        let first = at_offset(p1, p2, door_offset);
        let second = at_offset(p1, p2, door_offset + door_width);
        let dir = direction(p1, p2);

        let (hinge, closed) = match swing.hinge() {
            GapEdge::First => (first, second),
            GapEdge::Second => (second, first),
        };
        let normal = match swing.side() {
            Side::Left => left_normal(dir),
            Side::Right => -left_normal(dir),
        };
        let tip = hinge + normal * door_width;

        let closed_dir = closed - hinge;
        let start_angle = if closed_dir == DVec2::ZERO {
            0.0
        } else {
            closed_dir.y.atan2(closed_dir.x)
        };

        Self {
            before: Segment::new(p1, first),
            after: Segment::new(second, p2),
            leaf: Segment::new(hinge, tip),
            swing: Arc {
                center: hinge,
                radius: door_width,
                start_angle,
                sweep: swing.sweep(),
            },
        }
    }

    /// Length of the opening between the two wall pieces
    pub fn gap(&self) -> f64 {
        self.before.end.distance(self.after.start)
    }
}

/// Text rotation (radians) for a label parallel to `p1 → p2`.
///
/// Vertical walls read bottom-to-top (`-90°`); everything else is folded into
/// `(-90°, 90°)` so labels never render upside down.
pub fn label_rotation(p1: DVec2, p2: DVec2) -> f64 {
    let d = p2 - p1;
    if d.x == 0.0 {
        -FRAC_PI_2
    } else {
        (d.y / d.x).atan()
    }
}

/// Length label text, one fractional digit
pub fn format_length(meters: f64) -> String {
    format!("{meters:.1}")
}

/// Tick lines, broken measurement line and label placement for a dimensioned wall
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionLayout {
    /// `p1 → p1 + offset` and `p2 → p2 + offset`
    pub ticks: [Segment; 2],
    /// Measurement line pieces from each tick towards the label; empty when
    /// the label does not leave room for them
    pub lines: Vec<Segment>,
    pub label: String,
    /// Baseline start of the label
    pub label_origin: DVec2,
    /// Label rotation in radians
    pub rotation: f64,
}

impl DimensionLayout {
    /// `label_size` is the measured label (advance, ascent) in plan units,
    /// `gap` the clearance kept between the label and the measurement line.
    pub fn new(p1: DVec2, p2: DVec2, offset: DVec2, label_size: DVec2, gap: f64) -> Self {
        let q1 = p1 + offset;
        let q2 = p2 + offset;
        let label = format_length(length(p1, p2));
        let rotation = label_rotation(p1, p2);

        let mid = (q1 + q2) * 0.5;
        let along = dvec2(rotation.cos(), rotation.sin());
        let up = dvec2(rotation.sin(), -rotation.cos());
        let label_origin = mid - along * (label_size.x / 2.0) - up * (label_size.y / 2.0);

        // Pieces run from each tick towards the middle, stopping short of the
        // label; the direction follows p1 → p2 so reversed walls work too.
        let dir = direction(q1, q2);
        let half_gap = label_size.x / 2.0 + gap;
        let lines = if length(q1, q2) > 2.0 * half_gap {
            vec![
                Segment::new(q1, mid - dir * half_gap),
                Segment::new(mid + dir * half_gap, q2),
            ]
        } else {
            Vec::new()
        };

        Self {
            ticks: [Segment::new(p1, q1), Segment::new(p2, q2)],
            lines,
            label,
            label_origin,
            rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: DVec2, b: DVec2) {
        assert!(a.distance(b) < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn at_offset_walks_along_segment() {
        let p = at_offset(dvec2(0.0, 0.0), dvec2(3.0, 4.0), 2.5);
        assert_close(p, dvec2(1.5, 2.0));
    }

    #[test]
    fn at_offset_degenerate_segment_is_start() {
        let p = at_offset(dvec2(1.0, 1.0), dvec2(1.0, 1.0), 5.0);
        assert_eq!(p, dvec2(1.0, 1.0));
    }

    #[test]
    fn left_normal_points_down_the_page_for_eastward_wall() {
        assert_eq!(left_normal(dvec2(1.0, 0.0)), dvec2(0.0, 1.0));
        assert_eq!(left_normal(dvec2(0.0, 1.0)), dvec2(-1.0, 0.0));
    }

    #[test]
    fn boiler_room_door_layout() {
        let p1 = dvec2(0.0, 4.29);
        let p2 = dvec2(3.09, 4.29);
        let door = DoorLayout::new(p1, p2, 3.09 - 1.1, 0.9, DoorDirection::FirstLeft);

        assert_close(door.before.start, p1);
        assert_close(door.before.end, dvec2(1.99, 4.29));
        assert_close(door.after.start, dvec2(2.89, 4.29));
        assert_close(door.after.end, p2);
        assert_close(door.swing.center, dvec2(1.99, 4.29));
        assert!((door.swing.radius - 0.9).abs() < EPS);
        assert!((door.swing.sweep.abs() - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn boiler_room_door_opens_into_the_boiler_room() {
        // Heizung lies below its north wall at y = 4.29
        let door = DoorLayout::new(dvec2(0.0, 4.29), dvec2(3.09, 4.29), 1.99, 0.9, DoorDirection::FirstLeft);
        assert_close(door.leaf.end, dvec2(1.99, 5.19));
        let mid = door.swing.point_at(door.swing.start_angle + door.swing.sweep / 2.0);
        assert!(mid.y > 4.29, "arc leaves the room at {mid:?}");
    }

    #[test]
    fn door_gap_is_door_width_for_all_directions() {
        let p1 = dvec2(1.0, 2.0);
        let p2 = dvec2(4.0, 6.0);
        for direction in DoorDirection::ALL {
            let door = DoorLayout::new(p1, p2, 1.25, 0.8, direction);
            assert!((door.gap() - 0.8).abs() < EPS, "{direction:?}");
            assert!((door.before.length() - 1.25).abs() < EPS, "{direction:?}");
            assert!((door.leaf.length() - 0.8).abs() < EPS, "{direction:?}");
        }
    }

    #[test]
    fn door_arc_runs_from_closed_edge_to_leaf_tip() {
        let p1 = dvec2(0.0, 0.0);
        let p2 = dvec2(5.0, 0.0);
        for direction in DoorDirection::ALL {
            let door = DoorLayout::new(p1, p2, 2.0, 1.0, direction);
            let closed = match direction.hinge() {
                GapEdge::First => door.after.start,
                GapEdge::Second => door.before.end,
            };
            assert_close(door.swing.start(), closed);
            assert_close(door.swing.point_at(door.swing.start_angle + door.swing.sweep), door.leaf.end);
        }
    }

    #[test]
    fn door_leaf_swings_to_named_side() {
        // Eastward wall: left is down the page (positive y)
        let p1 = dvec2(0.0, 0.0);
        let p2 = dvec2(5.0, 0.0);
        let cases = [
            (DoorDirection::FirstLeft, dvec2(2.0, 1.0)),
            (DoorDirection::FirstRight, dvec2(2.0, -1.0)),
            (DoorDirection::SecondLeft, dvec2(3.0, 1.0)),
            (DoorDirection::SecondRight, dvec2(3.0, -1.0)),
        ];
        for (direction, tip) in cases {
            let door = DoorLayout::new(p1, p2, 2.0, 1.0, direction);
            assert_close(door.leaf.end, tip);
        }
    }

    #[test]
    fn arc_midpoint_stays_on_swing_side() {
        // An arc with the wrong sign would pass through the wall (y < 0 here)
        for direction in [DoorDirection::FirstLeft, DoorDirection::SecondLeft] {
            let door = DoorLayout::new(dvec2(0.0, 0.0), dvec2(5.0, 0.0), 2.0, 1.0, direction);
            let mid = door.swing.point_at(door.swing.start_angle + door.swing.sweep / 2.0);
            assert!(mid.y > 0.0, "{direction:?}");
        }
    }

    #[test]
    fn quarter_arc_is_one_cubic_with_circle_handles() {
        let arc = Arc {
            center: DVec2::ZERO,
            radius: 1.0,
            start_angle: 0.0,
            sweep: FRAC_PI_2,
        };
        let cubics = arc.to_cubics();
        assert_eq!(cubics.len(), 1);
        let [p0, c1, c2, p3] = cubics[0];
        assert_close(p0, dvec2(1.0, 0.0));
        assert_close(p3, dvec2(0.0, 1.0));
        assert!((c1.y - 0.5522847498).abs() < 1e-6);
        assert!((c2.x - 0.5522847498).abs() < 1e-6);
    }

    #[test]
    fn half_circle_splits_into_two_cubics() {
        let arc = Arc {
            center: DVec2::ZERO,
            radius: 2.0,
            start_angle: 0.0,
            sweep: -std::f64::consts::PI,
        };
        let cubics = arc.to_cubics();
        assert_eq!(cubics.len(), 2);
        assert_close(cubics[1][3], dvec2(-2.0, 0.0));
    }

    #[test]
    fn length_labels_round_to_one_digit() {
        assert_eq!(format_length(4.14), "4.1");
        assert_eq!(format_length(10.34), "10.3");
        assert_eq!(format_length(4.29), "4.3");
        assert_eq!(format_length(0.0), "0.0");
    }

    #[test]
    fn label_rotation_follows_wall() {
        assert_eq!(label_rotation(dvec2(0.0, 0.0), dvec2(4.0, 0.0)), 0.0);
        assert_eq!(label_rotation(dvec2(0.0, 4.0), dvec2(0.0, 0.0)), -FRAC_PI_2);
        assert_eq!(label_rotation(dvec2(0.0, 0.0), dvec2(0.0, 4.0)), -FRAC_PI_2);
        let diagonal = label_rotation(dvec2(0.0, 0.0), dvec2(1.0, 1.0));
        assert!((diagonal - std::f64::consts::FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn dimension_layout_for_horizontal_wall() {
        let layout = DimensionLayout::new(
            dvec2(0.0, 0.0),
            dvec2(4.14, 0.0),
            dvec2(0.0, -0.2),
            dvec2(0.4, 0.2),
            0.05,
        );
        assert_eq!(layout.label, "4.1");
        assert_eq!(layout.rotation, 0.0);
        assert_close(layout.ticks[0].end, dvec2(0.0, -0.2));
        assert_close(layout.ticks[1].end, dvec2(4.14, -0.2));
        // Centered horizontally, baseline half an ascent below the line
        assert_close(layout.label_origin, dvec2(2.07 - 0.2, -0.2 + 0.1));
        assert_eq!(layout.lines.len(), 2);
        assert_close(layout.lines[0].end, dvec2(2.07 - 0.25, -0.2));
        assert_close(layout.lines[1].start, dvec2(2.07 + 0.25, -0.2));
    }

    #[test]
    fn dimension_layout_for_reversed_vertical_wall() {
        let layout = DimensionLayout::new(
            dvec2(0.0, 4.29),
            dvec2(0.0, 0.0),
            dvec2(-0.2, 0.0),
            dvec2(0.4, 0.2),
            0.05,
        );
        assert_eq!(layout.label, "4.3");
        assert_eq!(layout.rotation, -FRAC_PI_2);
        // First piece starts at the p1 tick and heads towards the middle (up the page)
        assert_close(layout.lines[0].start, dvec2(-0.2, 4.29));
        assert!(layout.lines[0].end.y < 4.29);
        assert!(layout.lines[1].start.y < layout.lines[0].end.y);
    }

    #[test]
    fn dimension_lines_dropped_when_label_is_too_wide() {
        let layout = DimensionLayout::new(
            dvec2(0.0, 0.0),
            dvec2(0.3, 0.0),
            dvec2(0.0, 0.3),
            dvec2(0.4, 0.2),
            0.05,
        );
        assert!(layout.lines.is_empty());
        assert_eq!(layout.label, "0.3");
    }
}
