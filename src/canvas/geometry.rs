use egui::{Pos2, Vec2, pos2};

use crate::store::graph::{ChronicleStore, Edge, Node, NodeKind};

// Card bounding boxes in world units. Characters are portrait cards,
// events landscape banners.
pub const CHARACTER_SIZE: Vec2 = Vec2::new(120.0, 150.0);
pub const EVENT_SIZE: Vec2 = Vec2::new(160.0, 90.0);

const CURVE_FACTOR: f32 = 0.2;
const CURVE_CAP: f32 = 80.0;

pub fn card_size(kind: NodeKind) -> Vec2 {
    match kind {
        NodeKind::Character => CHARACTER_SIZE,
        NodeKind::Event => EVENT_SIZE,
    }
}

/// Anchor point for edges: the card's box center in world space.
pub fn card_center(node: &Node) -> Pos2 {
    let size = card_size(node.kind);
    pos2(node.x + size.x / 2.0, node.y + size.y / 2.0)
}

/// Cubic control polygon of an edge in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgePath {
    pub points: [Pos2; 4],
}

impl EdgePath {
    pub fn start(&self) -> Pos2 {
        self.points[0]
    }

    pub fn end(&self) -> Pos2 {
        self.points[3]
    }

    pub fn midpoint(&self) -> Pos2 {
        let (a, b) = (self.points[0], self.points[3]);
        pos2((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Sample the cubic into a polyline, for dashed strokes and hit tests.
    pub fn flatten(&self, segments: usize) -> Vec<Pos2> {
        let [p0, p1, p2, p3] = self.points;
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                let u = 1.0 - t;
                let (uu, tt) = (u * u, t * t);
                pos2(
                    uu * u * p0.x + 3.0 * uu * t * p1.x + 3.0 * u * tt * p2.x + tt * t * p3.x,
                    uu * u * p0.y + 3.0 * uu * t * p1.y + 3.0 * u * tt * p2.y + tt * t * p3.y,
                )
            })
            .collect()
    }
}

/// Curve between two anchors. Curvature grows with distance up to a cap, so
/// short edges stay nearly straight and long ones never loop. A zero-length
/// edge collapses the whole control polygon onto one point.
pub fn edge_path(source: &Node, target: &Node) -> EdgePath {
    let s = card_center(source);
    let t = card_center(target);
    let dist = ((t.x - s.x).powi(2) + (t.y - s.y).powi(2)).sqrt();
    let curve = (dist * CURVE_FACTOR).min(CURVE_CAP);
    EdgePath {
        points: [
            s,
            pos2(s.x + curve, s.y + curve * 0.3),
            pos2(t.x - curve, t.y - curve * 0.3),
            t,
        ],
    }
}

/// Path for a stored edge; `None` when either endpoint is missing, which
/// callers treat as "skip", never as an error.
pub fn edge_path_in(store: &ChronicleStore, edge: &Edge) -> Option<EdgePath> {
    let source = store.node(edge.source)?;
    let target = store.node(edge.target)?;
    Some(edge_path(source, target))
}

// Geometry helper: distance from point P to segment AB
fn point_segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ap = Vec2::new(p.x - a.x, p.y - a.y);
    let ab = Vec2::new(b.x - a.x, b.y - a.y);
    let ab_len2 = ab.x * ab.x + ab.y * ab.y;
    if ab_len2 <= f32::EPSILON {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len2).clamp(0.0, 1.0);
    let proj = pos2(a.x + ab.x * t, a.y + ab.y * t);
    ((p.x - proj.x).powi(2) + (p.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a flattened curve, for edge hit tests.
pub fn distance_to_polyline(p: Pos2, points: &[Pos2]) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => point_segment_distance(p, *only, *only),
        _ => points
            .windows(2)
            .map(|seg| point_segment_distance(p, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min),
    }
}
