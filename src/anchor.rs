use crate::pointer::Point;
use serde::Serialize;

/// Axis-aligned bounding box in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }
}

/// Anything that can report the live set of link-like elements.
///
/// Reading geometry may be expensive on the host side, so the engine only asks
/// every few frames.
pub trait AnchorSource {
    fn anchor_rects(&self) -> Vec<Rect>;
}

impl AnchorSource for [Rect] {
    fn anchor_rects(&self) -> Vec<Rect> {
        self.to_vec()
    }
}

impl AnchorSource for Vec<Rect> {
    fn anchor_rects(&self) -> Vec<Rect> {
        self.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NearestAnchor {
    /// Index into the slice the search ran over; `None` when there were no anchors.
    pub index: Option<usize>,
    pub point: Point,
    pub distance: f32,
    pub rect: Option<Rect>,
}

impl NearestAnchor {
    pub const NONE: NearestAnchor = NearestAnchor {
        index: None,
        point: Point::new(0.0, 0.0),
        distance: f32::INFINITY,
        rect: None,
    };

    pub fn is_some(&self) -> bool {
        self.index.is_some()
    }
}

impl Default for NearestAnchor {
    fn default() -> Self {
        Self::NONE
    }
}

/// Nearest point on any anchor's outline, by clamped projection onto each edge.
///
/// Each rectangle yields four candidates: its vertical edges with `y` clamped
/// into the rectangle's span, and its horizontal edges with `x` clamped likewise.
/// The first strictly-closer candidate wins.
pub fn find_nearest(from: Point, anchors: &[Rect]) -> NearestAnchor {
    let mut best = NearestAnchor::NONE;

    for (i, r) in anchors.iter().enumerate() {
        let cy = clamp(from.y, r.top, r.bottom());
        let cx = clamp(from.x, r.left, r.right());
        let candidates = [
            Point::new(r.left, cy),
            Point::new(r.right(), cy),
            Point::new(cx, r.top),
            Point::new(cx, r.bottom()),
        ];
        for p in candidates {
            let d = from.dist(p);
            if d < best.distance {
                best = NearestAnchor {
                    index: Some(i),
                    point: p,
                    distance: d,
                    rect: Some(*r),
                };
            }
        }
    }
    best
}

fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.min(hi).max(lo)
}
