//! Segment and rectangle tests used for landing and hit detection.

use glam::DVec2;

use crate::constants::HIT_PAD;
use crate::types::Rect;

/// Whether `p` lies inside `rect` grown by the landing pad.
pub fn is_inside_padded(p: DVec2, rect: &Rect) -> bool {
    rect.padded(HIT_PAD).contains(p)
}

/// Whether segments `p1-p2` and `p3-p4` intersect (parallel segments never do).
pub fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d = (p2.x - p1.x) * (p4.y - p3.y) - (p2.y - p1.y) * (p4.x - p3.x);
    if d == 0.0 {
        return false;
    }
    let u = ((p3.x - p1.x) * (p4.y - p3.y) - (p3.y - p1.y) * (p4.x - p3.x)) / d;
    let v = ((p3.x - p1.x) * (p2.y - p1.y) - (p3.y - p1.y) * (p2.x - p1.x)) / d;
    (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)
}

/// Segment–rectangle intersection.
///
/// Rejects on bounding boxes first, then tests the four edges, then falls
/// back to containment of the first endpoint for segments fully inside.
pub fn segment_intersects_rect(a: DVec2, b: DVec2, rect: &Rect) -> bool {
    let (left, right, top, bottom) = (rect.left, rect.right(), rect.top, rect.bottom());
    let min = a.min(b);
    let max = a.max(b);
    if max.x < left || min.x > right || max.y < top || min.y > bottom {
        return false;
    }

    let tl = DVec2::new(left, top);
    let tr = DVec2::new(right, top);
    let br = DVec2::new(right, bottom);
    let bl = DVec2::new(left, bottom);

    segments_intersect(a, b, tl, tr)
        || segments_intersect(a, b, tr, br)
        || segments_intersect(a, b, br, bl)
        || segments_intersect(a, b, bl, tl)
        || rect.contains(a)
}
