//! Geometrie-Hilfen in Board-Koordinaten (Nanometer, `IVec2`).

use glam::{DVec2, IVec2};

/// Abstand Punkt → Strecke.
pub fn point_segment_distance(p: IVec2, a: IVec2, b: IVec2) -> f64 {
    let p = p.as_dvec2();
    let a = a.as_dvec2();
    let b = b.as_dvec2();
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn orientation(a: IVec2, b: IVec2, c: IVec2) -> i64 {
    let ab = b.as_i64vec2() - a.as_i64vec2();
    let ac = c.as_i64vec2() - a.as_i64vec2();
    (ab.x * ac.y - ab.y * ac.x).signum()
}

fn on_segment(a: IVec2, b: IVec2, p: IVec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Schneiden sich zwei Strecken (inklusive Berührung)?
pub fn segments_intersect(a1: IVec2, a2: IVec2, b1: IVec2, b2: IVec2) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }
    (o1 == 0 && on_segment(a1, a2, b1))
        || (o2 == 0 && on_segment(a1, a2, b2))
        || (o3 == 0 && on_segment(b1, b2, a1))
        || (o4 == 0 && on_segment(b1, b2, a2))
}

/// Minimaler Abstand zweier Strecken.
pub fn segment_segment_distance(a1: IVec2, a2: IVec2, b1: IVec2, b2: IVec2) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

/// Strecke mit Radius: Hüllform für Tracks, Vias und Pads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub a: IVec2,
    pub b: IVec2,
    pub radius: f64,
}

impl Capsule {
    /// Kreisförmige Hülle um einen Punkt.
    pub fn circle(center: IVec2, radius: f64) -> Self {
        Self {
            a: center,
            b: center,
            radius,
        }
    }

    /// Luftstrecke zwischen den Rändern zweier Hüllen (negativ = Überlappung).
    pub fn gap(&self, other: &Capsule) -> f64 {
        segment_segment_distance(self.a, self.b, other.a, other.b) - self.radius - other.radius
    }
}

/// Länge einer Strecke.
pub fn segment_length(a: IVec2, b: IVec2) -> f64 {
    a.as_dvec2().distance(b.as_dvec2())
}

/// Rastet einen Vektor auf die nächste 45°-Richtung ein (Projektion).
pub fn snap_to_octant(v: IVec2) -> IVec2 {
    if v == IVec2::ZERO {
        return v;
    }
    let dv = v.as_dvec2();
    let angle = dv.y.atan2(dv.x);
    let step = std::f64::consts::FRAC_PI_4;
    let snapped = (angle / step).round() * step;
    let dir = DVec2::new(snapped.cos(), snapped.sin());
    (dir * dv.dot(dir)).round().as_ivec2()
}

/// Projiziert `v` auf die Normale der Strecke `a→b` (Verschiebung unter Winkelerhalt).
pub fn project_on_normal(v: IVec2, a: IVec2, b: IVec2) -> IVec2 {
    let dir = (b - a).as_dvec2();
    if dir.length_squared() == 0.0 {
        return v;
    }
    let normal = dir.perp().normalize();
    (normal * v.as_dvec2().dot(normal)).round().as_ivec2()
}

/// Projiziert `p` auf die Strecke `a→b`.
pub fn project_on_segment(p: IVec2, a: IVec2, b: IVec2) -> IVec2 {
    let ab = (b - a).as_dvec2();
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).as_dvec2().dot(ab) / len_sq).clamp(0.0, 1.0);
    (a.as_dvec2() + ab * t).round().as_ivec2()
}

/// Knickpunkt eines Zwei-Segment-Zuges aus 45°-Diagonale und Gerader.
///
/// `diagonal_first` bestimmt, ob die Diagonale am Start oder am Ende liegt.
pub fn posture_corner(start: IVec2, end: IVec2, diagonal_first: bool) -> IVec2 {
    let d = end - start;
    let (ax, ay) = (d.x.abs(), d.y.abs());
    let diag = ax.min(ay);
    let diag_vec = IVec2::new(d.x.signum() * diag, d.y.signum() * diag);
    if diagonal_first {
        start + diag_vec
    } else {
        end - diag_vec
    }
}

/// Knickpunkt eines rein orthogonalen Zuges (horizontal zuerst oder vertikal zuerst).
pub fn ortho_corner(start: IVec2, end: IVec2, horizontal_first: bool) -> IVec2 {
    if horizontal_first {
        IVec2::new(end.x, start.y)
    } else {
        IVec2::new(start.x, end.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn point_distance_to_horizontal_segment() {
        let d = point_segment_distance(IVec2::new(5, 3), IVec2::ZERO, IVec2::new(10, 0));
        assert_relative_eq!(d, 3.0);
    }

    #[test]
    fn crossing_segments_have_zero_distance() {
        let d = segment_segment_distance(
            IVec2::new(0, -5),
            IVec2::new(0, 5),
            IVec2::new(-5, 0),
            IVec2::new(5, 0),
        );
        assert_relative_eq!(d, 0.0);
    }

    #[test]
    fn parallel_segments_distance() {
        let d = segment_segment_distance(
            IVec2::new(0, 0),
            IVec2::new(10, 0),
            IVec2::new(0, 4),
            IVec2::new(10, 4),
        );
        assert_relative_eq!(d, 4.0);
    }

    #[test]
    fn octant_snap_keeps_axis_vectors() {
        assert_eq!(snap_to_octant(IVec2::new(100, 3)), IVec2::new(100, 0));
        assert_eq!(snap_to_octant(IVec2::new(0, -50)), IVec2::new(0, -50));
        let diag = snap_to_octant(IVec2::new(100, 90));
        assert_eq!(diag.x, diag.y);
    }

    #[test]
    fn posture_corner_diagonal_first() {
        let corner = posture_corner(IVec2::ZERO, IVec2::new(10, 4), true);
        assert_eq!(corner, IVec2::new(4, 4));
        let corner = posture_corner(IVec2::ZERO, IVec2::new(10, 4), false);
        assert_eq!(corner, IVec2::new(6, 0));
    }

    #[test]
    fn normal_projection_preserves_segment_angle() {
        let shift = project_on_normal(IVec2::new(7, 5), IVec2::ZERO, IVec2::new(10, 0));
        assert_eq!(shift, IVec2::new(0, 5));
    }
}
