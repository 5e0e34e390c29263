//! Clough-Tocher cubic interpolation.
//!
//! Each triangle is split at its centroid into three cubic Bézier patches.
//! Vertex gradients come from a weighted least-squares fit over Delaunay
//! neighbours, so a planar input is reproduced exactly.
//!
//! Control points are named `cIJKL` by their degree with respect to the
//! vertices `V1 V2 V3` and the centroid `V4`.

use nalgebra::{Matrix2, Vector2};

use super::delaunay::{Point, Triangulation};

/// Bernstein coefficients for `[u³, u²v, u²w, uv², uvw, uw², v³, v²w, vw², w³]`.
const MULTINOMIAL: [f64; 10] = [1.0, 3.0, 3.0, 3.0, 6.0, 3.0, 1.0, 3.0, 3.0, 1.0];

/// Control points of one split triangle.
#[derive(Debug, Clone, Copy)]
struct MacroElement {
    /// Sub-triangle `V2 V3 V4`, opposite `V1`.
    t1: [f64; 10],
    /// Sub-triangle `V3 V1 V4`, opposite `V2`.
    t2: [f64; 10],
    /// Sub-triangle `V1 V2 V4`, opposite `V3`.
    t3: [f64; 10],
}

/// Piecewise-cubic interpolant over a triangulation.
#[derive(Debug, Clone)]
pub struct CloughTocher {
    elements: Vec<MacroElement>,
}

impl CloughTocher {
    pub fn new(tri: &Triangulation, values: &[f64]) -> Self {
        let gradients = estimate_gradients(tri, values);
        let points = tri.points();

        let elements = tri
            .triangles()
            .iter()
            .map(|&[i1, i2, i3]| {
                build_element(
                    [points[i1], points[i2], points[i3]],
                    [values[i1], values[i2], values[i3]],
                    [gradients[i1], gradients[i2], gradients[i3]],
                )
            })
            .collect();

        Self { elements }
    }

    /// Evaluate inside triangle `t` at barycentric coordinates `l`.
    pub fn evaluate(&self, t: usize, l: [f64; 3]) -> f64 {
        let e = &self.elements[t];
        let [l1, l2, l3] = l;

        let (cp, u, v, w) = if l1 <= l2 && l1 <= l3 {
            (&e.t1, l2 - l1, l3 - l1, 3.0 * l1)
        } else if l2 <= l3 {
            (&e.t2, l3 - l2, l1 - l2, 3.0 * l2)
        } else {
            (&e.t3, l1 - l3, l2 - l3, 3.0 * l3)
        };

        let basis = [
            u * u * u,
            u * u * v,
            u * u * w,
            u * v * v,
            u * v * w,
            u * w * w,
            v * v * v,
            v * v * w,
            v * w * w,
            w * w * w,
        ];

        basis
            .iter()
            .zip(MULTINOMIAL.iter())
            .zip(cp.iter())
            .map(|((b, m), c)| b * m * c)
            .sum()
    }
}

/// Inverse-square-distance weighted least-squares gradient at each vertex.
fn estimate_gradients(tri: &Triangulation, values: &[f64]) -> Vec<[f64; 2]> {
    let points = tri.points();

    tri.neighbors()
        .iter()
        .enumerate()
        .map(|(i, neighbors)| {
            let mut a = Matrix2::<f64>::zeros();
            let mut b = Vector2::<f64>::zeros();

            for &j in neighbors {
                let d = Vector2::new(points[j][0] - points[i][0], points[j][1] - points[i][1]);
                let len2 = d.norm_squared();
                if len2 == 0.0 {
                    continue;
                }
                let w = 1.0 / len2;
                a += w * d * d.transpose();
                b += w * d * (values[j] - values[i]);
            }

            match a.try_inverse() {
                Some(inv) => {
                    let g = inv * b;
                    [g[0], g[1]]
                }
                None => [0.0, 0.0],
            }
        })
        .collect()
}

fn sub(a: Point, b: Point) -> Point {
    [a[0] - b[0], a[1] - b[1]]
}

fn dot(a: Point, b: Point) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Value at `A` plus one third of the directional derivative towards `B`.
fn toward(fa: f64, ga: [f64; 2], a: Point, b: Point) -> f64 {
    fa + dot(ga, sub(b, a)) / 3.0
}

/// Control point at the centroid of sub-triangle `A B C`, where `C` is the
/// split point. Keeps the cross-boundary derivative along `AB` linear.
#[allow(clippy::too_many_arguments)]
fn edge_interior(a: Point, b: Point, c: Point, a3: f64, a2b: f64, ab2: f64, b3: f64, a2c: f64, b2c: f64) -> f64 {
    let e = sub(b, a);
    let mid = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
    let mu = dot(sub(c, mid), e) / dot(e, e);

    0.5 * (a2c + b2c) + 0.25 * (a2b + ab2) - 0.25 * (a3 + b3)
        + mu * (1.5 * ab2 - 1.5 * a2b + 0.5 * a3 - 0.5 * b3)
}

fn build_element(v: [Point; 3], f: [f64; 3], g: [[f64; 2]; 3]) -> MacroElement {
    let [v1, v2, v3] = v;
    let v4 = [(v1[0] + v2[0] + v3[0]) / 3.0, (v1[1] + v2[1] + v3[1]) / 3.0];

    // Vertices.
    let c3000 = f[0];
    let c0300 = f[1];
    let c0030 = f[2];

    // Outer edges.
    let c2100 = toward(f[0], g[0], v1, v2);
    let c1200 = toward(f[1], g[1], v2, v1);
    let c0210 = toward(f[1], g[1], v2, v3);
    let c0120 = toward(f[2], g[2], v3, v2);
    let c1020 = toward(f[2], g[2], v3, v1);
    let c2010 = toward(f[0], g[0], v1, v3);

    // Spokes towards the split point.
    let c2001 = toward(f[0], g[0], v1, v4);
    let c0201 = toward(f[1], g[1], v2, v4);
    let c0021 = toward(f[2], g[2], v3, v4);

    let c0111 = edge_interior(v2, v3, v4, c0300, c0210, c0120, c0030, c0201, c0021);
    let c1011 = edge_interior(v3, v1, v4, c0030, c1020, c2010, c3000, c0021, c2001);
    let c1101 = edge_interior(v1, v2, v4, c3000, c2100, c1200, c0300, c2001, c0201);

    let c1002 = (c2001 + c1101 + c1011) / 3.0;
    let c0102 = (c0201 + c1101 + c0111) / 3.0;
    let c0012 = (c0021 + c1011 + c0111) / 3.0;
    let c0003 = (c1002 + c0102 + c0012) / 3.0;

    MacroElement {
        t1: [c0300, c0210, c0201, c0120, c0111, c0102, c0030, c0021, c0012, c0003],
        t2: [c0030, c1020, c0021, c2010, c1011, c0012, c3000, c2001, c1002, c0003],
        t3: [c3000, c2100, c2001, c1200, c1101, c1002, c0300, c0201, c0102, c0003],
    }
}
