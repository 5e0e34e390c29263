//! Delaunay triangulation of scattered source points.
//!
//! Incremental Bowyer-Watson insertion inside a large enclosing triangle.
//! Once the enclosing vertices are removed, any concavity left along the
//! boundary is filled so the union of triangles is exactly the convex hull
//! of the input points. Triangle bounding boxes are kept in an R-tree for
//! point location.

use std::collections::BTreeMap;

use rstar::{RTree, RTreeObject, AABB};

/// Barycentric tolerance for treating a point as inside a triangle.
const INSIDE_EPS: f64 = 1e-9;

/// Relative area below which a point set is treated as collinear.
const COLLINEAR_EPS: f64 = 1e-12;

/// Enclosing triangle size as a multiple of the point extent.
const SUPER_SCALE: f64 = 100.0;

pub type Point = [f64; 2];

/// Twice the signed area of `abc`; positive when counter-clockwise.
#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Convex hull vertex indices in counter-clockwise order.
///
/// Andrew's monotone chain; collinear boundary points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i][0]
            .total_cmp(&points[j][0])
            .then(points[i][1].total_cmp(&points[j][1]))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);

    if order.len() < 3 {
        return order;
    }

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &usize>> = if pass == 0 {
            Box::new(order.iter())
        } else {
            Box::new(order.iter().rev())
        };
        for &i in iter {
            while hull.len() >= start + 2
                && orient(points[hull[hull.len() - 2]], points[hull[hull.len() - 1]], points[i]) <= 0.0
            {
                hull.pop();
            }
            hull.push(i);
        }
        hull.pop();
    }
    hull
}

/// Bounding box of one triangle, padded by the inside tolerance.
#[derive(Debug, Clone)]
struct TriangleEnvelope {
    triangle: usize,
    aabb: AABB<Point>,
}

impl TriangleEnvelope {
    fn new(triangle: usize, corners: [Point; 3]) -> Self {
        let (min_x, min_y, max_x, max_y) = bounds(&corners);
        let pad = INSIDE_EPS * ((max_x - min_x) + (max_y - min_y)).max(1.0);
        Self {
            triangle,
            aabb: AABB::from_corners([min_x - pad, min_y - pad], [max_x + pad, max_y + pad]),
        }
    }
}

impl RTreeObject for TriangleEnvelope {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Triangulated source points.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<Point>,
    /// Vertex indices, counter-clockwise.
    triangles: Vec<[usize; 3]>,
    index: RTree<TriangleEnvelope>,
}

impl Triangulation {
    /// Triangulate distinct points.
    ///
    /// Returns `None` when fewer than 3 points are given or all points are
    /// (numerically) collinear.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.len() < 3 || is_degenerate(&points) {
            return None;
        }

        let n = points.len();
        let (min_x, min_y, max_x, max_y) = bounds(&points);
        let extent = (max_x - min_x).max(max_y - min_y).max(1.0);
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;

        let mut all = points.clone();
        all.push([mid_x - SUPER_SCALE * extent, mid_y - SUPER_SCALE * extent]);
        all.push([mid_x + SUPER_SCALE * extent, mid_y - SUPER_SCALE * extent]);
        all.push([mid_x, mid_y + SUPER_SCALE * extent]);

        let mut tris = vec![counter_clockwise(&all, [n, n + 1, n + 2])];

        for p in 0..n {
            let (bad, keep): (Vec<[usize; 3]>, Vec<[usize; 3]>) = tris
                .into_iter()
                .partition(|&t| in_circumcircle(&all, t, all[p]));

            // Cavity boundary: edges used by exactly one bad triangle.
            let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
            for &t in &bad {
                for (a, b) in edges(t) {
                    *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
                }
            }

            tris = keep;
            for &t in &bad {
                for (a, b) in edges(t) {
                    if counts[&(a.min(b), a.max(b))] == 1 {
                        tris.push(counter_clockwise(&all, [a, b, p]));
                    }
                }
            }
        }

        let mut triangles: Vec<[usize; 3]> = tris
            .into_iter()
            .filter(|v| v.iter().all(|&i| i < n))
            .filter(|v| orient(points[v[0]], points[v[1]], points[v[2]]) > 0.0)
            .collect();

        fill_concavities(&points, &mut triangles);

        let envelopes = triangles
            .iter()
            .enumerate()
            .map(|(t, v)| TriangleEnvelope::new(t, v.map(|i| points[i])))
            .collect();
        let index = RTree::bulk_load(envelopes);

        Some(Self {
            points,
            triangles,
            index,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Adjacent vertices of every vertex, sorted ascending.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.points.len()];
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                adjacency[u].push(v);
                adjacency[v].push(u);
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }
        adjacency
    }

    /// Barycentric coordinates of `p` in triangle `t`.
    pub fn barycentric(&self, t: usize, p: Point) -> [f64; 3] {
        let [a, b, c] = self.triangles[t].map(|i| self.points[i]);
        let det = orient(a, b, c);
        [
            orient(p, b, c) / det,
            orient(a, p, c) / det,
            orient(a, b, p) / det,
        ]
    }

    /// Find the triangle containing `p`.
    ///
    /// Returns the first triangle (in triangulation order) whose
    /// barycentric coordinates are all non-negative, else the best
    /// candidate within tolerance. `None` means `p` is outside the hull.
    pub fn locate(&self, p: Point) -> Option<(usize, [f64; 3])> {
        let mut candidates: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&AABB::from_point(p))
            .map(|e| e.triangle)
            .collect();
        candidates.sort_unstable();

        let mut best: Option<(usize, [f64; 3], f64)> = None;
        for t in candidates {
            let l = self.barycentric(t, p);
            let worst = l[0].min(l[1]).min(l[2]);
            if worst >= 0.0 {
                return Some((t, l));
            }
            if best.map_or(true, |(_, _, w)| worst > w) {
                best = Some((t, l, worst));
            }
        }

        let (t, l, worst) = best?;
        if worst < -INSIDE_EPS {
            return None;
        }

        // Snap tiny negative weights onto the edge.
        let clamped = l.map(|v| v.max(0.0));
        let sum: f64 = clamped.iter().sum();
        Some((t, clamped.map(|v| v / sum)))
    }
}

fn edges(v: [usize; 3]) -> [(usize, usize); 3] {
    [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])]
}

fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(x0, y0, x1, y1), p| (x0.min(p[0]), y0.min(p[1]), x1.max(p[0]), y1.max(p[1])),
    )
}

fn is_degenerate(points: &[Point]) -> bool {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return true;
    }
    let area: f64 = (1..hull.len() - 1)
        .map(|i| orient(points[hull[0]], points[hull[i]], points[hull[i + 1]]))
        .sum();
    let (min_x, min_y, max_x, max_y) = bounds(points);
    let scale = (max_x - min_x).max(max_y - min_y);
    area.abs() <= COLLINEAR_EPS * scale * scale
}

fn counter_clockwise(points: &[Point], v: [usize; 3]) -> [usize; 3] {
    let [a, b, c] = v;
    if orient(points[a], points[b], points[c]) < 0.0 {
        [b, a, c]
    } else {
        v
    }
}

/// Whether `p` lies strictly inside the circumcircle of triangle `t`.
///
/// Zero-area triangles always count as containing `p` so the next insertion
/// replaces them.
fn in_circumcircle(points: &[Point], t: [usize; 3], p: Point) -> bool {
    let [a, b, c] = t.map(|i| points[i]);
    if orient(a, b, c) == 0.0 {
        return true;
    }

    let (adx, ady) = (a[0] - p[0], a[1] - p[1]);
    let (bdx, bdy) = (b[0] - p[0], b[1] - p[1]);
    let (cdx, cdy) = (c[0] - p[0], c[1] - p[1]);

    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;

    let det = adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx) + ad * (bdx * cdy - bdy * cdx);
    det > 0.0
}

/// Add triangles along reflex boundary vertices until the outline is convex.
fn fill_concavities(points: &[Point], triangles: &mut Vec<[usize; 3]>) {
    let (min_x, min_y, max_x, max_y) = bounds(points);
    let scale = (max_x - min_x).max(max_y - min_y);
    let eps = COLLINEAR_EPS * scale * scale;

    for _ in 0..points.len() * 2 {
        let Some(outline) = boundary_loop(triangles) else {
            return;
        };
        let len = outline.len();
        let reflex = (0..len).find(|&i| {
            let a = outline[i];
            let b = outline[(i + 1) % len];
            let c = outline[(i + 2) % len];
            orient(points[a], points[b], points[c]) < -eps
        });

        match reflex {
            Some(i) => {
                let a = outline[i];
                let b = outline[(i + 1) % len];
                let c = outline[(i + 2) % len];
                triangles.push([a, c, b]);
            }
            None => return,
        }
    }
}

/// The counter-clockwise outer boundary, if it forms a single simple loop.
fn boundary_loop(triangles: &[[usize; 3]]) -> Option<Vec<usize>> {
    let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for &t in triangles {
        for (a, b) in edges(t) {
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    let mut next: BTreeMap<usize, usize> = BTreeMap::new();
    for &t in triangles {
        for (a, b) in edges(t) {
            if counts[&(a.min(b), a.max(b))] == 1 && next.insert(a, b).is_some() {
                return None;
            }
        }
    }

    let (&start, _) = next.iter().next()?;
    let mut outline = vec![start];
    let mut current = next[&start];
    while current != start {
        if outline.len() > next.len() {
            return None;
        }
        outline.push(current);
        current = *next.get(&current)?;
    }

    if outline.len() == next.len() {
        Some(outline)
    } else {
        None
    }
}
