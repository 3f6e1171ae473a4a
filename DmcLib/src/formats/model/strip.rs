//! Triangle strip to triangle list conversion
//!
//! Strip winding parity is not trusted. Each triangle is oriented so its
//! face normal agrees with the averaged vertex normals.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::options::DegenerateTriangles;

/// Rebuild a triangle list from a strip.
///
/// A set skip flag on vertex `i` suppresses the triangle ending at `i`; the
/// window advances either way. Triangles whose edges or face normal cannot
/// be normalized are handled by `policy`.
pub fn strip_to_triangles(
    positions: &[Vec3],
    normals: &[Vec3],
    skip: &[bool],
    policy: DegenerateTriangles,
) -> Result<Vec<[u32; 3]>> {
    let count = positions.len().min(normals.len()).min(skip.len());
    let mut triangles = Vec::with_capacity(count.saturating_sub(2));
    let mut degenerate = 0usize;

    let (mut p1, mut p2) = (0usize, 1usize);
    for p3 in 2..count {
        if !skip[p3] {
            match orient(positions, normals, [p1, p2, p3]) {
                Some(triangle) => triangles.push(triangle.map(|i| i as u32)),
                None => match policy {
                    DegenerateTriangles::Skip => degenerate += 1,
                    DegenerateTriangles::Error => {
                        return Err(Error::DegenerateTriangle { vertex: p3 });
                    }
                },
            }
        }
        p1 = p2;
        p2 = p3;
    }

    if degenerate > 0 {
        tracing::debug!(degenerate, "skipped degenerate strip triangles");
    }
    Ok(triangles)
}

/// Pick the winding of one strip step, or `None` if it has no face normal.
fn orient(positions: &[Vec3], normals: &[Vec3], [p1, p2, p3]: [usize; 3]) -> Option<[usize; 3]> {
    let e1 = (positions[p3] - positions[p1]).try_normalize()?;
    let e2 = (positions[p2] - positions[p1]).try_normalize()?;
    let face = e1.cross(e2).try_normalize()?;
    let reference = (normals[p1] + normals[p2] + normals[p3])
        .try_normalize()
        .unwrap_or(Vec3::ZERO);

    if reference.dot(face) > 0.0 {
        Some([p1, p3, p2])
    } else {
        Some([p1, p2, p3])
    }
}
