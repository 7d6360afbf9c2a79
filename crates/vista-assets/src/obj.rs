//! Wavefront OBJ parsing.
//!
//! Only `v`, `vt`, `vn` and `f` records are read. Faces are fan-triangulated
//! and expanded to one entry per triangle corner, so the output needs no index
//! buffer. Parsing never fails: unreadable numbers become NaN, and indices that
//! point nowhere fall back to a zero texture coordinate, a +Z normal, or a NaN
//! position.

use crate::interleave::InterleavedMesh;

const DEFAULT_UV: [f32; 2] = [0.0, 0.0];
const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const INVALID_POSITION: [f32; 3] = [f32::NAN; 3];

/// Per-corner attribute arrays. All three have one entry per emitted vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

impl ObjData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn interleave(&self) -> InterleavedMesh {
        InterleavedMesh::from_parts(&self.positions, Some(&self.texcoords))
    }
}

/// Attribute pools as declared in the file, with a placeholder at slot 0 so
/// 1-based OBJ indices address them directly.
struct Pools {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

impl Pools {
    fn new() -> Self {
        Self {
            positions: vec![[0.0, 0.0, 0.0]],
            texcoords: vec![DEFAULT_UV],
            normals: vec![DEFAULT_NORMAL],
        }
    }
}

pub fn parse_obj(text: &str) -> ObjData {
    let mut pools = Pools::new();
    let mut out = ObjData::default();

    for mut parts in records(text) {
        match parts.next() {
            Some("v") => pools.positions.push(floats(&mut parts)),
            Some("vt") => pools.texcoords.push(floats(&mut parts)),
            Some("vn") => pools.normals.push(floats(&mut parts)),
            Some("f") => {
                let corners: Vec<&str> = parts.collect();
                for triangle in fan(&corners) {
                    for corner in triangle {
                        emit_corner(corner, &pools, &mut out);
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// Positions-only variant used for terrain meshes: reads `v` and `f` records,
/// ignores everything after the first `/` of each face corner, and returns
/// nine floats per triangle.
pub fn load_obj_positions(text: &str) -> Vec<f32> {
    let mut positions = vec![[0.0_f32, 0.0, 0.0]];
    let mut out = Vec::new();

    for mut parts in records(text) {
        match parts.next() {
            Some("v") => positions.push(floats(&mut parts)),
            Some("f") => {
                let corners: Vec<&str> = parts.collect();
                for triangle in fan(&corners) {
                    for corner in triangle {
                        let vertex = corner.split('/').next().unwrap_or_default();
                        let position = resolve(vertex, positions.len())
                            .and_then(|i| positions.get(i))
                            .copied()
                            .unwrap_or(INVALID_POSITION);
                        out.extend_from_slice(&position);
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// Non-blank, non-comment lines split on whitespace.
fn records(text: &str) -> impl Iterator<Item = std::str::SplitWhitespace<'_>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::split_whitespace)
}

fn floats<'a, const N: usize>(parts: &mut impl Iterator<Item = &'a str>) -> [f32; N] {
    std::array::from_fn(|_| {
        parts
            .next()
            .and_then(|token| token.parse().ok())
            .unwrap_or(f32::NAN)
    })
}

/// `(v0, v[i], v[i+1])` for every `i` in `1..n-1`.
fn fan<'a>(corners: &'a [&'a str]) -> impl Iterator<Item = [&'a str; 3]> + 'a {
    (1..corners.len().saturating_sub(1)).map(move |i| [corners[0], corners[i], corners[i + 1]])
}

/// Map an OBJ index token to a pool slot. An empty token selects the
/// placeholder; negative values count back from the end of the pool.
fn resolve(token: &str, pool_len: usize) -> Option<usize> {
    if token.is_empty() {
        return Some(0);
    }
    let index: i64 = token.parse().ok()?;
    let index = if index < 0 { pool_len as i64 + index } else { index };
    usize::try_from(index).ok()
}

fn emit_corner(corner: &str, pools: &Pools, out: &mut ObjData) {
    let mut fields = corner.split('/');
    let v = fields.next().unwrap_or_default();
    let vt = fields.next().unwrap_or_default();
    let vn = fields.next().unwrap_or_default();

    let position = resolve(v, pools.positions.len())
        .and_then(|i| pools.positions.get(i))
        .copied()
        .unwrap_or(INVALID_POSITION);
    let uv = resolve(vt, pools.texcoords.len())
        .and_then(|i| pools.texcoords.get(i))
        .copied()
        .unwrap_or(DEFAULT_UV);
    let normal = resolve(vn, pools.normals.len())
        .and_then(|i| pools.normals.get(i))
        .copied()
        .unwrap_or(DEFAULT_NORMAL);

    out.positions.push(position);
    out.texcoords.push(uv);
    out.normals.push(normal);
}
