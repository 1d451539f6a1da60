use crate::errors::ObjViewError;

/// Highest addressable vertex count with 16-bit indices.
pub const MAX_VERTICES: usize = 1 << 16;

/// Triangle mesh as flat GPU-ready arrays. Positions and normals are packed
/// xyz triples with a strict 1:1 correspondence (one normal per vertex, not
/// per face corner). Built once at load time, immutable afterwards.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Parse Wavefront OBJ text into a [`Mesh`].
///
/// Recognized record tags: `v` (3 floats), `vn` (3 floats), `f` (>= 3
/// corner tokens of the form `v[/vt[/vn]]`, 1-based). Everything else is
/// skipped. Faces with more than 3 corners are fan-triangulated around
/// their first corner. A corner's normal reference assigns that normal to
/// the corner's vertex slot so the output stays one-normal-per-vertex.
///
/// Malformed records fail fast with the offending line number instead of
/// letting NaN leak into the buffers. Meshes at or above [`MAX_VERTICES`]
/// vertices are rejected because the index buffer is 16-bit.
pub fn parse_obj(text: &str) -> Result<Mesh, ObjViewError> {
    let mut positions: Vec<f32> = Vec::new();
    let mut raw_normals: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();
    // Per-vertex slot for a normal reference picked up from face records
    let mut normal_refs: Vec<Option<usize>> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let [x, y, z] = parse_vec3(tokens, line_no, "vertex")?;
                if positions.len() / 3 + 1 >= MAX_VERTICES {
                    return Err(ObjViewError::MeshTooLarge {
                        vertices: positions.len() / 3 + 1,
                    });
                }
                positions.extend_from_slice(&[x, y, z]);
                normal_refs.push(None);
            }
            Some("vn") => {
                raw_normals.push(parse_vec3(tokens, line_no, "normal")?);
            }
            Some("f") => {
                let mut corners: Vec<u16> = Vec::new();
                for token in tokens {
                    let (vertex, normal) = parse_corner(token, line_no)?;
                    if vertex >= positions.len() / 3 {
                        return Err(ObjViewError::MalformedMesh {
                            line: line_no,
                            message: format!(
                                "face references vertex {} but only {} are defined",
                                vertex + 1,
                                positions.len() / 3
                            ),
                        });
                    }
                    if let Some(n) = normal {
                        if n >= raw_normals.len() {
                            return Err(ObjViewError::MalformedMesh {
                                line: line_no,
                                message: format!(
                                    "face references normal {} but only {} are defined",
                                    n + 1,
                                    raw_normals.len()
                                ),
                            });
                        }
                        normal_refs[vertex] = Some(n);
                    }
                    corners.push(vertex as u16);
                }
                if corners.len() < 3 {
                    return Err(ObjViewError::MalformedMesh {
                        line: line_no,
                        message: format!("face has {} corners, need at least 3", corners.len()),
                    });
                }
                // Fan triangulation around the first corner
                for w in 1..corners.len() - 1 {
                    indices.push(corners[0]);
                    indices.push(corners[w]);
                    indices.push(corners[w + 1]);
                }
            }
            // vt, o, g, s, usemtl, mtllib, comments, blank lines
            _ => {}
        }
    }

    let vertex_count = positions.len() / 3;
    let mut normals = Vec::with_capacity(positions.len());
    for v in 0..vertex_count {
        // Prefer the face-referenced normal, fall back to file order, then
        // to a fixed up vector when the file carries no usable normal.
        let n = match normal_refs[v] {
            Some(n) => raw_normals[n],
            None => raw_normals.get(v).copied().unwrap_or([0.0, 1.0, 0.0]),
        };
        normals.extend_from_slice(&n);
    }

    Ok(Mesh {
        positions,
        normals,
        indices,
    })
}

/// Parse the remaining tokens of a `v`/`vn` record as exactly 3 floats.
fn parse_vec3<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
    record: &str,
) -> Result<[f32; 3], ObjViewError> {
    let fields: Vec<&str> = tokens.collect();
    if fields.len() != 3 {
        return Err(ObjViewError::MalformedMesh {
            line: line_no,
            message: format!("{} record has {} fields, expected 3", record, fields.len()),
        });
    }
    let mut out = [0.0f32; 3];
    for (i, field) in fields.iter().enumerate() {
        // f32::parse accepts "nan"/"inf"; those must not reach the buffers
        out[i] = field
            .parse()
            .ok()
            .filter(|v: &f32| v.is_finite())
            .ok_or_else(|| ObjViewError::MalformedMesh {
                line: line_no,
                message: format!("{} field '{}' is not a finite number", record, field),
            })?;
    }
    Ok(out)
}

/// Parse one face corner token `v[/vt[/vn]]` into a 0-based vertex index
/// and an optional 0-based normal index.
fn parse_corner(token: &str, line_no: usize) -> Result<(usize, Option<usize>), ObjViewError> {
    let mut parts = token.split('/');
    let vertex_part = parts.next().unwrap_or("");
    let vertex: usize = vertex_part
        .parse()
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| ObjViewError::MalformedMesh {
            line: line_no,
            message: format!("face corner '{}' has no parseable vertex index", token),
        })?;

    // Skip the texture index, then look at the normal index if present
    let _tex_part = parts.next();
    let normal = match parts.next() {
        Some("") | None => None,
        Some(normal_part) => {
            let n: usize = normal_part
                .parse()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| ObjViewError::MalformedMesh {
                    line: line_no,
                    message: format!("face corner '{}' has an unparseable normal index", token),
                })?;
            Some(n - 1)
        }
    };

    Ok((vertex - 1, normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2], "face indices must be rebased to 0");
    }

    #[test]
    fn test_counts_match_record_counts() {
        // 4 vertices, 4 normals, 2 triangular faces
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vn 0 0 1
vn 0 0 1
vn 0 0 1
f 1 2 3
f 1 3 4
";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.positions.len(), 3 * 4);
        assert_eq!(mesh.normals.len(), 3 * 4);
        assert_eq!(mesh.indices.len(), 3 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_one_based_to_zero_based() {
        let text = "v 0 0 0\nv 0 0 0\nv 0 0 0\nv 0 0 0\nv 0 0 0\nf 5 1 2\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.indices[0], 4, "corner token '5' must become index 4");
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_normal_reference_lands_on_vertex_slot() {
        // Normals listed in reverse order, reassigned through v//vn refs
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 1 0
vn 1 0 0
f 1//3 2//2 3//1
";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(&mesh.normals[0..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&mesh.normals[3..6], &[0.0, 1.0, 0.0]);
        assert_eq!(&mesh.normals[6..9], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_texture_index_is_ignored() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_normals_get_fallback() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(&mesh.normals[0..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_tags_skipped() {
        let text = "# comment\no thing\ns off\nusemtl none\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_short_vertex_record_rejected() {
        let err = parse_obj("v 1 2\n").unwrap_err();
        match err {
            ObjViewError::MalformedMesh { line, .. } => assert_eq!(line, 1),
            other => panic!("expected MalformedMesh, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_vertex_field_rejected() {
        assert!(parse_obj("v 1 2 banana\n").is_err());
    }

    #[test]
    fn test_non_finite_vertex_field_rejected() {
        assert!(parse_obj("v 1 2 nan\n").is_err(), "NaN must not reach the buffers");
        assert!(parse_obj("v inf 0 0\n").is_err());
        assert!(parse_obj("vn 0 -inf 0\n").is_err());
    }

    #[test]
    fn test_vertex_ceiling_enforced() {
        let mut text = String::new();
        for _ in 0..MAX_VERTICES {
            text.push_str("v 0 0 0\n");
        }
        let err = parse_obj(&text).unwrap_err();
        match err {
            ObjViewError::MeshTooLarge { vertices } => assert_eq!(vertices, MAX_VERTICES),
            other => panic!("expected MeshTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_vertex_count_just_under_ceiling_accepted() {
        let mut text = String::new();
        for _ in 0..MAX_VERTICES - 1 {
            text.push_str("v 0 0 0\n");
        }
        let mesh = parse_obj(&text).unwrap();
        assert_eq!(mesh.vertex_count(), MAX_VERTICES - 1);
    }

    #[test]
    fn test_out_of_range_face_index_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        match err {
            ObjViewError::MalformedMesh { line, .. } => assert_eq!(line, 3),
            other => panic!("expected MalformedMesh, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_face_corner_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\n";
        assert!(parse_obj(text).is_err());
    }

    #[test]
    fn test_face_with_two_corners_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(parse_obj(text).is_err());
    }
}
