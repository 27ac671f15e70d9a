//! STL export: ASCII triangle soup for the fallback path, binary STL for the
//! kernel's intermediate render mesh.

use crate::triangulated::Triangulated3D;

/// Convert a shape to an **ASCII STL** string with the given `name`.
///
/// `comments` are emitted as `# …` lines ahead of the `solid` record; the
/// fallback mesh uses them to carry part metadata in the text.
pub fn to_stl_ascii<T: Triangulated3D>(shape: &T, name: &str, comments: &[String]) -> String {
    let mut out = String::new();
    for comment in comments {
        out.push_str(&format!("# {comment}\n"));
    }
    out.push_str(&format!("solid {name}\n"));

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        out.push_str(&format!(
            "  facet normal {:.6} {:.6} {:.6}\n",
            n.x, n.y, n.z
        ));
        out.push_str("    outer loop\n");
        for v in &tri {
            let p = v.position;
            out.push_str(&format!(
                "      vertex {:.6} {:.6} {:.6}\n",
                p.x, p.y, p.z
            ));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    });

    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Convert a shape to a **binary STL** byte vector.
pub fn to_stl_binary<T: Triangulated3D>(shape: &T) -> std::io::Result<Vec<u8>> {
    use stl_io::{Normal, Triangle, Vertex, write_stl};

    let mut triangles = Vec::<Triangle>::new();

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        triangles.push(Triangle {
            normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
            vertices: tri.map(|v| {
                let p = v.position;
                Vertex::new([p.x as f32, p.y as f32, p.z as f32])
            }),
        });
    });

    let mut cursor = std::io::Cursor::new(Vec::new());
    write_stl(&mut cursor, triangles.iter())?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::tessellate::box_mesh;

    #[test]
    fn ascii_stl_counts_facets_and_keeps_comments() {
        let mesh = box_mesh(100.0, 50.0, 5.0);
        let text = to_stl_ascii(&mesh, "part", &["Material: PP".to_string()]);
        assert!(text.starts_with("# Material: PP\n"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert!(text.trim_end().ends_with("endsolid part"));
    }

    #[test]
    fn binary_stl_has_expected_triangle_count() {
        let mesh = box_mesh(100.0, 50.0, 5.0);
        let bytes = to_stl_binary(&mesh).unwrap();
        // 80-byte header + u32 count + 12 * 50-byte records
        assert_eq!(bytes.len(), 80 + 4 + 12 * 50);
        let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap());
        assert_eq!(count, 12);
    }
}
