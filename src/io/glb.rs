//! Binary glTF 2.0 (GLB) container export.
//!
//! Packs the triangle stream into POSITION/NORMAL/index buffers (vertices
//! deduplicated within [`tolerance`]) and wraps them in the two-chunk GLB
//! layout: a 12-byte header, a JSON chunk, and a binary chunk.

use crate::float_types::{tolerance, Real};
use crate::triangulated::Triangulated3D;
use nalgebra::{Point3, Vector3};

const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

#[derive(Clone)]
struct GlbVertex {
    position: Point3<Real>,
    normal: Vector3<Real>,
}

/// Add a vertex to the list, reusing an existing one if position and normal
/// are within `tolerance()`.
fn add_unique_vertex(
    vertices: &mut Vec<GlbVertex>,
    position: Point3<Real>,
    normal: Vector3<Real>,
) -> u32 {
    for (i, existing) in vertices.iter().enumerate() {
        if (existing.position.coords - position.coords).norm() < tolerance()
            && (existing.normal - normal).norm() < tolerance()
        {
            return i as u32;
        }
    }
    vertices.push(GlbVertex { position, normal });
    (vertices.len() - 1) as u32
}

fn build_buffers<T: Triangulated3D>(shape: &T) -> (Vec<GlbVertex>, Vec<u32>) {
    let mut vertices = Vec::<GlbVertex>::new();
    let mut indices = Vec::<u32>::new();

    shape.visit_triangles(|tri| {
        for v in tri {
            let idx = add_unique_vertex(&mut vertices, v.position, v.normal);
            indices.push(idx);
        }
    });

    (vertices, indices)
}

/// Serialize a shape to a complete GLB byte vector with a single mesh,
/// single node and single scene.
pub fn to_glb<T: Triangulated3D>(shape: &T, object_name: &str) -> Vec<u8> {
    let (vertices, indices) = build_buffers(shape);

    let mut position_bytes = Vec::with_capacity(vertices.len() * 12);
    let mut normal_bytes = Vec::with_capacity(vertices.len() * 12);
    let mut index_bytes = Vec::with_capacity(indices.len() * 4);

    for v in &vertices {
        for c in [v.position.x, v.position.y, v.position.z] {
            position_bytes.extend_from_slice(&(c as f32).to_le_bytes());
        }
        for c in [v.normal.x, v.normal.y, v.normal.z] {
            normal_bytes.extend_from_slice(&(c as f32).to_le_bytes());
        }
    }
    for &idx in &indices {
        index_bytes.extend_from_slice(&idx.to_le_bytes());
    }

    let positions_len = position_bytes.len() as u32;
    let normals_len = normal_bytes.len() as u32;
    let indices_len = index_bytes.len() as u32;
    let normals_offset = positions_len;
    let indices_offset = positions_len + normals_len;

    let mut bin = Vec::with_capacity((positions_len + normals_len + indices_len) as usize);
    bin.extend_from_slice(&position_bytes);
    bin.extend_from_slice(&normal_bytes);
    bin.extend_from_slice(&index_bytes);
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = serde_json::json!({
        "asset": { "version": "2.0", "generator": "platecad" },
        "buffers": [ { "byteLength": bin.len() } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": positions_len, "target": 34962 },
            { "buffer": 0, "byteOffset": normals_offset, "byteLength": normals_len, "target": 34962 },
            { "buffer": 0, "byteOffset": indices_offset, "byteLength": indices_len, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": vertices.len(), "type": "VEC3" },
            { "bufferView": 1, "componentType": 5126, "count": vertices.len(), "type": "VEC3" },
            { "bufferView": 2, "componentType": 5125, "count": indices.len(), "type": "SCALAR" }
        ],
        "meshes": [ {
            "name": object_name,
            "primitives": [ { "attributes": { "POSITION": 0, "NORMAL": 1 }, "indices": 2 } ]
        } ],
        "nodes": [ { "mesh": 0 } ],
        "scenes": [ { "nodes": [0] } ],
        "scene": 0
    });
    let mut json_bytes = json.to_string().into_bytes();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }

    let total_length = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total_length);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total_length as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_bytes);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::tessellate::box_mesh;

    #[test]
    fn glb_header_and_chunk_layout() {
        let bytes = to_glb(&box_mesh(100.0, 50.0, 5.0), "part");
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 2);
        let total = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        assert_eq!(total, bytes.len());
        assert_eq!(&bytes[16..20], b"JSON");
    }

    #[test]
    fn box_vertices_deduplicate_per_face_normal() {
        let (vertices, indices) = build_buffers(&box_mesh(100.0, 50.0, 5.0));
        // 8 corners x 3 adjoining face normals
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
    }
}
