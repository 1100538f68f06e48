//! CPU-side render buffers and their construction from shape tessellations.

use shared::ShapeTessellation;

/// Interleaved triangle mesh: [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Clone, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// (first index, index count) per topological face, for sub-shape
    /// highlight draws
    pub face_ranges: Vec<(u32, u32)>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
    /// (first vertex, vertex count) per topological edge
    pub edge_ranges: Vec<(u32, u32)>,
    /// (first vertex, vertex count) per vertex marker
    pub vertex_ranges: Vec<(u32, u32)>,
}

impl LineMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 7
    }
}

/// Flatten a tessellation into one triangle buffer, remembering where
/// each topological face starts.
pub fn mesh_from_tessellation(tess: &ShapeTessellation, color: [f32; 3]) -> MeshData {
    let mut data = MeshData::default();

    for face in &tess.faces {
        let base = data.vertex_count() as u32;
        let first = data.indices.len() as u32;

        for (p, n) in face.positions.iter().zip(&face.normals) {
            data.vertices.extend_from_slice(&[
                p[0], p[1], p[2], n[0], n[1], n[2], color[0], color[1], color[2],
            ]);
        }
        data.indices.extend(face.indices.iter().map(|i| base + i));
        data.face_ranges.push((first, face.indices.len() as u32));
    }

    data
}

/// Size of the vertex marker cross, in model units
const VERTEX_MARKER_SIZE: f32 = 0.08;

/// Edge polylines plus a small 3-axis cross per topological vertex
pub fn lines_from_tessellation(tess: &ShapeTessellation, color: [f32; 4]) -> LineMeshData {
    let mut data = LineMeshData::default();

    for edge in &tess.edges {
        let first = data.vertex_count() as u32;
        for pair in edge.points.windows(2) {
            push_line_vert(&mut data.vertices, pair[0], color);
            push_line_vert(&mut data.vertices, pair[1], color);
        }
        data.edge_ranges.push((first, data.vertex_count() as u32 - first));
    }

    let s = VERTEX_MARKER_SIZE * 0.5;
    for &p in &tess.vertices {
        let first = data.vertex_count() as u32;
        for axis in 0..3 {
            let mut a = p;
            let mut b = p;
            a[axis] -= s;
            b[axis] += s;
            push_line_vert(&mut data.vertices, a, color);
            push_line_vert(&mut data.vertices, b, color);
        }
        data.vertex_ranges.push((first, 6));
    }

    data
}

/// Reference grid on the XZ plane
pub fn grid(range: i32, cell_size: f32, opacity: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let grid_color = [0.25_f32, 0.25, 0.25, opacity];
    let origin_color_x = [0.5_f32, 0.2, 0.2, opacity * 0.7];
    let origin_color_z = [0.2_f32, 0.2, 0.5, opacity * 0.7];

    let extent = range as f32 * cell_size;

    for i in -range..=range {
        let f = i as f32 * cell_size;
        let color = if i == 0 { origin_color_z } else { grid_color };
        push_line_vert(&mut vertices, [f, 0.0, -extent], color);
        push_line_vert(&mut vertices, [f, 0.0, extent], color);

        let color = if i == 0 { origin_color_x } else { grid_color };
        push_line_vert(&mut vertices, [-extent, 0.0, f], color);
        push_line_vert(&mut vertices, [extent, 0.0, f], color);
    }

    LineMeshData { vertices, ..Default::default() }
}

/// Origin triedron: red X, green Y, blue Z
pub fn axes(length: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let r = [0.9_f32, 0.2, 0.2, 1.0];
    let g = [0.2_f32, 0.8, 0.2, 1.0];
    let b = [0.2_f32, 0.3, 0.9, 1.0];

    push_line_vert(&mut vertices, [0.0, 0.0, 0.0], r);
    push_line_vert(&mut vertices, [length, 0.0, 0.0], r);
    push_line_vert(&mut vertices, [0.0, 0.0, 0.0], g);
    push_line_vert(&mut vertices, [0.0, length, 0.0], g);
    push_line_vert(&mut vertices, [0.0, 0.0, 0.0], b);
    push_line_vert(&mut vertices, [0.0, 0.0, length], b);

    LineMeshData { vertices, ..Default::default() }
}

fn push_line_vert(v: &mut Vec<f32>, p: [f32; 3], c: [f32; 4]) {
    v.extend_from_slice(&[p[0], p[1], p[2], c[0], c[1], c[2], c[3]]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{primitives, tessellate, DeflectionParams};

    #[test]
    fn test_box_mesh_ranges_cover_all_indices() {
        let tess = tessellate::tessellate_shape(
            &primitives::box_solid(1.0, 1.0, 1.0),
            &DeflectionParams::default(),
        );
        let mesh = mesh_from_tessellation(&tess, [0.5, 0.5, 0.5]);

        assert_eq!(mesh.face_ranges.len(), 6);
        let covered: u32 = mesh.face_ranges.iter().map(|(_, n)| n).sum();
        assert_eq!(covered as usize, mesh.indices.len());
        assert_eq!(mesh.vertices.len() % 9, 0);
    }

    #[test]
    fn test_box_lines_have_edge_and_vertex_ranges() {
        let tess = tessellate::tessellate_shape(
            &primitives::box_solid(1.0, 1.0, 1.0),
            &DeflectionParams::default(),
        );
        let lines = lines_from_tessellation(&tess, [0.0, 0.0, 0.0, 1.0]);

        assert_eq!(lines.edge_ranges.len(), 12);
        assert_eq!(lines.vertex_ranges.len(), 8);
        // Each marker is 3 segments
        assert!(lines.vertex_ranges.iter().all(|&(_, n)| n == 6));
        assert_eq!(lines.vertices.len() % 7, 0);
    }

    #[test]
    fn test_grid_line_count() {
        let g = grid(2, 1.0, 0.5);
        // (2*range+1) lines in each direction, 2 vertices each
        assert_eq!(g.vertex_count(), (2 * 2 + 1) * 4);
    }
}
