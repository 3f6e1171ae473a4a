//! Model file reader
//!
//! The header tag is resolved to a [`ModelKind`] once; every
//! layout-dependent step receives that kind explicitly.

use std::path::Path;

use glam::Vec3;
use rayon::prelude::*;

use crate::error::Result;
use crate::formats::common::BinaryReader;
use crate::options::DecodeOptions;

use super::skeleton::read_skeleton;
use super::strip::strip_to_triangles;
use super::types::{
    BoundingSphere, MESH_RECORD_SIZE, Mesh, MeshChannelOffsets, MeshOffsets, Model, ModelHeader,
    ModelKind, OBJECT_RECORD_SIZE, OBJECT_TABLE_OFFSET, Object,
};
use super::vertex::decode_vertices;

/// A mesh record before its vertex arrays are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRecord {
    pub vertex_count: u16,
    pub texture_index: i16,
    pub offsets: MeshOffsets,
    pub unknown: i64,
}

/// Reader over a complete model file held in memory.
#[derive(Debug, Clone)]
pub struct ModelReader<'a> {
    data: &'a [u8],
    options: DecodeOptions,
}

impl<'a> ModelReader<'a> {
    /// Create a reader with default options.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            options: DecodeOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode the file header.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownFormatTag`] for an unrecognized tag
    /// and [`crate::Error::TruncatedInput`] for a short file.
    pub fn read_header(&self) -> Result<ModelHeader> {
        let mut reader = BinaryReader::new(self.data);
        let kind = ModelKind::from_tag(reader.read_tag()?)?;
        let version = reader.read_f32()?;
        reader.skip(8)?;
        let object_count = reader.read_u8()?;
        let bone_count = reader.read_u8()?;
        let texture_count = reader.read_u8()?;
        let unknown_byte = reader.read_u8()?;
        let unknown_int = reader.read_i32()?;
        let unknown_long = reader.read_i64()?;
        let skeleton_offset = reader.read_i64()?;

        Ok(ModelHeader {
            kind,
            version,
            object_count,
            bone_count,
            texture_count,
            unknown_byte,
            unknown_int,
            unknown_long,
            skeleton_offset,
        })
    }

    /// Decode the object table without mesh data.
    pub fn read_objects(&self, header: &ModelHeader) -> Result<Vec<Object>> {
        let mut reader = BinaryReader::new(self.data);
        reader.seek(OBJECT_TABLE_OFFSET);
        (0..header.object_count)
            .map(|_| {
                let start = reader.position();
                let object = read_object_record(&mut reader)?;
                reader.seek(start + OBJECT_RECORD_SIZE);
                Ok(object)
            })
            .collect()
    }

    /// Decode the `count` mesh records of a mesh table.
    pub fn read_mesh_records(&self, kind: ModelKind, offset: i64, count: u8) -> Result<Vec<MeshRecord>> {
        let mut reader = BinaryReader::at(self.data, offset)?;
        (0..count)
            .map(|_| {
                let start = reader.position();
                let record = read_mesh_record(&mut reader, kind)?;
                reader.seek(start + MESH_RECORD_SIZE);
                Ok(record)
            })
            .collect()
    }

    /// Decode one mesh: vertex arrays, then the strip into triangles.
    pub fn decode_mesh(&self, record: &MeshRecord, bone_count: u8) -> Result<Mesh> {
        let vertices = decode_vertices(
            self.data,
            &record.offsets,
            usize::from(record.vertex_count),
            bone_count,
            self.options.bone_indices,
        )?;
        let triangles = strip_to_triangles(
            &vertices.positions,
            &vertices.normals,
            &vertices.skip,
            self.options.degenerate_triangles,
        )?;

        Ok(Mesh {
            vertex_count: record.vertex_count,
            texture_index: record.texture_index,
            offsets: record.offsets,
            unknown: record.unknown,
            vertices,
            triangles,
        })
    }

    /// Decode the whole model.
    ///
    /// # Errors
    /// Propagates any header, table, vertex, strip or skeleton error.
    pub fn read(&self) -> Result<Model> {
        let header = self.read_header()?;
        let mut objects = self.read_objects(&header)?;

        let mut jobs = Vec::new();
        for (index, object) in objects.iter().enumerate() {
            let records =
                self.read_mesh_records(header.kind, object.mesh_table_offset, object.mesh_count)?;
            jobs.extend(records.into_iter().map(|record| (index, record)));
        }

        let bone_count = header.bone_count;
        let decode = |(object, record): &(usize, MeshRecord)| {
            self.decode_mesh(record, bone_count).map(|mesh| (*object, mesh))
        };
        let meshes: Vec<(usize, Mesh)> = if self.options.parallel {
            jobs.par_iter().map(decode).collect::<Result<_>>()?
        } else {
            jobs.iter().map(decode).collect::<Result<_>>()?
        };
        for (object, mesh) in meshes {
            objects[object].meshes.push(mesh);
        }

        let skeleton = read_skeleton(
            self.data,
            header.skeleton_offset,
            usize::from(header.bone_count),
        )?;

        tracing::debug!(
            kind = header.kind.as_str(),
            objects = objects.len(),
            meshes = jobs.len(),
            bones = skeleton.len(),
            "decoded model"
        );

        Ok(Model {
            header,
            objects,
            skeleton,
        })
    }
}

fn read_object_record(reader: &mut BinaryReader<'_>) -> Result<Object> {
    let mesh_count = reader.read_u8()?;
    let unknown = reader.read_u8()?;
    let vertex_count = reader.read_u16()?;
    reader.skip(4)?;
    let mesh_table_offset = reader.read_i64()?;
    let flags = reader.read_u32()?;
    reader.skip(28)?;
    let center = Vec3::from_array(reader.read_vec3()?);
    let radius = reader.read_f32()?;

    Ok(Object {
        mesh_count,
        unknown,
        vertex_count,
        mesh_table_offset,
        flags,
        bounding_sphere: BoundingSphere { center, radius },
        meshes: Vec::with_capacity(usize::from(mesh_count)),
    })
}

fn read_mesh_record(reader: &mut BinaryReader<'_>, kind: ModelKind) -> Result<MeshRecord> {
    let vertex_count = reader.read_u16()?;
    let texture_index = reader.read_i16()?;
    reader.skip(12)?;
    let positions = reader.read_i64()?;
    let normals = reader.read_i64()?;
    let uvs = reader.read_i64()?;

    let channels = match kind {
        ModelKind::Character => {
            let bone_indices = reader.read_i64()?;
            let weights = reader.read_i64()?;
            reader.skip(8)?;
            MeshChannelOffsets::Skinned {
                bone_indices,
                weights,
            }
        }
        ModelKind::Stage => {
            reader.skip(16)?;
            MeshChannelOffsets::Colored {
                colors: reader.read_i64()?,
            }
        }
    };
    let unknown = reader.read_i64()?;
    reader.skip(8)?;

    Ok(MeshRecord {
        vertex_count,
        texture_index,
        offsets: MeshOffsets {
            positions,
            normals,
            uvs,
            channels,
        },
        unknown,
    })
}

/// Decode a model from bytes with default options.
pub fn read_model(data: &[u8]) -> Result<Model> {
    ModelReader::new(data).read()
}

/// Decode a model from bytes.
pub fn read_model_with_options(data: &[u8], options: &DecodeOptions) -> Result<Model> {
    ModelReader::new(data).with_options(options.clone()).read()
}

/// Read and decode a model file.
pub fn read_model_file<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Model> {
    let data = std::fs::read(path.as_ref())?;
    read_model_with_options(&data, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::formats::common::test_utils::{ByteWriter, FixtureVertex, build_model};
    use crate::formats::model::types::VertexChannels;
    use crate::options::DegenerateTriangles;
    use pretty_assertions::assert_eq;

    fn triangle(normal: [f32; 3]) -> Vec<FixtureVertex> {
        vec![
            FixtureVertex::at([0.0, 0.0, 0.0], normal),
            FixtureVertex::at([1.0, 0.0, 0.0], normal),
            FixtureVertex::at([0.0, 1.0, 0.0], normal),
        ]
    }

    #[test]
    fn test_stage_model() {
        let mut vertices = triangle([0.0, 0.0, 1.0]);
        vertices[1].color = [255, 0, 0];
        vertices[2].uv = [2048, 4096];
        let data = build_model(b"SCM ", &vertices, &[(-1, 0, -1, [0.0; 3])]);

        let model = read_model(&data).unwrap();
        assert_eq!(model.kind(), ModelKind::Stage);
        assert_eq!(model.header.object_count, 1);
        assert_eq!(model.objects.len(), 1);
        let mesh = &model.objects[0].meshes[0];
        assert_eq!(mesh.vertices.positions.len(), 3);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices.uvs[2], glam::Vec2::new(0.5, 0.0));
        match &mesh.vertices.channels {
            VertexChannels::Colored { colors } => assert_eq!(colors[1], [1.0, 0.0, 0.0, 1.0]),
            other => panic!("expected colors, got {other:?}"),
        }
        assert_eq!(model.objects[0].bounding_sphere.radius, 1.0);
    }

    #[test]
    fn test_character_model() {
        let mut vertices = triangle([0.0, 0.0, -1.0]);
        vertices[0].bones = [4, 0, 0];
        vertices[0].weights = 31 | (16 << 5);
        let bones = [(-1, 0, -1, [0.0, 1.0, 0.0]), (0, 1, -1, [0.0, 2.0, 0.0])];
        let data = build_model(b"MOD ", &vertices, &bones);

        let model = read_model(&data).unwrap();
        assert_eq!(model.kind(), ModelKind::Character);
        let mesh = &model.objects[0].meshes[0];
        assert_eq!(mesh.triangles, vec![[0, 2, 1]]);
        match &mesh.vertices.channels {
            VertexChannels::Skinned {
                bone_indices,
                bone_weights,
            } => {
                assert_eq!(bone_indices[0], [1, 0, 0]);
                assert_eq!(bone_weights[0][0], 1.0);
            }
            other => panic!("expected skinning, got {other:?}"),
        }
        assert_eq!(model.skeleton.len(), 2);
        assert_eq!(model.skeleton.bones[1].parent, Some(0));
        assert_eq!(model.skeleton.world_positions()[1], Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_skip_flag_from_weights() {
        let mut vertices = triangle([0.0, 0.0, 1.0]);
        vertices[2].skip = true;
        let data = build_model(b"MOD ", &vertices, &[(-1, 0, -1, [0.0; 3])]);
        let model = read_model(&data).unwrap();
        let mesh = &model.objects[0].meshes[0];
        assert_eq!(mesh.vertices.skip, vec![false, false, true]);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn test_unknown_tag() {
        let data = build_model(b"MOD ", &triangle([0.0, 0.0, 1.0]), &[]);
        let mut bad = data.clone();
        bad[..4].copy_from_slice(b"XYZ ");
        assert!(matches!(
            read_model(&bad),
            Err(Error::UnknownFormatTag(tag)) if &tag == b"XYZ "
        ));
    }

    #[test]
    fn test_truncated_file() {
        let data = build_model(b"SCM ", &triangle([0.0, 0.0, 1.0]), &[]);
        assert!(matches!(
            read_model(&data[..0x50]),
            Err(Error::TruncatedInput { .. })
        ));
        assert!(matches!(
            read_model(&data[..10]),
            Err(Error::TruncatedInput { offset: 16, .. })
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let vertices: Vec<_> = (0..12)
            .map(|i| FixtureVertex::at([(i / 2) as f32, (i % 2) as f32, 0.0], [0.0, 0.0, 1.0]))
            .collect();
        let data = build_model(b"MOD ", &vertices, &[(-1, 0, -1, [0.0; 3])]);
        let sequential = read_model(&data).unwrap();
        let parallel =
            read_model_with_options(&data, &DecodeOptions::new().with_parallel(true)).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.triangle_count(), 10);
    }

    #[test]
    fn test_degenerate_policy_applies() {
        let vertices = vec![
            FixtureVertex::at([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            FixtureVertex::at([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            FixtureVertex::at([2.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let data = build_model(b"SCM ", &vertices, &[]);
        assert_eq!(read_model(&data).unwrap().triangle_count(), 0);
        let strict = DecodeOptions::new().with_degenerate_triangles(DegenerateTriangles::Error);
        assert!(matches!(
            read_model_with_options(&data, &strict),
            Err(Error::DegenerateTriangle { vertex: 2 })
        ));
    }

    #[test]
    fn test_mesh_records_are_contiguous() {
        let mut w = ByteWriter::new();
        w.zeros(16);
        for (count, texture) in [(3u16, 7i16), (5, -1)] {
            w.u16(count).i16(texture).zeros(12);
            w.i64(0x100).i64(0x200).i64(0x300);
            w.zeros(16).i64(0x400);
            w.i64(42).zeros(8);
        }
        let reader = ModelReader::new(&w.buf);
        let records = reader.read_mesh_records(ModelKind::Stage, 16, 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].vertex_count, 5);
        assert_eq!(records[1].texture_index, -1);
        assert_eq!(records[1].unknown, 42);
        assert_eq!(
            records[0].offsets.channels,
            MeshChannelOffsets::Colored { colors: 0x400 }
        );
    }
}
