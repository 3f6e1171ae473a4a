//! Decoded model structures.

use glam::{Vec2, Vec3};

use crate::error::{Error, Result};

use super::skeleton::Skeleton;

/// Fixed file offset of the object table.
pub const OBJECT_TABLE_OFFSET: u64 = 0x40;
/// Size of one object record.
pub const OBJECT_RECORD_SIZE: u64 = 0x40;
/// Size of one mesh record.
pub const MESH_RECORD_SIZE: u64 = 0x50;

/// Layout variant selected by the 4-byte header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ModelKind {
    /// `"MOD "`: skinned character model with bone indices and weights.
    Character,
    /// `"SCM "`: stage model with baked vertex colors.
    Stage,
}

impl ModelKind {
    pub const CHARACTER_TAG: [u8; 4] = *b"MOD ";
    pub const STAGE_TAG: [u8; 4] = *b"SCM ";

    /// Map a header tag to its layout. The trailing space is significant.
    ///
    /// # Errors
    /// Returns [`Error::UnknownFormatTag`] for any other tag.
    pub fn from_tag(tag: [u8; 4]) -> Result<Self> {
        match tag {
            Self::CHARACTER_TAG => Ok(Self::Character),
            Self::STAGE_TAG => Ok(Self::Stage),
            other => Err(Error::UnknownFormatTag(other)),
        }
    }

    #[must_use]
    pub fn tag(self) -> [u8; 4] {
        match self {
            Self::Character => Self::CHARACTER_TAG,
            Self::Stage => Self::STAGE_TAG,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "MOD",
            Self::Stage => "SCM",
        }
    }
}

/// Model file header.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHeader {
    pub kind: ModelKind,
    pub version: f32,
    pub object_count: u8,
    pub bone_count: u8,
    pub texture_count: u8,
    pub unknown_byte: u8,
    pub unknown_int: i32,
    pub unknown_long: i64,
    /// File-relative offset of the skeleton block.
    pub skeleton_offset: i64,
}

/// Bounding sphere stored in each object record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Layout-specific offsets at the tail of a mesh record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshChannelOffsets {
    Skinned { bone_indices: i64, weights: i64 },
    Colored { colors: i64 },
}

/// File-relative offsets of a mesh's vertex arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshOffsets {
    pub positions: i64,
    pub normals: i64,
    pub uvs: i64,
    pub channels: MeshChannelOffsets,
}

/// Per-vertex channels that depend on the layout.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexChannels {
    /// Character meshes: three bone influences per vertex.
    Skinned {
        bone_indices: Vec<[u8; 3]>,
        bone_weights: Vec<[f32; 3]>,
    },
    /// Stage meshes: RGBA color per vertex, alpha always 1.0.
    Colored { colors: Vec<[f32; 4]> },
}

/// Decoded vertex arrays. Every array is `vertex_count` long.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub channels: VertexChannels,
    /// Strip skip flag per vertex.
    pub skip: Vec<bool>,
}

impl VertexData {
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A mesh: one triangle strip with its vertex arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertex_count: u16,
    pub texture_index: i16,
    pub offsets: MeshOffsets,
    pub unknown: i64,
    pub vertices: VertexData,
    /// Triangle list rebuilt from the strip; every index is `< vertex_count`.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Host-facing mesh name: `Object:{o}_Mesh:{m}_Tex:{t}`.
    #[must_use]
    pub fn display_name(&self, object: usize, mesh: usize) -> String {
        format!("Object:{object}_Mesh:{mesh}_Tex:{}", self.texture_index)
    }

    /// Group skinning weights by bone.
    ///
    /// Returns one list of `(vertex, weight)` per bone in `[0, bone_count)`.
    /// Influences with zero weight are dropped; out-of-range indices are
    /// logged and ignored. Stage meshes yield empty groups.
    #[must_use]
    pub fn vertex_groups(&self, bone_count: usize) -> Vec<Vec<(u32, f32)>> {
        let mut groups = vec![Vec::new(); bone_count];
        let VertexChannels::Skinned {
            bone_indices,
            bone_weights,
        } = &self.vertices.channels
        else {
            return groups;
        };

        for (vertex, (indices, weights)) in bone_indices.iter().zip(bone_weights).enumerate() {
            for (&bone, &weight) in indices.iter().zip(weights) {
                let bone = usize::from(bone);
                if bone >= bone_count {
                    tracing::warn!(vertex, bone, bone_count, "bone index out of range");
                    continue;
                }
                if weight > 0.0 {
                    groups[bone].push((vertex as u32, weight));
                }
            }
        }
        groups
    }
}

/// An object: a group of meshes sharing a bounding sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub mesh_count: u8,
    pub unknown: u8,
    pub vertex_count: u16,
    pub mesh_table_offset: i64,
    pub flags: u32,
    pub bounding_sphere: BoundingSphere,
    pub meshes: Vec<Mesh>,
}

/// A decoded model file.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub header: ModelHeader,
    pub objects: Vec<Object>,
    pub skeleton: Skeleton,
}

impl Model {
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.header.kind
    }

    /// Iterate over every mesh with its object and mesh index.
    pub fn meshes(&self) -> impl Iterator<Item = (usize, usize, &Mesh)> {
        self.objects.iter().enumerate().flat_map(|(o, object)| {
            object.meshes.iter().enumerate().map(move |(m, mesh)| (o, m, mesh))
        })
    }

    /// Total triangle count across all meshes.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.meshes().map(|(_, _, mesh)| mesh.triangles.len()).sum()
    }
}
