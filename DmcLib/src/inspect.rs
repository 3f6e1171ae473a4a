//! Model and motion inspection
//!
//! Summaries of decoded files suitable for printing or JSON export.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::formats::model::{Model, ModelKind, VertexChannels, read_model_file};
use crate::formats::motion::{Compression, Motion, TrackChannel, read_motion_file};
use crate::options::DecodeOptions;

/// Summary of a model file.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub kind: ModelKind,
    pub version: f32,
    pub object_count: usize,
    pub texture_count: u8,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub objects: Vec<ObjectInfo>,
    pub skeleton: SkeletonInfo,
}

/// Summary of one object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub index: usize,
    pub flags: u32,
    pub center: [f32; 3],
    pub radius: f32,
    pub meshes: Vec<MeshInfo>,
}

/// Summary of one mesh.
#[derive(Debug, Clone, Serialize)]
pub struct MeshInfo {
    pub name: String,
    pub texture_index: i16,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub skipped_vertices: usize,
    pub skinned: bool,
}

/// Summary of the skeleton.
#[derive(Debug, Clone, Serialize)]
pub struct SkeletonInfo {
    pub bone_count: usize,
    pub roots: Vec<usize>,
    pub parents: Vec<Option<usize>>,
    /// `(bone, object)` attachment pairs
    pub attachments: Vec<(usize, usize)>,
}

/// Summary of a motion file.
#[derive(Debug, Clone, Serialize)]
pub struct MotionInfo {
    pub id: i32,
    pub start_frame: f32,
    pub end_frame: f32,
    pub bone_count: u16,
    pub declared_track_count: u32,
    pub decoded_track_count: usize,
    pub tracks: Vec<TrackInfo>,
    pub skipped: Vec<TrackInfo>,
}

/// Summary of one track.
#[derive(Debug, Clone, Serialize)]
pub struct TrackInfo {
    pub bone: usize,
    pub channel: TrackChannel,
    /// Compression code as stored in the file
    pub compression: u16,
    pub key_count: usize,
    pub first_frame: Option<u16>,
    pub last_frame: Option<u16>,
}

/// Build a summary of a decoded model.
#[must_use]
pub fn model_info(model: &Model) -> ModelInfo {
    let objects: Vec<ObjectInfo> = model
        .objects
        .iter()
        .enumerate()
        .map(|(o, object)| ObjectInfo {
            index: o,
            flags: object.flags,
            center: object.bounding_sphere.center.to_array(),
            radius: object.bounding_sphere.radius,
            meshes: object
                .meshes
                .iter()
                .enumerate()
                .map(|(m, mesh)| MeshInfo {
                    name: mesh.display_name(o, m),
                    texture_index: mesh.texture_index,
                    vertex_count: mesh.vertices.len(),
                    triangle_count: mesh.triangles.len(),
                    skipped_vertices: mesh.vertices.skip.iter().filter(|&&s| s).count(),
                    skinned: matches!(mesh.vertices.channels, VertexChannels::Skinned { .. }),
                })
                .collect(),
        })
        .collect();

    let skeleton = &model.skeleton;
    ModelInfo {
        kind: model.kind(),
        version: model.header.version,
        object_count: objects.len(),
        texture_count: model.header.texture_count,
        mesh_count: objects.iter().map(|o| o.meshes.len()).sum(),
        vertex_count: model.meshes().map(|(_, _, m)| m.vertices.len()).sum(),
        triangle_count: model.triangle_count(),
        objects,
        skeleton: SkeletonInfo {
            bone_count: skeleton.len(),
            roots: skeleton.roots().map(|b| b.index).collect(),
            parents: skeleton.bones.iter().map(|b| b.parent).collect(),
            attachments: skeleton.attachments(),
        },
    }
}

/// Build a summary of a decoded motion.
#[must_use]
pub fn motion_info(motion: &Motion) -> MotionInfo {
    let tracks = motion
        .groups
        .iter()
        .flat_map(|group| {
            group.tracks.iter().map(|track| TrackInfo {
                bone: group.bone,
                channel: track.channel,
                compression: track.compression.code(),
                key_count: track.keys.len(),
                first_frame: track.first_time(),
                last_frame: track.last_time(),
            })
        })
        .collect::<Vec<_>>();
    let skipped = motion
        .skipped
        .iter()
        .map(|s| TrackInfo {
            bone: s.bone,
            channel: s.channel,
            compression: s.code,
            key_count: 0,
            first_frame: None,
            last_frame: None,
        })
        .collect();

    MotionInfo {
        id: motion.header.id,
        start_frame: motion.header.start_frame,
        end_frame: motion.header.end_frame,
        bone_count: motion.header.bone_count,
        declared_track_count: motion.track_count,
        decoded_track_count: tracks.len(),
        tracks,
        skipped,
    }
}

/// Decode and summarize a model file.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn inspect_model<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<ModelInfo> {
    Ok(model_info(&read_model_file(path, options)?))
}

/// Decode and summarize a motion file.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn inspect_motion<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<MotionInfo> {
    Ok(motion_info(&read_motion_file(path, options)?))
}

impl TrackInfo {
    /// Compression label, or `unsupported(<code>)` for unknown codes.
    #[must_use]
    pub fn compression_name(&self) -> String {
        match Compression::from_code(self.compression) {
            Some(c) => format!("{c:?}"),
            None => format!("unsupported({})", self.compression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::test_utils::{FixtureTrack, FixtureVertex, build_model, build_motion};
    use crate::formats::model::read_model;
    use crate::formats::motion::read_motion;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_model_info() {
        let vertices = [
            FixtureVertex::at([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            FixtureVertex::at([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            FixtureVertex::at([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let data = build_model(b"MOD ", &vertices, &[(-1, 0, 0, [0.0; 3])]);
        let info = model_info(&read_model(&data).unwrap());
        assert_eq!(info.kind, ModelKind::Character);
        assert_eq!(info.mesh_count, 1);
        assert_eq!(info.vertex_count, 3);
        assert_eq!(info.triangle_count, 1);
        assert_eq!(info.objects[0].meshes[0].name, "Object:0_Mesh:0_Tex:0");
        assert!(info.objects[0].meshes[0].skinned);
        assert_eq!(info.skeleton.roots, vec![0]);
        assert_eq!(info.skeleton.attachments, vec![(0, 0)]);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "Character");
        assert_eq!(json["objects"][0]["meshes"][0]["triangle_count"], 1);
    }

    #[test]
    fn test_motion_info() {
        let data = build_motion(
            &[(
                0x100 | 0x1,
                vec![
                    FixtureTrack::linear(0.0, 1.0, &[(0, 0), (12, 10)]),
                    FixtureTrack::unsupported(99, 4),
                ],
            )],
            0,
        );
        let info = motion_info(&read_motion(&data).unwrap());
        assert_eq!(info.declared_track_count, 2);
        assert_eq!(info.decoded_track_count, 1);
        assert_eq!(info.tracks[0].last_frame, Some(12));
        assert_eq!(info.tracks[0].compression_name(), "LinearInt16");
        assert_eq!(info.skipped[0].channel, TrackChannel::ScaleZ);
        assert_eq!(info.skipped[0].compression_name(), "unsupported(99)");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["tracks"][0]["channel"], "TranslationX");
    }
}
