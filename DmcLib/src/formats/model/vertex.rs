//! Vertex array decoding
//!
//! Each array lives at its own file offset and is densely packed, so every
//! array gets an independent reader over the shared buffer.

use glam::{Vec2, Vec3};

use crate::error::Result;
use crate::formats::common::BinaryReader;
use crate::options::BoneIndexDecoding;

use super::types::{MeshChannelOffsets, MeshOffsets, VertexChannels, VertexData};

/// UV fixed-point scale.
const UV_SCALE: f32 = 4096.0;
/// Skip flag in the packed weight word.
const WEIGHT_SKIP_BIT: u16 = 1 << 15;
/// Skip flag in the stage color flag byte.
const COLOR_SKIP_BIT: u8 = 1 << 1;

/// Decode all vertex arrays of one mesh.
///
/// The layout is carried by `offsets.channels`: skinned meshes read bone
/// indices and packed weights, colored meshes read RGB plus a flag byte.
pub fn decode_vertices(
    data: &[u8],
    offsets: &MeshOffsets,
    count: usize,
    bone_count: u8,
    bone_indices: BoneIndexDecoding,
) -> Result<VertexData> {
    let positions = read_vec3_array(data, offsets.positions, count)?;
    let normals = read_vec3_array(data, offsets.normals, count)?;
    let uvs = read_uvs(data, offsets.uvs, count)?;

    let (channels, skip) = match offsets.channels {
        MeshChannelOffsets::Skinned {
            bone_indices: index_offset,
            weights,
        } => {
            let indices = read_bone_indices(data, index_offset, count, bone_count, bone_indices)?;
            let (weights, skip) = read_weights(data, weights, count)?;
            (
                VertexChannels::Skinned {
                    bone_indices: indices,
                    bone_weights: weights,
                },
                skip,
            )
        }
        MeshChannelOffsets::Colored { colors } => {
            let (colors, skip) = read_colors(data, colors, count)?;
            (VertexChannels::Colored { colors }, skip)
        }
    };

    Ok(VertexData {
        positions,
        normals,
        uvs,
        channels,
        skip,
    })
}

/// Read `count` packed `f32` triples.
pub fn read_vec3_array(data: &[u8], offset: i64, count: usize) -> Result<Vec<Vec3>> {
    let mut reader = BinaryReader::at(data, offset)?;
    (0..count)
        .map(|_| reader.read_vec3().map(Vec3::from_array))
        .collect()
}

/// Read `count` UV pairs stored as `i16 / 4096` with V flipped.
pub fn read_uvs(data: &[u8], offset: i64, count: usize) -> Result<Vec<Vec2>> {
    let mut reader = BinaryReader::at(data, offset)?;
    (0..count)
        .map(|_| {
            let u = f32::from(reader.read_i16()?) / UV_SCALE;
            let v = f32::from(reader.read_i16()?) / UV_SCALE;
            Ok(Vec2::new(u, 1.0 - v))
        })
        .collect()
}

/// Read `count` bone index triples. Each record is a pad byte then three
/// raw bytes holding `4 * index`.
pub fn read_bone_indices(
    data: &[u8],
    offset: i64,
    count: usize,
    bone_count: u8,
    mode: BoneIndexDecoding,
) -> Result<Vec<[u8; 3]>> {
    let mut reader = BinaryReader::at(data, offset)?;
    (0..count)
        .map(|_| {
            reader.skip(1)?;
            let raw: [u8; 3] = reader.read_tag()?;
            Ok(raw.map(|b| mode.decode(b, bone_count)))
        })
        .collect()
}

/// Split a packed weight word into three `n/31` weights and the skip flag.
#[must_use]
pub fn unpack_weights(word: u16) -> ([f32; 3], bool) {
    let field = |shift: u16| f32::from((word >> shift) & 0x1f) / 31.0;
    ([field(0), field(5), field(10)], word & WEIGHT_SKIP_BIT != 0)
}

/// Read `count` packed weight words.
pub fn read_weights(data: &[u8], offset: i64, count: usize) -> Result<(Vec<[f32; 3]>, Vec<bool>)> {
    let mut reader = BinaryReader::at(data, offset)?;
    let mut weights = Vec::with_capacity(count);
    let mut skip = Vec::with_capacity(count);
    for _ in 0..count {
        let (w, s) = unpack_weights(reader.read_u16()?);
        weights.push(w);
        skip.push(s);
    }
    Ok((weights, skip))
}

/// Read `count` RGB + flag records. Alpha is fixed at 1.0.
pub fn read_colors(data: &[u8], offset: i64, count: usize) -> Result<(Vec<[f32; 4]>, Vec<bool>)> {
    let mut reader = BinaryReader::at(data, offset)?;
    let mut colors = Vec::with_capacity(count);
    let mut skip = Vec::with_capacity(count);
    for _ in 0..count {
        let [r, g, b, flags]: [u8; 4] = reader.read_tag()?;
        let channel = |c: u8| f32::from(c) / 255.0;
        colors.push([channel(r), channel(g), channel(b), 1.0]);
        skip.push(flags & COLOR_SKIP_BIT != 0);
    }
    Ok((colors, skip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::formats::common::test_utils::ByteWriter;

    #[test]
    fn test_uvs_scale_and_flip() {
        let mut w = ByteWriter::new();
        w.i16(4096).i16(1024).i16(-2048).i16(0);
        let uvs = read_uvs(&w.buf, 0, 2).unwrap();
        assert_eq!(uvs[0], Vec2::new(1.0, 0.75));
        assert_eq!(uvs[1], Vec2::new(-0.5, 1.0));
    }

    #[test]
    fn test_bone_indices_skip_pad_byte() {
        let mut w = ByteWriter::new();
        w.bytes(&[0xFF, 0, 4, 9]).bytes(&[0x00, 12, 8, 4]);
        let indices = read_bone_indices(&w.buf, 0, 2, 4, BoneIndexDecoding::Divide).unwrap();
        assert_eq!(indices, vec![[0, 1, 2], [3, 2, 1]]);
    }

    #[test]
    fn test_unpack_weights() {
        let word = 31 | (15 << 5) | (1 << 10) | WEIGHT_SKIP_BIT;
        let (weights, skip) = unpack_weights(word);
        assert_eq!(weights[0], 1.0);
        assert!((weights[1] - 15.0 / 31.0).abs() < 1e-6);
        assert!((weights[2] - 1.0 / 31.0).abs() < 1e-6);
        assert!(skip);

        let (_, skip) = unpack_weights(0x7FFF);
        assert!(!skip);
    }

    #[test]
    fn test_colors_skip_on_bit_one() {
        let mut w = ByteWriter::new();
        w.bytes(&[255, 0, 51, 0b01]).bytes(&[0, 0, 0, 0b10]);
        let (colors, skip) = read_colors(&w.buf, 0, 2).unwrap();
        assert_eq!(colors[0], [1.0, 0.0, 0.2, 1.0]);
        assert_eq!(skip, vec![false, true]);
    }

    #[test]
    fn test_arrays_read_independently() {
        let mut w = ByteWriter::new();
        w.f32(1.0).f32(2.0).f32(3.0);
        w.f32(0.0).f32(0.0).f32(1.0);
        w.i16(0).i16(0);
        w.bytes(&[10, 20, 30, 0]);
        let offsets = MeshOffsets {
            positions: 0,
            normals: 12,
            uvs: 24,
            channels: MeshChannelOffsets::Colored { colors: 28 },
        };
        let data = decode_vertices(&w.buf, &offsets, 1, 0, BoneIndexDecoding::Divide).unwrap();
        assert_eq!(data.positions, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(data.normals, vec![Vec3::Z]);
        assert_eq!(data.uvs, vec![Vec2::new(0.0, 1.0)]);
        assert_eq!(data.skip, vec![false]);
    }

    #[test]
    fn test_offset_past_end_is_truncated() {
        let data = [0u8; 8];
        let err = read_vec3_array(&data, 4, 1).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { offset: 8, expected: 4, available: 0 }));
        let err = read_vec3_array(&data, 64, 1).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { offset: 64, .. }));
    }
}
