//! Byte-level fixture builders shared by unit tests

use byteorder::{LittleEndian, WriteBytesExt};

/// Growable little-endian buffer with absolute patching.
#[derive(Default)]
pub(crate) struct ByteWriter {
    pub buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.write_u8(v).unwrap();
        self
    }

    pub fn i8(&mut self, v: i8) -> &mut Self {
        self.buf.write_i8(v).unwrap();
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.write_u16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.buf.write_i16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.write_i32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.buf.write_i64::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.write_f32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    pub fn pad_to(&mut self, pos: usize) -> &mut Self {
        assert!(self.buf.len() <= pos, "pad_to moves backwards");
        self.buf.resize(pos, 0);
        self
    }

    pub fn patch_i64(&mut self, at: usize, v: i64) {
        self.buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
    }

    pub fn patch_i32(&mut self, at: usize, v: i32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    pub fn patch_u32(&mut self, at: usize, v: u32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }
}

/// Fixture vertex for model builders.
#[derive(Clone, Copy)]
pub(crate) struct FixtureVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [i16; 2],
    /// Raw on-disk bone bytes (already multiplied by 4).
    pub bones: [u8; 3],
    pub weights: u16,
    pub color: [u8; 3],
    pub skip: bool,
}

impl FixtureVertex {
    pub fn at(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            uv: [0, 0],
            bones: [0, 0, 0],
            weights: 31,
            color: [255, 255, 255],
            skip: false,
        }
    }
}

/// Builds a single-object, single-mesh model file with a flat skeleton.
///
/// `bones` holds `(parent, order, child, position)` per slot.
pub(crate) fn build_model(
    tag: &[u8; 4],
    vertices: &[FixtureVertex],
    bones: &[(i8, i8, i8, [f32; 3])],
) -> Vec<u8> {
    let stage = tag == b"SCM ";
    let mut w = ByteWriter::new();

    // Header
    w.bytes(tag).f32(1.0).zeros(8);
    w.u8(1).u8(bones.len() as u8).u8(1).u8(0);
    w.i32(0).zeros(8);
    let skeleton_field = w.pos();
    w.i64(0);
    w.pad_to(0x40);

    // Object record
    w.u8(1).u8(0).u16(vertices.len() as u16).i32(0);
    let mesh_table_field = w.pos();
    w.i64(0);
    w.u32(0).zeros(28);
    w.f32(0.0).f32(0.0).f32(0.0).f32(1.0);

    // Mesh record
    let mesh_table = w.pos();
    w.patch_i64(mesh_table_field, mesh_table as i64);
    w.u16(vertices.len() as u16).i16(0).zeros(12);
    let offsets_field = w.pos();
    w.i64(0).i64(0).i64(0);
    let channel_field = w.pos();
    if stage {
        w.zeros(16).i64(0);
    } else {
        w.i64(0).i64(0).zeros(8);
    }
    w.i64(0).zeros(8);

    let positions = w.pos();
    for v in vertices {
        w.f32(v.position[0]).f32(v.position[1]).f32(v.position[2]);
    }
    let normals = w.pos();
    for v in vertices {
        w.f32(v.normal[0]).f32(v.normal[1]).f32(v.normal[2]);
    }
    let uvs = w.pos();
    for v in vertices {
        w.i16(v.uv[0]).i16(v.uv[1]);
    }
    w.patch_i64(offsets_field, positions as i64);
    w.patch_i64(offsets_field + 8, normals as i64);
    w.patch_i64(offsets_field + 16, uvs as i64);

    if stage {
        let colors = w.pos();
        for v in vertices {
            w.bytes(&v.color).u8(if v.skip { 0b10 } else { 0 });
        }
        w.patch_i64(channel_field + 16, colors as i64);
    } else {
        let indices = w.pos();
        for v in vertices {
            w.u8(0).bytes(&v.bones);
        }
        let weights = w.pos();
        for v in vertices {
            w.u16(v.weights | if v.skip { 0x8000 } else { 0 });
        }
        w.patch_i64(channel_field, indices as i64);
        w.patch_i64(channel_field + 8, weights as i64);
    }

    let skeleton = w.pos();
    w.patch_i64(skeleton_field, skeleton as i64);
    append_skeleton(&mut w, bones);
    w.buf
}

/// Appends a skeleton block at the writer's current position.
pub(crate) fn append_skeleton(w: &mut ByteWriter, bones: &[(i8, i8, i8, [f32; 3])]) {
    let base = w.pos();
    let count = bones.len();
    w.i32(0).i32(0).i32(0).i32(0);
    let tables = [
        bones.iter().map(|b| b.0).collect::<Vec<_>>(),
        bones.iter().map(|b| b.1).collect(),
        bones.iter().map(|b| b.2).collect(),
    ];
    for (i, table) in tables.iter().enumerate() {
        let offset = w.pos() - base;
        w.patch_i32(base + i * 4, offset as i32);
        for &value in table {
            w.i8(value);
        }
    }
    let transforms = w.pos() - base;
    w.patch_i32(base + 12, transforms as i32);
    for bone in bones {
        w.f32(bone.3[0]).f32(bone.3[1]).f32(bone.3[2]).zeros(0x14);
    }
    debug_assert_eq!(w.pos(), base + 16 + count * 3 + count * 32);
}

/// Fixture track for motion builders.
pub(crate) struct FixtureTrack {
    pub compression: u16,
    pub min: f32,
    pub range: f32,
    pub tangents: [f32; 4],
    /// `(time, value, in, out)` raw values; tangents ignored for linear.
    pub keys: Vec<(u16, u16, u16, u16)>,
    /// Extra payload for unsupported tracks, counted in the size field.
    pub payload: Vec<u8>,
}

impl FixtureTrack {
    pub fn linear(min: f32, range: f32, keys: &[(u16, u16)]) -> Self {
        Self {
            compression: 2,
            min,
            range,
            tangents: [0.0; 4],
            keys: keys.iter().map(|&(t, v)| (t, v, 0, 0)).collect(),
            payload: Vec::new(),
        }
    }

    pub fn hermite(min: f32, range: f32, tangents: [f32; 4], keys: &[(u16, u16, u16, u16)]) -> Self {
        Self {
            compression: 3,
            min,
            range,
            tangents,
            keys: keys.to_vec(),
            payload: Vec::new(),
        }
    }

    pub fn unsupported(code: u16, payload: usize) -> Self {
        Self {
            compression: code,
            min: 0.0,
            range: 0.0,
            tangents: [0.0; 4],
            keys: Vec::new(),
            payload: vec![0xAB; payload],
        }
    }

    fn write(&self, w: &mut ByteWriter) {
        let hermite = self.compression == 3;
        let start = w.pos();
        w.u16(0).u16(self.keys.len() as u16).u16(self.compression).u16(0);
        w.f32(self.min).f32(self.range);
        if hermite {
            for t in self.tangents {
                w.f32(t);
            }
        }
        if self.compression == 2 || hermite {
            for &(time, value, tin, tout) in &self.keys {
                w.u16(time).u16(value);
                if hermite {
                    w.u16(tin).u16(tout);
                }
            }
        }
        w.bytes(&self.payload);
        let size = (w.pos() - start) as u16;
        w.buf[start..start + 2].copy_from_slice(&size.to_le_bytes());
    }
}

/// Builds a motion file. `bones` holds the flag mask and tracks per bone.
pub(crate) fn build_motion(bones: &[(u16, Vec<FixtureTrack>)], padding: usize) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.u32(0).i32(7);
    w.f32(0.0).f32(10.0).f32(0.0).f32(10.0);
    w.u16(0).u16(0).u16(bones.len() as u16);
    for (flags, _) in bones {
        w.u16(*flags);
    }
    for _ in 0..padding {
        w.u16(0xCDCD);
    }
    let size = w.pos() as u32;
    w.patch_u32(0, size);

    let track_count: usize = bones.iter().map(|(_, t)| t.len()).sum();
    w.u32(track_count as u32);
    for (_, tracks) in bones {
        for track in tracks {
            track.write(&mut w);
        }
    }
    w.buf
}
