//! Motion file reader
//!
//! Layout: a header block of `size` bytes (fixed fields, one track mask per
//! bone, padding words), a `u32` track count, then one group of tracks per
//! bone with a non-zero mask.

use std::path::Path;

use crate::error::{Error, Result};
use crate::formats::common::BinaryReader;
use crate::options::{DecodeOptions, UnsupportedTracks};

use super::types::{
    Compression, HermiteTangents, Keyframe, Motion, MotionHeader, Quantization, SkippedTrack,
    TangentQuantization, Track, TrackChannel, TrackGroup,
};

/// Size of the fixed track header fields.
const TRACK_HEADER_SIZE: u64 = 16;

/// Fixed fields shared by every track record.
#[derive(Debug, Clone, Copy)]
struct TrackHeader {
    offset: u64,
    size: u16,
    key_count: u16,
    code: u16,
    start_time: u16,
    value: Quantization,
}

enum TrackRead {
    Decoded(Track),
    Skipped(TrackHeader),
}

/// Reader over a complete motion file held in memory.
#[derive(Debug, Clone)]
pub struct MotionReader<'a> {
    data: &'a [u8],
    options: DecodeOptions,
}

impl<'a> MotionReader<'a> {
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

    /// Decode the whole motion.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedInput`] for a short file and
    /// [`Error::UnsupportedCompression`] for an unreadable track under the
    /// abort policy, or when a skipped track cannot be stepped over.
    pub fn read(&self) -> Result<Motion> {
        let mut reader = BinaryReader::new(self.data);
        let header = read_header(&mut reader)?;
        let track_flags = (0..header.bone_count)
            .map(|_| reader.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let tables_end = reader.position();
        let size = u64::from(header.size);
        if size < tables_end {
            return Err(Error::InvalidHeaderSize {
                size: header.size,
                required: tables_end,
            });
        }
        let mut padding = Vec::new();
        while reader.position() < size {
            padding.push(reader.read_u16()?);
        }
        reader.seek(size);
        let track_count = reader.read_u32()?;

        let mut groups = Vec::new();
        let mut skipped = Vec::new();
        for (bone, &flags) in track_flags.iter().enumerate() {
            if flags == 0 {
                continue;
            }
            let mut tracks = Vec::new();
            for channel in TrackChannel::from_mask(flags) {
                match self.read_track(&mut reader, channel)? {
                    TrackRead::Decoded(track) => tracks.push(track),
                    TrackRead::Skipped(header) => {
                        tracing::warn!(
                            bone,
                            channel = channel.short_name(),
                            code = header.code,
                            offset = header.offset,
                            "skipping track with unsupported compression"
                        );
                        skipped.push(SkippedTrack {
                            bone,
                            channel,
                            code: header.code,
                            offset: header.offset,
                        });
                    }
                }
            }
            groups.push(TrackGroup {
                bone,
                flags,
                tracks,
            });
        }

        let motion = Motion {
            header,
            track_flags,
            padding,
            track_count,
            groups,
            skipped,
        };
        let decoded = motion.decoded_track_count() + motion.skipped.len();
        if decoded != track_count as usize {
            tracing::debug!(declared = track_count, decoded, "track count mismatch");
        }
        tracing::debug!(
            bones = motion.header.bone_count,
            groups = motion.groups.len(),
            skipped = motion.skipped.len(),
            "decoded motion"
        );
        Ok(motion)
    }

    /// Decode one track. An unsupported track under the skip policy is
    /// stepped over using its declared size.
    fn read_track(&self, reader: &mut BinaryReader<'_>, channel: TrackChannel) -> Result<TrackRead> {
        let header = read_track_header(reader)?;
        let compression = Compression::from_code(header.code).filter(|c| c.is_supported());

        let Some(compression) = compression else {
            let unsupported = Error::UnsupportedCompression {
                code: header.code,
                offset: header.offset,
            };
            if self.options.unsupported_tracks == UnsupportedTracks::Abort
                || u64::from(header.size) < TRACK_HEADER_SIZE
            {
                return Err(unsupported);
            }
            reader.seek(header.offset + u64::from(header.size));
            return Ok(TrackRead::Skipped(header));
        };

        read_keys(reader, channel, compression, &header).map(TrackRead::Decoded)
    }
}

fn read_header(reader: &mut BinaryReader<'_>) -> Result<MotionHeader> {
    Ok(MotionHeader {
        size: reader.read_u32()?,
        id: reader.read_i32()?,
        start_frame: reader.read_f32()?,
        end_frame: reader.read_f32()?,
        start_frame_alt: reader.read_f32()?,
        end_frame_alt: reader.read_f32()?,
        unknown: [reader.read_u16()?, reader.read_u16()?],
        bone_count: reader.read_u16()?,
    })
}

fn read_track_header(reader: &mut BinaryReader<'_>) -> Result<TrackHeader> {
    let offset = reader.position();
    let size = reader.read_u16()?;
    let key_count = reader.read_u16()?;
    let code = reader.read_u16()?;
    let start_time = reader.read_u16()?;
    let min = reader.read_f32()?;
    let range = reader.read_f32()?;
    Ok(TrackHeader {
        offset,
        size,
        key_count,
        code,
        start_time,
        value: Quantization { min, range },
    })
}

fn read_quantization(reader: &mut BinaryReader<'_>) -> Result<Quantization> {
    Ok(Quantization {
        min: reader.read_f32()?,
        range: reader.read_f32()?,
    })
}

/// Read the keyframes of a supported track. Hermite tracks carry their
/// tangent domains before the keys and two tangent words per key.
fn read_keys(
    reader: &mut BinaryReader<'_>,
    channel: TrackChannel,
    compression: Compression,
    header: &TrackHeader,
) -> Result<Track> {
    let tangents = if compression.is_hermite() {
        Some(TangentQuantization {
            in_tangent: read_quantization(reader)?,
            out_tangent: read_quantization(reader)?,
        })
    } else {
        None
    };

    let keys = (0..header.key_count)
        .map(|_| {
            let packed = reader.read_u16()?;
            let value = header.value.dequantize(reader.read_u16()?);
            let tangents = tangents
                .map(|domain| -> Result<HermiteTangents> {
                    Ok(HermiteTangents {
                        in_tangent: domain.in_tangent.dequantize(reader.read_u16()?),
                        out_tangent: domain.out_tangent.dequantize(reader.read_u16()?),
                    })
                })
                .transpose()?;
            Ok(Keyframe {
                time: packed & 0x7fff,
                flag: packed >> 15 != 0,
                value,
                tangents,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Track {
        channel,
        size: header.size,
        compression,
        start_time: header.start_time,
        value: header.value,
        tangents,
        keys,
    })
}

/// Decode a motion from bytes with default options.
pub fn read_motion(data: &[u8]) -> Result<Motion> {
    MotionReader::new(data).read()
}

/// Decode a motion from bytes.
pub fn read_motion_with_options(data: &[u8], options: &DecodeOptions) -> Result<Motion> {
    MotionReader::new(data).with_options(options.clone()).read()
}

/// Read and decode a motion file.
pub fn read_motion_file<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Motion> {
    let data = std::fs::read(path.as_ref())?;
    read_motion_with_options(&data, options)
}
