//! Decoded motion structures.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which transform a track animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TransformKind {
    Translation,
    Rotation,
    Scale,
}

/// One animated scalar channel of a bone.
///
/// Declaration order matches the on-disk track order, which is also the
/// flag mask order from bit 8 down to bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TrackChannel {
    TranslationX,
    TranslationY,
    TranslationZ,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl TrackChannel {
    /// All channels in file order.
    pub const ALL: [Self; 9] = [
        Self::TranslationX,
        Self::TranslationY,
        Self::TranslationZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
    ];

    /// Flag mask bit for this channel.
    #[must_use]
    pub fn bit(self) -> u16 {
        1 << (8 - self as u16)
    }

    #[must_use]
    pub fn kind(self) -> TransformKind {
        match self {
            Self::TranslationX | Self::TranslationY | Self::TranslationZ => TransformKind::Translation,
            Self::RotationX | Self::RotationY | Self::RotationZ => TransformKind::Rotation,
            Self::ScaleX | Self::ScaleY | Self::ScaleZ => TransformKind::Scale,
        }
    }

    /// Axis index: 0 for X, 1 for Y, 2 for Z.
    #[must_use]
    pub fn axis(self) -> usize {
        self as usize % 3
    }

    /// Channels set in `mask`, in file order.
    pub fn from_mask(mask: u16) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |c| mask & c.bit() != 0)
    }

    /// Two-letter name: `tx`, `ty`, … `sz`.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::TranslationX => "tx",
            Self::TranslationY => "ty",
            Self::TranslationZ => "tz",
            Self::RotationX => "rx",
            Self::RotationY => "ry",
            Self::RotationZ => "rz",
            Self::ScaleX => "sx",
            Self::ScaleY => "sy",
            Self::ScaleZ => "sz",
        }
    }
}

impl fmt::Display for TrackChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for TrackChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.short_name() == lower)
            .ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "invalid channel '{s}'. Valid values: tx, ty, tz, rx, ry, rz, sx, sy, sz"
                ))
            })
    }
}

/// Keyframe encoding of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Compression {
    LinearFloat32 = 0,
    HermiteFloat32 = 1,
    LinearInt16 = 2,
    HermiteInt16 = 3,
}

impl Compression {
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::LinearFloat32),
            1 => Some(Self::HermiteFloat32),
            2 => Some(Self::LinearInt16),
            3 => Some(Self::HermiteInt16),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn is_hermite(self) -> bool {
        matches!(self, Self::HermiteFloat32 | Self::HermiteInt16)
    }

    /// Whether the decoder can read keyframes of this kind.
    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, Self::LinearInt16 | Self::HermiteInt16)
    }
}

/// `min` and `range` of a 16-bit quantized value domain.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct Quantization {
    pub min: f32,
    pub range: f32,
}

impl Quantization {
    /// `raw * range / 65535 + min`.
    #[must_use]
    pub fn dequantize(self, raw: u16) -> f32 {
        (f64::from(raw) * f64::from(self.range) * (1.0 / 65535.0) + f64::from(self.min)) as f32
    }
}

/// Tangent domains of a Hermite track.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct TangentQuantization {
    pub in_tangent: Quantization,
    pub out_tangent: Quantization,
}

/// Dequantized tangents of a Hermite keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HermiteTangents {
    pub in_tangent: f32,
    pub out_tangent: f32,
}

/// A single keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Frame index (low 15 bits of the packed word)
    pub time: u16,
    /// Reserved bit 15 of the packed word
    pub flag: bool,
    pub value: f32,
    /// Present on Hermite tracks only
    pub tangents: Option<HermiteTangents>,
}

/// One decoded animation channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub channel: TrackChannel,
    /// Declared byte size of the track record
    pub size: u16,
    pub compression: Compression,
    pub start_time: u16,
    pub value: Quantization,
    pub tangents: Option<TangentQuantization>,
    pub keys: Vec<Keyframe>,
}

impl Track {
    #[must_use]
    pub fn first_time(&self) -> Option<u16> {
        self.keys.first().map(|k| k.time)
    }

    #[must_use]
    pub fn last_time(&self) -> Option<u16> {
        self.keys.last().map(|k| k.time)
    }
}

/// All tracks of one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackGroup {
    pub bone: usize,
    pub flags: u16,
    pub tracks: Vec<Track>,
}

impl TrackGroup {
    #[must_use]
    pub fn track(&self, channel: TrackChannel) -> Option<&Track> {
        self.tracks.iter().find(|t| t.channel == channel)
    }
}

/// A track left out of the decode because of its compression code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedTrack {
    pub bone: usize,
    pub channel: TrackChannel,
    pub code: u16,
    /// Stream position of the track header
    pub offset: u64,
}

impl SkippedTrack {
    /// The error this track would have raised under the abort policy.
    #[must_use]
    pub fn error(&self) -> Error {
        Error::UnsupportedCompression {
            code: self.code,
            offset: self.offset,
        }
    }
}

/// Motion file header.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionHeader {
    /// Byte size of the header block; the track count follows it.
    pub size: u32,
    pub id: i32,
    pub start_frame: f32,
    pub end_frame: f32,
    pub start_frame_alt: f32,
    pub end_frame_alt: f32,
    pub unknown: [u16; 2],
    pub bone_count: u16,
}

/// A decoded motion file.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    pub header: MotionHeader,
    /// Track mask per bone
    pub track_flags: Vec<u16>,
    /// Values between the masks and the declared size
    pub padding: Vec<u16>,
    /// Track count stored after the header block
    pub track_count: u32,
    pub groups: Vec<TrackGroup>,
    /// Tracks dropped under the skip policy
    pub skipped: Vec<SkippedTrack>,
}

impl Motion {
    #[must_use]
    pub fn group(&self, bone: usize) -> Option<&TrackGroup> {
        self.groups.iter().find(|g| g.bone == bone)
    }

    /// Number of tracks actually decoded.
    #[must_use]
    pub fn decoded_track_count(&self) -> usize {
        self.groups.iter().map(|g| g.tracks.len()).sum()
    }

    /// Playback range from the header, truncated to whole frames.
    #[must_use]
    pub fn frame_range(&self) -> RangeInclusive<i32> {
        (self.header.start_frame as i32)..=(self.header.end_frame as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bits_msb_first() {
        let bits: Vec<u16> = TrackChannel::ALL.iter().map(|c| c.bit()).collect();
        assert_eq!(bits, vec![256, 128, 64, 32, 16, 8, 4, 2, 1]);
        assert_eq!(TrackChannel::RotationY.kind(), TransformKind::Rotation);
        assert_eq!(TrackChannel::RotationY.axis(), 1);
        assert_eq!(TrackChannel::ScaleZ.axis(), 2);
    }

    #[test]
    fn test_channels_from_mask() {
        let channels: Vec<_> = TrackChannel::from_mask(0x100 | 0x20 | 0x1 | 0x8000).collect();
        assert_eq!(
            channels,
            vec![TrackChannel::TranslationX, TrackChannel::RotationX, TrackChannel::ScaleZ]
        );
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("TX".parse::<TrackChannel>().unwrap(), TrackChannel::TranslationX);
        assert_eq!("rz".parse::<TrackChannel>().unwrap(), TrackChannel::RotationZ);
        assert!("tw".parse::<TrackChannel>().is_err());
        assert_eq!(TrackChannel::ScaleY.to_string(), "sy");
    }

    #[test]
    fn test_compression_codes() {
        assert_eq!(Compression::from_code(2), Some(Compression::LinearInt16));
        assert_eq!(Compression::from_code(99), None);
        assert!(Compression::HermiteInt16.is_supported());
        assert!(!Compression::HermiteFloat32.is_supported());
        assert!(Compression::HermiteFloat32.is_hermite());
    }

    #[test]
    fn test_dequantize_grid() {
        let q = Quantization {
            min: -3.5,
            range: 12.25,
        };
        for k in (0..=65535u16).step_by(257) {
            let expected = (f64::from(q.min) + f64::from(k) * (f64::from(q.range) / 65535.0)) as f32;
            let decoded = q.dequantize(k);
            assert!(
                (decoded - expected).abs() <= f32::EPSILON * expected.abs().max(1.0),
                "k={k}: {decoded} != {expected}"
            );
        }
        assert_eq!(q.dequantize(0), -3.5);
    }
}
