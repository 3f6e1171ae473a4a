//! Curve sampling
//!
//! Values are evaluated in `f64` and narrowed once at the end. Frame times
//! are keyframe time indices; tangents are per frame.

use crate::error::{Error, Result};

use super::types::{Compression, Keyframe, Track};

/// Unit conversion the host applies to translation samples. Never applied
/// here.
pub const POSITION_SCALE: f32 = 0.01;

/// `a * (1 - factor) + b * factor`, exact at both ends.
#[must_use]
pub fn lerp(a: f64, b: f64, factor: f64) -> f64 {
    a * (1.0 - factor) + b * factor
}

/// Two-point cubic Hermite between `p0` and `p1` at `frame`, using the out
/// tangent of `p0` and the in tangent of `p1`. Missing tangents count as 0.
///
/// The caller guarantees `p1.time != p0.time`.
#[must_use]
pub fn hermite(frame: f64, p0: &Keyframe, p1: &Keyframe) -> f64 {
    let out0 = p0.tangents.map_or(0.0, |t| f64::from(t.out_tangent));
    let in1 = p1.tangents.map_or(0.0, |t| f64::from(t.in_tangent));
    let (v0, v1) = (f64::from(p0.value), f64::from(p1.value));

    let t = frame - f64::from(p0.time);
    let step = 1.0 / (f64::from(p1.time) - f64::from(p0.time));
    let a = t * t * (step * step);
    let b = t * t * step;
    let c = a * t;

    (t + c - b - b) * out0
        + (step * c + step * c - a * 3.0 + 1.0) * v0
        + (a * 3.0 - (step * c + step * c)) * v1
        + (c - b) * in1
}

/// Evaluate the segment closing at keyframe `segment` (so between keys
/// `segment - 1` and `segment`) at `frame`.
///
/// # Errors
/// Returns [`Error::SegmentOutOfRange`] if `segment` is 0 or past the last
/// key and [`Error::DegenerateInterpolationSpan`] if both keys share a time.
pub fn sample_segment(track: &Track, segment: usize, frame: f64) -> Result<f32> {
    if segment == 0 || segment >= track.keys.len() {
        return Err(Error::SegmentOutOfRange {
            segment,
            key_count: track.keys.len(),
        });
    }
    let (p0, p1) = (&track.keys[segment - 1], &track.keys[segment]);
    if p0.time == p1.time {
        return Err(Error::DegenerateInterpolationSpan { time: p0.time });
    }
    Ok(evaluate(track.compression, frame, p0, p1) as f32)
}

fn evaluate(compression: Compression, frame: f64, p0: &Keyframe, p1: &Keyframe) -> f64 {
    if compression.is_hermite() {
        hermite(frame, p0, p1)
    } else {
        let span = f64::from(p1.time) - f64::from(p0.time);
        let factor = (frame - f64::from(p0.time)) / span;
        lerp(f64::from(p0.value), f64::from(p1.value), factor)
    }
}

/// Sample a track at `frame`.
///
/// Frames before the first key hold its value, frames after the last key
/// hold the last value and a frame on a key returns that key's value. A
/// segment without a positive span holds its opening value.
///
/// # Errors
/// Returns [`Error::NoKeyframes`] for an empty track.
pub fn sample(track: &Track, frame: f64) -> Result<f32> {
    let keys = &track.keys;
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return Err(Error::NoKeyframes);
    };
    if frame <= f64::from(first.time) {
        return Ok(first.value);
    }
    if frame >= f64::from(last.time) {
        return Ok(last.value);
    }

    let next = keys.partition_point(|k| f64::from(k.time) < frame);
    let (p0, p1) = (&keys[next - 1], &keys[next]);
    if f64::from(p1.time) <= frame {
        return Ok(p1.value);
    }
    if p1.time <= p0.time {
        return Ok(p0.value);
    }
    Ok(evaluate(track.compression, frame, p0, p1) as f32)
}

impl Track {
    /// Sample this track at `frame`. See [`sample`].
    pub fn sample(&self, frame: f64) -> Result<f32> {
        sample(self, frame)
    }

    /// Sample every whole frame from the first to the last key.
    ///
    /// # Errors
    /// Returns [`Error::NoKeyframes`] for an empty track.
    pub fn bake(&self) -> Result<Vec<(u16, f32)>> {
        let (Some(start), Some(end)) = (self.first_time(), self.last_time()) else {
            return Err(Error::NoKeyframes);
        };
        (start..=end.max(start))
            .map(|frame| Ok((frame, sample(self, f64::from(frame))?)))
            .collect()
    }
}
