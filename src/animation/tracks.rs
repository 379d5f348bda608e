use std::str::FromStr;

use smallvec::SmallVec;

use crate::errors::{AssetError, Result};

/// Sampled value of one keyframe track: `arity` floats.
pub type SampleValue = SmallVec<[f32; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

impl InterpolationMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            InterpolationMode::Linear => "LINEAR",
            InterpolationMode::Step => "STEP",
            InterpolationMode::CubicSpline => "CUBICSPLINE",
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = AssetError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "LINEAR" => Ok(InterpolationMode::Linear),
            "STEP" => Ok(InterpolationMode::Step),
            "CUBICSPLINE" => Ok(InterpolationMode::CubicSpline),
            other => Err(AssetError::malformed(format!("unknown interpolation {other:?}"))),
        }
    }
}

/// Index of the keyframe that opens the most recently found bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframe times plus a flat value array of `arity` floats per keyframe.
///
/// The track keeps its own cursor: queries in roughly increasing time order
/// find their bracket in O(1) amortized, arbitrary jumps cost up to one
/// pass over the keyframes. A track is single-writer.
#[derive(Debug, Clone)]
pub struct KeyframeTrack {
    pub times: Vec<f32>,
    /// For `CubicSpline` each keyframe holds in-tangent, value, out-tangent.
    pub values: Vec<f32>,
    pub arity: usize,
    pub interpolation: InterpolationMode,
    cursor: KeyframeCursor,
}

impl KeyframeTrack {
    /// Creates a track, checking that `values` covers every keyframe.
    pub fn new(times: Vec<f32>, values: Vec<f32>, arity: usize, interpolation: InterpolationMode) -> Result<Self> {
        if times.is_empty() {
            return Err(AssetError::malformed("keyframe track has no keyframes"));
        }
        if arity == 0 {
            return Err(AssetError::malformed("keyframe track has zero arity"));
        }
        let per_key = match interpolation {
            InterpolationMode::CubicSpline => arity * 3,
            _ => arity,
        };
        if values.len() < times.len() * per_key {
            return Err(AssetError::malformed(format!(
                "{} keyframes of {per_key} floats need {} values, got {}",
                times.len(),
                times.len() * per_key,
                values.len()
            )));
        }

        Ok(Self {
            times,
            values,
            arity,
            interpolation,
            cursor: KeyframeCursor::default(),
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> KeyframeCursor {
        self.cursor
    }

    /// Samples the track at `time`, moving the track's own cursor.
    pub fn sample(&mut self, time: f32) -> Result<SampleValue> {
        let mut cursor = self.cursor;
        let value = self.sample_with_cursor(time, &mut cursor);
        self.cursor = cursor;
        value
    }

    /// Samples with an external cursor.
    ///
    /// Times at or before the first keyframe give the first value, at or
    /// after the last keyframe the last value. In between, the cursor walks
    /// forward (wrapping) while the next keyframe is earlier than `time`, or
    /// backward (wrapping) while the current one is later, at most one full
    /// lap either way.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Result<SampleValue> {
        match self.interpolation {
            InterpolationMode::Linear => {}
            InterpolationMode::Step => return Err(AssetError::NotImplemented("STEP interpolation")),
            InterpolationMode::CubicSpline => {
                return Err(AssetError::NotImplemented("CUBICSPLINE interpolation"));
            }
        }

        let count = self.times.len();
        if count == 0 {
            return Err(AssetError::malformed("keyframe track has no keyframes"));
        }
        if count == 1 || time <= self.times[0] {
            cursor.last_index = 0;
            return Ok(self.value_at(0));
        }
        if time >= self.times[count - 1] {
            cursor.last_index = count - 1;
            return Ok(self.value_at(count - 1));
        }

        let mut last = cursor.last_index.min(count - 1);
        let mut next = (last + 1) % count;
        let mut checks = 0;
        if self.times[next] < time {
            while self.times[next] < time && checks < count {
                checks += 1;
                last = next;
                next = (next + 1) % count;
            }
        } else if self.times[last] > time {
            while self.times[last] > time && checks < count {
                checks += 1;
                next = last;
                last = (last + count - 1) % count;
            }
        }
        cursor.last_index = last;

        if time == self.times[next] {
            return Ok(self.value_at(next));
        }

        let t0 = self.times[last];
        let span = self.times[next] - t0;
        let weight = if span == 0.0 { 0.0 } else { (time - t0) / span };

        let from = &self.values[last * self.arity..(last + 1) * self.arity];
        let to = &self.values[next * self.arity..(next + 1) * self.arity];
        Ok(from
            .iter()
            .zip(to)
            .map(|(&a, &b)| a + (b - a) * weight)
            .collect())
    }

    fn value_at(&self, index: usize) -> SampleValue {
        let start = match self.interpolation {
            InterpolationMode::CubicSpline => (index * 3 + 1) * self.arity,
            _ => index * self.arity,
        };
        SampleValue::from_slice(&self.values[start..start + self.arity])
    }
}
