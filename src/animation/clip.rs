use glam::{Quat, Vec3};

use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::accessor::AccessorTable;
use crate::assets::document::AnimationDesc;
use crate::errors::{AssetError, Result};
use crate::scene::{NodeIndex, Pose};

/// A set of keyframe tracks and the node properties they drive.
///
/// Several channels may share a track; they then share its cursor too.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: Option<String>,
    tracks: Vec<KeyframeTrack>,
    channels: Vec<PropertyBinding>,
}

impl Animation {
    /// Creates an animation, checking each channel's track index and arity.
    pub fn new(name: Option<String>, tracks: Vec<KeyframeTrack>, channels: Vec<PropertyBinding>) -> Result<Self> {
        for (index, channel) in channels.iter().enumerate() {
            let track = tracks.get(channel.track_index).ok_or_else(|| {
                AssetError::malformed(format!(
                    "channel {index} uses sampler {} out of range ({} samplers)",
                    channel.track_index,
                    tracks.len()
                ))
            })?;
            if let Some(arity) = channel.target.arity()
                && track.arity != arity
            {
                return Err(AssetError::malformed(format!(
                    "channel {index} drives {:?} with {} floats per keyframe, expected {arity}",
                    channel.target, track.arity
                )));
            }
        }

        Ok(Self {
            name,
            tracks,
            channels,
        })
    }

    /// Decodes an animation's samplers and channels.
    ///
    /// Channels targeting morph weights or no node are skipped with a
    /// warning.
    pub fn from_desc(desc: &AnimationDesc, accessors: &AccessorTable, node_count: usize) -> Result<Self> {
        let tracks = desc
            .samplers
            .iter()
            .map(|sampler| {
                let interpolation: InterpolationMode = sampler.interpolation.parse()?;
                let input = accessors.get(sampler.input)?;
                let output = accessors.get(sampler.output)?;
                KeyframeTrack::new(
                    input.read_f32(),
                    output.read_f32(),
                    output.components_per_element,
                    interpolation,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut channels = Vec::with_capacity(desc.channels.len());
        for (index, channel) in desc.channels.iter().enumerate() {
            let target: TargetPath = channel.target.path.parse()?;
            if target == TargetPath::Weights {
                log::warn!("Animation {:?}: channel {index} drives morph weights, skipping", desc.name);
                continue;
            }
            let Some(node) = channel.target.node else {
                log::warn!("Animation {:?}: channel {index} has no target node, skipping", desc.name);
                continue;
            };
            if node >= node_count {
                return Err(AssetError::malformed(format!(
                    "channel {index} targets node {node} out of range ({node_count} nodes)"
                )));
            }
            channels.push(PropertyBinding {
                track_index: channel.sampler,
                node: NodeIndex(node),
                target,
            });
        }

        Self::new(desc.name.clone(), tracks, channels)
    }

    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[KeyframeTrack] {
        &self.tracks
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[PropertyBinding] {
        &self.channels
    }

    /// Largest keyframe time across all tracks.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.tracks.iter().map(KeyframeTrack::duration).fold(0.0_f32, f32::max)
    }

    /// Samples every channel at `time` and writes the results into `pose`,
    /// overwriting the previous values.
    ///
    /// Writes to a matrix-driven node are dropped. A track that cannot be
    /// sampled leaves its property untouched; the remaining channels are still
    /// applied and the first such error is returned afterwards.
    pub fn apply(&mut self, time: f32, pose: &mut Pose) -> Result<()> {
        let mut first_error = None;
        for channel in &self.channels {
            let value = match self.tracks[channel.track_index].sample(time) {
                Ok(value) => value,
                Err(err) => {
                    log::debug!("Skipping {:?} channel of {}: {err}", channel.target, channel.node);
                    first_error.get_or_insert(err);
                    continue;
                }
            };
            let written = match channel.target {
                TargetPath::Translation => pose.set_translation(channel.node, Vec3::new(value[0], value[1], value[2])),
                TargetPath::Rotation => {
                    pose.set_rotation(channel.node, Quat::from_xyzw(value[0], value[1], value[2], value[3]))
                }
                TargetPath::Scale => pose.set_scale(channel.node, Vec3::new(value[0], value[1], value[2])),
                TargetPath::Weights => continue,
            };
            if !written {
                log::debug!(
                    "Ignoring {:?} write to {}: node is matrix-driven or missing",
                    channel.target,
                    channel.node
                );
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
