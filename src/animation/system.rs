use crate::animation::clip::Animation;
use crate::errors::Result;
use crate::scene::Pose;

/// Animation system.
///
/// Samples every animation into the pose. Run it before the transform
/// system of the same frame, never concurrently with it.
pub struct AnimationSystem;

impl AnimationSystem {
    /// Applies all `animations` at `time`, in order; later animations win
    /// where they drive the same property.
    ///
    /// Every animation is applied even if an earlier one fails; the first
    /// error is returned once the pass is complete.
    pub fn update<'a>(
        animations: impl IntoIterator<Item = &'a mut Animation>,
        time: f32,
        pose: &mut Pose,
    ) -> Result<()> {
        let mut first_error = None;
        for animation in animations {
            if let Err(err) = animation.apply(time, pose) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
