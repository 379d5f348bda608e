pub mod binding;
pub mod clip;
pub mod system;
pub mod tracks;

pub use binding::{PropertyBinding, TargetPath};
pub use clip::Animation;
pub use system::AnimationSystem;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack, SampleValue};
