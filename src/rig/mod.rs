pub mod joint;
pub mod mapping;

pub use joint::{BoneId, JointPose, JointSource, RigSnapshot};
pub use mapping::{BoneMap, LandmarkIndex, SkeletonKind};
