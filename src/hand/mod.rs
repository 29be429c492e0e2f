pub mod landmark;
pub mod normalize;
pub mod sampler;

pub use landmark::{HandSample, Landmark};
pub use normalize::LandmarkNormalizer;
pub use sampler::HandSampler;
