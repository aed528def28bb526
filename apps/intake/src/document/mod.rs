// Applicant document assembly
// Raw submission → normalized groups → document model → HTML markup → PDF.

pub mod handlers;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod stringify;
pub mod template;

pub use normalizer::RawRecord;
pub use pipeline::{PipelineError, RenderPipeline};
