pub mod analysis;
pub mod parser;
pub mod presenter;
pub mod prompt;
pub mod upload;

pub use analysis::AnalysisPipeline;
pub use upload::Upload;
