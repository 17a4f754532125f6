pub mod ai_service; // Classifier and text generator traits
pub mod classifier; // Hugging Face image classification
pub mod gemini; // Google Gemini text generation

pub use ai_service::{ImageClassifier, TextGenerator};
pub use classifier::{ClassifierHandle, ModelLoader};
pub use gemini::GeminiService;
