//! External model providers for cartograph: narrative synthesis and text
//! embeddings.
//!
//! Each provider is a closed enum of a live HTTP-backed variant and an
//! offline variant. The variant is picked once, at construction, from
//! configuration; nothing switches variants at runtime.

mod embedding;
mod prompt;
mod synthesizer;
mod template;

pub mod error;

pub use embedding::{EmbeddingConfig, EmbeddingGateway, Embeddings};
pub use error::{EmbeddingError, SynthesisError};
pub use prompt::build_prompt;
pub use synthesizer::{LiveSynthesizer, Synthesizer, SynthesizerConfig};
pub use template::{clean_source_label, render_template};
