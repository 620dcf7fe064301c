use std::path::PathBuf;

/// Failures of the model artifact or of a single inference call.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced no output")]
    EmptyOutput,

    #[error("model score {0} is outside [0, 1]")]
    ScoreOutOfRange(f32),
}

/// Failures while turning uploaded bytes into a model input.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("tensor has {actual} values, expected {expected}")]
    TensorSize { expected: usize, actual: usize },
}

/// Any failure of the decode, resize, normalize, score pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
