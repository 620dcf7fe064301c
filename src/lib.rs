//! Cat vs. dog image classification served over HTTP.
//!
//! A [`ModelHost`] loads the classifier once at startup; the [`server`]
//! module exposes it through an axum [`Router`](axum::Router). Each upload
//! is decoded, stretched to 224x224, scaled to `[0, 1]` and scored, and the
//! score is mapped to a [`Label`] with the confidence of that label.

pub mod classification;
pub mod error;
pub mod messages;
pub mod model;
pub mod preprocess;
pub mod server;

pub use classification::{Classification, Label};
pub use error::{ModelError, PredictError, PreprocessError};
pub use model::{Classifier, ModelHost, ModelState, OnnxClassifier};
pub use preprocess::{ImageTensor, preprocess};
pub use server::{ApiError, AppState, router};
