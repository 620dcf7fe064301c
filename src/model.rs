use crate::error::{ModelError, PredictError};
use crate::preprocess::{ImageTensor, TENSOR_SHAPE};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// A binary classifier mapping a preprocessed image to the probability of "Dog".
///
/// Implementations must be usable from several requests at once, so scoring
/// takes `&self`.
pub trait Classifier: Send + Sync {
    /// Scores a `(1, 224, 224, 3)` tensor and returns a value in `[0, 1]`.
    fn score(&self, tensor: &ImageTensor) -> Result<f32, ModelError>;
}

/// Classifier backed by an ONNX export of the network, executed with tract.
pub struct OnnxClassifier {
    path: PathBuf,
    plan: OnnxPlan,
}

impl OnnxClassifier {
    /// Loads and optimizes the network found at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref().to_path_buf();
        let load_error = |e: TractError| ModelError::Load {
            path: path.clone(),
            reason: format!("{e:#}"),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(&path)
            .map_err(load_error)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 224, 224, 3)),
            )
            .map_err(load_error)?
            .into_optimized()
            .map_err(load_error)?
            .into_runnable()
            .map_err(load_error)?;

        Ok(Self { path, plan })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Classifier for OnnxClassifier {
    fn score(&self, tensor: &ImageTensor) -> Result<f32, ModelError> {
        let input = Tensor::from_shape(&TENSOR_SHAPE, tensor.as_slice())
            .map_err(|e| ModelError::Inference(format!("{e:#}")))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ModelError::Inference(format!("{e:#}")))?;

        let output = outputs.first().ok_or(ModelError::EmptyOutput)?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(format!("{e:#}")))?;

        view.iter().next().copied().ok_or(ModelError::EmptyOutput)
    }
}

/// Readiness of the [`ModelHost`], decided once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelState {
    /// A classifier is loaded and predictions can be served.
    Ready,
    /// Loading failed or was never attempted; every prediction fails.
    Unavailable,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelState::Ready => "ready",
            ModelState::Unavailable => "unavailable",
        }
    }
}

/// Owner of the single classifier instance.
///
/// The handle is set at construction and never replaced, so clones can be
/// shared freely between request handlers without locking.
#[derive(Clone)]
pub struct ModelHost {
    classifier: Option<Arc<dyn Classifier>>,
}

impl ModelHost {
    /// Loads the ONNX model at `path`.
    ///
    /// A load failure is logged and produces an unavailable host instead of an
    /// error, so the HTTP surface can still come up without a model.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OnnxClassifier::load(path) {
            Ok(classifier) => {
                log::info!("Model loaded successfully from {}", classifier.path().display());
                Self::with_classifier(classifier)
            }
            Err(e) => {
                log::error!("Error loading model: {e}");
                log::warn!("Model file not available. Prediction will fail.");
                Self::unavailable()
            }
        }
    }

    pub fn with_classifier(classifier: impl Classifier + 'static) -> Self {
        Self {
            classifier: Some(Arc::new(classifier)),
        }
    }

    pub fn unavailable() -> Self {
        Self { classifier: None }
    }

    pub fn state(&self) -> ModelState {
        match self.classifier {
            Some(_) => ModelState::Ready,
            None => ModelState::Unavailable,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ModelState::Ready
    }

    /// Returns P(dog) for the given tensor.
    pub fn predict(&self, tensor: &ImageTensor) -> Result<f32, PredictError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(PredictError::ModelUnavailable)?;

        let score = classifier.score(tensor)?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(ModelError::ScoreOutOfRange(score).into());
        }
        Ok(score)
    }
}

impl std::fmt::Debug for ModelHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHost")
            .field("state", &self.state())
            .finish()
    }
}
