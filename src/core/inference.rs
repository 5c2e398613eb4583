//! ONNX Runtime inference engine with a round-robin session pool.
//!
//! One [`OrtModel`] wraps one artifact on disk. Sessions are pooled behind
//! mutexes so independent detection calls can run concurrently against the
//! same read-only weights; calls pick a session round-robin and block only
//! on that session.

use crate::core::errors::{DetectError, DetectResult};
use crate::core::tensor::{Tensor2D, Tensor4D};
use crate::core::traits::{EmbeddingModel, ProbabilityModel, SeverityModel};
use ndarray::ArrayView2;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// An ONNX model loaded into a pool of runtime sessions.
pub struct OrtModel {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
    artifact: String,
}

impl std::fmt::Debug for OrtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtModel")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("artifact", &self.artifact)
            .finish()
    }
}

impl OrtModel {
    /// Loads an ONNX model from `model_path` into a pool of `pool_size`
    /// sessions (minimum 1).
    ///
    /// Input and output tensor names are discovered from the session
    /// metadata. Any failure here is a [`DetectError::ModelUnavailable`]
    /// carrying the artifact name, so a missing or corrupt artifact fails
    /// construction of the whole detector.
    pub fn load(
        artifact: &str,
        model_path: impl AsRef<Path>,
        pool_size: usize,
    ) -> DetectResult<Self> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder()
                .and_then(|b| Ok(b.with_log_level(LogLevel::Error)?))
                .and_then(|mut b| b.commit_from_file(path))
                .map_err(|e| {
                    DetectError::model_unavailable(
                        artifact,
                        format!("failed to create ONNX session for '{}'", path.display()),
                        Some(e),
                    )
                })?;
            sessions.push(Mutex::new(session));
        }

        let (input_name, output_name) = {
            let session = sessions[0].lock().map_err(|_| {
                DetectError::model_unavailable(
                    artifact,
                    "failed to acquire session lock during load",
                    None::<std::io::Error>,
                )
            })?;
            let input = session.inputs().first().ok_or_else(|| {
                DetectError::model_unavailable(
                    artifact,
                    "model declares no inputs",
                    None::<std::io::Error>,
                )
            })?;
            let output = session.outputs().first().ok_or_else(|| {
                DetectError::model_unavailable(
                    artifact,
                    "model declares no outputs",
                    None::<std::io::Error>,
                )
            })?;
            (input.name().to_string(), output.name().to_string())
        };

        info!(
            artifact = artifact,
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            pool_size,
            "loaded ONNX model"
        );

        Ok(Self {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
            artifact: artifact.to_string(),
        })
    }

    /// Returns the model path associated with this engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the artifact name associated with this engine.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    fn run_with_view<T, D: ndarray::Dimension>(
        &self,
        view: ndarray::ArrayView<'_, f32, D>,
        processor: impl FnOnce(&[i64], &[f32]) -> DetectResult<T>,
    ) -> DetectResult<T> {
        let input_tensor = TensorRef::from_array_view(view.into_dyn())?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session = self.sessions[idx].lock().map_err(|_| {
            DetectError::invalid_input(format!(
                "failed to acquire session lock {}/{} for '{}'",
                idx,
                self.sessions.len(),
                self.artifact
            ))
        })?;

        let outputs = session.run(inputs)?;
        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()?;

        processor(output_shape, output_data)
    }

    /// Runs the model on a normalized image tensor and returns the
    /// `(batch, features)` output.
    pub fn infer_2d_from_image(&self, x: &Tensor4D) -> DetectResult<Tensor2D> {
        let batch_size = x.shape()[0];
        self.run_with_view(x.view(), |output_shape, output_data| {
            extract_2d(&self.artifact, batch_size, output_shape, output_data)
        })
    }

    /// Runs the model on a feature matrix and returns the
    /// `(batch, classes)` output.
    pub fn infer_2d_from_features(&self, x: &Tensor2D) -> DetectResult<Tensor2D> {
        let batch_size = x.shape()[0];
        self.run_with_view(x.view(), |output_shape, output_data| {
            extract_2d(&self.artifact, batch_size, output_shape, output_data)
        })
    }

    /// Runs the model on a feature matrix and returns a single scalar, for
    /// regression heads emitting shape `(1,)` or `(1, 1)`.
    pub fn infer_scalar(&self, x: &Tensor2D) -> DetectResult<f32> {
        self.run_with_view(x.view(), |output_shape, output_data| {
            if output_data.len() != 1 {
                return Err(DetectError::invalid_input(format!(
                    "model '{}': expected scalar output, got shape {:?}",
                    self.artifact, output_shape
                )));
            }
            Ok(output_data[0])
        })
    }
}

fn extract_2d(
    artifact: &str,
    batch_size: usize,
    output_shape: &[i64],
    output_data: &[f32],
) -> DetectResult<Tensor2D> {
    if output_shape.len() != 2 {
        return Err(DetectError::invalid_input(format!(
            "model '{}': expected 2D output tensor, got {}D with shape {:?}",
            artifact,
            output_shape.len(),
            output_shape
        )));
    }

    let width = output_shape[1] as usize;
    let expected_len = batch_size * width;
    if output_data.len() != expected_len {
        return Err(DetectError::invalid_input(format!(
            "model '{}': output data size mismatch, expected {} got {}",
            artifact,
            expected_len,
            output_data.len()
        )));
    }

    let view = ArrayView2::from_shape((batch_size, width), output_data)
        .map_err(DetectError::Tensor)?;
    Ok(view.to_owned())
}

impl EmbeddingModel for OrtModel {
    fn embed(&self, input: &Tensor4D) -> DetectResult<Tensor2D> {
        self.infer_2d_from_image(input)
    }
}

impl ProbabilityModel for OrtModel {
    fn predict_proba(&self, features: &Tensor2D) -> DetectResult<Tensor2D> {
        self.infer_2d_from_features(features)
    }
}

impl SeverityModel for OrtModel {
    fn predict_percent(&self, features: &Tensor2D) -> DetectResult<f32> {
        self.infer_scalar(features)
    }
}
