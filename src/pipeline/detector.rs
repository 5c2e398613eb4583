//! The disease detection pipeline.
//!
//! One [`DiseaseDetector`] holds the full artifact set loaded at startup
//! and exposes the single synchronous operation the system is built
//! around: image in, [`Diagnosis`] or error out. The same pipeline serves
//! one-shot uploads and per-frame callers; frame streams feed the
//! probability vectors from [`DiseaseDetector::analyze`] through a
//! [`crate::pipeline::ProbabilitySmoother`] and finish with
//! [`DiseaseDetector::diagnose`].

use crate::core::config::DetectorConfig;
use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::errors::{DetectError, DetectResult};
use crate::core::inference::OrtModel;
use crate::core::tensor::Tensor2D;
use crate::core::traits::{EmbeddingModel, ProbabilityModel, SeverityModel};
use crate::domain::classes::ClassIndexMap;
use crate::domain::diagnosis::{display_name, round1, round2, Diagnosis, SeverityLevel};
use crate::domain::knowledge::KnowledgeBase;
use crate::processors::normalization::NormalizeImage;
use crate::processors::resize::resize_to_input;
use crate::processors::scaler::FeatureScaler;
use crate::utils::image::{decode_image, load_image};
use image::RgbImage;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, error, info};

/// The per-frame intermediate of the pipeline: the unscaled feature matrix
/// and the classifier's probability vector.
///
/// Single-image callers never see this; frame-stream callers use it to
/// smooth probabilities across frames before diagnosing.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// Unscaled `(1, embed_dim)` features, as consumed by the severity
    /// regressor.
    pub features: Tensor2D,
    /// Probability per class id, in class id order.
    pub probabilities: Vec<f32>,
}

/// The plant disease detector.
///
/// Immutable after construction; safe to share across threads. All model
/// state is read-only, so concurrent `detect` calls need no locking beyond
/// the ONNX session pool.
pub struct DiseaseDetector {
    input_shape: (u32, u32),
    confidence_threshold: f32,
    normalize: NormalizeImage,
    scaler: FeatureScaler,
    extractor: Box<dyn EmbeddingModel>,
    classifier: Box<dyn ProbabilityModel>,
    severity: Option<Box<dyn SeverityModel>>,
    classes: ClassIndexMap,
    knowledge: KnowledgeBase,
}

impl std::fmt::Debug for DiseaseDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiseaseDetector")
            .field("input_shape", &self.input_shape)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("num_classes", &self.classes.len())
            .field("has_severity_model", &self.severity.is_some())
            .finish()
    }
}

impl DiseaseDetector {
    /// Loads the full artifact set described by `config` and builds the
    /// detector.
    ///
    /// The severity regressor is optional: if its file is absent the
    /// detector falls back to confidence-based severity. Every other
    /// artifact is required; a missing or corrupt one fails construction
    /// with [`DetectError::ModelUnavailable`].
    pub fn from_config(config: &DetectorConfig) -> DetectResult<Self> {
        config.validate()?;
        info!(model_dir = %config.model_dir.display(), "loading plant disease artifacts");

        let extractor = OrtModel::load(
            "feature extractor",
            config.feature_extractor_path(),
            config.session_pool_size,
        )?;
        let classifier = OrtModel::load(
            "classifier",
            config.classifier_path(),
            config.session_pool_size,
        )?;

        let severity_path = config.severity_regressor_path();
        let severity: Option<Box<dyn SeverityModel>> = if severity_path.exists() {
            Some(Box::new(OrtModel::load(
                "severity regressor",
                &severity_path,
                config.session_pool_size,
            )?))
        } else {
            info!(
                path = %severity_path.display(),
                "severity regressor not present, falling back to confidence-based severity"
            );
            None
        };

        let scaler = FeatureScaler::load(config.feature_scaler_path())?;
        let classes = ClassIndexMap::load(config.class_indices_path())?;
        let knowledge = KnowledgeBase::load(config.knowledge_path())?;

        Self::from_parts(
            Box::new(extractor),
            Box::new(classifier),
            severity,
            scaler,
            classes,
            knowledge,
            config.input_shape,
            config.confidence_threshold,
        )
    }

    /// Builds a detector from already-constructed parts.
    ///
    /// This is the seam tests use to substitute mock models for the ONNX
    /// engine. Performs the same load-time consistency validation as
    /// [`DiseaseDetector::from_config`]: every classifier-reachable class
    /// must have a knowledge entry.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        extractor: Box<dyn EmbeddingModel>,
        classifier: Box<dyn ProbabilityModel>,
        severity: Option<Box<dyn SeverityModel>>,
        scaler: FeatureScaler,
        classes: ClassIndexMap,
        knowledge: KnowledgeBase,
        input_shape: (u32, u32),
        confidence_threshold: f32,
    ) -> DetectResult<Self> {
        knowledge.validate_against(&classes)?;

        info!(
            num_classes = classes.len(),
            feature_dim = scaler.dim(),
            confidence_threshold,
            "disease detector ready"
        );

        Ok(Self {
            input_shape,
            confidence_threshold,
            normalize: NormalizeImage::for_mobilenet()?,
            scaler,
            extractor,
            classifier,
            severity,
            classes,
            knowledge,
        })
    }

    /// Number of disease classes the classifier can produce.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// The configured confidence gate, as a probability in `(0, 1]`.
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Runs the full pipeline on a decoded image.
    pub fn detect(&self, image: &RgbImage) -> DetectResult<Diagnosis> {
        let analysis = self.analyze(image)?;
        self.diagnose(&analysis.features, &analysis.probabilities)
    }

    /// Decodes an in-memory encoded image (PNG, JPEG, ...) and runs the
    /// pipeline on it. Undecodable bytes fail with
    /// [`DetectError::InvalidImage`].
    pub fn detect_bytes(&self, bytes: &[u8]) -> DetectResult<Diagnosis> {
        let image = decode_image(bytes)?;
        self.detect(&image)
    }

    /// Loads an image from disk and runs the pipeline on it.
    pub fn detect_path(&self, path: impl AsRef<Path>) -> DetectResult<Diagnosis> {
        let image = load_image(path.as_ref())?;
        self.detect(&image)
    }

    /// Runs the pipeline over a batch of image paths, in parallel for
    /// larger batches. Results stay per-item; one bad image never fails
    /// the batch.
    pub fn detect_paths<P: AsRef<Path> + Send + Sync>(
        &self,
        paths: &[P],
    ) -> Vec<DetectResult<Diagnosis>> {
        if paths.len() > DEFAULT_PARALLEL_THRESHOLD {
            paths.par_iter().map(|p| self.detect_path(p)).collect()
        } else {
            paths.iter().map(|p| self.detect_path(p)).collect()
        }
    }

    /// Runs preprocessing, feature extraction, and classification on one
    /// image, returning the per-frame intermediate.
    pub fn analyze(&self, image: &RgbImage) -> DetectResult<FrameAnalysis> {
        let resized = resize_to_input(image, self.input_shape.0, self.input_shape.1, None);
        let tensor = self.normalize.normalize_to(&resized)?;

        let features = self.extractor.embed(&tensor)?;
        let scaled = self.scaler.transform(&features)?;
        let probs = self.classifier.predict_proba(&scaled)?;
        if probs.nrows() == 0 {
            return Err(DetectError::processing(
                crate::core::errors::ProcessingStage::PostProcessing,
                "classifier returned no rows",
                crate::core::errors::SimpleError::new("empty output tensor"),
            ));
        }

        let probabilities = probs.row(0).to_vec();
        Ok(FrameAnalysis {
            features,
            probabilities,
        })
    }

    /// Applies the confidence gate, severity estimation, and knowledge
    /// lookup to a classified frame and assembles the diagnosis.
    pub fn diagnose(
        &self,
        features: &Tensor2D,
        probabilities: &[f32],
    ) -> DetectResult<Diagnosis> {
        let (class_id, confidence) = argmax(probabilities)?;

        if confidence < self.confidence_threshold {
            debug!(confidence, "prediction below confidence gate");
            return Err(DetectError::LowConfidence { confidence });
        }

        let raw_name = self.classes.name(class_id).ok_or_else(|| {
            error!(
                class_id,
                num_classes = self.classes.len(),
                "classifier produced a class id with no name; artifacts out of sync"
            );
            DetectError::knowledge_not_found(format!("id {class_id}"))
        })?;

        let entry = self.knowledge.get(raw_name).ok_or_else(|| {
            error!(
                class = raw_name,
                "no knowledge entry for predicted class; artifacts out of sync"
            );
            DetectError::knowledge_not_found(raw_name)
        })?;

        // Severity runs on the unscaled features; absent a regressor the
        // classifier's confidence stands in for it.
        let raw_percent = match &self.severity {
            Some(model) => model.predict_percent(features)?.clamp(0.0, 100.0),
            None => confidence * 100.0,
        };

        let severity = round1(raw_percent);
        let diagnosis = Diagnosis {
            disease: display_name(raw_name),
            severity,
            severity_level: SeverityLevel::from_percent(severity),
            fertilizer: entry.fertilizer.clone(),
            remedy: entry.remedy.clone(),
            confidence: round2(confidence * 100.0),
        };

        debug!(
            disease = %diagnosis.disease,
            severity = diagnosis.severity,
            confidence = diagnosis.confidence,
            "diagnosis complete"
        );
        Ok(diagnosis)
    }
}

fn argmax(probabilities: &[f32]) -> DetectResult<(usize, f32)> {
    probabilities
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, &p)| (id, p))
        .ok_or_else(|| {
            DetectError::processing(
                crate::core::errors::ProcessingStage::PostProcessing,
                "classifier returned no probabilities",
                crate::core::errors::SimpleError::new("empty probability vector"),
            )
        })
}

/// Builder for [`DiseaseDetector`] over an on-disk artifact set.
#[derive(Debug, Default)]
pub struct DiseaseDetectorBuilder {
    config: Option<DetectorConfig>,
    input_shape: Option<(u32, u32)>,
    confidence_threshold: Option<f32>,
    session_pool_size: Option<usize>,
}

impl DiseaseDetectorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the artifact directory.
    pub fn model_dir(mut self, model_dir: impl Into<std::path::PathBuf>) -> Self {
        self.config = Some(DetectorConfig::new(model_dir));
        self
    }

    /// Overrides the model input shape (width, height).
    pub fn input_shape(mut self, input_shape: (u32, u32)) -> Self {
        self.input_shape = Some(input_shape);
        self
    }

    /// Overrides the confidence gate.
    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Overrides the ONNX session pool size.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Builds the detector, loading all artifacts.
    pub fn build(self) -> DetectResult<DiseaseDetector> {
        let mut config = self
            .config
            .ok_or_else(|| DetectError::config_error("model_dir is required"))?;
        if let Some(input_shape) = self.input_shape {
            config.input_shape = input_shape;
        }
        if let Some(threshold) = self.confidence_threshold {
            config.confidence_threshold = threshold;
        }
        if let Some(size) = self.session_pool_size {
            config.session_pool_size = size;
        }
        DiseaseDetector::from_config(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::KnowledgeEntry;
    use ndarray::Array2;
    use std::collections::HashMap;

    const FEATURE_DIM: usize = 4;

    struct FixedEmbedder(Vec<f32>);

    impl EmbeddingModel for FixedEmbedder {
        fn embed(&self, _input: &crate::core::tensor::Tensor4D) -> DetectResult<Tensor2D> {
            Ok(Array2::from_shape_vec((1, self.0.len()), self.0.clone()).unwrap())
        }
    }

    struct FixedClassifier(Vec<f32>);

    impl ProbabilityModel for FixedClassifier {
        fn predict_proba(&self, _features: &Tensor2D) -> DetectResult<Tensor2D> {
            Ok(Array2::from_shape_vec((1, self.0.len()), self.0.clone()).unwrap())
        }
    }

    struct FixedSeverity(f32);

    impl SeverityModel for FixedSeverity {
        fn predict_percent(&self, _features: &Tensor2D) -> DetectResult<f32> {
            Ok(self.0)
        }
    }

    fn classes(names: &[&str]) -> ClassIndexMap {
        let table: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.to_string(), id))
            .collect();
        ClassIndexMap::from_table(table).unwrap()
    }

    fn knowledge(names: &[&str]) -> KnowledgeBase {
        let entries: HashMap<String, KnowledgeEntry> = names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    KnowledgeEntry {
                        remedy: format!("remedy for {name}"),
                        fertilizer: format!("fertilizer for {name}"),
                    },
                )
            })
            .collect();
        KnowledgeBase::from_entries(entries)
    }

    fn identity_scaler() -> FeatureScaler {
        FeatureScaler::new(vec![0.0; FEATURE_DIM], vec![1.0; FEATURE_DIM]).unwrap()
    }

    fn detector(
        probabilities: Vec<f32>,
        severity: Option<f32>,
        names: &[&str],
    ) -> DiseaseDetector {
        DiseaseDetector::from_parts(
            Box::new(FixedEmbedder(vec![0.5; FEATURE_DIM])),
            Box::new(FixedClassifier(probabilities)),
            severity.map(|s| Box::new(FixedSeverity(s)) as Box<dyn SeverityModel>),
            identity_scaler(),
            classes(names),
            knowledge(names),
            (224, 224),
            0.5,
        )
        .unwrap()
    }

    fn leaf_image() -> RgbImage {
        RgbImage::from_pixel(64, 48, image::Rgb([40, 160, 60]))
    }

    #[test]
    fn healthy_leaf_scenario_without_severity_model() {
        let detector = detector(vec![0.92, 0.08], None, &["Healthy", "Blight"]);

        let diagnosis = detector.detect(&leaf_image()).unwrap();
        assert_eq!(diagnosis.disease, "Healthy");
        assert_eq!(diagnosis.severity, 92.0);
        assert_eq!(diagnosis.severity_level, SeverityLevel::High);
        assert_eq!(diagnosis.confidence, 92.0);
        assert_eq!(diagnosis.remedy, "remedy for Healthy");
        assert_eq!(diagnosis.fertilizer, "fertilizer for Healthy");
    }

    #[test]
    fn low_confidence_is_gated() {
        let detector = detector(vec![0.3, 0.25, 0.2], Some(95.0), &["A", "B", "C"]);

        let err = detector.detect(&leaf_image()).unwrap_err();
        assert!(matches!(
            err,
            DetectError::LowConfidence { confidence } if (confidence - 0.3).abs() < 1e-6
        ));
    }

    #[test]
    fn severity_model_overrides_confidence_fallback() {
        let detector = detector(vec![0.1, 0.9], Some(73.44), &["Healthy", "Blight"]);

        let diagnosis = detector.detect(&leaf_image()).unwrap();
        assert_eq!(diagnosis.severity, 73.4);
        assert_eq!(diagnosis.severity_level, SeverityLevel::Moderate);
        assert_eq!(diagnosis.confidence, 90.0);
    }

    #[test]
    fn out_of_range_severity_is_clamped() {
        let detector = detector(vec![0.1, 0.9], Some(123.0), &["Healthy", "Blight"]);
        let diagnosis = detector.detect(&leaf_image()).unwrap();
        assert_eq!(diagnosis.severity, 100.0);
        assert_eq!(diagnosis.severity_level, SeverityLevel::High);

        let detector = detector_with_severity(-5.0);
        let diagnosis = detector.detect(&leaf_image()).unwrap();
        assert_eq!(diagnosis.severity, 0.0);
        assert_eq!(diagnosis.severity_level, SeverityLevel::Low);
    }

    fn detector_with_severity(severity: f32) -> DiseaseDetector {
        detector(vec![0.1, 0.9], Some(severity), &["Healthy", "Blight"])
    }

    #[test]
    fn formats_disease_name_for_display() {
        let detector = detector(
            vec![0.05, 0.95],
            None,
            &["Healthy", "Tomato___Early_blight"],
        );

        let diagnosis = detector.detect(&leaf_image()).unwrap();
        assert_eq!(diagnosis.disease, "Tomato - Early_blight");
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = detector(vec![0.2, 0.8], None, &["Healthy", "Blight"]);
        let image = leaf_image();

        let a = detector.detect(&image).unwrap();
        let b = detector.detect(&image).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn class_id_beyond_index_map_is_knowledge_not_found() {
        // Classifier emits three classes but only two are mapped; the
        // tables passed startup validation, so the desync surfaces at
        // diagnosis time.
        let detector = DiseaseDetector::from_parts(
            Box::new(FixedEmbedder(vec![0.5; FEATURE_DIM])),
            Box::new(FixedClassifier(vec![0.1, 0.1, 0.8])),
            None,
            identity_scaler(),
            classes(&["Healthy", "Blight"]),
            knowledge(&["Healthy", "Blight"]),
            (224, 224),
            0.5,
        )
        .unwrap();

        let err = detector.detect(&leaf_image()).unwrap_err();
        assert!(matches!(err, DetectError::KnowledgeNotFound { .. }));
    }

    #[test]
    fn missing_knowledge_entry_fails_construction() {
        let result = DiseaseDetector::from_parts(
            Box::new(FixedEmbedder(vec![0.5; FEATURE_DIM])),
            Box::new(FixedClassifier(vec![0.1, 0.9])),
            None,
            identity_scaler(),
            classes(&["Healthy", "Blight"]),
            knowledge(&["Healthy"]),
            (224, 224),
            0.5,
        );

        assert!(matches!(
            result.unwrap_err(),
            DetectError::KnowledgeNotFound { ref class } if class == "Blight"
        ));
    }

    #[test]
    fn undecodable_bytes_are_invalid_image() {
        let detector = detector(vec![0.9, 0.1], None, &["Healthy", "Blight"]);

        let err = detector.detect_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DetectError::InvalidImage(_)));
    }

    #[test]
    fn frame_callers_can_smooth_and_diagnose() {
        use crate::pipeline::smoothing::ProbabilitySmoother;

        let detector = detector(vec![0.4, 0.6], None, &["Healthy", "Blight"]);
        let mut smoother = ProbabilitySmoother::new(2);

        let first = detector.analyze(&leaf_image()).unwrap();
        assert!(smoother.push(first.probabilities.clone()).is_none());

        let second = detector.analyze(&leaf_image()).unwrap();
        let averaged = smoother.push(second.probabilities.clone()).unwrap();

        let diagnosis = detector.diagnose(&second.features, &averaged).unwrap();
        assert_eq!(diagnosis.disease, "Blight");
        assert_eq!(diagnosis.confidence, 60.0);
    }
}
