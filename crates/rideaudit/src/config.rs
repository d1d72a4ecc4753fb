//! Configuration for the audit pipeline.
//!
//! Every knob the pipeline sweeps over (detection methods, thresholds,
//! significance level, domain-relationship checks, score weights) lives
//! here as inspectable data rather than inline literals, so the nine-variant
//! cleaning sweep and the check tables can be audited and tested in
//! isolation.

use serde::{Deserialize, Serialize};

/// Outlier detection method applied to numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierMethod {
    /// Flag values outside `[Q1 - t*IQR, Q3 + t*IQR]`.
    Iqr,
    /// Flag values with `|x - mean| / std > t`.
    ZScore,
    /// Flag values with `|0.6745 * (x - median) / MAD| > t`.
    ModifiedZScore,
}

impl OutlierMethod {
    /// Short machine-friendly name used in variant identifiers.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
            Self::ZScore => "zscore",
            Self::ModifiedZScore => "modified_zscore",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Iqr => "IQR",
            Self::ZScore => "Z-Score",
            Self::ModifiedZScore => "Modified Z-Score",
        }
    }
}

impl std::fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Expected direction of a domain relationship between two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedSign {
    /// A clear positive correlation is expected.
    Positive,
    /// A weak positive correlation is plausible; a strong one is not required.
    WeakPositive,
}

/// One expected-sign relationship between two numeric columns.
///
/// Columns are matched by case-insensitive substring so the same table works
/// across dataset variants that spell headers differently
/// (e.g. "Ride Distance" vs "distance_km").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCheck {
    /// Substring identifying the left-hand column.
    pub left_pattern: String,
    /// Substring identifying the right-hand column.
    pub right_pattern: String,
    /// Expected sign/strength of the correlation.
    pub expectation: ExpectedSign,
    /// Short human-readable rationale.
    pub rationale: String,
}

impl DomainCheck {
    fn new(left: &str, right: &str, expectation: ExpectedSign, rationale: &str) -> Self {
        Self {
            left_pattern: left.to_string(),
            right_pattern: right.to_string(),
            expectation,
            rationale: rationale.to_string(),
        }
    }
}

/// The ride-booking relationship table checked against observed correlations.
pub fn default_domain_checks() -> Vec<DomainCheck> {
    vec![
        DomainCheck::new(
            "distance",
            "duration",
            ExpectedSign::Positive,
            "Longer rides take longer",
        ),
        DomainCheck::new(
            "distance",
            "fare",
            ExpectedSign::Positive,
            "Longer rides cost more",
        ),
        DomainCheck::new(
            "duration",
            "fare",
            ExpectedSign::Positive,
            "Slower rides cost more",
        ),
        DomainCheck::new(
            "distance",
            "tip",
            ExpectedSign::WeakPositive,
            "Tips may grow with ride length",
        ),
        DomainCheck::new(
            "fare",
            "tip",
            ExpectedSign::Positive,
            "Tips usually track the fare",
        ),
        DomainCheck::new(
            "rating",
            "tip",
            ExpectedSign::Positive,
            "Better-rated rides attract tips",
        ),
    ]
}

/// Value-plausibility rules applied per numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyRules {
    /// Columns (by substring) that must never be negative.
    pub non_negative_patterns: Vec<String>,
    /// Columns (by substring) where a large share of zeros is suspect.
    pub zero_suspect_patterns: Vec<String>,
    /// Zero share above which a zero-suspect column is flagged (fraction).
    pub zero_share_threshold: f64,
    /// Values above `multiplier * p99.9` are flagged as extreme.
    pub extreme_multiplier: f64,
}

impl Default for ConsistencyRules {
    fn default() -> Self {
        Self {
            non_negative_patterns: vec![
                "fare".to_string(),
                "value".to_string(),
                "distance".to_string(),
                "duration".to_string(),
                "tip".to_string(),
            ],
            zero_suspect_patterns: vec!["fare".to_string(), "distance".to_string()],
            zero_share_threshold: 0.05,
            extreme_multiplier: 10.0,
        }
    }
}

/// Canonical per-method thresholds used when *assessing* outlier rates for
/// the reliability score. These are intentionally separate from the cleaning
/// sweep thresholds: the assessment must be identical no matter which
/// cleaning variant is under evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionThresholds {
    pub iqr: f64,
    pub z_score: f64,
    pub modified_z: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            iqr: 1.5,
            z_score: 3.0,
            modified_z: 3.5,
        }
    }
}

/// Fixed weights combining the four sub-scores into the 0-100 reliability
/// score. Each sub-score contributes up to 25 points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Points available for the share of normally-distributed columns.
    pub normality_points: f64,
    /// Points available for the share of columns with acceptable outlier rates.
    pub outlier_points: f64,
    /// Points for correlation health, minus a penalty per |r| > 0.8 pair.
    pub correlation_points: f64,
    /// Penalty per very-high correlation pair.
    pub high_correlation_penalty: f64,
    /// Points for consistency, minus a penalty per detected issue.
    pub consistency_points: f64,
    /// Penalty per consistency issue.
    pub consistency_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            normality_points: 25.0,
            outlier_points: 25.0,
            correlation_points: 25.0,
            high_correlation_penalty: 5.0,
            consistency_points: 25.0,
            consistency_penalty: 3.0,
        }
    }
}

impl ScoreWeights {
    /// Maximum achievable total.
    pub fn max_total(&self) -> f64 {
        self.normality_points + self.outlier_points + self.correlation_points
            + self.consistency_points
    }
}

/// Configuration for a full audit run.
///
/// Use [`AuditConfig::builder()`] to override individual fields; the
/// defaults describe the standard nine-variant sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Significance level for the normality battery. A test votes "normal"
    /// when its p-value exceeds this. Default: 0.05.
    pub alpha: f64,

    /// Detection methods included in the cleaning sweep, in rank order.
    pub methods: Vec<OutlierMethod>,

    /// Thresholds each method is swept over, ascending.
    pub thresholds: Vec<f64>,

    /// Largest sample the Shapiro-Wilk statistic is applied to. Columns
    /// longer than this are deterministically subsampled. Default: 5000.
    pub shapiro_max_sample: usize,

    /// Seed for the Shapiro-Wilk subsample, fixed for reproducibility.
    pub shapiro_seed: u64,

    /// Minimum non-missing observations for a column to be assessed at all.
    pub min_observations: usize,

    /// Canonical thresholds used for outlier-rate assessment.
    pub detection_thresholds: DetectionThresholds,

    /// A column's outlier level is acceptable when the mean flagged
    /// percentage across the three methods is below this. Default: 5.0.
    pub acceptable_outlier_pct: f64,

    /// Expected-sign relationship table.
    pub domain_checks: Vec<DomainCheck>,

    /// Value-plausibility rules.
    pub consistency: ConsistencyRules,

    /// Reliability score weights.
    pub weights: ScoreWeights,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            methods: vec![
                OutlierMethod::Iqr,
                OutlierMethod::ZScore,
                OutlierMethod::ModifiedZScore,
            ],
            thresholds: vec![1.5, 2.0, 2.5],
            shapiro_max_sample: 5000,
            shapiro_seed: 42,
            min_observations: 3,
            detection_thresholds: DetectionThresholds::default(),
            acceptable_outlier_pct: 5.0,
            domain_checks: default_domain_checks(),
            consistency: ConsistencyRules::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl AuditConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Validate the configuration and return an error if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..1.0).contains(&self.alpha) || self.alpha == 0.0 {
            return Err(ConfigValidationError::InvalidAlpha(self.alpha));
        }
        if self.methods.is_empty() {
            return Err(ConfigValidationError::NoMethods);
        }
        if self.thresholds.is_empty() || self.thresholds.iter().any(|t| *t <= 0.0) {
            return Err(ConfigValidationError::InvalidThresholds(
                self.thresholds.clone(),
            ));
        }
        if self.shapiro_max_sample < 3 {
            return Err(ConfigValidationError::InvalidShapiroCeiling(
                self.shapiro_max_sample,
            ));
        }
        if self.min_observations < 3 {
            return Err(ConfigValidationError::InvalidMinObservations(
                self.min_observations,
            ));
        }
        Ok(())
    }

    /// All (method, threshold) cleaning variants in rank order.
    pub fn variants(&self) -> Vec<(OutlierMethod, f64)> {
        self.methods
            .iter()
            .flat_map(|m| self.thresholds.iter().map(move |t| (*m, *t)))
            .collect()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid significance level: {0} (must be in (0, 1))")]
    InvalidAlpha(f64),

    #[error("At least one outlier method is required")]
    NoMethods,

    #[error("Thresholds must be non-empty and positive, got {0:?}")]
    InvalidThresholds(Vec<f64>),

    #[error("Shapiro-Wilk ceiling must be at least 3, got {0}")]
    InvalidShapiroCeiling(usize),

    #[error("Minimum observations must be at least 3, got {0}")]
    InvalidMinObservations(usize),
}

/// Builder for [`AuditConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    alpha: Option<f64>,
    methods: Option<Vec<OutlierMethod>>,
    thresholds: Option<Vec<f64>>,
    shapiro_max_sample: Option<usize>,
    shapiro_seed: Option<u64>,
    min_observations: Option<usize>,
    detection_thresholds: Option<DetectionThresholds>,
    acceptable_outlier_pct: Option<f64>,
    domain_checks: Option<Vec<DomainCheck>>,
    consistency: Option<ConsistencyRules>,
    weights: Option<ScoreWeights>,
}

impl AuditConfigBuilder {
    /// Set the significance level for the normality battery.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Set the cleaning-sweep methods, in rank order.
    pub fn methods(mut self, methods: Vec<OutlierMethod>) -> Self {
        self.methods = Some(methods);
        self
    }

    /// Set the cleaning-sweep thresholds.
    pub fn thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Set the Shapiro-Wilk sample-size ceiling.
    pub fn shapiro_max_sample(mut self, ceiling: usize) -> Self {
        self.shapiro_max_sample = Some(ceiling);
        self
    }

    /// Set the seed for the Shapiro-Wilk subsample.
    pub fn shapiro_seed(mut self, seed: u64) -> Self {
        self.shapiro_seed = Some(seed);
        self
    }

    /// Set the minimum non-missing observations per assessed column.
    pub fn min_observations(mut self, min: usize) -> Self {
        self.min_observations = Some(min);
        self
    }

    /// Set the canonical detection thresholds used by the scorer.
    pub fn detection_thresholds(mut self, thresholds: DetectionThresholds) -> Self {
        self.detection_thresholds = Some(thresholds);
        self
    }

    /// Set the acceptable average outlier percentage per column.
    pub fn acceptable_outlier_pct(mut self, pct: f64) -> Self {
        self.acceptable_outlier_pct = Some(pct);
        self
    }

    /// Replace the domain-relationship check table.
    pub fn domain_checks(mut self, checks: Vec<DomainCheck>) -> Self {
        self.domain_checks = Some(checks);
        self
    }

    /// Replace the consistency rules.
    pub fn consistency(mut self, rules: ConsistencyRules) -> Self {
        self.consistency = Some(rules);
        self
    }

    /// Replace the score weights.
    pub fn weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AuditConfig` or an error if validation fails.
    pub fn build(self) -> Result<AuditConfig, ConfigValidationError> {
        let defaults = AuditConfig::default();
        let config = AuditConfig {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            methods: self.methods.unwrap_or(defaults.methods),
            thresholds: self.thresholds.unwrap_or(defaults.thresholds),
            shapiro_max_sample: self.shapiro_max_sample.unwrap_or(defaults.shapiro_max_sample),
            shapiro_seed: self.shapiro_seed.unwrap_or(defaults.shapiro_seed),
            min_observations: self.min_observations.unwrap_or(defaults.min_observations),
            detection_thresholds: self
                .detection_thresholds
                .unwrap_or(defaults.detection_thresholds),
            acceptable_outlier_pct: self
                .acceptable_outlier_pct
                .unwrap_or(defaults.acceptable_outlier_pct),
            domain_checks: self.domain_checks.unwrap_or(defaults.domain_checks),
            consistency: self.consistency.unwrap_or(defaults.consistency),
            weights: self.weights.unwrap_or(defaults.weights),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.methods.len(), 3);
        assert_eq!(config.thresholds, vec![1.5, 2.0, 2.5]);
        assert_eq!(config.shapiro_max_sample, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_variant_order_is_method_major() {
        let config = AuditConfig::default();
        let variants = config.variants();
        assert_eq!(variants.len(), 9);
        assert_eq!(variants[0], (OutlierMethod::Iqr, 1.5));
        assert_eq!(variants[2], (OutlierMethod::Iqr, 2.5));
        assert_eq!(variants[3], (OutlierMethod::ZScore, 1.5));
        assert_eq!(variants[8], (OutlierMethod::ModifiedZScore, 2.5));
    }

    #[test]
    fn test_validation_rejects_bad_alpha() {
        let result = AuditConfig::builder().alpha(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidAlpha(_)
        ));
    }

    #[test]
    fn test_validation_rejects_empty_thresholds() {
        let result = AuditConfig::builder().thresholds(vec![]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThresholds(_)
        ));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AuditConfig::builder()
            .alpha(0.01)
            .thresholds(vec![2.0])
            .shapiro_seed(7)
            .build()
            .unwrap();

        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.thresholds, vec![2.0]);
        assert_eq!(config.shapiro_seed, 7);
        // Untouched fields keep their defaults
        assert_eq!(config.methods.len(), 3);
    }

    #[test]
    fn test_default_domain_checks_cover_ride_relationships() {
        let checks = default_domain_checks();
        assert_eq!(checks.len(), 6);
        assert!(
            checks
                .iter()
                .any(|c| c.left_pattern == "distance" && c.right_pattern == "fare")
        );
        assert!(
            checks
                .iter()
                .any(|c| c.left_pattern == "rating" && c.right_pattern == "tip")
        );
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AuditConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AuditConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.alpha, deserialized.alpha);
        assert_eq!(config.thresholds, deserialized.thresholds);
        assert_eq!(config.methods, deserialized.methods);
    }
}
