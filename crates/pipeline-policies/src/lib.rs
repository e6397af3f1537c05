//! pipeline-policies: política de promoción champion/challenger.
//!
//! Provee el contrato `PromotionPolicy` y la implementación `LowerIsBetter`
//! (scores de error: menor es mejor) con una decisión auditable.

use pipeline_core::hashing::hash_value;
use pipeline_domain::{BaselineSource, EvaluationResult};
use serde::{Deserialize, Serialize};

/// Scores a comparar.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreComparison {
    pub challenger_score: f64,
    pub baseline_score: f64,
    pub baseline_source: BaselineSource,
}

/// Parámetros de promoción soportados.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "policy", content = "params")]
pub enum PromotionParams {
    LowerIsBetter(LowerIsBetterParams),
}

impl Default for PromotionParams {
    fn default() -> Self {
        PromotionParams::LowerIsBetter(LowerIsBetterParams::default())
    }
}

/// `min_improvement` es el margen que el challenger debe superar. Con 0.0 la
/// regla es `challenger < baseline` estricto.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LowerIsBetterParams {
    pub min_improvement: f64,
}

impl LowerIsBetterParams {
    /// Margen efectivo. Un margen negativo (o NaN) se lleva a 0.0: nunca se
    /// promueve con scores iguales.
    pub fn margin(&self) -> f64 {
        self.min_improvement.max(0.0)
    }
}

/// Decisión de promoción.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PromotionDecision {
    pub promote: bool,
    /// id estático de la política que tomó la decisión.
    pub policy_id: String,
    /// Hash canónico de parámetros de la política.
    pub params_hash: String,
    pub rationale: Rationale,
}

impl PromotionDecision {
    pub fn to_evaluation_result(&self) -> EvaluationResult {
        EvaluationResult { challenger_score: self.rationale.challenger_score,
                           baseline_score: self.rationale.baseline_score,
                           promote: self.promote,
                           baseline_source: self.rationale.baseline_source }
    }
}

/// Explicación tipada de la decisión.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rationale {
    pub policy_id: String,
    pub params: PromotionParams,
    pub challenger_score: f64,
    pub baseline_score: f64,
    pub baseline_source: BaselineSource,
    /// `baseline - challenger`; positivo si el challenger mejora.
    pub improvement: f64,
    pub summary: String,
}

/// Contrato de políticas de promoción deterministas.
pub trait PromotionPolicy: Send + Sync {
    fn id(&self) -> &'static str;
    fn decide(&self, scores: &ScoreComparison, params: &PromotionParams) -> PromotionDecision;
}

/// Política: promover si el error del challenger es menor que el baseline.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowerIsBetterPolicy;

impl LowerIsBetterPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl PromotionPolicy for LowerIsBetterPolicy {
    fn id(&self) -> &'static str {
        "lower_is_better"
    }

    fn decide(&self, scores: &ScoreComparison, params: &PromotionParams) -> PromotionDecision {
        let PromotionParams::LowerIsBetter(p) = params;
        let finite = scores.challenger_score.is_finite() && scores.baseline_score.is_finite();
        let improvement = scores.baseline_score - scores.challenger_score;
        let promote = finite && scores.challenger_score < scores.baseline_score - p.margin();

        let summary = if promote {
            format!("challenger {:.6} beats baseline {:.6}", scores.challenger_score, scores.baseline_score)
        } else if !finite {
            "non-finite score, keeping champion".to_string()
        } else {
            format!("challenger {:.6} does not beat baseline {:.6}",
                    scores.challenger_score, scores.baseline_score)
        };

        PromotionDecision { promote,
                            policy_id: self.id().into(),
                            params_hash: params_hash(params),
                            rationale: Rationale { policy_id: self.id().into(),
                                                   params: params.clone(),
                                                   challenger_score: scores.challenger_score,
                                                   baseline_score: scores.baseline_score,
                                                   baseline_source: scores.baseline_source,
                                                   improvement,
                                                   summary } }
    }
}

/// Hash canónico de parámetros.
pub fn params_hash(params: &PromotionParams) -> String {
    hash_value(&serde_json::to_value(params).unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(challenger: f64, baseline: f64) -> ScoreComparison {
        ScoreComparison { challenger_score: challenger,
                          baseline_score: baseline,
                          baseline_source: BaselineSource::TrainingSet }
    }

    #[test]
    fn promotes_only_on_strict_improvement() {
        let p = LowerIsBetterPolicy::new();
        let params = PromotionParams::default();
        assert!(p.decide(&scores(1.0, 2.0), &params).promote);
        assert!(!p.decide(&scores(2.0, 2.0), &params).promote);
        assert!(!p.decide(&scores(3.0, 2.0), &params).promote);
    }

    #[test]
    fn margin_and_non_finite_scores() {
        let p = LowerIsBetterPolicy::new();
        let strict = PromotionParams::LowerIsBetter(LowerIsBetterParams { min_improvement: 0.5 });
        assert!(!p.decide(&scores(1.8, 2.0), &strict).promote);
        assert!(p.decide(&scores(1.4, 2.0), &strict).promote);
        assert!(!p.decide(&scores(f64::NAN, 2.0), &PromotionParams::default()).promote);
    }

    #[test]
    fn negative_margin_keeps_the_strict_rule() {
        let p = LowerIsBetterPolicy::new();
        for min_improvement in [-0.5, f64::NAN] {
            let params = PromotionParams::LowerIsBetter(LowerIsBetterParams { min_improvement });
            assert!(!p.decide(&scores(2.0, 2.0), &params).promote);
            assert!(!p.decide(&scores(2.3, 2.0), &params).promote);
            assert!(p.decide(&scores(1.9, 2.0), &params).promote);
        }
    }

    #[test]
    fn decision_is_auditable() {
        let p = LowerIsBetterPolicy::new();
        let d = p.decide(&scores(1.0, 2.0), &PromotionParams::default());
        assert_eq!(d.policy_id, "lower_is_better");
        assert_eq!(d.params_hash, params_hash(&PromotionParams::default()));
        assert_eq!(d.rationale.improvement, 1.0);
        let eval = d.to_evaluation_result();
        assert!(eval.promote);
        assert_eq!(eval.baseline_source, BaselineSource::TrainingSet);
        assert_ne!(params_hash(&PromotionParams::LowerIsBetter(LowerIsBetterParams { min_improvement: 0.1 })),
                   d.params_hash);
    }
}
