use crate::error::{CxrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a detected entity
///
/// Only `MedicalCondition` drives labels. Categories the service may add
/// later are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityCategory {
    MedicalCondition,
    Medication,
    Anatomy,
    TestTreatmentProcedure,
    ProtectedHealthInformation,
    TimeExpression,
    BehavioralEnvironmentalSocial,
    Other(String),
}

impl EntityCategory {
    pub fn as_str(&self) -> &str {
        match self {
            EntityCategory::MedicalCondition => "MEDICAL_CONDITION",
            EntityCategory::Medication => "MEDICATION",
            EntityCategory::Anatomy => "ANATOMY",
            EntityCategory::TestTreatmentProcedure => "TEST_TREATMENT_PROCEDURE",
            EntityCategory::ProtectedHealthInformation => "PROTECTED_HEALTH_INFORMATION",
            EntityCategory::TimeExpression => "TIME_EXPRESSION",
            EntityCategory::BehavioralEnvironmentalSocial => "BEHAVIORAL_ENVIRONMENTAL_SOCIAL",
            EntityCategory::Other(s) => s,
        }
    }
}

impl From<String> for EntityCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "MEDICAL_CONDITION" => EntityCategory::MedicalCondition,
            "MEDICATION" => EntityCategory::Medication,
            "ANATOMY" => EntityCategory::Anatomy,
            "TEST_TREATMENT_PROCEDURE" => EntityCategory::TestTreatmentProcedure,
            "PROTECTED_HEALTH_INFORMATION" => EntityCategory::ProtectedHealthInformation,
            "TIME_EXPRESSION" => EntityCategory::TimeExpression,
            "BEHAVIORAL_ENVIRONMENTAL_SOCIAL" => EntityCategory::BehavioralEnvironmentalSocial,
            _ => EntityCategory::Other(s),
        }
    }
}

impl From<EntityCategory> for String {
    fn from(c: EntityCategory) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualifier attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TraitName {
    Negation,
    Diagnosis,
    Sign,
    Symptom,
    Other(String),
}

impl TraitName {
    pub fn as_str(&self) -> &str {
        match self {
            TraitName::Negation => "NEGATION",
            TraitName::Diagnosis => "DIAGNOSIS",
            TraitName::Sign => "SIGN",
            TraitName::Symptom => "SYMPTOM",
            TraitName::Other(s) => s,
        }
    }
}

impl From<String> for TraitName {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NEGATION" => TraitName::Negation,
            "DIAGNOSIS" => TraitName::Diagnosis,
            "SIGN" => TraitName::Sign,
            "SYMPTOM" => TraitName::Symptom,
            _ => TraitName::Other(s),
        }
    }
}

impl From<TraitName> for String {
    fn from(t: TraitName) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TraitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trait {
    pub name: TraitName,
    pub score: f64,
}

/// One concept mention detected in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entity {
    pub text: String,
    pub category: EntityCategory,
    #[serde(rename = "Type")]
    pub entity_type: String,
    pub score: f64,
    pub traits: Vec<Trait>,
}

impl Entity {
    /// Whether the entity names a medical condition
    pub fn is_medical_condition(&self) -> bool {
        self.category == EntityCategory::MedicalCondition
    }

    /// Whether any trait marks the mention as negated
    pub fn is_negated(&self) -> bool {
        self.traits.iter().any(|t| t.name == TraitName::Negation)
    }
}

/// Typed view of an entity detection response
///
/// Fields besides `Entities` (offsets, attributes, model version) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectEntitiesResponse {
    #[serde(rename = "Entities")]
    pub entities: Vec<Entity>,
}

impl DetectEntitiesResponse {
    /// Validates a raw service response
    ///
    /// # Errors
    ///
    /// Returns `MalformedEntities` if `Entities` is missing or any entity
    /// lacks one of `Text`, `Category`, `Type`, `Score`, `Traits`.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| CxrError::MalformedEntities(e.to_string()))
    }

    /// Parses a persisted response document
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_service_response() {
        let value = json!({
            "Entities": [{
                "Id": 0,
                "BeginOffset": 12,
                "EndOffset": 21,
                "Text": "pneumonia",
                "Category": "MEDICAL_CONDITION",
                "Type": "DX_NAME",
                "Score": 0.98,
                "Traits": [{"Name": "NEGATION", "Score": 0.91}],
                "Attributes": []
            }],
            "ModelVersion": "2.4.0"
        });

        let response = DetectEntitiesResponse::from_value(&value).unwrap();
        assert_eq!(response.entities.len(), 1);

        let entity = &response.entities[0];
        assert_eq!(entity.text, "pneumonia");
        assert!(entity.is_medical_condition());
        assert_eq!(entity.entity_type, "DX_NAME");
        assert!(entity.is_negated());
        assert_eq!(entity.traits[0].score, 0.91);
    }

    #[test]
    fn test_unknown_category_is_kept() {
        let value = json!({
            "Entities": [{
                "Text": "x",
                "Category": "GENETIC_MARKER",
                "Type": "T",
                "Score": 0.5,
                "Traits": [{"Name": "HYPOTHETICAL", "Score": 0.4}]
            }]
        });

        let response = DetectEntitiesResponse::from_value(&value).unwrap();
        let entity = &response.entities[0];
        assert_eq!(
            entity.category,
            EntityCategory::Other("GENETIC_MARKER".to_string())
        );
        assert_eq!(entity.category.to_string(), "GENETIC_MARKER");
        assert_eq!(entity.traits[0].name.as_str(), "HYPOTHETICAL");
        assert!(!entity.is_negated());
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let value = json!({
            "Entities": [{"Text": "x", "Category": "MEDICAL_CONDITION", "Score": 0.5}]
        });
        let err = DetectEntitiesResponse::from_value(&value).unwrap_err();
        assert!(matches!(err, CxrError::MalformedEntities(_)));

        let err = DetectEntitiesResponse::from_value(&json!({"Other": []})).unwrap_err();
        assert!(matches!(err, CxrError::MalformedEntities(_)));
    }

    #[test]
    fn test_serializes_back_to_service_names() {
        let entity = Entity {
            text: "asthma".to_string(),
            category: EntityCategory::MedicalCondition,
            entity_type: "DX_NAME".to_string(),
            score: 0.7,
            traits: vec![],
        };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["Category"], "MEDICAL_CONDITION");
        assert_eq!(value["Type"], "DX_NAME");
    }
}
