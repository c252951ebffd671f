use crate::types::{Entity, LabelMap};

/// Reduces detected entities to diagnosis labels for one case
///
/// Only `MEDICAL_CONDITION` entities produce a label. A label is `true`
/// unless the entity carries a `NEGATION` trait.
///
/// When the same text appears more than once, the entity that comes last
/// in `entities` decides the value: each one overwrites the previous.
///
/// # Example
///
/// ```
/// use cxrprep_core::labels::reduce_entities;
/// use cxrprep_core::DetectEntitiesResponse;
///
/// let response = DetectEntitiesResponse::from_json(r#"{
///     "Entities": [
///         {"Text": "effusion", "Category": "MEDICAL_CONDITION", "Type": "DX_NAME",
///          "Score": 0.97, "Traits": [{"Name": "NEGATION", "Score": 0.93}]},
///         {"Text": "cardiomegaly", "Category": "MEDICAL_CONDITION", "Type": "DX_NAME",
///          "Score": 0.95, "Traits": []},
///         {"Text": "heart", "Category": "ANATOMY", "Type": "SYSTEM_ORGAN_SITE",
///          "Score": 0.99, "Traits": []}
///     ]
/// }"#).unwrap();
///
/// let labels = reduce_entities(&response.entities);
/// assert_eq!(labels.get("effusion"), Some(&false));
/// assert_eq!(labels.get("cardiomegaly"), Some(&true));
/// assert!(!labels.contains_key("heart"));
/// ```
pub fn reduce_entities(entities: &[Entity]) -> LabelMap {
    let mut labels = LabelMap::new();
    for entity in entities.iter().filter(|e| e.is_medical_condition()) {
        labels.insert(entity.text.clone(), is_positive_diagnosis(entity));
    }
    labels
}

/// Whether a condition entity asserts presence (has no negation trait)
pub fn is_positive_diagnosis(entity: &Entity) -> bool {
    !entity.is_negated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityCategory, Trait, TraitName};

    fn condition(text: &str, traits: &[TraitName]) -> Entity {
        Entity {
            text: text.to_string(),
            category: EntityCategory::MedicalCondition,
            entity_type: "DX_NAME".to_string(),
            score: 0.9,
            traits: traits
                .iter()
                .map(|name| Trait {
                    name: name.clone(),
                    score: 0.8,
                })
                .collect(),
        }
    }

    #[test]
    fn test_condition_without_traits_is_positive() {
        let labels = reduce_entities(&[condition("pneumonia", &[])]);
        assert_eq!(labels.get("pneumonia"), Some(&true));
    }

    #[test]
    fn test_negated_condition_is_negative() {
        let labels = reduce_entities(&[condition("pneumonia", &[TraitName::Negation])]);
        assert_eq!(labels.get("pneumonia"), Some(&false));
    }

    #[test]
    fn test_negation_anywhere_in_traits() {
        let entity = condition(
            "nodule",
            &[TraitName::Sign, TraitName::Diagnosis, TraitName::Negation],
        );
        assert!(!is_positive_diagnosis(&entity));

        let entity = condition("nodule", &[TraitName::Sign, TraitName::Symptom]);
        assert!(is_positive_diagnosis(&entity));
    }

    #[test]
    fn test_other_categories_never_labelled() {
        let mut anatomy = condition("lung", &[]);
        anatomy.category = EntityCategory::Anatomy;
        let mut medication = condition("aspirin", &[]);
        medication.category = EntityCategory::Medication;
        let mut other = condition("brca1", &[]);
        other.category = EntityCategory::Other("GENETIC".to_string());

        let labels = reduce_entities(&[anatomy, medication, other]);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_duplicate_text_last_entity_wins() {
        // Overwrite, not OR-merge: a later negated mention flips an earlier positive one
        let labels = reduce_entities(&[
            condition("pneumonia", &[]),
            condition("pneumonia", &[TraitName::Negation]),
        ]);
        assert_eq!(labels.get("pneumonia"), Some(&false));

        let labels = reduce_entities(&[
            condition("pneumonia", &[TraitName::Negation]),
            condition("pneumonia", &[]),
        ]);
        assert_eq!(labels.get("pneumonia"), Some(&true));
    }

    #[test]
    fn test_empty_entities() {
        assert!(reduce_entities(&[]).is_empty());
    }
}
