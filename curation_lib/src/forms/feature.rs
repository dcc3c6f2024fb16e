use curation_api::types::{Feature, FeatureID, FEATURE_CATEGORIES};
use serde::Serialize;

use super::{strings, text};
use crate::form::Draft;
use crate::validation::{FieldValue, Rule, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

draft_fields! {
    FeatureField {
        Name => "name",
        Category => "category",
        ParentId => "parent_id",
        Description => "description",
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureDraft {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Parent within the same category.
    pub parent_id: Option<FeatureID>,
    pub description: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct FeaturePayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub parent_id: Option<FeatureID>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Draft for FeatureDraft {
    type Record = Feature;
    type Field = FeatureField;
    type Payload = FeaturePayload;

    const FIELDS: &'static [FeatureField] = FeatureField::ALL;
    const IMMUTABLE: &'static [&'static str] = &["id", "created_at", "updated_at", "sample_count"];

    fn from_record(record: &Feature) -> Self {
        Self {
            name: Some(record.name.clone()),
            category: Some(record.category.clone()),
            parent_id: record.parent_id,
            description: record.description.clone(),
        }
    }

    fn set(&mut self, field: FeatureField, value: FieldValue) -> Result<(), String> {
        match field {
            FeatureField::Name => self.name = text(&value, MAX_NAME_LENGTH)?,
            FeatureField::Category => {
                self.category = value.as_text().map(|s| s.trim().to_lowercase())
            }
            FeatureField::ParentId => self.parent_id = value.as_i64()?,
            FeatureField::Description => self.description = text(&value, MAX_TEXT_LENGTH)?,
        }
        Ok(())
    }

    fn get(&self, field: FeatureField) -> FieldValue {
        match field {
            FeatureField::Name => FieldValue::from_option(self.name.clone()),
            FeatureField::Category => FieldValue::from_option(self.category.clone()),
            FeatureField::ParentId => FieldValue::from_option(self.parent_id),
            FeatureField::Description => FieldValue::from_option(self.description.clone()),
        }
    }

    fn rules(&self) -> Vec<Rule<FeatureField>> {
        vec![
            Rule::Required(FeatureField::Name),
            Rule::MaxLength(FeatureField::Name, MAX_NAME_LENGTH),
            Rule::Required(FeatureField::Category),
            Rule::Custom {
                field: FeatureField::ParentId,
                check: positive_id,
            },
            Rule::MaxLength(FeatureField::Description, MAX_TEXT_LENGTH),
        ]
    }

    /// A parent belongs to one category, so any category change drops it.
    fn dependents(field: FeatureField) -> &'static [FeatureField] {
        match field {
            FeatureField::Category => &[FeatureField::ParentId],
            _ => &[],
        }
    }

    fn options(&self, field: FeatureField) -> Option<Vec<String>> {
        match field {
            FeatureField::Category => Some(strings(&FEATURE_CATEGORIES)),
            _ => None,
        }
    }

    fn to_payload(&self) -> FeaturePayload {
        FeaturePayload {
            name: self.name.clone(),
            category: self.category.clone(),
            parent_id: self.parent_id,
            description: self.description.clone(),
        }
    }
}

fn positive_id(value: &FieldValue) -> Option<String> {
    match value.as_i64() {
        Ok(Some(id)) if id < 1 => Some("must be a positive id".to_string()),
        Ok(_) => None,
        Err(msg) => Some(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn category_is_normalised() {
        let mut draft = FeatureDraft::default();
        draft.set(FeatureField::Category, " Scene ".into()).unwrap();
        assert_eq!(draft.category.as_deref(), Some("scene"));
    }

    #[test]
    fn parent_must_be_positive() {
        let draft = FeatureDraft {
            name: Some("golden hour".to_string()),
            category: Some("scene".to_string()),
            parent_id: Some(0),
            description: None,
        };
        let errors = validate(&draft.rules(), |f| draft.get(f));
        assert_eq!(
            errors.get(FeatureField::ParentId),
            Some("must be a positive id")
        );
    }

    #[test]
    fn payload_keeps_null_parent() {
        let draft = FeatureDraft {
            name: Some("portrait".to_string()),
            category: Some("subject".to_string()),
            ..FeatureDraft::default()
        };
        let json = serde_json::to_value(draft.to_payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "portrait", "category": "subject", "parent_id": null})
        );
    }
}
