use curation_api::types::{decode_id_list, encode_id_list, StyleDefinition};
use serde::Serialize;

use super::text;
use crate::form::Draft;
use crate::validation::{FieldValue, Rule, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

draft_fields! {
    StyleField {
        Name => "name",
        Description => "description",
        FeatureIds => "feature_ids",
        Enabled => "enabled",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleDefinitionDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub feature_ids: Vec<i64>,
    pub enabled: bool,
}

impl Default for StyleDefinitionDraft {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            feature_ids: Vec::new(),
            enabled: true,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct StylePayload {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub feature_ids: String,
    pub enabled: bool,
}

impl Draft for StyleDefinitionDraft {
    type Record = StyleDefinition;
    type Field = StyleField;
    type Payload = StylePayload;

    const FIELDS: &'static [StyleField] = StyleField::ALL;
    const IMMUTABLE: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "calc_status",
        "matched_count",
    ];

    fn from_record(record: &StyleDefinition) -> Self {
        let feature_ids = decode_id_list(&record.feature_ids).unwrap_or_else(|e| {
            tracing::warn!(
                "Style {} has unreadable feature_ids '{}': {}",
                record.id,
                record.feature_ids,
                e
            );
            Vec::new()
        });
        Self {
            name: Some(record.name.clone()),
            description: record.description.clone(),
            feature_ids,
            enabled: record.enabled,
        }
    }

    fn set(&mut self, field: StyleField, value: FieldValue) -> Result<(), String> {
        match field {
            StyleField::Name => self.name = text(&value, MAX_NAME_LENGTH)?,
            StyleField::Description => self.description = text(&value, MAX_TEXT_LENGTH)?,
            StyleField::FeatureIds => self.feature_ids = value.as_id_list()?,
            StyleField::Enabled => self.enabled = value.as_bool()?.unwrap_or(true),
        }
        Ok(())
    }

    fn get(&self, field: StyleField) -> FieldValue {
        match field {
            StyleField::Name => FieldValue::from_option(self.name.clone()),
            StyleField::Description => FieldValue::from_option(self.description.clone()),
            StyleField::FeatureIds => self.feature_ids.clone().into(),
            StyleField::Enabled => self.enabled.into(),
        }
    }

    fn rules(&self) -> Vec<Rule<StyleField>> {
        vec![
            Rule::Required(StyleField::Name),
            Rule::MaxLength(StyleField::Name, MAX_NAME_LENGTH),
            Rule::MaxLength(StyleField::Description, MAX_TEXT_LENGTH),
            Rule::Required(StyleField::FeatureIds),
        ]
    }

    fn to_payload(&self) -> StylePayload {
        StylePayload {
            name: self.name.clone(),
            description: self.description.clone(),
            feature_ids: encode_id_list(&self.feature_ids),
            enabled: self.enabled,
        }
    }
}
