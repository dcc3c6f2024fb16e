use curation_api::types::{decode_id_list, encode_id_list, AcquireType, SampleSet};
use serde::Serialize;

use super::{strings, text};
use crate::form::Draft;
use crate::validation::{FieldValue, Rule, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

pub const MAX_SAMPLE_LIMIT: i64 = 100_000;
pub const MAX_SCORE: f64 = 10.0;

draft_fields! {
    SampleSetField {
        Name => "name",
        Description => "description",
        AcquireType => "acquire_type",
        ImageIds => "image_ids",
        FeatureIds => "feature_ids",
        MinScore => "min_score",
        Limit => "limit",
    }
}

/// How the set is filled. Each variant carries only its own fields.
#[derive(Clone, Debug, PartialEq)]
pub enum AcquireDraft {
    Manual {
        image_ids: Vec<i64>,
    },
    Auto {
        feature_ids: Vec<i64>,
        min_score: Option<f64>,
        limit: Option<i64>,
    },
}

impl Default for AcquireDraft {
    fn default() -> Self {
        AcquireDraft::Manual {
            image_ids: Vec::new(),
        }
    }
}

impl AcquireDraft {
    pub fn kind(&self) -> AcquireType {
        match self {
            AcquireDraft::Manual { .. } => AcquireType::Manual,
            AcquireDraft::Auto { .. } => AcquireType::Auto,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleSetDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub acquire: AcquireDraft,
}

#[derive(Serialize, Debug)]
pub struct SampleSetPayload {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub acquire: AcquirePayload,
}

/// Id arrays travel as comma-separated strings.
#[derive(Serialize, Debug, PartialEq)]
#[serde(tag = "acquire_type", rename_all = "lowercase")]
pub enum AcquirePayload {
    Manual {
        image_ids: String,
    },
    Auto {
        feature_ids: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_score: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
    },
}

fn ids_from(raw: Option<&str>, what: &str, set_id: i64) -> Vec<i64> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    decode_id_list(raw).unwrap_or_else(|e| {
        tracing::warn!("Sample set {} has unreadable {} '{}': {}", set_id, what, raw, e);
        Vec::new()
    })
}

impl Draft for SampleSetDraft {
    type Record = SampleSet;
    type Field = SampleSetField;
    type Payload = SampleSetPayload;

    const FIELDS: &'static [SampleSetField] = SampleSetField::ALL;
    const IMMUTABLE: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "status",
        "image_count",
        "package_url",
    ];

    fn from_record(record: &SampleSet) -> Self {
        let acquire = match record.acquire_type {
            AcquireType::Manual => AcquireDraft::Manual {
                image_ids: ids_from(record.image_ids.as_deref(), "image_ids", record.id),
            },
            AcquireType::Auto => AcquireDraft::Auto {
                feature_ids: ids_from(record.feature_ids.as_deref(), "feature_ids", record.id),
                min_score: record.min_score,
                limit: record.limit,
            },
        };
        Self {
            name: Some(record.name.clone()),
            description: record.description.clone(),
            acquire,
        }
    }

    fn set(&mut self, field: SampleSetField, value: FieldValue) -> Result<(), String> {
        match (field, &mut self.acquire) {
            (SampleSetField::Name, _) => self.name = text(&value, MAX_NAME_LENGTH)?,
            (SampleSetField::Description, _) => {
                self.description = text(&value, MAX_TEXT_LENGTH)?
            }
            (SampleSetField::AcquireType, acquire) => {
                let wanted = value.as_text().map(|s| s.trim().to_lowercase());
                match wanted.as_deref() {
                    Some(kind) if kind == acquire.kind().as_str() => {}
                    None | Some("manual") => *acquire = AcquireDraft::default(),
                    Some("auto") => {
                        *acquire = AcquireDraft::Auto {
                            feature_ids: Vec::new(),
                            min_score: None,
                            limit: None,
                        }
                    }
                    Some(other) => return Err(format!("unknown acquire type '{}'", other)),
                }
            }
            (SampleSetField::ImageIds, AcquireDraft::Manual { image_ids }) => {
                *image_ids = value.as_id_list()?
            }
            (SampleSetField::FeatureIds, AcquireDraft::Auto { feature_ids, .. }) => {
                *feature_ids = value.as_id_list()?
            }
            (SampleSetField::MinScore, AcquireDraft::Auto { min_score, .. }) => {
                *min_score = value.as_f64()?
            }
            (SampleSetField::Limit, AcquireDraft::Auto { limit, .. }) => *limit = value.as_i64()?,
            _ if value.is_empty() => {}
            (field, acquire) => {
                return Err(format!(
                    "{} does not apply to {} sets",
                    field,
                    acquire.kind()
                ))
            }
        }
        Ok(())
    }

    fn get(&self, field: SampleSetField) -> FieldValue {
        match (field, &self.acquire) {
            (SampleSetField::Name, _) => FieldValue::from_option(self.name.clone()),
            (SampleSetField::Description, _) => FieldValue::from_option(self.description.clone()),
            (SampleSetField::AcquireType, acquire) => acquire.kind().as_str().into(),
            (SampleSetField::ImageIds, AcquireDraft::Manual { image_ids }) => {
                image_ids.clone().into()
            }
            (SampleSetField::FeatureIds, AcquireDraft::Auto { feature_ids, .. }) => {
                feature_ids.clone().into()
            }
            (SampleSetField::MinScore, AcquireDraft::Auto { min_score, .. }) => {
                FieldValue::from_option(*min_score)
            }
            (SampleSetField::Limit, AcquireDraft::Auto { limit, .. }) => {
                FieldValue::from_option(*limit)
            }
            _ => FieldValue::Empty,
        }
    }

    fn rules(&self) -> Vec<Rule<SampleSetField>> {
        let mut rules = vec![
            Rule::Required(SampleSetField::Name),
            Rule::MaxLength(SampleSetField::Name, MAX_NAME_LENGTH),
            Rule::MaxLength(SampleSetField::Description, MAX_TEXT_LENGTH),
            Rule::Required(SampleSetField::AcquireType),
        ];
        match self.acquire {
            AcquireDraft::Manual { .. } => rules.push(Rule::Required(SampleSetField::ImageIds)),
            AcquireDraft::Auto { .. } => rules.extend([
                Rule::Required(SampleSetField::FeatureIds),
                Rule::Custom {
                    field: SampleSetField::MinScore,
                    check: score_in_range,
                },
                Rule::Range {
                    field: SampleSetField::Limit,
                    min: 1,
                    max: MAX_SAMPLE_LIMIT,
                },
            ]),
        }
        rules
    }

    fn options(&self, field: SampleSetField) -> Option<Vec<String>> {
        match field {
            SampleSetField::AcquireType => Some(strings(&AcquireType::ALL)),
            _ => None,
        }
    }

    fn to_payload(&self) -> SampleSetPayload {
        let acquire = match &self.acquire {
            AcquireDraft::Manual { image_ids } => AcquirePayload::Manual {
                image_ids: encode_id_list(image_ids),
            },
            AcquireDraft::Auto {
                feature_ids,
                min_score,
                limit,
            } => AcquirePayload::Auto {
                feature_ids: encode_id_list(feature_ids),
                min_score: *min_score,
                limit: *limit,
            },
        };
        SampleSetPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            acquire,
        }
    }
}

fn score_in_range(value: &FieldValue) -> Option<String> {
    match value.as_f64() {
        Ok(Some(score)) if !(0.0..=MAX_SCORE).contains(&score) => {
            Some(format!("must be between 0 and {}", MAX_SCORE))
        }
        Ok(_) => None,
        Err(msg) => Some(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn auto_set() -> SampleSetDraft {
        SampleSetDraft {
            name: Some("moody blues".to_string()),
            description: None,
            acquire: AcquireDraft::Auto {
                feature_ids: vec![3, 9],
                min_score: Some(6.5),
                limit: Some(500),
            },
        }
    }

    #[test]
    fn manual_payload_collapses_image_ids() {
        let draft = SampleSetDraft {
            name: Some("picked".to_string()),
            description: None,
            acquire: AcquireDraft::Manual {
                image_ids: vec![11, 12, 40],
            },
        };
        let json = serde_json::to_value(draft.to_payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "picked", "acquire_type": "manual", "image_ids": "11,12,40"})
        );
    }

    #[test]
    fn auto_payload_drops_manual_fields() {
        let json = serde_json::to_value(auto_set().to_payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "moody blues",
                "acquire_type": "auto",
                "feature_ids": "3,9",
                "min_score": 6.5,
                "limit": 500
            })
        );
    }

    #[test]
    fn image_ids_accept_comma_text() {
        let mut draft = SampleSetDraft::default();
        draft
            .set(SampleSetField::ImageIds, "4, 5,6".into())
            .unwrap();
        assert_eq!(
            draft.acquire,
            AcquireDraft::Manual {
                image_ids: vec![4, 5, 6]
            }
        );
    }

    #[test]
    fn auto_fields_rejected_for_manual_sets() {
        let mut draft = SampleSetDraft::default();
        let err = draft.set(SampleSetField::MinScore, 5.0.into()).unwrap_err();
        assert_eq!(err, "min_score does not apply to manual sets");
    }

    #[test]
    fn score_outside_range_fails() {
        let mut draft = auto_set();
        draft.set(SampleSetField::MinScore, 12.0.into()).unwrap();
        let errors = validate(&draft.rules(), |f| draft.get(f));
        assert_eq!(
            errors.get(SampleSetField::MinScore),
            Some("must be between 0 and 10")
        );
    }

    #[test]
    fn record_with_bad_id_list_hydrates_empty() {
        let set: SampleSet = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "broken",
            "acquire_type": "manual",
            "image_ids": "1,x",
            "status": "draft",
            "created_at": "2026-02-10T12:00:00Z"
        }))
        .unwrap();
        let draft = SampleSetDraft::from_record(&set);
        assert_eq!(draft.acquire, AcquireDraft::Manual { image_ids: vec![] });
    }
}
