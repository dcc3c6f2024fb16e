use curation_api::types::{Cookie, CookieStatus, Platform};
use serde::Serialize;

use super::{strings, text};
use crate::form::Draft;
use crate::validation::{FieldValue, Rule, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

draft_fields! {
    CookieField {
        Platform => "platform",
        Name => "name",
        Account => "account",
        Value => "value",
        Status => "status",
        Remark => "remark",
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CookieDraft {
    pub platform: Option<Platform>,
    pub name: Option<String>,
    pub account: Option<String>,
    pub value: Option<String>,
    pub status: Option<String>,
    pub remark: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CookiePayload {
    pub platform: Option<Platform>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl Draft for CookieDraft {
    type Record = Cookie;
    type Field = CookieField;
    type Payload = CookiePayload;

    const FIELDS: &'static [CookieField] = CookieField::ALL;

    fn from_record(record: &Cookie) -> Self {
        let status = record.status.as_str();
        Self {
            platform: Some(record.platform),
            name: Some(record.name.clone()),
            account: record.account.clone(),
            value: record.value.clone(),
            // `checking` is transient and cannot be chosen by hand.
            status: CookieStatus::SELECTABLE
                .contains(&status)
                .then(|| status.to_string()),
            remark: record.remark.clone(),
        }
    }

    fn set(&mut self, field: CookieField, value: FieldValue) -> Result<(), String> {
        match field {
            CookieField::Platform => {
                self.platform = value.as_text().map(|s| s.parse()).transpose()?;
            }
            CookieField::Name => self.name = text(&value, MAX_NAME_LENGTH)?,
            CookieField::Account => self.account = text(&value, MAX_NAME_LENGTH)?,
            // Cookie headers are opaque; keep them verbatim apart from trimming.
            CookieField::Value => {
                self.value = value.as_text().map(|s| s.trim().to_string());
            }
            CookieField::Status => self.status = value.as_text().map(|s| s.trim().to_lowercase()),
            CookieField::Remark => self.remark = text(&value, MAX_TEXT_LENGTH)?,
        }
        Ok(())
    }

    fn get(&self, field: CookieField) -> FieldValue {
        match field {
            CookieField::Platform => FieldValue::from_option(self.platform.map(|p| p.as_str())),
            CookieField::Name => FieldValue::from_option(self.name.clone()),
            CookieField::Account => FieldValue::from_option(self.account.clone()),
            CookieField::Value => FieldValue::from_option(self.value.clone()),
            CookieField::Status => FieldValue::from_option(self.status.clone()),
            CookieField::Remark => FieldValue::from_option(self.remark.clone()),
        }
    }

    fn rules(&self) -> Vec<Rule<CookieField>> {
        vec![
            Rule::Required(CookieField::Platform),
            Rule::Required(CookieField::Name),
            Rule::MaxLength(CookieField::Name, MAX_NAME_LENGTH),
            Rule::Required(CookieField::Value),
        ]
    }

    fn options(&self, field: CookieField) -> Option<Vec<String>> {
        match field {
            CookieField::Platform => Some(Platform::ALL.iter().map(|p| p.to_string()).collect()),
            CookieField::Status => Some(strings(&CookieStatus::SELECTABLE)),
            _ => None,
        }
    }

    fn to_payload(&self) -> CookiePayload {
        CookiePayload {
            platform: self.platform,
            name: self.name.clone(),
            account: self.account.clone(),
            value: self.value.clone(),
            status: self.status.clone(),
            remark: self.remark.clone(),
        }
    }
}
