use curation_api::types::{CookieID, CrawlTarget, CrawlTask, Platform};
use serde::Serialize;

use super::text;
use crate::form::Draft;
use crate::validation::{FieldValue, Rule, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

pub const MAX_ITEMS_LIMIT: i64 = 10_000;

draft_fields! {
    CrawlTaskField {
        Name => "name",
        Platform => "platform",
        Mode => "mode",
        Keyword => "keyword",
        AccountUrl => "account_url",
        CookieId => "cookie_id",
        MaxItems => "max_items",
    }
}

/// The crawl target while editing. `Unset` until a mode is chosen.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TargetDraft {
    #[default]
    Unset,
    Keyword {
        keyword: Option<String>,
    },
    Account {
        account_url: Option<String>,
    },
}

impl TargetDraft {
    fn mode(&self) -> Option<&'static str> {
        match self {
            TargetDraft::Unset => None,
            TargetDraft::Keyword { .. } => Some("keyword"),
            TargetDraft::Account { .. } => Some("account"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrawlTaskDraft {
    pub name: Option<String>,
    pub platform: Option<Platform>,
    pub target: TargetDraft,
    pub cookie_id: Option<CookieID>,
    pub max_items: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct CrawlTaskPayload {
    pub name: Option<String>,
    pub platform: Option<Platform>,
    #[serde(flatten)]
    pub target: Option<CrawlTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_id: Option<CookieID>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
}

impl Draft for CrawlTaskDraft {
    type Record = CrawlTask;
    type Field = CrawlTaskField;
    type Payload = CrawlTaskPayload;

    const FIELDS: &'static [CrawlTaskField] = CrawlTaskField::ALL;
    const IMMUTABLE: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "status",
        "collected_count",
        "last_run_at",
    ];

    fn from_record(record: &CrawlTask) -> Self {
        let target = match &record.target {
            CrawlTarget::Keyword { keyword } => TargetDraft::Keyword {
                keyword: Some(keyword.clone()),
            },
            CrawlTarget::Account { account_url } => TargetDraft::Account {
                account_url: Some(account_url.clone()),
            },
        };
        Self {
            name: Some(record.name.clone()),
            platform: Some(record.platform),
            target,
            cookie_id: record.cookie_id,
            max_items: record.max_items,
        }
    }

    fn set(&mut self, field: CrawlTaskField, value: FieldValue) -> Result<(), String> {
        match field {
            CrawlTaskField::Name => self.name = text(&value, MAX_NAME_LENGTH)?,
            CrawlTaskField::Platform => {
                self.platform = value.as_text().map(|s| s.parse()).transpose()?;
            }
            CrawlTaskField::Mode => {
                let mode = value.as_text().map(|s| s.trim().to_lowercase());
                if mode.as_deref() == self.target.mode() {
                    return Ok(());
                }
                self.target = match mode.as_deref() {
                    None => TargetDraft::Unset,
                    Some("keyword") => TargetDraft::Keyword { keyword: None },
                    Some("account") => TargetDraft::Account { account_url: None },
                    Some(other) => return Err(format!("unknown mode '{}'", other)),
                };
            }
            CrawlTaskField::Keyword => match &mut self.target {
                TargetDraft::Keyword { keyword } => *keyword = text(&value, MAX_TEXT_LENGTH)?,
                _ if value.is_empty() => {}
                _ => return Err("only applies in keyword mode".to_string()),
            },
            CrawlTaskField::AccountUrl => match &mut self.target {
                TargetDraft::Account { account_url } => {
                    *account_url = text(&value, MAX_TEXT_LENGTH)?
                }
                _ if value.is_empty() => {}
                _ => return Err("only applies in account mode".to_string()),
            },
            CrawlTaskField::CookieId => self.cookie_id = value.as_i64()?,
            CrawlTaskField::MaxItems => self.max_items = value.as_i64()?,
        }
        Ok(())
    }

    fn get(&self, field: CrawlTaskField) -> FieldValue {
        match field {
            CrawlTaskField::Name => FieldValue::from_option(self.name.clone()),
            CrawlTaskField::Platform => {
                FieldValue::from_option(self.platform.map(|p| p.as_str()))
            }
            CrawlTaskField::Mode => FieldValue::from_option(self.target.mode()),
            CrawlTaskField::Keyword => match &self.target {
                TargetDraft::Keyword { keyword } => FieldValue::from_option(keyword.clone()),
                _ => FieldValue::Empty,
            },
            CrawlTaskField::AccountUrl => match &self.target {
                TargetDraft::Account { account_url } => {
                    FieldValue::from_option(account_url.clone())
                }
                _ => FieldValue::Empty,
            },
            CrawlTaskField::CookieId => FieldValue::from_option(self.cookie_id),
            CrawlTaskField::MaxItems => FieldValue::from_option(self.max_items),
        }
    }

    fn rules(&self) -> Vec<Rule<CrawlTaskField>> {
        let mut rules = vec![
            Rule::Required(CrawlTaskField::Name),
            Rule::MaxLength(CrawlTaskField::Name, MAX_NAME_LENGTH),
            Rule::Required(CrawlTaskField::Platform),
            Rule::Required(CrawlTaskField::Mode),
            Rule::Range {
                field: CrawlTaskField::MaxItems,
                min: 1,
                max: MAX_ITEMS_LIMIT,
            },
        ];
        match self.target {
            TargetDraft::Keyword { .. } => rules.push(Rule::Required(CrawlTaskField::Keyword)),
            TargetDraft::Account { .. } => {
                rules.push(Rule::Required(CrawlTaskField::AccountUrl));
                rules.push(Rule::Pattern {
                    field: CrawlTaskField::AccountUrl,
                    pattern: r"^https?://\S+$",
                    message: "must be an http(s) URL",
                });
            }
            TargetDraft::Unset => {}
        }
        if self.platform.is_some_and(|p| p.requires_cookie()) {
            rules.push(Rule::Required(CrawlTaskField::CookieId));
        }
        rules
    }

    fn dependents(field: CrawlTaskField) -> &'static [CrawlTaskField] {
        match field {
            CrawlTaskField::Platform => &[CrawlTaskField::Mode, CrawlTaskField::CookieId],
            _ => &[],
        }
    }

    fn options(&self, field: CrawlTaskField) -> Option<Vec<String>> {
        match field {
            CrawlTaskField::Platform => Some(Platform::ALL.iter().map(|p| p.to_string()).collect()),
            CrawlTaskField::Mode => Some(
                self.platform
                    .map(|p| p.crawl_modes().iter().map(|m| m.to_string()).collect())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    fn to_payload(&self) -> CrawlTaskPayload {
        let target = match &self.target {
            TargetDraft::Unset => None,
            TargetDraft::Keyword { keyword } => Some(CrawlTarget::Keyword {
                keyword: keyword.clone().unwrap_or_default(),
            }),
            TargetDraft::Account { account_url } => Some(CrawlTarget::Account {
                account_url: account_url.clone().unwrap_or_default(),
            }),
        };
        CrawlTaskPayload {
            name: self.name.clone(),
            platform: self.platform,
            target,
            cookie_id: self.cookie_id,
            max_items: self.max_items,
        }
    }
}
