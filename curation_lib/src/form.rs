//! Create-or-edit form sessions over typed drafts.
//!
//! A [`FormSession`] owns one draft at a time. The draft is a copy of the
//! record it was opened from and is never shared with list state; closing
//! discards it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use curation_api::types::{Envelope, Resource};
use curation_api::Client;
use serde::Serialize;

use crate::error::ConsoleError;
use crate::notice::{Notice, Notifier};
use crate::validation::{validate, FieldValue, Rule, ValidationErrors};

/// A partial record being edited.
///
/// Implementations hold strongly typed fields (variant fields as enums) and
/// convert loosely typed [`FieldValue`] input in [`Draft::set`].
pub trait Draft: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    type Record: Resource;
    type Field: Copy + Eq + Ord + Hash + Debug + Display + FromStr<Err = String> + Send + Sync + 'static;
    type Payload: Serialize;

    /// Every field, in display order.
    const FIELDS: &'static [Self::Field];

    /// Server-owned keys removed from the payload before an update.
    const IMMUTABLE: &'static [&'static str] = &["id", "created_at", "updated_at"];

    fn from_record(record: &Self::Record) -> Self;

    /// Writes one field. Returns a message when the value cannot be converted.
    fn set(&mut self, field: Self::Field, value: FieldValue) -> Result<(), String>;

    fn get(&self, field: Self::Field) -> FieldValue;

    /// Rules for the current draft; variant fields contribute only while active.
    fn rules(&self) -> Vec<Rule<Self::Field>>;

    /// Fields whose value or options depend on `field`.
    fn dependents(_field: Self::Field) -> &'static [Self::Field] {
        &[]
    }

    /// Allowed values for `field` given the rest of the draft. `None` means free input.
    fn options(&self, _field: Self::Field) -> Option<Vec<String>> {
        None
    }

    /// The default submit transform.
    fn to_payload(&self) -> Self::Payload;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// A successful submit. `record` is the server's copy when it sent one back.
#[derive(Clone, Debug)]
pub struct Saved<R> {
    pub kind: SaveKind,
    pub record: Option<R>,
}

type IdOf<D> = <<D as Draft>::Record as Resource>::Id;

pub struct FormSession<D: Draft> {
    client: Arc<Client>,
    notifier: Arc<dyn Notifier>,
    mode: Option<FormMode<IdOf<D>>>,
    draft: D,
    /// Draft as it was when the session opened.
    original: D,
    errors: ValidationErrors,
    options: BTreeMap<D::Field, Vec<String>>,
}

impl<D: Draft> FormSession<D> {
    pub fn new(client: Arc<Client>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            mode: None,
            draft: D::default(),
            original: D::default(),
            errors: ValidationErrors::new(),
            options: BTreeMap::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<&FormMode<IdOf<D>>> {
        self.mode.as_ref()
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn options(&self, field: D::Field) -> Option<&[String]> {
        self.options.get(&field).map(Vec::as_slice)
    }

    pub fn is_dirty(&self) -> bool {
        self.is_open() && self.draft != self.original
    }

    pub fn open_create(&mut self, defaults: D) {
        self.open(FormMode::Create, defaults);
    }

    /// Opens `record` for editing.
    ///
    /// When list rows are partial the full record is fetched first; if that
    /// fails the row is used and a warning is raised.
    pub async fn open_edit(&mut self, record: &D::Record) {
        let id = record.id();
        let source = if <D::Record as Resource>::LIST_IS_PARTIAL {
            match self.client.detail::<D::Record>(&id).await {
                Ok(Envelope {
                    code: 200,
                    data: Some(full),
                    ..
                }) => full,
                Ok(env) => {
                    tracing::warn!(
                        "Detail for {} {} rejected ({}): {}",
                        <D::Record as Resource>::LABEL,
                        id,
                        env.code,
                        env.message
                    );
                    self.warn_partial(&id);
                    record.clone()
                }
                Err(e) => {
                    tracing::warn!(
                        "Detail for {} {} failed: {}",
                        <D::Record as Resource>::LABEL,
                        id,
                        e
                    );
                    self.warn_partial(&id);
                    record.clone()
                }
            }
        } else {
            record.clone()
        };
        self.open(FormMode::Edit(id), D::from_record(&source));
    }

    fn warn_partial(&self, id: &IdOf<D>) {
        self.notifier.notify(Notice::warning(format!(
            "Could not load full details for {} {}; some fields may be blank",
            <D::Record as Resource>::LABEL,
            id
        )));
    }

    fn open(&mut self, mode: FormMode<IdOf<D>>, draft: D) {
        self.mode = Some(mode);
        self.original = draft.clone();
        self.draft = draft;
        self.errors.clear();
        self.options = D::FIELDS
            .iter()
            .filter_map(|field| self.draft.options(*field).map(|opts| (*field, opts)))
            .collect();
    }

    /// Writes one field and, if its value changed, runs its cascade.
    pub fn set_field(&mut self, field: D::Field, value: impl Into<FieldValue>) -> Result<(), ConsoleError> {
        if !self.is_open() {
            return Err(ConsoleError::NoOpenSession);
        }
        let before = self.draft.get(field);
        if let Err(msg) = self.draft.set(field, value.into()) {
            let err = ConsoleError::InvalidInput(format!("{} {}", field, msg));
            self.errors.remove(field);
            self.errors.add(field, msg);
            return Err(err);
        }
        self.errors.remove(field);
        if self.draft.get(field) != before {
            self.cascade(field);
        }
        Ok(())
    }

    /// Parses `name` into a field and sets it. Used by text front ends.
    pub fn set_named(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), ConsoleError> {
        let field = name.parse::<D::Field>().map_err(ConsoleError::InvalidInput)?;
        self.set_field(field, value)
    }

    /// Recomputes options for everything downstream of `trigger` and clears
    /// dependents whose value is no longer allowed.
    fn cascade(&mut self, trigger: D::Field) {
        let mut pending: Vec<D::Field> = D::dependents(trigger).to_vec();
        let mut seen = BTreeSet::from([trigger]);
        while let Some(field) = pending.pop() {
            if !seen.insert(field) {
                continue;
            }
            let current = self.draft.get(field);
            let options = self.draft.options(field);
            let still_valid = match &options {
                Some(opts) => current.is_empty() || opts.contains(&current.to_string()),
                None => current.is_empty(),
            };
            if !still_valid {
                tracing::debug!("Clearing {} after {} changed", field, trigger);
                if let Err(msg) = self.draft.set(field, FieldValue::Empty) {
                    tracing::warn!("Could not clear {}: {}", field, msg);
                }
                self.errors.remove(field);
            }
            match options {
                Some(opts) => {
                    self.options.insert(field, opts);
                }
                None => {
                    self.options.remove(&field);
                }
            }
            pending.extend_from_slice(D::dependents(field));
        }
    }

    /// Runs all rules and option checks, storing the result on the session.
    pub fn validate(&mut self) -> bool {
        let draft = &self.draft;
        let mut errors = validate(&draft.rules(), |field| draft.get(field));
        for field in D::FIELDS {
            let Some(opts) = draft.options(*field) else {
                continue;
            };
            let value = draft.get(*field);
            if !value.is_empty() && !opts.contains(&value.to_string()) {
                errors.add(field, format!("'{}' is not a valid option", value));
            }
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validates and sends the draft's default payload.
    pub async fn submit(&mut self) -> Result<Saved<D::Record>, ConsoleError> {
        self.submit_with(D::to_payload).await
    }

    /// Validates, applies `transform`, and issues exactly one create or update.
    ///
    /// Validation failures are returned without a network call or notice.
    /// Server and transport failures raise one notice and leave the session
    /// open with the draft intact.
    pub async fn submit_with<P, F>(&mut self, transform: F) -> Result<Saved<D::Record>, ConsoleError>
    where
        P: Serialize,
        F: FnOnce(&D) -> P,
    {
        let mode = self.mode.clone().ok_or(ConsoleError::NoOpenSession)?;
        if !self.validate() {
            tracing::debug!("Submit blocked by validation: {}", self.errors);
            return Err(ConsoleError::Validation(self.errors.clone()));
        }

        let mut payload = serde_json::to_value(transform(&self.draft)).map_err(|e| {
            self.notifier
                .notify(Notice::error(format!("Could not build request: {}", e)));
            ConsoleError::Serialization(e)
        })?;
        if let (FormMode::Edit(_), serde_json::Value::Object(map)) = (&mode, &mut payload) {
            for key in D::IMMUTABLE {
                map.remove(*key);
            }
        }

        let label = <D::Record as Resource>::LABEL;
        let (kind, result) = match &mode {
            FormMode::Create => (
                SaveKind::Created,
                self.client.create::<D::Record, _>(&payload).await,
            ),
            FormMode::Edit(id) => (
                SaveKind::Updated,
                self.client.update::<D::Record, _>(id, &payload).await,
            ),
        };

        let error = match result {
            Ok(env) if env.is_success() => {
                let verb = match kind {
                    SaveKind::Created => "Created",
                    SaveKind::Updated => "Updated",
                };
                self.notifier
                    .notify(Notice::success(format!("{} {}", verb, label)));
                self.close();
                return Ok(Saved {
                    kind,
                    record: env.data,
                });
            }
            Ok(env) => ConsoleError::Application {
                code: env.code,
                message: env.message,
            },
            Err(e) => ConsoleError::Api(e),
        };
        self.notifier.notify(Notice::error(error.user_message()));
        Err(error)
    }

    /// Discards the draft. Safe to call at any time.
    pub fn close(&mut self) {
        self.mode = None;
        self.draft = D::default();
        self.original = D::default();
        self.errors.clear();
        self.options.clear();
    }
}
