use std::collections::BTreeMap;
use std::future::Future;

use tracing::warn;

use crate::errors::CoreError;

/// Validation messages keyed by field name (the payload's camelCase name).
///
/// A field counts as invalid only while its message is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Names of the invalid fields, sorted.
    pub fn fields(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(f, _)| f.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.values().all(String::is_empty)
    }
}

/// A create/edit form's working copy.
pub trait FormDraft {
    /// Check every rule; an empty map means the draft can be submitted.
    fn validate(&self) -> FieldErrors;

    /// Apply raw input to `field`. Returns `false` for unknown fields.
    fn set_field(&mut self, field: &str, raw: &str) -> bool;
}

/// Result of [`FormState::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Validation failed; nothing was sent.
    Invalid,
    /// The request failed; the form stays open with the error shown.
    Failed(CoreError),
    /// Saved; the form is closed.
    Saved(T),
}

impl<T> SubmitOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

/// Modal form state: the draft, its field errors and submission status.
///
/// The draft is independent of the list it was opened from; the list only
/// changes after a successful save and a refetch.
#[derive(Debug, Clone, Default)]
pub struct FormState<D> {
    draft: D,
    errors: FieldErrors,
    open: bool,
    submitting: bool,
    submit_error: Option<String>,
    editing_id: Option<String>,
}

impl<D: FormDraft + Default + Clone> FormState<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open empty, for creating a record.
    pub fn open_create(&mut self) {
        self.reset(D::default(), None);
    }

    /// Open pre-filled, for editing the record `id`.
    pub fn open_edit(&mut self, id: impl Into<String>, draft: D) {
        self.reset(draft, Some(id.into()));
    }

    fn reset(&mut self, draft: D, editing_id: Option<String>) {
        self.draft = draft;
        self.errors = FieldErrors::new();
        self.submit_error = None;
        self.submitting = false;
        self.editing_id = editing_id;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.submitting = false;
        self.editing_id = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Apply raw input to one field and clear that field's error.
    pub fn change(&mut self, field: &str, raw: &str) -> bool {
        let known = self.draft.set_field(field, raw);
        self.errors.clear(field);
        known
    }

    /// Update the draft directly (pickers, selections) and clear `field`'s error.
    pub fn update(&mut self, field: &str, apply: impl FnOnce(&mut D)) {
        apply(&mut self.draft);
        self.errors.clear(field);
    }

    /// Run validation and keep the resulting errors. `true` when submittable.
    pub fn validate(&mut self) -> bool {
        self.errors = self.draft.validate();
        self.errors.is_empty()
    }

    /// Validate, then hand a copy of the draft to `action`.
    ///
    /// Invalid drafts never reach `action`. A failed action keeps the form open
    /// and records the error text; a successful one closes the form.
    pub async fn submit<T, F, Fut>(&mut self, action: F) -> SubmitOutcome<T>
    where
        F: FnOnce(D) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        if !self.validate() {
            return SubmitOutcome::Invalid;
        }

        self.submitting = true;
        self.submit_error = None;
        let result = action(self.draft.clone()).await;
        self.submitting = false;

        match result {
            Ok(saved) => {
                self.close();
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                warn!("Form submission failed: {e}");
                self.submit_error = Some(e.user_message());
                SubmitOutcome::Failed(e)
            }
        }
    }
}
