//! Contact form with simulated submission.
//!
//! Nothing is sent anywhere. Submitting shows a busy state on the submit
//! button, and after a short delay the form is reset and a thank-you
//! notification appears.

use crate::dom::{ElementId, Page};
use crate::i18n::{CONTACT_SENDING_LABEL, CONTACT_THANKS_NOTICE};
use crate::timers::Task;
use crate::ui::{NotificationKind, Ui};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info};

pub const CONTACT_FORM_ID: &str = "contact-form";

#[derive(Debug, Clone)]
struct PendingSubmit {
    button: Option<ElementId>,
    original_label: String,
}

/// Submission state of the page's contact forms.
#[derive(Debug)]
pub struct ContactForms {
    delay: Duration,
    pending: HashMap<ElementId, PendingSubmit>,
}

impl ContactForms {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    pub fn is_pending(&self, form: ElementId) -> bool {
        self.pending.contains_key(&form)
    }

    /// Start a submission. Returns the collected form data, or `None` when
    /// the form does not exist or is already being submitted.
    pub fn submit(&mut self, ui: &mut Ui, form: ElementId) -> Option<BTreeMap<String, String>> {
        if self.is_pending(form) || ui.page.get(form).is_none() {
            debug!("Ignoring contact form submit for {:?}", form);
            return None;
        }

        let data = form_data(&ui.page, form);
        info!("Contact form submitted with {} fields", data.len());

        let button = submit_button(&ui.page, form);
        let original_label = button
            .and_then(|b| ui.page.text_of(b))
            .unwrap_or_default();
        if let Some(b) = button {
            ui.page.set_text(b, CONTACT_SENDING_LABEL);
            if let Some(element) = ui.page.get_mut(b) {
                element.disabled = true;
            }
        }

        self.pending.insert(
            form,
            PendingSubmit {
                button,
                original_label,
            },
        );
        ui.after(self.delay, Task::CompleteContactSubmit(form));
        Some(data)
    }

    /// Finish a submission: notify, reset the fields and restore the button.
    pub fn complete(&mut self, ui: &mut Ui, form: ElementId) {
        let Some(pending) = self.pending.remove(&form) else {
            return;
        };

        ui.notify(CONTACT_THANKS_NOTICE, NotificationKind::Success);
        reset_form(&mut ui.page, form);

        if let Some(b) = pending.button {
            ui.page.set_text(b, &pending.original_label);
            if let Some(element) = ui.page.get_mut(b) {
                element.disabled = false;
            }
        }
    }
}

fn submit_button(page: &Page, form: ElementId) -> Option<ElementId> {
    page.find_within(form, |e| e.tag == "button" && e.attr("type") == Some("submit"))
}

/// Named field values of a form.
pub fn form_data(page: &Page, form: ElementId) -> BTreeMap<String, String> {
    page.descendants(form)
        .into_iter()
        .filter_map(|id| page.get(id))
        .filter_map(|e| Some((e.attr("name")?.to_string(), e.value.clone())))
        .collect()
}

/// Restore every named field to its default (`value` attribute, else empty).
fn reset_form(page: &mut Page, form: ElementId) {
    for id in page.descendants(form) {
        if let Some(field) = page.get_mut(id) {
            if field.attr("name").is_some() {
                field.value = field.attr("value").unwrap_or_default().to_string();
            }
        }
    }
}
