//! HTML-backed submission targets.
//!
//! [`HtmlPage::parse`] walks every `<form>` in a document and turns it into an
//! [`HtmlForm`]: the action is resolved against the page URL and every control
//! that would take part in a browser submission is kept, so field snapshots
//! match what `FormData` would carry.
//!
//! Controls that can never be submitted (disabled, nameless, buttons, file
//! pickers) are dropped at parse time.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::target::SubmissionTarget;
use crate::types::{FormPayload, RelayError, RelayResult};

/// A parsed page and its forms.
#[derive(Debug)]
pub struct HtmlPage {
    url: String,
    forms: Vec<Arc<HtmlForm>>,
}

impl HtmlPage {
    /// Parse `html` as if it were loaded from `base_url`.
    pub fn parse(html: &str, base_url: &str) -> RelayResult<Self> {
        let base = url::Url::parse(base_url)
            .map_err(|e| RelayError::InvalidUrl(format!("{base_url}: {e}")))?;
        let document = Html::parse_document(html);

        let forms = document
            .select(form_selector())
            .enumerate()
            .map(|(index, form)| Arc::new(HtmlForm::from_element(index, form, &base)))
            .collect::<Vec<_>>();

        tracing::debug!("Parsed {} form(s) from {}", forms.len(), base);

        Ok(Self {
            url: base.to_string(),
            forms,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn forms(&self) -> &[Arc<HtmlForm>] {
        &self.forms
    }

    /// Form at `index` in document order.
    pub fn form(&self, index: usize) -> RelayResult<Arc<HtmlForm>> {
        self.forms
            .get(index)
            .cloned()
            .ok_or_else(|| RelayError::FormNotFound(format!("index {index}")))
    }

    /// Form whose `id` attribute equals `id`.
    pub fn form_by_id(&self, id: &str) -> RelayResult<Arc<HtmlForm>> {
        self.forms
            .iter()
            .find(|f| f.id() == Some(id))
            .cloned()
            .ok_or_else(|| RelayError::FormNotFound(format!("#{id}")))
    }
}

/// Summary of a form, used for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FormSummary {
    pub index: usize,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub method: String,
    pub action: String,
    pub fields: FormPayload,
}

#[derive(Debug, Clone)]
struct SelectOption {
    value: String,
    selected: bool,
    disabled: bool,
}

#[derive(Debug, Clone)]
enum ControlKind {
    /// Text-like inputs, hidden inputs and textareas.
    Text { value: String },
    Checkbox { value: String, checked: bool },
    Radio { value: String, checked: bool },
    Select {
        options: Vec<SelectOption>,
        multiple: bool,
    },
}

#[derive(Debug, Clone)]
struct FormControl {
    name: String,
    kind: ControlKind,
}

impl FormControl {
    fn submitted_values(&self, out: &mut Vec<(String, String)>) {
        match &self.kind {
            ControlKind::Text { value } => out.push((self.name.clone(), value.clone())),
            ControlKind::Checkbox { value, checked } | ControlKind::Radio { value, checked } => {
                if *checked {
                    out.push((self.name.clone(), value.clone()));
                }
            }
            ControlKind::Select { options, multiple } => {
                // Selection was resolved at parse time; disabled options
                // stay selectable but are never submitted.
                for option in options.iter().filter(|o| o.selected && !o.disabled) {
                    out.push((self.name.clone(), option.value.clone()));
                    if !*multiple {
                        break;
                    }
                }
            }
        }
    }
}

/// One `<form>` element with live field state and replaceable content.
#[derive(Debug)]
pub struct HtmlForm {
    index: usize,
    id: Option<String>,
    classes: Vec<String>,
    method: String,
    action: String,
    controls: Mutex<Vec<FormControl>>,
    content: Mutex<String>,
}

impl HtmlForm {
    fn from_element(index: usize, form: ElementRef<'_>, base: &url::Url) -> Self {
        let element = form.value();
        let action = resolve_url(base, element.attr("action").unwrap_or("").trim());
        let method = element.attr("method").unwrap_or("GET").to_uppercase();

        let mut controls: Vec<FormControl> = form
            .select(control_selector())
            .filter_map(parse_control)
            .collect();
        keep_last_checked_radio(&mut controls);

        Self {
            index,
            id: element.attr("id").map(String::from),
            classes: element.classes().map(String::from).collect(),
            method,
            action,
            controls: Mutex::new(controls),
            content: Mutex::new(form.inner_html()),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The declared method. Relayed submissions always POST.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Current inner HTML of the form.
    pub fn content(&self) -> String {
        lock(&self.content).clone()
    }

    pub fn summary(&self) -> FormSummary {
        FormSummary {
            index: self.index,
            id: self.id.clone(),
            classes: self.classes.clone(),
            method: self.method.clone(),
            action: self.action.clone(),
            fields: self.field_snapshot(),
        }
    }

    /// Set a field the way a user would.
    ///
    /// Text inputs and textareas take the value as typed; checkboxes and
    /// radios check the control carrying `value`; selects select the option
    /// carrying `value`.
    pub fn set_field(&self, name: &str, value: &str) -> RelayResult<()> {
        let mut controls = lock(&self.controls);
        let first = controls
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| RelayError::UnknownField(name.to_string()))?;

        if matches!(
            controls[first].kind,
            ControlKind::Checkbox { .. } | ControlKind::Radio { .. }
        ) {
            drop(controls);
            return self.set_checked(name, value, true);
        }

        match &mut controls[first].kind {
            ControlKind::Text { value: current } => *current = value.to_string(),
            ControlKind::Select { options, multiple } => {
                if !options.iter().any(|o| o.value == value && !o.disabled) {
                    return Err(RelayError::UnknownField(format!("{name}={value}")));
                }
                let multiple = *multiple;
                for option in options.iter_mut() {
                    if option.value == value {
                        option.selected = true;
                    } else if !multiple {
                        option.selected = false;
                    }
                }
            }
            ControlKind::Checkbox { .. } | ControlKind::Radio { .. } => {}
        }
        Ok(())
    }

    /// Check or uncheck the checkbox or radio named `name` whose value is
    /// `value`. Checking a radio unchecks the rest of its group.
    pub fn set_checked(&self, name: &str, value: &str, checked: bool) -> RelayResult<()> {
        let mut controls = lock(&self.controls);
        let target = controls
            .iter()
            .position(|c| {
                c.name == name
                    && matches!(
                        &c.kind,
                        ControlKind::Checkbox { value: v, .. } | ControlKind::Radio { value: v, .. }
                            if v == value
                    )
            })
            .ok_or_else(|| RelayError::UnknownField(format!("{name}={value}")))?;

        let is_radio = matches!(controls[target].kind, ControlKind::Radio { .. });
        for (i, control) in controls.iter_mut().enumerate() {
            match &mut control.kind {
                ControlKind::Checkbox { checked: c, .. } if i == target => *c = checked,
                ControlKind::Radio { checked: c, .. } if i == target => *c = checked,
                ControlKind::Radio { checked: c, .. }
                    if is_radio && checked && control.name == name =>
                {
                    *c = false
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl SubmissionTarget for HtmlForm {
    fn class_list(&self) -> Vec<String> {
        self.classes.clone()
    }

    fn action_url(&self) -> String {
        self.action.clone()
    }

    fn field_snapshot(&self) -> FormPayload {
        let controls = lock(&self.controls);
        let mut pairs = Vec::new();
        for control in controls.iter() {
            control.submitted_values(&mut pairs);
        }
        FormPayload::from_pairs(pairs)
    }

    fn replace_content(&self, html: &str) {
        *lock(&self.content) = html.to_string();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn form_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("form").expect("form selector is valid"))
}

fn control_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse("input, select, textarea").expect("control selector is valid")
    })
}

fn option_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("option").expect("option selector is valid"))
}

/// Turn a control element into a [`FormControl`], or `None` when the browser
/// would never include it in a submission.
fn parse_control(el: ElementRef<'_>) -> Option<FormControl> {
    let element = el.value();
    let name = element.attr("name").unwrap_or("");
    if name.is_empty() || element.attr("disabled").is_some() {
        return None;
    }

    let kind = match element.name() {
        "textarea" => {
            ControlKind::Text {
                value: el.text().collect(),
            }
        }
        "select" => {
            let multiple = element.attr("multiple").is_some();
            let mut options: Vec<SelectOption> = el
                .select(option_selector())
                .map(|o| SelectOption {
                    value: o
                        .value()
                        .attr("value")
                        .map(String::from)
                        .unwrap_or_else(|| collapse_whitespace(&o.text().collect::<String>())),
                    selected: o.value().attr("selected").is_some(),
                    disabled: option_disabled(o),
                })
                .collect();
            if !multiple {
                // A single select keeps only its last `selected` option, or
                // falls back to the first enabled one.
                let chosen = options
                    .iter()
                    .rposition(|o| o.selected)
                    .or_else(|| options.iter().position(|o| !o.disabled));
                for (i, option) in options.iter_mut().enumerate() {
                    option.selected = Some(i) == chosen;
                }
            }
            ControlKind::Select { options, multiple }
        }
        _ => {
            let input_type = element.attr("type").unwrap_or("text").to_ascii_lowercase();
            let value = element.attr("value").unwrap_or("").to_string();
            let checked = element.attr("checked").is_some();
            // `on` only stands in for a missing attribute, not an empty one.
            let checkable_value = element
                .attr("value")
                .map(String::from)
                .unwrap_or_else(|| "on".to_string());
            match input_type.as_str() {
                "button" | "submit" | "reset" | "file" | "image" => return None,
                "checkbox" => ControlKind::Checkbox {
                    value: checkable_value,
                    checked,
                },
                "radio" => ControlKind::Radio {
                    value: checkable_value,
                    checked,
                },
                _ => ControlKind::Text { value },
            }
        }
    };

    Some(FormControl {
        name: name.to_string(),
        kind,
    })
}

/// An option is disabled on its own or through a disabled `<optgroup>`.
fn option_disabled(option: ElementRef<'_>) -> bool {
    option.value().attr("disabled").is_some()
        || option
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|p| p.name() == "optgroup" && p.attr("disabled").is_some())
}

/// A radio group has at most one checked member: the last one in source order.
fn keep_last_checked_radio(controls: &mut [FormControl]) {
    for i in (0..controls.len()).rev() {
        if !matches!(controls[i].kind, ControlKind::Radio { checked: true, .. }) {
            continue;
        }
        let (before, rest) = controls.split_at_mut(i);
        let name = &rest[0].name;
        for control in before.iter_mut().filter(|c| &c.name == name) {
            if let ControlKind::Radio { checked, .. } = &mut control.kind {
                *checked = false;
            }
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_url(base: &url::Url, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    match base.join(relative) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => relative.to_string(),
    }
}
