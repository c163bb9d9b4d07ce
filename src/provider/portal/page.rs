//! WebForms page parsing
//!
//! The portal is an ASP.NET WebForms page: every dropdown change posts the
//! whole form back (`__doPostBack`), carrying hidden state such as
//! `__VIEWSTATE` and `__EVENTVALIDATION`. [`PortalPage`] captures what a
//! browser would submit from a rendered page, as owned data.

use scraper::{ElementRef, Html, Selector};

use crate::error::TariffError;

/// A `<select>` element on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropdown {
    /// Form field name (the control's unique id, used as postback target)
    pub name: String,
    /// Whitespace-normalized text of the table row holding the control
    pub row_text: String,
    /// Option values in page order
    pub options: Vec<String>,
}

impl Dropdown {
    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// Snapshot of a rendered portal page
#[derive(Debug, Clone)]
pub struct PortalPage {
    /// Form `action` attribute, relative to the page URL
    pub action: Option<String>,
    /// Fields a browser would submit, in document order
    pub fields: Vec<(String, String)>,
    pub dropdowns: Vec<Dropdown>,
    pub body: String,
}

impl PortalPage {
    /// Parse the first form of `body`
    pub fn parse(body: String) -> Result<Self, TariffError> {
        let document = Html::parse_document(&body);

        let form_selector = selector("form")?;
        let form = document
            .select(&form_selector)
            .next()
            .ok_or_else(|| TariffError::Extraction("page has no form".to_string()))?;

        let action = form.value().attr("action").map(str::to_string);
        let fields = collect_fields(form)?;
        let dropdowns = collect_dropdowns(form)?;

        Ok(Self {
            action,
            fields,
            dropdowns,
            body,
        })
    }

    /// Dropdown whose table row mentions `label`
    pub fn dropdown(&self, label: &str) -> Result<&Dropdown, TariffError> {
        self.dropdowns
            .iter()
            .find(|d| d.row_text.contains(label))
            .ok_or_else(|| {
                TariffError::Extraction(format!("no dropdown labelled '{}' on the page", label))
            })
    }

    /// Form fields for posting back a change of `target` to `value`
    pub fn postback_fields(&self, target: &str, value: &str) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .fields
            .iter()
            .filter(|(name, _)| {
                name != "__EVENTTARGET" && name != "__EVENTARGUMENT" && name != target
            })
            .cloned()
            .collect();

        fields.push(("__EVENTTARGET".to_string(), target.to_string()));
        fields.push(("__EVENTARGUMENT".to_string(), String::new()));
        fields.push((target.to_string(), value.to_string()));
        fields
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, TariffError> {
    Selector::parse(css)
        .map_err(|e| TariffError::Extraction(format!("invalid selector '{}': {}", css, e)))
}

pub(crate) fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_fields(form: ElementRef<'_>) -> Result<Vec<(String, String)>, TariffError> {
    let control_selector = selector("input[name], select[name], textarea[name]")?;
    let option_selector = selector("option")?;
    let mut fields = Vec::new();

    for control in form.select(&control_selector) {
        let element = control.value();
        let Some(name) = element.attr("name") else {
            continue;
        };

        match element.name() {
            "input" => {
                let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "image" | "reset" | "file" => continue,
                    "checkbox" | "radio" if element.attr("checked").is_none() => continue,
                    _ => {}
                }
                let value = element.attr("value").unwrap_or_default();
                fields.push((name.to_string(), value.to_string()));
            }
            "select" => {
                if let Some(value) = selected_value(control, &option_selector) {
                    fields.push((name.to_string(), value));
                }
            }
            _ => fields.push((name.to_string(), control.text().collect())),
        }
    }

    Ok(fields)
}

fn collect_dropdowns(form: ElementRef<'_>) -> Result<Vec<Dropdown>, TariffError> {
    let select_selector = selector("select[name]")?;
    let option_selector = selector("option")?;

    let dropdowns = form
        .select(&select_selector)
        .filter_map(|select| {
            let name = select.value().attr("name")?.to_string();
            let row_text = select
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "tr")
                .map(normalized_text)
                .unwrap_or_default();
            let options = select
                .select(&option_selector)
                .map(option_value)
                .collect();

            Some(Dropdown {
                name,
                row_text,
                options,
            })
        })
        .collect();

    Ok(dropdowns)
}

fn option_value(option: ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(value) => value.to_string(),
        None => normalized_text(option),
    }
}

// Browsers submit the first option when none is marked selected
fn selected_value(select: ElementRef<'_>, option_selector: &Selector) -> Option<String> {
    let mut options = select.select(option_selector).peekable();
    let first = options.peek().copied();

    options
        .find(|o| o.value().attr("selected").is_some())
        .or(first)
        .map(option_value)
}
