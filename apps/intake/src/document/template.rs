//! Template Renderer: document model → HTML markup via a Tera template.
//!
//! The helpers the template relies on are plain functions handed to
//! [`TemplateRenderer::new`] and registered on the renderer's own `Tera`
//! instance. Nothing is registered globally, so two renderers never share
//! helper state.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

use crate::catalog::{DocumentStrings, Group, Locale};
use crate::document::model::DocumentModel;
use crate::document::normalizer::{Field, NormalizedGroup};

const TEMPLATE_NAME: &str = "resume.html";
const TEMPLATE_SOURCE: &str = include_str!("../../templates/resume.html.tera");

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Pure helper functions available to the template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateHelpers {
    /// Maps a zero-based loop position to the number shown in item titles.
    pub ordinal: fn(usize) -> usize,
    /// Whether a field label mentions a contact indicator.
    pub label_mentions: fn(&str, &str) -> bool,
}

pub fn one_based(index: usize) -> usize {
    index + 1
}

pub fn label_mentions(label: &str, needle: &str) -> bool {
    !needle.is_empty() && label.contains(needle)
}

impl Default for TemplateHelpers {
    fn default() -> Self {
        Self {
            ordinal: one_based,
            label_mentions,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct DocumentView<'a> {
    lang: &'static str,
    dir: &'static str,
    strings: &'static DocumentStrings,
    applicant: &'a str,
    personal_info: &'a NormalizedGroup,
    sections: Vec<SectionView<'a>>,
    additional_info: &'a NormalizedGroup,
    contacts: Vec<ContactView<'a>>,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    kind: Group,
    title: &'static str,
    badge: String,
    item_word: &'static str,
    grid: &'static str,
    items: &'a [NormalizedGroup],
}

#[derive(Debug, Serialize)]
struct ContactView<'a> {
    icon: &'static str,
    label: &'static str,
    value: &'a str,
}

fn grid_class(kind: Group) -> &'static str {
    match kind {
        Group::Language => "grid-3",
        _ => "grid-2",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

pub struct TemplateRenderer {
    tera: Tera,
    locale: Locale,
    helpers: TemplateHelpers,
}

impl TemplateRenderer {
    /// Compiles the resume template and registers `helpers` on a private Tera instance.
    pub fn new(locale: Locale, helpers: TemplateHelpers) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;

        let ordinal = helpers.ordinal;
        tera.register_filter(
            "ordinal",
            move |value: &Value, _args: &HashMap<String, Value>| {
                let index = value
                    .as_u64()
                    .ok_or_else(|| tera::Error::msg("ordinal expects a non-negative integer"))?;
                Ok(Value::from(ordinal(index as usize)))
            },
        );

        Ok(Self {
            tera,
            locale,
            helpers,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Expands `model` into markup. Same model in, same bytes out.
    pub fn render(&self, model: &DocumentModel) -> Result<String, tera::Error> {
        let view = self.view(model);
        let context = Context::from_serialize(&view)?;
        self.tera.render(TEMPLATE_NAME, &context)
    }

    fn view<'a>(&self, model: &'a DocumentModel) -> DocumentView<'a> {
        let sections = model
            .repeated_sections
            .iter()
            .filter(|section| !section.items.is_empty())
            .map(|section| {
                let strings = self.locale.section(section.kind);
                SectionView {
                    kind: section.kind,
                    title: strings.title,
                    badge: format!("{} {}", section.count(), strings.badge_unit),
                    item_word: strings.item_word,
                    grid: grid_class(section.kind),
                    items: &section.items,
                }
            })
            .collect();

        DocumentView {
            lang: self.locale.code(),
            dir: self.locale.direction(),
            strings: self.locale.strings(),
            applicant: &model.applicant,
            personal_info: &model.personal_info,
            sections,
            additional_info: &model.additional_info,
            contacts: self.contacts(model.personal_info.fields()),
        }
    }

    /// Duplicates Personal fields whose label mentions a contact indicator.
    /// A field matching several indicators appears once per indicator.
    fn contacts<'a>(&self, personal: &'a [Field]) -> Vec<ContactView<'a>> {
        let indicators = self.locale.contact_indicators();
        personal
            .iter()
            .flat_map(|field| {
                indicators
                    .iter()
                    .filter(move |indicator| {
                        (self.helpers.label_mentions)(field.label, indicator.needle)
                    })
                    .map(move |indicator| ContactView {
                        icon: indicator.icon,
                        label: field.label,
                        value: &field.value,
                    })
            })
            .collect()
    }
}
