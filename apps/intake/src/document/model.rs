//! Document Model Builder: normalized groups → ordered, render-ready tree.
//!
//! Section order is fixed: Personal, Education, Language, WorkHistory,
//! Referee, Additional. A repeated section with no items is left out of the
//! model entirely.

use serde::Serialize;

use crate::catalog::Group;
use crate::document::normalizer::{NormalizedGroup, NormalizedRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedSection {
    pub kind: Group,
    pub items: Vec<NormalizedGroup>,
}

impl RepeatedSection {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    pub applicant: String,
    pub personal_info: NormalizedGroup,
    pub repeated_sections: Vec<RepeatedSection>,
    pub additional_info: NormalizedGroup,
}

impl DocumentModel {
    pub fn section(&self, kind: Group) -> Option<&RepeatedSection> {
        self.repeated_sections.iter().find(|s| s.kind == kind)
    }

    /// Groups that will appear in the document, in document order.
    /// Personal is always present; Additional only when populated.
    pub fn visible_groups(&self) -> Vec<Group> {
        let mut groups = vec![Group::Personal];
        groups.extend(self.repeated_sections.iter().map(|s| s.kind));
        if !self.additional_info.is_empty() {
            groups.push(Group::Additional);
        }
        groups
    }
}

/// Projects a normalized record into a document model. Pure; no I/O.
pub fn build(record: &NormalizedRecord) -> DocumentModel {
    let repeated_sections = Group::REPEATED
        .iter()
        .map(|&kind| (kind, record.repeated(kind)))
        .filter(|(_, items)| !items.is_empty())
        .map(|(kind, items)| RepeatedSection {
            kind,
            items: items.to_vec(),
        })
        .collect();

    DocumentModel {
        applicant: record.applicant.clone(),
        personal_info: record.personal.clone(),
        repeated_sections,
        additional_info: record.additional.clone(),
    }
}
