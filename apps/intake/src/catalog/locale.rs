//! Document locales: direction, section chrome and contact indicators.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::Group;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    /// Persian, right-to-left.
    Fa,
}

#[derive(Debug, Error)]
#[error("unknown locale '{0}' (expected 'en' or 'fa')")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fa" => Ok(Locale::Fa),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// Per-section titles. `badge_unit` follows the item count in the section badge.
#[derive(Debug, Clone, Serialize)]
pub struct SectionStrings {
    pub title: &'static str,
    pub badge_unit: &'static str,
    pub item_word: &'static str,
}

/// A substring that marks a Personal label as a contact channel.
#[derive(Debug, Clone, Serialize)]
pub struct ContactIndicator {
    pub needle: &'static str,
    pub icon: &'static str,
}

/// Static document chrome. Nothing here is derived from record data.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStrings {
    pub document_title: &'static str,
    pub personal_title: &'static str,
    pub personal_badge: &'static str,
    pub additional_title: &'static str,
    pub additional_badge: &'static str,
    pub contact_title: &'static str,
    pub footer: &'static str,
}

static EN_STRINGS: DocumentStrings = DocumentStrings {
    document_title: "Professional Resume Form",
    personal_title: "Personal Info",
    personal_badge: "Key details",
    additional_title: "Additional Info",
    additional_badge: "Skills and notes",
    contact_title: "Contact",
    footer: "This resume was generated by the Behman resume management system",
};

static FA_STRINGS: DocumentStrings = DocumentStrings {
    document_title: "فرم رزومه حرفه‌ای",
    personal_title: "اطلاعات فردی",
    personal_badge: "مشخصات اصلی",
    additional_title: "اطلاعات تکمیلی",
    additional_badge: "مهارت‌ها و توضیحات",
    contact_title: "راه‌های ارتباطی",
    footer: "این رزومه به صورت حرفه‌ای توسط سیستم مدیریت رزومه بهمن تولید شده است",
};

static EN_CONTACT: [ContactIndicator; 3] = [
    ContactIndicator { needle: "Phone", icon: "📞" },
    ContactIndicator { needle: "Mobile", icon: "📱" },
    ContactIndicator { needle: "Email", icon: "📧" },
];

static FA_CONTACT: [ContactIndicator; 3] = [
    ContactIndicator { needle: "تلفن", icon: "📞" },
    ContactIndicator { needle: "موبایل", icon: "📱" },
    ContactIndicator { needle: "ایمیل", icon: "📧" },
];

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fa => "fa",
        }
    }

    /// Value for the HTML `dir` attribute.
    pub fn direction(self) -> &'static str {
        match self {
            Locale::En => "ltr",
            Locale::Fa => "rtl",
        }
    }

    pub fn strings(self) -> &'static DocumentStrings {
        match self {
            Locale::En => &EN_STRINGS,
            Locale::Fa => &FA_STRINGS,
        }
    }

    /// Indicators checked against Personal labels, in badge order.
    pub fn contact_indicators(self) -> &'static [ContactIndicator] {
        match self {
            Locale::En => &EN_CONTACT,
            Locale::Fa => &FA_CONTACT,
        }
    }

    /// Chrome for a repeated section. Non-repeated groups get their title only.
    pub fn section(self, group: Group) -> SectionStrings {
        let (title, badge_unit, item_word) = match (self, group) {
            (Locale::En, Group::Education) => ("Education", "entries", "Item"),
            (Locale::En, Group::Language) => ("Language Skills", "languages", "Item"),
            (Locale::En, Group::WorkHistory) => ("Work History", "positions", "Item"),
            (Locale::En, Group::Referee) => ("Referees", "referees", "Item"),
            (Locale::En, Group::Personal) => (EN_STRINGS.personal_title, "", ""),
            (Locale::En, Group::Additional) => (EN_STRINGS.additional_title, "", ""),
            (Locale::Fa, Group::Education) => ("تحصیلات", "مورد", "مورد تحصیلی"),
            (Locale::Fa, Group::Language) => ("مهارت‌های زبانی", "زبان", "زبان"),
            (Locale::Fa, Group::WorkHistory) => ("سوابق کاری", "موقعیت", "موقعیت شغلی"),
            (Locale::Fa, Group::Referee) => ("افراد معرف", "معرف", "معرف"),
            (Locale::Fa, Group::Personal) => (FA_STRINGS.personal_title, "", ""),
            (Locale::Fa, Group::Additional) => (FA_STRINGS.additional_title, "", ""),
        };
        SectionStrings {
            title,
            badge_unit,
            item_word,
        }
    }
}
