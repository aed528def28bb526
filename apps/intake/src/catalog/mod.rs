//! Field Catalog: the static mapping from raw record keys to display labels.
//!
//! Every group is a `static` slice of [`FieldDef`]. The slice order IS the
//! display order downstream; `order` mirrors the slice position so the
//! invariant can be checked. There is no mutation API.

pub mod locale;

use serde::Serialize;

pub use locale::{ContactIndicator, DocumentStrings, Locale, SectionStrings};

// ────────────────────────────────────────────────────────────────────────────
// Groups
// ────────────────────────────────────────────────────────────────────────────

/// A named category of applicant fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Personal,
    Education,
    Language,
    WorkHistory,
    Referee,
    Additional,
}

impl Group {
    /// All groups in document order.
    pub const ALL: [Group; 6] = [
        Group::Personal,
        Group::Education,
        Group::Language,
        Group::WorkHistory,
        Group::Referee,
        Group::Additional,
    ];

    /// Groups that may occur zero or more times per record, in document order.
    pub const REPEATED: [Group; 4] = [
        Group::Education,
        Group::Language,
        Group::WorkHistory,
        Group::Referee,
    ];

    /// The raw record field carrying the array for a repeated group.
    pub fn array_field(self) -> Option<&'static str> {
        match self {
            Group::Education => Some("educations"),
            Group::Language => Some("languages"),
            Group::WorkHistory => Some("workHistories"),
            Group::Referee => Some("referees"),
            Group::Personal | Group::Additional => None,
        }
    }

    pub fn is_repeated(self) -> bool {
        self.array_field().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Personal => "personal",
            Group::Education => "education",
            Group::Language => "language",
            Group::WorkHistory => "work_history",
            Group::Referee => "referee",
            Group::Additional => "additional",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field definitions
// ────────────────────────────────────────────────────────────────────────────

/// One catalog entry: a raw record key, its group, its position and its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub group: Group,
    pub order: u8,
    label_en: &'static str,
    label_fa: &'static str,
}

impl FieldDef {
    const fn new(
        group: Group,
        order: u8,
        key: &'static str,
        label_en: &'static str,
        label_fa: &'static str,
    ) -> Self {
        Self {
            key,
            group,
            order,
            label_en,
            label_fa,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.label_en,
            Locale::Fa => self.label_fa,
        }
    }
}

use Group::{Additional, Education, Language, Personal, Referee, WorkHistory};

static PERSONAL_FIELDS: [FieldDef; 13] = [
    FieldDef::new(Personal, 0, "name", "First Name", "نام"),
    FieldDef::new(Personal, 1, "family", "Family Name", "نام خانوادگی"),
    FieldDef::new(Personal, 2, "birthDate", "Birth Date", "تاریخ تولد"),
    FieldDef::new(Personal, 3, "birthPlace", "Birth Place", "محل تولد"),
    FieldDef::new(Personal, 4, "residenceAddress", "Residence Address", "آدرس محل سکونت"),
    FieldDef::new(Personal, 5, "phoneHome", "Home Phone", "تلفن منزل"),
    FieldDef::new(Personal, 6, "mobile", "Mobile", "موبایل"),
    FieldDef::new(Personal, 7, "email", "Email", "ایمیل"),
    FieldDef::new(Personal, 8, "gender", "Gender", "جنسیت"),
    FieldDef::new(Personal, 9, "maritalStatus", "Marital Status", "وضعیت تأهل"),
    FieldDef::new(Personal, 10, "childrenCount", "Number of Children", "تعداد فرزندان"),
    FieldDef::new(Personal, 11, "religion", "Religion", "مذهب"),
    FieldDef::new(Personal, 12, "militaryStatus", "Military Service Status", "وضعیت سربازی"),
];

static EDUCATION_FIELDS: [FieldDef; 5] = [
    FieldDef::new(Education, 0, "institute", "Institute / University", "مؤسسه/دانشگاه"),
    FieldDef::new(Education, 1, "startDate", "Start Date", "تاریخ شروع"),
    FieldDef::new(Education, 2, "endDate", "End Date", "تاریخ پایان"),
    FieldDef::new(Education, 3, "major", "Major", "رشته"),
    FieldDef::new(Education, 4, "degree", "Degree", "مدرک"),
];

static LANGUAGE_FIELDS: [FieldDef; 3] = [
    FieldDef::new(Language, 0, "name", "Language", "زبان"),
    FieldDef::new(Language, 1, "reading", "Reading", "خواندن"),
    FieldDef::new(Language, 2, "writing", "Writing", "نوشتن"),
];

static WORK_HISTORY_FIELDS: [FieldDef; 11] = [
    FieldDef::new(WorkHistory, 0, "period", "Period", "دوره/بازه زمانی"),
    FieldDef::new(WorkHistory, 1, "company", "Company", "شرکت"),
    FieldDef::new(WorkHistory, 2, "activityType", "Line of Business", "نوع فعالیت"),
    FieldDef::new(WorkHistory, 3, "employeesCount", "Number of Employees", "تعداد کارکنان"),
    FieldDef::new(WorkHistory, 4, "manager", "Direct Manager", "مدیر مستقیم"),
    FieldDef::new(WorkHistory, 5, "position", "Position", "سمت"),
    FieldDef::new(WorkHistory, 6, "supervisedCount", "Direct Reports", "تعداد زیرمجموعه"),
    FieldDef::new(WorkHistory, 7, "salaryStart", "Starting Salary", "حقوق شروع"),
    FieldDef::new(WorkHistory, 8, "salaryEnd", "Final Salary", "حقوق پایان"),
    FieldDef::new(WorkHistory, 9, "description", "Description", "توضیحات"),
    FieldDef::new(WorkHistory, 10, "reasonForLeaving", "Reason for Leaving", "دلیل ترک"),
];

static REFEREE_FIELDS: [FieldDef; 4] = [
    FieldDef::new(Referee, 0, "name", "Name", "نام"),
    FieldDef::new(Referee, 1, "workplace", "Workplace", "محل کار"),
    FieldDef::new(Referee, 2, "position", "Position", "سمت"),
    FieldDef::new(Referee, 3, "phone", "Phone", "تلفن"),
];

static ADDITIONAL_FIELDS: [FieldDef; 6] = [
    FieldDef::new(Additional, 0, "skills", "Skills", "مهارت‌ها"),
    FieldDef::new(Additional, 1, "jobRequested", "Requested Position", "شغل مورد درخواست"),
    FieldDef::new(Additional, 2, "jobExperienceDuration", "Experience Duration", "مدت تجربه"),
    FieldDef::new(Additional, 3, "willingToWorkIn", "Willing to Work In", "مایل به کار در"),
    FieldDef::new(
        Additional,
        4,
        "monthsPerYearInOtherCity",
        "Months per Year Away",
        "ماه‌های کار در شهرستان",
    ),
    FieldDef::new(Additional, 5, "otherInfo", "Other Notes", "سایر توضیحات"),
];

// ────────────────────────────────────────────────────────────────────────────
// Lookups
// ────────────────────────────────────────────────────────────────────────────

/// The catalog for `group`, in display order.
pub fn fields(group: Group) -> &'static [FieldDef] {
    match group {
        Group::Personal => &PERSONAL_FIELDS,
        Group::Education => &EDUCATION_FIELDS,
        Group::Language => &LANGUAGE_FIELDS,
        Group::WorkHistory => &WORK_HISTORY_FIELDS,
        Group::Referee => &REFEREE_FIELDS,
        Group::Additional => &ADDITIONAL_FIELDS,
    }
}

/// Label of `key` within `group`, or `None` for keys the catalog does not know.
pub fn label_for(group: Group, key: &str, locale: Locale) -> Option<&'static str> {
    fields(group)
        .iter()
        .find(|def| def.key == key)
        .map(|def| def.label(locale))
}
