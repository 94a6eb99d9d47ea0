//! The structured contract form: named fields plus an ordered list of free-form sections.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::engine::Outcome;
use crate::error::{BuilderError, BuilderResult};
use crate::ids::IdGenerator;

/// An amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    pub const fn from_dollars(dollars: u64) -> Self {
        Money(dollars * 100)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }
}

/// `$1,234.56`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = (self.0 / 100).to_string();
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (i, c) in dollars.chars().enumerate() {
            if i > 0 && (dollars.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(f, "${}.{:02}", grouped, self.0 % 100)
    }
}

/// Accepts `$1,234.56`, `1234.5`, `85`.
impl FromStr for Money {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BuilderError::ExtractionMiss {
            field: format!("money value '{}'", s),
        };
        let cleaned: String = s
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        let (whole, frac) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || frac.len() > 2
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let dollars: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .map(Money)
            .ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Paragraph,
    Policy,
    Terms,
    Emergency,
    Medical,
    #[default]
    Custom,
}

impl SectionKind {
    /// Infer a kind from title keywords (case-insensitive substring match).
    pub fn infer(title: &str) -> Self {
        let t = title.to_lowercase();
        if t.contains("policy") {
            SectionKind::Policy
        } else if t.contains("terms") || t.contains("agreement") {
            SectionKind::Terms
        } else if t.contains("introduction") || t.contains("overview") {
            SectionKind::Paragraph
        } else if t.contains("emergency") {
            SectionKind::Emergency
        } else if t.contains("medical") || t.contains("health") {
            SectionKind::Medical
        } else {
            SectionKind::Custom
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Paragraph => "paragraph",
            SectionKind::Policy => "policy",
            SectionKind::Terms => "terms",
            SectionKind::Emergency => "emergency",
            SectionKind::Medical => "medical",
            SectionKind::Custom => "custom",
        }
    }

    /// Inverse of [`SectionKind::as_str`].
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "paragraph" => Some(SectionKind::Paragraph),
            "policy" => Some(SectionKind::Policy),
            "terms" => Some(SectionKind::Terms),
            "emergency" => Some(SectionKind::Emergency),
            "medical" => Some(SectionKind::Medical),
            "custom" => Some(SectionKind::Custom),
            _ => None,
        }
    }
}

/// A titled block of HTML content in the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub kind: SectionKind,
    /// Always equal to the section's position in [`FormModel::sections`].
    #[serde(default)]
    pub order: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
}

/// The plain-English editing surface of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormModel {
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    pub season: String,
    pub recreational_fee: Money,
    pub competitive_fee: Money,
    pub elite_fee: Money,
    pub registration_fee: Money,
    /// Day of the month tuition is due.
    pub payment_due_day: u8,
    /// Day of the month invoices go out.
    pub invoice_day: u8,
    pub late_fee: Money,
    pub late_fee_grace_days: u32,
    pub termination_notice_days: u32,
    pub sections: Vec<Section>,
}

impl Default for FormModel {
    fn default() -> Self {
        Self {
            company_name: "Your Studio Name".to_string(),
            company_address: String::new(),
            company_phone: String::new(),
            company_email: String::new(),
            season: "2025-2026".to_string(),
            recreational_fee: Money::from_dollars(85),
            competitive_fee: Money::from_dollars(125),
            elite_fee: Money::from_dollars(165),
            registration_fee: Money::from_dollars(50),
            payment_due_day: 1,
            invoice_day: 25,
            late_fee: Money::from_dollars(15),
            late_fee_grace_days: 5,
            termination_notice_days: 30,
            sections: Vec::new(),
        }
    }
}

impl FormModel {
    /// Default field values plus the built-in policy sections.
    pub fn with_default_sections(ids: &mut IdGenerator) -> Self {
        Self {
            sections: default_sections(ids),
            ..Self::default()
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_ids(&self) -> HashSet<String> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }

    /// Insert a new section at `index` (clamped). Returns its id.
    pub fn add_section(
        &mut self,
        ids: &mut IdGenerator,
        title: impl Into<String>,
        content: impl Into<String>,
        kind: SectionKind,
        index: usize,
    ) -> String {
        let id = ids.next_id(&self.section_ids());
        let at = index.min(self.sections.len());
        self.sections.insert(
            at,
            Section {
                id: id.clone(),
                title: title.into(),
                content: content.into(),
                kind,
                order: at,
            },
        );
        self.renumber();
        id
    }

    pub fn remove_section(&mut self, id: &str) -> Outcome {
        let Some(pos) = self.position(id) else {
            return Outcome::Unchanged;
        };
        self.sections.remove(pos);
        self.renumber();
        Outcome::Changed
    }

    pub fn move_section(&mut self, from: usize, to: usize) -> Outcome {
        let len = self.sections.len();
        if from >= len || to >= len || from == to {
            return Outcome::Unchanged;
        }
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
        self.renumber();
        Outcome::Changed
    }

    /// Copy the section with `id` into the slot right after it. Returns the copy's id.
    pub fn duplicate_section(&mut self, ids: &mut IdGenerator, id: &str) -> BuilderResult<String> {
        let pos = self.position(id).ok_or_else(|| BuilderError::NotFound {
            id: id.to_string(),
        })?;
        let mut copy = self.sections[pos].clone();
        copy.id = ids.next_id(&self.section_ids());
        let copy_id = copy.id.clone();
        self.sections.insert(pos + 1, copy);
        self.renumber();
        Ok(copy_id)
    }

    pub fn update_section(&mut self, id: &str, patch: &SectionPatch) -> Outcome {
        let Some(pos) = self.position(id) else {
            return Outcome::Unchanged;
        };
        let section = &mut self.sections[pos];
        let before = section.clone();
        if let Some(title) = &patch.title {
            section.title = title.clone();
        }
        if let Some(content) = &patch.content {
            section.content = content.clone();
        }
        if let Some(kind) = patch.kind {
            section.kind = kind;
        }
        if *section == before {
            Outcome::Unchanged
        } else {
            Outcome::Changed
        }
    }

    /// Replace the section list, renumbering to match the new positions.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
        self.renumber();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    fn renumber(&mut self) {
        for (i, s) in self.sections.iter_mut().enumerate() {
            s.order = i;
        }
    }
}

pub const ATTENDANCE_POLICY_TITLE: &str = "Attendance Policy";
pub const INJURY_POLICY_TITLE: &str = "Injury & Liability Policy";
pub const CONDUCT_POLICY_TITLE: &str = "Conduct Policy";

/// The built-in policy set used for new contracts and as the recovery fallback.
pub fn default_sections(ids: &mut IdGenerator) -> Vec<Section> {
    let defaults = [
        (
            ATTENDANCE_POLICY_TITLE,
            "<p>Regular attendance is expected. Please notify the studio at least 24 hours \
             before an absence. Missed classes may be made up within 30 days and are not \
             refunded.</p>",
        ),
        (
            INJURY_POLICY_TITLE,
            "<p>Dance is a physical activity with an inherent risk of injury. The \
             parent/guardian assumes that risk and releases the studio, its owners and its \
             instructors from liability for injuries sustained during classes, rehearsals and \
             performances.</p>",
        ),
        (
            CONDUCT_POLICY_TITLE,
            "<p>Students are expected to treat instructors, classmates and studio property \
             with respect. The studio may suspend or dismiss a student for repeated disruptive \
             behavior without refund.</p>",
        ),
    ];

    let mut taken = HashSet::new();
    defaults
        .into_iter()
        .enumerate()
        .map(|(order, (title, content))| {
            let id = ids.next_id(&taken);
            taken.insert(id.clone());
            Section {
                id,
                title: title.to_string(),
                content: content.to_string(),
                kind: SectionKind::Policy,
                order,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn orders(form: &FormModel) -> Vec<usize> {
        form.sections.iter().map(|s| s.order).collect()
    }

    #[test]
    fn test_money_display_groups_thousands() {
        assert_eq!(Money::from_cents(8500).to_string(), "$85.00");
        assert_eq!(Money::from_cents(123456).to_string(), "$1,234.56");
        assert_eq!(Money::from_cents(100000000).to_string(), "$1,000,000.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn test_money_parses_loose_input() {
        assert_eq!("$1,234.56".parse::<Money>().unwrap(), Money::from_cents(123456));
        assert_eq!("85".parse::<Money>().unwrap(), Money::from_dollars(85));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("$".parse::<Money>().is_err());
    }

    #[test]
    fn test_kind_inference_keywords() {
        assert_eq!(SectionKind::infer("Refund POLICY"), SectionKind::Policy);
        assert_eq!(SectionKind::infer("Terms of Service"), SectionKind::Terms);
        assert_eq!(SectionKind::infer("Costume Agreement"), SectionKind::Terms);
        assert_eq!(SectionKind::infer("Program Overview"), SectionKind::Paragraph);
        assert_eq!(SectionKind::infer("Emergency Contacts"), SectionKind::Emergency);
        assert_eq!(SectionKind::infer("Health Information"), SectionKind::Medical);
        assert_eq!(SectionKind::infer("Recital Photos"), SectionKind::Custom);
    }

    #[test]
    fn test_section_mutations_keep_order_dense() {
        let mut ids = IdGenerator::counter("section");
        let mut form = FormModel::with_default_sections(&mut ids);
        assert_eq!(orders(&form), vec![0, 1, 2]);

        let added = form.add_section(&mut ids, "Dress Code", "<p>Black leotard.</p>", SectionKind::Custom, 1);
        assert_eq!(form.sections[1].id, added);
        assert_eq!(orders(&form), vec![0, 1, 2, 3]);

        assert_eq!(form.move_section(0, 3), Outcome::Changed);
        assert_eq!(orders(&form), vec![0, 1, 2, 3]);
        assert_eq!(form.sections[3].title, ATTENDANCE_POLICY_TITLE);

        let first = form.sections[0].id.clone();
        assert_eq!(form.remove_section(&first), Outcome::Changed);
        assert_eq!(orders(&form), vec![0, 1, 2]);

        let dup = form.duplicate_section(&mut ids, &added).unwrap_or_default();
        assert_eq!(orders(&form), vec![0, 1, 2, 3]);
        assert_ne!(dup, added);
    }

    #[test]
    fn test_absent_section_ids_are_noops() {
        let mut form = FormModel::default();
        assert_eq!(form.remove_section("nope"), Outcome::Unchanged);
        assert_eq!(
            form.update_section("nope", &SectionPatch::default()),
            Outcome::Unchanged
        );
        assert_eq!(form.move_section(0, 1), Outcome::Unchanged);
    }

    #[test]
    fn test_update_section_patches_fields() {
        let mut ids = IdGenerator::counter("section");
        let mut form = FormModel::default();
        let id = form.add_section(&mut ids, "Old", "", SectionKind::Custom, 0);
        let patch = SectionPatch {
            title: Some("Refund Policy".to_string()),
            kind: Some(SectionKind::Policy),
            ..SectionPatch::default()
        };
        assert_eq!(form.update_section(&id, &patch), Outcome::Changed);
        assert_eq!(form.section(&id).map(|s| s.kind), Some(SectionKind::Policy));
        assert_eq!(form.update_section(&id, &patch), Outcome::Unchanged);
    }

    #[test]
    fn test_form_serialises_camel_case() {
        let json = serde_json::to_value(FormModel::default()).unwrap();
        assert_eq!(json["companyName"], "Your Studio Name");
        assert_eq!(json["lateFee"], 1500);
        assert_eq!(json["terminationNoticeDays"], 30);
    }
}
