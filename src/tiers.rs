//! Variable pay earned from teaching classes.
//!
//! A teacher's month is a list of [`ClassTierItem`]s. One class may appear
//! several times when its per-lesson rate changed during the period (for
//! example because the group grew into a higher student-count tier).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::builder::Validate;
use crate::inputs::IntoMoney;
use crate::math::Money;
use crate::types::SalaryError;

/// Per-lesson rate for groups whose size falls in `[min_students, max_students]`.
///
/// `max_students = None` means the bracket is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierRate {
    pub min_students: u32,
    pub max_students: Option<u32>,
    pub rate_per_lesson: Decimal,
}

impl TierRate {
    pub fn new(min_students: u32, max_students: Option<u32>, rate_per_lesson: impl IntoMoney) -> Result<Self, SalaryError> {
        Ok(Self {
            min_students,
            max_students,
            rate_per_lesson: rate_per_lesson.into_money()?,
        })
    }

    pub fn covers(&self, student_count: u32) -> bool {
        student_count >= self.min_students && self.max_students.is_none_or(|max| student_count <= max)
    }
}

/// Ordered, non-overlapping student-count brackets for one class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierRateTable {
    tiers: Vec<TierRate>,
}

impl TierRateTable {
    /// Sorts the brackets by lower bound and validates them.
    pub fn new(mut tiers: Vec<TierRate>) -> Result<Self, SalaryError> {
        tiers.sort_by_key(|t| t.min_students);
        let table = Self { tiers };
        table.validate()?;
        Ok(table)
    }

    pub fn tiers(&self) -> &[TierRate] {
        &self.tiers
    }

    /// Rate of the bracket containing `student_count`, if any.
    pub fn rate_for(&self, student_count: u32) -> Option<Decimal> {
        self.tiers
            .iter()
            .find(|t| t.covers(student_count))
            .map(|t| t.rate_per_lesson)
    }
}

impl Validate for TierRateTable {
    fn validate(&self) -> Result<(), SalaryError> {
        for tier in &self.tiers {
            if tier.rate_per_lesson < Decimal::ZERO {
                return Err(SalaryError::Configuration(format!(
                    "Tier starting at {} students has a negative rate",
                    tier.min_students
                )));
            }
            if let Some(max) = tier.max_students {
                if max < tier.min_students {
                    return Err(SalaryError::Configuration(format!(
                        "Tier {}..={} has an inverted student range",
                        tier.min_students, max
                    )));
                }
            }
        }

        for pair in self.tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            match lower.max_students {
                None => {
                    return Err(SalaryError::Configuration(format!(
                        "Open-ended tier from {} students overlaps tier from {}",
                        lower.min_students, upper.min_students
                    )));
                }
                Some(max) if max >= upper.min_students => {
                    return Err(SalaryError::Configuration(format!(
                        "Tier {}..={} overlaps tier from {} students",
                        lower.min_students, max, upper.min_students
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// One row of variable pay: a number of lessons at one rate for one class.
///
/// `amount` is always `lessons_count * rate_applied` rounded to cents. On
/// deserialization it is recomputed, and a stored amount that disagrees is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", try_from = "ClassTierItemRecord")]
pub struct ClassTierItem {
    pub class_id: Uuid,
    pub class_name: String,
    pub student_count_at_lesson: Option<u32>,
    pub lessons_count: u32,
    pub rate_applied: Decimal,
    pub amount: Decimal,
}

impl ClassTierItem {
    /// Item paid at a flat per-lesson rate; `amount = lessons_count * rate`.
    pub fn new(
        class_id: Uuid,
        class_name: impl Into<String>,
        lessons_count: u32,
        rate_applied: impl IntoMoney,
    ) -> Result<Self, SalaryError> {
        let rate_applied = rate_applied.into_money()?;
        if rate_applied < Decimal::ZERO {
            return Err(SalaryError::invalid_input("rateApplied", rate_applied, "Rate must be non-negative"));
        }
        let amount = Money::new(rate_applied)
            .safe_mul(Decimal::from(lessons_count))?
            .round2();

        Ok(Self {
            class_id,
            class_name: class_name.into(),
            student_count_at_lesson: None,
            lessons_count,
            rate_applied,
            amount: amount.value(),
        })
    }

    /// Item whose rate is looked up from `table` by group size.
    pub fn priced(
        class_id: Uuid,
        class_name: impl Into<String>,
        student_count: u32,
        lessons_count: u32,
        table: &TierRateTable,
    ) -> Result<Self, SalaryError> {
        let rate = table.rate_for(student_count).ok_or_else(|| {
            SalaryError::invalid_input("studentCountAtLesson", student_count, "No tier covers this group size")
        })?;
        Ok(Self::new(class_id, class_name, lessons_count, rate)?.with_student_count(student_count))
    }

    pub fn with_student_count(mut self, student_count: u32) -> Self {
        self.student_count_at_lesson = Some(student_count);
        self
    }
}

/// Wire form of [`ClassTierItem`] before the amount is checked.
#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ClassTierItemRecord {
    class_id: Uuid,
    class_name: String,
    #[serde(default)]
    student_count_at_lesson: Option<u32>,
    lessons_count: u32,
    rate_applied: Decimal,
    #[serde(default)]
    amount: Option<Decimal>,
}

impl TryFrom<ClassTierItemRecord> for ClassTierItem {
    type Error = SalaryError;

    fn try_from(record: ClassTierItemRecord) -> Result<Self, Self::Error> {
        let mut item = ClassTierItem::new(record.class_id, record.class_name, record.lessons_count, record.rate_applied)?;
        item.student_count_at_lesson = record.student_count_at_lesson;
        if let Some(stored) = record.amount {
            if stored != item.amount {
                return Err(SalaryError::invalid_input(
                    "amount",
                    stored,
                    format!("Expected {} for {} lessons at {}", item.amount, item.lessons_count, item.rate_applied),
                ));
            }
        }
        Ok(item)
    }
}

/// Totals for a teacher's period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub base_salary: Decimal,
    pub variable_pay: Decimal,
    pub grand_total: Decimal,
    pub total_lessons: u64,
}

/// Sums variable pay across every item, regardless of class, and adds the
/// optional fixed base salary.
pub fn aggregate(base_salary: Option<Decimal>, items: &[ClassTierItem]) -> Result<TierSummary, SalaryError> {
    let base_salary = base_salary.unwrap_or(Decimal::ZERO);
    let variable_pay = items
        .iter()
        .try_fold(Money::default(), |acc, item| acc.safe_add(item.amount))?
        .round2();
    let grand_total = variable_pay.safe_add(base_salary)?;
    let total_lessons = items.iter().map(|i| u64::from(i.lessons_count)).sum();

    let summary = TierSummary {
        base_salary,
        variable_pay: variable_pay.value(),
        grand_total: grand_total.value(),
        total_lessons,
    };
    tracing::debug!(
        items = items.len(),
        variable_pay = %summary.variable_pay,
        grand_total = %summary.grand_total,
        "aggregated class tier pay"
    );
    Ok(summary)
}

/// All tier rows of one class, for rendering as sub-rows under a class header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    pub class_id: Uuid,
    pub class_name: String,
    pub items: Vec<ClassTierItem>,
    pub lessons: u64,
    pub subtotal: Decimal,
}

/// Groups items by class in first-seen order.
pub fn group_by_class(items: &[ClassTierItem]) -> Result<Vec<ClassGroup>, SalaryError> {
    let mut groups: Vec<ClassGroup> = Vec::new();
    for item in items {
        let existing = groups.iter().position(|g| g.class_id == item.class_id);
        let group = match existing {
            Some(idx) => &mut groups[idx],
            None => {
                groups.push(ClassGroup {
                    class_id: item.class_id,
                    class_name: item.class_name.clone(),
                    items: Vec::new(),
                    lessons: 0,
                    subtotal: Decimal::ZERO,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.lessons += u64::from(item.lessons_count);
        group.subtotal = Money::new(group.subtotal).safe_add(item.amount)?.value();
        group.items.push(item.clone());
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate_table() -> TierRateTable {
        TierRateTable::new(vec![
            TierRate::new(6, Some(10), 900).unwrap(),
            TierRate::new(1, Some(5), 700).unwrap(),
            TierRate::new(11, None, 1100).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_rate_lookup() {
        let table = rate_table();
        assert_eq!(table.tiers()[0].min_students, 1);
        assert_eq!(table.rate_for(1), Some(dec!(700)));
        assert_eq!(table.rate_for(5), Some(dec!(700)));
        assert_eq!(table.rate_for(6), Some(dec!(900)));
        assert_eq!(table.rate_for(40), Some(dec!(1100)));
        assert_eq!(table.rate_for(0), None);
    }

    #[test]
    fn test_invalid_tables() {
        let overlap = TierRateTable::new(vec![
            TierRate::new(1, Some(6), 700).unwrap(),
            TierRate::new(6, None, 900).unwrap(),
        ]);
        assert!(matches!(overlap, Err(SalaryError::Configuration(_))));

        let open_then_more = TierRateTable::new(vec![
            TierRate::new(1, None, 700).unwrap(),
            TierRate::new(10, None, 900).unwrap(),
        ]);
        assert!(open_then_more.is_err());

        assert!(TierRateTable::new(vec![TierRate::new(5, Some(2), 700).unwrap()]).is_err());
        assert!(TierRateTable::new(vec![TierRate::new(1, None, -1).unwrap()]).is_err());
    }

    #[test]
    fn test_item_amount() {
        let item = ClassTierItem::new(Uuid::new_v4(), "English A1", 8, dec!(850.50)).unwrap();
        assert_eq!(item.amount, dec!(6804.00));
        assert!(ClassTierItem::new(Uuid::new_v4(), "English A1", 8, -1).is_err());

        let priced = ClassTierItem::priced(Uuid::new_v4(), "German B2", 7, 4, &rate_table()).unwrap();
        assert_eq!(priced.rate_applied, dec!(900));
        assert_eq!(priced.amount, dec!(3600));
        assert_eq!(priced.student_count_at_lesson, Some(7));

        let uncovered = ClassTierItem::priced(Uuid::new_v4(), "German B2", 0, 4, &rate_table());
        assert!(matches!(uncovered, Err(SalaryError::InvalidInput { .. })));
    }

    #[test]
    fn test_aggregate_with_and_without_base() {
        let class_a = Uuid::new_v4();
        let items = vec![
            ClassTierItem::new(class_a, "English A1", 4, 700).unwrap(),
            ClassTierItem::new(class_a, "English A1", 6, 900).unwrap(),
            ClassTierItem::new(Uuid::new_v4(), "Math", 2, dec!(1250.25)).unwrap(),
        ];

        let summary = aggregate(Some(dec!(20000)), &items).unwrap();
        assert_eq!(summary.variable_pay, dec!(10700.50));
        assert_eq!(summary.grand_total, dec!(30700.50));
        assert_eq!(summary.total_lessons, 12);

        let no_base = aggregate(None, &items).unwrap();
        assert_eq!(no_base.grand_total, no_base.variable_pay);

        let empty = aggregate(Some(dec!(20000)), &[]).unwrap();
        assert_eq!(empty.variable_pay, Decimal::ZERO);
        assert_eq!(empty.grand_total, dec!(20000));
    }

    #[test]
    fn test_grouping_is_presentation_only() {
        let class_a = Uuid::new_v4();
        let class_b = Uuid::new_v4();
        let items = vec![
            ClassTierItem::new(class_a, "English A1", 4, 700).unwrap(),
            ClassTierItem::new(class_b, "Math", 2, 1000).unwrap(),
            ClassTierItem::new(class_a, "English A1", 6, 900).unwrap(),
        ];

        let groups = group_by_class(&items).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].class_id, class_a);
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[0].subtotal, dec!(8200));
        assert_eq!(groups[0].lessons, 10);

        let grouped_total: Decimal = groups.iter().map(|g| g.subtotal).sum();
        assert_eq!(grouped_total, aggregate(None, &items).unwrap().variable_pay);
    }

    #[test]
    fn test_sums_past_decimal_range_report_overflow() {
        let class_id = Uuid::new_v4();
        let items = vec![
            ClassTierItem::new(class_id, "English A1", 1, Decimal::MAX).unwrap(),
            ClassTierItem::new(class_id, "English A1", 1, Decimal::MAX).unwrap(),
        ];
        assert!(matches!(aggregate(None, &items), Err(SalaryError::Overflow { .. })));
        assert!(matches!(group_by_class(&items), Err(SalaryError::Overflow { .. })));

        let single = vec![items[0].clone()];
        assert!(matches!(aggregate(Some(dec!(1)), &single), Err(SalaryError::Overflow { .. })));
    }

    #[test]
    fn test_deserialized_item_amount_is_checked() {
        let class_id = Uuid::new_v4();
        let item = ClassTierItem::new(class_id, "English A1", 8, dec!(850.50)).unwrap();
        let json = serde_json::to_string(&item).unwrap();
        let restored: ClassTierItem = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, item);

        let tampered = json.replace("6804.00", "9999.00");
        assert!(serde_json::from_str::<ClassTierItem>(&tampered).is_err());

        let without_amount = format!(
            r#"{{"classId":"{}","className":"Math","lessonsCount":3,"rateApplied":"1000"}}"#,
            class_id
        );
        let computed: ClassTierItem = serde_json::from_str(&without_amount).unwrap();
        assert_eq!(computed.amount, dec!(3000));

        let negative_rate = without_amount.replace(r#""1000""#, r#""-1""#);
        assert!(serde_json::from_str::<ClassTierItem>(&negative_rate).is_err());
    }

    #[test]
    fn test_tier_types_have_schemas() {
        let schema = serde_json::to_string(&schemars::schema_for!(ClassGroup)).unwrap();
        assert!(schema.contains("subtotal"));
        let schema = serde_json::to_string(&schemars::schema_for!(TierRateTable)).unwrap();
        assert!(schema.contains("ratePerLesson"));
    }
}
