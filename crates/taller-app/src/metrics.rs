// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::listing::same_text;
use crate::{ListRecord, Money, RecordField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition<F> {
    Equals(F, &'static str),
    OneOf(F, &'static [&'static str]),
    Not(Box<Condition<F>>),
}

impl<F: RecordField> Condition<F> {
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn holds<T: ListRecord<Field = F>>(&self, record: &T) -> bool {
        match self {
            Self::Equals(field, wanted) => record
                .value(*field)
                .as_text()
                .is_some_and(|value| same_text(value, wanted)),
            Self::OneOf(field, options) => record
                .value(*field)
                .as_text()
                .is_some_and(|value| options.iter().any(|option| same_text(value, option))),
            Self::Not(inner) => !inner.holds(record),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSpec<F> {
    Count {
        label: &'static str,
    },
    CountWhere {
        label: &'static str,
        condition: Condition<F>,
    },
    SumBy {
        label: &'static str,
        field: F,
    },
    SumByWhere {
        label: &'static str,
        field: F,
        condition: Condition<F>,
    },
    /// One metric per distinct value of `field`, labelled by the value.
    DistributionBy {
        field: F,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    Count(usize),
    Money(Money),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetric {
    pub label: String,
    pub value: MetricValue,
    pub porcentaje: Option<f64>,
    /// Business data supplied alongside the records; never derived here.
    pub trend: Option<Trend>,
}

impl DerivedMetric {
    fn new(label: impl Into<String>, value: MetricValue) -> Self {
        Self {
            label: label.into(),
            value,
            porcentaje: None,
            trend: None,
        }
    }
}

pub fn compute_metrics<'a, T: ListRecord>(
    records: impl IntoIterator<Item = &'a T>,
    specs: &[MetricSpec<T::Field>],
) -> Vec<DerivedMetric> {
    let records: Vec<&T> = records.into_iter().collect();
    let mut metrics = Vec::with_capacity(specs.len());
    for spec in specs {
        match spec {
            MetricSpec::Count { label } => {
                metrics.push(DerivedMetric::new(*label, MetricValue::Count(records.len())));
            }
            MetricSpec::CountWhere { label, condition } => {
                let count = records
                    .iter()
                    .filter(|record| condition.holds(**record))
                    .count();
                metrics.push(DerivedMetric::new(*label, MetricValue::Count(count)));
            }
            MetricSpec::SumBy { label, field } => {
                let total = sum_money(records.iter().copied(), *field);
                metrics.push(DerivedMetric::new(*label, MetricValue::Money(total)));
            }
            MetricSpec::SumByWhere {
                label,
                field,
                condition,
            } => {
                let matching = records
                    .iter()
                    .copied()
                    .filter(|record| condition.holds(*record));
                let total = sum_money(matching, *field);
                metrics.push(DerivedMetric::new(*label, MetricValue::Money(total)));
            }
            MetricSpec::DistributionBy { field } => {
                metrics.extend(distribution(&records, *field));
            }
        }
    }
    metrics
}

fn sum_money<'a, T: ListRecord>(records: impl Iterator<Item = &'a T>, field: T::Field) -> Money {
    records
        .filter_map(|record| record.value(field).as_money())
        .fold(Money::ZERO, Money::saturating_add)
}

/// Buckets keep first-seen order and the first spelling seen as their
/// label. Values differing only in case share a bucket, as they do in
/// filters and conditions; absent values share the empty label.
fn distribution<T: ListRecord>(records: &[&T], field: T::Field) -> Vec<DerivedMetric> {
    let mut buckets: Vec<(String, usize)> = Vec::new();
    for record in records {
        let value = record.value(field).as_text().unwrap_or_default().trim();
        match buckets.iter_mut().find(|(label, _)| same_text(label, value)) {
            Some((_, count)) => *count += 1,
            None => buckets.push((value.to_owned(), 1)),
        }
    }

    let total = records.len();
    buckets
        .into_iter()
        .map(|(label, count)| {
            let porcentaje = if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            };
            DerivedMetric {
                porcentaje: Some(porcentaje),
                ..DerivedMetric::new(label, MetricValue::Count(count))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Condition, MetricSpec, MetricValue, compute_metrics};
    use crate::catalog::ServiceBudgetField;
    use crate::{Money, ServiceBudget, ServiceBudgetId};

    fn budget(id: i64, status: Option<&str>, cents: Option<i64>) -> ServiceBudget {
        ServiceBudget {
            id: ServiceBudgetId::new(id),
            number: format!("PS-{id:03}"),
            customer: None,
            description: None,
            issued_on: None,
            valid_until: None,
            status: status.map(str::to_owned),
            total: cents.map(Money::from_cents),
        }
    }

    fn distribution_spec() -> Vec<MetricSpec<ServiceBudgetField>> {
        vec![MetricSpec::DistributionBy {
            field: ServiceBudgetField::Status,
        }]
    }

    #[test]
    fn distribution_counts_in_first_seen_order() {
        let records = [
            budget(1, Some("Pendiente"), None),
            budget(2, Some("Aprobado"), None),
            budget(3, Some("Aprobado"), None),
        ];
        let metrics = compute_metrics(&records, &distribution_spec());
        let summary: Vec<(&str, MetricValue, f64)> = metrics
            .iter()
            .map(|metric| {
                (
                    metric.label.as_str(),
                    metric.value,
                    metric.porcentaje.expect("distribution has percentages"),
                )
            })
            .collect();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].0, "Pendiente");
        assert_eq!(summary[0].1, MetricValue::Count(1));
        assert!((summary[0].2 - 33.33).abs() < 0.01);
        assert_eq!(summary[1].0, "Aprobado");
        assert_eq!(summary[1].1, MetricValue::Count(2));
        assert!((summary[1].2 - 66.67).abs() < 0.01);
    }

    #[test]
    fn distribution_percentages_sum_to_one_hundred() {
        let statuses = [
            Some("pendiente"),
            Some("aprobado"),
            None,
            Some("rechazado"),
            Some("pendiente"),
            Some("vencido"),
            None,
        ];
        let records: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| budget(index as i64, *status, None))
            .collect();
        let metrics = compute_metrics(&records, &distribution_spec());
        let sum: f64 = metrics.iter().filter_map(|metric| metric.porcentaje).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!(metrics.iter().any(|metric| metric.label.is_empty()));
    }

    #[test]
    fn distribution_of_nothing_is_empty() {
        let records: Vec<ServiceBudget> = Vec::new();
        assert!(compute_metrics(&records, &distribution_spec()).is_empty());
    }

    #[test]
    fn counts_and_sums_respect_conditions() {
        let records = [
            budget(1, Some("aprobado"), Some(10_000)),
            budget(2, Some("APROBADO"), Some(5_050)),
            budget(3, Some("rechazado"), Some(99_900)),
            budget(4, None, None),
        ];
        let approved = Condition::Equals(ServiceBudgetField::Status, "aprobado");
        let specs = vec![
            MetricSpec::Count { label: "Total" },
            MetricSpec::CountWhere {
                label: "Aprobados",
                condition: approved.clone(),
            },
            MetricSpec::CountWhere {
                label: "Sin aprobar",
                condition: approved.clone().not(),
            },
            MetricSpec::SumBy {
                label: "Monto",
                field: ServiceBudgetField::Total,
            },
            MetricSpec::SumByWhere {
                label: "Monto aprobado",
                field: ServiceBudgetField::Total,
                condition: approved,
            },
        ];
        let values: Vec<MetricValue> = compute_metrics(&records, &specs)
            .into_iter()
            .map(|metric| metric.value)
            .collect();
        assert_eq!(
            values,
            vec![
                MetricValue::Count(4),
                MetricValue::Count(2),
                MetricValue::Count(2),
                MetricValue::Money(Money::from_cents(114_950)),
                MetricValue::Money(Money::from_cents(15_050)),
            ]
        );
    }

    #[test]
    fn one_of_matches_any_listed_value() {
        let condition = Condition::OneOf(ServiceBudgetField::Status, &["aprobado", "vencido"]);
        assert!(condition.holds(&budget(1, Some("Vencido"), None)));
        assert!(!condition.holds(&budget(2, Some("pendiente"), None)));
        assert!(!condition.holds(&budget(3, None, None)));
    }

    #[test]
    fn distribution_groups_case_variants_like_conditions_do() {
        let records = [
            budget(1, Some("Aprobado"), None),
            budget(2, Some("aprobado"), None),
            budget(3, Some(" APROBADO "), None),
            budget(4, Some("pendiente"), None),
        ];
        let approved = MetricSpec::CountWhere {
            label: "Aprobados",
            condition: Condition::Equals(ServiceBudgetField::Status, "aprobado"),
        };
        let mut specs = distribution_spec();
        specs.insert(0, approved);
        let metrics = compute_metrics(&records, &specs);

        assert_eq!(metrics[0].value, MetricValue::Count(3));
        let buckets: Vec<(&str, MetricValue)> = metrics[1..]
            .iter()
            .map(|metric| (metric.label.as_str(), metric.value))
            .collect();
        assert_eq!(
            buckets,
            vec![
                ("Aprobado", MetricValue::Count(3)),
                ("pendiente", MetricValue::Count(1)),
            ]
        );
        assert!((metrics[1].porcentaje.expect("share") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn computed_metrics_carry_no_trend() {
        let records = [budget(1, None, None)];
        let metrics = compute_metrics(&records, &[MetricSpec::Count { label: "Total" }]);
        assert_eq!(metrics[0].trend, None);
    }
}
