//! Grouping reducer
//!
//! Partitions a flat record list by a key selector and sums a fixed list of
//! amount fields per group. Groups come out in order of first appearance of
//! their key; the reducer never sorts. Grand totals are summed from the
//! records themselves so that [`Grouped::reconciles`] is a real check.

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::format::amount_or_zero;

/// A named amount column and how to read it from a record
pub struct AmountField<R> {
    pub name: &'static str,
    pub get: fn(&R) -> Option<f64>,
}

impl<R> AmountField<R> {
    pub const fn new(name: &'static str, get: fn(&R) -> Option<f64>) -> Self {
        Self { name, get }
    }

    /// Value for one record, missing amounts as zero
    pub fn value(&self, record: &R) -> f64 {
        amount_or_zero((self.get)(record))
    }
}

impl<R> Clone for AmountField<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for AmountField<R> {}

impl<R> fmt::Debug for AmountField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountField")
            .field("name", &self.name)
            .finish()
    }
}

/// Per-field sums, kept in field-list order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    values: Vec<(&'static str, f64)>,
}

impl Totals {
    pub fn zeroed<R>(fields: &[AmountField<R>]) -> Self {
        Self {
            values: fields.iter().map(|f| (f.name, 0.0)).collect(),
        }
    }

    fn add_record<R>(&mut self, fields: &[AmountField<R>], record: &R) {
        for (slot, field) in self.values.iter_mut().zip(fields) {
            slot.1 += field.value(record);
        }
    }

    fn add_totals(&mut self, other: &Totals) {
        for &(name, value) in &other.values {
            match self.values.iter_mut().find(|slot| slot.0 == name) {
                Some(slot) => slot.1 += value,
                None => self.values.push((name, value)),
            }
        }
    }

    /// Sum for a field; unknown fields read as zero
    pub fn get(&self, name: &str) -> f64 {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Totals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One group of records sharing a key
///
/// A leaf group owns its records in `items`. After [`Group::subdivide`] the
/// records move into `subgroups` and `items` is empty; `count` and `totals`
/// are unchanged.
#[derive(Debug, Clone)]
pub struct Group<R> {
    pub key: String,
    pub items: Vec<R>,
    pub subgroups: Vec<Group<R>>,
    pub totals: Totals,
    pub count: usize,
}

impl<R> Group<R> {
    fn new(key: String, fields: &[AmountField<R>]) -> Self {
        Self {
            key,
            items: Vec::new(),
            subgroups: Vec::new(),
            totals: Totals::zeroed(fields),
            count: 0,
        }
    }

    fn push(&mut self, record: R, fields: &[AmountField<R>]) {
        self.totals.add_record(fields, &record);
        self.count += 1;
        self.items.push(record);
    }

    /// Split this group's records by a second key
    pub fn subdivide<F>(self, key_of: F, fields: &[AmountField<R>]) -> Self
    where
        F: Fn(&R) -> String,
    {
        let Group {
            key,
            items,
            subgroups,
            totals,
            count,
        } = self;

        let items = if subgroups.is_empty() {
            items
        } else {
            subgroups.into_iter().flat_map(Group::into_records).collect()
        };

        Self {
            key,
            items: Vec::new(),
            subgroups: partition(items, &key_of, fields),
            totals,
            count,
        }
    }

    pub fn is_nested(&self) -> bool {
        !self.subgroups.is_empty()
    }

    /// Every record in this group, in input order within each subgroup
    pub fn records(&self) -> Vec<&R> {
        if self.subgroups.is_empty() {
            self.items.iter().collect()
        } else {
            self.subgroups.iter().flat_map(|g| g.records()).collect()
        }
    }

    pub fn into_records(self) -> Vec<R> {
        if self.subgroups.is_empty() {
            self.items
        } else {
            self.subgroups
                .into_iter()
                .flat_map(Group::into_records)
                .collect()
        }
    }

    /// Key, count and totals without the records
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            key: self.key.clone(),
            count: self.count,
            totals: self.totals.clone(),
            subgroups: self.subgroups.iter().map(Group::summary).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<GroupSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSummary {
    pub record_count: usize,
    pub grand_totals: Totals,
    pub groups: Vec<GroupSummary>,
}

/// Result of grouping a flat record list
#[derive(Debug, Clone)]
pub struct Grouped<R> {
    pub groups: Vec<Group<R>>,
    pub grand_totals: Totals,
    pub record_count: usize,
}

impl<R> Grouped<R> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, key: &str) -> Option<&Group<R>> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }

    /// Split every group by a second key
    pub fn subdivide<F>(self, key_of: F, fields: &[AmountField<R>]) -> Self
    where
        F: Fn(&R) -> String,
    {
        Self {
            groups: self
                .groups
                .into_iter()
                .map(|g| g.subdivide(&key_of, fields))
                .collect(),
            grand_totals: self.grand_totals,
            record_count: self.record_count,
        }
    }

    /// Reorder groups explicitly (reports that present groups sorted)
    pub fn sort_groups_by<F>(mut self, compare: F) -> Self
    where
        F: FnMut(&Group<R>, &Group<R>) -> std::cmp::Ordering,
    {
        self.groups.sort_by(compare);
        self
    }

    /// Whether the group totals add up to the grand totals for every field
    pub fn reconciles(&self) -> bool {
        let mut summed = Totals::default();
        for group in &self.groups {
            summed.add_totals(&group.totals);
        }
        let count: usize = self.groups.iter().map(|g| g.count).sum();

        count == self.record_count
            && self
                .grand_totals
                .iter()
                .all(|(name, total)| approx_eq(summed.get(name), total))
    }

    pub fn summary(&self) -> GroupedSummary {
        GroupedSummary {
            record_count: self.record_count,
            grand_totals: self.grand_totals.clone(),
            groups: self.groups.iter().map(Group::summary).collect(),
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= scale * 1e-9
}

fn partition<R, F>(records: Vec<R>, key_of: &F, fields: &[AmountField<R>]) -> Vec<Group<R>>
where
    F: Fn(&R) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group<R>> = Vec::new();

    for record in records {
        let key = key_of(&record);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group::new(key, fields));
                groups.len() - 1
            }
        };
        groups[slot].push(record, fields);
    }

    groups
}

/// Group records by key, summing `fields` per group and overall
pub fn group_by<R, F>(records: Vec<R>, key_of: F, fields: &[AmountField<R>]) -> Grouped<R>
where
    F: Fn(&R) -> String,
{
    let mut grand_totals = Totals::zeroed(fields);
    for record in &records {
        grand_totals.add_record(fields, record);
    }
    let record_count = records.len();

    Grouped {
        groups: partition(records, &key_of, fields),
        grand_totals,
        record_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Payment {
        bank: &'static str,
        mode: &'static str,
        amount: Option<f64>,
        excess: Option<f64>,
    }

    fn payment(bank: &'static str, mode: &'static str, amount: f64) -> Payment {
        Payment {
            bank,
            mode,
            amount: Some(amount),
            excess: None,
        }
    }

    const FIELDS: [AmountField<Payment>; 2] = [
        AmountField::new("amount", |p: &Payment| p.amount),
        AmountField::new("excess", |p: &Payment| p.excess),
    ];

    #[test]
    fn test_example_grouping_by_bank() {
        let records = vec![
            payment("A", "cash", 1000.0),
            payment("B", "cash", 500.0),
            payment("A", "cheque", 250.0),
        ];

        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS);

        assert_eq!(grouped.keys(), vec!["A", "B"]);
        let a = grouped.group("A").unwrap();
        assert_eq!(a.totals.get("amount"), 1250.0);
        assert_eq!(a.items.len(), 2);
        assert_eq!(a.count, 2);
        let b = grouped.group("B").unwrap();
        assert_eq!(b.totals.get("amount"), 500.0);
        assert_eq!(b.items.len(), 1);
        assert_eq!(grouped.grand_totals.get("amount"), 1750.0);
        assert_eq!(grouped.record_count, 3);
        assert!(grouped.reconciles());
    }

    #[test]
    fn test_empty_input() {
        let grouped = group_by(Vec::<Payment>::new(), |p| p.bank.to_string(), &FIELDS);
        assert!(grouped.is_empty());
        assert_eq!(grouped.grand_totals.get("amount"), 0.0);
        assert_eq!(grouped.record_count, 0);
        assert!(grouped.reconciles());
    }

    #[test]
    fn test_first_appearance_order_not_alphabetical() {
        let records = vec![
            payment("Zeta", "cash", 1.0),
            payment("Alpha", "cash", 2.0),
            payment("Mid", "cash", 3.0),
            payment("Alpha", "cash", 4.0),
        ];
        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS);
        assert_eq!(grouped.keys(), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_grouping_is_stable_across_runs() {
        let records: Vec<Payment> = (0..50)
            .map(|i| {
                let bank = ["BRB", "BANCOBU", "KCB", "ECOBANK"][i % 4];
                payment(bank, "cash", i as f64 * 10.0)
            })
            .collect();

        let first = group_by(records.clone(), |p| p.bank.to_string(), &FIELDS);
        let second = group_by(records, |p| p.bank.to_string(), &FIELDS);
        assert_eq!(first.keys(), second.keys());
        assert_eq!(first.summary(), second.summary());
    }

    #[test]
    fn test_missing_amounts_count_as_zero() {
        let records = vec![
            Payment {
                bank: "A",
                mode: "cash",
                amount: None,
                excess: Some(f64::NAN),
            },
            Payment {
                bank: "A",
                mode: "cash",
                amount: Some(300.0),
                excess: Some(20.0),
            },
        ];
        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS);
        let a = grouped.group("A").unwrap();
        assert_eq!(a.totals.get("amount"), 300.0);
        assert_eq!(a.totals.get("excess"), 20.0);
        assert!(grouped.reconciles());
    }

    #[test]
    fn test_reconciliation_over_many_fractional_amounts() {
        let records: Vec<Payment> = (1..=200)
            .map(|i| {
                let bank = ["A", "B", "C"][i % 3];
                payment(bank, "cash", i as f64 * 0.1 + 1234.567)
            })
            .collect();
        let flat: f64 = records.iter().map(|p| p.amount.unwrap()).sum();

        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS);
        let summed: f64 = grouped.groups.iter().map(|g| g.totals.get("amount")).sum();

        assert!(grouped.reconciles());
        assert!((summed - flat).abs() < 1e-6);
        assert!((grouped.grand_totals.get("amount") - flat).abs() < 1e-9);
    }

    #[test]
    fn test_subdivide_keeps_parent_totals() {
        let records = vec![
            payment("A", "cash", 100.0),
            payment("A", "cheque", 50.0),
            payment("B", "cash", 10.0),
            payment("A", "cash", 25.0),
        ];
        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS)
            .subdivide(|p| p.mode.to_string(), &FIELDS);

        let a = grouped.group("A").unwrap();
        assert!(a.is_nested());
        assert!(a.items.is_empty());
        assert_eq!(a.count, 3);
        assert_eq!(a.totals.get("amount"), 175.0);

        let modes: Vec<&str> = a.subgroups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(modes, vec!["cash", "cheque"]);
        assert_eq!(a.subgroups[0].totals.get("amount"), 125.0);
        assert_eq!(a.subgroups[1].totals.get("amount"), 50.0);
        assert_eq!(a.records().len(), 3);
        assert!(grouped.reconciles());
    }

    #[test]
    fn test_explicit_sort() {
        let records = vec![payment("B", "cash", 1.0), payment("A", "cash", 2.0)];
        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS)
            .sort_groups_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(grouped.keys(), vec!["A", "B"]);
    }

    #[test]
    fn test_summary_serializes_totals_in_field_order() {
        let records = vec![payment("A", "cash", 10.0)];
        let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS);
        let json = serde_json::to_string(&grouped.summary()).unwrap();
        assert_eq!(
            json,
            r#"{"record_count":1,"grand_totals":{"amount":10.0,"excess":0.0},"groups":[{"key":"A","count":1,"totals":{"amount":10.0,"excess":0.0}}]}"#
        );
    }

    mod properties {
        use super::*;
        use crate::format::amount_or_zero;
        use proptest::prelude::*;

        const BANKS: [&str; 5] = ["BRB", "BANCOBU", "KCB", "ECOBANK", "IBB"];
        const MODES: [&str; 3] = ["VIREMENT", "CHEQUE", "ESPECES"];

        fn arb_payment() -> impl Strategy<Value = Payment> {
            (
                0..BANKS.len(),
                0..MODES.len(),
                proptest::option::of(0.0f64..1_000_000.0),
                proptest::option::of(0.0f64..10_000.0),
            )
                .prop_map(|(bank, mode, amount, excess)| Payment {
                    bank: BANKS[bank],
                    mode: MODES[mode],
                    amount,
                    excess,
                })
        }

        proptest! {
            #[test]
            fn test_group_totals_reconcile_with_records(
                records in proptest::collection::vec(arb_payment(), 1..200)
            ) {
                let flat: f64 = records.iter().map(|p| amount_or_zero(p.amount)).sum();
                let count = records.len();

                let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS);
                let summed: f64 = grouped.groups.iter().map(|g| g.totals.get("amount")).sum();

                prop_assert!(grouped.reconciles());
                prop_assert_eq!(grouped.record_count, count);
                prop_assert!((summed - flat).abs() <= flat.abs().max(1.0) * 1e-9);
                prop_assert!((grouped.grand_totals.get("amount") - flat).abs() <= flat.abs().max(1.0) * 1e-9);
            }

            #[test]
            fn test_subgroups_reconcile_with_parent(
                records in proptest::collection::vec(arb_payment(), 1..200)
            ) {
                let grouped = group_by(records, |p| p.bank.to_string(), &FIELDS)
                    .subdivide(|p| p.mode.to_string(), &FIELDS);

                prop_assert!(grouped.reconciles());
                for group in &grouped.groups {
                    let count: usize = group.subgroups.iter().map(|g| g.count).sum();
                    let excess: f64 = group.subgroups.iter().map(|g| g.totals.get("excess")).sum();
                    prop_assert_eq!(count, group.count);
                    prop_assert!((excess - group.totals.get("excess")).abs() <= 1e-6);
                }
            }

            #[test]
            fn test_grouping_is_stable(
                records in proptest::collection::vec(arb_payment(), 0..100)
            ) {
                let first = group_by(records.clone(), |p| p.bank.to_string(), &FIELDS);
                let second = group_by(records.clone(), |p| p.bank.to_string(), &FIELDS);
                prop_assert_eq!(first.summary(), second.summary());

                let mut expected: Vec<&str> = Vec::new();
                for p in &records {
                    if !expected.contains(&p.bank) {
                        expected.push(p.bank);
                    }
                }
                prop_assert_eq!(first.keys(), expected);
            }
        }
    }
}
