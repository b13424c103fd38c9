//! Date-range dependencies between fields.
//!
//! `dependedChild` and `dependedParent` links are collected once per schema
//! into a [`DependencyGraph`] (parent name -> child names). When a date is
//! picked, [`apply_date_pick`] clamps it to the floor date and pushes every
//! direct child that would otherwise precede it.
//!
//! Propagation compares against the clamped date, not the raw pick: the
//! value that actually lands in the start control is the one children must
//! not precede.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::control::FormModel;
use crate::schema::FieldSchema;
use crate::value::Value;

/// Adjacency map of date dependencies.
///
/// Edges come from a field's `dependedChild` (field -> child) and from a
/// field's `dependedParent` (parent -> field). References to names that do
/// not exist in the schema are dropped, so propagation through them is a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    children: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Builds the graph for a list of fields.
    pub fn from_fields(fields: &[FieldSchema]) -> Self {
        let mut graph = Self::default();
        let exists = |name: &str| fields.iter().any(|f| f.name == name);

        for field in fields {
            if let Some(child) = &field.depended_child {
                if exists(child) {
                    graph.add_edge(&field.name, child);
                }
            }
            if let Some(parent) = &field.depended_parent {
                if exists(parent) {
                    graph.add_edge(parent, &field.name);
                }
            }
        }
        graph
    }

    fn add_edge(&mut self, parent: &str, child: &str) {
        let entry = self.children.entry(parent.to_string()).or_default();
        if !entry.iter().any(|c| c == child) {
            entry.push(child.to_string());
        }
    }

    /// Direct dependents of a field.
    pub fn children(&self, name: &str) -> &[String] {
        self.children.get(name).map_or(&[], Vec::as_slice)
    }

    /// Fields that list `name` as a dependent.
    pub fn parents(&self, name: &str) -> Vec<&str> {
        let mut parents: Vec<&str> = self
            .children
            .iter()
            .filter(|(_, kids)| kids.iter().any(|k| k == name))
            .map(|(parent, _)| parent.as_str())
            .collect();
        parents.sort_unstable();
        parents
    }

    /// Returns `true` if no field has dependents.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Outcome of a date pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePick {
    /// The date the user picked.
    pub requested: NaiveDate,
    /// The date written into the control.
    pub accepted: NaiveDate,
    /// Whether the pick was raised to the floor date.
    pub clamped: bool,
    /// Children whose value was pushed forward.
    pub propagated: Vec<String>,
}

/// Applies a confirmed date pick to `field` and propagates it to children.
///
/// A pick earlier than `floor` is replaced by `floor`. Each direct child
/// whose current date is earlier than the accepted date (or which holds no
/// date at all) is set to the accepted date; a child already on or after it
/// is left alone. Returns `None` if the model has no such control.
pub fn apply_date_pick(
    model: &mut FormModel,
    graph: &DependencyGraph,
    field: &str,
    picked: NaiveDate,
    floor: Option<NaiveDate>,
) -> Option<DatePick> {
    let accepted = match floor {
        Some(floor) if picked < floor => floor,
        _ => picked,
    };
    let clamped = accepted != picked;

    model.get_mut(field)?.input(Value::Date(accepted));
    if clamped {
        tracing::debug!(field, %picked, %accepted, "date pick clamped to floor");
    }

    let mut propagated = Vec::new();
    for child in graph.children(field) {
        let Some(control) = model.get_mut(child) else {
            continue;
        };
        let behind = control.value().as_date().map_or(true, |current| accepted > current);
        if behind {
            control.set_value(Value::Date(accepted));
            tracing::debug!(field, child = %child, %accepted, "propagated date to dependent");
            propagated.push(child.clone());
        }
    }

    Some(DatePick {
        requested: picked,
        accepted,
        clamped,
        propagated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::FormControl;
    use crate::schema::FieldType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("startDate", FieldType::Date).depended_child("endDate"),
            FieldSchema::new("endDate", FieldType::Date).depended_parent("startDate"),
        ]
    }

    fn range_model(end: Value) -> FormModel {
        let mut model = FormModel::new();
        model.insert(FormControl::new("startDate", Value::Null, vec![], false));
        model.insert(FormControl::new("endDate", end, vec![], false));
        model
    }

    #[test]
    fn test_graph_merges_both_link_directions() {
        let graph = DependencyGraph::from_fields(&range_fields());
        assert_eq!(graph.children("startDate"), ["endDate".to_string()]);
        assert!(graph.children("endDate").is_empty());
        assert_eq!(graph.parents("endDate"), vec!["startDate"]);
    }

    #[test]
    fn test_graph_drops_dangling_references() {
        let fields = vec![FieldSchema::new("startDate", FieldType::Date).depended_child("nope")];
        let graph = DependencyGraph::from_fields(&fields);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_pick_clamped_to_floor() {
        let graph = DependencyGraph::from_fields(&range_fields());
        let mut model = range_model(Value::Null);
        let pick = apply_date_pick(
            &mut model,
            &graph,
            "startDate",
            date(2020, 1, 1),
            Some(date(2020, 1, 2)),
        )
        .unwrap();
        assert!(pick.clamped);
        assert_eq!(pick.accepted, date(2020, 1, 2));
        assert_eq!(
            model.get("startDate").unwrap().value(),
            &Value::Date(date(2020, 1, 2))
        );
    }

    #[test]
    fn test_pick_pushes_child_forward() {
        let graph = DependencyGraph::from_fields(&range_fields());
        let mut model = range_model(Value::Date(date(2020, 1, 1)));
        let pick = apply_date_pick(&mut model, &graph, "startDate", date(2020, 1, 10), None).unwrap();
        assert_eq!(pick.propagated, vec!["endDate".to_string()]);
        assert_eq!(
            model.get("endDate").unwrap().value(),
            &Value::Date(date(2020, 1, 10))
        );
    }

    #[test]
    fn test_pick_leaves_later_or_equal_child() {
        let graph = DependencyGraph::from_fields(&range_fields());
        let mut model = range_model(Value::Date(date(2020, 1, 10)));
        let pick = apply_date_pick(&mut model, &graph, "startDate", date(2020, 1, 10), None).unwrap();
        assert!(pick.propagated.is_empty());
        apply_date_pick(&mut model, &graph, "startDate", date(2020, 1, 5), None).unwrap();
        assert_eq!(
            model.get("endDate").unwrap().value(),
            &Value::Date(date(2020, 1, 10))
        );
    }

    #[test]
    fn test_propagation_uses_clamped_date() {
        let graph = DependencyGraph::from_fields(&range_fields());
        let mut model = range_model(Value::Date(date(2020, 1, 1)));
        // Raw pick is before the child, the clamped date is after it.
        let pick = apply_date_pick(
            &mut model,
            &graph,
            "startDate",
            date(2019, 12, 25),
            Some(date(2020, 1, 3)),
        )
        .unwrap();
        assert_eq!(pick.propagated, vec!["endDate".to_string()]);
        assert_eq!(
            model.get("endDate").unwrap().value(),
            &Value::Date(date(2020, 1, 3))
        );
    }

    #[test]
    fn test_empty_child_is_filled() {
        let graph = DependencyGraph::from_fields(&range_fields());
        let mut model = range_model(Value::from(""));
        apply_date_pick(&mut model, &graph, "startDate", date(2020, 2, 1), None).unwrap();
        assert_eq!(
            model.get("endDate").unwrap().value(),
            &Value::Date(date(2020, 2, 1))
        );
    }

    #[test]
    fn test_unknown_field_returns_none() {
        let graph = DependencyGraph::default();
        let mut model = FormModel::new();
        assert!(apply_date_pick(&mut model, &graph, "missing", date(2020, 1, 1), None).is_none());
    }
}
