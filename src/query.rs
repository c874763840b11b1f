//! Parameterised SELECT builder for listings with optional equality filters.
//!
//! Filter values are always bound as parameters; only the `&'static str` column
//! names supplied by the caller ever reach the statement text.

use crate::store::Value;

#[derive(Debug, Clone)]
pub struct FilteredQuery {
    base: &'static str,
    predicates: Vec<&'static str>,
    params: Vec<Value>,
    order_by: &'static str,
}

impl FilteredQuery {
    /// `base` is a SELECT without WHERE/ORDER BY; `order_by` is the column list
    /// appended after all predicates.
    pub fn new(base: &'static str, order_by: &'static str) -> Self {
        Self {
            base,
            predicates: Vec::new(),
            params: Vec::new(),
            order_by,
        }
    }

    /// Appends `AND <column> = ?` when `value` is present.
    pub fn filter_eq<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.predicates.push(column);
            self.params.push(v.into());
        }
        self
    }

    pub fn build(self) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(self.base.len() + 64);
        sql.push_str(self.base.trim_end());
        sql.push_str(" WHERE 1=1");
        for column in &self.predicates {
            sql.push_str(" AND ");
            sql.push_str(column);
            sql.push_str(" = ?");
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(self.order_by);
        (sql, self.params)
    }
}

/// Maps the presentation layer's "no filter" choices (blank, or a sentinel such as
/// `All` / `All Classes`) to `None`.
pub fn filter_value<'a>(raw: Option<&'a str>, sentinels: &[&str]) -> Option<&'a str> {
    let v = raw?.trim();
    if v.is_empty() || sentinels.iter().any(|s| s.eq_ignore_ascii_case(v)) {
        return None;
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT g.id FROM grades g JOIN classes c ON c.id = g.class_id";

    #[test]
    fn no_filters_yields_unconditional_listing() {
        let (sql, params) = FilteredQuery::new(BASE, "g.id")
            .filter_eq::<String>("c.name", None)
            .build();
        assert_eq!(sql, format!("{BASE} WHERE 1=1 ORDER BY g.id"));
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_keep_call_order_and_bind_values() {
        let (sql, params) = FilteredQuery::new(BASE, "g.id")
            .filter_eq("c.name", Some("Math101".to_string()))
            .filter_eq::<String>("s.name", None)
            .filter_eq("s.name", Some("Algebra".to_string()))
            .build();
        assert_eq!(
            sql,
            format!("{BASE} WHERE 1=1 AND c.name = ? AND s.name = ? ORDER BY g.id")
        );
        assert_eq!(
            params,
            vec![
                Value::Text("Math101".into()),
                Value::Text("Algebra".into())
            ]
        );
    }

    #[test]
    fn values_never_reach_statement_text() {
        let hostile = "x' OR '1'='1";
        let (sql, params) = FilteredQuery::new(BASE, "g.id")
            .filter_eq("c.name", Some(hostile.to_string()))
            .build();
        assert!(!sql.contains(hostile));
        assert_eq!(params, vec![Value::Text(hostile.into())]);
    }

    #[test]
    fn sentinels_and_blanks_mean_no_filter() {
        let all = &["All", "All Classes"];
        assert_eq!(filter_value(Some("All"), all), None);
        assert_eq!(filter_value(Some("all classes"), all), None);
        assert_eq!(filter_value(Some("  "), all), None);
        assert_eq!(filter_value(None, all), None);
        assert_eq!(filter_value(Some(" Math101 "), all), Some("Math101"));
    }
}
