//! Translation of [`ExerciseFilter`] into a SQL `WHERE` clause.
//!
//! Every clause is written against the `exercises` table aliased as `e`.

use rusqlite::types::Value;

use crate::models::ExerciseFilter;

/// A `WHERE` clause body plus its positional parameters.
#[derive(Debug, Default)]
pub(super) struct WhereClause {
    pub sql: String,
    pub params: Vec<Value>,
}

pub(super) fn build_where(filter: &ExerciseFilter) -> WhereClause {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(muscles) = &filter.muscles {
        if muscles.is_empty() {
            conditions.push("0".to_string());
        } else {
            // Muscle rows carry both roles, so one IN-set covers primary OR secondary.
            conditions.push(format!(
                "e.id IN (SELECT exercise_id FROM exercise_muscles WHERE muscle IN ({}))",
                placeholders(muscles.len())
            ));
            params.extend(muscles.iter().map(|m| Value::Text(m.as_str().to_string())));
        }
    }

    if let Some(equipment) = &filter.equipment {
        if equipment.is_empty() {
            conditions.push("0".to_string());
        } else {
            conditions.push(format!("e.equipment IN ({})", placeholders(equipment.len())));
            params.extend(equipment.iter().map(|e| Value::Text(e.as_str().to_string())));
        }
    }

    if let Some(category) = &filter.category {
        conditions.push("e.category = ?".to_string());
        params.push(Value::Text(category.clone()));
    }

    if let Some(query) = filter.search.as_deref().and_then(fts_query) {
        conditions.push(
            "e.id IN (SELECT exercise_id FROM exercises_fts WHERE exercises_fts MATCH ?)".to_string(),
        );
        params.push(Value::Text(query));
    }

    let sql = if conditions.is_empty() {
        "1".to_string()
    } else {
        conditions.join(" AND ")
    };

    WhereClause { sql, params }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Turn free text into an FTS5 query where every word is a quoted prefix
/// term, so user input can never be parsed as FTS syntax.
fn fts_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|word| format!("\"{}\"*", word.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Muscle;

    #[test]
    fn empty_filter_matches_everything() {
        let clause = build_where(&ExerciseFilter::default());
        assert_eq!(clause.sql, "1");
        assert!(clause.params.is_empty());
    }

    #[test]
    fn dimensions_are_and_ed_with_params_in_order() {
        let filter = ExerciseFilter::default()
            .with_muscles([Muscle::Chest, Muscle::Triceps])
            .with_equipment(["barbell"])
            .with_category("strength");

        let clause = build_where(&filter);
        assert_eq!(
            clause.sql,
            "e.id IN (SELECT exercise_id FROM exercise_muscles WHERE muscle IN (?, ?)) \
             AND e.equipment IN (?) AND e.category = ?"
        );
        assert_eq!(
            clause.params,
            vec![
                Value::Text("chest".into()),
                Value::Text("triceps".into()),
                Value::Text("barbell".into()),
                Value::Text("strength".into()),
            ]
        );
    }

    #[test]
    fn empty_sets_match_nothing() {
        let filter = ExerciseFilter::default().with_muscles(Vec::<Muscle>::new());
        assert_eq!(build_where(&filter).sql, "0");

        let filter = ExerciseFilter::default().with_equipment(Vec::<String>::new());
        assert_eq!(build_where(&filter).sql, "0");
    }

    #[test]
    fn search_text_is_quoted_as_prefix_terms() {
        assert_eq!(fts_query("bench press"), Some("\"bench\"* \"press\"*".to_string()));
        assert_eq!(fts_query("say \"hi\""), Some("\"say\"* \"\"\"hi\"\"\"*".to_string()));
        assert_eq!(fts_query("   "), None);
    }

    #[test]
    fn blank_search_imposes_no_constraint() {
        let filter = ExerciseFilter::default().with_search("  ");
        assert_eq!(build_where(&filter).sql, "1");
    }
}
