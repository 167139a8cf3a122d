//! Property-based tests for result rendering and command parsing
//!
//! These tests verify that:
//! - Rendering is deterministic and every line of a table has the same width
//! - Rows appear in the order the server returned them
//! - Identifier quoting always produces a name the server can parse back
//!   and never quotes an already delimited name again

#[cfg(test)]
mod tests {
    use mscli::core::db::schema::{database_reference, quote_identifier, tables_query};
    use mscli::core::db::{ResultSet, Value};
    use mscli::repl::{parse_command, Command};
    use mscli::results_grid::ResultsGrid;
    use proptest::prelude::*;
    use unicode_width::UnicodeWidthStr;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i64>().prop_map(Value::Int),
            "[a-z0-9東京é]{0,8}".prop_map(Value::Text),
        ]
    }

    fn arb_result_set() -> impl Strategy<Value = ResultSet> {
        (1usize..=4usize).prop_flat_map(|column_count| {
            let columns = prop::collection::vec("[a-z][a-z0-9_]{0,9}", column_count);
            let rows = prop::collection::vec(
                prop::collection::vec(arb_value(), column_count),
                0..20,
            );
            (columns, rows).prop_map(|(columns, rows)| ResultSet::new(columns, rows))
        })
    }

    proptest! {
        /// Rendering the same result twice yields identical text
        #[test]
        fn prop_render_is_deterministic(result in arb_result_set()) {
            let first = ResultsGrid::from_result_set(&result).render();
            let second = ResultsGrid::from_result_set(&result).render();
            prop_assert_eq!(first, second);
        }

        /// Every line of the table is as wide as the border
        #[test]
        fn prop_table_lines_share_one_width(result in arb_result_set()) {
            let rendered = ResultsGrid::from_result_set(&result).render();
            let widths: Vec<usize> = rendered.lines().map(UnicodeWidthStr::width).collect();
            prop_assert_eq!(widths.len(), result.row_count() + 4);
            prop_assert!(widths.windows(2).all(|w| w[0] == w[1]));
        }

        /// Row lines follow the order of the result set
        #[test]
        fn prop_rows_keep_their_order(result in arb_result_set()) {
            let rendered = ResultsGrid::from_result_set(&result).render();
            let body: Vec<&str> = rendered.lines().skip(3).take(result.row_count()).collect();
            for (line, row) in body.iter().zip(&result.rows) {
                let cells: Vec<&str> = line
                    .trim_matches('|')
                    .split(" | ")
                    .map(str::trim)
                    .collect();
                let expected: Vec<String> = row.iter().map(Value::to_string).collect();
                prop_assert_eq!(cells, expected);
            }
        }

        /// Quoted identifiers unquote to the original name
        #[test]
        fn prop_quoted_identifier_round_trips(name in "[a-zA-Z0-9 _\\]\\[-]{1,16}") {
            let quoted = quote_identifier(&name);
            let unquoted = if quoted.starts_with('[') && quoted.ends_with(']') {
                quoted[1..quoted.len() - 1].replace("]]", "]")
            } else {
                quoted.to_string()
            };
            prop_assert_eq!(unquoted, name.clone());
            prop_assert!(tables_query(&name).ends_with(".INFORMATION_SCHEMA.tables"));
        }

        /// A typed database name is never quoted twice
        #[test]
        fn prop_database_reference_is_stable(name in "[a-zA-Z0-9 _\\]\\[-]{1,16}") {
            let once = database_reference(&name).into_owned();
            let twice = database_reference(&once).into_owned();
            prop_assert_eq!(once, twice);
        }

        /// Whitespace-only input never reaches the server
        #[test]
        fn prop_blank_input_is_empty(input in "[ \t]{0,10}") {
            prop_assert_eq!(parse_command(&input), Command::Empty);
        }
    }
}
