use super::types::display_type;
use crate::model::{Column, Index, Schema, Table};

/// Human readable report of every table, its columns and its indexes.
pub fn render_info(schema: &Schema) -> String {
    let mut out = String::new();

    for table in &schema.tables {
        write_table(&mut out, table);
    }

    out
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str(&format!("Table: {}\n", table.name));
    out.push_str("Columns:\n");
    for column in &table.columns {
        out.push_str(&format!("  - {}\n", format_column(column)));
    }

    if !table.indexes.is_empty() {
        out.push_str("Indexes:\n");
        for index in &table.indexes {
            out.push_str(&format!("  - {}\n", format_index(index)));
        }
    }

    out.push('\n');
}

fn format_column(column: &Column) -> String {
    let nullable = if column.is_nullable { "NULL" } else { "NOT NULL" };
    let mut line = format!("{} {} {}", column.name, display_type(column), nullable);

    if let Some(ref default) = column.default_value {
        line.push_str(" DEFAULT ");
        line.push_str(default);
    }
    if column.is_primary_key {
        line.push_str(" (PRIMARY KEY)");
    }

    line
}

fn format_index(index: &Index) -> String {
    let unique = if index.is_unique { " (UNIQUE)" } else { "" };
    format!("{} on ({}){}", index.name, index.columns.join(", "), unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", "integer").primary_key())
            .with_column(Column::new("email", "character varying").not_null())
            .with_column(Column::new("name", "character varying"))
            .with_index(Index::new("idx_users_email", ["email"]).unique())
    }

    #[test]
    fn renders_columns_and_unique_index() {
        let result = render_info(&Schema::from_tables(vec![users()]));

        assert!(result.contains("Table: users"));
        assert!(result.contains("id INTEGER NOT NULL"));
        assert!(result.contains("(PRIMARY KEY)"));
        assert!(result.contains("email VARCHAR(255) NOT NULL"));
        assert!(result.contains("name VARCHAR(255) NULL"));
        assert!(result.contains("idx_users_email on (email) (UNIQUE)"));
    }

    #[test]
    fn exact_layout() {
        let table = Table::new("accounts")
            .with_column(
                Column::new("id", "bigint")
                    .primary_key()
                    .with_default("nextval('accounts_id_seq'::regclass)"),
            )
            .with_column(
                Column::new("balance", "numeric")
                    .with_precision(12)
                    .with_scale(2)
                    .not_null()
                    .with_default("0"),
            );

        let expected = "\
Table: accounts
Columns:
  - id BIGINT NOT NULL DEFAULT nextval('accounts_id_seq'::regclass) (PRIMARY KEY)
  - balance DECIMAL(12,2) NOT NULL DEFAULT 0

";
        assert_eq!(render_info(&Schema::from_tables(vec![table])), expected);
    }

    #[test]
    fn empty_schema_renders_empty_string() {
        assert_eq!(render_info(&Schema::new()), "");
    }

    #[test]
    fn no_indexes_section_without_indexes() {
        let table = Table::new("t").with_column(Column::new("a", "text"));
        let result = render_info(&Schema::from_tables(vec![table]));
        assert!(!result.contains("Indexes:"));
    }

    #[test]
    fn composite_index_keeps_column_order() {
        let table = Table::new("t")
            .with_column(Column::new("a", "integer"))
            .with_column(Column::new("b", "integer"))
            .with_index(Index::new("idx_x", ["b", "a"]))
            .with_index(Index::new("idx_y", ["a", "b"]));

        let result = render_info(&Schema::from_tables(vec![table]));
        assert!(result.contains("  - idx_x on (b, a)\n"));
        assert!(result.contains("  - idx_y on (a, b)\n"));
    }

    #[test]
    fn tables_are_separated_by_a_blank_line_in_snapshot_order() {
        let schema = Schema::from_tables(vec![
            Table::new("users").with_column(Column::new("id", "integer").primary_key()),
            Table::new("posts")
                .with_column(Column::new("id", "integer").primary_key())
                .with_column(Column::new("user_id", "integer").not_null()),
        ]);

        let result = render_info(&schema);
        assert!(result.contains("(PRIMARY KEY)\n\nTable: posts\n"));
        assert!(result.find("Table: users").unwrap() < result.find("Table: posts").unwrap());
        assert!(result.ends_with("user_id INTEGER NOT NULL\n\n"));
    }

    #[test]
    fn default_is_printed_verbatim() {
        let table = Table::new("t")
            .with_column(Column::new("label", "text").with_default("'it''s'::text"));
        let result = render_info(&Schema::from_tables(vec![table]));
        assert!(result.contains("label TEXT NULL DEFAULT 'it''s'::text\n"));
    }
}
