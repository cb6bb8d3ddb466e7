use super::types::display_type;
use crate::model::{Column, Index, Schema, Table};

const INDENT: &str = "    ";

/// `create table` / `create index` statements reconstructing the snapshot.
pub fn render_sql(schema: &Schema) -> String {
    let mut out = String::new();

    for table in &schema.tables {
        out.push_str(&generate_create_table(table));
        out.push_str("\n\n");

        for index in &table.indexes {
            out.push_str(&generate_create_index(&table.name, index));
            out.push('\n');
        }
        if !table.indexes.is_empty() {
            out.push('\n');
        }
    }

    out
}

fn generate_create_table(table: &Table) -> String {
    let mut definitions: Vec<String> = table.columns.iter().map(format_column).collect();

    let primary_key = table.primary_key_columns();
    if !primary_key.is_empty() {
        definitions.push(format!("{INDENT}primary key ({})", primary_key.join(", ")));
    }

    format!(
        "create table {} (\n{}\n);",
        table.name,
        definitions.join(",\n")
    )
}

fn format_column(column: &Column) -> String {
    let mut definition = format!(
        "{INDENT}{} {}",
        column.name,
        display_type(column).to_lowercase()
    );

    if !column.is_nullable {
        definition.push_str(" not null");
    }
    if let Some(ref default) = column.default_value {
        definition.push_str(" default ");
        definition.push_str(default);
    }

    definition
}

fn generate_create_index(table: &str, index: &Index) -> String {
    let unique = if index.is_unique { "unique " } else { "" };
    format!(
        "create {}index {} on {} ({});",
        unique,
        index.name,
        table,
        index.columns.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Table {
        Table::new("products")
            .with_column(Column::new("id", "integer").primary_key())
            .with_column(Column::new("name", "character varying").not_null())
            .with_column(Column::new("price", "numeric"))
            .with_index(Index::new("idx_products_name", ["name"]))
    }

    #[test]
    fn renders_table_and_index() {
        let result = render_sql(&Schema::from_tables(vec![products()]));

        assert!(result.contains("create table products ("));
        assert!(result.contains("primary key (id)"));
        assert!(result.contains("not null"));
        assert!(result.contains("create index idx_products_name on products (name);"));
        assert!(result.contains("id integer"));
        assert!(result.contains("name varchar(255)"));
    }

    #[test]
    fn exact_layout() {
        let expected = "\
create table products (
    id integer not null,
    name varchar(255) not null,
    price decimal,
    primary key (id)
);

create index idx_products_name on products (name);

";
        assert_eq!(render_sql(&Schema::from_tables(vec![products()])), expected);
    }

    #[test]
    fn table_without_primary_key_or_indexes() {
        let table = Table::new("events")
            .with_column(Column::new("payload", "jsonb").not_null())
            .with_column(
                Column::new("created_at", "timestamp with time zone").with_default("now()"),
            );

        let expected = "\
create table events (
    payload jsonb not null,
    created_at timestamptz default now()
);

";
        assert_eq!(render_sql(&Schema::from_tables(vec![table])), expected);
    }

    #[test]
    fn composite_primary_key_in_declaration_order() {
        let table = Table::new("memberships")
            .with_column(Column::new("user_id", "integer").primary_key())
            .with_column(Column::new("role", "text").not_null())
            .with_column(Column::new("org_id", "integer").primary_key());

        let result = render_sql(&Schema::from_tables(vec![table]));
        assert!(result.contains(",\n    primary key (user_id, org_id)\n);"));
    }

    #[test]
    fn unique_composite_index() {
        let table = Table::new("t")
            .with_column(Column::new("a", "integer"))
            .with_column(Column::new("b", "integer"))
            .with_index(Index::new("idx_x", ["a", "b"]))
            .with_index(Index::new("uq_t_b", ["b"]).unique());

        let result = render_sql(&Schema::from_tables(vec![table]));
        assert!(result.contains("create index idx_x on t (a, b);\n"));
        assert!(result.contains("create unique index uq_t_b on t (b);\n"));
    }

    #[test]
    fn empty_schema_renders_empty_string() {
        assert_eq!(render_sql(&Schema::new()), "");
    }

    #[test]
    fn index_block_is_followed_by_blank_line_before_next_table() {
        let schema = Schema::from_tables(vec![
            Table::new("a")
                .with_column(Column::new("x", "integer"))
                .with_index(Index::new("a_x", ["x"])),
            Table::new("b").with_column(Column::new("y", "integer")),
        ]);

        let result = render_sql(&schema);
        assert!(result.contains("create index a_x on a (x);\n\ncreate table b (\n"));
    }

    #[test]
    fn display_type_is_lower_cased() {
        let table = Table::new("t").with_column(
            Column::new("amount", "numeric")
                .with_precision(10)
                .with_scale(2),
        );
        let result = render_sql(&Schema::from_tables(vec![table]));
        assert!(result.contains("    amount decimal(10,2)\n"));
    }
}
