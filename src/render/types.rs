use crate::model::Column;

/// Canonical display type for a column, e.g. `VARCHAR(100)` or `TIMESTAMPTZ`.
///
/// Total over every raw type: anything not recognised is echoed back upper
/// cased, so callers always get something printable.
pub fn display_type(column: &Column) -> String {
    match column.data_type.as_str() {
        "character varying" => match column.character_length {
            Some(length) => format!("VARCHAR({length})"),
            None => "VARCHAR(255)".to_string(),
        },
        "character" | "char" => match column.character_length {
            Some(length) => format!("CHAR({length})"),
            None => "CHAR".to_string(),
        },
        "numeric" | "decimal" => match (column.numeric_precision, column.numeric_scale) {
            (Some(precision), Some(scale)) => format!("DECIMAL({precision},{scale})"),
            (Some(precision), None) => format!("DECIMAL({precision})"),
            _ => "DECIMAL".to_string(),
        },
        "varbit" | "bit varying" => "VARBIT".to_string(),
        raw => fixed_type(raw)
            .map(str::to_string)
            .unwrap_or_else(|| fallback(raw)),
    }
}

/// Raw types whose display name ignores length, precision and scale.
fn fixed_type(raw: &str) -> Option<&'static str> {
    let mapped = match raw {
        "text" => "TEXT",
        "integer" => "INTEGER",
        "bigint" => "BIGINT",
        "smallint" => "SMALLINT",
        "serial" => "SERIAL",
        "bigserial" => "BIGSERIAL",
        "smallserial" => "SMALLSERIAL",
        "boolean" => "BOOLEAN",
        "real" => "REAL",
        "double precision" => "DOUBLE PRECISION",
        "money" => "MONEY",
        "timestamp without time zone" => "TIMESTAMP",
        "timestamp with time zone" => "TIMESTAMPTZ",
        "date" => "DATE",
        "time without time zone" => "TIME",
        "time with time zone" => "TIMETZ",
        "interval" => "INTERVAL",
        "uuid" => "UUID",
        "json" => "JSON",
        "jsonb" => "JSONB",
        "xml" => "XML",
        "bytea" => "BYTEA",
        "bit" => "BIT",
        "cidr" => "CIDR",
        "inet" => "INET",
        "macaddr" => "MACADDR",
        "tsvector" => "TSVECTOR",
        "tsquery" => "TSQUERY",
        _ => return None,
    };
    Some(mapped)
}

fn fallback(raw: &str) -> String {
    if raw.trim().is_empty() {
        "UNKNOWN".to_string()
    } else {
        raw.to_uppercase()
    }
}
