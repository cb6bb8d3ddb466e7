use crate::model::{Column, Index, Schema, Table};
use crate::pg::connection::PgConnection;
use crate::util::{Result, SchemaError};
use sqlx::Row;
use tracing::{debug, info};

/// Reads every base table in `target_schemas` together with its columns and
/// secondary indexes.
///
/// Tables come back in name order, columns in ordinal order and indexes in
/// name order.
pub async fn introspect_schema(
    connection: &PgConnection,
    target_schemas: &[String],
) -> Result<Schema> {
    debug!(schemas = ?target_schemas, "starting schema extraction");
    let table_names = introspect_table_names(connection, target_schemas).await?;
    info!(count = table_names.len(), tables = ?table_names, "found database tables");

    let mut tables = Vec::with_capacity(table_names.len());
    for (table_schema, table_name) in table_names {
        debug!(table = %table_name, "processing table");

        let columns = introspect_columns(connection, &table_schema, &table_name)
            .await
            .map_err(|e| with_table_context(e, "columns", &table_name))?;
        debug!(table = %table_name, count = columns.len(), "found table columns");

        let indexes = introspect_indexes(connection, &table_schema, &table_name)
            .await
            .map_err(|e| with_table_context(e, "indexes", &table_name))?;
        debug!(table = %table_name, count = indexes.len(), "found table indexes");

        tables.push(Table {
            name: table_name,
            columns,
            indexes,
        });
    }

    info!(tables = tables.len(), "schema extraction completed");
    Ok(Schema::from_tables(tables))
}

fn with_table_context(error: SchemaError, what: &str, table: &str) -> SchemaError {
    SchemaError::DatabaseError(format!("failed to get {what} for table {table}: {error}"))
}

async fn introspect_table_names(
    connection: &PgConnection,
    target_schemas: &[String],
) -> Result<Vec<(String, String)>> {
    let rows = sqlx::query(
        r#"
        SELECT table_schema::text AS table_schema, table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = ANY($1::text[]) AND table_type = 'BASE TABLE'
        ORDER BY table_name, table_schema
        "#,
    )
    .bind(target_schemas)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch tables: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|row| (row.get("table_schema"), row.get("table_name")))
        .collect())
}

async fn introspect_columns(
    connection: &PgConnection,
    table_schema: &str,
    table_name: &str,
) -> Result<Vec<Column>> {
    let rows = sqlx::query(
        r#"
        SELECT
            c.column_name::text AS column_name,
            c.data_type::text AS data_type,
            c.is_nullable = 'YES' AS is_nullable,
            c.column_default::text AS column_default,
            EXISTS (
                SELECT 1
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                  ON kcu.constraint_name = tc.constraint_name
                 AND kcu.table_schema = tc.table_schema
                 AND kcu.table_name = tc.table_name
                WHERE tc.constraint_type = 'PRIMARY KEY'
                  AND tc.table_schema = c.table_schema
                  AND tc.table_name = c.table_name
                  AND kcu.column_name = c.column_name
            ) AS is_primary_key,
            c.character_maximum_length::int4 AS character_maximum_length,
            c.numeric_precision::int4 AS numeric_precision,
            c.numeric_scale::int4 AS numeric_scale
        FROM information_schema.columns c
        WHERE c.table_schema = $1 AND c.table_name = $2
        ORDER BY c.ordinal_position
        "#,
    )
    .bind(table_schema)
    .bind(table_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch columns: {e}")))?;

    let columns = rows
        .into_iter()
        .map(|row| Column {
            name: row.get("column_name"),
            data_type: row.get("data_type"),
            is_nullable: row.get("is_nullable"),
            default_value: row.get("column_default"),
            is_primary_key: row.get("is_primary_key"),
            character_length: row.get("character_maximum_length"),
            numeric_precision: row.get("numeric_precision"),
            numeric_scale: row.get("numeric_scale"),
        })
        .collect();

    Ok(columns)
}

async fn introspect_indexes(
    connection: &PgConnection,
    table_schema: &str,
    table_name: &str,
) -> Result<Vec<Index>> {
    let rows = sqlx::query(
        r#"
        SELECT i.relname::text AS index_name, ix.indisunique,
               array_agg(a.attname::text ORDER BY array_position(ix.indkey, a.attnum)) AS columns
        FROM pg_index ix
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
        JOIN pg_namespace n ON n.oid = t.relnamespace
        WHERE t.relname = $1 AND n.nspname = $2 AND NOT ix.indisprimary
        GROUP BY i.relname, ix.indisunique
        ORDER BY i.relname
        "#,
    )
    .bind(table_name)
    .bind(table_schema)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch indexes: {e}")))?;

    let indexes = rows
        .into_iter()
        .map(|row| Index {
            name: row.get("index_name"),
            columns: row.get("columns"),
            is_unique: row.get("indisunique"),
        })
        .collect();

    Ok(indexes)
}
