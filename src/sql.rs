//! SQL statement assembly
//!
//! Column names originate from untrusted file content, so every identifier
//! is quoted per PostgreSQL double-quote rules before it reaches a
//! statement. Nothing in this module executes SQL; the loader does.

/// Schema all staging tables live in
pub const STAGING_SCHEMA: &str = "staging";

/// Quote an identifier: wrap in double quotes and double any embedded quote.
///
/// This makes arbitrary header text a literal identifier, never SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Unquoted `staging.<source>` name, for reports and log lines
pub fn qualified_name(source: &str) -> String {
    format!("{}.{}", STAGING_SCHEMA, source)
}

/// Quoted `"staging"."<source>"` reference, for statements
fn table_ref(source: &str) -> String {
    format!("{}.{}", quote_ident(STAGING_SCHEMA), quote_ident(source))
}

/// `CREATE SCHEMA IF NOT EXISTS staging` (idempotent, non-destructive)
pub fn create_schema() -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(STAGING_SCHEMA))
}

/// Destructive drop of any existing staging table for the source
pub fn drop_table(source: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", table_ref(source))
}

/// Create the staging table: one unconstrained TEXT column per header
/// field, in header order. No keys, no indexes.
pub fn create_table(source: &str, columns: &[String]) -> String {
    let column_defs: Vec<String> = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect();
    format!("CREATE TABLE {} ({})", table_ref(source), column_defs.join(", "))
}

/// COPY statement for the bulk transfer. `HEADER true` tells the server to
/// expect and skip the header line, so the whole file is streamed as-is.
pub fn copy_from_stdin(source: &str, columns: &[String]) -> String {
    let column_list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv, HEADER true)",
        table_ref(source),
        column_list.join(", ")
    )
}

/// Row count query for the post-load report
pub fn count_rows(source: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table_ref(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("match_id"), "\"match_id\"");
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_quote_ident_neutralises_injection_attempt() {
        let hostile = "\"; DROP TABLE users; --";
        let quoted = quote_ident(hostile);
        // The embedded quote is doubled, so the identifier cannot close early.
        assert_eq!(quoted, "\"\"\"; DROP TABLE users; --\"");
    }

    #[test]
    fn test_quote_ident_reserved_word() {
        assert_eq!(quote_ident("select"), "\"select\"");
    }

    #[test]
    fn test_create_table_statement() {
        let sql = create_table("results", &cols(&["match_id", "team_a", "team_b"]));
        assert_eq!(
            sql,
            "CREATE TABLE \"staging\".\"results\" \
             (\"match_id\" TEXT, \"team_a\" TEXT, \"team_b\" TEXT)"
        );
    }

    #[test]
    fn test_drop_table_statement() {
        assert_eq!(
            drop_table("picks"),
            "DROP TABLE IF EXISTS \"staging\".\"picks\""
        );
    }

    #[test]
    fn test_copy_statement_expects_header() {
        let sql = copy_from_stdin("economy", &cols(&["match_id", "round"]));
        assert_eq!(
            sql,
            "COPY \"staging\".\"economy\" (\"match_id\", \"round\") \
             FROM STDIN WITH (FORMAT csv, HEADER true)"
        );
    }

    #[test]
    fn test_count_statement() {
        assert_eq!(
            count_rows("players"),
            "SELECT COUNT(*) FROM \"staging\".\"players\""
        );
    }

    #[test]
    fn test_qualified_name_is_unquoted() {
        assert_eq!(qualified_name("results"), "staging.results");
    }
}
