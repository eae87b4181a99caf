use super::*;

fn sqls(content: &str) -> Vec<String> {
    split_statements(content).into_iter().map(|s| s.sql).collect()
}

#[test]
fn test_split_two_inserts() {
    let stmts = split_statements("INSERT INTO t VALUES (1);\nINSERT INTO t VALUES (2);\n");
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[0].sql, "INSERT INTO t VALUES (1)");
    assert_eq!(stmts[0].ordinal, 1);
    assert_eq!(stmts[1].sql, "INSERT INTO t VALUES (2)");
    assert_eq!(stmts[1].ordinal, 2);
}

#[test]
fn test_split_without_trailing_delimiter() {
    assert_eq!(
        sqls("CREATE TABLE a (id INT);\nCREATE TABLE b (id INT)"),
        vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]
    );
}

#[test]
fn test_split_drops_blank_fragments() {
    let content = "\n;\nCREATE TABLE a (id INT);\n\n;\n   \n";
    assert_eq!(sqls(content), vec!["CREATE TABLE a (id INT)"]);
}

#[test]
fn test_split_keeps_multiline_statement_text() {
    let content = "CREATE TABLE users (\n  id INT,\n  name TEXT\n);\n";
    assert_eq!(
        sqls(content),
        vec!["CREATE TABLE users (\n  id INT,\n  name TEXT\n)"]
    );
}

#[test]
fn test_split_keeps_leading_whitespace_of_later_statements() {
    let content = "SELECT 1;\n\nSELECT 2;\n";
    assert_eq!(sqls(content), vec!["SELECT 1", "\nSELECT 2"]);
}

#[test]
fn test_semicolon_without_newline_does_not_split() {
    assert_eq!(sqls("SELECT 1; SELECT 2;\n"), vec!["SELECT 1; SELECT 2"]);
}

#[test]
fn test_crlf_does_not_split() {
    assert_eq!(sqls("SELECT 1;\r\nSELECT 2;\r\n"), vec!["SELECT 1;\r\nSELECT 2;\r\n"]);
}

#[test]
fn test_delimiter_inside_literal_mis_splits() {
    // Known limitation of the textual delimiter.
    let content = "INSERT INTO t VALUES ('a;\nb');\n";
    assert_eq!(sqls(content), vec!["INSERT INTO t VALUES ('a", "b')"]);
}

#[test]
fn test_empty_content() {
    assert!(split_statements("").is_empty());
    assert!(split_statements("\n\n").is_empty());
}
