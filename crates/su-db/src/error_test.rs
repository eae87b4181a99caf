use super::*;

#[test]
fn test_classify_mysql_access_denied() {
    for number in [1044, 1045, 1142, 1227] {
        let err = classify_mysql_error(number, "denied".to_string());
        assert!(matches!(err, DbError::PermissionDenied(_)), "{number}");
    }
}

#[test]
fn test_classify_mysql_duplicate_entry() {
    let err = classify_mysql_error(1062, "Duplicate entry '1' for key 'PRIMARY'".to_string());
    assert!(matches!(err, DbError::ConstraintViolation(_)));
}

#[test]
fn test_classify_mysql_other_errors() {
    let err = classify_mysql_error(1064, "You have an error in your SQL syntax".to_string());
    assert!(matches!(err, DbError::ExecutionError(_)));
    assert!(err.to_string().starts_with("[D002]"));
}

#[test]
fn test_sqlx_io_error_is_connection_error() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let err: DbError = sqlx::Error::Io(io).into();
    assert!(matches!(err, DbError::ConnectionError(_)));
}

#[test]
fn test_sqlx_row_not_found_is_execution_error() {
    let err: DbError = sqlx::Error::RowNotFound.into();
    assert!(matches!(err, DbError::ExecutionError(_)));
}
