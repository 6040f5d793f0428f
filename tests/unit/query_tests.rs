/*!
 * Tests for the parameterized statement builder
 */

use linguadeck::database::query::{Columns, QueryBuilder, renumber_placeholders};
use linguadeck::errors::AppError;
use rusqlite::types::Value;

#[test]
fn test_insert_shouldNumberPlaceholdersInColumnOrder() {
    let stmt = QueryBuilder::insert(
        "language",
        &["title", "languageText", "voice"],
        vec![
            Value::Text("French".into()),
            Value::Text("fr-FR".into()),
            Value::Text("fr-FR-DeniseNeural".into()),
        ],
    )
    .unwrap();

    assert_eq!(
        stmt.sql,
        "INSERT INTO language (title, languageText, voice) VALUES ($1, $2, $3)"
    );
    assert_eq!(stmt.params.len(), 3);
}

#[test]
fn test_insert_withMismatchedValues_shouldFailValidation() {
    let result = QueryBuilder::insert("word", &["content", "sort"], vec![Value::Integer(1)]);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_update_shouldBindConditionArgsAfterAssignments() {
    let stmt = QueryBuilder::update(
        "word",
        vec![("content", Value::Text("hola".into())), ("sort", Value::Integer(2))],
        "id = ? AND classId = ?",
        vec![Value::Integer(10), Value::Integer(3)],
    );

    assert_eq!(
        stmt.sql,
        "UPDATE word SET content = $1, sort = $2 WHERE id = $3 AND classId = $4"
    );
    assert_eq!(
        stmt.params,
        vec![
            Value::Text("hola".into()),
            Value::Integer(2),
            Value::Integer(10),
            Value::Integer(3),
        ]
    );
}

#[test]
fn test_select_withEmptyColumnList_shouldSelectAll() {
    let stmt = QueryBuilder::select("class", Columns::List(&[]), "", vec![]);
    assert_eq!(stmt.sql, "SELECT * FROM class");
}

#[test]
fn test_select_withColumnsAndOrder_shouldRenderBoth() {
    let stmt = QueryBuilder::select(
        "class",
        Columns::List(&["id", "title"]),
        "languageId = ?",
        vec![Value::Integer(1)],
    )
    .order_by("id DESC");

    assert_eq!(
        stmt.sql,
        "SELECT id, title FROM class WHERE languageId = $1 ORDER BY id DESC"
    );
}

#[test]
fn test_delete_withoutCondition_shouldOmitWhere() {
    let stmt = QueryBuilder::delete("wordBase64", "  ", vec![]);
    assert_eq!(stmt.sql, "DELETE FROM wordBase64");
}

#[test]
fn test_renumberPlaceholders_withOffset_shouldContinueNumbering() {
    assert_eq!(renumber_placeholders("a = ? OR b = ?", 4), "a = $5 OR b = $6");
    assert_eq!(renumber_placeholders("a = 1", 4), "a = 1");
}
