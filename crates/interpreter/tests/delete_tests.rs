mod common;

use indexmap::IndexMap;
use serde_json::json;
use stratum_query::{
    Condition, EntityValue, Limit, Operand, Operator, QueryKind, Reference, Token, TokenSequence,
    ValueToken,
};

#[test]
fn deletes_render_their_condition_tokens() {
    let interpreter = common::interpreter();
    let query =
        TokenSequence::new(QueryKind::Delete, "user").with_token(Token::Condition(Condition::new(
            Operator::Equals,
            vec![
                Operand::Reference(Reference::new("id")),
                Operand::Value(ValueToken::new(json!(7))),
            ],
        )));

    let compiled = interpreter.interpret(query).unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"DELETE FROM "users" WHERE ("id" = :id)"#);
    assert_eq!(compiled.parameters.get("id"), Some(&json!(7)));
}

#[test]
fn entity_tokens_render_to_empty_text_in_deletes() {
    let interpreter = common::interpreter();
    let query = TokenSequence::new(QueryKind::Delete, "user")
        .with_token(Token::Entity(EntityValue::record(IndexMap::new())))
        .with_token(Token::Limit(Limit {
            count: 1,
            offset: None,
        }));

    let compiled = interpreter.interpret(query).unwrap();

    insta::assert_snapshot!(compiled.sql, @r#"DELETE FROM "users" LIMIT 1"#);
    assert!(compiled.parameters.is_empty());
}
