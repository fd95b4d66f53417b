mod common;

use serde_json::json;
use stratum_interpreter::interpret::{InterpretationError, InterpreterConfig, ParameterMode};
use stratum_query::{
    Condition, Direction, Join, JoinKind, Limit, Operand, Operator, Ordering, OrderingElement,
    QueryKind, Reference, Token, TokenSequence, ValueToken,
};

#[test]
fn plain_find_projects_the_metadata_field_list() {
    let interpreter = common::interpreter();
    let query = TokenSequence::new(QueryKind::Find, "user");

    let compiled = interpreter.interpret(query).unwrap();

    insta::assert_snapshot!(
        compiled.sql,
        @r#"SELECT "id", "name", "email", "created_at" FROM "users""#
    );
    assert!(compiled.parameters.is_empty());
    assert_eq!(compiled.primary_key_sequence, None);
}

#[test]
fn included_relationships_expand_to_prefixed_projections() {
    let interpreter = common::interpreter();
    let query = TokenSequence::new(QueryKind::Find, "user")
        .include("orders", "order")
        .with_token(Token::Join(Join {
            target: "orders".to_string(),
            alias: None,
            kind: JoinKind::Left,
            on: Condition::new(
                Operator::Equals,
                vec![
                    Operand::Reference(Reference::new("orders.user_id")),
                    Operand::Reference(Reference::new("users.id")),
                ],
            ),
        }))
        .with_token(Token::Condition(Condition::new(
            Operator::Equals,
            vec![
                Operand::Reference(Reference::new("users.name")),
                Operand::Value(ValueToken::new(json!("alice"))),
            ],
        )))
        .with_token(Token::Ordering(Ordering {
            elements: vec![OrderingElement {
                field: Reference::new("users.created_at"),
                direction: Direction::Desc,
            }],
        }))
        .with_token(Token::Limit(Limit {
            count: 10,
            offset: Some(5),
        }));

    let compiled = interpreter.interpret(query).unwrap();

    insta::assert_snapshot!(
        compiled.sql,
        @r#"SELECT "users"."id" AS "users__id", "users"."name" AS "users__name", "users"."email" AS "users__email", "users"."created_at" AS "users__created_at", "orders"."id" AS "orders__id", "orders"."user_id" AS "orders__user_id", "orders"."total" AS "orders__total" FROM "users" LEFT JOIN "orders" ON ("orders"."user_id" = "users"."id") WHERE ("users"."name" = :name) ORDER BY "users"."created_at" DESC LIMIT 10 OFFSET 5"#
    );
    assert_eq!(compiled.parameters.len(), 1);
    assert_eq!(compiled.parameters.get("name"), Some(&json!("alice")));
}

#[test]
fn escaped_mode_inlines_literals_and_binds_nothing() {
    let interpreter = common::interpreter_with(InterpreterConfig {
        identifier_delimiter: "`".to_string(),
        parameter_mode: ParameterMode::Escaped,
    });
    let query =
        TokenSequence::new(QueryKind::Find, "user").with_token(Token::Condition(Condition::new(
            Operator::Equals,
            vec![
                Operand::Reference(Reference::new("name")),
                Operand::Value(ValueToken::new(json!("O'Brien"))),
            ],
        )));

    let compiled = interpreter.interpret(query).unwrap();

    insta::assert_snapshot!(
        compiled.sql,
        @"SELECT `id`, `name`, `email`, `created_at` FROM `users` WHERE (`name` = 'O''Brien')"
    );
    assert!(compiled.parameters.is_empty());
}

#[test]
fn unknown_included_entities_surface_as_metadata_errors() {
    let interpreter = common::interpreter();
    let query = TokenSequence::new(QueryKind::Find, "user").include("ghosts", "ghost");

    let error = interpreter.interpret(query).unwrap_err();
    assert!(matches!(error, InterpretationError::Metadata(_)));
}
