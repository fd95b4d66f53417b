//! Shared token rendering. Everything except entity payloads renders the
//! same way for every query kind; entity rendering stays with the compilers.

use stratum_query::{
    Condition, Direction, Grouping, Join, JoinKind, Limit, Operand, Operator, Ordering, Reference,
    Token, TokenSequence, ValueToken,
};

use crate::interpret::context::RenderContext;
use crate::interpret::error::InterpretationError;

/// Render a field or collection reference, quoting each dotted segment.
pub fn render_reference(ctx: &RenderContext, reference: &Reference) -> String {
    let quoted = ctx.quote_identifier(&reference.name);
    match &reference.alias {
        Some(alias) => format!("{} AS {}", quoted, ctx.quote_identifier(alias)),
        None => quoted,
    }
}

/// Render a literal value, binding it on the context.
pub fn render_value(ctx: &mut RenderContext, value: &ValueToken) -> String {
    ctx.bind(None, value.value.clone(), value.kind)
}

/// Render a condition tree.
pub fn render_condition(
    ctx: &mut RenderContext,
    condition: &Condition,
) -> Result<String, InterpretationError> {
    let operator = condition.operator;
    match operator {
        Operator::And | Operator::Or => {
            let keyword = if operator == Operator::And {
                " AND "
            } else {
                " OR "
            };
            let parts = condition
                .operands
                .iter()
                .map(|operand| render_operand(ctx, operand, None))
                .collect::<Result<Vec<_>, _>>()?;
            if parts.is_empty() {
                return Err(InterpretationError::MalformedCondition(operator));
            }
            Ok(format!("({})", parts.join(keyword)))
        }
        Operator::Not => {
            let inner = condition
                .operands
                .first()
                .ok_or(InterpretationError::MalformedCondition(operator))?;
            Ok(format!("NOT {}", render_operand(ctx, inner, None)?))
        }
        Operator::IsNull | Operator::IsNotNull => {
            let inner = condition
                .operands
                .first()
                .ok_or(InterpretationError::MalformedCondition(operator))?;
            Ok(format!(
                "{} {}",
                render_operand(ctx, inner, None)?,
                operator_sql(operator)
            ))
        }
        Operator::In | Operator::NotIn => {
            let (subject, members) = condition
                .operands
                .split_first()
                .ok_or(InterpretationError::MalformedCondition(operator))?;
            let hint = operand_hint(subject);
            let left = render_operand(ctx, subject, None)?;
            let rendered = members
                .iter()
                .map(|member| render_operand(ctx, member, hint))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!(
                "({} {} ({}))",
                left,
                operator_sql(operator),
                rendered.join(", ")
            ))
        }
        _ => {
            let [left, right] = condition.operands.as_slice() else {
                return Err(InterpretationError::MalformedCondition(operator));
            };
            let hint = operand_hint(left);
            let left_sql = render_operand(ctx, left, None)?;
            let right_sql = render_operand(ctx, right, hint)?;
            Ok(format!(
                "({} {} {})",
                left_sql,
                operator_sql(operator),
                right_sql
            ))
        }
    }
}

/// Name bound values after the field they compare against where possible.
fn operand_hint(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Reference(reference) => {
            Some(reference.name.rsplit('.').next().unwrap_or(&reference.name))
        }
        _ => None,
    }
}

fn render_operand(
    ctx: &mut RenderContext,
    operand: &Operand,
    hint: Option<&str>,
) -> Result<String, InterpretationError> {
    match operand {
        Operand::Reference(reference) => Ok(render_reference(ctx, reference)),
        Operand::Value(value) => Ok(ctx.bind(hint, value.value.clone(), value.kind)),
        Operand::Condition(condition) => render_condition(ctx, condition),
    }
}

fn operator_sql(operator: Operator) -> &'static str {
    match operator {
        Operator::Equals => "=",
        Operator::NotEquals => "!=",
        Operator::GreaterThan => ">",
        Operator::GreaterThanOrEqualTo => ">=",
        Operator::LessThan => "<",
        Operator::LessThanOrEqualTo => "<=",
        Operator::Like => "LIKE",
        Operator::NotLike => "NOT LIKE",
        Operator::In => "IN",
        Operator::NotIn => "NOT IN",
        Operator::IsNull => "IS NULL",
        Operator::IsNotNull => "IS NOT NULL",
        Operator::And => "AND",
        Operator::Or => "OR",
        Operator::Not => "NOT",
    }
}

/// Render a join clause against a related collection.
pub fn render_join(ctx: &mut RenderContext, join: &Join) -> Result<String, InterpretationError> {
    let keyword = match join.kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
    };
    let mut sql = format!("{} {}", keyword, ctx.quote_identifier(&join.target));
    if let Some(alias) = &join.alias {
        sql.push_str(" AS ");
        sql.push_str(&ctx.quote_identifier(alias));
    }
    sql.push_str(" ON ");
    sql.push_str(&render_condition(ctx, &join.on)?);
    Ok(sql)
}

pub fn render_grouping(ctx: &RenderContext, grouping: &Grouping) -> String {
    let references = grouping
        .references
        .iter()
        .map(|reference| render_reference(ctx, reference))
        .collect::<Vec<_>>();
    format!("GROUP BY {}", references.join(", "))
}

pub fn render_ordering(ctx: &RenderContext, ordering: &Ordering) -> String {
    let elements = ordering
        .elements
        .iter()
        .map(|element| {
            let direction = match element.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", render_reference(ctx, &element.field), direction)
        })
        .collect::<Vec<_>>();
    format!("ORDER BY {}", elements.join(", "))
}

pub fn render_limit(limit: &Limit) -> String {
    match limit.offset {
        Some(offset) => format!("LIMIT {} OFFSET {}", limit.count, offset),
        None => format!("LIMIT {}", limit.count),
    }
}

/// Render the remaining clause tokens of a stream in order. The token model
/// carries no structural WHERE: the first top level condition takes the
/// keyword, later ones join with AND. Entity tokens render to empty text
/// here; compilers that project row payloads handle them before this point.
pub fn render_clause_tokens(
    ctx: &mut RenderContext,
    query: &mut TokenSequence,
) -> Result<String, InterpretationError> {
    let mut sql = String::new();
    let mut saw_condition = false;
    while let Some(token) = query.next_token() {
        let clause = match &token {
            Token::Reference(reference) => render_reference(ctx, reference),
            Token::Value(value) => render_value(ctx, value),
            Token::Entity(_) => continue,
            Token::Join(join) => render_join(ctx, join)?,
            Token::Condition(condition) => {
                let keyword = if saw_condition { "AND" } else { "WHERE" };
                saw_condition = true;
                format!("{} {}", keyword, render_condition(ctx, condition)?)
            }
            Token::Grouping(grouping) => render_grouping(ctx, grouping),
            Token::Ordering(ordering) => render_ordering(ctx, ordering),
            Token::Limit(limit) => render_limit(limit),
        };
        if !clause.is_empty() {
            sql.push(' ');
            sql.push_str(&clause);
        }
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::context::ParameterMode;
    use serde_json::json;
    use stratum_query::{OrderingElement, QueryKind};

    fn ctx() -> RenderContext {
        RenderContext::new("\"", ParameterMode::Substitution)
    }

    #[test]
    fn binary_conditions_bind_named_after_the_referenced_field() {
        let mut ctx = ctx();
        let condition = Condition::new(
            Operator::Equals,
            vec![
                Operand::Reference(Reference::new("users.name")),
                Operand::Value(ValueToken::new(json!("alice"))),
            ],
        );

        let sql = render_condition(&mut ctx, &condition).unwrap();
        assert_eq!(sql, "(\"users\".\"name\" = :name)");

        let compiled = ctx.into_compiled(String::new());
        assert_eq!(compiled.parameters.get("name"), Some(&json!("alice")));
    }

    #[test]
    fn logical_operators_nest_with_parentheses() {
        let mut ctx = ctx();
        let condition = Condition::new(
            Operator::Or,
            vec![
                Operand::Condition(Box::new(Condition::new(
                    Operator::GreaterThan,
                    vec![
                        Operand::Reference(Reference::new("total")),
                        Operand::Value(ValueToken::new(json!(100))),
                    ],
                ))),
                Operand::Condition(Box::new(Condition::new(
                    Operator::IsNull,
                    vec![Operand::Reference(Reference::new("discount"))],
                ))),
            ],
        );

        let sql = render_condition(&mut ctx, &condition).unwrap();
        assert_eq!(sql, "((\"total\" > :total) OR \"discount\" IS NULL)");
    }

    #[test]
    fn in_lists_render_every_member() {
        let mut ctx = ctx();
        let condition = Condition::new(
            Operator::In,
            vec![
                Operand::Reference(Reference::new("level")),
                Operand::Value(ValueToken::new(json!("warn"))),
                Operand::Value(ValueToken::new(json!("error"))),
            ],
        );

        let sql = render_condition(&mut ctx, &condition).unwrap();
        assert_eq!(sql, "(\"level\" IN (:level, :level_1))");
    }

    #[test]
    fn clause_tokens_sequence_where_and_trailing_clauses() {
        let mut ctx = ctx();
        let mut query = TokenSequence::new(QueryKind::Find, "user")
            .with_token(Token::Condition(Condition::new(
                Operator::Equals,
                vec![
                    Operand::Reference(Reference::new("name")),
                    Operand::Value(ValueToken::new(json!("a"))),
                ],
            )))
            .with_token(Token::Condition(Condition::new(
                Operator::IsNotNull,
                vec![Operand::Reference(Reference::new("email"))],
            )))
            .with_token(Token::Ordering(Ordering {
                elements: vec![OrderingElement {
                    field: Reference::new("name"),
                    direction: Direction::Asc,
                }],
            }))
            .with_token(Token::Limit(Limit {
                count: 10,
                offset: Some(20),
            }));

        let sql = render_clause_tokens(&mut ctx, &mut query).unwrap();
        assert_eq!(
            sql,
            " WHERE (\"name\" = :name) AND \"email\" IS NOT NULL ORDER BY \"name\" ASC LIMIT 10 OFFSET 20"
        );
    }
}
