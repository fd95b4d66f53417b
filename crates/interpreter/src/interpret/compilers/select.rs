//! Compile find queries to SELECT statements.

use stratum_metadata::metadata::MetadataProvider;
use stratum_query::{QueryKind, TokenSequence};

use crate::interpret::context::RenderContext;
use crate::interpret::error::InterpretationError;
use crate::interpret::interpreter::QueryTypeCompiler;
use crate::interpret::render;

/// Compiles find queries. Projections are metadata driven: the root field
/// list, expanded with `<alias>__<field>` columns for every included
/// relationship so the denormaliser can assign each column to its owning
/// alias.
#[derive(Debug, Default)]
pub struct SelectCompiler;

impl QueryTypeCompiler for SelectCompiler {
    fn supported_kind(&self) -> QueryKind {
        QueryKind::Find
    }

    fn compile(
        &self,
        mut query: TokenSequence,
        provider: &dyn MetadataProvider,
        ctx: &mut RenderContext,
    ) -> Result<String, InterpretationError> {
        let metadata = provider.entity_metadata(query.entity())?;

        let mut projections: Vec<String> = vec![];
        if query.includes().is_empty() {
            for field in &metadata.fields {
                projections.push(ctx.quote_identifier(field));
            }
        } else {
            push_prefixed_projections(ctx, &mut projections, &metadata.collection, &metadata.fields);
            for (alias, entity) in query.includes() {
                let child = provider.entity_metadata(entity)?;
                push_prefixed_projections(ctx, &mut projections, alias, &child.fields);
            }
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            projections.join(", "),
            ctx.quote_identifier(&metadata.collection),
        );
        sql.push_str(&render::render_clause_tokens(ctx, &mut query)?);

        Ok(sql)
    }
}

/// Project `prefix.field AS prefix__field` for each field of a collection.
fn push_prefixed_projections(
    ctx: &RenderContext,
    projections: &mut Vec<String>,
    prefix: &str,
    fields: &[String],
) {
    for field in fields {
        projections.push(format!(
            "{}.{} AS {}",
            ctx.quote_identifier(prefix),
            ctx.quote_identifier(field),
            ctx.quote_identifier(&format!("{prefix}__{field}")),
        ));
    }
}
