//! Compile delete queries to DELETE statements.

use stratum_metadata::metadata::MetadataProvider;
use stratum_query::{QueryKind, TokenSequence};

use crate::interpret::context::RenderContext;
use crate::interpret::error::InterpretationError;
use crate::interpret::interpreter::QueryTypeCompiler;
use crate::interpret::render;

/// Compiles delete queries. Entity tokens render to empty text; deletes
/// carry no row payloads.
#[derive(Debug, Default)]
pub struct DeleteCompiler;

impl QueryTypeCompiler for DeleteCompiler {
    fn supported_kind(&self) -> QueryKind {
        QueryKind::Delete
    }

    fn compile(
        &self,
        mut query: TokenSequence,
        provider: &dyn MetadataProvider,
        ctx: &mut RenderContext,
    ) -> Result<String, InterpretationError> {
        let metadata = provider.entity_metadata(query.entity())?;

        let mut sql = format!("DELETE FROM {}", ctx.quote_identifier(&metadata.collection));
        sql.push_str(&render::render_clause_tokens(ctx, &mut query)?);

        Ok(sql)
    }
}
