//! Dispatch queries to the compiler matching their declared kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stratum_metadata::metadata::MetadataProvider;
use stratum_query::{QueryKind, TokenSequence};

use crate::interpret::compiled::CompiledQuery;
use crate::interpret::compilers;
use crate::interpret::context::{ParameterMode, RenderContext};
use crate::interpret::error::InterpretationError;

/// Compile time interpreter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Delimiter wrapped around every identifier segment.
    pub identifier_delimiter: String,
    /// Parameter substitution or raw escaping.
    pub parameter_mode: ParameterMode,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            identifier_delimiter: "\"".to_string(),
            parameter_mode: ParameterMode::default(),
        }
    }
}

/// A compiler for one query kind.
///
/// Compilers hold no call state: everything scoped to a single compilation
/// lives in the [`RenderContext`] handed to `compile`, so one compiler
/// instance serves any number of concurrent interpretations.
pub trait QueryTypeCompiler {
    /// The query kind this compiler understands.
    fn supported_kind(&self) -> QueryKind;

    /// Render the token sequence to SQL, binding parameters on the context.
    fn compile(
        &self,
        query: TokenSequence,
        provider: &dyn MetadataProvider,
        ctx: &mut RenderContext,
    ) -> Result<String, InterpretationError>;
}

/// Interprets token sequences by dispatching to registered type compilers.
pub struct SqlQueryInterpreter {
    compilers: Vec<Box<dyn QueryTypeCompiler>>,
    config: InterpreterConfig,
    metadata_provider: Option<Arc<dyn MetadataProvider>>,
}

impl SqlQueryInterpreter {
    pub fn new(compilers: Vec<Box<dyn QueryTypeCompiler>>, config: InterpreterConfig) -> Self {
        SqlQueryInterpreter {
            compilers,
            config,
            metadata_provider: None,
        }
    }

    /// An interpreter with the select, save and delete compilers installed.
    pub fn with_default_compilers(config: InterpreterConfig) -> Self {
        Self::new(compilers::default_compilers(), config)
    }

    pub fn set_metadata_provider(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.metadata_provider = Some(provider);
    }

    /// Interpret one token sequence into a [`CompiledQuery`].
    ///
    /// Compiler selection is a first match scan over the registered
    /// compilers; kinds are mutually exclusive so order only matters for
    /// determinism.
    pub fn interpret(&self, query: TokenSequence) -> Result<CompiledQuery, InterpretationError> {
        let provider = self
            .metadata_provider
            .as_ref()
            .ok_or(InterpretationError::NoMetadataProvider)?;

        let kind = query.kind();
        let compiler = self
            .compilers
            .iter()
            .find(|compiler| compiler.supported_kind() == kind)
            .ok_or(InterpretationError::UnsupportedQueryKind(kind))?;

        let mut ctx = RenderContext::new(
            self.config.identifier_delimiter.clone(),
            self.config.parameter_mode,
        );
        let sql = compiler.compile(query, provider.as_ref(), &mut ctx)?;

        tracing::debug!(%kind, parameters = ctx.parameter_count(), sql = %sql, "interpreted query");

        Ok(ctx.into_compiled(sql))
    }
}
