//! Compile save queries to INSERT or UPDATE statements.

use heck::{ToLowerCamelCase, ToSnakeCase};
use indexmap::IndexMap;
use stratum_metadata::metadata::{MetadataProvider, RelationshipKind};
use stratum_query::{EntityValue, QueryKind, SaveType, Token, TokenSequence};

use crate::interpret::context::RenderContext;
use crate::interpret::error::InterpretationError;
use crate::interpret::interpreter::QueryTypeCompiler;

/// Compiles save queries. Whether a save becomes an INSERT (possibly multi
/// row) or an UPDATE is decided per call from the entity's primary key
/// state and the query options.
#[derive(Debug, Default)]
pub struct SaveCompiler;

/// A relationship derived column: resolved through the parent entity's
/// accessor for `property`, then the related entity's accessor for the
/// property named after `their_field`.
struct RelatedColumn {
    property: String,
    their_field: String,
}

impl QueryTypeCompiler for SaveCompiler {
    fn supported_kind(&self) -> QueryKind {
        QueryKind::Save
    }

    fn compile(
        &self,
        mut query: TokenSequence,
        provider: &dyn MetadataProvider,
        ctx: &mut RenderContext,
    ) -> Result<String, InterpretationError> {
        let metadata = provider.entity_metadata(query.entity())?;

        let first = match query.next_token() {
            Some(Token::Entity(entity)) => entity,
            _ => return Err(InterpretationError::MissingEntity),
        };

        let pk_field = metadata.primary_key.as_ref().map(|pk| pk.field.clone());
        let auto_generated = metadata
            .primary_key
            .as_ref()
            .is_some_and(|pk| pk.auto_generated);

        // the entity's current key value decides INSERT vs UPDATE
        let id = match (&first, &pk_field) {
            (_, None) => None,
            (EntityValue::Record(fields), Some(field)) => fields.get(field).cloned(),
            (EntityValue::Object(object), Some(field)) => {
                let property = field.to_lower_camel_case();
                let value = object
                    .field(&property)
                    .ok_or(InterpretationError::MissingAccessor { property })?;
                Some(value)
            }
        };
        let has_id = matches!(&id, Some(value) if !value.is_null());

        // candidate field list in metadata order, plus any local foreign
        // keys implied by one to one relationships
        let mut field_sql: IndexMap<String, String> = IndexMap::new();
        for field in &metadata.fields {
            field_sql.insert(field.clone(), ctx.quote_identifier(field));
        }
        let mut related_columns: IndexMap<String, RelatedColumn> = IndexMap::new();
        for relationship in metadata.relationships.values() {
            if relationship.kind != RelationshipKind::OneToOne {
                continue;
            }
            let Some(our_field) = &relationship.our_field else {
                continue;
            };
            field_sql.insert(our_field.clone(), ctx.quote_identifier(our_field));
            let their_field = match &relationship.their_field {
                Some(field) => field.clone(),
                None => provider
                    .entity_metadata(&relationship.entity)
                    .ok()
                    .and_then(|child| child.primary_key.map(|pk| pk.field))
                    .unwrap_or_else(|| "id".to_string()),
            };
            related_columns.insert(
                our_field.clone(),
                RelatedColumn {
                    property: relationship.property.clone(),
                    their_field,
                },
            );
        }

        let force_update = query.options().save_type == Some(SaveType::Update);
        let is_insert = !has_id || (!auto_generated && !force_update);

        // the key never appears in an UPDATE's SET list, nor in the field
        // list when the database generates it
        if let Some(field) = &pk_field {
            if !is_insert || auto_generated {
                field_sql.shift_remove(field);
            }
        }

        let collection = ctx.quote_identifier(&metadata.collection);

        if !is_insert {
            if let Some(pk) = &pk_field {
                let set_list = render_update_set(ctx, &field_sql, &related_columns, &first, pk);
                let placeholder = ctx.bind(
                    Some("searchId"),
                    id.unwrap_or(serde_json::Value::Null),
                    None,
                );
                return Ok(format!(
                    "UPDATE {} SET {} WHERE {} = {}",
                    collection,
                    set_list,
                    ctx.quote_identifier(pk),
                    placeholder,
                ));
            }
        }

        let mut tuples = vec![render_insert_tuple(ctx, &field_sql, &related_columns, &first)];
        while let Some(token) = query.next_token() {
            match token {
                Token::Entity(entity) => {
                    tuples.push(render_insert_tuple(ctx, &field_sql, &related_columns, &entity));
                }
                other => return Err(InterpretationError::UnexpectedToken(other.name())),
            }
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            collection,
            field_sql.values().cloned().collect::<Vec<_>>().join(", "),
            tuples.join(", "),
        );

        if auto_generated {
            if let Some(pk) = &pk_field {
                ctx.set_primary_key_sequence(format!("{}_{}_seq", metadata.collection, pk));
            }
        }

        Ok(sql)
    }
}

/// Render one `(...)` tuple for an INSERT, binding a parameter per field.
/// Fields the entity does not carry bind as null.
fn render_insert_tuple(
    ctx: &mut RenderContext,
    field_sql: &IndexMap<String, String>,
    related_columns: &IndexMap<String, RelatedColumn>,
    entity: &EntityValue,
) -> String {
    let data = entity_data(entity, related_columns);
    let values = field_sql
        .keys()
        .map(|field| {
            let value = data.get(field).cloned().unwrap_or(serde_json::Value::Null);
            ctx.bind(Some(field), value, None)
        })
        .collect::<Vec<_>>();
    format!("({})", values.join(", "))
}

/// Render the SET list for an UPDATE. Fields the entity does not carry are
/// skipped, as is the primary key.
fn render_update_set(
    ctx: &mut RenderContext,
    field_sql: &IndexMap<String, String>,
    related_columns: &IndexMap<String, RelatedColumn>,
    entity: &EntityValue,
    primary_key: &str,
) -> String {
    let data = entity_data(entity, related_columns);
    let assignments = field_sql
        .iter()
        .filter(|(field, _)| field.as_str() != primary_key && data.contains_key(field.as_str()))
        .map(|(field, quoted)| {
            let value = data.get(field).cloned().unwrap_or(serde_json::Value::Null);
            format!("{} = {}", quoted, ctx.bind(Some(field), value, None))
        })
        .collect::<Vec<_>>();
    assignments.join(", ")
}

/// Flatten an entity to storage named columns. Records pass through as
/// given; objects export their fields with property names converted to the
/// storage convention, merged with any resolved relationship columns. A
/// relationship column is omitted when the related entity or its accessor
/// is absent.
fn entity_data(
    entity: &EntityValue,
    related_columns: &IndexMap<String, RelatedColumn>,
) -> IndexMap<String, serde_json::Value> {
    match entity {
        EntityValue::Record(fields) => fields.clone(),
        EntityValue::Object(object) => {
            let mut data: IndexMap<String, serde_json::Value> = object
                .export()
                .into_iter()
                .map(|(property, value)| (property.to_snake_case(), value))
                .collect();
            for (field, column) in related_columns {
                let their_property = column.their_field.to_lower_camel_case();
                if let Some(related) = object.related(&column.property) {
                    if let Some(value) = related.field(&their_property) {
                        data.insert(field.clone(), value);
                    }
                }
            }
            data
        }
    }
}
