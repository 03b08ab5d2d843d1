//! The resource-adapter facade.
//!
//! [`SolrService`] wires the pure builders and mappers to a [`SolrApi`]
//! transport: each operation builds a native document, sends it, checks the
//! status and maps the response back. Transport failures are wrapped into
//! [`UpstreamError`] so callers see one error surface.

mod startup;

pub use startup::{StageOutcome, StartupReport, StartupStage};

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::config::AdapterConfig;
use crate::core::SolrApi;
use crate::error::{AdapterResult, ResourceError, UpstreamError, ValidationError};
use crate::schema::{
    ObservedSchema, SchemaDefinition, SchemaReconciliation, define_schema, describe_schema,
};
use crate::translate::{
    DeleteRequest, build_delete, build_patch, build_query, build_suggest, ensure_success,
    response_find, response_get,
};
use crate::types::{DeleteTarget, FindPage, FindResult, GenericQuery, PatchSpec};

/// Solr-backed resource adapter.
///
/// The configuration is validated once and never changes. The desired
/// schema starts from the configuration and grows through
/// [`define`](Self::define).
pub struct SolrService<C: ?Sized> {
    client: Arc<C>,
    config: Arc<AdapterConfig>,
    desired_schema: RwLock<SchemaDefinition>,
    startup: RwLock<Option<StartupReport>>,
    schema_sync: RwLock<Option<SchemaReconciliation>>,
}

impl<C: SolrApi + ?Sized> SolrService<C> {
    /// Creates a service after validating the configuration.
    pub fn new(config: AdapterConfig, client: Arc<C>) -> AdapterResult<Self> {
        config.validate()?;
        let desired_schema = RwLock::new(config.schema.clone());
        Ok(Self {
            client,
            config: Arc::new(config),
            desired_schema,
            startup: RwLock::new(None),
            schema_sync: RwLock::new(None),
        })
    }

    /// Returns the transport.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Returns the current desired schema.
    pub fn desired_schema(&self) -> SchemaDefinition {
        self.desired_schema.read().clone()
    }

    /// Returns the last startup report, if the startup chain has finished.
    pub fn startup_report(&self) -> Option<StartupReport> {
        self.startup.read().clone()
    }

    /// Returns the outcome of the last schema reconciliation.
    pub fn last_schema_sync(&self) -> Option<SchemaReconciliation> {
        self.schema_sync.read().clone()
    }

    /// Runs a query, or a suggest request when `$suggest` is present.
    pub async fn find(&self, query: &GenericQuery) -> AdapterResult<FindResult> {
        if query.is_suggest() {
            Ok(FindResult::Suggestions(self.suggest(query).await?))
        } else {
            Ok(FindResult::Page(self.search(query).await?))
        }
    }

    /// Runs a query and returns one page.
    pub async fn search(&self, query: &GenericQuery) -> AdapterResult<FindPage> {
        let native = build_query(query, &self.config)?;
        debug!(
            operation = "find",
            query = %native.query,
            filters = ?native.filter,
            limit = native.limit,
            offset = native.offset,
            "Translated query"
        );

        let body = self
            .client
            .json(&native)
            .await
            .map_err(|e| UpstreamError::transport("find", e))?;
        Ok(response_find(query, &self.config, &body)?)
    }

    /// Runs an autosuggest request and returns the engine's answer as-is.
    pub async fn suggest(&self, query: &GenericQuery) -> AdapterResult<Value> {
        let native = build_suggest(query, &self.config)?;
        debug!(operation = "suggest", term = %native.q, "Translated suggest request");

        let body = self
            .client
            .suggest(&native)
            .await
            .map_err(|e| UpstreamError::transport("suggest", e))?;
        ensure_success("suggest", &body)?;
        Ok(body)
    }

    /// Fetches one record by id.
    ///
    /// `params` may narrow the match further or select fields; its paging
    /// is replaced by limit 1, skip 0.
    pub async fn get(&self, id: &Value, params: Option<&GenericQuery>) -> AdapterResult<Value> {
        let query = params
            .cloned()
            .unwrap_or_default()
            .with_term(self.config.id_field.clone(), id.clone())
            .with_limit(1)
            .with_skip(0);

        let native = build_query(&query, &self.config)?;
        debug!(operation = "get", id = %id, "Translated get");

        let body = self
            .client
            .json(&native)
            .await
            .map_err(|e| UpstreamError::transport("get", e))?;

        response_get(&body)?.ok_or_else(|| {
            ResourceError::NotFound {
                id: display_id(id),
            }
            .into()
        })
    }

    /// Creates one record or a list of records and returns the input.
    pub async fn create(&self, data: Value) -> AdapterResult<Value> {
        let documents = match &data {
            Value::Array(items) if items.iter().all(Value::is_object) => items.clone(),
            Value::Object(_) => vec![data.clone()],
            _ => {
                return Err(ValidationError::InvalidQuery {
                    message: "create expects a record or a list of records".to_string(),
                }
                .into());
            }
        };

        debug!(operation = "create", documents = documents.len(), "Writing documents");
        self.write("create", &documents).await?;
        Ok(data)
    }

    /// Replaces one record; the id field is taken from `id`.
    pub async fn update(&self, id: &Value, data: Value) -> AdapterResult<Value> {
        if id.is_null() {
            return Err(ValidationError::MultipleReplace.into());
        }
        let mut document = match data {
            Value::Object(map) => map,
            Value::Array(_) => return Err(ValidationError::MultipleReplace.into()),
            _ => {
                return Err(ValidationError::InvalidQuery {
                    message: "update expects a record".to_string(),
                }
                .into());
            }
        };
        document.insert(self.config.id_field.clone(), id.clone());
        let document = Value::Object(document);

        debug!(operation = "update", id = %id, "Replacing document");
        self.write("update", std::slice::from_ref(&document)).await?;
        Ok(document)
    }

    /// Applies an atomic update to one record or to every record matching
    /// `params`, and returns the documents that were sent.
    ///
    /// Every matching id is collected, page by page, before anything is
    /// written; `$limit` and `$skip` in `params` are ignored. `params`
    /// without any filter is rejected. A filter matching nothing sends
    /// nothing and returns an empty list.
    pub async fn patch(
        &self,
        id: Option<&Value>,
        data: &Value,
        params: Option<&GenericQuery>,
    ) -> AdapterResult<Vec<Value>> {
        let spec = PatchSpec::from_value(data)?;
        let update = build_patch(&spec, &self.config.id_field)?;

        let ids = match (id, params) {
            (Some(id), _) if !id.is_null() => vec![id.clone()],
            (_, Some(params)) => self.resolve_ids(params).await?,
            _ => return Err(ValidationError::MissingPatchParams.into()),
        };

        if ids.is_empty() {
            debug!(operation = "patch", "No documents matched; nothing to patch");
            return Ok(Vec::new());
        }

        let documents = update.fan_out(&self.config.id_field, &ids);
        debug!(operation = "patch", documents = documents.len(), "Applying atomic updates");
        self.write("patch", &documents).await?;
        Ok(documents)
    }

    /// Deletes by id, by list of ids, or by filter.
    pub async fn remove(
        &self,
        id: Option<&Value>,
        filter: Option<&Value>,
    ) -> AdapterResult<DeleteTarget> {
        let request: DeleteRequest = build_delete(id, filter)?;
        debug!(operation = "remove", target = ?request.target, "Translated delete");

        let body = self
            .client
            .delete(&request, &self.config.commit_strategy)
            .await
            .map_err(|e| UpstreamError::transport("remove", e))?;
        ensure_success("remove", &body)?;
        Ok(request.target)
    }

    /// Returns the core admin status.
    pub async fn status(&self) -> AdapterResult<Value> {
        let body = self
            .client
            .core_status()
            .await
            .map_err(|e| UpstreamError::transport("status", e))?;
        ensure_success("status", &body)?;
        Ok(body)
    }

    /// Reads the engine's current schema fields.
    pub async fn describe(&self) -> AdapterResult<ObservedSchema> {
        describe_schema(self.client.as_ref()).await
    }

    /// Merges `extra` into the desired schema and reconciles it against the
    /// engine.
    ///
    /// Fails with [`ValidationError::InvalidConfig`] when `managed_schema`
    /// is off, before anything is merged or sent.
    pub async fn define(&self, extra: Option<SchemaDefinition>) -> AdapterResult<SchemaReconciliation> {
        if !self.config.managed_schema {
            return Err(ValidationError::InvalidConfig {
                message: "managed_schema is disabled; the schema cannot be defined".to_string(),
            }
            .into());
        }
        if let Some(extra) = extra {
            extra.validate()?;
            self.desired_schema.write().merge(extra);
        }
        let observed = self.describe().await?;
        self.reconcile(&observed).await
    }

    async fn reconcile(&self, observed: &ObservedSchema) -> AdapterResult<SchemaReconciliation> {
        let desired = self.desired_schema();
        let result =
            define_schema(self.client.as_ref(), &desired, observed, self.config.migrate).await?;
        *self.schema_sync.write() = Some(result.clone());
        Ok(result)
    }

    async fn resolve_ids(&self, params: &GenericQuery) -> AdapterResult<Vec<Value>> {
        if params.filters.is_empty() {
            return Err(ValidationError::MissingPatchParams.into());
        }

        let id_field = &self.config.id_field;
        let page_size = self.config.paginate.max.unwrap_or(self.config.paginate.default);
        let mut lookup = params
            .clone()
            .with_select([id_field.as_str()])
            .with_limit(page_size);
        lookup.suggest = None;

        let mut ids = Vec::new();
        let mut skip = 0;
        loop {
            let page = self.search(&lookup.clone().with_skip(skip)).await?;
            let fetched = page.data.len();
            ids.extend(
                page.data
                    .iter()
                    .filter_map(|document| document.get(id_field).cloned()),
            );
            skip += fetched;
            if fetched == 0 || skip as u64 >= page.total {
                break;
            }
        }
        Ok(ids)
    }

    async fn write(&self, operation: &str, documents: &[Value]) -> AdapterResult<()> {
        let body = self
            .client
            .update(documents, &self.config.commit_strategy)
            .await
            .map_err(|e| UpstreamError::transport(operation, e))?;
        ensure_success(operation, &body)?;
        Ok(())
    }
}

fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
