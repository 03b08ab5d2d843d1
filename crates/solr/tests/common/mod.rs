//! Test infrastructure for the service facade.
//!
//! [`MockSolrClient`] keeps documents and schema fields in memory and records
//! every request it receives. Its query evaluation understands plain
//! `field:value` filter clauses and `*:*`; any other clause is treated as
//! matching.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use helios_solr::config::{AdapterConfig, CommitStrategy};
use helios_solr::core::{SolrApi, SolrClientError};
use helios_solr::schema::SchemaCommands;
use helios_solr::translate::{DeleteRequest, NativeQuery, NativeSuggest};
use helios_solr::types::DeleteTarget;
use serde_json::{Map, Value, json};

#[derive(Debug, Default)]
pub struct MockState {
    pub documents: Vec<Value>,
    pub schema_fields: Vec<Value>,
    pub calls: Vec<&'static str>,
    pub queries: Vec<NativeQuery>,
    pub suggests: Vec<NativeSuggest>,
    pub updates: Vec<Vec<Value>>,
    pub deletes: Vec<Value>,
    pub schema_commands: Vec<Value>,
    pub commit_params: Vec<Vec<(&'static str, String)>>,
    pub unavailable: HashSet<&'static str>,
    pub bad_status: HashSet<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct MockSolrClient {
    pub state: Arc<Mutex<MockState>>,
}

impl MockSolrClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Value>) -> Self {
        let client = Self::new();
        client.state.lock().unwrap().documents = documents;
        client
    }

    pub fn with_schema_fields(self, fields: Vec<Value>) -> Self {
        self.state.lock().unwrap().schema_fields = fields;
        self
    }

    /// Makes `operation` fail at the transport level.
    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().unavailable.insert(operation);
    }

    /// Makes `operation` answer with a non-zero status.
    pub fn reject(&self, operation: &'static str) {
        self.state.lock().unwrap().bad_status.insert(operation);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn documents(&self) -> Vec<Value> {
        self.state.lock().unwrap().documents.clone()
    }

    pub fn document(&self, id: &str) -> Option<Value> {
        self.documents()
            .into_iter()
            .find(|doc| doc.get("id").and_then(Value::as_str) == Some(id))
    }

    pub fn updates(&self) -> Vec<Vec<Value>> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn queries(&self) -> Vec<NativeQuery> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn schema_commands(&self) -> Vec<Value> {
        self.state.lock().unwrap().schema_commands.clone()
    }

    fn begin(&self, operation: &'static str) -> Result<Option<Value>, SolrClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if state.unavailable.contains(operation) {
            return Err(SolrClientError::Unavailable(format!("{operation} refused")));
        }
        if state.bad_status.contains(operation) {
            return Ok(Some(json!({
                "responseHeader": { "status": 400 },
                "error": { "msg": format!("{operation} rejected"), "code": 400 }
            })));
        }
        Ok(None)
    }
}

fn ok_header() -> Value {
    json!({ "status": 0, "QTime": 0 })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn clause_matches(document: &Value, clause: &str) -> bool {
    if clause == "*:*" {
        return true;
    }
    let Some((field, term)) = clause.split_once(':') else {
        return true;
    };
    if field.starts_with('-') || term.starts_with(['(', '[', '{']) || term == "*" {
        return true;
    }
    let term = term.replace('\\', "");
    match document.get(field) {
        Some(Value::Array(values)) => values.iter().any(|v| render(v) == term),
        Some(value) => render(value) == term,
        None => false,
    }
}

fn apply_atomic(existing: &mut Map<String, Value>, field: &str, operations: &Map<String, Value>) {
    for (operation, operand) in operations {
        match operation.as_str() {
            "set" if operand.is_null() => {
                existing.remove(field);
            }
            "set" => {
                existing.insert(field.to_string(), operand.clone());
            }
            "inc" => {
                let current = existing.get(field).and_then(Value::as_i64).unwrap_or(0);
                let delta = operand.as_i64().unwrap_or(0);
                existing.insert(field.to_string(), json!(current + delta));
            }
            "add" => {
                let entry = existing
                    .entry(field.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(values) = entry {
                    values.push(operand.clone());
                }
            }
            "remove" => {
                if let Some(Value::Array(values)) = existing.get_mut(field) {
                    values.retain(|v| v != operand);
                }
            }
            _ => {}
        }
    }
}

fn is_atomic(document: &Map<String, Value>) -> bool {
    document.iter().any(|(field, value)| {
        field != "id"
            && value.as_object().is_some_and(|ops| {
                ops.keys()
                    .all(|k| ["set", "add", "remove", "removeregex", "inc"].contains(&k.as_str()))
            })
    })
}

#[async_trait]
impl SolrApi for MockSolrClient {
    async fn json(&self, query: &NativeQuery) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("json")? {
            return Ok(rejected);
        }
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.clone());

        let matched: Vec<Value> = state
            .documents
            .iter()
            .filter(|doc| query.filter.iter().all(|clause| clause_matches(doc, clause)))
            .cloned()
            .collect();
        let total = matched.len();

        let docs: Vec<Value> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|doc| match (&query.fields, doc) {
                (Some(fields), Value::Object(map)) => Value::Object(
                    map.into_iter()
                        .filter(|(k, _)| fields.iter().any(|f| f == k))
                        .collect(),
                ),
                (_, doc) => doc,
            })
            .collect();

        Ok(json!({
            "responseHeader": ok_header(),
            "response": { "numFound": total, "start": query.offset, "docs": docs }
        }))
    }

    async fn suggest(&self, request: &NativeSuggest) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("suggest")? {
            return Ok(rejected);
        }
        let mut state = self.state.lock().unwrap();
        state.suggests.push(request.clone());

        let dictionary = request.dictionary.clone().unwrap_or_else(|| "default".to_string());
        Ok(json!({
            "responseHeader": ok_header(),
            "suggest": {
                dictionary: {
                    request.q.clone(): {
                        "numFound": 1,
                        "suggestions": [ { "term": format!("{}a", request.q), "weight": 1 } ]
                    }
                }
            }
        }))
    }

    async fn update(
        &self,
        documents: &[Value],
        commit: &CommitStrategy,
    ) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("update")? {
            return Ok(rejected);
        }
        let mut state = self.state.lock().unwrap();
        state.updates.push(documents.to_vec());
        state.commit_params.push(commit.to_params());

        for document in documents {
            let Some(incoming) = document.as_object() else {
                continue;
            };
            let id = incoming.get("id").cloned();
            let position = state
                .documents
                .iter()
                .position(|doc| id.is_some() && doc.get("id") == id.as_ref());

            if is_atomic(incoming) {
                if let Some(index) = position {
                    if let Some(existing) = state.documents[index].as_object_mut() {
                        for (field, value) in incoming {
                            if let Some(operations) = value.as_object() {
                                apply_atomic(existing, field, operations);
                            }
                        }
                    }
                }
            } else {
                match position {
                    Some(index) => state.documents[index] = document.clone(),
                    None => state.documents.push(document.clone()),
                }
            }
        }

        Ok(json!({ "responseHeader": ok_header() }))
    }

    async fn delete(
        &self,
        request: &DeleteRequest,
        commit: &CommitStrategy,
    ) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("delete")? {
            return Ok(rejected);
        }
        let mut state = self.state.lock().unwrap();
        state.deletes.push(request.to_value());
        state.commit_params.push(commit.to_params());

        match &request.target {
            DeleteTarget::ByIds(ids) => state
                .documents
                .retain(|doc| !ids.iter().any(|id| doc.get("id") == Some(id))),
            DeleteTarget::ByQuery(clause) => {
                state.documents.retain(|doc| !clause_matches(doc, clause))
            }
        }

        Ok(json!({ "responseHeader": ok_header() }))
    }

    async fn core_status(&self) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("status")? {
            return Ok(rejected);
        }
        Ok(json!({
            "responseHeader": ok_header(),
            "status": { "gettingstarted": { "name": "gettingstarted" } }
        }))
    }

    async fn schema_fields(&self) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("schema_fields")? {
            return Ok(rejected);
        }
        let state = self.state.lock().unwrap();
        Ok(json!({ "responseHeader": ok_header(), "fields": state.schema_fields }))
    }

    async fn update_schema(&self, commands: &SchemaCommands) -> Result<Value, SolrClientError> {
        if let Some(rejected) = self.begin("update_schema")? {
            return Ok(rejected);
        }
        let mut state = self.state.lock().unwrap();
        let body = serde_json::to_value(commands).unwrap();
        state.schema_commands.push(body);
        state.schema_fields.extend(commands.add_field.iter().cloned());
        Ok(json!({ "responseHeader": ok_header() }))
    }
}

pub fn config() -> AdapterConfig {
    AdapterConfig::default()
}

pub fn people() -> Vec<Value> {
    vec![
        json!({ "id": "1", "name": "Ada", "status": "active", "age": 36, "tags": ["math"] }),
        json!({ "id": "2", "name": "Brian", "status": "inactive", "age": 19 }),
        json!({ "id": "3", "name": "Cleo", "status": "active", "age": 52 }),
        json!({ "id": "4", "name": "Dov", "status": "active", "age": 24 }),
    ]
}
