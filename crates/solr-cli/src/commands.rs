//! Subcommand execution.

use std::io::Read;

use anyhow::{Context, bail};
use helios_solr::AdapterConfig;
use helios_solr::translate::{build_delete, build_patch, build_query, build_suggest};
use helios_solr::types::{GenericQuery, PatchSpec};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::Command;

/// Runs one subcommand and returns the native document to print.
pub fn run(command: &Command, config: &AdapterConfig, stdin: impl Read) -> anyhow::Result<Value> {
    match command {
        Command::Query { input } => {
            let query = GenericQuery::from_value(&read_json(input.as_deref(), stdin)?)?;
            let native = build_query(&query, config)?;
            debug!(filters = native.filter.len(), limit = native.limit, "Built query");
            Ok(serde_json::to_value(native)?)
        }
        Command::Suggest { input } => {
            let query = GenericQuery::from_value(&read_json(input.as_deref(), stdin)?)?;
            Ok(serde_json::to_value(build_suggest(&query, config)?)?)
        }
        Command::Delete { id, filter } => {
            let id = id.as_deref().map(parse_id);
            let filter = filter
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()
                .context("--filter must be JSON")?;
            let request = build_delete(id.as_ref(), filter.as_ref())?;
            debug!(target = ?request.target, "Built delete");
            Ok(request.to_value())
        }
        Command::Patch { id, input } => {
            let spec = PatchSpec::from_value(&read_json(input.as_deref(), stdin)?)?;
            let update = build_patch(&spec, &config.id_field)?;
            match id.as_deref().map(parse_id) {
                None => Ok(Value::Object(update.fields().clone())),
                Some(Value::Array(ids)) => Ok(json!(update.fan_out(&config.id_field, &ids))),
                Some(id) => Ok(json!([update.for_id(&config.id_field, &id)])),
            }
        }
    }
}

/// Reads an id argument: JSON when it parses, a plain string otherwise.
fn parse_id(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Array(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn read_json(input: Option<&str>, mut stdin: impl Read) -> anyhow::Result<Value> {
    let text = match input {
        Some(text) => text.to_string(),
        None => {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            buffer
        }
    };
    if text.trim().is_empty() {
        bail!("no input given");
    }
    serde_json::from_str(&text).context("input must be JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::empty;

    fn config() -> AdapterConfig {
        AdapterConfig::default()
    }

    #[test]
    fn test_query_command() {
        let command = Command::Query {
            input: Some(r#"{"query":{"status":"active"},"$limit":5}"#.to_string()),
        };
        let native = run(&command, &config(), empty()).unwrap();
        assert_eq!(
            native,
            json!({ "query": "*:*", "filter": ["status:active"], "limit": 5, "offset": 0 })
        );
    }

    #[test]
    fn test_query_from_stdin() {
        let command = Command::Query { input: None };
        let stdin = r#"{"query":{"age":{"$lt":18}}}"#.as_bytes();
        let native = run(&command, &config(), stdin).unwrap();
        assert_eq!(native["filter"], json!(["age:{* TO 18}"]));
    }

    #[test]
    fn test_empty_stdin_is_an_error() {
        assert!(run(&Command::Query { input: None }, &config(), empty()).is_err());
    }

    #[test]
    fn test_suggest_command() {
        let command = Command::Suggest {
            input: Some(r#"{"$suggest":"nin"}"#.to_string()),
        };
        let native = run(&command, &config(), empty()).unwrap();
        assert_eq!(native["suggest.q"], json!("nin"));
    }

    #[test]
    fn test_delete_command_shapes() {
        let by_id = Command::Delete {
            id: Some("abc".to_string()),
            filter: None,
        };
        assert_eq!(
            run(&by_id, &config(), empty()).unwrap(),
            json!({ "delete": ["abc"] })
        );

        let by_list = Command::Delete {
            id: Some(r#"["a","b"]"#.to_string()),
            filter: None,
        };
        assert_eq!(
            run(&by_list, &config(), empty()).unwrap(),
            json!({ "delete": ["a", "b"] })
        );

        let all = Command::Delete {
            id: Some("*:*".to_string()),
            filter: None,
        };
        assert_eq!(
            run(&all, &config(), empty()).unwrap(),
            json!({ "delete": { "query": "*:*" } })
        );

        let by_filter = Command::Delete {
            id: None,
            filter: Some(r#"{"status":"old"}"#.to_string()),
        };
        assert_eq!(
            run(&by_filter, &config(), empty()).unwrap(),
            json!({ "delete": { "query": "status:old" } })
        );
    }

    #[test]
    fn test_patch_command() {
        let shared = Command::Patch {
            id: None,
            input: Some(r#"{"set":{"status":"inactive"}}"#.to_string()),
        };
        assert_eq!(
            run(&shared, &config(), empty()).unwrap(),
            json!({ "status": { "set": "inactive" } })
        );

        let fan_out = Command::Patch {
            id: Some(r#"["a","b"]"#.to_string()),
            input: Some(r#"{"inc":{"views":1}}"#.to_string()),
        };
        assert_eq!(
            run(&fan_out, &config(), empty()).unwrap(),
            json!([
                { "id": "a", "views": { "inc": 1 } },
                { "id": "b", "views": { "inc": 1 } }
            ])
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), json!(42));
        assert_eq!(parse_id("abc"), json!("abc"));
        assert_eq!(parse_id("*"), json!("*"));
        assert_eq!(parse_id("{\"a\":1}"), json!("{\"a\":1}"));
    }
}
