//! Stateful stand-in for one store table, served through `wiremock`.
//!
//! Understands the subset of PostgREST the services use: `col=eq.v` and
//! `col=in.(a,b)` filters on `GET`, `PATCH` and `DELETE`. `select` and `or`
//! are ignored.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use wiremock::{Request, Respond, ResponseTemplate};

#[derive(Clone, Default)]
pub struct InMemoryTable {
    rows: Arc<Mutex<Vec<Value>>>,
}

impl InMemoryTable {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    pub fn snapshot(&self) -> Vec<Value> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn filters(request: &Request) -> Vec<(String, String)> {
        request
            .url
            .query_pairs()
            .filter(|(key, _)| key != "select" && key != "or")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    fn matches(row: &Value, filters: &[(String, String)]) -> bool {
        filters.iter().all(|(column, condition)| {
            let actual = match row.get(column) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => return false,
            };
            if let Some(expected) = condition.strip_prefix("eq.") {
                actual == expected
            } else if let Some(list) = condition.strip_prefix("in.") {
                list.trim_start_matches('(')
                    .trim_end_matches(')')
                    .split(',')
                    .any(|candidate| candidate == actual)
            } else {
                false
            }
        })
    }
}

impl Respond for InMemoryTable {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let filters = Self::filters(request);
        let Ok(mut rows) = self.rows.lock() else {
            return ResponseTemplate::new(500);
        };

        match request.method.as_str() {
            "GET" => {
                let found: Vec<Value> = rows
                    .iter()
                    .filter(|row| Self::matches(row, &filters))
                    .cloned()
                    .collect();
                ResponseTemplate::new(200).set_body_json(found)
            }
            "PATCH" => {
                let patch: Map<String, Value> = match serde_json::from_slice(&request.body) {
                    Ok(Value::Object(map)) => map,
                    _ => return ResponseTemplate::new(400),
                };
                let mut updated = Vec::new();
                for row in rows.iter_mut().filter(|row| Self::matches(row, &filters)) {
                    if let Value::Object(fields) = row {
                        for (key, value) in &patch {
                            fields.insert(key.clone(), value.clone());
                        }
                    }
                    updated.push(row.clone());
                }
                ResponseTemplate::new(200).set_body_json(updated)
            }
            "DELETE" => {
                let (removed, kept): (Vec<Value>, Vec<Value>) = rows
                    .drain(..)
                    .partition(|row| Self::matches(row, &filters));
                *rows = kept;
                ResponseTemplate::new(200).set_body_json(removed)
            }
            _ => ResponseTemplate::new(405),
        }
    }
}
