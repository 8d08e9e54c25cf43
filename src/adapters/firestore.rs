use super::google_auth::{AccessTokens, TokenError};
use crate::ports::DocumentStore;
use crate::types::documents::Document;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};

use std::future::Future;
use std::pin::Pin;

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Cloud Firestore over its REST API. Documents are decoded from Firestore's
/// typed value encoding into plain JSON before they leave this module.
#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: AccessTokens,
}

#[derive(Debug, thiserror::Error)]
pub enum FirestoreError {
    #[error("invalid firestore url: {0}")]
    Url(String),
    #[error("failed to obtain access token: {0}")]
    Auth(#[from] TokenError),
    #[error("firestore request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("firestore returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unsupported firestore value: {0}")]
    UnsupportedValue(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    update_time: Option<String>,
}

impl FirestoreStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: AccessTokens,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project_id: project_id.into(),
            tokens,
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<reqwest::Url, FirestoreError> {
        let mut url = reqwest::Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|err| FirestoreError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FirestoreError::Url(self.base_url.clone()))?
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection,
                id,
            ]);
        Ok(url)
    }

    async fn fetch_raw(&self, collection: &str, id: &str) -> Result<Option<RawDocument>, FirestoreError> {
        let url = self.document_url(collection, id)?;
        let token = self.tokens.bearer().await?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }
        Ok(Some(response.json().await?))
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>, FirestoreError> {
        match self.fetch_raw(collection, id).await? {
            Some(raw) => Ok(Some(Document::new(id, decode_fields(&raw.fields)?))),
            None => Ok(None),
        }
    }

    /// Reads the document, then deletes `field` with the read's `updateTime`
    /// as precondition so a concurrent write keeps its value.
    async fn remove_field_if(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: &str,
    ) -> Result<bool, FirestoreError> {
        let Some(raw) = self.fetch_raw(collection, id).await? else {
            return Ok(false);
        };
        let current = match raw.fields.get(field) {
            Some(value) => decode_value(value)?,
            None => return Ok(false),
        };
        if current.as_str().map(str::trim) != Some(expected.trim()) {
            return Ok(false);
        }

        let mut url = self.document_url(collection, id)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("updateMask.fieldPaths", field);
            match raw.update_time.as_deref() {
                Some(update_time) => query.append_pair("currentDocument.updateTime", update_time),
                None => query.append_pair("currentDocument.exists", "true"),
            };
        }
        let token = self.tokens.bearer().await?;
        // A field listed in the mask but absent from the body is deleted.
        let response = self
            .client
            .patch(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "fields": {} }))
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("FAILED_PRECONDITION") {
                return Ok(false);
            }
            return Err(FirestoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(true)
    }
}

async fn rejected(status: StatusCode, response: reqwest::Response) -> FirestoreError {
    FirestoreError::Rejected {
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    }
}

impl DocumentStore for FirestoreStore {
    type Error = FirestoreError;
    type GetFut<'a>
        = Pin<Box<dyn Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a>>
    where
        Self: 'a;
    type DeleteFieldFut<'a>
        = Pin<Box<dyn Future<Output = Result<bool, Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn get<'a>(&'a self, collection: &'a str, id: &'a str) -> Self::GetFut<'a> {
        Box::pin(self.fetch(collection, id))
    }

    fn delete_field_if<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        field: &'a str,
        expected: &'a str,
    ) -> Self::DeleteFieldFut<'a> {
        Box::pin(self.remove_field_if(collection, id, field, expected))
    }
}

pub(crate) fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, FirestoreError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

/// Converts one Firestore `Value` (`{"stringValue": "..."}` and friends) into
/// plain JSON. Timestamps, references and bytes stay as their string form.
pub(crate) fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Err(FirestoreError::UnsupportedValue(value.to_string()));
    };
    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue"
        | "geoPointValue" => Ok(inner.clone()),
        "integerValue" => match inner {
            Value::String(raw) => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| FirestoreError::UnsupportedValue(value.to_string())),
            Value::Number(_) => Ok(inner.clone()),
            _ => Err(FirestoreError::UnsupportedValue(value.to_string())),
        },
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and infinities arrive as strings and have no JSON form
            _ => Ok(Value::Null),
        },
        "mapValue" => {
            let empty = Map::new();
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .unwrap_or(&empty);
            Ok(Value::Object(decode_fields(fields)?))
        }
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
            .transpose()
            .map(|values| Value::Array(values.unwrap_or_default())),
        _ => Err(FirestoreError::UnsupportedValue(value.to_string())),
    }
}
