//! Remote data-service client and keyed batch joiner.
//!
//! The core depends on the data service only through the [`RecordSource`]
//! capability: `query(entity, filters, fields, keys, key_field)` returning
//! field-aligned string tuples. Authentication, transport, and any retry
//! policy live entirely behind that trait; this layer never retries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use genotab::api::{fetch_keyed, DataClient};
//!
//! let client = DataClient::from_env();
//! let fields: Vec<String> = ["genome_id", "genome_name"].iter().map(|s| s.to_string()).collect();
//! let tuples = fetch_keyed(&client, "genome", &keys, &fields, 100).await?;
//! ```
//!
//! The service does not promise key order within a response, and keys with
//! no match produce no tuple. Callers that need positional alignment with
//! their input must re-key the result (see [`index_by_key`]), never trust
//! positions.

use serde_json::Value;
use std::collections::HashMap;
use std::env;

use crate::error::{ApiError, ApiResult};

/// Public data API endpoint used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.bv-brc.org/api";

/// Row cap sent with every query; far above any batch we issue.
const RESPONSE_LIMIT: usize = 25_000;

/// Narrow contract the core has with the remote data source.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    /// Look up `keys` by `key_field` on `entity`, returning one tuple per
    /// matching record, aligned to `fields`. No ordering guarantee; absent
    /// keys produce no tuple.
    async fn query(
        &self,
        entity: &str,
        filters: &[(String, String)],
        fields: &[String],
        keys: &[String],
        key_field: &str,
    ) -> ApiResult<Vec<Vec<String>>>;
}

/// HTTP client for the data service.
#[derive(Clone)]
pub struct DataClient {
    base_url: String,
    token: Option<String>,
}

impl DataClient {
    /// Create a client against an explicit endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Create a client from `GENOTAB_API_URL` / `GENOTAB_API_TOKEN`.
    ///
    /// The public endpoint works without a token, so neither variable is
    /// required. A `.env` file is honored if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let base_url = env::var("GENOTAB_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let token = env::var("GENOTAB_API_TOKEN").ok();
        Self { base_url, token }
    }

    /// Set the authorization token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl RecordSource for DataClient {
    async fn query(
        &self,
        entity: &str,
        filters: &[(String, String)],
        fields: &[String],
        keys: &[String],
        key_field: &str,
    ) -> ApiResult<Vec<Vec<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let body = build_query(filters, fields, keys, key_field);
        let url = format!("{}/{}/", self.base_url.trim_end_matches('/'), entity);

        let client = reqwest::Client::new();
        let mut request = client
            .post(&url)
            .header("Content-Type", "application/rqlquery+x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", token.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Service(format!(
                "HTTP {}: {}",
                status,
                clip(&body, 500)
            )));
        }

        let records: Vec<Value> =
            serde_json::from_str(&body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;

        Ok(records
            .iter()
            .map(|record| align_fields(record, fields))
            .collect())
    }
}

/// Fetch records for an ordered key list in bounded-size batches.
///
/// Keys are partitioned into consecutive chunks of at most `batch_size`,
/// one lookup per chunk, and the per-chunk results are concatenated in the
/// order the chunks were issued. The key field is the first requested
/// field. A failed chunk aborts the whole fetch with the remote error.
pub async fn fetch_keyed<S: RecordSource>(
    source: &S,
    entity: &str,
    keys: &[String],
    fields: &[String],
    batch_size: usize,
) -> ApiResult<Vec<Vec<String>>> {
    let key_field = fields
        .first()
        .ok_or_else(|| ApiError::RequestFailed("no fields requested".to_string()))?;

    let mut results = Vec::new();
    for chunk in keys.chunks(batch_size.max(1)) {
        let mut batch = source.query(entity, &[], fields, chunk, key_field).await?;
        results.append(&mut batch);
    }
    Ok(results)
}

/// Index tuples by their key field (the first column).
///
/// This is how callers re-associate an unordered batch result with their
/// input: look each submitted key up in the map, treat a miss as "not
/// found".
pub fn index_by_key(tuples: Vec<Vec<String>>) -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    for tuple in tuples {
        if let Some(key) = tuple.first().cloned() {
            map.insert(key, tuple);
        }
    }
    map
}

/// Clip an error body for a diagnostic, backing up to a char boundary so
/// multibyte text never splits mid-character.
fn clip(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Assemble the RQL query body.
fn build_query(
    filters: &[(String, String)],
    fields: &[String],
    keys: &[String],
    key_field: &str,
) -> String {
    let key_list: Vec<String> = keys.iter().map(|k| rql_escape(k)).collect();
    let mut clauses = vec![format!("in({},({}))", key_field, key_list.join(","))];
    for (field, value) in filters {
        clauses.push(format!("eq({},{})", field, rql_escape(value)));
    }
    clauses.push(format!("select({})", fields.join(",")));
    clauses.push(format!("limit({})", RESPONSE_LIMIT));
    clauses.join("&")
}

/// Percent-encode characters that would break the RQL syntax.
fn rql_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' | b'|' | b':' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Render a requested attribute as a plain string field.
///
/// Multi-valued attributes join with commas; anything missing or null is
/// an empty field.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| field_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}

fn align_fields(record: &Value, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|field| field_text(record.get(field.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory record source: one tuple per known key, returned in
    /// reverse submission order to model the no-ordering guarantee.
    struct MapSource {
        records: HashMap<String, Vec<String>>,
        batches_seen: Mutex<Vec<usize>>,
    }

    impl MapSource {
        fn new(records: &[(&str, &str)]) -> Self {
            let records = records
                .iter()
                .map(|(k, v)| (k.to_string(), vec![k.to_string(), v.to_string()]))
                .collect();
            Self {
                records,
                batches_seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RecordSource for MapSource {
        async fn query(
            &self,
            _entity: &str,
            _filters: &[(String, String)],
            _fields: &[String],
            keys: &[String],
            _key_field: &str,
        ) -> ApiResult<Vec<Vec<String>>> {
            self.batches_seen.lock().unwrap().push(keys.len());
            Ok(keys
                .iter()
                .rev()
                .filter_map(|k| self.records.get(k).cloned())
                .collect())
        }
    }

    /// Source that always fails, for abort behavior.
    struct BrokenSource;

    impl RecordSource for BrokenSource {
        async fn query(
            &self,
            _entity: &str,
            _filters: &[(String, String)],
            _fields: &[String],
            _keys: &[String],
            _key_field: &str,
        ) -> ApiResult<Vec<Vec<String>>> {
            Err(ApiError::Service("backend unavailable".to_string()))
        }
    }

    fn fields() -> Vec<String> {
        vec!["genome_id".to_string(), "genome_name".to_string()]
    }

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_keys_partition_into_bounded_batches() {
        let source = MapSource::new(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")]);
        let result = fetch_keyed(&source, "genome", &keys(&["a", "b", "c", "d", "e"]), &fields(), 2)
            .await
            .unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(*source.batches_seen.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_absent_keys_produce_no_tuple() {
        let source = MapSource::new(&[("83333.1", "E. coli"), ("100226.1", "S. coelicolor")]);
        let result = fetch_keyed(
            &source,
            "genome",
            &keys(&["83333.1", "562.2", "100226.1"]),
            &fields(),
            10,
        )
        .await
        .unwrap();

        // 3 keys in, 2 tuples out; the miss is an omission, not an error.
        assert_eq!(result.len(), 2);
        let found = index_by_key(result);
        assert!(found.contains_key("83333.1"));
        assert!(found.contains_key("100226.1"));
        assert!(!found.contains_key("562.2"));
    }

    #[tokio::test]
    async fn test_rekeying_survives_unordered_responses() {
        // MapSource answers in reverse order within each batch.
        let source = MapSource::new(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let result = fetch_keyed(&source, "genome", &keys(&["a", "b", "c"]), &fields(), 10)
            .await
            .unwrap();

        let found = index_by_key(result);
        for (key, name) in [("a", "1"), ("b", "2"), ("c", "3")] {
            assert_eq!(found[key][1], name);
        }
    }

    #[tokio::test]
    async fn test_failed_chunk_aborts_whole_fetch() {
        let err = fetch_keyed(&BrokenSource, "genome", &keys(&["a", "b"]), &fields(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Service(_)));
    }

    #[tokio::test]
    async fn test_empty_field_list_is_an_error() {
        let source = MapSource::new(&[]);
        let err = fetch_keyed(&source, "genome", &keys(&["a"]), &[], 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no fields"));
    }

    #[test]
    fn test_build_query_shape() {
        let query = build_query(
            &[("annotation".to_string(), "PATRIC".to_string())],
            &fields(),
            &keys(&["83333.1", "100226.1"]),
            "genome_id",
        );
        assert!(query.starts_with("in(genome_id,(83333.1,100226.1))"));
        assert!(query.contains("&eq(annotation,PATRIC)"));
        assert!(query.contains("&select(genome_id,genome_name)"));
        assert!(query.contains("&limit("));
    }

    #[test]
    fn test_clip_backs_up_to_char_boundary() {
        // 200 euro signs: 600 bytes, and byte 500 falls inside one.
        let body = "€".repeat(200);
        let clipped = clip(&body, 500);
        assert!(clipped.len() <= 500);
        assert_eq!(clipped.len() % "€".len(), 0);
        assert!(body.starts_with(clipped));
    }

    #[test]
    fn test_clip_leaves_short_bodies_alone() {
        assert_eq!(clip("backend unavailable", 500), "backend unavailable");
    }

    #[test]
    fn test_rql_escape() {
        assert_eq!(rql_escape("fig|83333.1.peg.4"), "fig|83333.1.peg.4");
        assert_eq!(rql_escape("a,b(c)"), "a%2Cb%28c%29");
    }

    #[test]
    fn test_field_alignment() {
        let record = json!({
            "genome_id": "83333.1",
            "taxon_id": 83333,
            "names": ["a", "b"],
        });
        let wanted: Vec<String> = ["genome_id", "taxon_id", "names", "missing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(align_fields(&record, &wanted), vec!["83333.1", "83333", "a,b", ""]);
    }
}
