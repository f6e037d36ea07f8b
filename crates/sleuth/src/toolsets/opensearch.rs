use std::collections::HashMap;
use std::time::Duration;

use reqwest::header;
use serde_json::{json, Value};
use url::Url;

use super::{get_string_param, StructuredToolResult, ToolParameter, ToolSpec};

const PPL_ENDPOINT: &str = "/_plugins/_ppl";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Connection settings for an OpenSearch cluster.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    pub url: String,
    pub auth_header: Option<String>,
    pub timeout: Duration,
}

impl OpenSearchConfig {
    pub fn new<S: Into<String>>(url: S, auth_header: Option<String>) -> Self {
        Self {
            url: url.into(),
            auth_header,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Executes PPL queries against an OpenSearch cluster.
///
/// Every outcome, including transport failures, is normalized into a
/// [`StructuredToolResult`].
pub struct PplQueryTool {
    config: OpenSearchConfig,
    client: reqwest::Client,
}

impl PplQueryTool {
    pub fn new(config: OpenSearchConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn spec() -> ToolSpec {
        let mut parameters = HashMap::new();
        parameters.insert(
            "query".to_string(),
            ToolParameter::string("The PPL query to run", true),
        );
        ToolSpec {
            name: "run_ppl_query".to_string(),
            description: "Execute a PPL query against an OpenSearch cluster".to_string(),
            parameters,
        }
    }

    pub fn one_liner(params: &Value) -> String {
        let query = params.get("query").and_then(Value::as_str).unwrap_or("");
        format!("opensearch/ppl: Run PPL Query ({})", query)
    }

    pub async fn invoke(&self, params: Value) -> StructuredToolResult {
        let query = match get_string_param(&params, "query") {
            Ok(query) => query.to_owned(),
            Err(error) => return StructuredToolResult::error(error, params),
        };

        let url = match Url::parse(&self.config.url).and_then(|base| base.join(PPL_ENDPOINT)) {
            Ok(url) => url,
            Err(e) => {
                return StructuredToolResult::error(
                    format!("Invalid OpenSearch URL: {}", e),
                    params,
                )
            }
        };

        let mut request = self
            .client
            .post(url)
            .timeout(self.config.timeout)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&json!({"query": query}));
        if let Some(auth) = &self.config.auth_header {
            request = request.header(header::AUTHORIZATION, auth);
        }

        match request.send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                match response.json::<Value>().await {
                    Ok(body) => StructuredToolResult::success(body.to_string(), params),
                    Err(e) => StructuredToolResult::error(
                        format!("OpenSearch returned a non-JSON body: {}", e),
                        params,
                    ),
                }
            }
            Ok(response) => {
                let return_code = response.status().as_u16();
                let error = response.text().await.unwrap_or_default();
                StructuredToolResult::error(error, params).with_return_code(return_code)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Timeout while running OpenSearch PPL query: {}", e);
                StructuredToolResult::error(
                    "Request timed out while running OpenSearch PPL query",
                    params,
                )
            }
            Err(e) => {
                tracing::warn!("Network error while running OpenSearch PPL query: {}", e);
                StructuredToolResult::error(
                    format!("Network error while running OpenSearch PPL query: {}", e),
                    params,
                )
            }
        }
    }
}
