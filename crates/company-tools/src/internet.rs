//! Public-web tools: `internet_search` and `read_webpage`.

use crate::tool::{json_success, str_arg, Tool, ToolDescriptor};
use async_trait::async_trait;
use company_core::{CompanyError, CompanyResult, ToolCall, ToolResult};
use company_security::Capability;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Lower bound for configured timeouts.
pub const MIN_TIMEOUT_SECS: u64 = 3;
/// Upper bound for configured timeouts.
pub const MAX_TIMEOUT_SECS: u64 = 60;
/// Search results returned when `max_results` is omitted.
pub const DEFAULT_MAX_RESULTS: u64 = 5;
/// Page text returned when `max_chars` is omitted.
pub const DEFAULT_MAX_CHARS: u64 = 12_000;
/// Serper search API.
pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
/// DuckDuckGo HTML search.
pub const DUCKDUCKGO_ENDPOINT: &str = "https://duckduckgo.com/html/";
/// Browser-like `User-Agent` sent by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const MAX_REDIRECTS: usize = 5;

/// Network settings shared by the internet tools.
#[derive(Debug, Clone)]
pub struct InternetSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header.
    pub user_agent: String,
    /// When set, searches go through Serper instead of DuckDuckGo HTML.
    pub serper_api_key: Option<String>,
    /// Serper endpoint, overridable for tests.
    pub serper_endpoint: String,
    /// DuckDuckGo endpoint, overridable for tests.
    pub duckduckgo_endpoint: String,
    /// Allow `read_webpage` to reach loopback/private hosts. Off outside tests.
    pub allow_private_hosts: bool,
}

impl Default for InternetSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            serper_api_key: None,
            serper_endpoint: SERPER_ENDPOINT.to_string(),
            duckduckgo_endpoint: DUCKDUCKGO_ENDPOINT.to_string(),
            allow_private_hosts: false,
        }
    }
}

impl InternetSettings {
    /// Read `SERPER_API_KEY`, `INTERNET_TOOL_TIMEOUT_SECONDS` and
    /// `INTERNET_TOOL_USER_AGENT` from the environment.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(raw) = std::env::var("INTERNET_TOOL_TIMEOUT_SECONDS") {
            let secs = raw.trim().parse().unwrap_or(DEFAULT_TIMEOUT_SECS);
            settings.timeout = Duration::from_secs(clamp_timeout_secs(secs));
        }
        if let Ok(agent) = std::env::var("INTERNET_TOOL_USER_AGENT") {
            if !agent.trim().is_empty() {
                settings.user_agent = agent;
            }
        }
        settings.serper_api_key = std::env::var("SERPER_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        settings
    }

    fn client(&self) -> CompanyResult<reqwest::Client> {
        let allow_private = self.allow_private_hosts;
        let redirects = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if redirect_blocked(attempt.url(), allow_private) {
                warn!(url = %attempt.url(), "Blocked redirect to private host");
                attempt.error("redirect to a private/internal address blocked")
            } else {
                attempt.follow()
            }
        });
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .redirect(redirects)
            .build()
            .map_err(|e| CompanyError::Http(format!("Failed to create HTTP client: {e}")))
    }
}

/// Clamp to `MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS`.
pub fn clamp_timeout_secs(secs: u64) -> u64 {
    secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS)
}

fn network_capability() -> Capability {
    Capability::NetworkAccess {
        allowed_hosts: vec!["*".to_string()],
    }
}

/// Regexes for turning HTML into readable text.
struct HtmlText {
    script: Regex,
    style: Regex,
    tag: Regex,
    entity: Regex,
    whitespace: Regex,
}

impl HtmlText {
    fn new() -> CompanyResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| CompanyError::Configuration(format!("invalid pattern {pattern}: {e}")))
        };
        Ok(Self {
            script: compile(r"(?is)<script.*?>.*?</script>")?,
            style: compile(r"(?is)<style.*?>.*?</style>")?,
            tag: compile(r"(?s)<[^>]+>")?,
            entity: compile(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);")?,
            whitespace: compile(r"\s+")?,
        })
    }

    fn strip(&self, html: &str) -> String {
        let text = self.script.replace_all(html, " ");
        let text = self.style.replace_all(&text, " ");
        let text = self.tag.replace_all(&text, " ");
        let text = self.unescape(&text);
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }

    fn unescape(&self, text: &str) -> String {
        self.entity
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                decode_entity(name).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn decode_entity(name: &str) -> Option<String> {
    let numeric = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse().ok()
    } else {
        None
    };
    if let Some(code) = numeric {
        return char::from_u32(code).map(String::from);
    }
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Unwrap DuckDuckGo `/l/?uddg=<target>` redirect links.
fn extract_ddg_redirect(raw_url: &str) -> String {
    let Ok(base) = reqwest::Url::parse("https://duckduckgo.com/") else {
        return raw_url.to_string();
    };
    base.join(raw_url)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or_else(|| raw_url.to_string())
}

/// Redirect targets are held to the same host rule as the requested URL.
fn redirect_blocked(url: &reqwest::Url, allow_private: bool) -> bool {
    !allow_private && url.host_str().is_some_and(is_private_host)
}

/// Check if a host is a private/internal network address (SSRF prevention).
fn is_private_host(host: &str) -> bool {
    let private_patterns = [
        "localhost",
        "127.",
        "10.",
        "192.168.",
        "169.254.",
        "0.0.0.0",
        "[::1]",
        "::1",
        "metadata.google",
        "metadata.aws",
    ];

    let host_lower = host.to_lowercase();
    if private_patterns.iter().any(|p| host_lower.starts_with(p)) {
        return true;
    }
    // 172.16.0.0/12
    host_lower
        .strip_prefix("172.")
        .and_then(|rest| rest.split('.').next())
        .and_then(|octet| octet.parse::<u8>().ok())
        .is_some_and(|octet| (16..=31).contains(&octet))
}

/// Searches the public web through Serper or DuckDuckGo.
pub struct InternetSearchTool {
    descriptor: ToolDescriptor,
    client: reqwest::Client,
    settings: Arc<InternetSettings>,
    html: HtmlText,
    result_link: Regex,
    result_snippet: Regex,
}

impl InternetSearchTool {
    /// Tool name.
    pub const NAME: &'static str = "internet_search";

    /// Fails only if the HTTP client cannot be built.
    pub fn new(settings: Arc<InternetSettings>) -> CompanyResult<Self> {
        let pattern = |p: &str| {
            Regex::new(p).map_err(|e| CompanyError::Configuration(format!("invalid pattern: {e}")))
        };
        Ok(Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Search the internet for current information and return top results."
                    .to_string(),
                parameters_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query to run on the public web"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results to return (1-10, default: 5)"
                        }
                    },
                    "required": ["query"]
                }),
                required_capabilities: vec![network_capability()],
            },
            client: settings.client()?,
            html: HtmlText::new()?,
            result_link: pattern(
                r#"(?s)<a[^>]*class="[^"]*result__a[^"]*"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#,
            )?,
            result_snippet: pattern(
                r#"(?s)<a[^>]*class="[^"]*result__snippet[^"]*"[^>]*>(.*?)</a>"#,
            )?,
            settings,
        })
    }

    async fn search_serper(
        &self,
        query: &str,
        max_results: usize,
        api_key: &str,
    ) -> Result<Value, reqwest::Error> {
        let payload: Value = self
            .client
            .post(&self.settings.serper_endpoint)
            .header("X-API-KEY", api_key)
            .json(&json!({"q": query, "num": max_results}))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let results: Vec<Value> = payload["organic"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .take(max_results)
                    .map(|item| {
                        json!({
                            "title": item["title"].as_str().unwrap_or_default(),
                            "url": item["link"].as_str().unwrap_or_default(),
                            "snippet": item["snippet"].as_str().unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({"provider": "serper", "query": query, "results": results}))
    }

    async fn search_duckduckgo(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Value, reqwest::Error> {
        let html = self
            .client
            .get(&self.settings.duckduckgo_endpoint)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(json!({
            "provider": "duckduckgo",
            "query": query,
            "results": self.parse_duckduckgo(&html, max_results),
        }))
    }

    fn parse_duckduckgo(&self, html: &str, max_results: usize) -> Vec<Value> {
        let snippets: Vec<String> = self
            .result_snippet
            .captures_iter(html)
            .map(|caps| self.html.strip(&caps[1]))
            .collect();

        self.result_link
            .captures_iter(html)
            .take(max_results)
            .enumerate()
            .map(|(index, caps)| {
                json!({
                    "title": self.html.strip(&caps[2]),
                    "url": extract_ddg_redirect(&self.html.unescape(&caps[1])),
                    "snippet": snippets.get(index).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl Tool for InternetSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let query = str_arg(&call, "query");
        if query.is_empty() {
            return Ok(ToolResult::error_payload(&call.id, "query cannot be empty", Value::Null));
        }

        let max_results = call.arguments["max_results"]
            .as_i64()
            .unwrap_or(DEFAULT_MAX_RESULTS as i64)
            .clamp(1, 10) as usize;

        let outcome = match self.settings.serper_api_key.as_deref() {
            Some(api_key) => {
                info!(query, max_results, provider = "serper", "Internet search");
                self.search_serper(query, max_results, api_key).await
            }
            None => {
                info!(query, max_results, provider = "duckduckgo", "Internet search");
                self.search_duckduckgo(query, max_results).await
            }
        };

        match outcome {
            Ok(payload) => json_success(&call.id, &payload),
            Err(e) => {
                warn!(query, error = %e, "Internet search failed");
                Ok(ToolResult::error_payload(
                    &call.id,
                    format!("internet_search failed: {e}"),
                    json!({"query": query}),
                ))
            }
        }
    }
}

/// Fetches a public webpage and extracts readable text.
pub struct ReadWebpageTool {
    descriptor: ToolDescriptor,
    client: reqwest::Client,
    settings: Arc<InternetSettings>,
    html: HtmlText,
}

impl ReadWebpageTool {
    /// Tool name.
    pub const NAME: &'static str = "read_webpage";

    /// Fails only if the HTTP client cannot be built.
    pub fn new(settings: Arc<InternetSettings>) -> CompanyResult<Self> {
        Ok(Self {
            descriptor: ToolDescriptor {
                name: Self::NAME.to_string(),
                description: "Fetch and extract readable text from a public webpage.".to_string(),
                parameters_schema: json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "Absolute HTTP/HTTPS URL to fetch"
                        },
                        "max_chars": {
                            "type": "integer",
                            "description": "Maximum characters to return (1000-30000, default: 12000)"
                        }
                    },
                    "required": ["url"]
                }),
                required_capabilities: vec![network_capability()],
            },
            client: settings.client()?,
            html: HtmlText::new()?,
            settings,
        })
    }

    async fn fetch(&self, url: &str, max_chars: usize) -> Result<Value, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| e.to_string())?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        if body.len() > MAX_RESPONSE_SIZE {
            return Err(format!(
                "response too large: {} bytes (max: {MAX_RESPONSE_SIZE} bytes)",
                body.len()
            ));
        }

        let decoded = String::from_utf8_lossy(&body);
        let text = if content_type.to_lowercase().contains("text/html") {
            self.html.strip(&decoded)
        } else {
            decoded.into_owned()
        };

        Ok(json!({
            "url": url,
            "content_type": content_type,
            "content_chars": text.chars().count(),
            "excerpt": text.chars().take(max_chars).collect::<String>(),
        }))
    }
}

#[async_trait]
impl Tool for ReadWebpageTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> CompanyResult<ToolResult> {
        let url = str_arg(&call, "url");
        let lowered = url.to_lowercase();
        if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
            return Ok(ToolResult::error_payload(
                &call.id,
                "url must start with http:// or https://",
                Value::Null,
            ));
        }

        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(ToolResult::error_payload(
                    &call.id,
                    format!("Invalid URL: {e}"),
                    json!({"url": url}),
                ));
            }
        };

        if !self.settings.allow_private_hosts {
            if let Some(host) = parsed.host_str().filter(|h| is_private_host(h)) {
                warn!(url, host, "Blocked private host");
                return Ok(ToolResult::error_payload(
                    &call.id,
                    format!("Access denied: '{host}' is a private/internal address"),
                    json!({"url": url}),
                ));
            }
        }

        let max_chars = call.arguments["max_chars"]
            .as_i64()
            .unwrap_or(DEFAULT_MAX_CHARS as i64)
            .clamp(1_000, 30_000) as usize;

        info!(url, max_chars, "Reading webpage");
        match self.fetch(url, max_chars).await {
            Ok(payload) => json_success(&call.id, &payload),
            Err(e) => {
                warn!(url, error = %e, "Webpage read failed");
                Ok(ToolResult::error_payload(
                    &call.id,
                    format!("read_webpage failed: {e}"),
                    json!({"url": url}),
                ))
            }
        }
    }
}
