use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;
use tracing::error;

use crate::fetch::FetchOptions;
use crate::model::MatchMode;
use crate::query::{self, FeedOptions};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    #[schemars(description = "Tags to search for, comma-separated. Example: cats,kittens")]
    tags: String,
    #[schemars(
        description = "Match photos carrying any of the tags instead of all of them. Default: false"
    )]
    match_any: Option<bool>,
    #[schemars(description = "Feed language code. Examples: en-us, de-de, fr-fr. Default: en-us")]
    lang: Option<String>,
    #[schemars(description = "Return only the first N photos")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct FeedUrlArgs {
    #[schemars(description = "Tags to search for, comma-separated. Example: cats,kittens")]
    tags: String,
    #[schemars(description = "Match any tag instead of all tags. Default: false")]
    match_any: Option<bool>,
    #[schemars(description = "Feed language code. Default: en-us")]
    lang: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct OpenUrlArgs {
    #[schemars(description = "URL to open. Must start with http:// or https://")]
    url: String,
}

fn feed_options(match_any: Option<bool>, lang: Option<String>) -> FeedOptions {
    FeedOptions {
        language: lang.unwrap_or_else(|| query::DEFAULT_LANGUAGE.into()),
        match_mode: MatchMode::from_match_all(!match_any.unwrap_or(false)),
        ..FeedOptions::default()
    }
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

#[derive(Debug, Clone)]
struct FlickrMcp {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FlickrMcp {
    fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search Flickr's public photo feed by tag and return the photos as JSON. Each photo has title, author, author_id, tags, image (thumbnail URL) and link (large image URL). To show a photo, pass its link to open_url."
    )]
    async fn flickr_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let tags = query::join_tags(&[args.tags.as_str()]);
        if tags.is_empty() {
            return tool_error("at least one tag is required");
        }

        let options = feed_options(args.match_any, args.lang);
        match crate::search(&tags, options, FetchOptions::default()).await {
            Ok(mut photos) => {
                if let Some(n) = args.top {
                    photos.truncate(n);
                }
                match serde_json::to_string_pretty(&photos) {
                    Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
                    Err(e) => tool_error(e.to_string()),
                }
            }
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(
        description = "Build the public feed URL for the given tags without fetching it. Useful for inspecting the exact request flickr_search would make."
    )]
    async fn flickr_feed_url(
        &self,
        Parameters(args): Parameters<FeedUrlArgs>,
    ) -> Result<CallToolResult, McpError> {
        let tags = query::join_tags(&[args.tags.as_str()]);
        let options = feed_options(args.match_any, args.lang);
        match crate::feed_url(&tags, &options) {
            Ok(url) => Ok(CallToolResult::success(vec![Content::text(url)])),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(description = "Open a URL in the default web browser, e.g. a photo link returned by flickr_search.")]
    async fn open_url(
        &self,
        Parameters(args): Parameters<OpenUrlArgs>,
    ) -> Result<CallToolResult, McpError> {
        if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
            return tool_error("URL must start with http:// or https://");
        }

        match open::that(&args.url) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Opened: {}",
                args.url
            ))])),
            Err(e) => tool_error(format!("failed to open browser: {e}")),
        }
    }
}

#[tool_handler]
impl ServerHandler for FlickrMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "flickr".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Flickr public photo feed search. Use flickr_search with comma-separated tags; set match_any to widen the search. Open a photo's link with open_url.".into(),
            ),
        }
    }
}

pub async fn run() {
    let service = match FlickrMcp::new().serve(rmcp::transport::stdio()).await {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "failed to start MCP server");
            std::process::exit(1);
        }
    };
    if let Err(e) = service.waiting().await {
        error!(error = %e, "MCP server error");
        std::process::exit(1);
    }
}
