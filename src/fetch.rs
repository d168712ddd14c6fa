use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{BurndownError, Result};
use crate::models::ProjectItem;

pub const PROJECT_ITEMS_QUERY: &str = r#"
query($org: String!, $cursor: String) {
  organization(login: $org) {
    projectsV2(first: 100) {
      nodes {
        title
        items(first: 50, after: $cursor) {
          nodes {
            id
            fieldValues(first: 10) {
              nodes {
                ... on ProjectV2ItemFieldTextValue {
                  text
                  field { ... on ProjectV2FieldCommon { name } }
                }
                ... on ProjectV2ItemFieldNumberValue {
                  number
                  field { ... on ProjectV2FieldCommon { name } }
                }
              }
            }
            content {
              ... on Issue {
                title
                state
                closedAt
              }
            }
          }
          pageInfo {
            hasNextPage
            endCursor
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    errors: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Organization {
    projects_v2: Option<ProjectConnection>,
}

#[derive(Debug, Deserialize)]
struct ProjectConnection {
    nodes: Option<Vec<Option<ProjectNode>>>,
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    title: Option<String>,
    items: Option<ItemConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemConnection {
    nodes: Option<Vec<ProjectItem>>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

/// One page of items for the matched project.
#[derive(Debug)]
pub struct ItemPage {
    pub items: Vec<ProjectItem>,
    pub next_cursor: Option<String>,
}

/// Client for the Projects V2 GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct ProjectClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ProjectClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| BurndownError::Config(format!("GITHUB_TOKEN is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent("project-burndown")
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Collects every item of the project titled `project_title`, in page order.
    ///
    /// The project is looked up by title again on each page.
    pub async fn fetch_project_items(&self, org: &str, project_title: &str) -> Result<Vec<ProjectItem>> {
        let mut all_items: Vec<ProjectItem> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_number = 0usize;

        loop {
            page_number += 1;
            let page = self.fetch_page(org, project_title, cursor.as_deref()).await?;
            log::info!(
                "fetched page {} of '{}': {} items",
                page_number,
                project_title,
                page.items.len()
            );
            all_items.extend(page.items);

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        log::info!("fetched {} items for project '{}'", all_items.len(), project_title);
        Ok(all_items)
    }

    async fn fetch_page(&self, org: &str, project_title: &str, cursor: Option<&str>) -> Result<ItemPage> {
        let body = json!({
            "query": PROJECT_ITEMS_QUERY,
            "variables": { "org": org, "cursor": cursor },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let parsed: GraphQlResponse = serde_json::from_str(&text)
            .map_err(|e| BurndownError::Schema(format!("response is not a GraphQL envelope: {e}")))?;

        extract_page(parsed, org, project_title)
    }
}

fn extract_page(response: GraphQlResponse, org: &str, project_title: &str) -> Result<ItemPage> {
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect();
        log::error!("GraphQL errors: {}", serde_json::Value::Array(errors));
        return Err(BurndownError::Protocol(messages.join("; ")));
    }

    let data = response
        .data
        .ok_or_else(|| BurndownError::Schema("'data' key missing".to_string()))?;
    let organization = data
        .organization
        .ok_or_else(|| BurndownError::Schema("'data.organization' missing".to_string()))?;
    let projects = organization
        .projects_v2
        .and_then(|connection| connection.nodes)
        .ok_or_else(|| BurndownError::Schema("'organization.projectsV2.nodes' missing".to_string()))?;

    let project = projects
        .into_iter()
        .flatten()
        .find(|p| p.title.as_deref() == Some(project_title))
        .ok_or_else(|| BurndownError::NotFound {
            org: org.to_string(),
            project: project_title.to_string(),
        })?;

    let items = project
        .items
        .ok_or_else(|| BurndownError::Schema(format!("project '{project_title}' has no 'items'")))?;
    let nodes = items
        .nodes
        .ok_or_else(|| BurndownError::Schema("'items.nodes' missing".to_string()))?;
    let page_info = items
        .page_info
        .ok_or_else(|| BurndownError::Schema("'items.pageInfo' missing".to_string()))?;

    let next_cursor = if page_info.has_next_page {
        Some(page_info.end_cursor.ok_or_else(|| {
            BurndownError::Schema("'pageInfo.hasNextPage' is true but 'endCursor' is missing".to_string())
        })?)
    } else {
        None
    };

    Ok(ItemPage {
        items: nodes,
        next_cursor,
    })
}
