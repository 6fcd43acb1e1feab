use crate::domain::model::{Item, ItemRef};
use crate::domain::ports::{BoardClient, ColumnPatch};
use crate::utils::error::{DuplicatorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";
const PAGE_LIMIT: u32 = 500;

const ITEM_FIELDS: &str = r#"
    id
    name
    group { id title }
    column_values { id text value type }
"#;

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Board {
    items_page: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Vec<Board>,
}

#[derive(Debug, Deserialize)]
struct NextPageData {
    next_items_page: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct CreateItemData {
    create_item: ItemRef,
}

#[derive(Debug, Deserialize)]
struct ChangeColumnValuesData {
    change_multiple_column_values: ItemRef,
}

/// GraphQL client for the Monday v2 API.
#[derive(Debug, Clone)]
pub struct MondayClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl MondayClient {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, api_url, None)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Posts one query and returns its `data` member.
    ///
    /// Non-success status, a top-level `errors` array, or a missing `data`
    /// member are all transport faults.
    pub async fn execute_query(&self, query: &str, variables: Value) -> Result<Value> {
        tracing::debug!("POST {} ({} bytes of query)", self.api_url, query.len());

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DuplicatorError::HttpStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let mut payload: Value = response.json().await?;

        if let Some(errors) = payload.get("errors") {
            return Err(DuplicatorError::GraphQlError {
                message: errors.to_string(),
            });
        }

        match payload.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(DuplicatorError::MalformedResponseError {
                message: "response has no data member".to_string(),
            }),
        }
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let data = self.execute_query(query, variables).await?;
        serde_json::from_value(data).map_err(|e| DuplicatorError::MalformedResponseError {
            message: e.to_string(),
        })
    }

    fn first_board(data: BoardsData, board_id: u64) -> Result<ItemsPage> {
        data.boards
            .into_iter()
            .next()
            .map(|board| board.items_page)
            .ok_or_else(|| DuplicatorError::MalformedResponseError {
                message: format!("board {} not found or not accessible", board_id),
            })
    }
}

#[async_trait]
impl BoardClient for MondayClient {
    async fn find_item(&self, board_id: u64, name: &str) -> Result<Option<Item>> {
        let query = format!(
            r#"query ($boardId: [ID!], $queryParams: ItemsQuery) {{
                boards(ids: $boardId) {{
                    items_page(limit: 1, query_params: $queryParams) {{
                        items {{ {} }}
                    }}
                }}
            }}"#,
            ITEM_FIELDS
        );
        let variables = json!({
            "boardId": [board_id.to_string()],
            "queryParams": {
                "rules": [{ "column_id": "name", "compare_value": [name] }]
            }
        });

        let data: BoardsData = self.query(&query, variables).await?;
        let page = Self::first_board(data, board_id)?;
        Ok(page.items.into_iter().next())
    }

    async fn list_items(&self, board_id: u64, group_id: &str) -> Result<Vec<Item>> {
        let first_query = format!(
            r#"query ($boardId: [ID!], $limit: Int!) {{
                boards(ids: $boardId) {{
                    items_page(limit: $limit) {{
                        cursor
                        items {{ {} }}
                    }}
                }}
            }}"#,
            ITEM_FIELDS
        );
        let next_query = format!(
            r#"query ($cursor: String!, $limit: Int!) {{
                next_items_page(cursor: $cursor, limit: $limit) {{
                    cursor
                    items {{ {} }}
                }}
            }}"#,
            ITEM_FIELDS
        );

        let data: BoardsData = self
            .query(
                &first_query,
                json!({ "boardId": [board_id.to_string()], "limit": PAGE_LIMIT }),
            )
            .await?;
        let mut page = Self::first_board(data, board_id)?;
        let mut items = std::mem::take(&mut page.items);

        while let Some(cursor) = page.cursor.take() {
            tracing::debug!("Fetching next page of board {} ({} so far)", board_id, items.len());
            let next: NextPageData = self
                .query(&next_query, json!({ "cursor": cursor, "limit": PAGE_LIMIT }))
                .await?;
            page = next.next_items_page;
            items.append(&mut page.items);
        }

        items.retain(|item| item.group_id() == Some(group_id));
        Ok(items)
    }

    async fn create_item(
        &self,
        board_id: u64,
        group_id: &str,
        name: &str,
        column_values: &ColumnPatch,
    ) -> Result<ItemRef> {
        let query = r#"mutation ($boardId: ID!, $groupId: String!, $itemName: String!, $columnValues: JSON!) {
            create_item(
                board_id: $boardId,
                group_id: $groupId,
                item_name: $itemName,
                column_values: $columnValues
            ) { id name }
        }"#;
        let variables = json!({
            "boardId": board_id.to_string(),
            "groupId": group_id,
            "itemName": name,
            "columnValues": serde_json::to_string(column_values)?,
        });

        let data: CreateItemData = self.query(query, variables).await?;
        Ok(data.create_item)
    }

    async fn update_item(
        &self,
        board_id: u64,
        item_id: &str,
        column_values: &ColumnPatch,
    ) -> Result<ItemRef> {
        let query = r#"mutation ($boardId: ID!, $itemId: ID!, $columnValues: JSON!) {
            change_multiple_column_values(
                board_id: $boardId,
                item_id: $itemId,
                column_values: $columnValues
            ) { id name }
        }"#;
        let variables = json!({
            "boardId": board_id.to_string(),
            "itemId": item_id,
            "columnValues": serde_json::to_string(column_values)?,
        });

        let data: ChangeColumnValuesData = self.query(query, variables).await?;
        Ok(data.change_multiple_column_values)
    }
}
