//! Function tools handed to the agent platform.
//!
//! A tool is plain metadata ([`ToolSpec`]) plus an async function. The
//! registry keeps registration order, which is also the order the platform
//! sees the function definitions in.

use crate::core::sitter_search::SitterSearch;
use crate::core::{SearchCriteria, SitterStore, Tool, ToolSpec};
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any earlier tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.spec().name;
        self.tools.retain(|existing| existing.spec().name != name);
        self.tools.push(tool);
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.spec().name == name)
            .ok_or_else(|| AgentError::UnknownTool {
                name: name.to_string(),
            })?;

        tracing::info!("Invoking tool {}", name);
        tool.invoke(arguments).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.tools.iter().map(|t| t.spec().name).collect();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

/// Decodes tool arguments, treating a missing or `null` payload as `{}`.
pub fn parse_arguments<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| AgentError::ToolArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

pub struct SearchSittersTool<S: SitterStore> {
    search: Arc<SitterSearch<S>>,
}

impl<S: SitterStore> SearchSittersTool<S> {
    pub const NAME: &'static str = "search_pet_sitters";

    pub fn new(search: Arc<SitterSearch<S>>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl<S: SitterStore + 'static> Tool for SearchSittersTool<S> {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: Self::NAME.to_string(),
            description: "Search and filter pet sitters based on various criteria. \
                          Returns a JSON list of at most 5 matching pet sitters."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location to search for pet sitters (e.g., 'New York', 'Seattle', 'San Francisco')"
                    },
                    "pet_type": {
                        "type": "string",
                        "description": "Type of pet (e.g., 'dogs', 'cats', 'birds', 'reptiles', 'small_mammals')"
                    },
                    "service": {
                        "type": "string",
                        "description": "Required service (e.g., 'pet_sitting', 'dog_walking', 'overnight_care', 'exotic_pet_care')"
                    },
                    "day_needed": {
                        "type": "string",
                        "description": "Day needed (e.g., 'Monday', 'Saturday')"
                    },
                    "max_rate": {
                        "type": "number",
                        "description": "Maximum hourly rate budget"
                    },
                    "specialization": {
                        "type": "string",
                        "description": "Specific specialization needed (e.g., 'senior_pets', 'exotic_pets', 'medication_administration')"
                    }
                }
            }),
        }
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let criteria: SearchCriteria = parse_arguments(Self::NAME, arguments)?;
        let outcome = self.search.search(&criteria.normalized()).await?;
        Ok(serde_json::to_string_pretty(&outcome)?)
    }
}

#[derive(Debug, Deserialize)]
struct SitterDetailsArgs {
    sitter_id: i64,
}

pub struct SitterDetailsTool<S: SitterStore> {
    search: Arc<SitterSearch<S>>,
}

impl<S: SitterStore> SitterDetailsTool<S> {
    pub const NAME: &'static str = "get_pet_sitter_details";

    pub fn new(search: Arc<SitterSearch<S>>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl<S: SitterStore + 'static> Tool for SitterDetailsTool<S> {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: Self::NAME.to_string(),
            description: "Get detailed information about a specific pet sitter by ID.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "sitter_id": {
                        "type": "integer",
                        "description": "The ID of the pet sitter to get details for"
                    }
                },
                "required": ["sitter_id"]
            }),
        }
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: SitterDetailsArgs = parse_arguments(Self::NAME, arguments)?;
        match self.search.get_by_id(args.sitter_id).await {
            Ok(record) => Ok(serde_json::to_string_pretty(&record)?),
            // 查無此人交給模型處理，不中斷整個 run
            Err(e @ AgentError::NotFound { .. }) => {
                Ok(serde_json::to_string_pretty(&json!({ "error": e.to_string() }))?)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SitterRecord;

    struct FixedStore(Vec<SitterRecord>);

    impl SitterStore for FixedStore {
        async fn load_sitters(&self) -> Result<Vec<SitterRecord>> {
            Ok(self.0.clone())
        }
    }

    fn record(id: i64, location: &str) -> SitterRecord {
        serde_json::from_value(json!({
            "id": id,
            "location": location,
            "typeOfPets": ["cats"],
            "services": ["pet_sitting"],
            "daysAvailable": ["Sunday"],
            "hourlyRate": 18.5,
            "specializations": [],
            "rating": 4.5,
            "reviewCount": 3
        }))
        .unwrap()
    }

    fn registry() -> ToolRegistry {
        let search = Arc::new(SitterSearch::new(FixedStore(vec![
            record(1, "Seattle"),
            record(2, "Miami"),
        ])));
        ToolRegistry::new()
            .with_tool(Arc::new(SearchSittersTool::new(search.clone())))
            .with_tool(Arc::new(SitterDetailsTool::new(search)))
    }

    #[test]
    fn specs_keep_registration_order() {
        let names: Vec<String> = registry().specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["search_pet_sitters", "get_pet_sitter_details"]);
    }

    #[test]
    fn register_replaces_same_name() {
        let mut tools = registry();
        let search = Arc::new(SitterSearch::new(FixedStore(vec![])));
        tools.register(Arc::new(SearchSittersTool::new(search)));
        assert_eq!(tools.len(), 2);
    }

    #[tokio::test]
    async fn search_tool_returns_json_array() {
        let output = registry()
            .dispatch("search_pet_sitters", json!({ "location": "seattle" }))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["id"], 1);
    }

    #[tokio::test]
    async fn search_tool_reports_no_matches_message() {
        let output = registry()
            .dispatch("search_pet_sitters", json!({ "pet_type": "reptiles" }))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["message"], "No pet sitters found matching the criteria.");
    }

    #[tokio::test]
    async fn search_tool_accepts_null_arguments() {
        let output = registry()
            .dispatch("search_pet_sitters", Value::Null)
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn details_tool_reports_missing_sitter_as_error_json() {
        let output = registry()
            .dispatch("get_pet_sitter_details", json!({ "sitter_id": 42 }))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["error"], "Pet sitter with ID 42 not found.");
    }

    #[tokio::test]
    async fn details_tool_rejects_bad_arguments() {
        let err = registry()
            .dispatch("get_pet_sitter_details", json!({ "sitter_id": "two" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolArguments { .. }));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let err = registry().dispatch("book_sitter", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool { .. }));
    }
}
