use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::handler::ToolDescriptor;
use crate::error::ToolboxError;

/// Resolved collection of tools an agent may call. Cloning shares the handles.
#[derive(Clone, Default)]
pub struct Toolset {
    name: Option<String>,
    tools: Vec<Arc<dyn ToolDescriptor>>,
}

impl Toolset {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty toolset tagged with the catalog name it is loaded from.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            tools: Vec::new(),
        }
    }

    pub fn add(mut self, tool: impl ToolDescriptor + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub(crate) fn push(&mut self, tool: Arc<dyn ToolDescriptor>) {
        self.tools.push(tool);
    }

    /// Catalog name, or `None` for the default toolset and hand-built sets.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolDescriptor>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolDescriptor>> {
        self.tools.iter()
    }

    /// Function declarations for every tool, in load order.
    pub fn declarations(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.declaration()).collect()
    }

    /// Invoke a tool by name.
    pub async fn invoke(&self, name: &str, args: &Value) -> Result<String, ToolboxError> {
        let tool = self.get(name).ok_or_else(|| ToolboxError::NotFound {
            kind: "tool",
            name: name.to_string(),
        })?;
        tool.invoke(args).await
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl fmt::Debug for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolset")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticTool {
        name: &'static str,
        description: &'static str,
    }

    #[async_trait::async_trait]
    impl ToolDescriptor for StaticTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn invoke(&self, args: &Value) -> Result<String, ToolboxError> {
            Ok(format!("{}:{}", self.name, args))
        }
    }

    fn test_toolset() -> Toolset {
        Toolset::named("my-toolset")
            .add(StaticTool {
                name: "search_hotels",
                description: "Search for hotels by location",
            })
            .add(StaticTool {
                name: "book_room",
                description: "Book a hotel room",
            })
    }

    #[test]
    fn names_in_insertion_order() {
        let set = test_toolset();
        assert_eq!(set.name(), Some("my-toolset"));
        assert_eq!(set.tool_names(), vec!["search_hotels", "book_room"]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }

    #[test]
    fn get_by_name() {
        let set = test_toolset();
        assert_eq!(set.get("book_room").unwrap().description(), "Book a hotel room");
        assert!(set.get("cancel_room").is_none());
    }

    #[test]
    fn declarations_carry_name_and_parameters() {
        let decls = test_toolset().declarations();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0]["name"], "search_hotels");
        assert_eq!(decls[0]["description"], "Search for hotels by location");
        assert_eq!(decls[0]["parameters"]["type"], "object");
        assert!(decls[0].get("input_schema").is_none());
    }

    #[test]
    fn clone_shares_handles() {
        let set = test_toolset();
        let copy = set.clone();
        assert!(Arc::ptr_eq(
            set.get("book_room").unwrap(),
            copy.get("book_room").unwrap()
        ));
    }

    #[test]
    fn debug_lists_tool_names() {
        let out = format!("{:?}", test_toolset());
        assert!(out.contains("search_hotels"));
        assert!(out.contains("my-toolset"));
    }

    #[tokio::test]
    async fn invoke_dispatches_by_name() {
        let set = test_toolset();
        let out = set.invoke("book_room", &json!({"id": 1})).await.unwrap();
        assert_eq!(out, r#"book_room:{"id":1}"#);
    }

    #[tokio::test]
    async fn invoke_unknown_tool() {
        let err = test_toolset().invoke("nope", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolboxError::NotFound { kind: "tool", .. }));
    }
}
