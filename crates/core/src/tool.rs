//! Tool declarations, invocations and results

use crate::{Error, Object, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{collections::BTreeMap, fmt, future::Future, pin::Pin, sync::Arc};

/// A type-erased async tool callback.
///
/// `Ok(None)` means the callback produced no result for this invocation.
pub type Callback = Arc<
    dyn Fn(Object) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send>>
        + Send
        + Sync,
>;

/// A tool the model may call.
///
/// Callbacks are spawned on the current tokio runtime when a completion
/// round invokes them; calling outside a runtime panics.
#[derive(Clone, Serialize)]
pub struct Tool {
    /// The name of the tool
    pub name: String,

    /// The description of the tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The parameter schema of the tool
    #[serde(rename = "parameters")]
    pub schema: Schema,

    /// The local callback
    #[serde(skip)]
    callback: Callback,
}

impl Tool {
    /// Declare a tool with an async callback over the raw argument map.
    pub fn new<F, Fut>(name: impl Into<String>, schema: Schema, callback: F) -> Self
    where
        F: Fn(Object) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            schema,
            callback: Arc::new(move |args| Box::pin(callback(args))),
        }
    }

    /// Declare a tool whose parameters are derived from `T`.
    ///
    /// The callback receives the arguments decoded into `T`.
    pub fn typed<T, F, Fut>(name: impl Into<String>, callback: F) -> Self
    where
        T: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
    {
        let name = name.into();
        let tool = name.clone();
        let callback = Arc::new(callback);
        Self::new(name, Schema::of::<T>(), move |args: Object| {
            let callback = callback.clone();
            let tool = tool.clone();
            async move {
                let value = serde_json::Value::from(crate::Value::Object(args));
                let params = serde_json::from_value::<T>(value).map_err(|e| {
                    Error::FailedToDecodeToolArguments {
                        tool,
                        cause: e.into(),
                    }
                })?;
                callback(params).await
            }
        })
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Run the callback with the given arguments.
    pub fn call(
        &self,
        args: Object,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send>> {
        (self.callback)(args)
    }

    /// Required parameters absent from `args`, in schema order.
    pub fn missing(&self, args: &Object) -> Vec<String> {
        self.schema
            .required
            .iter()
            .filter(|name| !args.contains_key(name.as_str()))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// The parameter schema of a tool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Schema {
    /// The schema type, `object` for tool parameters
    #[serde(rename = "type")]
    pub kind: String,

    /// The parameters by name
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,

    /// The names of required parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    /// An object schema without parameters
    pub fn object() -> Self {
        Self {
            kind: "object".into(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Add a required parameter.
    pub fn required(mut self, name: impl Into<String>, property: Property) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, property);
        self
    }

    /// Derive the schema of a `schemars` type.
    ///
    /// Nullable property types collapse to their non-null type and
    /// referenced definitions are reported as `object`.
    pub fn of<T: JsonSchema>() -> Self {
        let root = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
        let properties = root
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| (name.clone(), Property::from_json(prop)))
                    .collect()
            })
            .unwrap_or_default();
        let required = root
            .get("required")
            .and_then(|r| r.as_array())
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            kind: "object".into(),
            properties,
            required,
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::object()
    }
}

/// A single parameter in a [`Schema`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Property {
    /// The parameter type
    #[serde(rename = "type")]
    pub kind: String,

    /// The allowed values
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,

    /// The description of the parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Property {
    /// A parameter of the given type
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            choices: None,
            description: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict to the given values.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    fn from_json(prop: &serde_json::Value) -> Self {
        let kind = match prop.get("type") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(serde_json::Value::Array(kinds)) => kinds
                .iter()
                .filter_map(|k| k.as_str())
                .find(|k| *k != "null")
                .unwrap_or("null")
                .to_owned(),
            _ => "object".to_owned(),
        };
        let choices = prop.get("enum").and_then(|e| e.as_array()).map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        });
        let description = prop
            .get("description")
            .and_then(|d| d.as_str())
            .map(str::to_owned);
        Self {
            kind,
            choices,
            description,
        }
    }
}

/// A tool call made by the model
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolCall {
    /// The ID of the tool call
    #[serde(default)]
    pub id: String,

    /// The position of the tool call, used to merge streamed fragments
    #[serde(default)]
    pub index: u32,

    /// The name of the function to call
    #[serde(default)]
    pub name: String,

    /// The raw argument text, JSON once complete
    #[serde(default)]
    pub arguments: String,
}

impl ToolCall {
    /// Create a complete tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            index: 0,
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Merge a later fragment of the same call into this one.
    ///
    /// Fields present in the fragment overwrite, argument text appends.
    pub fn merge(&mut self, call: &Self) {
        if !call.id.is_empty() {
            self.id.clone_from(&call.id);
        }
        if !call.name.is_empty() {
            self.name.clone_from(&call.name);
        }
        self.arguments.push_str(&call.arguments);
    }

    /// Parse the argument text into an argument map.
    ///
    /// Empty or whitespace-only text is an empty map.
    pub fn parse_arguments(&self) -> Result<Object> {
        if self.arguments.trim().is_empty() {
            return Ok(Object::new());
        }
        serde_json::from_str(&self.arguments).map_err(|e| Error::FailedToDecodeToolArguments {
            tool: self.name.clone(),
            cause: e.into(),
        })
    }
}

/// Merge streamed tool-call fragments into `calls` by their index.
pub fn merge_tool_calls(calls: &mut Vec<ToolCall>, fragments: &[ToolCall]) {
    for fragment in fragments {
        match calls.iter_mut().find(|c| c.index == fragment.index) {
            Some(call) => call.merge(fragment),
            None => calls.push(fragment.clone()),
        }
    }
}

/// The result of one tool call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolResult {
    /// The id of the tool call this answers
    pub id: String,

    /// The result text
    pub content: String,
}

impl ToolResult {
    /// Create a new tool result
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}
