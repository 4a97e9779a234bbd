use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// One entry of the inventory's `data` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    #[serde(default)]
    pub quantization: Option<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub max_model_len: Option<u64>,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub supported_features: Vec<String>,
    #[serde(default)]
    pub input_modalities: Vec<String>,
    #[serde(default)]
    pub confidential_compute: Option<bool>,
}

/// Price per million tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub prompt: f64,
    #[serde(default)]
    pub completion: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelRecord>,
}

impl TryFrom<&str> for ModelList {
    type Error = serde_json::Error;

    fn try_from(body: &str) -> Result<Self, Self::Error> {
        let list: ModelList = serde_json::from_str(body)?;
        debug!("ModelList: {} models", list.data.len());
        Ok(list)
    }
}

impl ModelRecord {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self {
            id: id.into(),
            quantization: None,
            context_length: None,
            max_model_len: None,
            pricing: Pricing::default(),
            supported_features: vec![],
            input_modalities: vec![],
            confidential_compute: None,
        }
    }

    pub fn with_pricing(mut self, prompt: f64, completion: f64) -> Self {
        self.pricing = Pricing { prompt, completion };
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn provider(&self) -> &str {
        provider_of(&self.id)
    }

    /// `context_length`, falling back to `max_model_len`. Zero counts as unknown.
    pub fn context_tokens(&self) -> Option<u64> {
        self.context_length
            .filter(|&n| n > 0)
            .or(self.max_model_len)
            .filter(|&n| n > 0)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.supported_features.iter().any(|f| f == feature)
    }

    pub fn is_vision(&self) -> bool {
        self.has_feature("vision") || self.input_modalities.iter().any(|m| m == "image")
    }

    pub fn is_confidential(&self) -> bool {
        self.confidential_compute.unwrap_or(false)
    }

    pub fn flags(&self) -> Vec<ModelFlag> {
        ModelFlag::ALL
            .into_iter()
            .filter(|flag| flag.applies_to(self))
            .collect()
    }
}

/// Provider prefix of a model id: everything before the first `/`.
pub fn provider_of(id: &str) -> &str {
    id.split_once('/').map_or(id, |(provider, _)| provider)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFlag {
    Reasoning,
    Tools,
    JsonMode,
    StructuredOutputs,
    Vision,
    Confidential,
}

impl ModelFlag {
    /// Display order of the flag column.
    pub const ALL: [ModelFlag; 6] = [
        ModelFlag::Reasoning,
        ModelFlag::Tools,
        ModelFlag::JsonMode,
        ModelFlag::StructuredOutputs,
        ModelFlag::Vision,
        ModelFlag::Confidential,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            ModelFlag::Reasoning => "reason",
            ModelFlag::Tools => "tools",
            ModelFlag::JsonMode => "json",
            ModelFlag::StructuredOutputs => "struct",
            ModelFlag::Vision => "vision",
            ModelFlag::Confidential => "TEE",
        }
    }

    fn applies_to(self, model: &ModelRecord) -> bool {
        match self {
            ModelFlag::Reasoning => model.has_feature("reasoning"),
            ModelFlag::Tools => model.has_feature("tools"),
            ModelFlag::JsonMode => model.has_feature("json_mode"),
            ModelFlag::StructuredOutputs => model.has_feature("structured_outputs"),
            ModelFlag::Vision => model.is_vision(),
            ModelFlag::Confidential => model.is_confidential(),
        }
    }
}

impl fmt::Display for ModelFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
