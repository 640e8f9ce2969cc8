//! In-memory resource source for unit tests

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use vcp_core::{
    ApiResource, ClientError, ClientResult, Prompt, PromptError, QuestionOptions, ResourceSource,
};

mock! {
    pub Prompt {}

    impl Prompt for Prompt {
        fn question(&self, options: &QuestionOptions) -> Result<String, PromptError>;
    }
}

pub struct FakeSource {
    objects: HashMap<&'static str, Vec<Value>>,
    failing: HashSet<&'static str>,
    installed: bool,
    listed: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            failing: HashSet::new(),
            installed: true,
            listed: Mutex::new(Vec::new()),
        }
    }

    /// Objects of `kind` without `apiVersion`/`kind`, as list responses return them
    pub fn with(mut self, kind: &'static str, names: &[&str]) -> Self {
        self.objects.insert(
            kind,
            names
                .iter()
                .map(|name| {
                    json!({
                        "metadata": {"name": name, "uid": format!("uid-{}", name)},
                        "status": {}
                    })
                })
                .collect(),
        );
        self
    }

    pub fn failing(mut self, kind: &'static str) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn not_installed(mut self) -> Self {
        self.installed = false;
        self
    }

    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceSource for FakeSource {
    async fn list(&self, resource: &ApiResource) -> ClientResult<Vec<Value>> {
        self.listed.lock().unwrap().push(resource.plural.to_string());
        if self.failing.contains(resource.plural) {
            return Err(ClientError::Api {
                status: 404,
                message: format!("the server could not find the requested resource ({})", resource.plural),
            });
        }
        Ok(self
            .objects
            .get(resource.plural)
            .cloned()
            .unwrap_or_default())
    }

    async fn platform_installed(&self, _namespace: &str) -> ClientResult<bool> {
        Ok(self.installed)
    }
}
