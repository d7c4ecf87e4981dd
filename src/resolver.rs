//! Per-run project-name resolution with memoization and negative caching.

use std::collections::HashMap;

use clockify_api::{ClockifyClient, EventSink};

pub const NO_PROJECT: &str = "No Project";
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Resolves project ids to display names against one workspace + API key,
/// caching for the lifetime of a single generation run. Failed lookups are
/// cached too, so one broken id costs one network call per run.
pub struct ProjectNameResolver<'a> {
    client: &'a ClockifyClient,
    cache: HashMap<String, String>,
}

impl<'a> ProjectNameResolver<'a> {
    pub fn new(client: &'a ClockifyClient) -> Self {
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, project_id: &str, sink: &dyn EventSink) -> String {
        if project_id.is_empty() {
            return NO_PROJECT.to_string();
        }
        if let Some(name) = self.cache.get(project_id) {
            return name.clone();
        }

        let name = match self.client.get_project(project_id).await {
            Ok(project) => project
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_PROJECT.to_string()),
            Err(err) => {
                sink.warn(format!(
                    "project name lookup failed for {project_id}: {err}"
                ));
                UNKNOWN_PROJECT.to_string()
            }
        };
        self.cache.insert(project_id.to_string(), name.clone());
        name
    }
}
