use serde::{Deserialize, Serialize};

/// A subscription streaming service known by its metadata-source provider id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamingService {
    pub id: u32,
    pub name: String,
}

impl StreamingService {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Display names for the providers the service knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDirectory {
    services: Vec<StreamingService>,
}

impl Default for ServiceDirectory {
    fn default() -> Self {
        Self::new(vec![
            StreamingService::new(8, "Netflix"),
            StreamingService::new(9, "Amazon Prime Video"),
            StreamingService::new(337, "Disney+"),
            StreamingService::new(531, "Paramount+"),
            StreamingService::new(350, "Apple TV+"),
        ])
    }
}

impl ServiceDirectory {
    pub fn new(services: Vec<StreamingService>) -> Self {
        Self { services }
    }

    pub fn name_of(&self, provider_id: u32) -> Option<&str> {
        self.services
            .iter()
            .find(|service| service.id == provider_id)
            .map(|service| service.name.as_str())
    }

    /// Names for the given ids in request order, unknown ids rendered as `Provider <id>`
    pub fn names_for(&self, provider_ids: &[u32]) -> Vec<String> {
        provider_ids
            .iter()
            .map(|id| {
                self.name_of(*id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Provider {}", id))
            })
            .collect()
    }
}
