use serde::{Deserialize, Serialize};

/// Persisted cake record; `id` stays `None` until the repository assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeEntity {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Cake as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Create/update input: only the caller-settable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<models::cake::Model> for CakeEntity {
    fn from(m: models::cake::Model) -> Self {
        CakeEntity { id: Some(m.id), name: m.name, description: m.description, image_url: m.image_url }
    }
}
