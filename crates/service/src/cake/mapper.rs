use super::domain::{CakeDto, CakeEntity, CakeRequest};

/// Converts between the persisted and transfer shapes of a cake.
pub trait CakeMapper: Send + Sync {
    fn to_dto(&self, entity: CakeEntity) -> CakeDto;
    /// The returned entity never carries an id.
    fn to_entity(&self, request: CakeRequest) -> CakeEntity;
}

/// Field-for-field mapper. Applies no defaults, so an update that omits a
/// field clears it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCakeMapper;

impl CakeMapper for DefaultCakeMapper {
    fn to_dto(&self, entity: CakeEntity) -> CakeDto {
        CakeDto {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            image_url: entity.image_url,
        }
    }

    fn to_entity(&self, request: CakeRequest) -> CakeEntity {
        CakeEntity {
            id: None,
            name: request.name,
            description: request.description,
            image_url: request.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_maps_without_id() {
        let entity = DefaultCakeMapper.to_entity(CakeRequest {
            name: "Battenberg".into(),
            description: Some("Chequered".into()),
            image_url: None,
        });
        assert_eq!(entity.id, None);
        assert_eq!(entity.name, "Battenberg");
        assert_eq!(entity.description.as_deref(), Some("Chequered"));
    }

    #[test]
    fn entity_maps_every_field() {
        let dto = DefaultCakeMapper.to_dto(CakeEntity {
            id: Some(3),
            name: "Eccles".into(),
            description: None,
            image_url: Some("https://example.com/eccles.jpg".into()),
        });
        assert_eq!(dto.id, Some(3));
        assert_eq!(dto.name, "Eccles");
        assert_eq!(dto.description, None);
        assert_eq!(dto.image_url.as_deref(), Some("https://example.com/eccles.jpg"));
    }

    #[test]
    fn request_json_defaults_optional_fields() {
        let req: CakeRequest = serde_json::from_str(r#"{"name":"Parkin"}"#).unwrap();
        assert_eq!(req.description, None);
        assert_eq!(req.image_url, None);

        let json = serde_json::to_value(DefaultCakeMapper.to_dto(DefaultCakeMapper.to_entity(req))).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["name"], "Parkin");
    }
}
