/// One administered entity type exposed under `/api/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    /// Query keys accepted by the entity's list endpoint.
    pub filter_fields: &'static [&'static str],
}

impl EntityDescriptor {
    /// Rejects the first query key that is not a known filter of this entity.
    pub fn check_filters<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Result<(), String> {
        for key in keys {
            if !self.filter_fields.iter().any(|field| *field == key) {
                return Err(if self.filter_fields.is_empty() {
                    format!("{} cannot be filtered (got '{}')", self.name, key)
                } else {
                    format!(
                        "unknown filter '{}' for {}, expected one of: {}",
                        key,
                        self.name,
                        self.filter_fields.join(", ")
                    )
                });
            }
        }
        Ok(())
    }
}

pub static API_CLIENTS: EntityDescriptor = EntityDescriptor {
    name: "apiclients",
    path: "/api/apiclients",
    filter_fields: &[],
};

pub static PROPERTIES: EntityDescriptor = EntityDescriptor {
    name: "properties",
    path: "/api/properties",
    filter_fields: &["sewage_type", "assessment_date", "api_client"],
};

pub static ENTITIES: &[&EntityDescriptor] = &[&API_CLIENTS, &PROPERTIES];
