use crate::error::CoreError;
use crate::models::{Category, NewCategoryData, DEFAULT_COLOR};
use crate::repository::JsonRepository;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Accepts `#rgb` and `#rrggbb`
fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .map_or(false, |hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[async_trait]
impl super::CategoryRepository for JsonRepository {
    async fn add_category(&self, data: NewCategoryData) -> Result<Category, CoreError> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Category name cannot be empty".to_string()));
        }
        let color = data.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
        if !is_hex_color(&color) {
            return Err(CoreError::InvalidInput(format!("'{}' is not a hex colour like #0ea5e9", color)));
        }
        if let (Some(start), Some(end)) = (data.default_start_time, data.default_end_time) {
            if end < start {
                return Err(CoreError::InvalidInput("Default end time is before the start time".to_string()));
            }
        }

        self.update(move |doc| {
            if doc.schedule_types.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
                return Err(CoreError::InvalidInput(format!("Category '{}' already exists", name)));
            }
            let category = Category {
                id: Uuid::new_v4(),
                name,
                color,
                default_start_time: data.default_start_time,
                default_end_time: data.default_end_time,
            };
            doc.schedule_types.push(category.clone());
            info!(category = %category.name, "Added category");
            Ok(category)
        })
        .await
    }

    async fn delete_category(&self, key: &str) -> Result<Category, CoreError> {
        let key = key.trim().to_string();
        self.update(move |doc| {
            let index = doc
                .schedule_types
                .iter()
                .position(|c| c.id.to_string() == key || c.name.eq_ignore_ascii_case(&key))
                .ok_or_else(|| CoreError::NotFound(format!("Category '{}'", key)))?;
            let removed = doc.schedule_types.remove(index);
            info!(category = %removed.name, "Deleted category");
            Ok(removed)
        })
        .await
    }

    async fn find_categories(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.load_document().await?.schedule_types)
    }
}
