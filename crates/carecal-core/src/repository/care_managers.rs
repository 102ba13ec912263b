use crate::error::CoreError;
use crate::models::CareManager;
use crate::repository::JsonRepository;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

#[async_trait]
impl super::CareManagerRepository for JsonRepository {
    async fn add_care_manager(&self, name: String) -> Result<CareManager, CoreError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Care manager name cannot be empty".to_string()));
        }

        self.update(move |doc| {
            if doc.care_managers.iter().any(|m| m.name == name) {
                return Err(CoreError::InvalidInput(format!("Care manager '{}' already exists", name)));
            }
            let manager = CareManager {
                id: Uuid::new_v4(),
                name,
            };
            doc.care_managers.push(manager.clone());
            info!(manager = %manager.name, "Added care manager");
            Ok(manager)
        })
        .await
    }

    async fn find_care_managers(&self) -> Result<Vec<CareManager>, CoreError> {
        Ok(self.load_document().await?.care_managers)
    }

    async fn find_care_manager_by_name(&self, name: &str) -> Result<Option<CareManager>, CoreError> {
        let doc = self.load_document().await?;
        Ok(doc
            .care_managers
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim())))
    }
}
