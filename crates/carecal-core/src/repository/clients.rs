use crate::error::CoreError;
use crate::models::{Client, Document, NewClientData, UpdateClientData};
use crate::repository::{matches_prefix, JsonRepository};
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

fn check_manager(doc: &Document, manager_id: Option<Uuid>) -> Result<(), CoreError> {
    match manager_id {
        Some(id) if !doc.care_managers.iter().any(|m| m.id == id) => {
            Err(CoreError::NotFound(format!("Care manager {}", id)))
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl super::ClientRepository for JsonRepository {
    async fn add_client(&self, data: NewClientData) -> Result<Client, CoreError> {
        if data.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("Client name cannot be empty".to_string()));
        }

        self.update(move |doc| {
            check_manager(doc, data.care_manager_id)?;
            let client = Client {
                id: Uuid::new_v4(),
                name: data.name.trim().to_string(),
                address: data.address,
                care_level: data.care_level,
                care_manager_id: data.care_manager_id,
                notes: data.notes,
            };
            doc.clients.push(client.clone());
            info!(client = %client.name, "Added client");
            Ok(client)
        })
        .await
    }

    async fn update_client(&self, id: Uuid, data: UpdateClientData) -> Result<Client, CoreError> {
        if data.name.as_deref().map_or(false, |n| n.trim().is_empty()) {
            return Err(CoreError::InvalidInput("Client name cannot be empty".to_string()));
        }

        self.update(move |doc| {
            if let Some(manager_id) = data.care_manager_id {
                check_manager(doc, manager_id)?;
            }
            let client = doc
                .clients
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| CoreError::NotFound(format!("Client {}", id)))?;

            if let Some(name) = data.name {
                client.name = name.trim().to_string();
            }
            if let Some(address) = data.address {
                client.address = address;
            }
            if let Some(care_level) = data.care_level {
                client.care_level = care_level;
            }
            if let Some(care_manager_id) = data.care_manager_id {
                client.care_manager_id = care_manager_id;
            }
            if let Some(notes) = data.notes {
                client.notes = notes;
            }
            info!(client = %client.name, "Updated client");
            Ok(client.clone())
        })
        .await
    }

    async fn delete_client(&self, id: Uuid) -> Result<(), CoreError> {
        self.update(move |doc| {
            let before = doc.clients.len();
            doc.clients.retain(|c| c.id != id);
            if doc.clients.len() == before {
                return Err(CoreError::NotFound(format!("Client {}", id)));
            }
            info!(client = %id, "Deleted client");
            Ok(())
        })
        .await
    }

    async fn find_clients(&self) -> Result<Vec<Client>, CoreError> {
        let mut clients = self.load_document().await?.clients;
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn find_clients_for_manager(&self, manager_id: Uuid) -> Result<Vec<Client>, CoreError> {
        let clients = self.find_clients().await?;
        Ok(clients
            .into_iter()
            .filter(|c| c.care_manager_id == Some(manager_id))
            .collect())
    }

    async fn find_client_by_id(&self, id: Uuid) -> Result<Option<Client>, CoreError> {
        let doc = self.load_document().await?;
        Ok(doc.clients.into_iter().find(|c| c.id == id))
    }

    async fn find_clients_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Client>, CoreError> {
        let doc = self.load_document().await?;
        Ok(doc
            .clients
            .into_iter()
            .filter(|c| matches_prefix(&c.id, short_id))
            .collect())
    }
}
