use anyhow::{anyhow, Result};
use carecal_core::error::CoreError;
use carecal_core::repository::Repository;
use uuid::Uuid;

pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn check_short_id(short_id: &str) -> Result<()> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    Ok(())
}

pub async fn resolve_event_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let events = repo.find_events_by_short_id_prefix(short_id).await?;
    if events.len() == 1 {
        Ok(events[0].id)
    } else if events.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No event found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let event_info: Vec<(String, String)> = events
            .into_iter()
            .map(|e| (e.id.to_string(), format!("{} on {}", e.title, e.date())))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(event_info)))
    }
}

/// Resolves a client by exact name (ignoring case) or by ID prefix.
pub async fn resolve_client_id(repo: &impl Repository, key: &str) -> Result<Uuid> {
    let clients = repo.find_clients().await?;
    let by_name: Vec<_> = clients
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case(key.trim()))
        .collect();
    if by_name.len() == 1 {
        return Ok(by_name[0].id);
    }

    check_short_id(key)?;
    let matches = repo.find_clients_by_short_id_prefix(key).await?;
    if matches.len() == 1 {
        Ok(matches[0].id)
    } else if matches.is_empty() && by_name.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No client found with name or ID prefix '{}'",
            key
        ))))
    } else {
        let candidates = if matches.is_empty() {
            by_name.into_iter().cloned().collect()
        } else {
            matches
        };
        let client_info: Vec<(String, String)> = candidates
            .into_iter()
            .map(|c| (c.id.to_string(), c.name))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(client_info)))
    }
}

pub async fn resolve_manager_id(repo: &impl Repository, name: &str) -> Result<Uuid> {
    repo.find_care_manager_by_name(name)
        .await?
        .map(|m| m.id)
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("No care manager named '{}'", name))))
}

pub async fn resolve_optional_manager_id(repo: &impl Repository, name: Option<&str>) -> Result<Option<Uuid>> {
    match name {
        Some(name) => Ok(Some(resolve_manager_id(repo, name).await?)),
        None => Ok(None),
    }
}

/// Roster position from a staff name (ignoring case) or a 1-based number.
pub fn resolve_staff(staff: &[String], key: &str) -> Result<usize> {
    if let Some(index) = staff.iter().position(|name| name.eq_ignore_ascii_case(key.trim())) {
        return Ok(index);
    }
    match key.trim().parse::<usize>() {
        Ok(n) if (1..=staff.len()).contains(&n) => Ok(n - 1),
        _ => Err(anyhow!(CoreError::NotFound(format!(
            "No staff member '{}'. Roster: {}",
            key,
            staff.join(", ")
        )))),
    }
}
