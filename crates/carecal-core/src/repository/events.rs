use crate::error::CoreError;
use crate::models::{DeleteScope, EditScope, Event, NewEventData, OccurrenceRef, YearMonth};
use crate::recurrence::{occurrences, DateRange, Occurrence};
use crate::repository::{matches_prefix, JsonRepository, OccurrenceFilter};
use crate::series::{build_events, delete_occurrence, edit_occurrence, Catalog};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

#[async_trait]
impl super::EventRepository for JsonRepository {
    async fn add_event(&self, data: NewEventData) -> Result<Vec<Event>, CoreError> {
        self.update(move |doc| {
            let catalog = Catalog::new(&doc.schedule_types, &doc.clients);
            let created = build_events(&data, &catalog, YearMonth::of(data.date))?;
            doc.events.extend(created.iter().cloned());
            info!(count = created.len(), category = %data.category, "Added event");
            Ok(created)
        })
        .await
    }

    async fn find_events(&self) -> Result<Vec<Event>, CoreError> {
        let mut events = self.load_document().await?.events;
        events.sort_by_key(|e| e.time_span.date());
        Ok(events)
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, CoreError> {
        let doc = self.load_document().await?;
        Ok(doc.events.into_iter().find(|e| e.id == id))
    }

    async fn find_events_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Event>, CoreError> {
        let doc = self.load_document().await?;
        Ok(doc
            .events
            .into_iter()
            .filter(|e| matches_prefix(&e.id, short_id))
            .collect())
    }

    async fn update_event(&self, target: OccurrenceRef, data: NewEventData, scope: EditScope) -> Result<bool, CoreError> {
        data.validate()?;
        let today = self.today();
        self.update(move |doc| {
            let catalog = Catalog::new(&doc.schedule_types, &doc.clients);
            let before = doc.events.clone();
            let after = edit_occurrence(std::mem::take(&mut doc.events), &target, &data, &catalog, scope, today)?;
            let changed = after != before;
            doc.events = after;
            if changed {
                info!(scope = %scope, title = %target.title, date = %target.date, "Edited event");
            } else {
                debug!(title = %target.title, "Edit matched nothing");
            }
            Ok(changed)
        })
        .await
    }

    async fn delete_event(&self, target: OccurrenceRef, scope: DeleteScope) -> Result<bool, CoreError> {
        self.update(move |doc| {
            let before = doc.events.clone();
            doc.events = delete_occurrence(std::mem::take(&mut doc.events), &target, scope);
            let changed = doc.events != before;
            if changed {
                info!(scope = %scope, title = %target.title, date = %target.date, "Deleted event");
            }
            Ok(changed)
        })
        .await
    }

    async fn find_occurrences(&self, range: DateRange, filter: OccurrenceFilter) -> Result<Vec<Occurrence>, CoreError> {
        let doc = self.load_document().await?;
        let caseload: Option<(Uuid, HashSet<Uuid>)> = filter.manager.map(|manager_id| {
            let clients = doc
                .clients
                .iter()
                .filter(|c| c.care_manager_id == Some(manager_id))
                .map(|c| c.id)
                .collect();
            (manager_id, clients)
        });

        let mut found: Vec<Occurrence> = occurrences(&doc.events, range)
            .filter(|o| match &caseload {
                Some((manager_id, clients)) => {
                    o.owner_id == Some(*manager_id) || o.subject_id.map_or(false, |id| clients.contains(&id))
                }
                None => true,
            })
            .filter(|o| filter.client.map_or(true, |client_id| o.subject_id == Some(client_id)))
            .collect();
        found.sort_by(|a, b| {
            a.date()
                .cmp(&b.date())
                .then_with(|| b.time_span.is_all_day().cmp(&a.time_span.is_all_day()))
                .then_with(|| a.time_span.start_time().cmp(&b.time_span.start_time()))
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(found)
    }
}
