use crate::error::CoreError;
use crate::recurrence::DateRange;
use crate::repository::JsonRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

#[async_trait]
impl super::HolidayRepository for JsonRepository {
    async fn find_holidays(&self, range: Option<DateRange>) -> Result<Vec<NaiveDate>, CoreError> {
        let doc = self.load_document().await?;
        Ok(doc
            .holidays
            .into_iter()
            .filter(|d| range.map_or(true, |r| r.contains(*d)))
            .collect())
    }

    async fn add_holiday(&self, date: NaiveDate) -> Result<bool, CoreError> {
        self.update(move |doc| {
            let added = doc.holidays.insert(date);
            if added {
                info!(date = %date, "Added holiday");
            }
            Ok(added)
        })
        .await
    }

    async fn remove_holiday(&self, date: NaiveDate) -> Result<bool, CoreError> {
        self.update(move |doc| {
            let removed = doc.holidays.remove(&date);
            if removed {
                info!(date = %date, "Removed holiday");
            }
            Ok(removed)
        })
        .await
    }
}
