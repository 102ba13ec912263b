use crate::error::CoreError;
use crate::models::YearMonth;
use crate::repository::JsonRepository;
use crate::shift::ShiftMonth;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

#[async_trait]
impl super::ShiftRepository for JsonRepository {
    async fn load_shift_month(&self, month: YearMonth) -> Result<Option<ShiftMonth>, CoreError> {
        let mut doc = self.load_document().await?;
        Ok(doc.shifts.remove(&month))
    }

    async fn save_shift_month(&self, month: YearMonth, mut shifts: ShiftMonth) -> Result<ShiftMonth, CoreError> {
        shifts.updated_at = Some(Utc::now());
        self.update(move |doc| {
            info!(month = %month, cells = shifts.shifts.len(), "Saved shift month");
            doc.shifts.insert(month, shifts.clone());
            Ok(shifts)
        })
        .await
    }

    async fn clear_shift_month(&self, month: YearMonth) -> Result<bool, CoreError> {
        self.update(move |doc| {
            let existed = doc.shifts.remove(&month).is_some();
            if existed {
                info!(month = %month, "Cleared shift month");
            }
            Ok(existed)
        })
        .await
    }
}
