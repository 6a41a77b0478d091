use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use validator::{Validate, ValidationErrors};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use health_pulse_data::repository::{Document, DocumentFilter, DocumentStore, RepositoryError, SortDirection};

use crate::entities::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
use crate::entities::health_score::DailyHealthScore;
use crate::entities::insight::{BloodPressureAnalysis, ChartSeries};
use crate::entities::medication::{CreateMedicationEventRequest, MedicationEvent};
use crate::entities::mood::{CreateMoodEntryRequest, MoodEntry};
use crate::services::health_score::calculate_health_score;
use crate::services::insights::analyze_readings;

pub const READINGS_COLLECTION: &str = "readings";
pub const MOODS_COLLECTION: &str = "moods";
pub const MEDICATION_EVENTS_COLLECTION: &str = "medicationEvents";
pub const HEALTH_SCORES_COLLECTION: &str = "healthScores";

/// Earlier readings pulled in when classifying a new one
const ANALYSIS_HISTORY: usize = 2;

/// Record service errors
#[derive(Debug, Error)]
pub enum RecordServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Result of recording a blood pressure reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadingOutcome {
    pub reading: BloodPressureReading,
    pub analysis: BloodPressureAnalysis,
    /// Store id, or `None` when the reading could not be saved
    pub persisted_id: Option<String>,
}

/// Stores readings, moods and medication events and derives scores from them
pub struct HealthRecordService {
    store: Arc<dyn DocumentStore>,
}

impl HealthRecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Classify a new reading against the owner's earlier ones and save it
    ///
    /// A failed save is logged and reported as `persisted_id: None`; the
    /// classification is returned either way.
    #[instrument(skip(self, request), fields(owner_id = %request.owner_id))]
    pub async fn record_reading(
        &self,
        request: CreateBloodPressureRequest,
    ) -> Result<ReadingOutcome, RecordServiceError> {
        request
            .validate()
            .map_err(|e| RecordServiceError::ValidationError(validation_message(&e)))?;

        let mut reading = BloodPressureReading {
            id: String::new(),
            owner_id: request.owner_id,
            systolic: request.systolic,
            diastolic: request.diastolic,
            pulse: request.pulse,
            mood: request.mood,
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
        };

        let history = match self.readings_before(&reading.owner_id, reading.timestamp).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Could not load reading history, classifying without it: {}", e);
                Vec::new()
            }
        };

        let mut readings = Vec::with_capacity(history.len() + 1);
        readings.push(reading.clone());
        readings.extend(history);

        let analysis = analyze_readings(&readings)
            .ok_or_else(|| RecordServiceError::ValidationError("No reading to analyze".to_string()))?;

        let persisted_id = match self.save_reading(&reading, &analysis).await {
            Ok(id) => {
                reading.id = id.clone();
                Some(id)
            }
            Err(e) => {
                error!("Failed to save blood pressure reading: {}", e);
                None
            }
        };

        debug!(
            status = %analysis.status,
            insights = analysis.insights.len(),
            "Recorded blood pressure reading"
        );

        Ok(ReadingOutcome {
            reading,
            analysis,
            persisted_id,
        })
    }

    /// The owner's most recent readings, newest first
    pub async fn recent_readings(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<BloodPressureReading>, RecordServiceError> {
        let filter = DocumentFilter::new()
            .where_eq("ownerId", owner_id)
            .order_by("timestamp", SortDirection::Descending)
            .limit(limit);
        let documents = self.store.query(READINGS_COLLECTION, &filter).await?;
        Ok(decode_documents(documents, |reading: &mut BloodPressureReading, id| {
            reading.id = id
        }))
    }

    /// Log a mood entry
    pub async fn record_mood(&self, request: CreateMoodEntryRequest) -> Result<MoodEntry, RecordServiceError> {
        request
            .validate()
            .map_err(|e| RecordServiceError::ValidationError(validation_message(&e)))?;

        let mut entry = MoodEntry {
            id: String::new(),
            owner_id: request.owner_id,
            mood: request.mood.trim().to_string(),
            notes: request.notes,
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
        };
        if entry.mood().is_none() {
            warn!(mood = %entry.mood, "Unrecognized mood label, it will score 0");
        }

        entry.id = self.store.add(MOODS_COLLECTION, document_body(&entry)?).await?;
        Ok(entry)
    }

    /// Log a medication event
    pub async fn record_medication_event(
        &self,
        request: CreateMedicationEventRequest,
    ) -> Result<MedicationEvent, RecordServiceError> {
        request
            .validate()
            .map_err(|e| RecordServiceError::ValidationError(validation_message(&e)))?;

        let mut event = MedicationEvent {
            id: String::new(),
            owner_id: request.owner_id,
            medication: request.medication,
            status: request.status,
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
        };

        event.id = self
            .store
            .add(MEDICATION_EVENTS_COLLECTION, document_body(&event)?)
            .await?;
        Ok(event)
    }

    /// Score the `window_days` days ending on `date` (UTC) and cache it
    ///
    /// The cached copy is keyed by owner and date; a failed cache write is
    /// only logged.
    #[instrument(skip(self))]
    pub async fn health_score(
        &self,
        owner_id: &str,
        date: NaiveDate,
        window_days: u32,
    ) -> Result<DailyHealthScore, RecordServiceError> {
        let (from, to) = score_window(date, window_days);

        let readings: Vec<BloodPressureReading> =
            self.query_window(READINGS_COLLECTION, owner_id, from, to).await?;
        let moods: Vec<MoodEntry> = self.query_window(MOODS_COLLECTION, owner_id, from, to).await?;
        let events: Vec<MedicationEvent> = self
            .query_window(MEDICATION_EVENTS_COLLECTION, owner_id, from, to)
            .await?;

        let daily = DailyHealthScore {
            owner_id: owner_id.to_string(),
            date,
            score: calculate_health_score(&readings, &moods, &events),
        };

        if let Err(e) = self.cache_score(&daily).await {
            warn!("Failed to cache health score: {}", e);
        }

        Ok(daily)
    }

    /// The owner's last `limit` readings as chart series, oldest first
    pub async fn chart_series(&self, owner_id: &str, limit: usize) -> Result<ChartSeries, RecordServiceError> {
        let mut readings = self.recent_readings(owner_id, limit).await?;
        readings.reverse();
        Ok(chart_series_from(&readings))
    }

    async fn readings_before(
        &self,
        owner_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<BloodPressureReading>, RecordServiceError> {
        let filter = DocumentFilter::new()
            .where_eq("ownerId", owner_id)
            .where_lt("timestamp", timestamp_value(before)?)
            .order_by("timestamp", SortDirection::Descending)
            .limit(ANALYSIS_HISTORY);
        let documents = self.store.query(READINGS_COLLECTION, &filter).await?;
        Ok(decode_documents(documents, |reading: &mut BloodPressureReading, id| {
            reading.id = id
        }))
    }

    async fn save_reading(
        &self,
        reading: &BloodPressureReading,
        analysis: &BloodPressureAnalysis,
    ) -> Result<String, RecordServiceError> {
        let mut body = document_body(reading)?;
        if let Value::Object(map) = &mut body {
            map.insert("status".to_string(), Value::String(analysis.status.label().to_string()));
            map.insert("severity".to_string(), serde_json::to_value(analysis.severity).map_err(RepositoryError::from)?);
        }
        Ok(self.store.add(READINGS_COLLECTION, body).await?)
    }

    async fn query_window<T: DeserializeOwned + HasId>(
        &self,
        collection: &str,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<T>, RecordServiceError> {
        let filter = DocumentFilter::new()
            .where_eq("ownerId", owner_id)
            .where_gte("timestamp", timestamp_value(from)?)
            .where_lt("timestamp", timestamp_value(to)?);
        let documents = self.store.query(collection, &filter).await?;
        Ok(decode_documents(documents, |record: &mut T, id| record.set_id(id)))
    }

    async fn cache_score(&self, daily: &DailyHealthScore) -> Result<(), RecordServiceError> {
        let body = serde_json::to_value(daily).map_err(RepositoryError::from)?;
        let filter = DocumentFilter::new()
            .where_eq("ownerId", daily.owner_id.as_str())
            .where_eq("date", daily.date.to_string())
            .limit(1);

        match self.store.query(HEALTH_SCORES_COLLECTION, &filter).await?.first() {
            Some(existing) => self.store.update(HEALTH_SCORES_COLLECTION, &existing.id, body).await?,
            None => {
                self.store.add(HEALTH_SCORES_COLLECTION, body).await?;
            }
        }
        Ok(())
    }
}

/// Records whose id comes from the document store
trait HasId {
    fn set_id(&mut self, id: String);
}

impl HasId for BloodPressureReading {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl HasId for MoodEntry {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl HasId for MedicationEvent {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Serialize a record as a document body, leaving out its id
fn document_body<T: Serialize>(record: &T) -> Result<Value, RecordServiceError> {
    let mut body = serde_json::to_value(record).map_err(RepositoryError::from)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

/// Decode documents, skipping (and logging) any that no longer parse
fn decode_documents<T, F>(documents: Vec<Document>, mut assign_id: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: FnMut(&mut T, String),
{
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<T>(doc.data) {
            Ok(mut record) => {
                assign_id(&mut record, doc.id);
                Some(record)
            }
            Err(e) => {
                warn!(collection = %doc.collection, id = %doc.id, "Skipping malformed document: {}", e);
                None
            }
        })
        .collect()
}

/// Serialized like a stored reading's timestamp; filters compare by instant
fn timestamp_value(time: DateTime<Utc>) -> Result<Value, RecordServiceError> {
    serde_json::to_value(time).map_err(|e| RepositoryError::from(e).into())
}

/// `[start of first day, start of the day after date)` in UTC
fn score_window(date: NaiveDate, window_days: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let days = i64::from(window_days.max(1));
    let end = (date + Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc();
    (end - Duration::days(days), end)
}

/// Build chart series from chronologically ordered readings
pub fn chart_series_from(readings: &[BloodPressureReading]) -> ChartSeries {
    ChartSeries {
        labels: readings
            .iter()
            .map(|r| r.timestamp.format("%b %d %H:%M").to_string())
            .collect(),
        systolic: readings.iter().map(|r| r.systolic).collect(),
        diastolic: readings.iter().map(|r| r.diastolic).collect(),
        pulse: readings.iter().map(|r| r.pulse).collect(),
    }
}

/// Flatten validator errors into `field: message; field: message`
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let details: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, details.join(", "))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::blood_pressure::{BloodPressureCategory, Severity};
    use crate::entities::insight::InsightKind;
    use crate::entities::medication::MedicationEventStatus;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use health_pulse_data::repository::InMemoryDocumentStore;

    fn service() -> (HealthRecordService, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (HealthRecordService::new(store.clone()), store)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn reading_request(systolic: u16, diastolic: u16, timestamp: DateTime<Utc>) -> CreateBloodPressureRequest {
        CreateBloodPressureRequest {
            owner_id: "alice".to_string(),
            systolic,
            diastolic,
            pulse: Some(70),
            mood: None,
            timestamp: Some(timestamp),
        }
    }

    /// Store whose writes always fail
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn add(&self, _collection: &str, _data: Value) -> Result<String, RepositoryError> {
            Err(RepositoryError::Unavailable("disk full".to_string()))
        }

        async fn query(&self, _collection: &str, _filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError> {
            Err(RepositoryError::Unavailable("disk full".to_string()))
        }

        async fn update(&self, _collection: &str, _id: &str, _patch: Value) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("disk full".to_string()))
        }

        async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>, RepositoryError> {
            Err(RepositoryError::Unavailable("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_record_reading_classifies_and_persists() {
        let (service, store) = service();
        let outcome = service.record_reading(reading_request(145, 92, at(7, 8))).await.unwrap();

        assert_eq!(outcome.analysis.status, BloodPressureCategory::Hypertension2);
        assert_eq!(outcome.analysis.severity, Severity::High);
        let id = outcome.persisted_id.clone().unwrap();
        assert_eq!(outcome.reading.id, id);

        let stored = store.get(READINGS_COLLECTION, &id).await.unwrap().unwrap();
        assert_eq!(stored.data["status"], "Stage 2 Hypertension");
        assert_eq!(stored.data["severity"], "high");
        assert!(stored.data.get("id").is_none());
    }

    #[tokio::test]
    async fn test_record_reading_uses_earlier_history() {
        let (service, _) = service();
        service.record_reading(reading_request(130, 80, at(5, 8))).await.unwrap();
        service.record_reading(reading_request(145, 85, at(6, 8))).await.unwrap();
        let outcome = service.record_reading(reading_request(160, 90, at(7, 8))).await.unwrap();

        let kinds: Vec<InsightKind> = outcome.analysis.insights.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsightKind::TrendingUp]);
    }

    #[tokio::test]
    async fn test_record_reading_ignores_later_readings() {
        let (service, _) = service();
        service.record_reading(reading_request(180, 110, at(9, 8))).await.unwrap();
        let outcome = service.record_reading(reading_request(118, 75, at(7, 8))).await.unwrap();

        assert_eq!(outcome.analysis.status, BloodPressureCategory::Normal);
        assert!(outcome.analysis.insights.is_empty());
    }

    #[tokio::test]
    async fn test_record_reading_rejects_out_of_range() {
        let (service, _) = service();
        let err = service.record_reading(reading_request(20, 80, at(7, 8))).await.unwrap_err();
        match err {
            RecordServiceError::ValidationError(msg) => assert!(msg.contains("Systolic")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_record_reading_survives_broken_store() {
        let service = HealthRecordService::new(Arc::new(BrokenStore));
        let outcome = service.record_reading(reading_request(185, 95, at(7, 8))).await.unwrap();

        assert_eq!(outcome.analysis.status, BloodPressureCategory::HypertensiveCrisis);
        assert_eq!(outcome.persisted_id, None);
        assert!(outcome.reading.id.is_empty());
    }

    #[tokio::test]
    async fn test_sub_second_readings_keep_their_order() {
        let (service, _) = service();
        let half_second_later = at(7, 8) + Duration::milliseconds(500);
        service.record_reading(reading_request(170, 70, half_second_later)).await.unwrap();

        let outcome = service.record_reading(reading_request(110, 70, at(7, 8))).await.unwrap();
        assert!(outcome.analysis.insights.is_empty());

        let recent = service.recent_readings("alice", 10).await.unwrap();
        let stamps: Vec<DateTime<Utc>> = recent.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![half_second_later, at(7, 8)]);
    }

    #[tokio::test]
    async fn test_recent_readings_newest_first_and_scoped() {
        let (service, _) = service();
        for day in [3, 5, 4] {
            service.record_reading(reading_request(120, 78, at(day, 8))).await.unwrap();
        }
        let mut other = reading_request(150, 95, at(6, 8));
        other.owner_id = "bob".to_string();
        service.record_reading(other).await.unwrap();

        let recent = service.recent_readings("alice", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, at(5, 8));
        assert_eq!(recent[1].timestamp, at(4, 8));
        assert!(recent.iter().all(|r| !r.id.is_empty()));
    }

    #[tokio::test]
    async fn test_health_score_over_window_is_cached() {
        let (service, store) = service();
        service.record_reading(reading_request(115, 75, at(7, 8))).await.unwrap();
        service.record_reading(reading_request(150, 95, at(7, 20))).await.unwrap();
        // Outside a one-day window
        service.record_reading(reading_request(150, 95, at(6, 8))).await.unwrap();

        service
            .record_mood(CreateMoodEntryRequest {
                owner_id: "alice".to_string(),
                mood: "Good".to_string(),
                notes: None,
                timestamp: Some(at(7, 9)),
            })
            .await
            .unwrap();
        service
            .record_medication_event(CreateMedicationEventRequest {
                owner_id: "alice".to_string(),
                medication: "Lisinopril".to_string(),
                status: MedicationEventStatus::Taken,
                timestamp: Some(at(7, 9)),
            })
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let daily = service.health_score("alice", date, 1).await.unwrap();
        assert_eq!(daily.score.samples.readings, 2);
        assert_eq!(daily.score.components.blood_pressure, 50);
        assert_eq!(daily.score.components.mood, 80);
        assert_eq!(daily.score.components.medication, 100);
        assert_eq!(daily.score.overall, 77);

        // Recomputing replaces the cached copy
        service.health_score("alice", date, 2).await.unwrap();
        let cached = store
            .query(HEALTH_SCORES_COLLECTION, &DocumentFilter::new().where_eq("ownerId", "alice"))
            .await
            .unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].data["date"], "2024-05-07");
        assert_eq!(cached[0].data["samples"]["readings"], 3);
    }

    #[tokio::test]
    async fn test_health_score_without_data() {
        let (service, _) = service();
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let daily = service.health_score("nobody", date, 7).await.unwrap();
        assert_eq!(daily.score.overall, 0);
        assert!(!daily.score.has_data());
    }

    #[tokio::test]
    async fn test_record_mood_rejects_empty_label() {
        let (service, _) = service();
        let result = service
            .record_mood(CreateMoodEntryRequest {
                owner_id: "alice".to_string(),
                mood: String::new(),
                notes: None,
                timestamp: None,
            })
            .await;
        assert!(matches!(result, Err(RecordServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_chart_series_oldest_first() {
        let (service, _) = service();
        service.record_reading(reading_request(125, 82, at(6, 8))).await.unwrap();
        let mut request = reading_request(118, 76, at(7, 8));
        request.pulse = None;
        service.record_reading(request).await.unwrap();

        let chart = service.chart_series("alice", 10).await.unwrap();
        assert_eq!(chart.labels, vec!["May 06 08:00", "May 07 08:00"]);
        assert_eq!(chart.systolic, vec![125, 118]);
        assert_eq!(chart.diastolic, vec![82, 76]);
        assert_eq!(chart.pulse, vec![Some(70), None]);
    }

    #[test]
    fn test_score_window_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(score_window(date, 7), (at(1, 0), at(8, 0)));
        assert_eq!(score_window(date, 0), (at(7, 0), at(8, 0)));
    }
}
