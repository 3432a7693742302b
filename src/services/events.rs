use std::sync::Arc;

use tracing::{debug, info};

use crate::models::EventPayload;
use crate::services::mapper::EventMapping;
use crate::services::validation::validate;
use crate::store::EventStore;
use crate::utils::{AppError, AppResult, ZoneId};

/// Event CRUD. Each method is one store transaction; nothing is retried.
pub struct EventService {
    store: Arc<dyn EventStore>,
    mapper: Arc<dyn EventMapping>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, mapper: Arc<dyn EventMapping>) -> Self {
        Self { store, mapper }
    }

    pub async fn create(&self, input: &EventPayload, zone: &ZoneId) -> AppResult<EventPayload> {
        validate(input)?;
        let new_event = self
            .mapper
            .to_entity(Some(input), zone)?
            .ok_or_else(|| unmapped("event input"))?;

        let mut tx = self.store.begin().await?;
        let saved = tx.insert(new_event).await?;
        tx.commit().await?;

        info!(id = saved.id, zone = %zone, "Created event");
        self.mapper
            .to_output(Some(&saved), zone)?
            .ok_or_else(|| unmapped("stored event"))
    }

    pub async fn list(&self, zone: &ZoneId) -> AppResult<Vec<EventPayload>> {
        let mut tx = self.store.begin().await?;
        let entities = tx.find_all().await?;
        tx.commit().await?;

        debug!(count = entities.len(), zone = %zone, "Listed events");
        entities
            .iter()
            .filter_map(|entity| self.mapper.to_output(Some(entity), zone).transpose())
            .collect()
    }

    pub async fn get_by_id(&self, id: i64, zone: &ZoneId) -> AppResult<EventPayload> {
        let mut tx = self.store.begin().await?;
        let entity = tx.find_by_id(id).await?.ok_or(AppError::NotFound(id))?;
        tx.commit().await?;

        self.mapper
            .to_output(Some(&entity), zone)?
            .ok_or_else(|| unmapped("stored event"))
    }

    /// The stored event is untouched unless `input` passes validation.
    pub async fn update(
        &self,
        id: i64,
        input: &EventPayload,
        zone: &ZoneId,
    ) -> AppResult<EventPayload> {
        let mut tx = self.store.begin().await?;
        let mut entity = tx.find_by_id(id).await?.ok_or(AppError::NotFound(id))?;

        validate(input)?;
        self.mapper.apply_update(input, zone, &mut entity)?;

        let saved = tx.save(&entity).await?;
        tx.commit().await?;

        info!(id, zone = %zone, "Updated event");
        self.mapper
            .to_output(Some(&saved), zone)?
            .ok_or_else(|| unmapped("stored event"))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        tx.find_by_id(id).await?.ok_or(AppError::NotFound(id))?;
        tx.delete(id).await?;
        tx.commit().await?;

        info!(id, "Deleted event");
        Ok(())
    }
}

fn unmapped(what: &str) -> AppError {
    AppError::InternalServerError(format!("mapper returned nothing for {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use crate::models::{EventEntity, NewEvent};
    use crate::services::mapper::EventMapper;
    use crate::store::InMemoryEventStore;
    use crate::utils::local_datetime::parse;

    #[derive(Default)]
    struct CountingMapper {
        inner: EventMapper,
        calls: AtomicUsize,
    }

    impl CountingMapper {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EventMapping for CountingMapper {
        fn to_entity(
            &self,
            input: Option<&EventPayload>,
            zone: &ZoneId,
        ) -> AppResult<Option<NewEvent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.to_entity(input, zone)
        }

        fn to_output(
            &self,
            entity: Option<&EventEntity>,
            zone: &ZoneId,
        ) -> AppResult<Option<EventPayload>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.to_output(entity, zone)
        }

        fn apply_update(
            &self,
            input: &EventPayload,
            zone: &ZoneId,
            existing: &mut EventEntity,
        ) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.apply_update(input, zone, existing)
        }
    }

    struct Fixture {
        store: InMemoryEventStore,
        mapper: Arc<CountingMapper>,
        service: EventService,
    }

    fn fixture() -> Fixture {
        let store = InMemoryEventStore::new();
        let mapper = Arc::new(CountingMapper::default());
        let service = EventService::new(Arc::new(store.clone()), mapper.clone());
        Fixture {
            store,
            mapper,
            service,
        }
    }

    fn standup() -> EventPayload {
        EventPayload {
            title: Some("Standup".into()),
            start_date_time: Some(parse("2024-06-01T09:00").unwrap()),
            end_date_time: Some(parse("2024-06-01T09:30").unwrap()),
            ..Default::default()
        }
    }

    fn new_york() -> ZoneId {
        ZoneId::parse("America/New_York").unwrap()
    }

    #[tokio::test]
    async fn test_create_stores_instant_and_reads_back_in_other_zone() {
        let f = fixture();
        let created = f.service.create(&standup(), &ZoneId::UTC).await.unwrap();
        let id = created.id.unwrap();

        let stored = f.store.snapshot().await;
        assert_eq!(
            stored[0].start_instant,
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
        );

        let fetched = f.service.get_by_id(id, &new_york()).await.unwrap();
        assert_eq!(fetched.start_date_time, Some(parse("2024-06-01T05:00").unwrap()));
        assert_eq!(fetched.end_date_time, Some(parse("2024-06-01T05:30").unwrap()));
    }

    #[tokio::test]
    async fn test_create_rejects_end_before_start() {
        let f = fixture();
        let input = EventPayload {
            start_date_time: Some(parse("2024-06-01T10:00").unwrap()),
            end_date_time: Some(parse("2024-06-01T09:00").unwrap()),
            ..standup()
        };

        match f.service.create(&input, &ZoneId::UTC).await {
            Err(AppError::ValidationError(errors)) => assert!(errors.contains_key("event")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(f.store.is_empty().await);
        assert_eq!(f.mapper.calls(), 0);
    }

    #[tokio::test]
    async fn test_far_future_event_is_rejected_before_storage() {
        let f = fixture();
        f.service.create(&standup(), &ZoneId::UTC).await.unwrap();
        let far_future = EventPayload {
            start_date_time: Some(parse("+262142-12-31T22:00").unwrap()),
            end_date_time: Some(parse("+262142-12-31T23:00").unwrap()),
            ..standup()
        };

        match f.service.create(&far_future, &ZoneId::UTC).await {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.contains_key("startDateTime"));
                assert!(errors.contains_key("endDateTime"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let tokyo = ZoneId::parse("Asia/Tokyo").unwrap();
        assert_eq!(f.service.list(&tokyo).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_empty_store_does_no_mapping() {
        let f = fixture();
        let events = f.service.list(&ZoneId::UTC).await.unwrap();
        assert!(events.is_empty());
        assert_eq!(f.mapper.calls(), 0);
    }

    #[tokio::test]
    async fn test_list_preserves_store_order() {
        let f = fixture();
        for title in ["Planning", "Standup", "Retro"] {
            let input = EventPayload {
                title: Some(title.into()),
                ..standup()
            };
            f.service.create(&input, &ZoneId::UTC).await.unwrap();
        }

        let titles: Vec<_> = f
            .service
            .list(&new_york())
            .await
            .unwrap()
            .into_iter()
            .filter_map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Planning", "Standup", "Retro"]);
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_everywhere() {
        let f = fixture();
        f.service.create(&standup(), &ZoneId::UTC).await.unwrap();
        let before = f.store.snapshot().await;

        assert!(matches!(
            f.service.get_by_id(999, &ZoneId::UTC).await,
            Err(AppError::NotFound(999))
        ));
        assert!(matches!(
            f.service.update(999, &standup(), &ZoneId::UTC).await,
            Err(AppError::NotFound(999))
        ));
        assert!(matches!(
            f.service.delete(999).await,
            Err(AppError::NotFound(999))
        ));

        assert_eq!(f.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields_and_keeps_identity() {
        let f = fixture();
        let created = f.service.create(&standup(), &ZoneId::UTC).await.unwrap();
        let id = created.id.unwrap();
        let original = f.store.snapshot().await.remove(0);

        let change = EventPayload {
            title: Some("Standup (moved)".into()),
            location: Some(" Room 2 ".into()),
            start_date_time: Some(parse("2024-06-01T10:00").unwrap()),
            end_date_time: Some(parse("2024-06-01T10:15").unwrap()),
            ..Default::default()
        };
        let updated = f.service.update(id, &change, &new_york()).await.unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.title.as_deref(), Some("Standup (moved)"));
        assert_eq!(updated.location.as_deref(), Some("Room 2"));
        assert_eq!(updated.start_date_time, change.start_date_time);

        let stored = f.store.snapshot().await.remove(0);
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(
            stored.start_instant,
            Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_failed_update_leaves_event_untouched() {
        let f = fixture();
        let id = f
            .service
            .create(&standup(), &ZoneId::UTC)
            .await
            .unwrap()
            .id
            .unwrap();
        let before = f.store.snapshot().await;

        let invalid = EventPayload {
            title: Some(" ".into()),
            ..standup()
        };
        assert!(matches!(
            f.service.update(id, &invalid, &ZoneId::UTC).await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(f.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_delete_removes_event() {
        let f = fixture();
        let id = f
            .service
            .create(&standup(), &ZoneId::UTC)
            .await
            .unwrap()
            .id
            .unwrap();

        f.service.delete(id).await.unwrap();

        assert!(f.store.is_empty().await);
        assert!(matches!(
            f.service.get_by_id(id, &ZoneId::UTC).await,
            Err(AppError::NotFound(_))
        ));
    }
}
