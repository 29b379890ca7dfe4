use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::availability::{self, Availability};
use crate::codec::{self, CodecError};
use crate::model::{Booking, Ms, Span};
use crate::store::{Store, StoreError};

/// Raw `/book` payload: a date string shared by both times-of-day.
/// Unknown fields ride along into the stored booking document.
#[derive(Debug, Clone, Deserialize)]
pub struct BookRequest {
    #[serde(rename = "Room Id")]
    pub room_id: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Booking Date")]
    pub booking_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A [`BookRequest`] with date + times resolved to absolute timestamps.
#[derive(Debug, Clone, Copy)]
struct ResolvedTimes {
    booking_date: Ms,
    start: Ms,
    end: Ms,
}

/// Terminal state of one booking attempt. Rejections are ordinary outcomes
/// (200-class payloads), not errors; only storage failures surface as `Err`
/// from [`Orchestrator::book`].
#[derive(Debug, Clone, PartialEq)]
pub enum BookOutcome {
    /// Start strictly after end. Equal start/end passes this stage.
    StartAfterEnd,
    RoomNotFound,
    Conflict(Vec<Booking>),
    Booked(Booking),
}

/// Drives one booking request through
/// Received → Validated → CheckedAvailability → {Persisted | Rejected}.
///
/// Holds a per-room async mutex across the availability read and the
/// booking write, so two concurrent requests for the same room cannot both
/// pass the check. Different rooms never contend. Single attempt per
/// request; no retry, no rollback.
pub struct Orchestrator {
    store: Arc<dyn Store>,
    room_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            room_locks: DashMap::new(),
        }
    }

    fn room_lock(&self, room_id: &str) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn resolve_times(req: &BookRequest) -> Result<ResolvedTimes, CodecError> {
        let date = codec::parse_date(&req.booking_date)?;
        let start = codec::local_ms(date, codec::parse_time(&req.start_time)?)?;
        let end = codec::local_ms(date, codec::parse_time(&req.end_time)?)?;
        let booking_date = codec::local_midnight_ms(date)?;
        Ok(ResolvedTimes {
            booking_date,
            start,
            end,
        })
    }

    /// Run one booking attempt end to end.
    ///
    /// `Err(Malformed)` is a boundary rejection (unparsable date/time);
    /// `Err(Store)` is a storage failure. Everything else is a
    /// [`BookOutcome`].
    pub async fn book(&self, req: BookRequest) -> Result<BookOutcome, BookError> {
        let times = Self::resolve_times(&req).map_err(BookError::Malformed)?;

        // Strictly greater: a zero-length interval is not rejected here.
        if times.start > times.end {
            return Ok(BookOutcome::StartAfterEnd);
        }

        let lock = self.room_lock(&req.room_id);
        let _serialized = lock.lock().await;

        let candidate = Span::new(times.start, times.end);
        match availability::is_available(self.store.as_ref(), &req.room_id, &candidate).await? {
            Availability::RoomNotFound => Ok(BookOutcome::RoomNotFound),
            Availability::Conflict(existing) => Ok(BookOutcome::Conflict(existing)),
            Availability::Clear => {
                let booking = Booking {
                    id: Ulid::new(),
                    room_id: req.room_id,
                    customer_name: req.customer_name,
                    booking_date: times.booking_date,
                    start: times.start,
                    end: times.end,
                    extra: req.extra,
                };
                self.store.insert_booking(booking.clone()).await?;
                tracing::info!(
                    booking = %booking.id,
                    room = %booking.room_id,
                    "booking persisted"
                );
                Ok(BookOutcome::Booked(booking))
            }
        }
    }
}

#[derive(Debug)]
pub enum BookError {
    Malformed(CodecError),
    Store(StoreError),
}

impl std::fmt::Display for BookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookError::Malformed(e) => write!(f, "malformed booking request: {e}"),
            BookError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BookError {}

impl From<StoreError> for BookError {
    fn from(e: StoreError) -> Self {
        BookError::Store(e)
    }
}
