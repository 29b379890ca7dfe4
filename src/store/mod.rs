mod log;

pub use log::DocLog;

use std::io;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::model::{Booking, Room};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Collection-level gateway over the `room` and `bookings` collections.
///
/// Handlers and the booking orchestrator hold this as an injected
/// `Arc<dyn Store>`; tests swap in [`MemStore`]. Implementations must
/// preserve insertion order — the reporting views derive their grouping
/// order from it.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn insert_room(&self, room: Room) -> Result<(), StoreError>;
    async fn insert_rooms(&self, rooms: Vec<Room>) -> Result<usize, StoreError>;
    async fn rooms(&self) -> Result<Vec<Room>, StoreError>;
    /// All rooms whose `id` field string-equals `id`. Duplicate ids are the
    /// caller's problem; every match is returned.
    async fn rooms_by_id(&self, id: &str) -> Result<Vec<Room>, StoreError>;
    /// First room matching `id`, if any.
    async fn find_room(&self, id: &str) -> Result<Option<Room>, StoreError>;
    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError>;
    async fn bookings(&self) -> Result<Vec<Booking>, StoreError>;
    async fn bookings_for_room(&self, room_id: &str) -> Result<Vec<Booking>, StoreError>;
}

// ── In-memory store ──────────────────────────────────────────────

/// Order-preserving in-memory store. Backs [`FileStore`] and the tests.
#[derive(Default)]
pub struct MemStore {
    rooms: RwLock<Vec<Room>>,
    bookings: RwLock<Vec<Booking>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_parts(rooms: Vec<Room>, bookings: Vec<Booking>) -> Self {
        Self {
            rooms: RwLock::new(rooms),
            bookings: RwLock::new(bookings),
        }
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_room(&self, room: Room) -> Result<(), StoreError> {
        self.rooms.write().await.push(room);
        Ok(())
    }

    async fn insert_rooms(&self, rooms: Vec<Room>) -> Result<usize, StoreError> {
        let n = rooms.len();
        self.rooms.write().await.extend(rooms);
        Ok(n)
    }

    async fn rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.rooms.read().await.clone())
    }

    async fn rooms_by_id(&self, id: &str) -> Result<Vec<Room>, StoreError> {
        Ok(self
            .rooms
            .read()
            .await
            .iter()
            .filter(|r| r.id == id)
            .cloned()
            .collect())
    }

    async fn find_room(&self, id: &str) -> Result<Option<Room>, StoreError> {
        Ok(self.rooms.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.write().await.push(booking);
        Ok(())
    }

    async fn bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.bookings.read().await.clone())
    }

    async fn bookings_for_room(&self, room_id: &str) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.room_id == room_id)
            .cloned()
            .collect())
    }
}

// ── File-backed store ────────────────────────────────────────────

/// One record per inserted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum DocRecord {
    Room(Room),
    Booking(Booking),
}

/// [`MemStore`] fronted by an append-only [`DocLog`]. Every insert is
/// appended (and fsynced) before it becomes visible in memory; opening
/// replays the log to rebuild state.
pub struct FileStore {
    mem: MemStore,
    log: Mutex<DocLog>,
}

impl FileStore {
    /// Open the store at `path`, replaying any existing log.
    /// Failure here is fatal to startup — the process must not serve
    /// requests against a store it could not open.
    pub fn open(path: &Path) -> io::Result<Self> {
        let records: Vec<DocRecord> = DocLog::replay(path)?;
        let mut rooms = Vec::new();
        let mut bookings = Vec::new();
        for record in records {
            match record {
                DocRecord::Room(r) => rooms.push(r),
                DocRecord::Booking(b) => bookings.push(b),
            }
        }
        tracing::info!(
            rooms = rooms.len(),
            bookings = bookings.len(),
            path = %path.display(),
            "document store opened"
        );
        metrics::counter!(crate::observability::DOCS_REPLAYED_TOTAL)
            .increment((rooms.len() + bookings.len()) as u64);
        let log = DocLog::open(path)?;
        Ok(Self {
            mem: MemStore::from_parts(rooms, bookings),
            log: Mutex::new(log),
        })
    }

    async fn append(&self, record: &DocRecord) -> Result<(), StoreError> {
        self.log.lock().await.append(record)?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    async fn insert_room(&self, room: Room) -> Result<(), StoreError> {
        self.append(&DocRecord::Room(room.clone())).await?;
        self.mem.insert_room(room).await
    }

    async fn insert_rooms(&self, rooms: Vec<Room>) -> Result<usize, StoreError> {
        {
            let mut log = self.log.lock().await;
            for room in &rooms {
                log.append(&DocRecord::Room(room.clone()))?;
            }
        }
        self.mem.insert_rooms(rooms).await
    }

    async fn rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.mem.rooms().await
    }

    async fn rooms_by_id(&self, id: &str) -> Result<Vec<Room>, StoreError> {
        self.mem.rooms_by_id(id).await
    }

    async fn find_room(&self, id: &str) -> Result<Option<Room>, StoreError> {
        self.mem.find_room(id).await
    }

    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.append(&DocRecord::Booking(booking.clone())).await?;
        self.mem.insert_booking(booking).await
    }

    async fn bookings(&self) -> Result<Vec<Booking>, StoreError> {
        self.mem.bookings().await
    }

    async fn bookings_for_room(&self, room_id: &str) -> Result<Vec<Booking>, StoreError> {
        self.mem.bookings_for_room(room_id).await
    }
}
