use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Closed interval `[start, end]`.
///
/// Bookings share endpoints with their neighbours in the worst case, and a
/// shared instant counts as taken: `[9:00, 10:00]` and `[10:00, 11:00]`
/// overlap. `start == end` is a legal (degenerate) interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        Self { start, end }
    }

    /// Closed-endpoint intersection test.
    ///
    /// `self.start <= other.end && self.end >= other.start` is equivalent to
    /// the four-case breakdown the booking rules are audited against:
    ///   1. self contains other        (s <= S && e >= E)
    ///   2. other contains self        (s >= S && e <= E)
    ///   3. self overlaps other's start (s <= S && e >= S)
    ///   4. self overlaps other's end   (s <= E && e >= E)
    /// The equivalence is pinned down in the availability tests.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }
}

/// A bookable room. `id` is caller-assigned; the store does not enforce
/// uniqueness. Fields beyond `id` and the name ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(rename = "Room Name")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An accepted reservation of one room for a closed time interval.
/// Only the booking orchestrator constructs these, after the availability
/// check passes, so `start <= end` holds for every stored booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    #[serde(rename = "Room Id")]
    pub room_id: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Booking Date")]
    pub booking_date: Ms,
    #[serde(rename = "Start Time")]
    pub start: Ms,
    #[serde(rename = "End Time")]
    pub end: Ms,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}
