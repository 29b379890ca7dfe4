use std::collections::HashMap;

use serde::Serialize;

use crate::codec::{display_date, display_time};
use crate::model::{Booking, Room};

/// Read-only aggregations over the full room and booking collections.
///
/// Grouping order is the first-occurrence order of the distinct key in the
/// underlying collection; rooms are indexed by id up front so the whole
/// pass is O(rooms + bookings).

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookedRoomEntry {
    #[serde(rename = "Room Name")]
    pub room_name: String,
    // Triple-o spelling is wire contract.
    #[serde(rename = "Boooked Details")]
    pub details: Vec<BookedDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookedDetail {
    #[serde(rename = "Booked Status")]
    pub status: &'static str,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerEntry {
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Booking Details")]
    pub details: Vec<CustomerDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetail {
    #[serde(rename = "Booking Date")]
    pub booking_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Room Name")]
    pub room_name: String,
}

#[derive(Debug)]
pub enum ViewError {
    /// A booking references a room id with no matching room. Surfaced as a
    /// hard failure rather than emitting a malformed row.
    RoomMissing { room_id: String },
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::RoomMissing { room_id } => {
                write!(f, "booking references unknown room id {room_id:?}")
            }
        }
    }
}

impl std::error::Error for ViewError {}

/// Every distinct room name, with the bookings recorded against that name's
/// room id. When two rooms share a name, the later room's id wins the
/// name → id mapping (preserved behavior).
pub fn booked_rooms(rooms: &[Room], bookings: &[Booking]) -> Vec<BookedRoomEntry> {
    let mut distinct_names: Vec<&str> = Vec::new();
    let mut name_to_id: HashMap<&str, &str> = HashMap::new();
    for room in rooms {
        if !name_to_id.contains_key(room.name.as_str()) {
            distinct_names.push(&room.name);
        }
        name_to_id.insert(&room.name, &room.id);
    }

    let mut by_room_id: HashMap<&str, Vec<&Booking>> = HashMap::new();
    for b in bookings {
        by_room_id.entry(&b.room_id).or_default().push(b);
    }

    distinct_names
        .into_iter()
        .map(|name| {
            let id = name_to_id[name];
            let details = by_room_id
                .get(id)
                .map(|group| {
                    group
                        .iter()
                        .map(|b| BookedDetail {
                            status: "Booked",
                            customer_name: b.customer_name.clone(),
                            date: display_date(b.booking_date),
                            start_time: display_time(b.start),
                            end_time: display_time(b.end),
                        })
                        .collect()
                })
                .unwrap_or_default();
            BookedRoomEntry {
                room_name: name.to_string(),
                details,
            }
        })
        .collect()
}

/// Every distinct customer name, with that customer's bookings and the
/// booked room's name. Errors if any booking's room id has no room.
pub fn customers(rooms: &[Room], bookings: &[Booking]) -> Result<Vec<CustomerEntry>, ViewError> {
    // First room wins on duplicate ids.
    let mut room_by_id: HashMap<&str, &Room> = HashMap::new();
    for room in rooms {
        room_by_id.entry(&room.id).or_insert(room);
    }

    let mut distinct: Vec<&str> = Vec::new();
    let mut by_customer: HashMap<&str, Vec<&Booking>> = HashMap::new();
    for b in bookings {
        let group = by_customer.entry(&b.customer_name).or_default();
        if group.is_empty() {
            distinct.push(&b.customer_name);
        }
        group.push(b);
    }

    let mut entries = Vec::with_capacity(distinct.len());
    for name in distinct {
        let mut details = Vec::new();
        for b in &by_customer[name] {
            let room = room_by_id
                .get(b.room_id.as_str())
                .ok_or_else(|| ViewError::RoomMissing {
                    room_id: b.room_id.clone(),
                })?;
            details.push(CustomerDetail {
                booking_date: display_date(b.booking_date),
                start_time: display_time(b.start),
                end_time: display_time(b.end),
                room_name: room.name.clone(),
            });
        }
        entries.push(CustomerEntry {
            customer_name: name.to_string(),
            details,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ms;
    use chrono::TimeZone;
    use serde_json::Map;
    use ulid::Ulid;

    fn room(id: &str, name: &str) -> Room {
        Room {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }

    fn booking(room_id: &str, customer: &str, start: Ms, end: Ms) -> Booking {
        Booking {
            id: Ulid::new(),
            room_id: room_id.into(),
            customer_name: customer.into(),
            booking_date: start,
            start,
            end,
            extra: Map::new(),
        }
    }

    fn ts(h: u32, m: u32) -> Ms {
        chrono::Local
            .with_ymd_and_hms(2024, 1, 1, h, m, 0)
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn booked_rooms_groups_in_first_seen_name_order() {
        let rooms = vec![room("R2", "Annex"), room("R1", "Boardroom")];
        let bookings = vec![
            booking("R1", "Ada", ts(10, 0), ts(11, 0)),
            booking("R2", "Grace", ts(9, 0), ts(10, 0)),
            booking("R1", "Grace", ts(12, 0), ts(13, 0)),
        ];

        let view = booked_rooms(&rooms, &bookings);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].room_name, "Annex");
        assert_eq!(view[1].room_name, "Boardroom");
        assert_eq!(view[0].details.len(), 1);
        assert_eq!(view[1].details.len(), 2);
        assert_eq!(view[1].details[0].customer_name, "Ada");
        assert_eq!(view[1].details[0].status, "Booked");
        assert_eq!(view[1].details[0].start_time, "10:0:0");
        assert_eq!(view[1].details[0].date, "1/0/2024");
    }

    #[test]
    fn booked_rooms_duplicate_name_later_id_wins() {
        let rooms = vec![room("R1", "Boardroom"), room("R9", "Boardroom")];
        let bookings = vec![
            booking("R1", "Ada", ts(10, 0), ts(11, 0)),
            booking("R9", "Grace", ts(12, 0), ts(13, 0)),
        ];
        let view = booked_rooms(&rooms, &bookings);
        assert_eq!(view.len(), 1);
        // name maps to the later room's id, so only R9's booking shows
        assert_eq!(view[0].details.len(), 1);
        assert_eq!(view[0].details[0].customer_name, "Grace");
    }

    #[test]
    fn booked_rooms_room_without_bookings_is_listed_empty() {
        let rooms = vec![room("R1", "Boardroom")];
        let view = booked_rooms(&rooms, &[]);
        assert_eq!(view.len(), 1);
        assert!(view[0].details.is_empty());
    }

    #[test]
    fn customers_groups_in_first_seen_order() {
        let rooms = vec![room("R1", "Boardroom"), room("R2", "Annex")];
        let bookings = vec![
            booking("R1", "Grace", ts(9, 0), ts(10, 0)),
            booking("R2", "Ada", ts(10, 0), ts(11, 0)),
            booking("R2", "Grace", ts(14, 0), ts(15, 0)),
        ];

        let view = customers(&rooms, &bookings).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].customer_name, "Grace");
        assert_eq!(view[1].customer_name, "Ada");
        assert_eq!(view[0].details.len(), 2);
        assert_eq!(view[0].details[0].room_name, "Boardroom");
        assert_eq!(view[0].details[1].room_name, "Annex");
        assert_eq!(view[0].details[0].booking_date, "1/0/2024");
    }

    #[test]
    fn customers_fails_loudly_on_dangling_room_id() {
        let rooms = vec![room("R1", "Boardroom")];
        let bookings = vec![booking("R9", "Ada", ts(10, 0), ts(11, 0))];
        let err = customers(&rooms, &bookings).unwrap_err();
        assert!(matches!(err, ViewError::RoomMissing { ref room_id } if room_id == "R9"));
    }

    #[test]
    fn wire_field_names_are_verbatim() {
        let rooms = vec![room("R1", "Boardroom")];
        let bookings = vec![booking("R1", "Ada", ts(10, 0), ts(11, 0))];

        let v = serde_json::to_value(booked_rooms(&rooms, &bookings)).unwrap();
        assert!(v[0].get("Boooked Details").is_some());
        assert_eq!(v[0]["Boooked Details"][0]["Booked Status"], "Booked");

        let c = serde_json::to_value(customers(&rooms, &bookings).unwrap()).unwrap();
        assert!(c[0].get("Booking Details").is_some());
        assert_eq!(c[0]["Booking Details"][0]["Room Name"], "Boardroom");
    }
}
