use crate::model::{Booking, Span};
use crate::store::{Store, StoreError};

/// Outcome of checking a candidate interval against a room's bookings.
///
/// "Room not found" is its own outcome: callers must not read it as either
/// free or busy. The booking path turns it into a rejection with a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Clear,
    RoomNotFound,
    Conflict(Vec<Booking>),
}

/// All bookings for `room_id` whose interval intersects `candidate` under
/// closed-endpoint semantics (back-to-back bookings sharing a boundary
/// instant conflict).
///
/// The booking rules were originally audited as four explicit clauses:
/// existing contains candidate, candidate contains existing, existing
/// overlaps the candidate's start, existing overlaps the candidate's end.
/// Together those reduce to the single test in `Span::overlaps`; the
/// equivalence is checked exhaustively in the tests below.
pub fn conflicting_bookings(room_id: &str, candidate: &Span, existing: &[Booking]) -> Vec<Booking> {
    existing
        .iter()
        .filter(|b| b.room_id == room_id && b.span().overlaps(candidate))
        .cloned()
        .collect()
}

/// Check whether `candidate` can be booked on `room_id`.
pub async fn is_available(
    store: &dyn Store,
    room_id: &str,
    candidate: &Span,
) -> Result<Availability, StoreError> {
    if store.find_room(room_id).await?.is_none() {
        return Ok(Availability::RoomNotFound);
    }
    let existing = store.bookings_for_room(room_id).await?;
    let conflicts = conflicting_bookings(room_id, candidate, &existing);
    if conflicts.is_empty() {
        Ok(Availability::Clear)
    } else {
        Ok(Availability::Conflict(conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ms;
    use crate::store::MemStore;
    use serde_json::Map;
    use ulid::Ulid;

    const H: Ms = 3_600_000;

    fn booking(room_id: &str, start: Ms, end: Ms) -> Booking {
        Booking {
            id: Ulid::new(),
            room_id: room_id.into(),
            customer_name: "Ada".into(),
            booking_date: start,
            start,
            end,
            extra: Map::new(),
        }
    }

    /// The four-clause formulation the rules are audited against.
    fn four_clause_conflict(s: Ms, e: Ms, cand_s: Ms, cand_e: Ms) -> bool {
        (s <= cand_s && e >= cand_e)    // existing fully contains candidate
            || (s >= cand_s && e <= cand_e) // candidate fully contains existing
            || (s <= cand_s && e >= cand_s) // existing overlaps candidate's start
            || (s <= cand_e && e >= cand_e) // existing overlaps candidate's end
    }

    #[test]
    fn four_clauses_equal_single_predicate() {
        // Sweep all interval pairs over a small grid; every (s, e, S, E)
        // combination with s <= e and S <= E must agree with s <= E && e >= S.
        let points: Vec<Ms> = (0..=6).collect();
        for &s in &points {
            for &e in &points {
                if s > e {
                    continue;
                }
                for &cs in &points {
                    for &ce in &points {
                        if cs > ce {
                            continue;
                        }
                        let single = Span::new(s, e).overlaps(&Span::new(cs, ce));
                        let four = four_clause_conflict(s, e, cs, ce);
                        assert_eq!(
                            single, four,
                            "disagreement for existing [{s},{e}] vs candidate [{cs},{ce}]"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn containment_both_directions_conflict() {
        let existing = [booking("R1", 9 * H, 12 * H)];
        // candidate inside existing
        assert_eq!(
            conflicting_bookings("R1", &Span::new(10 * H, 11 * H), &existing).len(),
            1
        );
        // candidate around existing
        assert_eq!(
            conflicting_bookings("R1", &Span::new(8 * H, 13 * H), &existing).len(),
            1
        );
    }

    #[test]
    fn touching_boundaries_conflict() {
        let existing = [booking("R1", 10 * H, 11 * H)];
        // candidate starts exactly where existing ends
        assert_eq!(
            conflicting_bookings("R1", &Span::new(11 * H, 12 * H), &existing).len(),
            1
        );
        // candidate ends exactly where existing starts
        assert_eq!(
            conflicting_bookings("R1", &Span::new(9 * H, 10 * H), &existing).len(),
            1
        );
        // one millisecond of daylight on either side is clear
        assert!(conflicting_bookings("R1", &Span::new(11 * H + 1, 12 * H), &existing).is_empty());
        assert!(conflicting_bookings("R1", &Span::new(9 * H, 10 * H - 1), &existing).is_empty());
    }

    #[test]
    fn other_rooms_do_not_conflict() {
        let existing = [booking("R2", 10 * H, 11 * H)];
        assert!(conflicting_bookings("R1", &Span::new(10 * H, 11 * H), &existing).is_empty());
    }

    #[test]
    fn all_conflicts_are_reported() {
        let existing = [
            booking("R1", 9 * H, 10 * H),
            booking("R1", 10 * H + 1, 11 * H),
            booking("R1", 20 * H, 21 * H),
        ];
        let hits = conflicting_bookings("R1", &Span::new(9 * H + 1, 11 * H), &existing);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].start, 9 * H);
        assert_eq!(hits[1].start, 10 * H + 1);
    }

    #[tokio::test]
    async fn missing_room_is_distinct_from_free_room() {
        let store = MemStore::new();
        assert_eq!(
            is_available(&store, "R1", &Span::new(0, H)).await.unwrap(),
            Availability::RoomNotFound
        );

        store
            .insert_room(crate::model::Room {
                id: "R1".into(),
                name: "Boardroom".into(),
                extra: Map::new(),
            })
            .await
            .unwrap();
        assert_eq!(
            is_available(&store, "R1", &Span::new(0, H)).await.unwrap(),
            Availability::Clear
        );
    }

    #[tokio::test]
    async fn conflict_carries_the_existing_bookings() {
        let store = MemStore::new();
        store
            .insert_room(crate::model::Room {
                id: "R1".into(),
                name: "Boardroom".into(),
                extra: Map::new(),
            })
            .await
            .unwrap();
        let existing = booking("R1", 10 * H, 11 * H);
        store.insert_booking(existing.clone()).await.unwrap();

        match is_available(&store, "R1", &Span::new(10 * H + 30, 10 * H + 60))
            .await
            .unwrap()
        {
            Availability::Conflict(hits) => assert_eq!(hits, vec![existing]),
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}
