use chrono::NaiveDate;

use crate::constants::CONFIRM_DELETE_TRIP;
use crate::error::ClientResult;
use crate::models::{Trip, TripId};
use crate::ports::TripStore;
use crate::utils::require_confirmation;

/// The user's trips as shown in the trip list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripList {
    trips: Vec<Trip>,
}

impl TripList {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub async fn load(store: &dyn TripStore) -> ClientResult<Self> {
        let trips = store
            .list_trips()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch trips"))?;
        Ok(Self::new(trips))
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn get(&self, trip_id: TripId) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == trip_id)
    }

    /// Insert a created trip, or replace the entry with the same id.
    pub fn upsert(&mut self, trip: Trip) {
        if !self.replace(trip.clone()) {
            self.trips.push(trip);
        }
    }

    /// Replace by id; returns `false` when no trip has that id.
    pub fn replace(&mut self, trip: Trip) -> bool {
        match self.trips.iter_mut().find(|t| t.id == trip.id) {
            Some(slot) => {
                *slot = trip;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, trip_id: TripId) -> Option<Trip> {
        let index = self.trips.iter().position(|t| t.id == trip_id)?;
        Some(self.trips.remove(index))
    }

    /// Trips starting today or later, for the home page.
    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Trip> {
        self.trips.iter().filter(|t| t.start_date >= today).collect()
    }

    /// Trips in progress today; the only ones expenses can be logged against.
    pub fn ongoing(&self, today: NaiveDate) -> Vec<&Trip> {
        self.trips
            .iter()
            .filter(|t| t.start_date <= today && t.end_date >= today)
            .collect()
    }

    /// Delete a trip after explicit confirmation. The local list only
    /// changes once the backend accepted the delete.
    pub async fn delete(
        &mut self,
        store: &dyn TripStore,
        trip_id: TripId,
        confirmed: bool,
    ) -> ClientResult<Option<Trip>> {
        require_confirmation(confirmed, CONFIRM_DELETE_TRIP)?;
        store
            .delete_trip(trip_id)
            .await
            .inspect_err(|e| tracing::warn!(trip_id, error = %e, "failed to delete trip"))?;
        Ok(self.remove(trip_id))
    }
}
