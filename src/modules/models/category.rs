use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::categories;

#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub display_order: i32,
    pub group_id: Option<i32>,
    pub active: bool,
    /// award id on the race server, assigned on the first push
    pub award_id: Option<i32>,
    pub override_winner_car_id: Option<i32>,
    pub override_reason: Option<String>,
    pub overridden_at: Option<NaiveDateTime>,
}

/// an administrator chosen winner replacing the vote tally of a category
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct ManualOverride {
    pub car_id: i32,
    pub reason: String,
    pub overridden_at: NaiveDateTime,
}

impl Category {
    /// # get the manual override
    /// the override only counts when all three override columns are set
    pub fn manual_override(&self) -> Option<ManualOverride> {
        match (&self.override_winner_car_id, &self.override_reason, &self.overridden_at) {
            (Some(car_id), Some(reason), Some(at)) => Some(ManualOverride {
                car_id: *car_id,
                reason: reason.clone(),
                overridden_at: *at,
            }),
            _ => None,
        }
    }

    /********** GETTERS **********/
    /// # get all categories
    /// ordered by display order, categories sharing an order are sorted by id
    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<Category>> {
        use crate::schema::categories::dsl::{categories, display_order, id};

        categories
            .order((display_order, id))
            .load::<Category>(conn)
    }

    /// # get category from id
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `id_in` - the id of the category
    pub fn get_by_id(conn: &mut PgConnection, id_in: i32) -> QueryResult<Category> {
        use crate::schema::categories::dsl::categories;

        categories.find(id_in).first::<Category>(conn)
    }

    /********** MODIFIERS **********/
    /// # set the override
    /// writes all three override columns in one statement
    ///
    /// ## Returns
    /// * `usize` - the number of updated rows, 0 when the category does not exist
    pub fn set_override(conn: &mut PgConnection, id_in: i32, manual: &ManualOverride) -> QueryResult<usize> {
        use crate::schema::categories::dsl::*;

        diesel::update(categories.find(id_in))
            .set((
                override_winner_car_id.eq(Some(manual.car_id)),
                override_reason.eq(Some(manual.reason.clone())),
                overridden_at.eq(Some(manual.overridden_at)),
            ))
            .execute(conn)
    }

    /// # clear the override
    /// resets all three override columns in one statement
    pub fn clear_override(conn: &mut PgConnection, id_in: i32) -> QueryResult<usize> {
        use crate::schema::categories::dsl::*;

        diesel::update(categories.find(id_in))
            .set((
                override_winner_car_id.eq(None::<i32>),
                override_reason.eq(None::<String>),
                overridden_at.eq(None::<NaiveDateTime>),
            ))
            .execute(conn)
    }

    /// # set the award id
    /// remember the id the race server gave the award of this category
    pub fn set_award_id(conn: &mut PgConnection, id_in: i32, award_id_in: i32) -> QueryResult<usize> {
        use crate::schema::categories::dsl::*;

        diesel::update(categories.find(id_in))
            .set(award_id.eq(Some(award_id_in)))
            .execute(conn)
    }
}
