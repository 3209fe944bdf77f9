use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::schema::settings;

pub const VOTING_OPEN_KEY: &str = "voting_open";

#[derive(Queryable, Insertable, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = settings)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Setting {
    /// # read a boolean setting
    /// a missing row reads as `false`
    pub fn get_bool(conn: &mut PgConnection, key_in: &str) -> QueryResult<bool> {
        use crate::schema::settings::dsl::*;

        let stored = settings
            .filter(key.eq(key_in))
            .select(value)
            .first::<String>(conn)
            .optional()?;

        Ok(matches!(stored.as_deref(), Some("true") | Some("1")))
    }

    /// # write a boolean setting
    /// inserts the row when it does not exist yet
    pub fn set_bool(conn: &mut PgConnection, key_in: &str, value_in: bool) -> QueryResult<usize> {
        use crate::schema::settings::dsl::*;

        let row = Setting {
            key: key_in.to_string(),
            value: value_in.to_string(),
        };

        diesel::insert_into(settings)
            .values(&row)
            .on_conflict(key)
            .do_update()
            .set(value.eq(value_in.to_string()))
            .execute(conn)
    }
}
