use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::cars;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq)]
#[diesel(table_name = cars)]
pub struct NewCar {
    pub racer_id: Option<i32>,
    pub car_number: i32,
    pub first_name: String,
    pub last_name: String,
    pub car_name: String,
    pub rank: String,
    pub eligible: bool,
}

#[derive(Queryable, Identifiable, AsChangeset, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = cars)]
#[diesel(treat_none_as_null = true)]
pub struct Car {
    pub id: i32,
    /// id of the racer on the race server, set once the car was imported or synced
    pub racer_id: Option<i32>,
    pub car_number: i32,
    pub first_name: String,
    pub last_name: String,
    pub car_name: String,
    pub rank: String,
    pub eligible: bool,
}

impl Car {
    /// # racer name
    /// first and last name of the racer driving this car
    pub fn racer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /********** INSERTERS **********/
    /// # insert a new car into the database
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `new_car` - the car to insert
    ///
    /// ## Returns
    /// * `Car` - the inserted car
    pub fn new(conn: &mut PgConnection, new_car: &NewCar) -> QueryResult<Car> {
        diesel::insert_into(cars::table)
            .values(new_car)
            .get_result(conn)
    }

    /// # save a car
    /// write all fields of the car back to its row
    pub fn update(&self, conn: &mut PgConnection) -> QueryResult<Car> {
        diesel::update(cars::table.find(self.id))
            .set(self)
            .get_result(conn)
    }

    /********** GETTERS **********/
    /// # get car from id
    /// the id is the database id and not the number on the car
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `id_in` - the id of the car
    pub fn get_by_id(conn: &mut PgConnection, id_in: i32) -> QueryResult<Car> {
        use crate::schema::cars::dsl::cars;

        cars.find(id_in).first::<Car>(conn)
    }

    /// # get all cars
    /// ordered by car number
    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<Car>> {
        use crate::schema::cars::dsl::{car_number, cars, id};

        cars.order((car_number, id)).load::<Car>(conn)
    }
}
