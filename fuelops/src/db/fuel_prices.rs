use crate::schema::fuel_prices;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use rust_decimal::Decimal;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Queryable, Debug, Clone)]
pub struct FuelPrice {
    pub id: Uuid,
    pub station_id: Uuid,
    pub fuel_type: String,
    pub selling_price: Decimal,
    pub cost_price: Option<Decimal>,
    pub effective_from: Date,
    pub created_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = fuel_prices)]
pub struct NewFuelPrice {
    pub id: Uuid,
    pub station_id: Uuid,
    pub fuel_type: String,
    pub selling_price: Decimal,
    pub cost_price: Option<Decimal>,
    pub effective_from: Date,
    pub created_by: Option<Uuid>,
}

impl FuelPrice {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_price: NewFuelPrice) -> QueryResult<FuelPrice> {
        diesel::insert_into(fuel_prices::table)
            .values(new_price)
            .get_result(conn)
    }

    /// The price in force for a fuel on a given date: the newest
    /// `effective_from` that is not after the date.
    #[autometrics]
    pub fn effective(
        conn: &mut PgConnection,
        station_id: Uuid,
        fuel_type: &str,
        on: Date,
    ) -> QueryResult<Option<FuelPrice>> {
        fuel_prices::table
            .filter(fuel_prices::station_id.eq(station_id))
            .filter(fuel_prices::fuel_type.eq(fuel_type))
            .filter(fuel_prices::effective_from.le(on))
            .order(fuel_prices::effective_from.desc())
            .first::<FuelPrice>(conn)
            .optional()
    }

    pub fn history(
        conn: &mut PgConnection,
        station_id: Uuid,
        fuel_type: Option<&str>,
    ) -> QueryResult<Vec<FuelPrice>> {
        let mut query = fuel_prices::table
            .filter(fuel_prices::station_id.eq(station_id))
            .into_boxed();

        if let Some(fuel_type) = fuel_type {
            query = query.filter(fuel_prices::fuel_type.eq(fuel_type.to_string()));
        }

        query
            .order((
                fuel_prices::fuel_type.asc(),
                fuel_prices::effective_from.desc(),
            ))
            .load(conn)
    }
}
