use crate::schema::stations;
use crate::schema::users;
use crate::schema::sql_types::UserRoleType;
use anyhow::bail;
use anyhow::Result;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::AsExpression;
use diesel::FromSqlRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = UserRoleType)]
pub enum UserRole {
    SuperAdmin,
    Owner,
    Manager,
    Employee,
}

impl From<UserRole> for fuelops_commons::Role {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::SuperAdmin => fuelops_commons::Role::SuperAdmin,
            UserRole::Owner => fuelops_commons::Role::Owner,
            UserRole::Manager => fuelops_commons::Role::Manager,
            UserRole::Employee => fuelops_commons::Role::Employee,
        }
    }
}

impl From<fuelops_commons::Role> for UserRole {
    fn from(value: fuelops_commons::Role) -> Self {
        match value {
            fuelops_commons::Role::SuperAdmin => UserRole::SuperAdmin,
            fuelops_commons::Role::Owner => UserRole::Owner,
            fuelops_commons::Role::Manager => UserRole::Manager,
            fuelops_commons::Role::Employee => UserRole::Employee,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub station_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub previous_plan_id: Option<Uuid>,
    pub plan_changed_at: Option<OffsetDateTime>,
    pub created_by: Option<Uuid>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub station_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

impl User {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_user: NewUser) -> QueryResult<User> {
        diesel::insert_into(users::table)
            .values(new_user)
            .get_result(conn)
    }

    #[autometrics]
    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<User>> {
        users::table.find(id).first::<User>(conn).optional()
    }

    pub fn by_email(conn: &mut PgConnection, email: &str) -> QueryResult<Option<User>> {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    }

    pub fn list_for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<Vec<User>> {
        users::table
            .filter(users::station_id.eq(station_id))
            .order(users::created_at.asc())
            .load(conn)
    }

    /// Active managers assigned to a station, used to seed shift-collection
    /// handovers.
    pub fn managers_for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<Vec<User>> {
        users::table
            .filter(users::station_id.eq(station_id))
            .filter(users::role.eq(UserRole::Manager))
            .filter(users::is_active.eq(true))
            .order(users::created_at.asc())
            .load(conn)
    }

    pub fn list_created_by(conn: &mut PgConnection, creator: Uuid) -> QueryResult<Vec<User>> {
        users::table
            .filter(users::created_by.eq(creator))
            .order(users::created_at.asc())
            .load(conn)
    }

    /// Employees and managers across all of an owner's stations, for the
    /// plan ceiling check.
    pub fn count_staff_for_owner(conn: &mut PgConnection, owner_id: Uuid) -> QueryResult<i64> {
        users::table
            .inner_join(stations::table.on(stations::id.nullable().eq(users::station_id)))
            .filter(stations::owner_id.eq(owner_id))
            .filter(users::is_active.eq(true))
            .count()
            .get_result(conn)
    }

    pub fn set_active(conn: &mut PgConnection, id: Uuid, active: bool) -> Result<()> {
        let affected = diesel::update(users::table.find(id))
            .set(users::is_active.eq(active))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not set active = {active} for user {id}")
        }

        Ok(())
    }

    pub fn update_password(conn: &mut PgConnection, id: Uuid, password_hash: &str) -> Result<()> {
        let affected = diesel::update(users::table.find(id))
            .set(users::password_hash.eq(password_hash))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not update password for user {id}")
        }

        Ok(())
    }

    /// Moves an owner to another plan, remembering the previous one so the
    /// quota engine can honor the downgrade grace window.
    pub fn change_plan(conn: &mut PgConnection, id: Uuid, plan_id: Uuid) -> Result<()> {
        let user = users::table.find(id).first::<User>(conn)?;

        let affected = diesel::update(users::table.find(id))
            .set((
                users::plan_id.eq(plan_id),
                users::previous_plan_id.eq(user.plan_id),
                users::plan_changed_at.eq(OffsetDateTime::now_utc()),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not change plan for user {id}")
        }

        Ok(())
    }
}
