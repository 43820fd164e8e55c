//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{applications, deployments, environments, instances, stream_cursors};

/// Database row for an environment.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = environments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EnvironmentRow {
    pub id: i32,
    pub name: String,
    pub sort_order: i32,
}

/// Database row for an environment (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = environments)]
pub struct NewEnvironmentRow<'a> {
    pub name: &'a str,
    pub sort_order: i32,
}

/// Database row for an application.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApplicationRow {
    pub id: i32,
    pub name: String,
    pub sort_order: i32,
}

/// Database row for an application (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = applications)]
pub struct NewApplicationRow<'a> {
    pub name: &'a str,
    pub sort_order: i32,
}

/// Database row for an instance (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = instances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstanceRow {
    pub id: i32,
    pub environment_id: i32,
    pub application_id: i32,
    pub name: String,
    pub deployment_name: Option<String>,
}

/// Database row for an instance (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = instances)]
pub struct NewInstanceRow<'a> {
    pub environment_id: i32,
    pub application_id: i32,
    pub name: &'a str,
    pub deployment_name: Option<&'a str>,
}

/// Database row for a deployment registration.
#[derive(Queryable, QueryableByName, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = deployments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeploymentRow {
    pub id: String,
    pub instance_id: i32,
    pub version: String,
    pub deployed_at: String,
}

/// Database row for a stream cursor.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = stream_cursors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CursorRow {
    pub source: String,
    pub last_index: i64,
    pub updated_at: String,
}
