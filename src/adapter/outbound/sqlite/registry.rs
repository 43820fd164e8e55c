//! SQLite target registry implementation.
//!
//! Stores environments, applications, deployment targets (instances) and the
//! version registrations written against them.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    ApplicationRow, DeploymentRow, EnvironmentRow, InstanceRow, NewApplicationRow,
    NewEnvironmentRow, NewInstanceRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    applications, deployments, environments, instances,
};
use crate::domain::{
    Application, DeploymentName, DeploymentRecord, DeploymentTarget, Environment, Instance,
    NewInstance, Registration, TargetId,
};
use crate::error::{Error, Result};
use crate::port::outbound::registry::TargetRegistry;

/// SQLite-backed target registry.
///
/// Implements the [`TargetRegistry`] trait and the management operations
/// used by the command line.
#[derive(Clone)]
pub struct SqliteTargetRegistry {
    /// Database connection pool.
    pool: DbPool,
}

/// Most recent registration per instance. Registrations with the same
/// timestamp are ordered by insertion.
const LATEST_DEPLOYMENTS: &str = "\
    SELECT d.id, d.instance_id, d.version, d.deployed_at \
    FROM deployments d \
    WHERE d.rowid = ( \
        SELECT newest.rowid FROM deployments newest \
        WHERE newest.instance_id = d.instance_id \
        ORDER BY newest.deployed_at DESC, newest.rowid DESC \
        LIMIT 1 \
    ) \
    ORDER BY d.instance_id";

/// Timestamps are stored as fixed-width RFC 3339 so text order is time order.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("invalid timestamp '{raw}': {e}")))
}

impl SqliteTargetRegistry {
    /// Create a new SQLite target registry with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Find an environment by name, creating it at the end of the ordering
    /// when missing.
    pub fn ensure_environment(&self, name: &str) -> Result<Environment> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("environment name is required".into()));
        }
        let mut conn = self.pool.get()?;

        let row = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            if let Some(row) = environments::table
                .filter(environments::name.eq(name))
                .select(EnvironmentRow::as_select())
                .first(conn)
                .optional()?
            {
                return Ok(row);
            }

            let last: Option<i32> = environments::table
                .select(diesel::dsl::max(environments::sort_order))
                .first(conn)?;
            diesel::insert_into(environments::table)
                .values(&NewEnvironmentRow {
                    name,
                    sort_order: last.unwrap_or(0) + 1,
                })
                .execute(conn)?;

            environments::table
                .filter(environments::name.eq(name))
                .select(EnvironmentRow::as_select())
                .first(conn)
        })?;

        Ok(Environment {
            id: row.id,
            name: row.name,
            order: row.sort_order,
        })
    }

    /// Find an application by name, creating it at the end of the ordering
    /// when missing.
    pub fn ensure_application(&self, name: &str) -> Result<Application> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("application name is required".into()));
        }
        let mut conn = self.pool.get()?;

        let row = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            if let Some(row) = applications::table
                .filter(applications::name.eq(name))
                .select(ApplicationRow::as_select())
                .first(conn)
                .optional()?
            {
                return Ok(row);
            }

            let last: Option<i32> = applications::table
                .select(diesel::dsl::max(applications::sort_order))
                .first(conn)?;
            diesel::insert_into(applications::table)
                .values(&NewApplicationRow {
                    name,
                    sort_order: last.unwrap_or(0) + 1,
                })
                .execute(conn)?;

            applications::table
                .filter(applications::name.eq(name))
                .select(ApplicationRow::as_select())
                .first(conn)
        })?;

        Ok(Application {
            id: row.id,
            name: row.name,
            order: row.sort_order,
        })
    }

    /// Create a deployment target.
    pub fn create_instance(&self, params: &NewInstance) -> Result<TargetId> {
        if params.environment_id == 0 {
            return Err(Error::Validation("environment id is required".into()));
        }
        if params.application_id == 0 {
            return Err(Error::Validation("application id is required".into()));
        }
        let name = params.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("name is required".into()));
        }

        let mut conn = self.pool.get()?;
        let id = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(instances::table)
                .values(&NewInstanceRow {
                    environment_id: params.environment_id,
                    application_id: params.application_id,
                    name,
                    deployment_name: params.deployment_name.as_ref().map(DeploymentName::as_str),
                })
                .execute(conn)?;

            instances::table
                .select(instances::id)
                .order(instances::id.desc())
                .first::<i32>(conn)
        })?;

        Ok(TargetId::new(id))
    }

    /// Link (or unlink, with `None`) an instance to a workload name.
    pub fn set_deployment_name(&self, id: TargetId, name: Option<&DeploymentName>) -> Result<()> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(instances::table.find(id.get()))
            .set(instances::deployment_name.eq(name.map(DeploymentName::as_str)))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(Error::Validation(format!("instance {id} not found")));
        }
        Ok(())
    }

    /// All instances with their environment and application names.
    pub fn list_instances(&self) -> Result<Vec<Instance>> {
        let mut conn = self.pool.get()?;
        let rows = instances::table
            .inner_join(environments::table)
            .inner_join(applications::table)
            .select((
                InstanceRow::as_select(),
                environments::name,
                applications::name,
            ))
            .order((environments::sort_order, applications::sort_order, instances::id))
            .load::<(InstanceRow, String, String)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(row, environment, application)| Instance {
                id: TargetId::new(row.id),
                environment_id: row.environment_id,
                environment,
                application_id: row.application_id,
                application,
                name: row.name,
                deployment_name: row.deployment_name.map(DeploymentName::new),
            })
            .collect())
    }

    /// Every registration, oldest first, in insertion order on ties.
    pub fn list_deployments(&self) -> Result<Vec<DeploymentRecord>> {
        let mut conn = self.pool.get()?;
        let rows = deployments::table
            .select(DeploymentRow::as_select())
            .order((
                deployments::deployed_at.asc(),
                sql::<BigInt>("deployments.rowid").asc(),
            ))
            .load(&mut conn)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    /// The most recent registration of each instance.
    pub fn latest_deployments(&self) -> Result<Vec<DeploymentRecord>> {
        let mut conn = self.pool.get()?;
        let rows = diesel::sql_query(LATEST_DEPLOYMENTS).load::<DeploymentRow>(&mut conn)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn from_row(row: DeploymentRow) -> Result<DeploymentRecord> {
        Ok(DeploymentRecord {
            deployed_at: parse_timestamp(&row.deployed_at)?,
            id: row.id,
            target_id: TargetId::new(row.instance_id),
            version: row.version,
        })
    }
}

impl TargetRegistry for SqliteTargetRegistry {
    async fn find_targets_by_deployment_name(
        &self,
        name: &DeploymentName,
    ) -> Result<Vec<DeploymentTarget>> {
        let mut conn = self.pool.get()?;
        let ids: Vec<i32> = instances::table
            .filter(instances::deployment_name.eq(name.as_str()))
            .select(instances::id)
            .order(instances::id.asc())
            .load(&mut conn)?;

        Ok(ids
            .into_iter()
            .map(|id| DeploymentTarget {
                id: TargetId::new(id),
                deployment_name: name.clone(),
            })
            .collect())
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        if registration.target_id.get() == 0 {
            return Err(Error::Validation("instance id is required".into()));
        }
        if registration.version.as_str().is_empty() {
            return Err(Error::Validation("version is required".into()));
        }

        let row = DeploymentRow {
            id: Uuid::new_v4().to_string(),
            instance_id: registration.target_id.get(),
            version: registration.version.to_string(),
            deployed_at: format_timestamp(registration.deployed_at.unwrap_or_else(Utc::now)),
        };

        let mut conn = self.pool.get()?;
        diesel::insert_into(deployments::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(())
    }
}
