//! Team repository contract and SQLite implementation.
//!
//! # Invariants
//! - Teams never cache their members; `list_member_ids` always queries
//!   `members.team_uuid`.
//! - Deleting a team detaches its members (`ON DELETE SET NULL`).

use crate::model::member::MemberId;
use crate::model::team::{Team, TeamId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::member_repo::parse_uuid;
use log::debug;
use rusqlite::{params, Connection, Row};

const TEAM_SELECT_SQL: &str = "SELECT uuid, name, created_at, updated_at FROM teams";

/// Repository interface for team CRUD and membership lookups.
pub trait TeamRepository {
    /// Inserts or renames by id and returns the stored row.
    fn save(&self, team: &Team) -> RepoResult<Team>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn find_all(&self) -> RepoResult<Vec<Team>>;
    fn delete(&self, id: TeamId) -> RepoResult<()>;
    /// Ids of members whose `team_id` points at `id`, in insertion order.
    fn list_member_ids(&self, id: TeamId) -> RepoResult<Vec<MemberId>>;
}

/// SQLite-backed team repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteTeamStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TeamRepository for SqliteTeamStore<'_> {
    fn save(&self, team: &Team) -> RepoResult<Team> {
        team.validate()?;

        self.conn.execute(
            "INSERT INTO teams (uuid, name, created_at, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000), (strftime('%s', 'now') * 1000))
             ON CONFLICT (uuid) DO UPDATE SET
                name = excluded.name,
                updated_at = excluded.updated_at;",
            params![team.id.to_string(), team.name.as_str()],
        )?;
        debug!("event=team_save module=repo status=ok");

        self.find_by_id(team.id)?.ok_or(RepoError::NotFound {
            entity: "team",
            id: team.id,
        })
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEAM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_team_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEAM_SELECT_SQL} ORDER BY name ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        Ok(teams)
    }

    fn delete(&self, id: TeamId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM teams WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "team", id });
        }
        Ok(())
    }

    fn list_member_ids(&self, id: TeamId) -> RepoResult<Vec<MemberId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid FROM members WHERE team_uuid = ?1 ORDER BY rowid ASC;")?;
        let uuids = stmt
            .query_map([id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        uuids
            .iter()
            .map(|value| parse_uuid(value, "members.uuid"))
            .collect()
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let uuid_text: String = row.get("uuid")?;
    parse_team_columns(
        &uuid_text,
        row.get("name")?,
        row.get("created_at")?,
        row.get("updated_at")?,
    )
}

/// Builds a `Team` from raw columns; shared with member join queries.
pub(crate) fn parse_team_columns(
    uuid_text: &str,
    name: String,
    created_at: i64,
    updated_at: i64,
) -> RepoResult<Team> {
    Ok(Team {
        id: parse_uuid(uuid_text, "teams.uuid")?,
        name,
        created_at,
        updated_at,
    })
}
