//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `members` table.
//! - Compile `MemberPredicate`/`MemberMutation` values into bound SQL.
//! - Serve as the `StorageBackend` for member paging.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before any SQL runs.
//! - Every list query ends with a `rowid` tiebreak, so paging over equal
//!   sort keys is deterministic (insertion order).
//! - Bulk updates are a single `UPDATE` statement.
//! - Relative age changes clamp to `[0, i32::MAX]`, so every stored age stays
//!   readable and passes `Member::validate()`.

use crate::model::member::{Member, MemberDto, MemberId, MemberWithTeam};
use crate::model::page::Sort;
use crate::model::query::{MemberMutation, MemberPredicate, MemberSortField};
use crate::repo::backend::StorageBackend;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::team_repo::parse_team_columns;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const MEMBER_COLUMNS_SQL: &str = "members.uuid AS uuid,
    members.username AS username,
    members.age AS age,
    members.team_uuid AS team_uuid,
    members.created_at AS created_at,
    members.updated_at AS updated_at";

const TEAM_JOIN_COLUMNS_SQL: &str = "teams.uuid AS team_join_uuid,
    teams.name AS team_name,
    teams.created_at AS team_created_at,
    teams.updated_at AS team_updated_at";

const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

/// How much of a member's association graph a query loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Member columns only; `MemberWithTeam::team` is always `None`.
    MemberOnly,
    /// Team joined in the same statement.
    WithTeam,
}

/// Repository interface for member CRUD and read projections.
pub trait MemberRepository {
    /// Inserts or updates by id and returns the stored row.
    fn save(&self, member: &Member) -> RepoResult<Member>;
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn find_all(&self) -> RepoResult<Vec<Member>>;
    fn find_matching(
        &self,
        predicate: &MemberPredicate,
        sort: &Sort<MemberSortField>,
    ) -> RepoResult<Vec<Member>>;
    fn find_with_team(
        &self,
        predicate: &MemberPredicate,
        fetch: Fetch,
    ) -> RepoResult<Vec<MemberWithTeam>>;
    fn find_member_dtos(&self) -> RepoResult<Vec<MemberDto>>;
    fn find_usernames(&self) -> RepoResult<Vec<String>>;
    fn delete(&self, id: MemberId) -> RepoResult<()>;
    fn count_all(&self) -> RepoResult<u64>;
}

/// SQLite-backed member repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteMemberStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Runs `work` while holding SQLite's write lock.
    ///
    /// The lock is taken with `BEGIN IMMEDIATE`, so no other connection can
    /// write until `work` returns. `Ok` commits; `Err` rolls back.
    pub fn with_write_lock<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&SqliteMemberStore<'_>) -> RepoResult<T>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        debug!("event=write_lock module=repo status=acquired");
        let outcome = work(&SqliteMemberStore::new(&tx));
        match outcome {
            Ok(value) => {
                tx.commit()?;
                debug!("event=write_lock module=repo status=committed");
                Ok(value)
            }
            Err(err) => {
                tx.rollback()?;
                warn!("event=write_lock module=repo status=rolled_back error={err}");
                Err(err)
            }
        }
    }

    fn query_members(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }
}

impl MemberRepository for SqliteMemberStore<'_> {
    fn save(&self, member: &Member) -> RepoResult<Member> {
        member.validate()?;

        let result = self.conn.execute(
            &format!(
                "INSERT INTO members (uuid, username, age, team_uuid, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, {NOW_MS_SQL}, {NOW_MS_SQL})
                 ON CONFLICT (uuid) DO UPDATE SET
                    username = excluded.username,
                    age = excluded.age,
                    team_uuid = excluded.team_uuid,
                    updated_at = excluded.updated_at;"
            ),
            params![
                member.id.to_string(),
                member.username.as_str(),
                member.age,
                member.team_id.map(|id| id.to_string()),
            ],
        );
        if let Err(err) = result {
            return Err(match member.team_id {
                Some(team_id) if is_foreign_key_violation(&err) => RepoError::NotFound {
                    entity: "team",
                    id: team_id,
                },
                _ => err.into(),
            });
        }

        debug!("event=member_save module=repo status=ok");
        self.find_by_id(member.id)?.ok_or(RepoError::NotFound {
            entity: "member",
            id: member.id,
        })
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let members = self.query_members(
            &format!("SELECT {MEMBER_COLUMNS_SQL} FROM members WHERE members.uuid = ?"),
            vec![Value::Text(id.to_string())],
        )?;
        Ok(members.into_iter().next())
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.find_matching(&MemberPredicate::All, &Sort::unsorted())
    }

    fn find_matching(
        &self,
        predicate: &MemberPredicate,
        sort: &Sort<MemberSortField>,
    ) -> RepoResult<Vec<Member>> {
        let mut sql = format!("SELECT {MEMBER_COLUMNS_SQL} FROM members WHERE ");
        let mut bind_values = Vec::new();
        push_predicate(predicate, &mut sql, &mut bind_values);
        push_order_by(sort, &mut sql);
        self.query_members(&sql, bind_values)
    }

    fn find_with_team(
        &self,
        predicate: &MemberPredicate,
        fetch: Fetch,
    ) -> RepoResult<Vec<MemberWithTeam>> {
        if fetch == Fetch::MemberOnly {
            return Ok(self
                .find_matching(predicate, &Sort::unsorted())?
                .into_iter()
                .map(|member| MemberWithTeam { member, team: None })
                .collect());
        }

        let mut sql = format!(
            "SELECT {MEMBER_COLUMNS_SQL}, {TEAM_JOIN_COLUMNS_SQL}
             FROM members
             LEFT JOIN teams ON teams.uuid = members.team_uuid
             WHERE "
        );
        let mut bind_values = Vec::new();
        push_predicate(predicate, &mut sql, &mut bind_values);
        push_order_by(&Sort::unsorted(), &mut sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut loaded = Vec::new();
        while let Some(row) = rows.next()? {
            let member = parse_member_row(row)?;
            let team = match row.get::<_, Option<String>>("team_join_uuid")? {
                Some(uuid_text) => Some(parse_team_columns(
                    &uuid_text,
                    row.get("team_name")?,
                    row.get("team_created_at")?,
                    row.get("team_updated_at")?,
                )?),
                None => None,
            };
            loaded.push(MemberWithTeam { member, team });
        }
        Ok(loaded)
    }

    fn find_member_dtos(&self) -> RepoResult<Vec<MemberDto>> {
        let mut stmt = self.conn.prepare(
            "SELECT members.uuid AS uuid, members.username AS username, teams.name AS team_name
             FROM members
             LEFT JOIN teams ON teams.uuid = members.team_uuid
             ORDER BY members.rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut dtos = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            dtos.push(MemberDto {
                id: parse_uuid(&uuid_text, "members.uuid")?,
                username: row.get("username")?,
                team_name: row.get("team_name")?,
            });
        }
        Ok(dtos)
    }

    fn find_usernames(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username FROM members ORDER BY rowid ASC;")?;
        let usernames = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usernames)
    }

    fn delete(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id,
            });
        }
        debug!("event=member_delete module=repo status=ok");
        Ok(())
    }

    fn count_all(&self) -> RepoResult<u64> {
        self.count_matching(&MemberPredicate::All)
    }
}

impl StorageBackend for SqliteMemberStore<'_> {
    type Record = Member;
    type Predicate = MemberPredicate;
    type Mutation = MemberMutation;
    type SortField = MemberSortField;

    fn scan(
        &self,
        predicate: &MemberPredicate,
        sort: &Sort<MemberSortField>,
        skip: u64,
        limit: u64,
    ) -> RepoResult<Vec<Member>> {
        let mut sql = format!("SELECT {MEMBER_COLUMNS_SQL} FROM members WHERE ");
        let mut bind_values = Vec::new();
        push_predicate(predicate, &mut sql, &mut bind_values);
        push_order_by(sort, &mut sql);
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(clamp_to_i64(limit)));
        bind_values.push(Value::Integer(clamp_to_i64(skip)));
        self.query_members(&sql, bind_values)
    }

    fn count_matching(&self, predicate: &MemberPredicate) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM members WHERE ");
        let mut bind_values = Vec::new();
        push_predicate(predicate, &mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn update_matching(
        &self,
        predicate: &MemberPredicate,
        mutation: &MemberMutation,
    ) -> RepoResult<u64> {
        mutation.validate()?;

        let mut sql = String::from("UPDATE members SET ");
        let mut bind_values = Vec::new();
        match mutation {
            MemberMutation::AgeAdd(delta) => {
                // Same bounds as `MemberMutation::apply`: [0, i32::MAX].
                sql.push_str(&format!("age = MAX(0, MIN({}, age + ?))", i32::MAX));
                bind_values.push(Value::Integer(i64::from(*delta)));
            }
            MemberMutation::AgeSet(age) => {
                sql.push_str("age = ?");
                bind_values.push(Value::Integer(i64::from(*age)));
            }
            MemberMutation::Rename(username) => {
                sql.push_str("username = ?");
                bind_values.push(Value::Text(username.clone()));
            }
            MemberMutation::ClearTeam => sql.push_str("team_uuid = NULL"),
        }
        sql.push_str(&format!(", updated_at = {NOW_MS_SQL} WHERE "));
        push_predicate(predicate, &mut sql, &mut bind_values);

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed as u64)
    }
}

fn push_predicate(predicate: &MemberPredicate, sql: &mut String, bind_values: &mut Vec<Value>) {
    match predicate {
        MemberPredicate::All => sql.push_str("1 = 1"),
        MemberPredicate::UsernameEq(username) => {
            sql.push_str("members.username = ?");
            bind_values.push(Value::Text(username.clone()));
        }
        MemberPredicate::UsernameIn(usernames) => {
            if usernames.is_empty() {
                sql.push_str("0 = 1");
                return;
            }
            let placeholders = vec!["?"; usernames.len()].join(", ");
            sql.push_str(&format!("members.username IN ({placeholders})"));
            bind_values.extend(usernames.iter().cloned().map(Value::Text));
        }
        MemberPredicate::AgeEq(age) => push_age_comparison("=", *age, sql, bind_values),
        MemberPredicate::AgeGt(age) => push_age_comparison(">", *age, sql, bind_values),
        MemberPredicate::AgeGte(age) => push_age_comparison(">=", *age, sql, bind_values),
        MemberPredicate::AgeLt(age) => push_age_comparison("<", *age, sql, bind_values),
        MemberPredicate::TeamEq(team_id) => {
            sql.push_str("members.team_uuid = ?");
            bind_values.push(Value::Text(team_id.to_string()));
        }
        MemberPredicate::NoTeam => sql.push_str("members.team_uuid IS NULL"),
        MemberPredicate::And(parts) => {
            if parts.is_empty() {
                sql.push_str("1 = 1");
                return;
            }
            sql.push('(');
            for (index, part) in parts.iter().enumerate() {
                if index > 0 {
                    sql.push_str(" AND ");
                }
                push_predicate(part, sql, bind_values);
            }
            sql.push(')');
        }
    }
}

fn push_age_comparison(operator: &str, age: i32, sql: &mut String, bind_values: &mut Vec<Value>) {
    sql.push_str(&format!("members.age {operator} ?"));
    bind_values.push(Value::Integer(i64::from(age)));
}

fn push_order_by(sort: &Sort<MemberSortField>, sql: &mut String) {
    sql.push_str(" ORDER BY ");
    for order in sort.orders() {
        let column = match order.field {
            MemberSortField::Username => "members.username",
            MemberSortField::Age => "members.age",
            MemberSortField::CreatedAt => "members.created_at",
        };
        sql.push_str(&format!("{column} {}, ", order.direction.as_sql()));
    }
    sql.push_str("members.rowid ASC");
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let team_id = match row.get::<_, Option<String>>("team_uuid")? {
        Some(value) => Some(parse_uuid(&value, "members.team_uuid")?),
        None => None,
    };

    Ok(Member {
        id: parse_uuid(&uuid_text, "members.uuid")?,
        username: row.get("username")?,
        age: row.get("age")?,
        team_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == ErrorCode::ConstraintViolation
                && code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
