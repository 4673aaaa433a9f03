use roster_core::db::open_db_in_memory;
use roster_core::{
    Fetch, MemberPredicate, MemberRepository, MemberService, RepoError, SqliteMemberStore,
    SqliteTeamStore, Team, TeamRepository, TeamService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_two_teams(conn: &Connection) -> (Team, Team) {
    let teams = TeamService::new(SqliteTeamStore::new(conn));
    let team_a = teams.create_team("teamA").unwrap();
    let team_b = teams.create_team("teamB").unwrap();

    let members = MemberService::new(SqliteMemberStore::new(conn));
    members.register("member1", 10, Some(team_a.id)).unwrap();
    members.register("member2", 10, Some(team_b.id)).unwrap();
    members.register("loner", 30, None).unwrap();
    (team_a, team_b)
}

#[test]
fn fetch_with_team_joins_team_in_one_query() {
    let conn = open_db_in_memory().unwrap();
    let (team_a, team_b) = seed_two_teams(&conn);
    let repo = SqliteMemberStore::new(&conn);

    let loaded = repo
        .find_with_team(&MemberPredicate::All, Fetch::WithTeam)
        .unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].member.username, "member1");
    assert_eq!(loaded[0].team.as_ref(), Some(&team_a));
    assert_eq!(loaded[1].team.as_ref(), Some(&team_b));
    assert_eq!(loaded[2].team, None);
}

#[test]
fn fetch_member_only_leaves_team_unloaded() {
    let conn = open_db_in_memory().unwrap();
    let (team_a, _) = seed_two_teams(&conn);
    let repo = SqliteMemberStore::new(&conn);

    let loaded = repo
        .find_with_team(
            &MemberPredicate::UsernameEq("member1".to_string()),
            Fetch::MemberOnly,
        )
        .unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].member.team_id, Some(team_a.id));
    assert_eq!(loaded[0].team, None);

    let team = SqliteTeamStore::new(&conn)
        .find_by_id(loaded[0].member.team_id.unwrap())
        .unwrap();
    assert_eq!(team, Some(team_a));
}

#[test]
fn member_dtos_carry_team_names() {
    let conn = open_db_in_memory().unwrap();
    seed_two_teams(&conn);

    let dtos = SqliteMemberStore::new(&conn).find_member_dtos().unwrap();
    let rows: Vec<(String, Option<String>)> = dtos
        .into_iter()
        .map(|dto| (dto.username, dto.team_name))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("member1".to_string(), Some("teamA".to_string())),
            ("member2".to_string(), Some("teamB".to_string())),
            ("loner".to_string(), None),
        ]
    );
}

#[test]
fn change_team_is_an_explicit_write_visible_from_team_side() {
    let conn = open_db_in_memory().unwrap();
    let (team_a, team_b) = seed_two_teams(&conn);
    let teams = TeamService::new(SqliteTeamStore::new(&conn));
    let members = MemberService::new(SqliteMemberStore::new(&conn));
    let member1 = members.find_by_username("member1").unwrap().remove(0);

    let moved = members.change_team(member1.id, Some(team_b.id)).unwrap();

    assert_eq!(moved.team_id, Some(team_b.id));
    assert!(teams.members_of(team_a.id).unwrap().is_empty());
    assert_eq!(teams.members_of(team_b.id).unwrap().len(), 2);
    assert!(teams.members_of(team_b.id).unwrap().contains(&member1.id));
}

#[test]
fn change_team_rejects_unknown_member_and_unknown_team() {
    let conn = open_db_in_memory().unwrap();
    seed_two_teams(&conn);
    let members = MemberService::new(SqliteMemberStore::new(&conn));
    let loner = members.find_by_username("loner").unwrap().remove(0);

    let missing_member = Uuid::new_v4();
    let err = members.change_team(missing_member, None).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "member", .. }));

    let missing_team = Uuid::new_v4();
    let err = members.change_team(loner.id, Some(missing_team)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "team", id } if id == missing_team));
    assert_eq!(members.find(loner.id).unwrap().unwrap().team_id, None);
}

#[test]
fn deleting_team_detaches_its_members() {
    let conn = open_db_in_memory().unwrap();
    let (team_a, _) = seed_two_teams(&conn);
    let teams = TeamService::new(SqliteTeamStore::new(&conn));
    let members = MemberService::new(SqliteMemberStore::new(&conn));

    teams.remove(team_a.id).unwrap();

    let member1 = members.find_by_username("member1").unwrap().remove(0);
    assert_eq!(member1.team_id, None);
    let err = teams.members_of(team_a.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "team", .. }));
}

#[test]
fn teams_are_listed_by_name_and_renamed_in_place() {
    let conn = open_db_in_memory().unwrap();
    let (team_a, team_b) = seed_two_teams(&conn);
    let repo = SqliteTeamStore::new(&conn);

    let mut renamed = team_a.clone();
    renamed.name = "zeta".to_string();
    let saved = repo.save(&renamed).unwrap();
    assert_eq!(saved.created_at, team_a.created_at);

    let names: Vec<String> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|team| team.name)
        .collect();
    assert_eq!(names, vec![team_b.name.clone(), "zeta".to_string()]);

    let service = TeamService::new(repo);
    assert_eq!(service.list_teams().unwrap().len(), 2);
    assert_eq!(service.find(team_b.id).unwrap().unwrap().name, "teamB");

    let err = repo.save(&Team::new("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn write_lock_commits_on_success() {
    let conn = open_db_in_memory().unwrap();
    seed_two_teams(&conn);
    let repo = SqliteMemberStore::new(&conn);

    let renamed = repo
        .with_write_lock(|locked| {
            let mut member = locked
                .find_matching(
                    &MemberPredicate::UsernameEq("member1".to_string()),
                    &Default::default(),
                )?
                .remove(0);
            member.username = "member1-locked".to_string();
            locked.save(&member)
        })
        .unwrap();

    assert_eq!(renamed.username, "member1-locked");
    assert_eq!(repo.find_by_id(renamed.id).unwrap().unwrap(), renamed);
}

#[test]
fn write_lock_rolls_back_on_error() {
    let conn = open_db_in_memory().unwrap();
    seed_two_teams(&conn);
    let repo = SqliteMemberStore::new(&conn);

    let missing = Uuid::new_v4();
    let err = repo
        .with_write_lock(|locked| {
            locked.delete(locked.find_all()?[0].id)?;
            locked.delete(missing)
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound { entity: "member", .. }));
    assert_eq!(repo.count_all().unwrap(), 3);
    assert!(conn.is_autocommit());
}
