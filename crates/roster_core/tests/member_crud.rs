use roster_core::db::open_db_in_memory;
use roster_core::{
    Member, MemberRepository, MemberService, RepoError, SqliteMemberStore, ValidationError,
};
use uuid::Uuid;

#[test]
fn save_and_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberStore::new(&conn);

    let saved = repo.save(&Member::new("memberB", 0)).unwrap();
    let loaded = repo.find_by_id(saved.id).unwrap().unwrap();

    assert_eq!(loaded.id, saved.id);
    assert_eq!(loaded.username, "memberB");
    assert_eq!(loaded, saved);
}

#[test]
fn basic_crud_counts_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberStore::new(&conn);

    let member1 = repo.save(&Member::new("member1", 0)).unwrap();
    let member2 = repo.save(&Member::new("member2", 0)).unwrap();

    assert_eq!(repo.find_by_id(member1.id).unwrap().unwrap(), member1);
    assert_eq!(repo.find_by_id(member2.id).unwrap().unwrap(), member2);

    let all = repo.find_all().unwrap();
    assert_eq!(all, vec![member1.clone(), member2.clone()]);
    assert_eq!(repo.count_all().unwrap(), 2);

    repo.delete(member1.id).unwrap();
    repo.delete(member2.id).unwrap();
    assert_eq!(repo.count_all().unwrap(), 0);
}

#[test]
fn delete_missing_member_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberStore::new(&conn);

    let id = Uuid::new_v4();
    let err = repo.delete(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "member", id: missing } if missing == id));
}

#[test]
fn save_existing_member_updates_fields_and_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberStore::new(&conn);

    let mut member = repo.save(&Member::new("member1", 10)).unwrap();
    assert!(member.created_at > 0);
    assert!(member.updated_at >= member.created_at);

    let created_at = member.created_at;
    member.username = "member2".to_string();
    member.age = 11;
    let updated = repo.save(&member).unwrap();

    assert_eq!(updated.username, "member2");
    assert_eq!(updated.age, 11);
    assert_eq!(updated.created_at, created_at);
    assert!(updated.updated_at >= created_at);
    assert_eq!(repo.count_all().unwrap(), 1);
}

#[test]
fn validation_failure_blocks_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberStore::new(&conn);

    let err = repo.save(&Member::new(" ", 10)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyUsername)
    ));

    let err = repo.save(&Member::new("member1", -1)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeAge(-1))
    ));
    assert_eq!(repo.count_all().unwrap(), 0);
}

#[test]
fn save_with_unknown_team_returns_team_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberStore::new(&conn);

    let team_id = Uuid::new_v4();
    let err = repo
        .save(&Member::in_team("member1", 10, team_id))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "team", id } if id == team_id));
}

#[test]
fn find_by_username_and_age_greater_than() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberStore::new(&conn));

    service.register("AAA", 10, None).unwrap();
    service.register("AAA", 20, None).unwrap();
    service.register("BBB", 20, None).unwrap();

    let result = service
        .find_by_username_and_age_greater_than("AAA", 15)
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].username, "AAA");
    assert_eq!(result[0].age, 20);
}

#[test]
fn find_by_username_returns_exact_matches_only() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberStore::new(&conn));

    let aaa = service.register("AAA", 10, None).unwrap();
    service.register("BBB", 20, None).unwrap();

    assert_eq!(service.find_by_username("AAA").unwrap(), vec![aaa]);
    assert!(service.find_by_username("asdfasdee").unwrap().is_empty());
}

#[test]
fn find_by_usernames_keeps_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberStore::new(&conn));

    service.register("AAA", 10, None).unwrap();
    service.register("BBB", 20, None).unwrap();
    service.register("CCC", 30, None).unwrap();

    let names = vec!["CCC".to_string(), "AAA".to_string()];
    let result: Vec<String> = service
        .find_by_usernames(&names)
        .unwrap()
        .into_iter()
        .map(|member| member.username)
        .collect();
    assert_eq!(result, vec!["AAA", "CCC"]);

    assert!(service.find_by_usernames(&[]).unwrap().is_empty());
}

#[test]
fn find_usernames_lists_every_member() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberStore::new(&conn));
    service.register("AAA", 10, None).unwrap();
    service.register("BBB", 20, None).unwrap();

    let usernames = SqliteMemberStore::new(&conn).find_usernames().unwrap();
    assert_eq!(usernames, vec!["AAA", "BBB"]);
}

#[test]
fn service_remove_deletes_member() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberStore::new(&conn));

    let member = service.register("member1", 10, None).unwrap();
    service.remove(member.id).unwrap();
    assert!(service.find(member.id).unwrap().is_none());
}
