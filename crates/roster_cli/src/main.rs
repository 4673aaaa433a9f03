//! CLI smoke entry point.
//!
//! Loads `roster.toml` (path from the first argument, optional), applies
//! `ROSTER_*` overrides, opens the database, seeds sample members when it is
//! empty and prints the first page.

use roster_core::db::{open_db, open_db_in_memory};
use roster_core::{
    init_logging, Direction, MemberPredicate, MemberRepository, MemberService, MemberSortField,
    PageRequest, RosterConfig, Sort, SqliteMemberStore,
};
use std::error::Error;
use std::process::ExitCode;

const SAMPLE_MEMBERS: &[(&str, i32)] = &[
    ("member1", 10),
    ("member2", 10),
    ("member3", 10),
    ("member4", 10),
    ("member5", 10),
];

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roster: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => RosterConfig::load(path)?,
        None => RosterConfig::default(),
    }
    .with_process_env()?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = match &config.database_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let service = MemberService::new(SqliteMemberStore::new(&conn));

    if SqliteMemberStore::new(&conn).count_all()? == 0 {
        for (username, age) in SAMPLE_MEMBERS {
            service.register(*username, *age, None)?;
        }
        log::info!(
            "event=cli_seed module=cli status=ok members={}",
            SAMPLE_MEMBERS.len()
        );
    }

    let request = PageRequest::of_sorted(
        0,
        config.default_page_size,
        Sort::by(Direction::Desc, MemberSortField::Username),
    );
    let page = service.find_page(&MemberPredicate::All, &request)?;

    println!("roster_core version={}", roster_core::core_version());
    println!(
        "page={} size={} returned={} total={} total_pages={} first={} has_next={}",
        page.number,
        page.size,
        page.number_of_elements(),
        page.total_elements,
        page.total_pages(),
        page.is_first(),
        page.has_next()
    );
    for member in &page.content {
        println!("  {} age={}", member.username, member.age);
    }
    Ok(())
}
