use super::*;

fn loc(path: &str) -> Location {
    Location::parse(path)
}

#[test]
fn push_appends_and_moves_cursor() {
    let mut history = History::new();
    history.push(loc("/"));
    history.push(loc("/journal"));

    assert_eq!(history.full_paths(), vec!["/", "/journal"]);
    assert_eq!(history.current().unwrap().path, "/journal");
    assert_eq!(history.previous().unwrap().path, "/");
}

#[test]
fn replace_overwrites_current_entry() {
    let mut history = History::new();
    history.push(loc("/"));
    history.push(loc("/journal"));
    history.replace(loc("/login"));

    assert_eq!(history.full_paths(), vec!["/", "/login"]);
    assert_eq!(history.previous().unwrap().path, "/");
}

#[test]
fn replace_on_empty_history_adds_entry() {
    let mut history = History::new();
    history.replace(loc("/login"));
    assert_eq!(history.len(), 1);
    assert!(history.previous().is_none());
}

#[test]
fn empty_history_has_no_current() {
    let history = History::new();
    assert!(history.is_empty());
    assert!(history.current().is_none());
}
