use std::sync::Arc;

use super::*;
use crate::net::generate::{GenerateError, MoodboardGenerator};
use crate::net::persist::{MoodboardStore, PersistError};
use crate::net::stub;
use moodboards::{Color, Font, Image, Moodboard};
use uuid::Uuid;

struct FixedGenerator;

#[async_trait::async_trait]
impl MoodboardGenerator for FixedGenerator {
    async fn generate(&self, keyword: &str) -> Result<Moodboard, GenerateError> {
        if keyword == "broken" {
            return Err(GenerateError::MissingMoodboard);
        }
        Ok(Moodboard {
            id: None,
            title: format!("{keyword} board"),
            keywords: vec![keyword.to_owned()],
            colors: (0..5).map(|i| Color::new(format!("#00000{i}"), format!("c{i}"))).collect(),
            fonts: vec![
                Font { name: "Inter".into(), family: "Inter".into(), weight: "400".into() },
                Font { name: "Lora".into(), family: "Lora".into(), weight: "700".into() },
            ],
            images: vec![Image { url: "https://img.example/1".into(), alt: "one".into() }],
        })
    }
}

struct AcceptingStore(Uuid);

#[async_trait::async_trait]
impl MoodboardStore for AcceptingStore {
    async fn save(&self, _moodboard: &Moodboard, _user_id: Uuid) -> Result<Uuid, PersistError> {
        Ok(self.0)
    }
}

async fn run_script(script: &str, saved_id: Uuid) -> String {
    let (_, ctx) = stub::signed_in("tok", Uuid::new_v4()).await;
    let controller = BoardController::new(Arc::new(FixedGenerator), Arc::new(AcceptingStore(saved_id)), ctx);
    let mut output = Vec::new();
    run(&controller, script.as_bytes(), &mut output, false).await.unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn parses_commands() {
    assert_eq!(parse_line("  "), Ok(None));
    assert_eq!(parse_line("search  Modern Minimalist "), Ok(Some(SessionCommand::Search("Modern Minimalist".into()))));
    assert_eq!(parse_line("search"), Ok(Some(SessionCommand::Search(String::new()))));
    assert_eq!(parse_line("SHUFFLE"), Ok(Some(SessionCommand::Shuffle)));
    assert_eq!(parse_line("q"), Ok(Some(SessionCommand::Quit)));
    assert_eq!(parse_line("dance now"), Err(UnknownCommand("dance".into())));
}

#[tokio::test]
async fn scripted_session() {
    let id = Uuid::new_v4();
    let out = run_script("show\nsearch forest\nshuffle\nexport\nbogus\nquit\nsearch never\n", id).await;

    assert!(out.contains("nothing displayed"));
    assert!(out.contains("[ok] Moodboard Generated!: Created a beautiful moodboard for \"forest\""));
    assert!(out.contains("forest board\n"));
    assert!(out.contains(&format!("saved as {id}")));
    assert!(out.contains("[ok] Layout Shuffled!"));
    assert!(out.contains("[ok] Export Started!"));
    assert!(out.contains("unknown command: bogus"));
    assert!(!out.contains("never"));
}

#[tokio::test]
async fn failed_search_and_empty_keyword() {
    let out = run_script("search\nsearch broken\nreplace\n", Uuid::new_v4()).await;
    assert!(out.contains("[info] Keyword required"));
    assert!(out.contains("[error] Generation Failed"));
    assert!(out.contains("[info] Nothing to edit"));
    assert!(!out.contains("saved as"));
}
