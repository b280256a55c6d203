use crate::app::App;
use serde_json::json;
use stanza_core::{
    FsRevisionSource, HistoryNavigator, HistoryOptions, PagerConfig, RevisionPager,
};
use std::path::Path;
use std::sync::Arc;

/// Write a history with one revision per text, a day apart, oldest first
pub fn write_history(root: &Path, document: &str, texts: &[&str]) {
    let history: Vec<_> = (0..texts.len())
        .map(|i| {
            json!({
                "hex": format!("{i:040x}"),
                "created": format!("2021-03-{:02}T12:00:00Z", i + 1),
            })
        })
        .collect();
    std::fs::write(
        root.join(format!("{document}.json")),
        json!({ "history": history }).to_string(),
    )
    .unwrap();

    let dir = root.join(document);
    std::fs::create_dir_all(&dir).unwrap();
    for (i, text) in texts.iter().enumerate() {
        std::fs::write(
            dir.join(format!("{i:040x}.json")),
            json!({ "content": text }).to_string(),
        )
        .unwrap();
    }
}

pub async fn open_app(root: &Path, texts: &[&str], start_at: usize) -> App<FsRevisionSource> {
    write_history(root, "ode", texts);
    let source = Arc::new(FsRevisionSource::new(root, "ode"));
    let config = PagerConfig {
        page_size: 2,
        prefetch_bound: 1,
        fetch_timeout: None,
    };
    let pager = RevisionPager::open(source, config).await.unwrap();
    let nav = HistoryNavigator::open(pager, start_at, HistoryOptions::default())
        .await
        .unwrap();
    App::new(nav, "ode", 0, false)
}
