// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use cts_watch::{Dependency, Template};
use tokio_util::sync::CancellationToken;

use super::*;

fn template_id(name: &str) -> TemplateId {
    Template::new(name, vec![Dependency::ServicesByRegex("web-.*".into())]).id().clone()
}

#[tokio::test]
async fn registering_with_no_file_yet_leaves_values_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    let watcher = FilePollWatcher::new(dir.path().to_path_buf(), Duration::from_millis(20));
    let template_id = template_id("tmpl-a");
    watcher
        .register(template_id.clone(), vec![Dependency::ServicesByRegex("web-.*".into())])
        .await;

    let values = watcher.values(&template_id);
    assert_eq!(values, vec![None]);
}

#[tokio::test]
async fn poller_picks_up_a_value_written_after_registration() {
    let dir = tempfile::tempdir().unwrap();
    let watcher = FilePollWatcher::new(dir.path().to_path_buf(), Duration::from_millis(10));
    let template_id = template_id("tmpl-b");
    watcher
        .register(template_id.clone(), vec![Dependency::ServicesByRegex("web-.*".into())])
        .await;

    let token = CancellationToken::new();
    let handle = watcher.spawn_poller(token.clone());

    let value_dir = dir.path().join(template_id.as_str());
    std::fs::create_dir_all(&value_dir).unwrap();
    std::fs::write(value_dir.join("0.json"), r#"["10.0.0.5"]"#).unwrap();

    tokio::time::timeout(Duration::from_secs(1), watcher.wait(&token)).await.unwrap().unwrap();

    let values = watcher.values(&template_id);
    assert_eq!(values[0].as_ref().unwrap().entries, vec!["10.0.0.5".to_string()]);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn deregister_drops_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let watcher = FilePollWatcher::new(dir.path().to_path_buf(), Duration::from_millis(20));
    let template_id = template_id("tmpl-c");
    watcher.register(template_id.clone(), vec![]).await;
    assert_eq!(watcher.size(), 1);
    watcher.deregister(&template_id).await;
    assert_eq!(watcher.size(), 0);
}
