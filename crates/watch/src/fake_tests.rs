// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::template::Template;

#[tokio::test]
async fn register_then_deregister_updates_size() {
    let watcher = FakeWatcher::new();
    let mut tmpl = Template::new("api", vec![Dependency::ServicesByRegex("web-.*".into())]);
    watcher.register(tmpl.id().clone(), tmpl.dependencies().to_vec()).await;
    assert_eq!(watcher.size(), 1);
    watcher.deregister(tmpl.id()).await;
    assert_eq!(watcher.size(), 0);
    let _ = tmpl.render(&[]);
}

#[tokio::test]
async fn set_value_is_visible_via_values() {
    let watcher = FakeWatcher::new();
    let tmpl = Template::new("api", vec![Dependency::ServicesByRegex("web-.*".into())]);
    watcher.register(tmpl.id().clone(), tmpl.dependencies().to_vec()).await;
    assert_eq!(watcher.values(tmpl.id()), vec![None]);

    watcher.set_value(tmpl.id(), 0, DependencyValue::new(vec!["web-1".into()]));
    assert_eq!(watcher.values(tmpl.id()), vec![Some(DependencyValue::new(vec!["web-1".into()]))]);
}

#[tokio::test]
async fn wait_returns_when_a_value_is_set() {
    let watcher = FakeWatcher::new();
    let tmpl = Template::new("api", vec![Dependency::ServicesByRegex("web-.*".into())]);
    watcher.register(tmpl.id().clone(), tmpl.dependencies().to_vec()).await;

    let token = CancellationToken::new();
    let watcher2 = watcher.clone();
    let id = tmpl.id().clone();
    let waiter = tokio::spawn(async move { watcher2.wait(&CancellationToken::new()).await });
    watcher.set_value(&id, 0, DependencyValue::new(vec!["web-1".into()]));
    waiter.await.unwrap().unwrap();
    let _ = token;
}

#[tokio::test]
async fn wait_returns_cancelled_when_token_fires_first() {
    let watcher = FakeWatcher::new();
    let token = CancellationToken::new();
    token.cancel();
    let result = watcher.wait(&token).await;
    assert!(matches!(result, Err(WatcherError::Cancelled)));
}

#[tokio::test]
async fn sweep_removes_only_marked_templates() {
    let watcher = FakeWatcher::new();
    let a = Template::new("a", vec![Dependency::ServicesByRegex("a".into())]);
    let b = Template::new("b", vec![Dependency::ServicesByRegex("b".into())]);
    watcher.register(a.id().clone(), a.dependencies().to_vec()).await;
    watcher.register(b.id().clone(), b.dependencies().to_vec()).await;
    watcher.mark_for_sweep(a.id()).await;
    watcher.sweep().await;
    assert_eq!(watcher.size(), 1);
    assert_eq!(watcher.values(b.id()), vec![None]);
}
