mod hook;

use test_helpers::spawn_app;

#[tokio::test]
async fn empty_backend_lists_no_sensors() -> anyhow::Result<()> {
    let app = spawn_app().await;

    assert!(app.client.list_sensors().await?.is_empty());
    assert_eq!(app.requests_to("/"), 1);

    Ok(())
}
