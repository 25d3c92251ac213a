use std::collections::HashMap;
use std::sync::Arc;

use spacewarden_core::AppError;
use spacewarden_domain::Guid;

use crate::test_support::{FakePlatform, application, space};

use super::PurgeService;

fn platform_with_apps() -> FakePlatform {
    FakePlatform {
        space_applications: HashMap::from([(
            Guid::from("space-1"),
            vec![
                application("app-1", "space-1", "2024-01-01T00:00:00Z"),
                application("app-2", "space-1", "2024-01-02T00:00:00Z"),
                application("app-3", "space-1", "2024-01-03T00:00:00Z"),
            ],
        )]),
        ..FakePlatform::default()
    }
}

#[tokio::test]
async fn successful_space_delete_skips_application_calls() {
    let platform = Arc::new(platform_with_apps());
    let service = PurgeService::new(platform.clone());

    let result = service.purge_space(&space("space-1", "org-1")).await;

    assert!(result.is_ok());
    assert_eq!(
        platform.space_deletes.lock().await.clone(),
        vec![Guid::from("space-1")]
    );
    assert!(platform.application_listings.lock().await.is_empty());
    assert!(platform.application_deletes.lock().await.is_empty());
}

#[tokio::test]
async fn failed_space_delete_clears_apps_and_returns_space_error() {
    let mut platform = platform_with_apps();
    platform.failing_space_deletes.insert(Guid::from("space-1"));
    let platform = Arc::new(platform);
    let service = PurgeService::new(platform.clone());

    let result = service.purge_space(&space("space-1", "org-1")).await;

    match result {
        Err(AppError::Delete(message)) => assert!(message.contains("space space-1")),
        other => panic!("expected the space delete error, got {other:?}"),
    }
    assert_eq!(
        platform.application_deletes.lock().await.clone(),
        vec![
            Guid::from("app-1"),
            Guid::from("app-2"),
            Guid::from("app-3")
        ]
    );
}

#[tokio::test]
async fn failed_application_listing_is_returned_instead_of_space_error() {
    let mut platform = platform_with_apps();
    platform.failing_space_deletes.insert(Guid::from("space-1"));
    platform.fail_application_listing = true;
    let platform = Arc::new(platform);
    let service = PurgeService::new(platform.clone());

    let result = service.purge_space(&space("space-1", "org-1")).await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
    assert!(platform.application_deletes.lock().await.is_empty());
}

#[tokio::test]
async fn failed_application_delete_stops_the_fallback() {
    let mut platform = platform_with_apps();
    platform.failing_space_deletes.insert(Guid::from("space-1"));
    platform
        .failing_application_deletes
        .insert(Guid::from("app-2"));
    let platform = Arc::new(platform);
    let service = PurgeService::new(platform.clone());

    let result = service.purge_space(&space("space-1", "org-1")).await;

    match result {
        Err(AppError::Delete(message)) => assert!(message.contains("application app-2")),
        other => panic!("expected the application delete error, got {other:?}"),
    }
    assert_eq!(
        platform.application_deletes.lock().await.clone(),
        vec![Guid::from("app-1"), Guid::from("app-2")]
    );
}

#[tokio::test]
async fn failed_space_delete_without_apps_still_returns_space_error() {
    let mut platform = FakePlatform::default();
    platform.failing_space_deletes.insert(Guid::from("space-9"));
    let platform = Arc::new(platform);
    let service = PurgeService::new(platform.clone());

    let result = service.purge_space(&space("space-9", "org-1")).await;

    assert!(matches!(result, Err(AppError::Delete(_))));
    assert_eq!(
        platform.application_listings.lock().await.clone(),
        vec![Guid::from("space-9")]
    );
}
