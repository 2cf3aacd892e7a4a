//! End-to-end member flows across session modes

use air_sdk::catalog::{role_or_default, seed_opportunities};
use air_sdk::{
    quote, rank, MemberConfig, MemberData, MemoryGateway, NewPipelineItem, OpportunityFilter,
    PipelineStage, QuoteInput, RemoteGateway, SdkError, SessionMode, SessionResolver,
};
use air_sdk::store::LocalStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;

fn resolver(dir: &TempDir, demo: bool, gateway: Option<Arc<MemoryGateway>>) -> SessionResolver {
    let config = MemberConfig::new(dir.path()).with_demo_auth(demo);
    SessionResolver::new(
        config,
        LocalStore::new(dir.path()),
        gateway.map(|g| g as Arc<dyn RemoteGateway>),
    )
}

#[tokio::test]
async fn test_demo_member_tracks_and_books_work() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(&dir, true, None);
    resolver.begin_demo_session(Some("kim@example.org")).await.unwrap();

    let data = MemberData::resolve(&resolver).await;
    let opportunities = data.opportunities().await.unwrap().value;
    let item = data.track_opportunity(&opportunities[0]).await.unwrap().value;
    data.set_stage(&item.id, PipelineStage::Paid).await.unwrap();

    let summary = data.pipeline_summary().await.unwrap();
    assert!(summary.paid_count >= 1);

    // Signing out leaves a guest who can no longer write
    resolver.sign_out().await.unwrap();
    let guest = MemberData::resolve(&resolver).await;
    assert!(guest.session().is_guest());
    assert!(matches!(
        guest.toggle_saved("opp-001").await.unwrap_err(),
        SdkError::SignInRequired
    ));
}

#[tokio::test]
async fn test_remote_member_data_never_touches_demo_store() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(MemoryGateway::new());
    gateway.add_account("ana@example.org", "pw", "ana").await;
    let resolver = resolver(&dir, true, Some(gateway.clone()));

    let identity = resolver.sign_in("ana@example.org", "pw").await.unwrap();
    assert_eq!(identity.mode, SessionMode::Remote);

    let data = MemberData::resolve(&resolver).await;
    data.toggle_saved("opp-003").await.unwrap();
    data.add_pipeline_item(NewPipelineItem {
        title: "Investigation".into(),
        client: "Civic Desk".into(),
        due_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        value: 4000.0,
    })
    .await
    .unwrap();

    assert_eq!(gateway.pipeline_rows().await.len(), 1);
    let store = LocalStore::new(dir.path());
    assert!(store.saved_ids().await.is_empty());
    assert!(store.pipeline_items().await.is_empty());
}

#[tokio::test]
async fn test_expired_credential_stays_signed_in_after_refresh() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(MemoryGateway::new());
    gateway.add_account("ana@example.org", "pw", "ana").await;
    let resolver = resolver(&dir, false, Some(gateway.clone()));

    resolver.sign_in("ana@example.org", "pw").await.unwrap();
    gateway.expire_tokens().await;

    let identity = resolver.resolve_session().await.unwrap();
    assert_eq!(identity.id, "ana");
    assert_eq!(identity.mode, SessionMode::Remote);

    // Writes go through with the refreshed token
    let data = MemberData::resolve(&resolver).await;
    let saved = data.toggle_saved("opp-001").await.unwrap();
    assert!(saved.is_confirmed());
}

#[tokio::test]
async fn test_expired_credential_without_refresh_falls_back_to_guest() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(MemoryGateway::new());
    gateway.add_account("ana@example.org", "pw", "ana").await;
    let resolver = resolver(&dir, false, Some(gateway.clone()));

    resolver.sign_in("ana@example.org", "pw").await.unwrap();
    gateway.expire_tokens().await;
    gateway.revoke_refresh_tokens().await;

    assert_eq!(resolver.resolve_session().await, None);
}

#[tokio::test]
async fn test_ranking_and_quote_use_profile_skills() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(&dir, true, None);
    resolver.begin_demo_session(None).await.unwrap();
    let data = MemberData::resolve(&resolver).await;

    let mut profile = data.profile().await.unwrap().value;
    profile.skills = vec!["Editing".into(), "Mentorship".into()];
    data.save_profile(profile.clone()).await.unwrap();

    let ranked = rank(
        &seed_opportunities(),
        &profile.skills,
        &OpportunityFilter::default(),
        &[],
    );
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

    let q = quote(&role_or_default("producer"), &QuoteInput::parse("3", "1", true, "0"));
    assert_eq!(q.target, 2645);
}
