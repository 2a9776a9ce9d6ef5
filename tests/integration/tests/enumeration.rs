use record_store_client::{RecordApi, RecordLocator, StoreError};
use record_store_test_utils::{
    mock_data::{sample_dodo, stored_dodo},
    StoreTestContext,
};
use solana_sdk::pubkey::Pubkey;

#[tokio::test]
async fn test_fetch_all_stops_at_first_absent_index() {
    let ctx = StoreTestContext::new();
    let seeded = ctx.seed_dodos(3);

    let records = ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();

    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.address, ctx.address_of(i as u64));
        assert_eq!(record.data, seeded[i]);
    }
    assert_eq!(ctx.store.cursor().value(), Some(3));
    assert!(!ctx.store.cursor().is_frozen());
}

#[tokio::test]
async fn test_fetch_all_on_empty_owner_primes_cursor_at_zero() {
    let ctx = StoreTestContext::new();
    assert_eq!(ctx.store.cursor().value(), None);

    let records = ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(ctx.store.cursor().value(), Some(0));
}

#[tokio::test]
async fn test_middle_gap_truncates_enumeration() {
    let ctx = StoreTestContext::new();
    ctx.seed_dodos(3);
    ctx.ledger.remove_account(&ctx.address_of(1));

    let records = ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();

    // index 2 still exists but is unreachable past the gap
    assert_eq!(records.len(), 1);
    assert_eq!(ctx.store.cursor().value(), Some(1));
    assert!(ctx.ledger.account(&ctx.address_of(2)).is_some());
}

#[tokio::test]
async fn test_fetch_all_ignores_other_owners() {
    let ctx = StoreTestContext::new();
    ctx.seed_dodos(2);

    let stranger = Pubkey::new_unique();
    let records = ctx.store.fetch_all(&stranger).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_listing_another_owner_does_not_prime_cursor() {
    let ctx = StoreTestContext::new();
    let other = Pubkey::new_unique();
    let seeded = ctx.seed_dodos_for(&other, 3);

    let records = ctx.store.fetch_all(&other).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].data, seeded[2]);
    assert_eq!(ctx.store.cursor().value(), None);
    assert!(matches!(
        ctx.store.create(sample_dodo(0)).await,
        Err(StoreError::SequenceNotInitialized)
    ));
    assert_eq!(ctx.ledger.transaction_count(), 0);

    ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();
    assert_eq!(ctx.store.cursor().value(), Some(0));

    // a later listing of someone else leaves the signer's cursor alone
    ctx.store.fetch_all(&other).await.unwrap();
    assert_eq!(ctx.store.cursor().value(), Some(0));

    let created = ctx.store.create(sample_dodo(0)).await.unwrap().confirmed().unwrap();
    assert_eq!(created.address, ctx.address_of(0));
    let own = ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn test_undecodable_record_fails_scan_and_keeps_cursor() {
    let ctx = StoreTestContext::new();
    ctx.seed_dodos(1);
    ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();

    let mut account = ctx.ledger.account(&ctx.address_of(0)).unwrap();
    account.data.truncate(10);
    ctx.ledger.insert_account(ctx.address_of(0), account);

    let err = ctx.store.fetch_all(&ctx.owner_key()).await.unwrap_err();

    assert!(matches!(err, StoreError::Codec(_)));
    assert_eq!(ctx.store.cursor().value(), Some(1));
    assert!(!ctx.store.cursor().is_frozen());
}

#[tokio::test]
async fn test_fetch_one_by_index_requires_primed_cursor() {
    let ctx = StoreTestContext::new();
    ctx.seed_dodos(2);
    let locator = RecordLocator::Index {
        owner: ctx.owner_key(),
        index: 1,
    };

    assert!(matches!(
        ctx.store.fetch_one(locator).await,
        Err(StoreError::SequenceNotInitialized)
    ));

    ctx.store.fetch_all(&ctx.owner_key()).await.unwrap();
    let record = ctx.store.fetch_one(locator).await.unwrap().unwrap();
    assert_eq!(record.data, stored_dodo(1, ctx.owner_key()));
}

#[tokio::test]
async fn test_fetch_one_by_address() {
    let ctx = StoreTestContext::new();
    ctx.seed_dodos(1);

    let found = ctx
        .store
        .fetch_one(RecordLocator::Address(ctx.address_of(0)))
        .await
        .unwrap();
    let missing = ctx
        .store
        .fetch_one(RecordLocator::Address(ctx.address_of(1)))
        .await
        .unwrap();

    assert_eq!(found.unwrap().data, stored_dodo(0, ctx.owner_key()));
    assert!(missing.is_none());
}
