//! Tests for controller module

use super::*;
use crate::error::Error;
use crate::source::MemorySource;
use pretty_assertions::assert_eq;

fn controller(page_size: usize) -> Controller<u32> {
    Controller::new(page_size, FetchDescriptor::new(), Logger::Silent)
}

fn page(range: std::ops::Range<u32>, total: usize) -> Result<FetchedPage<u32>> {
    Ok(FetchedPage {
        items: range.collect(),
        total,
    })
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_state_predicates() {
    let idle = PaginationState::Idle;
    assert!(idle.is_idle() && idle.is_loadable());
    assert!(!idle.is_fetching() && !idle.is_all_loaded() && !idle.is_error());

    assert!(PaginationState::Fetching.is_fetching());
    assert!(!PaginationState::Fetching.is_loadable());
    assert!(PaginationState::AllLoaded.is_all_loaded());

    let failed = PaginationState::Error(Arc::new(Error::data_source("down")));
    assert!(failed.is_error());
    assert!(!failed.is_loadable());
    assert_eq!(
        failed.error().map(ToString::to_string),
        Some("Data source error: down".to_string())
    );
    assert_eq!(failed.to_string(), "error(Data source error: down)");
    assert_eq!(PaginationState::AllLoaded.to_string(), "all_loaded");
}

// ============================================================================
// load_more Tests
// ============================================================================

#[test]
fn test_load_more_from_idle() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();

    assert_eq!(
        request,
        FetchRequest {
            generation: 0,
            offset: 0,
            accumulated: 0,
            page_size: 10,
        }
    );
    assert!(c.state().is_fetching());
    assert_eq!(c.stats().fetches_started, 1);
}

#[test]
fn test_load_more_single_flight() {
    let mut c = controller(10);
    assert!(c.load_more().is_some());
    for _ in 0..5 {
        assert!(c.load_more().is_none());
    }
    assert_eq!(c.stats().fetches_started, 1);
}

#[test]
fn test_load_more_skipped_when_all_loaded_or_error() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..3, 3));
    assert!(c.state().is_all_loaded());
    assert!(c.load_more().is_none());

    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, Err(Error::data_source("boom")));
    assert!(c.state().is_error());
    assert!(c.load_more().is_none());
}

// ============================================================================
// complete Tests
// ============================================================================

#[test]
fn test_pages_until_all_loaded() {
    let mut c = controller(10);
    let mut counts = Vec::new();

    for (range, total) in [(0..10, 25), (10..20, 25), (20..25, 25)] {
        let request = c.load_more().unwrap();
        assert_eq!(request.offset, c.items().len());
        assert_eq!(c.complete(&request, page(range, total)), Commit::Applied);
        counts.push(c.items().len());
    }

    assert_eq!(counts, vec![10, 20, 25]);
    assert!(c.state().is_all_loaded());
    assert_eq!(c.offset(), 25);
    assert_eq!(c.total(), Some(25));
    assert_eq!(c.items().to_vec(), (0..25).collect::<Vec<_>>());
    assert!(c.load_more().is_none());
}

#[test]
fn test_applied_page_leaves_shared_items_untouched() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..10, 25));

    let published = Arc::clone(c.items());
    let request = c.load_more().unwrap();
    c.complete(&request, page(10..20, 25));

    assert_eq!(published.as_slice(), (0..10).collect::<Vec<_>>().as_slice());
    assert_eq!(c.items().as_slice(), (0..20).collect::<Vec<_>>().as_slice());
    assert!(!Arc::ptr_eq(&published, c.items()));
    assert_eq!(Arc::strong_count(&published), 1);
}

#[test]
fn test_empty_page_after_items_ends_paging() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..10, 30));
    assert!(c.state().is_idle());

    // Source still claims 30 but returns nothing
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..0, 30));
    assert!(c.state().is_all_loaded());
    assert_eq!(c.items().len(), 10);
}

#[test]
fn test_empty_first_page_with_zero_total() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..0, 0));
    assert!(c.state().is_all_loaded());
    assert!(c.items().is_empty());
}

#[test]
fn test_empty_first_page_with_nonzero_total_stays_idle() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..0, 5));
    assert!(c.state().is_idle());
}

#[test]
fn test_failure_keeps_items_and_offset() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..10, 25));

    let request = c.load_more().unwrap();
    let commit = c.complete(&request, Err(Error::data_source("timeout")));

    assert_eq!(commit, Commit::Failed);
    assert_eq!(c.items().len(), 10);
    assert_eq!(c.offset(), 10);
    assert!(c
        .state()
        .error()
        .is_some_and(|e| e.to_string().contains("timeout")));
    assert_eq!(c.stats().failures, 1);
}

// ============================================================================
// retry Tests
// ============================================================================

#[test]
fn test_retry_only_from_error() {
    let mut c = controller(10);
    assert!(c.retry().is_none());
    assert!(c.state().is_idle());

    let request = c.load_more().unwrap();
    assert!(c.retry().is_none());
    assert!(c.state().is_fetching());

    c.complete(&request, page(0..3, 3));
    assert!(c.retry().is_none());
    assert!(c.state().is_all_loaded());
}

#[test]
fn test_retry_resumes_from_same_offset() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..10, 25));

    let failed = c.load_more().unwrap();
    c.complete(&failed, Err(Error::data_source("flaky")));

    let again = c.retry().unwrap();
    assert_eq!(again.offset, 10);
    assert_eq!(again.accumulated, 10);
    assert!(c.state().is_fetching());

    c.complete(&again, page(10..20, 25));
    assert_eq!(c.items().len(), 20);
    assert!(c.state().is_idle());
}

// ============================================================================
// reset Tests
// ============================================================================

#[test]
fn test_reset_clears_and_fetches() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, page(0..10, 10));
    assert!(c.state().is_all_loaded());

    let request = c.reset().unwrap();
    assert!(c.items().is_empty());
    assert_eq!(c.offset(), 0);
    assert_eq!(c.total(), None);
    assert!(c.state().is_fetching());
    assert_eq!(request.offset, 0);
    assert_eq!(request.generation, 1);
    assert_eq!(c.stats().resets, 1);
}

#[test]
fn test_reset_from_error() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    c.complete(&request, Err(Error::data_source("down")));

    assert!(c.reset().is_some());
    assert!(c.state().is_fetching());
}

#[test]
fn test_reset_mid_flight_discards_stale_completion() {
    let mut c = controller(10);
    let stale = c.load_more().unwrap();
    let fresh = c.reset().unwrap();

    assert_eq!(c.complete(&stale, page(100..110, 50)), Commit::Discarded);
    assert!(c.items().is_empty());
    assert!(c.state().is_fetching());

    assert_eq!(c.complete(&fresh, page(0..10, 50)), Commit::Applied);
    assert_eq!(c.items().to_vec(), (0..10).collect::<Vec<_>>());
    assert_eq!(c.stats().discarded, 1);
}

#[test]
fn test_duplicate_completion_is_discarded() {
    let mut c = controller(10);
    let request = c.load_more().unwrap();
    assert_eq!(c.complete(&request, page(0..10, 30)), Commit::Applied);
    assert_eq!(c.complete(&request, page(0..10, 30)), Commit::Discarded);
    assert_eq!(c.items().len(), 10);
}

// ============================================================================
// attach Tests
// ============================================================================

#[test]
fn test_attach_only_starts_fresh_controller() {
    let mut c = controller(10);
    let request = c.attach().unwrap();
    assert!(c.attach().is_none());

    c.complete(&request, page(0..10, 30));
    assert!(c.attach().is_none());
    assert_eq!(c.stats().fetches_started, 1);
}

#[test]
fn test_attach_after_empty_error_does_nothing() {
    let mut c = controller(10);
    let request = c.attach().unwrap();
    c.complete(&request, Err(Error::data_source("down")));
    assert!(c.attach().is_none());
    assert!(c.state().is_error());
}

#[test]
fn test_version_changes_only_on_mutation() {
    let mut c = controller(10);
    let v0 = c.version();
    c.retry();
    assert_eq!(c.version(), v0);

    c.load_more();
    let v1 = c.version();
    assert!(v1 > v0);
    c.load_more();
    assert_eq!(c.version(), v1);
}

// ============================================================================
// fetch_page Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_page_reads_at_offset() {
    let source = MemorySource::new((0..25u32).collect());
    let descriptor = FetchDescriptor::new();
    let request = FetchRequest {
        generation: 0,
        offset: 20,
        accumulated: 20,
        page_size: 10,
    };

    let fetched = fetch_page(&source, &descriptor, &request).await.unwrap();
    assert_eq!(fetched.items, (20..25).collect::<Vec<_>>());
    assert_eq!(fetched.total, 25);
}

#[tokio::test]
async fn test_fetch_page_clamps_offset_to_live_count() {
    // 20 already loaded, but the source shrank to 15
    let source = MemorySource::new((0..15u32).collect());
    let request = FetchRequest {
        generation: 0,
        offset: 20,
        accumulated: 20,
        page_size: 10,
    };

    let fetched = fetch_page(&source, &FetchDescriptor::new(), &request)
        .await
        .unwrap();
    assert!(fetched.items.is_empty());
    assert_eq!(fetched.total, 15);

    // The controller treats the empty page as the end of the data
    let mut c = controller(10);
    let first = c.load_more().unwrap();
    c.complete(&first, page(0..10, 30));
    let second = c.load_more().unwrap();
    c.complete(&second, page(10..20, 30));
    let third = c.load_more().unwrap();
    assert_eq!(third.offset, 20);
    c.complete(&third, Ok(fetched));
    assert!(c.state().is_all_loaded());
    assert_eq!(c.items().len(), 20);
    assert_eq!(c.total(), Some(15));
}
