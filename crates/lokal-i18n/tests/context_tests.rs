//! Integration tests for the i18n context: autoload batching, common-string
//! preloading and the per-consumer feature handle.

mod common;

use common::{index_of, shared, wait_until, FakeFetcher};
use lokal_common::test_utils::init_test_logging;
use lokal_common::{BundleKey, SupportedLocales};
use lokal_i18n::{BundleHandle, FeatureTranslations, I18nContext, LoadState};
use std::sync::Arc;
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(50);

fn context(fetcher: FakeFetcher, keys: &[(&str, &str)]) -> (Arc<I18nContext>, Arc<FakeFetcher>) {
    init_test_logging();
    let fetcher = shared(fetcher);
    let locales = SupportedLocales::new(["en", "fr"], "en");
    let ctx = I18nContext::with_timings(
        locales,
        index_of(keys),
        fetcher.clone(),
        Duration::from_secs(30),
        QUIET,
    );
    (Arc::new(ctx), fetcher)
}

#[tokio::test(start_paused = true)]
async fn misses_coalesce_into_one_load_per_feature() {
    let fetcher = FakeFetcher::new()
        .with_bundle("alpha/en", &[("k1", "A1"), ("k2", "A2")])
        .with_bundle("beta/en", &[("k1", "B1")])
        .with_bundle("gamma/en", &[("k1", "C1")]);
    let (ctx, fetcher) = context(
        fetcher,
        &[("alpha", "en"), ("beta", "en"), ("gamma", "en")],
    );

    // Ten distinct misses across three features inside one quiet window
    for key in [
        "alpha.k1", "alpha.k2", "alpha.k3", "alpha.k4", "beta.k1", "beta.k2", "beta.k3",
        "gamma.k1", "gamma.k2", "gamma.k3",
    ] {
        // Unloaded keys echo themselves
        assert_eq!(ctx.translate(key), key);
    }
    assert_eq!(ctx.batcher().pending_len(), 3);
    assert_eq!(fetcher.calls(), 0);

    // Let the quiet period elapse and the batch flush
    tokio::time::sleep(QUIET * 2).await;
    wait_until(|| fetcher.calls() == 3).await;

    assert_eq!(ctx.translate("alpha.k1"), "A1");
    assert_eq!(ctx.translate("beta.k1"), "B1");
    assert_eq!(ctx.translate("gamma.k1"), "C1");

    // Settled states are never re-queued by later misses
    assert_eq!(ctx.translate("alpha.unknown"), "alpha.unknown");
    assert_eq!(ctx.batcher().pending_len(), 0);
    tokio::time::sleep(QUIET * 2).await;
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn autoload_skips_keys_a_direct_load_raced_ahead_on() {
    let fetcher = FakeFetcher::new().with_bundle("alpha/en", &[("k1", "A1")]);
    let (ctx, fetcher) = context(fetcher, &[("alpha", "en")]);

    assert_eq!(ctx.translate("alpha.k1"), "alpha.k1");
    // A direct load wins the race before the timer fires
    ctx.load("alpha").await.unwrap();
    assert_eq!(fetcher.calls(), 1);

    tokio::time::sleep(QUIET * 2).await;
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    // The flushed batch re-checked the cache and issued nothing
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn common_strings_are_preloaded_eagerly() {
    let fetcher = FakeFetcher::new()
        .with_bundle("common/en", &[("app-title", "Lokal")])
        .with_bundle("common/fr", &[("app-title", "Lokal (fr)")]);
    let (ctx, _) = context(fetcher, &[]);

    ctx.preload_common(&[
        ("en".to_string(), BundleHandle::new("common/en")),
        ("fr".to_string(), BundleHandle::new("common/fr")),
    ])
    .await
    .unwrap();

    assert_eq!(ctx.translate("app-title"), "Lokal");
    ctx.active_locale().set("fr");
    assert_eq!(ctx.translate("app-title"), "Lokal (fr)");
}

#[tokio::test]
async fn feature_handle_loads_and_follows_locale_changes() {
    let fetcher = FakeFetcher::new()
        .with_bundle("example/en", &[("greeting", "Hello")])
        .with_bundle("example/fr", &[("greeting", "Bonjour")]);
    let (ctx, fetcher) = context(fetcher, &[("example", "en"), ("example", "fr")]);

    let translations = FeatureTranslations::new(Arc::clone(&ctx), "example");
    wait_until(|| !translations.is_loading()).await;
    wait_until(|| {
        matches!(
            ctx.cache().get(&BundleKey::new("example", "en")),
            Some(LoadState::Loaded)
        )
    })
    .await;
    assert_eq!(translations.lookup("greeting"), "Hello");
    assert_eq!(fetcher.calls(), 1);

    // A locale change triggers a fresh load through the same de-duplication
    ctx.active_locale().set("fr");
    wait_until(|| {
        matches!(
            ctx.cache().get(&BundleKey::new("example", "fr")),
            Some(LoadState::Loaded)
        )
    })
    .await;
    assert_eq!(translations.lookup("greeting"), "Bonjour");
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn feature_handle_reload_fetches_again() {
    let fetcher = FakeFetcher::new().with_bundle("example/en", &[("greeting", "Hello")]);
    let (ctx, fetcher) = context(fetcher, &[("example", "en")]);

    let translations = FeatureTranslations::new(Arc::clone(&ctx), "example");
    wait_until(|| {
        matches!(
            ctx.cache().get(&BundleKey::new("example", "en")),
            Some(LoadState::Loaded)
        )
    })
    .await;
    assert_eq!(fetcher.calls(), 1);

    translations.reload().await.unwrap();
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(translations.lookup("greeting"), "Hello");
}

#[tokio::test]
async fn dropped_handle_stops_following_locale_changes() {
    let fetcher = FakeFetcher::new()
        .with_bundle("example/en", &[("greeting", "Hello")])
        .with_bundle("example/fr", &[("greeting", "Bonjour")]);
    let (ctx, fetcher) = context(fetcher, &[("example", "en"), ("example", "fr")]);

    let translations = FeatureTranslations::new(Arc::clone(&ctx), "example");
    wait_until(|| {
        matches!(
            ctx.cache().get(&BundleKey::new("example", "en")),
            Some(LoadState::Loaded)
        )
    })
    .await;
    drop(translations);

    ctx.active_locale().set("fr");
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(fetcher.calls(), 1);
    assert!(ctx.cache().get(&BundleKey::new("example", "fr")).is_none());
}

#[tokio::test]
async fn superseded_load_keeps_the_loading_flag_raised() {
    let (fetcher, en_gate) = FakeFetcher::new()
        .with_bundle("example/en", &[("greeting", "Hello")])
        .with_bundle("example/fr", &[("greeting", "Bonjour")])
        .with_gate("example/en");
    let (fetcher, fr_gate) = fetcher.with_gate("example/fr");
    let (ctx, _) = context(fetcher, &[("example", "en"), ("example", "fr")]);

    let translations = FeatureTranslations::new(Arc::clone(&ctx), "example");
    wait_until(|| translations.is_loading()).await;
    wait_until(|| {
        matches!(
            ctx.cache().get(&BundleKey::new("example", "en")),
            Some(LoadState::Pending(_))
        )
    })
    .await;

    // A locale switch supersedes the blocked en load with an fr load
    ctx.active_locale().set("fr");
    wait_until(|| {
        matches!(
            ctx.cache().get(&BundleKey::new("example", "fr")),
            Some(LoadState::Pending(_))
        )
    })
    .await;

    // Let the superseded invocation settle its cancellation completely
    en_gate.cancel();
    wait_until(|| ctx.cache().get(&BundleKey::new("example", "en")).is_none()).await;
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }

    // The successor's load is still in flight; the handle must still
    // report loading
    assert!(translations.is_loading());

    fr_gate.cancel();
    wait_until(|| !translations.is_loading()).await;
    assert_eq!(translations.lookup("greeting"), "Bonjour");
}

#[tokio::test(start_paused = true)]
async fn miss_noted_during_a_flush_arms_a_fresh_timer() {
    let (fetcher, gate) = FakeFetcher::new()
        .with_bundle("alpha/en", &[("k1", "A1")])
        .with_bundle("beta/en", &[("k1", "B1")])
        .with_gate("alpha/en");
    let (ctx, fetcher) = context(fetcher, &[("alpha", "en"), ("beta", "en")]);

    assert_eq!(ctx.translate("alpha.k1"), "alpha.k1");
    // The first flush fires and blocks on the gated alpha fetch
    tokio::time::sleep(QUIET * 2).await;
    wait_until(|| fetcher.calls() == 1).await;

    // A miss while that flush is still loading arms its own timer instead
    // of waiting for an unrelated later miss
    assert_eq!(ctx.translate("beta.k1"), "beta.k1");
    tokio::time::sleep(QUIET * 2).await;
    wait_until(|| fetcher.calls() == 2).await;
    assert_eq!(ctx.translate("beta.k1"), "B1");

    // Releasing the gate lets the first batch finish too
    gate.cancel();
    wait_until(|| ctx.translate("alpha.k1") == "A1").await;
}

#[tokio::test]
async fn lookup_interpolates_arguments() {
    let fetcher = FakeFetcher::new().with_bundle("example/en", &[("welcome", "Welcome, {name}!")]);
    let (ctx, _) = context(fetcher, &[("example", "en")]);

    ctx.load("example").await.unwrap();
    let translations = FeatureTranslations::new(Arc::clone(&ctx), "example");
    assert_eq!(
        translations.lookup_with_args("welcome", &[("name", "Alice")]),
        "Welcome, Alice!"
    );
}
